// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! The bay geometry index: which locations exist in the loaded layout, which
//! bays they form, and where each one is drawn.
//!
//! Bays are discovered, not configured. Whatever location identifiers the
//! layout carries define the set of bays for the session.

use bay_alloc_core::{
    geometry::{Rect, ShapeKind},
    location::{BayPrefix, LocationId},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One shape of the layout diagram as handed over by the layout parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDescriptor {
    location_id: String,
    kind: ShapeKind,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default)]
    width: f64,
    #[serde(default)]
    height: f64,
}

impl ShapeDescriptor {
    #[inline]
    pub fn new(location_id: impl Into<String>, kind: ShapeKind, rect: Rect) -> Self {
        Self {
            location_id: location_id.into(),
            kind,
            x: rect.x(),
            y: rect.y(),
            width: rect.width(),
            height: rect.height(),
        }
    }

    #[inline]
    pub fn rect(location_id: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(location_id, ShapeKind::Rect, Rect::new(x, y, width, height))
    }

    #[inline]
    pub fn location_id(&self) -> &str {
        &self.location_id
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationGeometry {
    location: LocationId,
    kind: ShapeKind,
    rect: Rect,
}

impl LocationGeometry {
    #[inline]
    pub fn new(location: LocationId, kind: ShapeKind, rect: Rect) -> Self {
        Self {
            location,
            kind,
            rect,
        }
    }

    #[inline]
    pub fn location(&self) -> LocationId {
        self.location
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BayGeometryIndex {
    locations: BTreeMap<LocationId, LocationGeometry>,
    by_bay: BTreeMap<BayPrefix, Vec<LocationId>>,
}

impl BayGeometryIndex {
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the index from layout shapes.
    ///
    /// Shapes whose identifier is not a location id are ignored. When the
    /// same location is drawn more than once (a rectangle plus its text
    /// label, say), a rectangle wins over other kinds and otherwise the
    /// first shape wins.
    pub fn from_shapes<I>(shapes: I) -> Self
    where
        I: IntoIterator<Item = ShapeDescriptor>,
    {
        let mut locations: BTreeMap<LocationId, LocationGeometry> = BTreeMap::new();
        let mut skipped = 0usize;

        for shape in shapes {
            let Ok(location) = shape.location_id().parse::<LocationId>() else {
                skipped += 1;
                continue;
            };
            let geometry = LocationGeometry::new(location, shape.kind(), shape.bounds());
            match locations.get(&location) {
                Some(existing)
                    if existing.kind() == ShapeKind::Rect || shape.kind() != ShapeKind::Rect => {}
                _ => {
                    locations.insert(location, geometry);
                }
            }
        }

        let mut by_bay: BTreeMap<BayPrefix, Vec<LocationId>> = BTreeMap::new();
        for location in locations.keys() {
            by_bay.entry(location.bay()).or_default().push(*location);
        }

        tracing::debug!(
            locations = locations.len(),
            bays = by_bay.len(),
            skipped,
            "built bay geometry index"
        );

        Self { locations, by_bay }
    }

    /// Index over bare identifiers, every location getting an empty rectangle.
    pub fn from_locations<I>(locations: I) -> Self
    where
        I: IntoIterator<Item = LocationId>,
    {
        Self::from_shapes(locations.into_iter().map(|loc| {
            ShapeDescriptor::new(loc.to_string(), ShapeKind::Rect, Rect::default())
        }))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[inline]
    pub fn contains(&self, location: &LocationId) -> bool {
        self.locations.contains_key(location)
    }

    #[inline]
    pub fn has_bay(&self, bay: BayPrefix) -> bool {
        self.by_bay.contains_key(&bay)
    }

    #[inline]
    pub fn geometry(&self, location: &LocationId) -> Option<&LocationGeometry> {
        self.locations.get(location)
    }

    /// All locations in `(bay, group)` order.
    #[inline]
    pub fn iter_locations(&self) -> impl Iterator<Item = &LocationId> + '_ {
        self.locations.keys()
    }

    #[inline]
    pub fn iter_geometry(&self) -> impl Iterator<Item = &LocationGeometry> + '_ {
        self.locations.values()
    }

    #[inline]
    pub fn all_locations(&self) -> BTreeSet<LocationId> {
        self.locations.keys().copied().collect()
    }

    /// Discovered bays, ascending by number.
    #[inline]
    pub fn bays(&self) -> impl Iterator<Item = BayPrefix> + '_ {
        self.by_bay.keys().copied()
    }

    #[inline]
    pub fn bay_numbers(&self) -> BTreeSet<u32> {
        self.by_bay.keys().map(|b| b.number()).collect()
    }

    /// Locations of `bay` ordered by ascending group number; empty for an
    /// unknown bay.
    #[inline]
    pub fn locations_in_bay(&self, bay: BayPrefix) -> &[LocationId] {
        self.by_bay.get(&bay).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Bounding box of every drawn location, if any.
    pub fn extent(&self) -> Option<Rect> {
        self.locations
            .values()
            .map(|g| g.rect())
            .reduce(|acc, r| acc.union(&r))
    }
}

impl FromIterator<ShapeDescriptor> for BayGeometryIndex {
    fn from_iter<T: IntoIterator<Item = ShapeDescriptor>>(iter: T) -> Self {
        BayGeometryIndex::from_shapes(iter)
    }
}
