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

//! Per-location visual state for the layout map.

use std::collections::{BTreeMap, BTreeSet};

use bay_alloc_core::{geometry::Rect, location::LocationId};
use bay_alloc_model::layout::BayGeometryIndex;
use serde::Serialize;

use crate::occupancy::OccupancyStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualState {
    Free,
    BayInUse,
    Occupied,
}

/// Fill and stroke colour of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub fill: &'static str,
    pub stroke: &'static str,
}

impl VisualState {
    #[inline]
    pub const fn palette(self) -> Palette {
        match self {
            VisualState::Free => Palette {
                fill: "#16a34a",
                stroke: "#4ade80",
            },
            VisualState::BayInUse => Palette {
                fill: "#d97706",
                stroke: "#fbbf24",
            },
            VisualState::Occupied => Palette {
                fill: "#2563eb",
                stroke: "#60a5fa",
            },
        }
    }
}

/// Maps every location of the layout to its visual state. Assignments at
/// locations outside the layout are ignored.
pub fn project(
    store: &OccupancyStore,
    index: &BayGeometryIndex,
) -> BTreeMap<LocationId, VisualState> {
    let occupied: BTreeSet<LocationId> = store
        .iter()
        .filter(|(loc, list)| !list.is_empty() && index.contains(loc))
        .map(|(loc, _)| loc)
        .collect();
    let bays_in_use: BTreeSet<_> = occupied.iter().map(LocationId::bay).collect();

    index
        .iter_locations()
        .map(|loc| {
            let state = if occupied.contains(loc) {
                VisualState::Occupied
            } else if bays_in_use.contains(&loc.bay()) {
                VisualState::BayInUse
            } else {
                VisualState::Free
            };
            (*loc, state)
        })
        .collect()
}

/// A projected location ready to be drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderItem {
    pub location: LocationId,
    pub rect: Rect,
    pub state: VisualState,
    pub palette: Palette,
    pub pallets: usize,
}

pub fn render_items(store: &OccupancyStore, index: &BayGeometryIndex) -> Vec<RenderItem> {
    let states = project(store, index);
    index
        .iter_geometry()
        .filter_map(|geometry| {
            let location = geometry.location();
            let state = *states.get(&location)?;
            Some(RenderItem {
                location,
                rect: geometry.rect(),
                state,
                palette: state.palette(),
                pallets: store.assignments(&location).len(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bay_alloc_model::ledger::{LedgerRow, LedgerStatus};

    fn loc(s: &str) -> LocationId {
        s.parse().expect("location")
    }

    fn store_with(rows: &[(&str, &str, &str)]) -> OccupancyStore {
        let mut store = OccupancyStore::new();
        store.reconcile(rows.iter().map(|(truck, pallet, location)| {
            LedgerRow::new(
                (*truck).into(),
                (*pallet).into(),
                Some((*location).to_string()),
                Some(1),
                LedgerStatus::Scanned,
            )
        }));
        store
    }

    fn layout() -> BayGeometryIndex {
        BayGeometryIndex::from_locations(["C1-1", "C1-2", "C2-1", "C2-2"].into_iter().map(loc))
    }

    #[test]
    fn test_states_follow_bay_usage() {
        let store = store_with(&[("A", "001", "C1-1")]);
        let states = project(&store, &layout());
        assert_eq!(states[&loc("C1-1")], VisualState::Occupied);
        assert_eq!(states[&loc("C1-2")], VisualState::BayInUse);
        assert_eq!(states[&loc("C2-1")], VisualState::Free);
        assert_eq!(states[&loc("C2-2")], VisualState::Free);
    }

    #[test]
    fn test_orphaned_assignments_do_not_colour_the_map() {
        let store = store_with(&[("A", "001", "C2-9")]);
        let states = project(&store, &layout());
        assert_eq!(states.len(), 4);
        assert!(states.values().all(|s| *s == VisualState::Free));
    }

    #[test]
    fn test_render_items_carry_palette_and_counts() {
        let store = store_with(&[("A", "001", "C2-2")]);
        let items = render_items(&store, &layout());
        assert_eq!(items.len(), 4);
        let occupied: Vec<_> = items
            .iter()
            .filter(|i| i.state == VisualState::Occupied)
            .collect();
        assert_eq!(occupied.len(), 1);
        assert_eq!(occupied[0].location, loc("C2-2"));
        assert_eq!(occupied[0].pallets, 1);
        assert_eq!(occupied[0].palette.fill, "#2563eb");
        assert_eq!(VisualState::Free.palette().stroke, "#4ade80");
    }
}
