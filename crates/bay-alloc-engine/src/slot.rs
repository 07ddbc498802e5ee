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

//! Slot calculator: where a pallet goes inside a bay.

use bay_alloc_core::{
    location::{BayPrefix, LOCATION_CAPACITY, LocationId},
    pallet::{PalletCodeParser, PalletOrdinal},
};
use bay_alloc_model::{id::PalletId, layout::BayGeometryIndex};

use crate::error::PlaceError;

/// Consecutive pallet ordinals pair up into one location:
/// 1 and 2 go to group 1, 3 and 4 to group 2, and so on.
///
/// ```
/// use bay_alloc_core::{location::BayPrefix, pallet::PalletOrdinal};
/// use bay_alloc_engine::slot::compute_location;
///
/// let bay: BayPrefix = "C1".parse().unwrap();
/// let third = PalletOrdinal::new(3).unwrap();
/// assert_eq!(compute_location(third, bay).to_string(), "C1-2");
/// ```
#[inline]
pub fn compute_location(ordinal: PalletOrdinal, bay: BayPrefix) -> LocationId {
    let group = (ordinal.value() - 1) / LOCATION_CAPACITY as u32 + 1;
    bay.location(group)
}

/// Like [`compute_location`], but falls back to the bay's lowest group
/// when the layout does not have the computed location.
pub fn resolve_location(
    ordinal: PalletOrdinal,
    bay: BayPrefix,
    index: &BayGeometryIndex,
) -> Option<LocationId> {
    let target = compute_location(ordinal, bay);
    if index.contains(&target) {
        return Some(target);
    }
    let fallback = index.locations_in_bay(bay).first().copied();
    if let Some(loc) = fallback {
        tracing::debug!(%target, fallback = %loc, "computed location missing from layout");
    }
    fallback
}

/// Parser plus formula: turns a pallet code into its target location.
#[derive(Debug, Clone, Default)]
pub struct SlotCalculator {
    parser: PalletCodeParser,
}

impl SlotCalculator {
    #[inline]
    pub fn new(parser: PalletCodeParser) -> Self {
        Self { parser }
    }

    #[inline]
    pub fn parser(&self) -> &PalletCodeParser {
        &self.parser
    }

    pub fn locate(
        &self,
        pallet: &PalletId,
        bay: BayPrefix,
        index: &BayGeometryIndex,
    ) -> Result<LocationId, PlaceError> {
        let ordinal = self
            .parser
            .parse_ordinal(pallet.as_str())
            .ok_or_else(|| PlaceError::UnparseablePalletCode(pallet.clone()))?;
        resolve_location(ordinal, bay, index).ok_or(PlaceError::NoLocationInBay(bay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bay(s: &str) -> BayPrefix {
        s.parse().expect("bay prefix")
    }

    fn ord(v: u32) -> PalletOrdinal {
        PalletOrdinal::new(v).expect("non-zero")
    }

    fn index(ids: &[&str]) -> BayGeometryIndex {
        BayGeometryIndex::from_locations(ids.iter().map(|s| s.parse().expect("location")))
    }

    #[test]
    fn test_pairs_share_a_group() {
        assert_eq!(compute_location(ord(1), bay("C1")).to_string(), "C1-1");
        assert_eq!(compute_location(ord(2), bay("C1")).to_string(), "C1-1");
        assert_eq!(compute_location(ord(3), bay("C1")).to_string(), "C1-2");
        assert_eq!(compute_location(ord(12), bay("C4")).to_string(), "C4-6");
    }

    #[test]
    fn test_missing_location_falls_back_to_lowest_group() {
        let idx = index(&["C1-3", "C1-2", "C2-1"]);
        let got = resolve_location(ord(20), bay("C1"), &idx);
        assert_eq!(got.map(|l| l.to_string()).as_deref(), Some("C1-2"));
        assert_eq!(resolve_location(ord(1), bay("C3"), &idx), None);
    }

    #[test]
    fn test_locate_reports_typed_failures() {
        let calc = SlotCalculator::default();
        let idx = index(&["C1-1", "C1-2"]);
        assert_eq!(
            calc.locate(&PalletId::new("PLT-004"), bay("C1"), &idx)
                .map(|l| l.to_string()),
            Ok("C1-2".to_string())
        );
        assert_eq!(
            calc.locate(&PalletId::new("AB"), bay("C1"), &idx),
            Err(PlaceError::UnparseablePalletCode(PalletId::new("AB")))
        );
        assert_eq!(
            calc.locate(&PalletId::new("X00"), bay("C1"), &idx),
            Err(PlaceError::UnparseablePalletCode(PalletId::new("X00")))
        );
        assert_eq!(
            calc.locate(&PalletId::new("001"), bay("C2"), &idx),
            Err(PlaceError::NoLocationInBay(bay("C2")))
        );
    }

    proptest! {
        #[test]
        fn test_every_group_receives_exactly_two_ordinals(group in 1u32..500) {
            let b = bay("C1");
            let first = compute_location(ord(2 * group - 1), b);
            let second = compute_location(ord(2 * group), b);
            prop_assert_eq!(first, second);
            prop_assert_eq!(first.group(), group);
            prop_assert_ne!(compute_location(ord(2 * group + 1), b), first);
        }
    }
}
