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

use bay_alloc_core::location::BayPrefix;
use bay_alloc_model::{id::TruckId, layout::BayGeometryIndex};

use crate::occupancy::OccupancyStore;

/// Picks the physical bay for `truck`.
///
/// A truck that already holds a pallet in the layout stays in that bay.
/// Otherwise the lowest bay without any undelivered assignment is handed
/// out. `None` means every bay is taken, or the layout has no bays.
pub fn select_bay(
    store: &OccupancyStore,
    index: &BayGeometryIndex,
    truck: &TruckId,
) -> Option<BayPrefix> {
    if let Some(bay) = store.bay_of(truck, index) {
        return Some(bay);
    }
    let occupied = store.occupied_bays(index);
    let free = index.bays().find(|bay| !occupied.contains(bay));
    match free {
        Some(bay) => tracing::debug!(%truck, %bay, "assigned free bay"),
        None => tracing::debug!(%truck, occupied = occupied.len(), "no free bay"),
    }
    free
}

#[cfg(test)]
mod tests {
    use super::*;
    use bay_alloc_core::location::LocationId;
    use bay_alloc_model::ledger::{LedgerRow, LedgerStatus};

    fn layout() -> BayGeometryIndex {
        BayGeometryIndex::from_locations(
            ["C2-1", "C1-1", "C1-2", "C3-1", "C10-1"]
                .into_iter()
                .map(|s| s.parse::<LocationId>().expect("location")),
        )
    }

    fn bay(s: &str) -> BayPrefix {
        s.parse().expect("bay")
    }

    fn scanned(truck: &str, pallet: &str, location: &str) -> LedgerRow {
        LedgerRow::new(
            TruckId::new(truck),
            pallet.into(),
            Some(location.into()),
            Some(1),
            LedgerStatus::Scanned,
        )
    }

    #[test]
    fn test_first_free_bay_in_numeric_order() {
        let mut store = OccupancyStore::new();
        let idx = layout();
        assert_eq!(select_bay(&store, &idx, &TruckId::new("A")), Some(bay("C1")));

        store.reconcile(vec![scanned("A", "001", "C1-2"), scanned("B", "001", "C3-1")]);
        assert_eq!(select_bay(&store, &idx, &TruckId::new("N")), Some(bay("C2")));

        store.reconcile(vec![
            scanned("A", "001", "C1-2"),
            scanned("B", "001", "C2-1"),
            scanned("C", "001", "C3-1"),
        ]);
        assert_eq!(select_bay(&store, &idx, &TruckId::new("N")), Some(bay("C10")));
    }

    #[test]
    fn test_truck_sticks_to_its_bay() {
        let mut store = OccupancyStore::new();
        store.reconcile(vec![scanned("B", "001", "C3-1")]);
        let idx = layout();
        assert_eq!(select_bay(&store, &idx, &TruckId::new("B")), Some(bay("C3")));
    }

    #[test]
    fn test_no_bay_when_all_taken_or_layout_empty() {
        let mut store = OccupancyStore::new();
        store.reconcile(vec![
            scanned("A", "001", "C1-1"),
            scanned("B", "001", "C2-1"),
            scanned("C", "001", "C3-1"),
            scanned("D", "001", "C10-1"),
        ]);
        assert_eq!(select_bay(&store, &layout(), &TruckId::new("N")), None);
        assert_eq!(
            select_bay(&OccupancyStore::new(), &BayGeometryIndex::empty(), &TruckId::new("N")),
            None
        );
    }
}
