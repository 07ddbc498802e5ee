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

//! In-memory occupancy index: which pallets sit where, which pallets were
//! scanned and which trucks have left.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use bay_alloc_core::location::{BayPrefix, LOCATION_CAPACITY, LocationId, Slot};
use bay_alloc_model::{
    assignment::{Assignment, Placement, ScanRecord},
    err::LedgerRowError,
    id::{PalletId, TruckId},
    layout::BayGeometryIndex,
    ledger::{LedgerRow, LedgerStatus},
};
use serde::Serialize;

use crate::{
    error::{PlaceError, ReconcileError},
    ledger::ExternalLedger,
    slot::SlotCalculator,
};

/// Counts from one [`OccupancyStore::reconcile`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReconcileSummary {
    pub assignments: usize,
    pub scans: usize,
    pub delivered_trucks: usize,
    pub skipped_rows: usize,
}

/// What [`OccupancyStore::release_truck`] removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReleaseSummary {
    pub assignments: usize,
    pub scans: usize,
}

impl ReleaseSummary {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.assignments == 0 && self.scans == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct OccupancyStore {
    slots: BTreeMap<LocationId, Vec<Assignment>>,
    scanned: HashSet<ScanRecord>,
    delivered: BTreeSet<TruckId>,
}

impl OccupancyStore {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole store with the state described by `rows`.
    ///
    /// Delivered rows only mark their truck as delivered. Rows whose
    /// placement cannot be stored (bad location or slot, a third pallet,
    /// a taken slot) are logged and skipped, but still count as scanned.
    pub fn reconcile<I>(&mut self, rows: I) -> ReconcileSummary
    where
        I: IntoIterator<Item = LedgerRow>,
    {
        let mut fresh = OccupancyStore::new();
        let mut summary = ReconcileSummary::default();

        for row in rows {
            if row.status() == LedgerStatus::Delivered {
                fresh.delivered.insert(row.truck().clone());
                continue;
            }
            fresh
                .scanned
                .insert(ScanRecord::new(row.truck().clone(), row.pallet().clone()));

            let (location, slot) = match row.placement() {
                Ok(p) => p,
                Err(LedgerRowError::MissingLocation) => continue,
                Err(err) => {
                    tracing::warn!(
                        truck = %row.truck(),
                        pallet = %row.pallet(),
                        error = %err,
                        "ledger row has an unusable placement"
                    );
                    summary.skipped_rows += 1;
                    continue;
                }
            };

            let list = fresh.slots.entry(location).or_default();
            if list.len() >= LOCATION_CAPACITY || list.iter().any(|a| a.slot() == slot) {
                tracing::warn!(
                    %location,
                    %slot,
                    truck = %row.truck(),
                    pallet = %row.pallet(),
                    "ledger row conflicts with an earlier assignment"
                );
                summary.skipped_rows += 1;
                continue;
            }
            list.push(Assignment::new(row.truck().clone(), row.pallet().clone(), slot));
        }

        fresh.slots.retain(|_, list| !list.is_empty());
        summary.assignments = fresh.assignment_count();
        summary.scans = fresh.scanned.len();
        summary.delivered_trucks = fresh.delivered.len();
        *self = fresh;
        summary
    }

    /// Pulls every row from `ledger` and reconciles against it. On failure
    /// the store is left untouched.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn reconcile_from<L>(&mut self, ledger: &L) -> Result<ReconcileSummary, ReconcileError>
    where
        L: ExternalLedger + ?Sized,
    {
        let rows = ledger.query_occupancy()?;
        let summary = self.reconcile(rows);
        tracing::debug!(?summary, "occupancy reconciled");
        Ok(summary)
    }

    /// Places `pallet` in `bay` at the location the calculator picks, in
    /// the lowest free slot.
    pub fn try_place(
        &mut self,
        truck: &TruckId,
        pallet: &PalletId,
        bay: BayPrefix,
        calculator: &SlotCalculator,
        index: &BayGeometryIndex,
    ) -> Result<Placement, PlaceError> {
        let location = calculator.locate(pallet, bay, index)?;
        let taken = self.assignments(&location);
        let slot = Slot::ALL
            .into_iter()
            .find(|s| taken.iter().all(|a| a.slot() != *s))
            .ok_or(PlaceError::LocationFull(location))?;

        self.slots
            .entry(location)
            .or_default()
            .push(Assignment::new(truck.clone(), pallet.clone(), slot));
        Ok(Placement::new(location, slot))
    }

    /// Returns `false` when the pair was already recorded.
    #[inline]
    pub fn mark_scanned(&mut self, truck: &TruckId, pallet: &PalletId) -> bool {
        self.scanned
            .insert(ScanRecord::new(truck.clone(), pallet.clone()))
    }

    #[inline]
    pub fn is_scanned(&self, truck: &TruckId, pallet: &PalletId) -> bool {
        self.scanned
            .contains(&ScanRecord::new(truck.clone(), pallet.clone()))
    }

    #[inline]
    pub fn is_delivered(&self, truck: &TruckId) -> bool {
        self.delivered.contains(truck)
    }

    #[inline]
    pub fn delivered(&self) -> &BTreeSet<TruckId> {
        &self.delivered
    }

    pub fn location_of(&self, truck: &TruckId, pallet: &PalletId) -> Option<Placement> {
        self.slots.iter().find_map(|(loc, list)| {
            list.iter()
                .find(|a| a.is_for(truck, pallet))
                .map(|a| Placement::new(*loc, a.slot()))
        })
    }

    /// Drops everything the truck holds and marks it delivered.
    pub fn release_truck(&mut self, truck: &TruckId) -> ReleaseSummary {
        let mut summary = ReleaseSummary::default();
        self.slots.retain(|_, list| {
            let before = list.len();
            list.retain(|a| !a.belongs_to(truck));
            summary.assignments += before - list.len();
            !list.is_empty()
        });
        let before = self.scanned.len();
        self.scanned.retain(|r| r.truck() != truck);
        summary.scans = before - self.scanned.len();
        self.delivered.insert(truck.clone());
        summary
    }

    #[inline]
    pub fn assignments(&self, location: &LocationId) -> &[Assignment] {
        self.slots.get(location).map(Vec::as_slice).unwrap_or(&[])
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (LocationId, &[Assignment])> + '_ {
        self.slots.iter().map(|(loc, list)| (*loc, list.as_slice()))
    }

    #[inline]
    pub fn assignment_count(&self) -> usize {
        self.slots.values().map(Vec::len).sum()
    }

    #[inline]
    pub fn scan_count(&self) -> usize {
        self.scanned.len()
    }

    /// Whether the store knows anything about `truck` besides delivery.
    pub fn knows_truck(&self, truck: &TruckId) -> bool {
        self.scanned.iter().any(|r| r.truck() == truck)
            || self.slots.values().flatten().any(|a| a.belongs_to(truck))
    }

    /// Bay of the truck's first assignment inside the layout, unless the
    /// truck was delivered.
    pub fn bay_of(&self, truck: &TruckId, index: &BayGeometryIndex) -> Option<BayPrefix> {
        if self.is_delivered(truck) {
            return None;
        }
        self.slots
            .iter()
            .filter(|(loc, _)| index.contains(loc))
            .find(|(_, list)| list.iter().any(|a| a.belongs_to(truck)))
            .map(|(loc, _)| loc.bay())
    }

    /// Bays with at least one in-layout assignment of an undelivered truck.
    pub fn occupied_bays(&self, index: &BayGeometryIndex) -> BTreeSet<BayPrefix> {
        self.slots
            .iter()
            .filter(|(loc, list)| {
                index.contains(loc) && list.iter().any(|a| !self.is_delivered(a.truck()))
            })
            .map(|(loc, _)| loc.bay())
            .collect()
    }

    /// Locations the truck currently holds pallets in.
    pub fn locations_of(&self, truck: &TruckId) -> BTreeSet<LocationId> {
        self.slots
            .iter()
            .filter(|(_, list)| list.iter().any(|a| a.belongs_to(truck)))
            .map(|(loc, _)| *loc)
            .collect()
    }

    /// Assignments stored under locations the layout does not know.
    pub fn orphaned<'a>(
        &'a self,
        index: &'a BayGeometryIndex,
    ) -> impl Iterator<Item = (LocationId, &'a Assignment)> + 'a {
        self.slots
            .iter()
            .filter(move |(loc, _)| !index.contains(loc))
            .flat_map(|(loc, list)| list.iter().map(move |a| (*loc, a)))
    }

    #[cfg(test)]
    pub(crate) fn holds_invariants(&self) -> bool {
        self.slots.values().all(|list| {
            let slots: BTreeSet<Slot> = list.iter().map(Assignment::slot).collect();
            !list.is_empty() && list.len() <= LOCATION_CAPACITY && slots.len() == list.len()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::InMemoryLedger;
    use proptest::prelude::*;

    fn t(s: &str) -> TruckId {
        TruckId::new(s)
    }

    fn p(s: &str) -> PalletId {
        PalletId::new(s)
    }

    fn loc(s: &str) -> LocationId {
        s.parse().expect("location")
    }

    fn bay(s: &str) -> BayPrefix {
        s.parse().expect("bay")
    }

    fn layout() -> BayGeometryIndex {
        BayGeometryIndex::from_locations(
            ["C1-1", "C1-2", "C1-3", "C2-1", "C2-2", "C2-3"]
                .into_iter()
                .map(loc),
        )
    }

    fn row(truck: &str, pallet: &str, location: &str, slot: u8, status: LedgerStatus) -> LedgerRow {
        LedgerRow::new(t(truck), p(pallet), Some(location.into()), Some(slot), status)
    }

    #[test]
    fn test_try_place_fills_lowest_free_slot() {
        let mut store = OccupancyStore::new();
        let calc = SlotCalculator::default();
        let idx = layout();
        let a = store
            .try_place(&t("A"), &p("001"), bay("C1"), &calc, &idx)
            .expect("placed");
        let b = store
            .try_place(&t("A"), &p("002"), bay("C1"), &calc, &idx)
            .expect("placed");
        assert_eq!((a.location(), a.slot()), (loc("C1-1"), Slot::First));
        assert_eq!((b.location(), b.slot()), (loc("C1-1"), Slot::Second));
        assert_eq!(
            store.try_place(&t("A"), &p("PALLET-01"), bay("C1"), &calc, &idx),
            Err(PlaceError::LocationFull(loc("C1-1")))
        );
        assert!(store.holds_invariants());
    }

    #[test]
    fn test_scan_records_are_membership_only() {
        let mut store = OccupancyStore::new();
        assert!(store.mark_scanned(&t("A"), &p("1")));
        assert!(!store.mark_scanned(&t("A"), &p("1")));
        assert!(store.is_scanned(&t("A"), &p("1")));
        assert!(!store.is_scanned(&t("B"), &p("1")));
        assert_eq!(store.scan_count(), 1);
    }

    #[test]
    fn test_release_truck_clears_everything_it_holds() {
        let mut store = OccupancyStore::new();
        let calc = SlotCalculator::default();
        let idx = layout();
        for pallet in ["001", "002", "003"] {
            store
                .try_place(&t("A"), &p(pallet), bay("C1"), &calc, &idx)
                .expect("placed");
            store.mark_scanned(&t("A"), &p(pallet));
        }
        store
            .try_place(&t("B"), &p("004"), bay("C1"), &calc, &idx)
            .expect("placed");
        store.mark_scanned(&t("B"), &p("004"));

        let released = store.release_truck(&t("A"));
        assert_eq!(released, ReleaseSummary { assignments: 3, scans: 3 });
        assert!(store.is_delivered(&t("A")));
        assert!(!store.knows_truck(&t("A")));
        assert!(store.assignments(&loc("C1-1")).is_empty());
        assert_eq!(store.assignments(&loc("C1-2")).len(), 1);
        assert_eq!(store.iter().count(), 1);
        assert_eq!(store.location_of(&t("B"), &p("004")).map(|p| p.slot()), Some(Slot::Second));
    }

    #[test]
    fn test_reconcile_replaces_state_wholesale() {
        let mut store = OccupancyStore::new();
        store.mark_scanned(&t("OLD"), &p("9"));
        let summary = store.reconcile(vec![
            row("A", "001", "C1-1", 1, LedgerStatus::Scanned),
            row("A", "002", "C1-1", 2, LedgerStatus::Scanned),
            row("B", "003", "C2-2", 1, LedgerStatus::Delivered),
            LedgerRow::new(t("C"), p("005"), None, None, LedgerStatus::Scanned),
        ]);
        assert_eq!(
            summary,
            ReconcileSummary {
                assignments: 2,
                scans: 3,
                delivered_trucks: 1,
                skipped_rows: 0,
            }
        );
        assert!(!store.is_scanned(&t("OLD"), &p("9")));
        assert!(store.is_scanned(&t("C"), &p("005")));
        assert!(!store.is_scanned(&t("B"), &p("003")));
        assert!(store.is_delivered(&t("B")));
        assert_eq!(store.assignments(&loc("C2-2")).len(), 0);
    }

    #[test]
    fn test_reconcile_skips_conflicting_rows() {
        let mut store = OccupancyStore::new();
        let summary = store.reconcile(vec![
            row("A", "001", "C1-1", 1, LedgerStatus::Scanned),
            row("A", "002", "C1-1", 1, LedgerStatus::Scanned),
            row("A", "003", "C1-1", 2, LedgerStatus::Scanned),
            row("A", "004", "C1-1", 2, LedgerStatus::Scanned),
            row("A", "005", "bogus", 1, LedgerStatus::Scanned),
            row("A", "006", "C1-2", 7, LedgerStatus::Scanned),
        ]);
        assert_eq!(summary.assignments, 2);
        assert_eq!(summary.skipped_rows, 4);
        assert_eq!(summary.scans, 6);
        assert!(store.holds_invariants());
    }

    #[test]
    fn test_failed_reconcile_keeps_local_state() {
        let ledger =
            InMemoryLedger::with_rows(vec![row("A", "001", "C1-1", 1, LedgerStatus::Scanned)]);
        let mut store = OccupancyStore::new();
        assert_eq!(store.reconcile_from(&ledger).map(|s| s.assignments), Ok(1));

        ledger.set_offline(true);
        store.mark_scanned(&t("B"), &p("002"));
        assert!(store.reconcile_from(&ledger).is_err());
        assert!(store.is_scanned(&t("B"), &p("002")));
        assert_eq!(store.assignment_count(), 1);
    }

    #[test]
    fn test_missing_slot_reads_as_first() {
        let mut store = OccupancyStore::new();
        store.reconcile(vec![LedgerRow::new(
            t("A"),
            p("001"),
            Some("C1-1".into()),
            None,
            LedgerStatus::Scanned,
        )]);
        assert_eq!(
            store.location_of(&t("A"), &p("001")),
            Some(Placement::new(loc("C1-1"), Slot::First))
        );
    }

    #[test]
    fn test_bay_queries_ignore_orphans_and_delivered_trucks() {
        let mut store = OccupancyStore::new();
        store.reconcile(vec![
            row("A", "001", "C1-1", 1, LedgerStatus::Scanned),
            row("B", "001", "C9-1", 1, LedgerStatus::Scanned),
        ]);
        let idx = layout();
        assert_eq!(store.bay_of(&t("A"), &idx), Some(bay("C1")));
        assert_eq!(store.bay_of(&t("B"), &idx), None);
        assert_eq!(store.occupied_bays(&idx), BTreeSet::from([bay("C1")]));
        let orphans: Vec<_> = store.orphaned(&idx).map(|(l, a)| (l, a.truck().clone())).collect();
        assert_eq!(orphans, vec![(loc("C9-1"), t("B"))]);

        store.release_truck(&t("A"));
        assert!(store.occupied_bays(&idx).is_empty());
        assert_eq!(store.bay_of(&t("A"), &idx), None);
    }

    proptest! {
        #[test]
        fn test_capacity_and_slot_uniqueness_hold(
            ops in prop::collection::vec((0u8..4, 1u32..12, any::<bool>()), 1..80)
        ) {
            let mut store = OccupancyStore::new();
            let calc = SlotCalculator::default();
            let idx = layout();
            for (truck, pallet, deliver) in ops {
                let truck = TruckId::new(format!("T{truck}"));
                if deliver {
                    store.release_truck(&truck);
                } else {
                    let target = if pallet % 2 == 0 { bay("C1") } else { bay("C2") };
                    let pallet = PalletId::new(format!("{pallet:03}"));
                    let _ = store.try_place(&truck, &pallet, target, &calc, &idx);
                }
                prop_assert!(store.holds_invariants());
                for (_, list) in store.iter() {
                    prop_assert!(list.len() <= LOCATION_CAPACITY);
                    if list.len() == 2 {
                        let slots: BTreeSet<u8> = list.iter().map(|a| a.slot().value()).collect();
                        prop_assert_eq!(slots, BTreeSet::from([1, 2]));
                    }
                }
            }
        }
    }
}
