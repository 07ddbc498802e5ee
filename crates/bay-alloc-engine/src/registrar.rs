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

//! Scan registration: bay selection, slot placement and the optimistic
//! ledger write.

use bay_alloc_model::{
    assignment::Placement,
    id::{PalletId, ProjectId, TruckId},
    layout::BayGeometryIndex,
    ledger::ScanInsert,
    manifest::{ManifestEntry, PackingList},
};
use tracing::instrument;

use crate::{
    error::{DuplicateScanError, NoMatchingPalletError, ScanError},
    occupancy::OccupancyStore,
    persist::{PersistJob, PersistenceWorker},
    selector::select_bay,
    slot::SlotCalculator,
};

/// Borrowed view of the session state a scan touches.
pub struct ScanRegistrar<'a> {
    pub(crate) store: &'a mut OccupancyStore,
    pub(crate) index: &'a BayGeometryIndex,
    pub(crate) calculator: &'a SlotCalculator,
    pub(crate) worker: &'a PersistenceWorker,
    pub(crate) project_id: &'a ProjectId,
}

impl ScanRegistrar<'_> {
    /// Registers one scanned pallet. Local state is updated before the
    /// ledger write is even attempted; a failed write only shows up in
    /// the worker's counters and is repaired by the next reconcile.
    #[instrument(level = "debug", skip_all, fields(truck = %truck, pallet = %pallet))]
    pub fn register(&mut self, truck: &TruckId, pallet: &PalletId) -> Result<Placement, ScanError> {
        if self.store.is_delivered(truck) {
            return Err(ScanError::TruckDelivered(truck.clone()));
        }
        if self.store.is_scanned(truck, pallet) {
            return Err(DuplicateScanError::new(truck.clone(), pallet.clone()).into());
        }
        let bay = select_bay(self.store, self.index, truck)
            .ok_or_else(|| ScanError::NoBaySpace(truck.clone()))?;
        let placement = self
            .store
            .try_place(truck, pallet, bay, self.calculator, self.index)?;
        self.store.mark_scanned(truck, pallet);

        self.worker.enqueue(PersistJob::InsertScan(ScanInsert::new(
            placement.location(),
            truck.clone(),
            pallet.clone(),
            placement.slot(),
            self.project_id.clone(),
        )));
        tracing::info!(%placement, "pallet registered");
        Ok(placement)
    }

    /// Resolves the pallet of `entry` carrying the scanned serial pair and
    /// registers it.
    pub fn register_serials(
        &mut self,
        entry: &ManifestEntry,
        packing: &PackingList,
        first_serial: &str,
        last_serial: &str,
    ) -> Result<(PalletId, Placement), ScanError> {
        let truck = entry.truck_id();
        let pallet = packing
            .find_by_serials(entry, first_serial, last_serial)
            .map(|summary| summary.pallet().clone())
            .ok_or_else(|| NoMatchingPalletError::new(truck.clone(), first_serial, last_serial))?;
        let placement = self.register(truck, &pallet)?;
        Ok((pallet, placement))
    }
}
