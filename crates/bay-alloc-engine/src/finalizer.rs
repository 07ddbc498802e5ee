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

use bay_alloc_model::{id::TruckId, manifest::ShipmentStatus};
use serde::Serialize;
use tracing::instrument;

use crate::{
    error::DeliveryError,
    ledger::ExternalLedger,
    occupancy::{OccupancyStore, ReconcileSummary, ReleaseSummary},
    persist::{PersistJob, PersistenceWorker},
};

/// Outcome of a delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub truck: TruckId,
    pub released: ReleaseSummary,
    pub reconcile: ReconcileSummary,
    /// Whether the ledger listed the truck as delivered after the resync.
    pub ledger_confirmed: bool,
}

pub struct DeliveryFinalizer<'a, L: ?Sized> {
    pub(crate) store: &'a mut OccupancyStore,
    pub(crate) worker: &'a PersistenceWorker,
    pub(crate) ledger: &'a L,
}

impl<L> DeliveryFinalizer<'_, L>
where
    L: ExternalLedger + ?Sized,
{
    /// Releases the truck and resyncs with the ledger.
    ///
    /// The ledger update is queued first, then local state is released,
    /// then the manifest status is queued. The final reconcile runs once
    /// the ledger writes have drained; the status update is left running
    /// in the background. A truck the store knows nothing about is
    /// reported as `UnknownTruck` once its ledger update is queued.
    #[instrument(level = "debug", skip_all, fields(truck = %truck))]
    pub fn deliver(&mut self, truck: &TruckId) -> Result<DeliveryReport, DeliveryError> {
        self.worker.enqueue(PersistJob::MarkDelivered(truck.clone()));
        if !self.store.knows_truck(truck) {
            tracing::warn!("delivery requested for a truck without scans");
            return Err(DeliveryError::UnknownTruck(truck.clone()));
        }

        let released = self.store.release_truck(truck);
        self.worker.enqueue(PersistJob::PropagateStatus {
            truck: truck.clone(),
            status: ShipmentStatus::Delivered,
        });

        if !self.worker.flush_ledger() {
            tracing::warn!("persistence worker unavailable before delivery resync");
        }
        let reconcile = self.store.reconcile_from(self.ledger)?;
        let ledger_confirmed = self.store.is_delivered(truck);
        if !ledger_confirmed {
            tracing::warn!("ledger holds no delivered rows for the truck after resync");
        }
        tracing::info!(
            assignments = released.assignments,
            scans = released.scans,
            "truck delivered"
        );
        Ok(DeliveryReport {
            truck: truck.clone(),
            released,
            reconcile,
            ledger_confirmed,
        })
    }
}
