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

//! The session: one explicit owner of the occupancy state, the layout and
//! the persistence queue, through which every operation goes.

use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use bay_alloc_core::location::{BayPrefix, LocationId};
use bay_alloc_model::{
    assignment::{Assignment, Placement},
    id::{PalletId, TruckId},
    layout::BayGeometryIndex,
    manifest::{Manifest, ManifestEntry, PackingList, ShipmentStatus},
};
use serde::Serialize;

use crate::{
    config::EngineConfig,
    error::{DeliveryError, ReconcileError, ScanError},
    finalizer::{DeliveryFinalizer, DeliveryReport},
    ledger::{ExternalLedger, ShipmentStatusSink},
    occupancy::{OccupancyStore, ReconcileSummary},
    persist::{PersistJob, PersistenceWorker, WorkerStats},
    projector::{self, RenderItem, VisualState},
    registrar::ScanRegistrar,
    selector,
    slot::SlotCalculator,
};

/// Scanned versus expected pallets of one truck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TruckProgress {
    pub scanned: usize,
    pub total: usize,
}

impl TruckProgress {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.scanned >= self.total
    }
}

/// A truck whose pallets are all scanned and placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadyTruck {
    pub truck: TruckId,
    pub progress: TruckProgress,
    pub locations: usize,
}

pub struct Session<L: ?Sized> {
    config: EngineConfig,
    index: BayGeometryIndex,
    store: OccupancyStore,
    calculator: SlotCalculator,
    ledger: Arc<L>,
    worker: PersistenceWorker,
}

impl<L> Session<L>
where
    L: ExternalLedger + ?Sized + 'static,
{
    /// Starts a session with an empty store. Call [`reconcile`](Self::reconcile)
    /// (or use [`open`](Self::open)) before registering scans.
    pub fn new<S>(
        config: EngineConfig,
        index: BayGeometryIndex,
        ledger: Arc<L>,
        sink: Arc<S>,
    ) -> Self
    where
        S: ShipmentStatusSink + ?Sized + 'static,
    {
        let worker = PersistenceWorker::start(&config.persistence, Arc::clone(&ledger), sink);
        if index.is_empty() {
            tracing::warn!("layout has no valid locations; every scan will report no bay space");
        }
        Self {
            config,
            index,
            store: OccupancyStore::new(),
            calculator: SlotCalculator::default(),
            ledger,
            worker,
        }
    }

    /// Like [`new`](Self::new), followed by an initial reconcile.
    pub fn open<S>(
        config: EngineConfig,
        index: BayGeometryIndex,
        ledger: Arc<L>,
        sink: Arc<S>,
    ) -> Result<Self, ReconcileError>
    where
        S: ShipmentStatusSink + ?Sized + 'static,
    {
        let mut session = Self::new(config, index, ledger, sink);
        session.reconcile()?;
        Ok(session)
    }

    #[inline]
    pub fn with_calculator(mut self, calculator: SlotCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn index(&self) -> &BayGeometryIndex {
        &self.index
    }

    #[inline]
    pub fn store(&self) -> &OccupancyStore {
        &self.store
    }

    #[inline]
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    #[inline]
    pub fn worker_stats(&self) -> WorkerStats {
        self.worker.stats()
    }

    /// Waits until every queued background write has been attempted.
    #[inline]
    pub fn flush(&self) -> bool {
        self.worker.flush()
    }

    fn registrar(&mut self) -> ScanRegistrar<'_> {
        ScanRegistrar {
            store: &mut self.store,
            index: &self.index,
            calculator: &self.calculator,
            worker: &self.worker,
            project_id: &self.config.project_id,
        }
    }

    pub fn register(&mut self, truck: &TruckId, pallet: &PalletId) -> Result<Placement, ScanError> {
        self.registrar().register(truck, pallet)
    }

    pub fn register_serials(
        &mut self,
        entry: &ManifestEntry,
        packing: &PackingList,
        first_serial: &str,
        last_serial: &str,
    ) -> Result<(PalletId, Placement), ScanError> {
        self.registrar()
            .register_serials(entry, packing, first_serial, last_serial)
    }

    pub fn deliver(&mut self, truck: &TruckId) -> Result<DeliveryReport, DeliveryError> {
        DeliveryFinalizer {
            store: &mut self.store,
            worker: &self.worker,
            ledger: &*self.ledger,
        }
        .deliver(truck)
    }

    /// Replaces local state with the ledger's. Leaves it untouched on error.
    pub fn reconcile(&mut self) -> Result<ReconcileSummary, ReconcileError> {
        self.store.reconcile_from(&*self.ledger).inspect_err(|err| {
            tracing::warn!(error = %err, "reconcile failed");
        })
    }

    /// Queues the `Listo` status for a truck in the manifest.
    pub fn announce_ready(&self, truck: &TruckId) -> bool {
        self.worker.enqueue(PersistJob::PropagateStatus {
            truck: truck.clone(),
            status: ShipmentStatus::Ready,
        })
    }

    #[inline]
    pub fn select_bay(&self, truck: &TruckId) -> Option<BayPrefix> {
        selector::select_bay(&self.store, &self.index, truck)
    }

    #[inline]
    pub fn is_scanned(&self, truck: &TruckId, pallet: &PalletId) -> bool {
        self.store.is_scanned(truck, pallet)
    }

    #[inline]
    pub fn location_of(&self, truck: &TruckId, pallet: &PalletId) -> Option<Placement> {
        self.store.location_of(truck, pallet)
    }

    #[inline]
    pub fn is_delivered(&self, truck: &TruckId) -> bool {
        self.store.is_delivered(truck)
    }

    #[inline]
    pub fn project(&self) -> BTreeMap<LocationId, VisualState> {
        projector::project(&self.store, &self.index)
    }

    #[inline]
    pub fn render_items(&self) -> Vec<RenderItem> {
        projector::render_items(&self.store, &self.index)
    }

    /// Assignments held at `location`, for tooltips.
    #[inline]
    pub fn location_detail(&self, location: &LocationId) -> &[Assignment] {
        self.store.assignments(location)
    }

    pub fn progress(&self, entry: &ManifestEntry, packing: &PackingList) -> TruckProgress {
        let truck = entry.truck_id();
        packing
            .pallets_for(entry)
            .fold(TruckProgress::default(), |mut acc, summary| {
                acc.total += 1;
                if self.store.is_scanned(truck, summary.pallet()) {
                    acc.scanned += 1;
                }
                acc
            })
    }

    /// Trucks that are not delivered, have every pallet of their range
    /// scanned and hold at least one location. Manifest order.
    pub fn ready_for_delivery(
        &self,
        manifest: &Manifest,
        packing: &PackingList,
    ) -> Vec<ReadyTruck> {
        let mut seen = HashSet::new();
        manifest
            .entries()
            .iter()
            .filter(|entry| seen.insert(entry.truck_id().clone()))
            .filter(|entry| !self.store.is_delivered(entry.truck_id()))
            .filter_map(|entry| {
                let progress = self.progress(entry, packing);
                let locations = self.store.locations_of(entry.truck_id()).len();
                (progress.is_complete() && locations > 0).then(|| ReadyTruck {
                    truck: entry.truck_id().clone(),
                    progress,
                    locations,
                })
            })
            .collect()
    }

    /// Swaps the layout. Assignments at locations the new layout lacks stay
    /// in the store but no longer count for bay selection or rendering.
    /// Returns how many assignments were orphaned.
    pub fn reload_layout(&mut self, index: BayGeometryIndex) -> usize {
        self.index = index;
        let orphans = self.store.orphaned(&self.index).count();
        if orphans > 0 {
            tracing::warn!(orphans, "layout reload left assignments without a location");
        }
        orphans
    }

    pub fn orphaned(&self) -> Vec<(LocationId, Assignment)> {
        self.store
            .orphaned(&self.index)
            .map(|(loc, a)| (loc, a.clone()))
            .collect()
    }
}
