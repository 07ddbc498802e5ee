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

//! # Bay Allocation Engine (`bay-alloc-engine`)
//!
//! Assigns scanned pallets to truck bays and keeps the in-memory occupancy
//! index in step with a remote ledger.
//!
//! - [`slot`]: pallet ordinal to location, with the lowest-group fallback.
//! - [`selector`]: sticky, lowest-free-first bay choice.
//! - [`occupancy`]: the occupancy store and its reconcile routine.
//! - [`registrar`] / [`finalizer`]: scan registration and truck delivery.
//! - [`persist`]: the write-behind queue in front of the ledger.
//! - [`projector`]: per-location visual state.
//! - [`session`]: the context object that owns all of the above.

pub mod config;
pub mod error;
pub mod finalizer;
pub mod ledger;
pub mod occupancy;
pub mod persist;
pub mod projector;
pub mod registrar;
pub mod selector;
pub mod session;
pub mod slot;

pub mod prelude {
    pub use crate::config::{EngineConfig, PersistenceConfig};
    pub use crate::error::{
        DeliveryError, DuplicateScanError, LedgerError, NoMatchingPalletError, PlaceError,
        ReconcileError, ScanError,
    };
    pub use crate::finalizer::DeliveryReport;
    pub use crate::ledger::{
        ExternalLedger, InMemoryLedger, InMemoryStatusSink, ShipmentStatusSink,
    };
    pub use crate::occupancy::{OccupancyStore, ReconcileSummary, ReleaseSummary};
    pub use crate::persist::{PersistJob, PersistenceWorker, WorkerStats};
    pub use crate::projector::{Palette, RenderItem, VisualState, project};
    pub use crate::selector::select_bay;
    pub use crate::session::{ReadyTruck, Session, TruckProgress};
    pub use crate::slot::{SlotCalculator, compute_location, resolve_location};
}
