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

//! # Bay Allocation Model (`bay-alloc-model`)
//!
//! Data model shared by the allocation engine and its front ends. It builds
//! on the location and pallet primitives of `bay-alloc-core`.
//!
//! ## Key Data Structures
//!
//! - **`TruckId` / `PalletId`**: logical identifiers as they appear in the
//!   shipment manifest.
//! - **`Assignment`**: a pallet parked in one slot of a location on behalf of
//!   a truck.
//! - **`LedgerRow`**: the persisted form of a scan, read back during
//!   reconciliation.
//! - **`BayGeometryIndex`**: every known location of the layout, grouped by
//!   bay, with the rectangle it occupies on the diagram.
//! - **`Manifest` / `PackingList`**: which pallets belong to which truck, and
//!   the serial numbers that identify each pallet at the dock.
//!
//! The `generator` module produces seeded synthetic scenarios for tests,
//! benchmarks and the simulation binary.

pub mod assignment;
pub mod err;
pub mod generator;
pub mod id;
pub mod layout;
pub mod ledger;
pub mod manifest;

pub mod prelude {
    pub use crate::assignment::{Assignment, Placement, ScanRecord};
    pub use crate::err::{LedgerRowError, LedgerStatusParseError};
    pub use crate::generator::{
        ScanEvent, Scenario, ScenarioGenConfig, ScenarioGenConfigError, ScenarioGenerator,
    };
    pub use crate::id::{PalletId, ProjectId, TruckId};
    pub use crate::layout::{BayGeometryIndex, LocationGeometry, ShapeDescriptor};
    pub use crate::ledger::{LedgerRow, LedgerStatus, ScanInsert};
    pub use crate::manifest::{
        CartonRow, Manifest, ManifestEntry, PackingList, PalletSummary, ShipmentStatus,
    };
}
