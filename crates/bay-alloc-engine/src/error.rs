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

use bay_alloc_core::location::{BayPrefix, LocationId};
use bay_alloc_model::id::{PalletId, TruckId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("pallet {pallet} of truck {truck} is already scanned")]
pub struct DuplicateScanError {
    truck: TruckId,
    pallet: PalletId,
}

impl DuplicateScanError {
    pub fn new(truck: TruckId, pallet: PalletId) -> Self {
        Self { truck, pallet }
    }
    pub fn truck(&self) -> &TruckId {
        &self.truck
    }
    pub fn pallet(&self) -> &PalletId {
        &self.pallet
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no pallet of truck {truck} carries serials {first_serial} .. {last_serial}")]
pub struct NoMatchingPalletError {
    truck: TruckId,
    first_serial: String,
    last_serial: String,
}

impl NoMatchingPalletError {
    pub fn new(truck: TruckId, first_serial: &str, last_serial: &str) -> Self {
        Self {
            truck,
            first_serial: first_serial.trim().to_string(),
            last_serial: last_serial.trim().to_string(),
        }
    }
    pub fn truck(&self) -> &TruckId {
        &self.truck
    }
    pub fn first_serial(&self) -> &str {
        &self.first_serial
    }
    pub fn last_serial(&self) -> &str {
        &self.last_serial
    }
}

/// Why a pallet could not be placed in a bay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceError {
    #[error("pallet code `{0}` carries no usable pallet number")]
    UnparseablePalletCode(PalletId),
    #[error("bay {0} has no locations in the current layout")]
    NoLocationInBay(BayPrefix),
    #[error("location {0} already holds two pallets")]
    LocationFull(LocationId),
}

/// Recoverable failures of a scan registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error(transparent)]
    DuplicateScan(#[from] DuplicateScanError),
    #[error("no free bay is available for truck {0}")]
    NoBaySpace(TruckId),
    #[error("location {0} already holds two pallets")]
    LocationFull(LocationId),
    #[error("pallet code `{0}` carries no usable pallet number")]
    UnparseablePalletCode(PalletId),
    #[error(transparent)]
    NoMatchingPallet(#[from] NoMatchingPalletError),
    #[error("truck {0} has already been delivered")]
    TruckDelivered(TruckId),
    #[error("bay {0} has no locations in the current layout")]
    NoLocationInBay(BayPrefix),
}

impl From<PlaceError> for ScanError {
    fn from(value: PlaceError) -> Self {
        match value {
            PlaceError::UnparseablePalletCode(p) => ScanError::UnparseablePalletCode(p),
            PlaceError::NoLocationInBay(b) => ScanError::NoLocationInBay(b),
            PlaceError::LocationFull(l) => ScanError::LocationFull(l),
        }
    }
}

/// Failure reported by an external ledger or status sink.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
    #[error("ledger rejected the request: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("occupancy reconcile failed, local state kept: {source}")]
pub struct ReconcileError {
    #[from]
    source: LedgerError,
}

impl ReconcileError {
    pub fn ledger_error(&self) -> &LedgerError {
        &self.source
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("truck {0} holds no scans or assignments")]
    UnknownTruck(TruckId),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_error_maps_onto_scan_error() {
        let loc: LocationId = "C1-2".parse().expect("location");
        assert_eq!(
            ScanError::from(PlaceError::LocationFull(loc)),
            ScanError::LocationFull(loc)
        );
        let bay: BayPrefix = "C3".parse().expect("bay");
        assert_eq!(
            ScanError::from(PlaceError::NoLocationInBay(bay)),
            ScanError::NoLocationInBay(bay)
        );
    }

    #[test]
    fn test_messages_name_the_subject() {
        let err = ScanError::from(DuplicateScanError::new(
            TruckId::new("T-1"),
            PalletId::new("007"),
        ));
        assert_eq!(err.to_string(), "pallet 007 of truck T-1 is already scanned");

        let err = ReconcileError::from(LedgerError::Unavailable("timeout".into()));
        assert!(err.to_string().contains("timeout"));
        assert_eq!(
            err.ledger_error(),
            &LedgerError::Unavailable("timeout".into())
        );
    }
}
