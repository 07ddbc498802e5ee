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

//! Contracts of the remote occupancy ledger and the shipment-status
//! target, with in-memory implementations.

use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use bay_alloc_model::{
    id::TruckId,
    ledger::{LedgerRow, LedgerStatus, ScanInsert},
    manifest::ShipmentStatus,
};
use parking_lot::Mutex;

use crate::error::LedgerError;

/// The remote occupancy table.
pub trait ExternalLedger: Send + Sync {
    /// Every stored row, in storage order.
    fn query_occupancy(&self) -> Result<Vec<LedgerRow>, LedgerError>;

    fn insert_scan(&self, scan: ScanInsert) -> Result<(), LedgerError>;

    /// Sets `status` on every row of `truck` in one statement. Returns the
    /// number of rows touched.
    fn bulk_update_status(&self, truck: &TruckId, status: LedgerStatus)
    -> Result<usize, LedgerError>;
}

/// Where shipment status changes are written back (the manifest).
pub trait ShipmentStatusSink: Send + Sync {
    fn set_status(&self, truck: &TruckId, status: ShipmentStatus) -> Result<(), LedgerError>;
}

impl<T: ExternalLedger + ?Sized> ExternalLedger for Arc<T> {
    fn query_occupancy(&self) -> Result<Vec<LedgerRow>, LedgerError> {
        (**self).query_occupancy()
    }

    fn insert_scan(&self, scan: ScanInsert) -> Result<(), LedgerError> {
        (**self).insert_scan(scan)
    }

    fn bulk_update_status(
        &self,
        truck: &TruckId,
        status: LedgerStatus,
    ) -> Result<usize, LedgerError> {
        (**self).bulk_update_status(truck, status)
    }
}

impl<T: ShipmentStatusSink + ?Sized> ShipmentStatusSink for Arc<T> {
    fn set_status(&self, truck: &TruckId, status: ShipmentStatus) -> Result<(), LedgerError> {
        (**self).set_status(truck, status)
    }
}

/// Ledger kept in process memory. Can be switched offline to exercise
/// failure paths.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    rows: Mutex<Vec<LedgerRow>>,
    offline: AtomicBool,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<LedgerRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
            offline: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    #[inline]
    pub fn rows(&self) -> Vec<LedgerRow> {
        self.rows.lock().clone()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }

    #[inline]
    fn check_online(&self) -> Result<(), LedgerError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("in-memory ledger is offline".into()));
        }
        Ok(())
    }
}

impl ExternalLedger for InMemoryLedger {
    fn query_occupancy(&self) -> Result<Vec<LedgerRow>, LedgerError> {
        self.check_online()?;
        Ok(self.rows())
    }

    fn insert_scan(&self, scan: ScanInsert) -> Result<(), LedgerError> {
        self.check_online()?;
        self.rows.lock().push(scan.into());
        Ok(())
    }

    fn bulk_update_status(
        &self,
        truck: &TruckId,
        status: LedgerStatus,
    ) -> Result<usize, LedgerError> {
        self.check_online()?;
        let mut rows = self.rows.lock();
        let mut touched = 0;
        for row in rows.iter_mut().filter(|r| r.truck() == truck) {
            row.set_status(status);
            touched += 1;
        }
        Ok(touched)
    }
}

/// Records the last status written per truck.
#[derive(Debug, Default)]
pub struct InMemoryStatusSink {
    statuses: Mutex<BTreeMap<TruckId, ShipmentStatus>>,
    failing: AtomicBool,
}

impl InMemoryStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    #[inline]
    pub fn status_of(&self, truck: &TruckId) -> Option<ShipmentStatus> {
        self.statuses.lock().get(truck).copied()
    }

    #[inline]
    pub fn snapshot(&self) -> BTreeMap<TruckId, ShipmentStatus> {
        self.statuses.lock().clone()
    }
}

impl ShipmentStatusSink for InMemoryStatusSink {
    fn set_status(&self, truck: &TruckId, status: ShipmentStatus) -> Result<(), LedgerError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(LedgerError::Rejected(format!(
                "status {status} for truck {truck} refused"
            )));
        }
        self.statuses.lock().insert(truck.clone(), status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bay_alloc_core::location::Slot;
    use bay_alloc_model::id::{PalletId, ProjectId};

    fn insert(truck: &str, pallet: &str) -> ScanInsert {
        ScanInsert::new(
            "C1-1".parse().expect("location"),
            TruckId::new(truck),
            PalletId::new(pallet),
            Slot::First,
            ProjectId::default(),
        )
    }

    #[test]
    fn test_insert_then_bulk_update() {
        let ledger = InMemoryLedger::new();
        ledger.insert_scan(insert("A", "001")).expect("insert");
        ledger.insert_scan(insert("A", "002")).expect("insert");
        ledger.insert_scan(insert("B", "003")).expect("insert");

        let touched = ledger
            .bulk_update_status(&TruckId::new("A"), LedgerStatus::Delivered)
            .expect("update");
        assert_eq!(touched, 2);
        let rows = ledger.query_occupancy().expect("query");
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows.iter()
                .filter(|r| r.status() == LedgerStatus::Delivered)
                .count(),
            2
        );
    }

    #[test]
    fn test_offline_ledger_fails_every_call() {
        let ledger = InMemoryLedger::new();
        ledger.set_offline(true);
        assert!(matches!(
            ledger.query_occupancy(),
            Err(LedgerError::Unavailable(_))
        ));
        assert!(ledger.insert_scan(insert("A", "001")).is_err());
        assert!(ledger.is_empty());
        ledger.set_offline(false);
        assert!(ledger.insert_scan(insert("A", "001")).is_ok());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_status_sink_keeps_latest_value() {
        let sink = Arc::new(InMemoryStatusSink::new());
        let truck = TruckId::new("T-1");
        sink.set_status(&truck, ShipmentStatus::Ready).expect("set");
        sink.set_status(&truck, ShipmentStatus::Delivered).expect("set");
        assert_eq!(sink.status_of(&truck), Some(ShipmentStatus::Delivered));

        sink.set_failing(true);
        assert!(sink.set_status(&truck, ShipmentStatus::Ready).is_err());
        assert_eq!(sink.snapshot().len(), 1);
    }
}
