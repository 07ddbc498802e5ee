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

//! Write-behind persistence. Ledger writes and status propagation are
//! queued to background threads so the scan path never waits on the
//! network.
//!
//! Jobs run on two lanes. Ledger writes (`InsertScan`, `MarkDelivered`)
//! share one thread in submission order; shipment-status propagation runs
//! on its own thread. [`PersistenceWorker::flush_ledger`] is the barrier a
//! caller uses before trusting the ledger again and never waits on the
//! status lane.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use bay_alloc_model::{
    id::TruckId,
    ledger::{LedgerStatus, ScanInsert},
    manifest::ShipmentStatus,
};
use crossbeam::channel::{self, Receiver, Sender, TrySendError};

use crate::{
    config::PersistenceConfig,
    error::LedgerError,
    ledger::{ExternalLedger, ShipmentStatusSink},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistJob {
    InsertScan(ScanInsert),
    MarkDelivered(TruckId),
    PropagateStatus {
        truck: TruckId,
        status: ShipmentStatus,
    },
}

impl PersistJob {
    fn label(&self) -> &'static str {
        match self {
            PersistJob::InsertScan(_) => "insert_scan",
            PersistJob::MarkDelivered(_) => "mark_delivered",
            PersistJob::PropagateStatus { .. } => "propagate_status",
        }
    }

    #[inline]
    fn is_status(&self) -> bool {
        matches!(self, PersistJob::PropagateStatus { .. })
    }
}

enum PersistCommand {
    Job(PersistJob),
    Flush(Sender<()>),
    Shutdown,
}

#[derive(Debug, Default)]
struct WorkerCounters {
    pending: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

/// Counter snapshot of a [`PersistenceWorker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct WorkerStats {
    pub pending: usize,
    pub completed: usize,
    pub failed: usize,
}

/// One queue and the thread draining it.
struct Lane {
    tx: Sender<PersistCommand>,
    handle: Option<JoinHandle<()>>,
}

impl Lane {
    fn spawn<F>(name: String, capacity: usize, counters: Arc<WorkerCounters>, run: F) -> Self
    where
        F: Fn(PersistJob) -> Result<(), LedgerError> + Send + 'static,
    {
        let (tx, rx) = if capacity == 0 {
            channel::unbounded()
        } else {
            channel::bounded(capacity)
        };
        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || run_lane(rx, &counters, run))
            .expect("spawn persistence worker");
        Self {
            tx,
            handle: Some(handle),
        }
    }

    fn send(&self, job: PersistJob) -> bool {
        let cmd = match self.tx.try_send(PersistCommand::Job(job)) {
            Ok(()) => return true,
            Err(TrySendError::Full(cmd)) => {
                tracing::warn!("persistence queue full, waiting for the worker");
                cmd
            }
            Err(TrySendError::Disconnected(_)) => return false,
        };
        self.tx.send(cmd).is_ok()
    }

    fn flush(&self) -> bool {
        let (ack_tx, ack_rx) = channel::bounded(1);
        if self.tx.send(PersistCommand::Flush(ack_tx)).is_err() {
            return false;
        }
        ack_rx.recv().is_ok()
    }

    fn shutdown(&mut self) {
        let _ = self.tx.send(PersistCommand::Shutdown);
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::warn!("persistence worker panicked");
        }
    }
}

pub struct PersistenceWorker {
    ledger_lane: Lane,
    status_lane: Lane,
    counters: Arc<WorkerCounters>,
}

impl PersistenceWorker {
    pub fn start<L, S>(config: &PersistenceConfig, ledger: Arc<L>, sink: Arc<S>) -> Self
    where
        L: ExternalLedger + ?Sized + 'static,
        S: ShipmentStatusSink + ?Sized + 'static,
    {
        let counters = Arc::new(WorkerCounters::default());
        let delay = Duration::from_millis(config.propagation_delay_ms);

        let ledger_lane = Lane::spawn(
            config.worker_name.clone(),
            config.queue_capacity,
            Arc::clone(&counters),
            move |job| write_ledger(&*ledger, job),
        );
        let status_lane = Lane::spawn(
            format!("{}-status", config.worker_name),
            config.queue_capacity,
            Arc::clone(&counters),
            move |job| propagate_status(&*sink, job, delay),
        );
        Self {
            ledger_lane,
            status_lane,
            counters,
        }
    }

    /// Queues a job. Waits only if a bounded queue is full. Returns `false`
    /// if the worker is gone; the job is then counted as failed.
    pub fn enqueue(&self, job: PersistJob) -> bool {
        self.counters.pending.fetch_add(1, Ordering::SeqCst);
        let lane = if job.is_status() {
            &self.status_lane
        } else {
            &self.ledger_lane
        };
        if lane.send(job) {
            return true;
        }
        self.counters.pending.fetch_sub(1, Ordering::SeqCst);
        self.counters.failed.fetch_add(1, Ordering::SeqCst);
        tracing::warn!("persistence worker is not running, job dropped");
        false
    }

    /// Blocks until every ledger write queued before this call has been
    /// attempted. Status propagation is not waited for.
    #[inline]
    pub fn flush_ledger(&self) -> bool {
        self.ledger_lane.flush()
    }

    /// Blocks until every job queued before this call, on both lanes, has
    /// been attempted.
    pub fn flush(&self) -> bool {
        let ledger = self.ledger_lane.flush();
        let status = self.status_lane.flush();
        ledger && status
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.counters.pending.load(Ordering::SeqCst)
    }

    #[inline]
    pub fn failed(&self) -> usize {
        self.counters.failed.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> WorkerStats {
        WorkerStats {
            pending: self.pending(),
            completed: self.counters.completed.load(Ordering::SeqCst),
            failed: self.failed(),
        }
    }

    /// Stops both lanes after the jobs already queued.
    pub fn shutdown(&mut self) {
        self.ledger_lane.shutdown();
        self.status_lane.shutdown();
    }
}

impl Drop for PersistenceWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn write_ledger<L>(ledger: &L, job: PersistJob) -> Result<(), LedgerError>
where
    L: ExternalLedger + ?Sized,
{
    match job {
        PersistJob::InsertScan(scan) => ledger.insert_scan(scan),
        PersistJob::MarkDelivered(truck) => ledger
            .bulk_update_status(&truck, LedgerStatus::Delivered)
            .map(|rows| {
                tracing::debug!(%truck, rows, "ledger rows marked delivered");
            }),
        PersistJob::PropagateStatus { truck, .. } => Err(LedgerError::Rejected(format!(
            "status update for truck {truck} sent to the ledger lane"
        ))),
    }
}

fn propagate_status<S>(sink: &S, job: PersistJob, delay: Duration) -> Result<(), LedgerError>
where
    S: ShipmentStatusSink + ?Sized,
{
    match job {
        PersistJob::PropagateStatus { truck, status } => {
            if !delay.is_zero() {
                thread::sleep(delay);
            }
            sink.set_status(&truck, status)
        }
        other => Err(LedgerError::Rejected(format!(
            "{} job sent to the status lane",
            other.label()
        ))),
    }
}

fn run_lane<F>(rx: Receiver<PersistCommand>, counters: &WorkerCounters, run: F)
where
    F: Fn(PersistJob) -> Result<(), LedgerError>,
{
    while let Ok(cmd) = rx.recv() {
        match cmd {
            PersistCommand::Job(job) => {
                let label = job.label();
                match run(job) {
                    Ok(()) => {
                        counters.completed.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(err) => {
                        counters.failed.fetch_add(1, Ordering::SeqCst);
                        tracing::warn!(job = label, error = %err, "background write failed");
                    }
                }
                counters.pending.fetch_sub(1, Ordering::SeqCst);
            }
            PersistCommand::Flush(ack) => {
                let _ = ack.send(());
            }
            PersistCommand::Shutdown => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{InMemoryLedger, InMemoryStatusSink};
    use bay_alloc_core::location::Slot;
    use bay_alloc_model::id::{PalletId, ProjectId};
    use std::time::Instant;

    fn scan(truck: &str, pallet: &str) -> PersistJob {
        PersistJob::InsertScan(ScanInsert::new(
            "C1-1".parse().expect("location"),
            TruckId::new(truck),
            PalletId::new(pallet),
            Slot::First,
            ProjectId::default(),
        ))
    }

    fn worker(
        capacity: usize,
    ) -> (PersistenceWorker, Arc<InMemoryLedger>, Arc<InMemoryStatusSink>) {
        let ledger = Arc::new(InMemoryLedger::new());
        let sink = Arc::new(InMemoryStatusSink::new());
        let config = PersistenceConfig {
            queue_capacity: capacity,
            ..PersistenceConfig::default()
        };
        let worker = PersistenceWorker::start(&config, Arc::clone(&ledger), Arc::clone(&sink));
        (worker, ledger, sink)
    }

    #[test]
    fn test_flush_waits_for_queued_jobs() {
        let (worker, ledger, sink) = worker(0);
        assert!(worker.enqueue(scan("A", "001")));
        assert!(worker.enqueue(scan("A", "002")));
        assert!(worker.enqueue(PersistJob::MarkDelivered(TruckId::new("A"))));
        assert!(worker.enqueue(PersistJob::PropagateStatus {
            truck: TruckId::new("A"),
            status: ShipmentStatus::Delivered,
        }));
        assert!(worker.flush());

        assert_eq!(worker.pending(), 0);
        assert_eq!(
            worker.stats(),
            WorkerStats {
                pending: 0,
                completed: 4,
                failed: 0
            }
        );
        let rows = ledger.rows();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.status() == LedgerStatus::Delivered));
        assert_eq!(
            sink.status_of(&TruckId::new("A")),
            Some(ShipmentStatus::Delivered)
        );
    }

    #[test]
    fn test_ledger_flush_does_not_wait_for_status_lane() {
        let ledger = Arc::new(InMemoryLedger::new());
        let sink = Arc::new(InMemoryStatusSink::new());
        let config = PersistenceConfig {
            propagation_delay_ms: 1000,
            ..PersistenceConfig::default()
        };
        let worker = PersistenceWorker::start(&config, Arc::clone(&ledger), Arc::clone(&sink));
        assert!(worker.enqueue(PersistJob::PropagateStatus {
            truck: TruckId::new("A"),
            status: ShipmentStatus::Ready,
        }));
        assert!(worker.enqueue(scan("A", "001")));

        let started = Instant::now();
        assert!(worker.flush_ledger());
        assert!(started.elapsed() < Duration::from_millis(500));
        assert_eq!(ledger.len(), 1);
        assert_eq!(sink.status_of(&TruckId::new("A")), None);

        assert!(worker.flush());
        assert_eq!(sink.status_of(&TruckId::new("A")), Some(ShipmentStatus::Ready));
        assert_eq!(worker.pending(), 0);
    }

    #[test]
    fn test_failures_are_counted_not_raised() {
        let (worker, ledger, _sink) = worker(2);
        ledger.set_offline(true);
        for i in 0..5 {
            assert!(worker.enqueue(scan("A", &format!("{i:03}"))));
        }
        assert!(worker.flush());
        assert_eq!(worker.failed(), 5);
        assert_eq!(worker.pending(), 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_jobs_after_shutdown_are_dropped() {
        let (mut worker, ledger, _sink) = worker(0);
        assert!(worker.enqueue(scan("A", "001")));
        worker.shutdown();
        assert_eq!(ledger.len(), 1);
        assert!(!worker.enqueue(scan("A", "002")));
        assert!(!worker.flush());
        assert_eq!(worker.failed(), 1);
    }
}
