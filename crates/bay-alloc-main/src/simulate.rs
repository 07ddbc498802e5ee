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

//! Drives a full session over a generated scenario: every scan goes
//! through the registrar, a truck is delivered as soon as its last pallet
//! is placed, and scans refused for lack of a bay are retried after the
//! next delivery.

use std::{collections::VecDeque, sync::Arc, time::Instant};

use bay_alloc_engine::{
    error::{ReconcileError, ScanError},
    finalizer::DeliveryReport,
    ledger::{InMemoryLedger, InMemoryStatusSink},
    persist::WorkerStats,
    projector::{RenderItem, VisualState},
    session::Session,
};
use bay_alloc_model::{
    generator::{ScanEvent, ScenarioGenerator},
    layout::BayGeometryIndex,
};
use serde::Serialize;
use thiserror::Error;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ScanTally {
    pub registered: usize,
    pub duplicates: usize,
    pub after_delivery: usize,
    pub deferred: usize,
    pub unplaced: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StateCounts {
    pub free: usize,
    pub bay_in_use: usize,
    pub occupied: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub seed: u64,
    pub trucks: usize,
    pub pallets: usize,
    pub locations: usize,
    pub scans: usize,
    pub tally: ScanTally,
    pub deliveries: Vec<DeliveryReport>,
    pub peak_states: StateCounts,
    pub final_layout: Vec<RenderItem>,
    pub worker: WorkerStats,
    pub elapsed_ms: u128,
}

fn count_states(items: &[RenderItem]) -> StateCounts {
    items.iter().fold(StateCounts::default(), |mut acc, item| {
        match item.state {
            VisualState::Free => acc.free += 1,
            VisualState::BayInUse => acc.bay_in_use += 1,
            VisualState::Occupied => acc.occupied += 1,
        }
        acc
    })
}

pub fn run(config: &AppConfig) -> Result<SimulationReport, SimulationError> {
    let started = Instant::now();
    let scenario = ScenarioGenerator::new(config.scenario.clone()).generate();
    let index = BayGeometryIndex::from_shapes(scenario.shapes().iter().cloned());
    let manifest = scenario.manifest();
    let packing = scenario.packing();

    let ledger = Arc::new(InMemoryLedger::new());
    let sink = Arc::new(InMemoryStatusSink::new());
    let mut session = Session::open(config.engine.clone(), index, ledger, sink)?;

    let mut tally = ScanTally::default();
    let mut deliveries = Vec::new();
    let mut peak = StateCounts::default();
    let mut queue: VecDeque<ScanEvent> = scenario.scans().iter().cloned().collect();
    let mut waiting: Vec<ScanEvent> = Vec::new();

    while let Some(scan) = queue.pop_front() {
        let Some(entry) = manifest.get(scan.truck()) else {
            tracing::warn!(truck = %scan.truck(), "scan for a truck missing from the manifest");
            tally.failed += 1;
            continue;
        };
        match session.register_serials(entry, packing, scan.first_serial(), scan.last_serial()) {
            Ok(_) => tally.registered += 1,
            Err(ScanError::DuplicateScan(_)) => {
                tally.duplicates += 1;
                continue;
            }
            Err(ScanError::TruckDelivered(_)) => {
                tally.after_delivery += 1;
                continue;
            }
            Err(ScanError::NoBaySpace(_)) => {
                tally.deferred += 1;
                waiting.push(scan);
                continue;
            }
            Err(err) => {
                tracing::warn!(error = %err, "scan rejected");
                tally.failed += 1;
                continue;
            }
        }

        let current = count_states(&session.render_items());
        if current.occupied > peak.occupied {
            peak = current;
        }

        if !session.progress(entry, packing).is_complete() {
            continue;
        }
        session.announce_ready(entry.truck_id());
        match session.deliver(entry.truck_id()) {
            Ok(report) => deliveries.push(report),
            Err(err) => {
                tracing::warn!(truck = %entry.truck_id(), error = %err, "delivery failed");
            }
        }
        queue.extend(waiting.drain(..));
    }
    tally.unplaced = waiting.len();

    session.flush();
    let final_layout = session.render_items();
    let report = SimulationReport {
        seed: config.scenario.seed(),
        trucks: manifest.entries().len(),
        pallets: packing.pallets().len(),
        locations: session.index().len(),
        scans: scenario.scans().len(),
        tally,
        deliveries,
        peak_states: peak,
        final_layout,
        worker: session.worker_stats(),
        elapsed_ms: started.elapsed().as_millis(),
    };
    tracing::info!(
        registered = report.tally.registered,
        delivered = report.deliveries.len(),
        unplaced = report.tally.unplaced,
        "simulation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bay_alloc_model::generator::ScenarioGenConfig;

    fn config(seed: u64) -> AppConfig {
        AppConfig {
            scenario: ScenarioGenConfig::builder()
                .bays(2)
                .groups_per_bay(12)
                .trucks(4)
                .pallets_per_truck(2, 6)
                .boxes_per_pallet(1, 3)
                .duplicate_scan_rate(0.2)
                .seed(seed)
                .build()
                .unwrap(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_every_truck_is_loaded_and_delivered() {
        let report = run(&config(3)).unwrap();
        assert_eq!(report.trucks, 4);
        assert_eq!(report.tally.registered, report.pallets);
        assert_eq!(report.tally.unplaced, 0);
        assert_eq!(report.tally.failed, 0);
        assert_eq!(report.deliveries.len(), 4);
        assert!(report.deliveries.iter().all(|d| d.ledger_confirmed));
        assert_eq!(report.worker.failed, 0);
        assert_eq!(report.worker.pending, 0);
        assert!(report.final_layout.iter().all(|i| i.state == VisualState::Free));
        assert!(report.peak_states.occupied > 0);
    }

    #[test]
    fn test_report_serializes() {
        let report = run(&config(11)).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["trucks"].as_u64(), Some(4));
        assert!(json["final_layout"].as_array().is_some_and(|a| a.len() == 24));
    }
}
