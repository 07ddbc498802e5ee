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

//! Seeded synthetic scenarios: a bay layout, a shipment manifest, the
//! matching packing list and a stream of dock scans.

mod config;
mod err;

pub use config::{ScenarioGenConfig, ScenarioGenConfigBuilder};
pub use err::{InvalidRangeError, ScenarioGenConfigError};

use crate::{
    id::TruckId,
    layout::ShapeDescriptor,
    manifest::{CartonRow, Manifest, ManifestEntry, PackingList},
};
use bay_alloc_core::{
    geometry::{Rect, ShapeKind},
    location::BayPrefix,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A pair of serial numbers read off a pallet's first and last carton.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanEvent {
    truck: TruckId,
    first_serial: String,
    last_serial: String,
}

impl ScanEvent {
    #[inline]
    pub fn new(
        truck: TruckId,
        first_serial: impl Into<String>,
        last_serial: impl Into<String>,
    ) -> Self {
        Self {
            truck,
            first_serial: first_serial.into(),
            last_serial: last_serial.into(),
        }
    }

    #[inline]
    pub fn truck(&self) -> &TruckId {
        &self.truck
    }

    #[inline]
    pub fn first_serial(&self) -> &str {
        &self.first_serial
    }

    #[inline]
    pub fn last_serial(&self) -> &str {
        &self.last_serial
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    shapes: Vec<ShapeDescriptor>,
    manifest: Manifest,
    packing: PackingList,
    scans: Vec<ScanEvent>,
}

impl Scenario {
    #[inline]
    pub fn shapes(&self) -> &[ShapeDescriptor] {
        &self.shapes
    }

    #[inline]
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    #[inline]
    pub fn packing(&self) -> &PackingList {
        &self.packing
    }

    #[inline]
    pub fn scans(&self) -> &[ScanEvent] {
        &self.scans
    }
}

pub struct ScenarioGenerator {
    config: ScenarioGenConfig,
    rng: ChaCha8Rng,
}

impl From<ScenarioGenConfig> for ScenarioGenerator {
    fn from(config: ScenarioGenConfig) -> Self {
        Self::new(config)
    }
}

impl ScenarioGenerator {
    pub fn new(config: ScenarioGenConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed()),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &ScenarioGenConfig {
        &self.config
    }

    #[inline]
    fn sample(&mut self, (min, max): (u32, u32)) -> u32 {
        if min >= max {
            min
        } else {
            self.rng.random_range(min..=max)
        }
    }

    /// One rectangle and one text label per location, bays laid out as
    /// columns with half a cell of aisle between them.
    fn layout(&self) -> Vec<ShapeDescriptor> {
        let (w, h) = self.config.cell();
        let letter = self.config.bay_letter();
        let mut shapes = Vec::new();
        for number in 1..=self.config.bays() {
            let Some(bay) = BayPrefix::new(letter, number) else {
                continue;
            };
            let x = f64::from(number - 1) * w * 1.5;
            for group in 1..=self.config.groups_per_bay() {
                let id = bay.location(group).to_string();
                let rect = Rect::new(x, f64::from(group - 1) * h, w, h);
                shapes.push(ShapeDescriptor::new(id.clone(), ShapeKind::Text, rect));
                shapes.push(ShapeDescriptor::new(id, ShapeKind::Rect, rect));
            }
        }
        shapes.push(ShapeDescriptor::new(
            "LEGEND",
            ShapeKind::Text,
            Rect::new(0.0, -2.0 * h, 3.0 * w, h),
        ));
        shapes
    }

    /// Produces the next scenario. Successive calls continue the same
    /// random stream.
    pub fn generate(&mut self) -> Scenario {
        let shapes = self.layout();

        let mut entries = Vec::new();
        let mut cartons = Vec::new();
        let mut queues: Vec<VecDeque<ScanEvent>> = Vec::new();
        let mut next_pallet = 1u32;

        for t in 1..=self.config.trucks() {
            let truck = TruckId::new(format!("T-{t:03}"));
            let pallets = self.sample(self.config.pallets_per_truck());
            let first_pallet = next_pallet;
            let mut queue = VecDeque::new();

            for _ in 0..pallets {
                let pallet = format!("{next_pallet:03}");
                let boxes = self.sample(self.config.boxes_per_pallet());
                let serial = |b: u32| format!("SN{next_pallet:03}{b:03}");
                for b in 1..=boxes {
                    cartons.push(CartonRow::new(
                        (b == 1).then(|| pallet.clone()),
                        Some(b.to_string()),
                        Some(serial(b)),
                    ));
                }
                queue.push_back(ScanEvent::new(truck.clone(), serial(1), serial(boxes)));
                next_pallet += 1;
            }

            entries.push(ManifestEntry::new(
                truck,
                format!("{first_pallet:03}"),
                format!("{:03}", next_pallet - 1),
                None,
            ));
            queues.push(queue);
        }

        let scans = self.interleave(queues);
        let packing = PackingList::aggregate(cartons);

        tracing::debug!(
            trucks = entries.len(),
            pallets = packing.pallets().len(),
            scans = scans.len(),
            "generated scenario"
        );

        Scenario {
            shapes,
            manifest: Manifest::new(entries),
            packing,
            scans,
        }
    }

    /// Merges per-truck scan queues into one stream, keeping each truck's
    /// own order and occasionally repeating the previous scan.
    fn interleave(&mut self, mut queues: Vec<VecDeque<ScanEvent>>) -> Vec<ScanEvent> {
        let rate = self.config.duplicate_scan_rate();
        let mut out: Vec<ScanEvent> = Vec::new();
        queues.retain(|q| !q.is_empty());
        while !queues.is_empty() {
            let i = self.rng.random_range(0..queues.len());
            if let Some(event) = queues[i].pop_front() {
                out.push(event);
            }
            if queues[i].is_empty() {
                queues.swap_remove(i);
            }
            if rate > 0.0
                && self.rng.random_bool(rate)
                && let Some(last) = out.last().cloned()
            {
                out.push(last);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::BayGeometryIndex;
    use std::collections::BTreeSet;

    fn small() -> ScenarioGenConfig {
        ScenarioGenConfig::builder()
            .bays(3)
            .groups_per_bay(6)
            .trucks(4)
            .pallets_per_truck(2, 5)
            .boxes_per_pallet(1, 4)
            .duplicate_scan_rate(0.0)
            .seed(7)
            .build()
            .expect("valid config")
    }

    #[test]
    fn test_generation_is_deterministic_for_a_seed() {
        let a = ScenarioGenerator::new(small()).generate();
        let b = ScenarioGenerator::new(small()).generate();
        assert_eq!(a, b);
    }

    #[test]
    fn test_layout_indexes_every_location() {
        let scenario = ScenarioGenerator::new(small()).generate();
        let index = BayGeometryIndex::from_shapes(scenario.shapes().iter().cloned());
        assert_eq!(index.len(), 18);
        assert_eq!(index.bay_numbers(), BTreeSet::from([1, 2, 3]));
        let loc = "C2-1".parse().expect("location");
        assert_eq!(index.geometry(&loc).map(|g| g.kind()), Some(ShapeKind::Rect));
    }

    #[test]
    fn test_every_scan_resolves_to_a_pallet_of_its_truck() {
        let scenario = ScenarioGenerator::new(small()).generate();
        assert_eq!(scenario.scans().len(), scenario.packing().pallets().len());
        for scan in scenario.scans() {
            let entry = scenario.manifest().get(scan.truck()).expect("truck in manifest");
            assert!(
                scenario
                    .packing()
                    .find_by_serials(entry, scan.first_serial(), scan.last_serial())
                    .is_some()
            );
        }
    }

    #[test]
    fn test_pallet_numbers_are_consecutive_across_trucks() {
        let scenario = ScenarioGenerator::new(small()).generate();
        let numbers: Vec<u32> = scenario
            .packing()
            .pallets()
            .iter()
            .map(|p| p.pallet().as_str().parse().expect("numeric"))
            .collect();
        let expected: Vec<u32> = (1..=numbers.len() as u32).collect();
        assert_eq!(numbers, expected);
        let entries = scenario.manifest().entries();
        assert_eq!(entries[0].truck_id().as_str(), "T-001");
        assert_eq!(entries[0].pallet_range_start(), "001");
    }

    #[test]
    fn test_duplicate_rate_repeats_scans() {
        let config = ScenarioGenConfig::builder()
            .duplicate_scan_rate(1.0)
            .trucks(2)
            .pallets_per_truck(3, 3)
            .build()
            .expect("valid config");
        let scenario = ScenarioGenerator::new(config).generate();
        assert_eq!(scenario.scans().len(), 12);
        assert_eq!(scenario.scans()[0], scenario.scans()[1]);
    }
}
