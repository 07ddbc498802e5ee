use std::hint::black_box;

use bay_alloc_engine::{
    occupancy::OccupancyStore, projector::project, selector::select_bay, slot::SlotCalculator,
};
use bay_alloc_model::{
    generator::{ScenarioGenConfig, ScenarioGenerator},
    id::{PalletId, TruckId},
    layout::BayGeometryIndex,
    ledger::{LedgerRow, LedgerStatus},
};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rand::{SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;

// ---------------- Scenario shape ----------------

const SEED: u64 = 0x0BA5_A110;

// Pallet numbers run across trucks, so a bay needs a group for every
// second pallet of the whole scenario (12 * 30 / 2 = 180).
const BAYS: u32 = 12;
const GROUPS: u32 = 180;

const TRUCKS: u32 = 12;
const PALLETS_MIN: u32 = 15;
const PALLETS_MAX: u32 = 30;

// ------------------------------------------------

struct Fixture {
    index: BayGeometryIndex,
    scans: Vec<(TruckId, PalletId)>,
}

fn fixture() -> Fixture {
    let config = ScenarioGenConfig::builder()
        .bays(BAYS)
        .groups_per_bay(GROUPS)
        .trucks(TRUCKS)
        .pallets_per_truck(PALLETS_MIN, PALLETS_MAX)
        .duplicate_scan_rate(0.0)
        .seed(SEED)
        .build()
        .expect("valid bench config");
    let scenario = ScenarioGenerator::new(config).generate();
    let index = BayGeometryIndex::from_shapes(scenario.shapes().iter().cloned());
    let scans = scenario
        .scans()
        .iter()
        .filter_map(|scan| {
            let entry = scenario.manifest().get(scan.truck())?;
            let pallet = scenario
                .packing()
                .find_by_serials(entry, scan.first_serial(), scan.last_serial())?;
            Some((scan.truck().clone(), pallet.pallet().clone()))
        })
        .collect();
    Fixture { index, scans }
}

fn register_all(store: &mut OccupancyStore, fx: &Fixture, calc: &SlotCalculator) -> usize {
    let mut placed = 0;
    for (truck, pallet) in &fx.scans {
        if store.is_scanned(truck, pallet) {
            continue;
        }
        let Some(bay) = select_bay(store, &fx.index, truck) else {
            continue;
        };
        if store.try_place(truck, pallet, bay, calc, &fx.index).is_ok() {
            store.mark_scanned(truck, pallet);
            placed += 1;
        }
    }
    placed
}

fn ledger_rows(store: &OccupancyStore, rng: &mut ChaCha8Rng) -> Vec<LedgerRow> {
    let mut rows: Vec<LedgerRow> = store
        .iter()
        .flat_map(|(loc, list)| {
            list.iter().map(move |a| {
                LedgerRow::new(
                    a.truck().clone(),
                    a.pallet().clone(),
                    Some(loc.to_string()),
                    Some(a.slot().value()),
                    LedgerStatus::Scanned,
                )
            })
        })
        .collect();
    rows.shuffle(rng);
    rows
}

fn bench_occupancy(c: &mut Criterion) {
    let fx = fixture();
    let calc = SlotCalculator::default();

    c.bench_function("register_generated_scans", |b| {
        b.iter_batched(
            OccupancyStore::new,
            |mut store| black_box(register_all(&mut store, &fx, &calc)),
            BatchSize::SmallInput,
        )
    });

    let mut filled = OccupancyStore::new();
    register_all(&mut filled, &fx, &calc);
    let mut rng = ChaCha8Rng::seed_from_u64(SEED ^ 0xBEEF);
    let rows = ledger_rows(&filled, &mut rng);

    c.bench_function("reconcile_shuffled_ledger", |b| {
        b.iter_batched(
            || rows.clone(),
            |rows| {
                let mut store = OccupancyStore::new();
                black_box(store.reconcile(rows))
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("project_full_layout", |b| {
        b.iter(|| black_box(project(&filled, &fx.index).len()))
    });
}

criterion_group!(occupancy, bench_occupancy);
criterion_main!(occupancy);
