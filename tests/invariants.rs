use std::collections::BTreeMap;

use proptest::prelude::*;
use wildgrid::{
    clock::{Clock, DAYS_PER_MONTH, HOURS_PER_DAY, MONTHS_PER_YEAR},
    entity::VitalSigns,
    map::{MapGenerator, TilePos},
    resources::{ResourceKind, ResourceLedger, ResourceNode},
    terrain, EngineBuilder, EngineSettings,
};

#[derive(Debug, Clone)]
enum LedgerOp {
    Consume(f64),
    Update(f64),
}

fn ledger_op() -> impl Strategy<Value = LedgerOp> {
    prop_oneof![
        (-50.0f64..300.0).prop_map(LedgerOp::Consume),
        (0.0f64..6_000.0).prop_map(LedgerOp::Update),
    ]
}

proptest! {
    #[test]
    fn noise_stays_in_unit_interval(x in -1_000.0f64..1_000.0, y in -1_000.0f64..1_000.0, seed in any::<u64>()) {
        let n = terrain::noise(x, y, seed);
        prop_assert!((0.0..1.0).contains(&n), "noise {n} out of range");
    }

    #[test]
    fn tiles_are_a_pure_function_of_seed(seed in any::<u64>(), x in 0u32..64, y in 0u32..64) {
        let generator = MapGenerator::new(seed);
        prop_assert_eq!(generator.tile_at(x, y), MapGenerator::new(seed).tile_at(x, y));
    }

    #[test]
    fn vitals_stay_bounded(
        start in (-50.0f64..150.0, -50.0f64..150.0, -50.0f64..150.0),
        deltas in proptest::collection::vec((-80.0f64..80.0, -80.0f64..80.0, -80.0f64..80.0, any::<bool>()), 0..40),
    ) {
        let mut vitals = VitalSigns::new(start.0, start.1, start.2);
        for (health, energy, hunger, resting) in deltas {
            vitals.adjust_health(health);
            vitals.adjust_energy(energy);
            vitals.adjust_hunger(hunger);
            vitals.update(resting);
            for value in [vitals.health(), vitals.energy(), vitals.hunger()] {
                prop_assert!((0.0..=100.0).contains(&value));
            }
        }
    }

    #[test]
    fn ledger_amounts_stay_within_capacity(ops in proptest::collection::vec(ledger_op(), 0..60)) {
        let tile = TilePos::new(2, 3);
        let mut ledger = ResourceLedger::default();
        let water = ledger.definition(ResourceKind::Water).unwrap().clone();
        ledger.insert(ResourceNode::full(&water, tile)).unwrap();

        for op in ops {
            let before = ledger.get(tile, ResourceKind::Water).unwrap().amount;
            match op {
                LedgerOp::Consume(requested) => {
                    let taken = ledger.consume(tile, ResourceKind::Water, requested);
                    prop_assert!(taken >= 0.0 && taken <= before);
                }
                LedgerOp::Update(delta) => {
                    ledger.update(delta).unwrap();
                }
            }
            let node = ledger.get(tile, ResourceKind::Water).unwrap();
            prop_assert!(node.amount >= 0.0 && node.amount <= node.max_amount);
        }
    }

    #[test]
    fn calendar_fields_stay_in_range(deltas in proptest::collection::vec(0.0f64..200_000.0, 1..30), scale in 0.0f64..10.0) {
        let mut clock = Clock::new();
        for delta in deltas {
            let state = clock.update(delta, scale).unwrap();
            prop_assert!(state.hour_of_day >= 0.0 && state.hour_of_day < HOURS_PER_DAY);
            prop_assert!((1..=DAYS_PER_MONTH).contains(&state.day));
            prop_assert!((1..=MONTHS_PER_YEAR).contains(&state.month));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn engine_runs_replay_for_any_seed(seed in any::<u64>()) {
        let run = || {
            let mut engine = EngineBuilder::new(EngineSettings { seed, ..EngineSettings::default() })
                .with_core_systems()
                .build()
                .unwrap();
            let counts = BTreeMap::from([("deer".to_string(), 4), ("raccoon".to_string(), 4)]);
            engine.spawn_entities(&counts).unwrap();
            engine.run_fixed(60, 16.0, |_, _| {}).unwrap();
            (engine.entities(), engine.resources())
        };
        let (entities_a, resources_a) = run();
        let (entities_b, resources_b) = run();
        prop_assert_eq!(entities_a, entities_b);
        prop_assert_eq!(resources_a, resources_b);
    }
}
