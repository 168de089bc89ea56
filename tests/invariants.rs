//! Property tests for the invariants that must hold after every update

use proptest::prelude::*;

use swimwatch::core::types::Vec2;
use swimwatch::simulation::dwell::DwellChange;
use swimwatch::spatial::{cell_of, CellCoord};
use swimwatch::{SimulationConfig, VerticalOrigin, World};

fn origin_strategy() -> impl Strategy<Value = VerticalOrigin> {
    prop_oneof![Just(VerticalOrigin::Bottom), Just(VerticalOrigin::Top)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn cell_of_is_total(
        x in -1_000.0f32..2_000.0,
        y in -1_000.0f32..2_000.0,
        width in 1.0f32..1_000.0,
        height in 1.0f32..1_000.0,
        rows in 1u32..12,
        cols in 1u32..12,
        origin in origin_strategy(),
    ) {
        let cell = cell_of(x, y, width, height, rows, cols, origin);
        prop_assert!(cell.row < rows);
        prop_assert!(cell.col < cols);
    }

    #[test]
    fn positions_stay_inside_margins(
        seed in any::<u64>(),
        swimmers in 1usize..=10,
        steps in proptest::collection::vec(1u64..400, 1..200),
    ) {
        let config = SimulationConfig {
            seed,
            initial_population: swimmers,
            speed_min: 50.0,
            speed_max: 400.0,
            ..Default::default()
        };
        let mut world = World::new(config).unwrap();
        let bounds = world.bounds();
        let margin = world.config.margin;

        let mut now = 0;
        for step in steps {
            now += step;
            world.on_tick(now);
            for s in world.swimmers.iter() {
                prop_assert!(
                    bounds.contains(s.position, margin),
                    "swimmer {} escaped to {:?}", s.id, s.position
                );
            }
        }
    }

    #[test]
    fn alerted_swimmers_never_move(
        seed in any::<u64>(),
        steps in proptest::collection::vec(1u64..500, 1..200),
    ) {
        let config = SimulationConfig {
            seed,
            initial_population: 6,
            spontaneous_alert_chance: 0.01,
            alert_threshold_ms: 2_000,
            ..Default::default()
        };
        let mut world = World::new(config).unwrap();

        let mut now = 0;
        for step in steps {
            let before: Vec<(u32, Vec2, bool)> = world
                .swimmers
                .iter()
                .map(|s| (s.id.0, s.position, s.is_alerted()))
                .collect();

            now += step;
            world.on_tick(now);

            for s in world.swimmers.iter() {
                prop_assert!(!(s.is_alerted() && s.is_moving()));
                prop_assert_eq!(s.is_alerted(), s.alert_id.is_some());
            }
            for (id, pos, was_alerted) in before {
                if was_alerted {
                    let s = world.get(swimwatch::core::types::EntityId(id)).unwrap();
                    prop_assert_eq!(s.position, pos);
                }
            }
        }
    }

    #[test]
    fn dwell_resets_exactly_on_cell_change(
        cells in proptest::collection::vec((0u32..3, 0u32..3), 1..60),
    ) {
        use swimwatch::entity::Swimmer;
        use swimwatch::core::types::EntityId;
        use swimwatch::simulation::dwell::observe;

        let mut s = Swimmer::new(EntityId(1), Vec2::new(0.0, 0.0), 0.0, 0.0, CellCoord::new(0, 0));
        observe(&mut s, CellCoord::new(0, 0), 0, true);

        let mut now = 0;
        let mut residence = 0;
        for (row, col) in cells {
            now += 250;
            let cell = CellCoord::new(row, col);
            let changed = cell != s.cell;
            let change = observe(&mut s, cell, now, true);
            if changed {
                residence = now;
                prop_assert!(matches!(change, DwellChange::Entered { .. }), "expected Entered");
                prop_assert_eq!(s.dwell_ms, 0);
            } else {
                prop_assert!(matches!(change, DwellChange::Stayed { .. }), "expected Stayed");
                prop_assert_eq!(s.dwell_ms, now - residence);
            }
        }
    }
}
