//! Unit tests for crowd-gen.

use crowd_agent::AgentProfile;
use crowd_core::{SimRng, Vec2};

use crate::{
    AgentGenerator, ConstantRateGenerator, ExplicitGenerator, ExternalGenerator,
    InitialStateSelector, PersistentGenerator, ProfileSelector, RectGridGenerator, SpawnNoise,
    TimedGenerator,
};

fn rng() -> SimRng {
    SimRng::new(7)
}

// ── Bulk generators ──────────────────────────────────────────────────────────

#[cfg(test)]
mod bulk_tests {
    use super::*;

    #[test]
    fn explicit_generator_returns_listed_positions() {
        let positions = vec![Vec2::ZERO, Vec2::new(1.0, 2.0), Vec2::new(-3.0, 0.5)];
        let generator = ExplicitGenerator::new(positions.clone());
        let mut rng = rng();
        assert_eq!(generator.agent_count(), 3);
        for (i, &p) in positions.iter().enumerate() {
            assert_eq!(generator.position(i, &mut rng), p); // no noise configured
            assert_eq!(generator.orientation(i, &mut rng), Vec2::UNIT_Y);
        }
    }

    #[test]
    #[should_panic(expected = "beyond population")]
    fn explicit_generator_overrun_panics() {
        let generator = ExplicitGenerator::new(vec![Vec2::ZERO]);
        let _ = generator.position(1, &mut rng());
    }

    #[test]
    fn grid_generator_lays_out_lattice() {
        let generator = RectGridGenerator::new(Vec2::new(10.0, 0.0), 1.0, 2.0, 3, 2);
        let mut rng = rng();
        assert_eq!(generator.agent_count(), 6);
        assert_eq!(generator.position(0, &mut rng), Vec2::new(10.0, 0.0));
        assert_eq!(generator.position(2, &mut rng), Vec2::new(12.0, 0.0));
        assert_eq!(generator.position(3, &mut rng), Vec2::new(10.0, 2.0)); // second row
    }

    #[test]
    fn grid_rotation_spins_lattice_about_anchor() {
        let generator = RectGridGenerator::new(Vec2::ZERO, 1.0, 1.0, 2, 1)
            .with_rotation(std::f32::consts::FRAC_PI_2);
        let mut rng = rng();
        let p = generator.position(1, &mut rng);
        assert!(p.x.abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn noise_stays_within_bounds_and_is_seeded() {
        let noise = SpawnNoise::position(0.5);
        let generator = ExplicitGenerator::new(vec![Vec2::ZERO]).with_noise(noise);

        let mut a = SimRng::new(11);
        let mut b = SimRng::new(11);
        for _ in 0..100 {
            let pa = generator.position(0, &mut a);
            let pb = generator.position(0, &mut b);
            assert_eq!(pa, pb, "same seed, same noise");
            assert!(pa.length() <= 0.5 + 1e-5, "noise exceeded bound: {pa}");
        }
    }

    #[test]
    fn orientation_noise_preserves_unit_length() {
        let noise = SpawnNoise { radius: 0.0, angle: 0.5 };
        let mut rng = rng();
        for _ in 0..50 {
            let o = noise.apply_orientation(Vec2::UNIT_Y, &mut rng);
            assert!((o.length() - 1.0).abs() < 1e-5);
        }
    }
}

// ── Persistent generators ────────────────────────────────────────────────────

#[cfg(test)]
mod persistent_tests {
    use super::*;

    #[test]
    fn constant_rate_fires_every_interval() {
        let mut generator = ConstantRateGenerator::new(Vec2::ZERO, 1.0, 3);
        let mut fired = Vec::new();
        // 25 steps of 0.1 s: the interval elapses at steps 10 and 20.
        for step in 1..=25 {
            if generator.should_generate(0.1) {
                fired.push(step);
                assert_eq!(generator.spawn_rate(), 3);
            }
        }
        assert_eq!(fired, vec![10, 20]);
        assert_eq!(generator.agent_count(), 6);
    }

    #[test]
    fn timed_schedule_fires_each_entry_once() {
        // Schedule {1.0s: 5, 2.5s: 3} at dt = 0.5 fires exactly once at
        // t=1.0 (count 5) and once at t=2.5 (count 3), and is false at all
        // other polls including the one right after consumption.
        let template = RectGridGenerator::new(Vec2::ZERO, 0.5, 0.5, 5, 2);
        let mut generator = TimedGenerator::new(template, vec![(1.0, 5), (2.5, 3)]);

        let mut events = Vec::new();
        for step in 1..=10 {
            // t = step * 0.5
            if generator.should_generate(0.5) {
                events.push((step, generator.spawn_rate()));
            }
        }
        assert_eq!(events, vec![(2, 5), (5, 3)]);
        assert_eq!(generator.agent_count(), 8);
    }

    #[test]
    fn timed_schedule_unsorted_input_fires_in_time_order() {
        let template = RectGridGenerator::new(Vec2::ZERO, 0.5, 0.5, 4, 1);
        let mut generator = TimedGenerator::new(template, vec![(2.0, 1), (0.5, 4)]);
        let mut counts = Vec::new();
        for _ in 0..8 {
            if generator.should_generate(0.5) {
                counts.push(generator.spawn_rate());
            }
        }
        assert_eq!(counts, vec![4, 1]);
    }

    #[test]
    fn external_generator_spawns_pushed_slots_once() {
        let mut generator = ExternalGenerator::new();
        assert!(!generator.should_generate(0.1), "no slots, no spawn");

        generator.push_position(Vec2::new(1.0, 0.0));
        generator.push_slot(Vec2::new(2.0, 0.0), Vec2::new(1.0, 0.0));

        assert!(generator.should_generate(0.1));
        assert_eq!(generator.spawn_rate(), 2);
        let mut rng = rng();
        assert_eq!(generator.position(0, &mut rng), Vec2::new(1.0, 0.0));
        assert_eq!(generator.orientation(0, &mut rng), Vec2::UNIT_Y);
        assert_eq!(generator.position(1, &mut rng), Vec2::new(2.0, 0.0));
        assert_eq!(generator.orientation(1, &mut rng), Vec2::new(1.0, 0.0));

        // Consumed: no re-fire until pushed or triggered again.
        assert!(!generator.should_generate(0.1));
    }

    #[test]
    fn external_generator_trigger_rearms_full_list() {
        let mut generator = ExternalGenerator::new();
        generator.push_position(Vec2::ZERO);
        generator.push_position(Vec2::UNIT_Y);
        assert!(generator.should_generate(0.1));
        assert_eq!(generator.spawn_rate(), 2);
        assert!(!generator.should_generate(0.1));

        generator.trigger();
        assert!(generator.should_generate(0.1));
        assert_eq!(generator.spawn_rate(), 2);
        assert_eq!(generator.agent_count(), 4);
    }

    #[test]
    fn external_generator_late_pushes_spawn_incrementally() {
        let mut generator = ExternalGenerator::new();
        generator.push_position(Vec2::ZERO);
        assert!(generator.should_generate(0.1));

        // A slot pushed after consumption spawns alone on the next poll.
        generator.push_position(Vec2::new(5.0, 0.0));
        assert!(generator.should_generate(0.1));
        assert_eq!(generator.spawn_rate(), 1);
        let mut rng = rng();
        assert_eq!(generator.position(0, &mut rng), Vec2::new(5.0, 0.0));
    }

    #[test]
    fn external_generator_clear_disarms() {
        let mut generator = ExternalGenerator::new();
        generator.push_position(Vec2::ZERO);
        generator.clear_slots();
        assert!(!generator.should_generate(0.1));
        assert_eq!(generator.slot_count(), 0);
    }
}

// ── Selectors ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod selector_tests {
    use super::*;

    #[test]
    fn const_profile_selector_always_same() {
        let selector = ProfileSelector::constant(AgentProfile { radius: 0.33, ..AgentProfile::default() });
        let mut rng = rng();
        for _ in 0..10 {
            assert_eq!(selector.pick(&mut rng).radius, 0.33);
        }
    }

    #[test]
    fn weighted_profile_selector_covers_all_choices() {
        let a = AgentProfile { radius: 0.1, ..AgentProfile::default() };
        let b = AgentProfile { radius: 0.2, ..AgentProfile::default() };
        let selector = ProfileSelector::Weighted(vec![
            (std::sync::Arc::new(a), 1.0),
            (std::sync::Arc::new(b), 1.0),
        ]);
        let mut rng = rng();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert((selector.pick(&mut rng).radius * 10.0) as i32);
        }
        assert_eq!(seen.len(), 2, "both profiles should be picked over 200 draws");
    }

    #[test]
    fn state_selector_reports_possible_states() {
        let s = InitialStateSelector::Weighted(vec![("walk".into(), 0.7), ("idle".into(), 0.3)]);
        assert_eq!(s.possible_states(), vec!["walk", "idle"]);
        assert_eq!(InitialStateSelector::constant("walk").possible_states(), vec!["walk"]);
    }

    #[test]
    fn state_selector_picks_deterministically_by_seed() {
        let s = InitialStateSelector::Weighted(vec![("a".into(), 0.5), ("b".into(), 0.5)]);
        let picks1: Vec<String> = {
            let mut rng = SimRng::new(3);
            (0..20).map(|_| s.pick(&mut rng).to_string()).collect()
        };
        let picks2: Vec<String> = {
            let mut rng = SimRng::new(3);
            (0..20).map(|_| s.pick(&mut rng).to_string()).collect()
        };
        assert_eq!(picks1, picks2);
    }
}
