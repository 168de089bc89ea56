//! Motion model - position integration, wall bounces and wandering
//!
//! A swimmer alternates between moving and paused phases of random length.
//! While moving it travels along its heading and bounces off the area edges.
//! Alerted swimmers are frozen: none of this runs for them.

use rand::Rng;
use std::f32::consts::{PI, TAU};

use crate::core::config::SimulationConfig;
use crate::core::types::{Bounds, Millis, Vec2};
use crate::entity::swimmer::{MotionStatus, Swimmer};

/// Uniformly random heading in `[0, 2π)`
pub fn random_heading<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen_range(0.0..TAU)
}

/// Draw a speed from the configured range, scaled by the global factor
pub fn draw_speed<R: Rng + ?Sized>(config: &SimulationConfig, factor: f32, rng: &mut R) -> f32 {
    let base = if config.speed_max > config.speed_min {
        rng.gen_range(config.speed_min..=config.speed_max)
    } else {
        config.speed_min
    };
    base * factor
}

fn draw_duration<R: Rng + ?Sized>(min: Millis, max: Millis, rng: &mut R) -> Millis {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

/// Advance a moving swimmer by `elapsed_ms`
///
/// Displacement is `speed * elapsed / 1000` along the heading. Crossing
/// `margin` or `bound - margin` clamps to the edge and turns the heading
/// component perpendicular to that edge back inward. Returns true if the
/// position changed.
pub fn advance<R: Rng + ?Sized>(
    swimmer: &mut Swimmer,
    elapsed_ms: Millis,
    bounds: Bounds,
    config: &SimulationConfig,
    rng: &mut R,
) -> bool {
    if !swimmer.is_moving() || swimmer.is_alerted() {
        return false;
    }

    let distance = swimmer.speed * elapsed_ms as f32 / 1000.0;
    let mut dir = swimmer.direction();
    let start = swimmer.position;
    let mut pos = start + dir * distance;

    let margin = config.margin;
    let (lo_x, hi_x) = (margin, bounds.width - margin);
    let (lo_y, hi_y) = (margin, bounds.height - margin);

    // Sign each axis must have after a bounce, 0.0 = untouched
    let mut push_x = 0.0;
    let mut push_y = 0.0;

    if pos.x < lo_x {
        pos.x = lo_x;
        push_x = 1.0;
    } else if pos.x > hi_x {
        pos.x = hi_x;
        push_x = -1.0;
    }

    if pos.y < lo_y {
        pos.y = lo_y;
        push_y = 1.0;
    } else if pos.y > hi_y {
        pos.y = hi_y;
        push_y = -1.0;
    }

    if push_x != 0.0 || push_y != 0.0 {
        if push_x != 0.0 {
            dir.x = dir.x.abs() * push_x;
        }
        if push_y != 0.0 {
            dir.y = dir.y.abs() * push_y;
        }

        let mut heading = dir.y.atan2(dir.x);
        if config.reflect_jitter > 0.0 {
            heading += rng.gen_range(-config.reflect_jitter..=config.reflect_jitter);
        }
        swimmer.heading = keep_inward(heading, push_x, push_y);
    }

    if rng.gen_bool(config.wander_chance) && config.wander_max_delta > 0.0 {
        swimmer.heading = normalize_angle(
            swimmer.heading + rng.gen_range(-config.wander_max_delta..=config.wander_max_delta),
        );
    }

    swimmer.position = pos;
    pos != start
}

/// Re-apply bounce signs after jitter so the swimmer never heads back into the wall
fn keep_inward(heading: f32, push_x: f32, push_y: f32) -> f32 {
    let mut dir = Vec2::from_angle(heading);
    if push_x != 0.0 {
        dir.x = dir.x.abs() * push_x;
    }
    if push_y != 0.0 {
        dir.y = dir.y.abs() * push_y;
    }
    normalize_angle(dir.y.atan2(dir.x))
}

/// Wrap an angle into `[-π, π)`
pub fn normalize_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Run the moving/paused oscillation
///
/// After a moving phase ends the swimmer pauses; after a pause it picks a
/// fresh random heading and moves again.
pub fn update_phase<R: Rng + ?Sized>(
    swimmer: &mut Swimmer,
    now: Millis,
    config: &SimulationConfig,
    rng: &mut R,
) {
    if swimmer.is_alerted() {
        return;
    }

    match swimmer.phase_until {
        None => {
            let span = match swimmer.motion {
                MotionStatus::Moving => {
                    draw_duration(config.move_duration_min_ms, config.move_duration_max_ms, rng)
                }
                MotionStatus::Paused => {
                    draw_duration(config.pause_duration_min_ms, config.pause_duration_max_ms, rng)
                }
            };
            swimmer.phase_until = Some(now + span);
        }
        Some(until) if now >= until => match swimmer.motion {
            MotionStatus::Moving => {
                swimmer.motion = MotionStatus::Paused;
                let pause =
                    draw_duration(config.pause_duration_min_ms, config.pause_duration_max_ms, rng);
                swimmer.phase_until = Some(now + pause);
            }
            MotionStatus::Paused => {
                swimmer.heading = random_heading(rng);
                swimmer.motion = MotionStatus::Moving;
                let span =
                    draw_duration(config.move_duration_min_ms, config.move_duration_max_ms, rng);
                swimmer.phase_until = Some(now + span);
            }
        },
        Some(_) => {}
    }
}

/// Redraw speed every `speed_redraw_interval_ms` using the current factor
pub fn maybe_redraw_speed<R: Rng + ?Sized>(
    swimmer: &mut Swimmer,
    now: Millis,
    config: &SimulationConfig,
    speed_factor: f32,
    rng: &mut R,
) {
    if swimmer.is_alerted() {
        return;
    }

    match swimmer.next_speed_redraw {
        None => swimmer.next_speed_redraw = Some(now + config.speed_redraw_interval_ms),
        Some(due) if now >= due => {
            swimmer.speed = draw_speed(config, speed_factor, rng);
            swimmer.next_speed_redraw = Some(now + config.speed_redraw_interval_ms);
        }
        Some(_) => {}
    }
}

/// One motion update for a swimmer at time `now`
///
/// Elapsed time is measured from this swimmer's own previous update, so
/// irregular tick spacing is handled per swimmer. Returns true if it moved.
pub fn step<R: Rng + ?Sized>(
    swimmer: &mut Swimmer,
    now: Millis,
    bounds: Bounds,
    config: &SimulationConfig,
    speed_factor: f32,
    rng: &mut R,
) -> bool {
    let elapsed = swimmer
        .last_update
        .map(|last| now.saturating_sub(last))
        .unwrap_or(0);
    swimmer.last_update = Some(now);

    if swimmer.is_alerted() {
        return false;
    }

    let moved = if elapsed > 0 {
        advance(swimmer, elapsed, bounds, config, rng)
    } else {
        false
    };

    update_phase(swimmer, now, config, rng);
    maybe_redraw_speed(swimmer, now, config, speed_factor, rng);
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AlertId, EntityId};
    use crate::spatial::grid::CellCoord;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn swimmer_at(x: f32, y: f32, heading: f32, speed: f32) -> Swimmer {
        Swimmer::new(EntityId(1), Vec2::new(x, y), heading, speed, CellCoord::default())
    }

    fn calm_config() -> SimulationConfig {
        SimulationConfig {
            wander_chance: 0.0,
            reflect_jitter: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_straight_line_displacement() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut s = swimmer_at(100.0, 100.0, 0.0, 50.0);
        let moved = advance(&mut s, 1000, Bounds::new(400.0, 300.0), &calm_config(), &mut rng);
        assert!(moved);
        assert!((s.position.x - 150.0).abs() < 1e-3);
        assert!((s.position.y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_reflects_off_left_margin() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut s = swimmer_at(10.0, 10.0, PI, 50.0);
        assert!(s.direction().x < 0.0);

        advance(&mut s, 1000, Bounds::new(400.0, 300.0), &SimulationConfig::default(), &mut rng);

        assert_eq!(s.position.x, 20.0);
        assert_eq!(s.position.y, 20.0);
        assert!(s.direction().x > 0.0);
    }

    #[test]
    fn test_reflects_off_top_margin() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut s = swimmer_at(200.0, 270.0, PI / 3.0, 100.0);
        advance(&mut s, 1000, Bounds::new(400.0, 300.0), &calm_config(), &mut rng);
        assert_eq!(s.position.y, 280.0);
        assert!(s.direction().y < 0.0);
        // parallel component untouched
        assert!(s.direction().x > 0.0);
    }

    #[test]
    fn test_paused_and_alerted_do_not_move() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let bounds = Bounds::new(400.0, 300.0);

        let mut paused = swimmer_at(100.0, 100.0, 0.0, 50.0);
        paused.motion = MotionStatus::Paused;
        assert!(!advance(&mut paused, 1000, bounds, &calm_config(), &mut rng));

        let mut alerted = swimmer_at(100.0, 100.0, 0.0, 50.0);
        alerted.mark_alerted(AlertId(1));
        assert!(!step(&mut alerted, 1000, bounds, &calm_config(), 1.0, &mut rng));
        assert_eq!(alerted.position, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_phase_cycle() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let config = calm_config();
        let mut s = swimmer_at(100.0, 100.0, 0.0, 50.0);

        update_phase(&mut s, 0, &config, &mut rng);
        let until = s.phase_until.unwrap();
        assert!((3_000..=8_000).contains(&until));

        update_phase(&mut s, until, &config, &mut rng);
        assert_eq!(s.motion, MotionStatus::Paused);
        let resume_at = s.phase_until.unwrap();
        assert!((until + 1_000..=until + 3_000).contains(&resume_at));

        update_phase(&mut s, resume_at, &config, &mut rng);
        assert_eq!(s.motion, MotionStatus::Moving);
    }

    #[test]
    fn test_speed_redraw_uses_current_factor() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let config = calm_config();
        let mut s = swimmer_at(100.0, 100.0, 0.0, 1.0);

        maybe_redraw_speed(&mut s, 0, &config, 10.0, &mut rng);
        // first call only schedules
        assert_eq!(s.speed, 1.0);

        maybe_redraw_speed(&mut s, 10_000, &config, 10.0, &mut rng);
        assert!(s.speed >= 200.0 && s.speed <= 600.0);
    }

    #[test]
    fn test_step_uses_per_swimmer_elapsed() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let config = calm_config();
        let bounds = Bounds::new(400.0, 300.0);
        let mut s = swimmer_at(100.0, 100.0, 0.0, 50.0);

        // first step anchors time, no displacement
        assert!(!step(&mut s, 5_000, bounds, &config, 1.0, &mut rng));
        assert_eq!(s.position.x, 100.0);

        step(&mut s, 5_500, bounds, &config, 1.0, &mut rng);
        assert!((s.position.x - 125.0).abs() < 1e-3);
    }

    #[test]
    fn test_normalize_angle_range() {
        for a in [-10.0_f32, -PI, 0.0, PI, 7.0, 100.0] {
            let n = normalize_angle(a);
            assert!((-PI..PI).contains(&n), "{} -> {}", a, n);
        }
    }
}
