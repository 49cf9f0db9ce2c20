//! Wave and black hole spawning

use std::f32::consts::TAU;

use rand::Rng;

use crate::config::DifficultyConfig;
use crate::game::constants::{asteroid, black_hole, wave};
use crate::game::entity::{Asteroid, BlackHole};
use crate::game::state::{GameEvent, GameState};
use crate::util::vec2::Vec2;

/// Asteroids in a wave: the configured base count plus two per wave number
pub fn wave_size(wave_number: u32, difficulty: &DifficultyConfig) -> u32 {
    difficulty.asteroids_per_wave + wave_number * wave::ASTEROIDS_PER_WAVE_NUMBER
}

/// Spawn the current wave's large asteroids on random world edges
pub fn spawn_wave(state: &mut GameState, difficulty: &DifficultyConfig) -> u32 {
    let count = wave_size(state.wave, difficulty);
    let speed = wave::BASE_SPEED + state.wave as f32 * wave::SPEED_PER_WAVE;

    for _ in 0..count {
        let position = random_edge_position(state);
        let velocity = random_velocity(state, speed);
        let spin = state.rng.gen_range(-asteroid::MAX_SPIN..asteroid::MAX_SPIN);
        let id = state.next_entity_id();
        state.asteroids.push(Asteroid::new(
            id,
            position,
            velocity,
            0,
            difficulty.asteroid_base_mass,
            spin,
        ));
    }

    state.push_event(GameEvent::WaveStarted {
        wave: state.wave,
        asteroids: count,
    });
    tracing::debug!(wave = state.wave, count, speed, "Wave spawned");
    count
}

/// Advance to the next wave once every asteroid is gone. Call after cleanup.
pub fn check_wave_complete(state: &mut GameState, difficulty: &DifficultyConfig) -> bool {
    if !state.asteroids.is_empty() {
        return false;
    }
    state.wave += 1;
    spawn_wave(state, difficulty);
    true
}

/// Roll the per-tick spawn chance and, on success, send a black hole in
pub fn maybe_spawn_black_hole(state: &mut GameState, difficulty: &DifficultyConfig) -> bool {
    if !difficulty.black_holes_enabled {
        return false;
    }
    if state.rng.gen::<f32>() >= difficulty.black_hole_spawn_rate {
        return false;
    }
    spawn_black_hole(state, difficulty);
    true
}

/// Place a black hole just outside a random edge, heading inward
pub fn spawn_black_hole(state: &mut GameState, difficulty: &DifficultyConfig) {
    let width = state.bounds.width;
    let height = state.bounds.height;
    let offset = black_hole::SPAWN_OFFSET;
    let lateral = black_hole::LATERAL_SPEED;
    let inward = black_hole::INWARD_SPEED_MIN..black_hole::INWARD_SPEED_MAX;

    let rng = &mut state.rng;
    let (position, velocity) = match rng.gen_range(0..4) {
        // Top
        0 => (
            Vec2::new(rng.gen_range(0.0..width), -offset),
            Vec2::new(rng.gen_range(-lateral..lateral), rng.gen_range(inward)),
        ),
        // Right
        1 => (
            Vec2::new(width + offset, rng.gen_range(0.0..height)),
            Vec2::new(-rng.gen_range(inward), rng.gen_range(-lateral..lateral)),
        ),
        // Bottom
        2 => (
            Vec2::new(rng.gen_range(0.0..width), height + offset),
            Vec2::new(rng.gen_range(-lateral..lateral), -rng.gen_range(inward)),
        ),
        // Left
        _ => (
            Vec2::new(-offset, rng.gen_range(0.0..height)),
            Vec2::new(rng.gen_range(inward), rng.gen_range(-lateral..lateral)),
        ),
    };

    let mass = (black_hole::BASE_MASS + state.wave as f32 * black_hole::MASS_PER_WAVE)
        * difficulty.black_hole_mass_mult;
    let id = state.next_entity_id();
    state.black_holes.push(BlackHole::new(
        id,
        position,
        velocity,
        mass,
        difficulty.black_hole_accretion_radius,
    ));
    state.push_event(GameEvent::BlackHoleSpawned { position, mass });
    tracing::debug!(id, mass, x = position.x, y = position.y, "Black hole spawned");
}

/// Uniform point on one of the four world edges, wrapped into the world
fn random_edge_position(state: &mut GameState) -> Vec2 {
    let width = state.bounds.width;
    let height = state.bounds.height;
    let rng = &mut state.rng;
    let raw = match rng.gen_range(0..4) {
        0 => Vec2::new(rng.gen_range(0.0..width), 0.0),
        1 => Vec2::new(width, rng.gen_range(0.0..height)),
        2 => Vec2::new(rng.gen_range(0.0..width), height),
        _ => Vec2::new(0.0, rng.gen_range(0.0..height)),
    };
    state.bounds.wrap_position(raw)
}

fn random_velocity(state: &mut GameState, speed: f32) -> Vec2 {
    Vec2::from_angle(state.rng.gen_range(0.0..TAU)) * speed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::bounds::WorldBounds;
    use crate::game::entity::HasBody;

    fn state() -> GameState {
        GameState::new(WorldBounds::new(1000.0, 600.0), 77)
    }

    #[test]
    fn test_wave_size_grows() {
        let d = DifficultyConfig::default();
        assert_eq!(wave_size(1, &d), 6);
        assert_eq!(wave_size(3, &d), 10);
    }

    #[test]
    fn test_spawn_wave_on_edges() {
        let mut s = state();
        let d = DifficultyConfig::default();
        let count = spawn_wave(&mut s, &d);
        assert_eq!(count, 6);
        assert_eq!(s.asteroids.len(), 6);

        for a in &s.asteroids {
            let p = a.body.position;
            let on_edge = p.x == 0.0 || p.y == 0.0;
            assert!(on_edge, "not on an edge after wrapping: {:?}", p);
            assert_eq!(a.size, 0);
            assert_eq!(a.body.mass, d.asteroid_base_mass);
            assert!((a.body.velocity.length() - 25.0).abs() < 1e-3);
            assert!(a.rotation_speed >= -0.5 && a.rotation_speed < 0.5);
        }
        assert!(s.events.contains(&GameEvent::WaveStarted { wave: 1, asteroids: 6 }));
    }

    #[test]
    fn test_wave_advances_only_when_cleared() {
        let mut s = state();
        let d = DifficultyConfig::default();
        spawn_wave(&mut s, &d);
        assert!(!check_wave_complete(&mut s, &d));

        for a in s.asteroids.iter_mut() {
            a.body.active = false;
        }
        s.remove_inactive();
        assert!(check_wave_complete(&mut s, &d));
        assert_eq!(s.wave, 2);
        assert_eq!(s.asteroids.len(), 8);
        assert!(s.asteroids.iter().all(|a| a.is_active()));
        assert!((s.asteroids[0].body.velocity.length() - 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_black_hole_spawns_outside_heading_inward() {
        let mut s = state();
        let d = DifficultyConfig::default();
        for _ in 0..40 {
            spawn_black_hole(&mut s, &d);
        }
        let center = s.bounds.center();
        for bh in &s.black_holes {
            let p = bh.body.position;
            let outside = p.x < 0.0 || p.y < 0.0 || p.x > 1000.0 || p.y > 600.0;
            assert!(outside, "{:?}", p);
            assert!(!bh.is_offscreen(&s.bounds));
            assert!((center - p).dot(bh.body.velocity) > 0.0);
            assert_eq!(bh.body.mass, 5500.0);
            assert_eq!(bh.accretion_radius, 25.0);
        }
    }

    #[test]
    fn test_black_hole_mass_scales_with_wave_and_multiplier() {
        let mut s = state();
        s.wave = 4;
        let d = DifficultyConfig {
            black_hole_mass_mult: 2.0,
            ..DifficultyConfig::default()
        };
        spawn_black_hole(&mut s, &d);
        assert_eq!(s.black_holes[0].body.mass, 14_000.0);
    }

    #[test]
    fn test_spawn_rate_gates() {
        let mut s = state();
        let off = DifficultyConfig {
            black_holes_enabled: false,
            black_hole_spawn_rate: 1.0,
            ..DifficultyConfig::default()
        };
        assert!(!maybe_spawn_black_hole(&mut s, &off));

        let never = DifficultyConfig {
            black_hole_spawn_rate: 0.0,
            ..DifficultyConfig::default()
        };
        assert!(!maybe_spawn_black_hole(&mut s, &never));

        let always = DifficultyConfig {
            black_hole_spawn_rate: 1.0,
            ..DifficultyConfig::default()
        };
        assert!(maybe_spawn_black_hole(&mut s, &always));
        assert_eq!(s.black_holes.len(), 1);
    }
}
