//! Leapfrog integration under mutual gravity and the level potential
//!
//! One call performs kick-drift-kick: half-kick with forces at the current
//! positions, full drift, then a second half-kick with forces recomputed at
//! the drifted positions. The Barnes-Hut tree is rebuilt before each kick.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::PhysicsConfig;
use crate::game::entity::{BodyRef, HasBody};
use crate::game::potential::Potential;
use crate::game::quadtree::{GravityParams, GravitySample, QuadTree};
use crate::game::state::GameState;
use crate::util::vec2::Vec2;

impl From<&PhysicsConfig> for GravityParams {
    fn from(physics: &PhysicsConfig) -> Self {
        Self {
            g: physics.g,
            theta: physics.theta,
            eps: physics.epsilon,
        }
    }
}

/// Outcome of one integration step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeapfrogReport {
    /// Bodies integrated under gravity
    pub bodies: usize,
    pub black_holes_retired: usize,
}

/// Advance every active gravity body by one timestep and retire black holes
/// that have left the world
pub fn update(
    state: &mut GameState,
    tree: &mut QuadTree,
    potential: &Potential,
    physics: &PhysicsConfig,
) -> LeapfrogReport {
    let refs = state.gravity_refs();
    if !refs.is_empty() {
        let params = GravityParams::from(physics);
        let half_dt = physics.dt * 0.5;
        let mut samples = Vec::with_capacity(refs.len());

        half_kick(state, tree, &refs, &mut samples, potential, &params, half_dt);
        drift(state, &refs, physics.dt);
        half_kick(state, tree, &refs, &mut samples, potential, &params, half_dt);
    }

    LeapfrogReport {
        bodies: refs.len(),
        black_holes_retired: retire_offscreen_black_holes(state),
    }
}

fn half_kick(
    state: &mut GameState,
    tree: &mut QuadTree,
    refs: &[BodyRef],
    samples: &mut Vec<GravitySample>,
    potential: &Potential,
    params: &GravityParams,
    half_dt: f32,
) {
    samples.clear();
    samples.extend(refs.iter().map(|&r| {
        let body = state.body(r);
        GravitySample::new(body.position, body.mass)
    }));
    tree.build(samples);

    let accelerations = accelerations(tree, samples, potential, params);
    for (&r, acc) in refs.iter().zip(accelerations) {
        let body = state.body_mut(r);
        body.acceleration = acc;
        body.velocity += acc * half_dt;
    }
}

/// Per-body acceleration from the tree plus the external field
#[cfg(not(feature = "parallel"))]
fn accelerations(
    tree: &QuadTree,
    samples: &[GravitySample],
    potential: &Potential,
    params: &GravityParams,
) -> Vec<Vec2> {
    samples
        .iter()
        .map(|s| tree.acceleration(s.position, s.mass, params) + potential.acceleration_at(s.position))
        .collect()
}

/// Per-body acceleration from the tree plus the external field
/// Each body's sum is independent, so results match the sequential path
#[cfg(feature = "parallel")]
fn accelerations(
    tree: &QuadTree,
    samples: &[GravitySample],
    potential: &Potential,
    params: &GravityParams,
) -> Vec<Vec2> {
    samples
        .par_iter()
        .map(|s| tree.acceleration(s.position, s.mass, params) + potential.acceleration_at(s.position))
        .collect()
}

fn drift(state: &mut GameState, refs: &[BodyRef], dt: f32) {
    let bounds = state.bounds;
    for &r in refs {
        let body = state.body_mut(r);
        body.position += body.velocity * dt;
        if body.wraps {
            body.position = bounds.wrap_position(body.position);
        }
    }
}

/// Deactivate black holes beyond the off-world margin
pub fn retire_offscreen_black_holes(state: &mut GameState) -> usize {
    let bounds = state.bounds;
    let mut retired = 0;
    for bh in state.black_holes.iter_mut().filter(|b| b.is_active()) {
        if bh.is_offscreen(&bounds) {
            bh.body.active = false;
            retired += 1;
            tracing::debug!(id = bh.body.id, "Black hole left the world");
        }
    }
    retired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::bounds::WorldBounds;
    use crate::game::entity::{Asteroid, BlackHole, Particle, Ship};
    use crate::game::systems::physics::total_momentum;

    fn setup() -> (GameState, QuadTree) {
        let bounds = WorldBounds::new(1000.0, 800.0);
        (GameState::new(bounds, 3), QuadTree::new(bounds))
    }

    fn physics() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    #[test]
    fn test_two_bodies_attract() {
        let (mut state, mut tree) = setup();
        state.asteroids.push(Asteroid::new(0, Vec2::new(450.0, 400.0), Vec2::ZERO, 0, 1000.0, 0.0));
        state.asteroids.push(Asteroid::new(1, Vec2::new(550.0, 400.0), Vec2::ZERO, 0, 1000.0, 0.0));

        update(&mut state, &mut tree, &Potential::None, &physics());

        let a = &state.asteroids[0].body;
        let b = &state.asteroids[1].body;
        assert!(a.velocity.x > 0.0);
        assert!(b.velocity.x < 0.0);
        // 100 * 1000 * 100 / (100^2 + 5^2)^1.5, recomputed after a tiny drift
        assert!((a.acceleration.x - 9.9626).abs() < 1e-2);
        assert!((b.acceleration.x + 9.9626).abs() < 1e-2);
        assert!((a.velocity.x + b.velocity.x).abs() < 1e-6);
    }

    #[test]
    fn test_momentum_conserved_without_potential() {
        let (mut state, mut tree) = setup();
        state.asteroids.push(Asteroid::new(0, Vec2::new(300.0, 400.0), Vec2::new(5.0, 0.0), 0, 6000.0, 0.0));
        state.asteroids.push(Asteroid::new(1, Vec2::new(700.0, 350.0), Vec2::new(-2.0, 1.0), 1, 6000.0, 0.0));
        state.ships.push(Ship::new(2, Vec2::new(500.0, 200.0), 0, 1500.0));

        let before = total_momentum(&state);
        for _ in 0..60 {
            update(&mut state, &mut tree, &Potential::None, &physics());
        }
        let after = total_momentum(&state);
        assert!((after - before).length() < 1.0, "{:?} vs {:?}", before, after);
    }

    #[test]
    fn test_potential_adds_to_kick() {
        let (mut state, mut tree) = setup();
        state.ships.push(Ship::new(0, Vec2::new(600.0, 400.0), 0, 1500.0));
        let potential = Potential::Harmonic {
            center: Vec2::new(500.0, 400.0),
            omega2: 0.01,
        };

        update(&mut state, &mut tree, &potential, &physics());

        let body = &state.ships[0].body;
        assert!(body.velocity.x < 0.0);
        assert!(body.acceleration.x < 0.0);
    }

    #[test]
    fn test_drift_wraps_wrapping_bodies_only() {
        let (mut state, mut tree) = setup();
        state.ships.push(Ship::new(0, Vec2::new(999.0, 400.0), 0, 0.0));
        state.ships[0].body.velocity = Vec2::new(240.0, 0.0);
        state
            .black_holes
            .push(BlackHole::new(1, Vec2::new(-95.0, 400.0), Vec2::new(-1200.0, 0.0), 0.0, 25.0));

        update(&mut state, &mut tree, &Potential::None, &physics());

        let ship = &state.ships[0].body;
        assert!(ship.position.x >= 0.0 && ship.position.x < 1000.0);
        assert!(ship.position.x < 5.0);
        let bh = &state.black_holes[0];
        assert!(bh.body.position.x < -100.0);
        assert!(!bh.is_active());
    }

    #[test]
    fn test_offscreen_black_hole_retired() {
        let (mut state, _) = setup();
        state
            .black_holes
            .push(BlackHole::new(0, Vec2::new(1200.0, 400.0), Vec2::ZERO, 5000.0, 25.0));
        state
            .black_holes
            .push(BlackHole::new(1, Vec2::new(1050.0, 400.0), Vec2::ZERO, 5000.0, 25.0));
        assert_eq!(retire_offscreen_black_holes(&mut state), 1);
        assert!(!state.black_holes[0].is_active());
        assert!(state.black_holes[1].is_active());
    }

    #[test]
    fn test_inactive_and_particles_unaffected() {
        let (mut state, mut tree) = setup();
        state.asteroids.push(Asteroid::new(0, Vec2::new(450.0, 400.0), Vec2::ZERO, 0, 1000.0, 0.0));
        state.asteroids.push(Asteroid::new(1, Vec2::new(460.0, 400.0), Vec2::ZERO, 0, 1000.0, 0.0));
        state.asteroids[1].body.active = false;
        state.particles.push(Particle::new(2, Vec2::new(455.0, 400.0), Vec2::ZERO, 1.0, -1));

        update(&mut state, &mut tree, &Potential::None, &physics());

        assert_eq!(state.asteroids[0].body.velocity, Vec2::ZERO);
        assert_eq!(state.asteroids[1].body.position, Vec2::new(460.0, 400.0));
        assert_eq!(state.particles[0].body.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_empty_world_is_a_no_op() {
        let (mut state, mut tree) = setup();
        let report = update(&mut state, &mut tree, &Potential::None, &physics());
        assert_eq!(report, LeapfrogReport::default());
    }
}
