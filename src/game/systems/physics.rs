use serde::{Deserialize, Serialize};

use crate::game::constants::{bullet, ship};
use crate::game::entity::{Bullet, HasBody, PlayerId};
use crate::game::state::GameState;
use crate::util::vec2::Vec2;

/// Held controls for one player during a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub thrust: bool,
    pub brake: bool,
    pub shoot: bool,
}

/// Advance per-entity timers and move particles. Only active entities tick.
pub fn update(state: &mut GameState, dt: f32) {
    for s in state.ships.iter_mut().filter(|s| s.is_active()) {
        s.update(dt);
    }
    for a in state.asteroids.iter_mut().filter(|a| a.is_active()) {
        a.update(dt);
    }
    for b in state.bullets.iter_mut().filter(|b| b.is_active()) {
        b.update(dt);
    }
    for p in state.particles.iter_mut().filter(|p| p.is_active()) {
        p.update(dt);
    }
}

/// Apply one player's controls to their ship. Returns true when a bullet was fired.
pub fn apply_input(
    state: &mut GameState,
    player: PlayerId,
    input: &InputState,
    bullet_mass: f32,
    dt: f32,
) -> bool {
    let ship = match state.ships.get_mut(player) {
        Some(s) if s.is_active() => s,
        _ => return false,
    };

    if input.left {
        ship.rotate(-ship::TURN_RATE * dt);
    }
    if input.right {
        ship.rotate(ship::TURN_RATE * dt);
    }
    ship.thrusting = input.thrust;
    if input.thrust {
        ship.thrust(ship::THRUST, dt);
    }
    if input.brake {
        ship.brake(ship::BRAKE, dt);
    }

    if !(input.shoot && ship.can_shoot()) {
        return false;
    }

    let direction = ship.heading();
    let position = ship.body.position + direction * (ship.radius + bullet::SPAWN_GAP);
    let velocity = ship.body.velocity + direction * bullet::SPEED;
    ship.mark_shot();

    let id = state.next_entity_id();
    let position = state.bounds.wrap_position(position);
    state
        .bullets
        .push(Bullet::new(id, position, velocity, player, bullet_mass));
    true
}

/// Calculate kinetic energy for a body
pub fn kinetic_energy(mass: f32, velocity: Vec2) -> f32 {
    0.5 * mass * velocity.length_sq()
}

/// Total kinetic energy of every active gravity body
pub fn total_kinetic_energy(state: &GameState) -> f32 {
    state
        .gravity_refs()
        .into_iter()
        .map(|r| {
            let b = state.body(r);
            kinetic_energy(b.mass, b.velocity)
        })
        .sum()
}

/// Total linear momentum of every active gravity body
pub fn total_momentum(state: &GameState) -> Vec2 {
    state
        .gravity_refs()
        .into_iter()
        .fold(Vec2::ZERO, |acc, r| {
            let b = state.body(r);
            acc + b.velocity * b.mass
        })
}
