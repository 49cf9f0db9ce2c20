//! Collision response
//!
//! Applies the outcome of each detected pair: ship damage and respawn,
//! elastic bounces, asteroid splitting, black hole accretion and the
//! explosion particles that go with them.

use std::f32::consts::{PI, TAU};

use rand::Rng;

use crate::game::constants::explosion::{self, Preset};
use crate::game::constants::{asteroid, particle, physics::DEGENERATE_DISTANCE, score};
use crate::game::entity::{Asteroid, BodyRef, Particle};
use crate::game::state::{GameEvent, GameState};
use crate::game::systems::collision::CollisionPair;
use crate::util::vec2::Vec2;

/// Dispatch every pair in detection order. Pairs whose bodies were
/// deactivated earlier in the tick are skipped. Returns the number handled.
pub fn resolve(state: &mut GameState, pairs: &[CollisionPair]) -> usize {
    let mut handled = 0;
    for pair in pairs {
        if !state.is_active(pair.a) || !state.is_active(pair.b) {
            continue;
        }
        dispatch(state, pair.a, pair.b);
        handled += 1;
    }
    handled
}

fn dispatch(state: &mut GameState, a: BodyRef, b: BodyRef) {
    match (a, b) {
        (BodyRef::BlackHole(_), BodyRef::BlackHole(_)) => {}
        (victim, BodyRef::BlackHole(h)) | (BodyRef::BlackHole(h), victim) => {
            handle_accretion(state, victim, h)
        }
        (BodyRef::Ship(s), BodyRef::Asteroid(r)) | (BodyRef::Asteroid(r), BodyRef::Ship(s)) => {
            handle_ship_asteroid(state, s, r)
        }
        (BodyRef::Ship(i), BodyRef::Ship(j)) => handle_ship_ship(state, i, j),
        (BodyRef::Asteroid(i), BodyRef::Asteroid(j)) => handle_asteroid_asteroid(state, i, j),
        (BodyRef::Bullet(bullet), BodyRef::Asteroid(r))
        | (BodyRef::Asteroid(r), BodyRef::Bullet(bullet)) => handle_bullet_asteroid(state, bullet, r),
        _ => {}
    }
}

/// Ship struck by an asteroid
pub fn handle_ship_asteroid(state: &mut GameState, ship: usize, rock: usize) {
    let bounds = state.bounds;
    let s = &state.ships[ship];
    // An earlier pair this tick may already have hit and respawned the ship
    if s.is_invulnerable() {
        return;
    }

    let ship_pos = s.body.position;
    let dr = bounds.minimum_image(state.asteroids[rock].body.position - ship_pos);
    let dist = dr.length();
    let contact = if dist > DEGENERATE_DISTANCE {
        ship_pos + dr / dist * s.radius
    } else {
        ship_pos
    };

    let s = &mut state.ships[ship];
    s.lives = s.lives.saturating_sub(1);
    let color = s.player_id as i32;
    let player_id = s.player_id;

    if s.lives == 0 {
        s.body.active = false;
        create_explosion(state, contact, explosion::SHIP_DEATH_CONTACT, color);
        create_explosion(state, ship_pos, explosion::SHIP_DEATH_HULL, color);
        state.push_event(GameEvent::ShipDestroyed { player_id });
        tracing::debug!(player_id, "Ship destroyed by asteroid");
    } else {
        let lives = s.lives;
        s.respawn_at(bounds.center());
        create_explosion(state, contact, explosion::SHIP_HIT, color);
        state.push_event(GameEvent::ShipHit { player_id, lives });
        tracing::debug!(player_id, lives, "Ship hit by asteroid");
    }
}

/// Equal-mass elastic bounce between two ships
pub fn handle_ship_ship(state: &mut GameState, i: usize, j: usize) {
    let bounds = state.bounds;
    let (p1, v1, r1) = {
        let s = &state.ships[i];
        (s.body.position, s.body.velocity, s.radius)
    };
    let (p2, v2, r2) = {
        let s = &state.ships[j];
        (s.body.position, s.body.velocity, s.radius)
    };

    let dr = bounds.minimum_image(p2 - p1);
    let dist = dr.length();
    if dist < DEGENERATE_DISTANCE {
        return;
    }
    let normal = dr / dist;

    // Skip only strictly separating pairs; ships at rest still get pushed apart
    let vel_along_normal = (v2 - v1).dot(normal);
    if vel_along_normal > 0.0 {
        return;
    }
    let impulse = -vel_along_normal;

    let mut p1 = p1;
    let mut p2 = p2;
    let overlap = (r1 + r2) - dist;
    if overlap > 0.0 {
        let push = normal * (overlap * 0.5);
        p1 = bounds.wrap_position(p1 - push);
        p2 = bounds.wrap_position(p2 + push);
    }

    let s1 = &mut state.ships[i].body;
    s1.velocity = v1 - normal * impulse;
    s1.position = p1;
    let s2 = &mut state.ships[j].body;
    s2.velocity = v2 + normal * impulse;
    s2.position = p2;
}

/// Elastic bounce between asteroids of unequal mass
pub fn handle_asteroid_asteroid(state: &mut GameState, i: usize, j: usize) {
    let bounds = state.bounds;
    let (p1, v1, m1, r1) = {
        let a = &state.asteroids[i];
        (a.body.position, a.body.velocity, a.body.mass, a.radius)
    };
    let (p2, v2, m2, r2) = {
        let a = &state.asteroids[j];
        (a.body.position, a.body.velocity, a.body.mass, a.radius)
    };

    let dr = bounds.minimum_image(p2 - p1);
    let dist = dr.length();
    let total_mass = m1 + m2;
    if dist < DEGENERATE_DISTANCE || m1 <= 0.0 || m2 <= 0.0 {
        return;
    }
    let normal = dr / dist;

    let vel_along_normal = (v2 - v1).dot(normal);
    if vel_along_normal > 0.0 {
        return;
    }
    let impulse = -(1.0 + asteroid::RESTITUTION) * vel_along_normal / (1.0 / m1 + 1.0 / m2);

    let mut p1 = p1;
    let mut p2 = p2;
    let overlap = (r1 + r2) - dist;
    if overlap > 0.0 {
        // Lighter body moves further
        p1 = bounds.wrap_position(p1 - normal * (overlap * m2 / total_mass));
        p2 = bounds.wrap_position(p2 + normal * (overlap * m1 / total_mass));
    }

    let a1 = &mut state.asteroids[i].body;
    a1.velocity = v1 - normal * (impulse / m1);
    a1.position = p1;
    let a2 = &mut state.asteroids[j].body;
    a2.velocity = v2 + normal * (impulse / m2);
    a2.position = p2;
}

/// Bullet hit: split the asteroid in two or, at dust size, destroy it
pub fn handle_bullet_asteroid(state: &mut GameState, bullet: usize, rock: usize) {
    let owner = {
        let b = &mut state.bullets[bullet];
        b.body.active = false;
        b.player_id
    };

    let bounds = state.bounds;
    let parent = &mut state.asteroids[rock];
    parent.body.active = false;
    let position = parent.body.position;
    let velocity = parent.body.velocity;
    let radius = parent.radius;
    let size = parent.size;
    let base_mass = parent.base_mass();

    if !parent.is_dust() {
        let base_angle = state.rng.gen_range(0.0..TAU);
        for k in 0..2 {
            let direction = Vec2::from_angle(base_angle + k as f32 * PI);
            let fragment_pos =
                bounds.wrap_position(position + direction * (radius * asteroid::FRAGMENT_OFFSET));
            let speed = asteroid::FRAGMENT_SPEED_MIN
                + state.rng.gen_range(0.0..asteroid::FRAGMENT_SPEED_RANGE);
            let fragment_vel = velocity * asteroid::FRAGMENT_VELOCITY_KEEP + direction * speed;
            let spin = state.rng.gen_range(-asteroid::MAX_SPIN..asteroid::MAX_SPIN);
            let id = state.next_entity_id();
            // Pushing keeps existing indices (and pending pairs) valid
            state.asteroids.push(Asteroid::new(
                id,
                fragment_pos,
                fragment_vel,
                size + 1,
                base_mass,
                spin,
            ));
        }
        create_explosion(state, position, explosion::ASTEROID_SPLIT, particle::WHITE);
        state.push_event(GameEvent::AsteroidSplit { position, size });
    } else {
        create_explosion(state, position, explosion::ASTEROID_DUST, particle::WHITE);
        state.push_event(GameEvent::AsteroidDestroyed { position });
    }

    if let Some(ship) = state.ships.get_mut(owner) {
        ship.score += score::BULLET_KILL;
    }
}

/// Body swallowed by a black hole
pub fn handle_accretion(state: &mut GameState, victim: BodyRef, hole: usize) {
    let position = state.body(victim).position;
    let victim_id = state.body(victim).id;

    match victim {
        BodyRef::Ship(i) => {
            let center = state.bounds.center();
            let s = &mut state.ships[i];
            s.lives = s.lives.saturating_sub(1);
            let color = s.player_id as i32;
            let player_id = s.player_id;
            if s.lives == 0 {
                s.body.active = false;
                create_explosion(state, position, explosion::ACCRETION_SHIP_DEATH, color);
                state.push_event(GameEvent::ShipDestroyed { player_id });
                tracing::debug!(player_id, hole, "Ship swallowed by black hole");
            } else {
                let lives = s.lives;
                s.respawn_at(center);
                create_explosion(state, position, explosion::ACCRETION_SHIP_HIT, color);
                state.push_event(GameEvent::ShipHit { player_id, lives });
            }
        }
        BodyRef::BlackHole(_) => return,
        other => {
            state.body_mut(other).active = false;
            create_explosion(state, position, explosion::ACCRETION_OTHER, particle::WHITE);
        }
    }

    state.push_event(GameEvent::Accreted {
        position,
        victim: victim_id,
    });
}

/// Spawn `count` particles at `position` flying outward in random directions
pub fn create_explosion(state: &mut GameState, position: Vec2, preset: Preset, color: i32) {
    let (count, speed_min, speed_max, lifetime_mult) = preset;
    let lifetime = particle::BASE_LIFETIME * lifetime_mult;
    state.particles.reserve(count);
    for _ in 0..count {
        let angle = state.rng.gen_range(0.0..TAU);
        let speed = if speed_max > speed_min {
            state.rng.gen_range(speed_min..=speed_max)
        } else {
            speed_min
        };
        let id = state.next_entity_id();
        state.particles.push(Particle::new(
            id,
            position,
            Vec2::from_angle(angle) * speed,
            lifetime,
            color,
        ));
    }
}

/// Inelastic merge: `i` absorbs `j`, conserving momentum, at the center of mass
pub fn merge_asteroids(state: &mut GameState, i: usize, j: usize) {
    let bounds = state.bounds;
    let (p1, v1, m1) = {
        let a = &state.asteroids[i].body;
        (a.position, a.velocity, a.mass)
    };
    let (p2, v2, m2) = {
        let a = &mut state.asteroids[j].body;
        a.active = false;
        (a.position, a.velocity, a.mass)
    };
    let total = m1 + m2;
    if total <= 0.0 {
        return;
    }
    let p2 = p1 + bounds.minimum_image(p2 - p1);

    let a = &mut state.asteroids[i];
    a.body.velocity = (v1 * m1 + v2 * m2) / total;
    a.body.position = bounds.wrap_position((p1 * m1 + p2 * m2) / total);
    a.body.mass = total;
    a.radius = merged_radius(total);
}

/// Inelastic merge: the asteroid absorbs the bullet's mass and momentum
pub fn merge_bullet_into_asteroid(state: &mut GameState, bullet: usize, rock: usize) {
    let (vb, mb) = {
        let b = &mut state.bullets[bullet].body;
        b.active = false;
        (b.velocity, b.mass)
    };
    let a = &mut state.asteroids[rock];
    let total = a.body.mass + mb;
    if total <= 0.0 {
        return;
    }
    a.body.velocity = (a.body.velocity * a.body.mass + vb * mb) / total;
    a.body.mass = total;
    a.radius = merged_radius(total);
}

fn merged_radius(mass: f32) -> f32 {
    (mass / asteroid::MERGE_RADIUS_MASS).sqrt() * asteroid::MERGE_RADIUS_SCALE
}
