//! Collision detection
//!
//! Brute-force overlap scan over the entity vectors. Each rule is an
//! independent pass, so a body can appear in several pairs per tick; the
//! response stage skips pairs whose bodies were already deactivated.

use crate::game::bounds::WorldBounds;
use crate::game::entity::{Body, BodyRef, HasBody};
use crate::game::state::GameState;
use crate::util::vec2::Vec2;

/// Two overlapping bodies found this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionPair {
    pub a: BodyRef,
    pub b: BodyRef,
    /// Center distance at detection time
    pub distance: f32,
}

/// Displacement from `a` to `b`, through the wrapped edge when both live on the torus
#[inline]
pub fn separation(bounds: &WorldBounds, a: &Body, b: &Body) -> Vec2 {
    let dr = b.position - a.position;
    if a.wraps && b.wraps {
        bounds.minimum_image(dr)
    } else {
        dr
    }
}

/// Displacement from a black hole to a victim. The victim lives on the torus,
/// so a hole just outside one edge reaches through to the opposite edge.
#[inline]
pub fn accretion_separation(bounds: &WorldBounds, hole: &Body, victim: &Body) -> Vec2 {
    let dr = victim.position - hole.position;
    if victim.wraps {
        bounds.minimum_image(dr)
    } else {
        dr
    }
}

/// Distance when the two circles overlap
#[inline]
fn overlap(bounds: &WorldBounds, a: &Body, ra: f32, b: &Body, rb: f32) -> Option<f32> {
    let d2 = separation(bounds, a, b).length_sq();
    let reach = ra + rb;
    (d2 < reach * reach).then(|| d2.sqrt())
}

/// Collect every colliding pair into `out` (cleared first)
pub fn detect(state: &GameState, out: &mut Vec<CollisionPair>) {
    out.clear();
    let bounds = &state.bounds;

    // Ship-asteroid, skipped while the ship is invulnerable
    for (si, ship) in state.ships.iter().enumerate() {
        if !ship.is_active() || ship.is_invulnerable() {
            continue;
        }
        for (ai, asteroid) in state.asteroids.iter().enumerate() {
            if !asteroid.is_active() {
                continue;
            }
            if let Some(distance) = overlap(bounds, &ship.body, ship.radius, &asteroid.body, asteroid.radius) {
                out.push(CollisionPair {
                    a: BodyRef::Ship(si),
                    b: BodyRef::Asteroid(ai),
                    distance,
                });
            }
        }
    }

    // Ship-ship
    for (i, s1) in state.ships.iter().enumerate() {
        if !s1.is_active() {
            continue;
        }
        for (j, s2) in state.ships.iter().enumerate().skip(i + 1) {
            if !s2.is_active() {
                continue;
            }
            if let Some(distance) = overlap(bounds, &s1.body, s1.radius, &s2.body, s2.radius) {
                out.push(CollisionPair {
                    a: BodyRef::Ship(i),
                    b: BodyRef::Ship(j),
                    distance,
                });
            }
        }
    }

    // Asteroid-asteroid
    for (i, a1) in state.asteroids.iter().enumerate() {
        if !a1.is_active() {
            continue;
        }
        for (j, a2) in state.asteroids.iter().enumerate().skip(i + 1) {
            if !a2.is_active() {
                continue;
            }
            if let Some(distance) = overlap(bounds, &a1.body, a1.radius, &a2.body, a2.radius) {
                out.push(CollisionPair {
                    a: BodyRef::Asteroid(i),
                    b: BodyRef::Asteroid(j),
                    distance,
                });
            }
        }
    }

    // Bullet-asteroid
    for (bi, bullet) in state.bullets.iter().enumerate() {
        if !bullet.is_active() {
            continue;
        }
        for (ai, asteroid) in state.asteroids.iter().enumerate() {
            if !asteroid.is_active() {
                continue;
            }
            if let Some(distance) = overlap(bounds, &bullet.body, bullet.radius, &asteroid.body, asteroid.radius) {
                out.push(CollisionPair {
                    a: BodyRef::Bullet(bi),
                    b: BodyRef::Asteroid(ai),
                    distance,
                });
            }
        }
    }

    // Black hole accretion, point inside the accretion radius
    for (hi, hole) in state.black_holes.iter().enumerate() {
        if !hole.is_active() {
            continue;
        }
        let victims = state
            .ships
            .iter()
            .enumerate()
            .map(|(i, s)| (BodyRef::Ship(i), s.body()))
            .chain(state.asteroids.iter().enumerate().map(|(i, a)| (BodyRef::Asteroid(i), a.body())))
            .chain(state.bullets.iter().enumerate().map(|(i, b)| (BodyRef::Bullet(i), b.body())));

        for (victim, body) in victims {
            if !body.active {
                continue;
            }
            let distance = accretion_separation(bounds, &hole.body, body).length();
            if distance < hole.accretion_radius {
                out.push(CollisionPair {
                    a: victim,
                    b: BodyRef::BlackHole(hi),
                    distance,
                });
            }
        }
    }
}
