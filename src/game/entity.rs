//! Simulated bodies
//!
//! Every kind embeds a shared [`Body`] (kinematics, mass, soft-delete flag)
//! and adds its own fields. Kinds are stored in separate vectors on
//! `GameState`; [`BodyRef`] addresses one of them by index for the duration
//! of a tick.

use serde::{Deserialize, Serialize};

use crate::game::bounds::WorldBounds;
use crate::game::constants::{asteroid, black_hole, bullet, particle, ship};
use crate::util::vec2::Vec2;

/// Unique entity identifier (monotonic per reset)
pub type EntityId = u64;

/// Player slot (0 or 1)
pub type PlayerId = usize;

/// Entity kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyKind {
    Ship,
    Asteroid,
    Bullet,
    BlackHole,
    Particle,
}

impl BodyKind {
    /// Whether bodies of this kind live on the torus
    pub fn wraps(self) -> bool {
        matches!(self, BodyKind::Ship | BodyKind::Asteroid | BodyKind::Bullet)
    }
}

/// Physical state shared by every kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Acceleration from the most recent kick (not carried between ticks)
    #[serde(skip)]
    pub acceleration: Vec2,
    pub mass: f32,
    pub kind: BodyKind,
    pub wraps: bool,
    /// Soft-delete marker; inactive bodies are ignored until compaction
    pub active: bool,
    pub id: EntityId,
}

impl Body {
    pub fn new(id: EntityId, kind: BodyKind, position: Vec2, velocity: Vec2, mass: f32) -> Self {
        Self {
            position,
            velocity,
            acceleration: Vec2::ZERO,
            mass,
            kind,
            wraps: kind.wraps(),
            active: true,
            id,
        }
    }
}

/// Access to the shared body of any kind
pub trait HasBody {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    fn is_active(&self) -> bool {
        self.body().active
    }
}

macro_rules! impl_has_body {
    ($($kind:ty),* $(,)?) => {
        $(
            impl HasBody for $kind {
                #[inline]
                fn body(&self) -> &Body {
                    &self.body
                }

                #[inline]
                fn body_mut(&mut self) -> &mut Body {
                    &mut self.body
                }
            }
        )*
    };
}

impl_has_body!(Ship, Asteroid, Bullet, BlackHole, Particle);

/// Handle to a gravity/collision participant, valid until end-of-tick compaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyRef {
    Ship(usize),
    Asteroid(usize),
    Bullet(usize),
    BlackHole(usize),
}

/// Player ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub body: Body,
    pub player_id: PlayerId,
    /// Heading in radians
    pub angle: f32,
    pub radius: f32,
    pub lives: u32,
    pub score: u32,
    /// Thrust input was held this tick (renderer flame)
    pub thrusting: bool,
    /// Remaining invulnerability (seconds)
    pub invulnerable_time: f32,
    /// Remaining time until the next shot (seconds)
    pub shoot_cooldown: f32,
}

impl Ship {
    pub fn new(id: EntityId, position: Vec2, player_id: PlayerId, mass: f32) -> Self {
        Self {
            body: Body::new(id, BodyKind::Ship, position, Vec2::ZERO, mass),
            player_id,
            angle: ship::SPAWN_ANGLE,
            radius: ship::RADIUS,
            lives: ship::STARTING_LIVES,
            score: 0,
            thrusting: false,
            invulnerable_time: ship::INVULNERABLE_DURATION,
            shoot_cooldown: 0.0,
        }
    }

    /// Unit vector along the heading
    pub fn heading(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }

    pub fn rotate(&mut self, delta: f32) {
        self.angle += delta;
    }

    pub fn thrust(&mut self, power: f32, dt: f32) {
        let direction = self.heading();
        self.body.velocity += direction * (power * dt);
    }

    /// Decelerate against the current velocity, stopping outright when slow
    pub fn brake(&mut self, power: f32, dt: f32) {
        let speed = self.body.velocity.length();
        if speed > ship::BRAKE_STOP_SPEED {
            let against = -self.body.velocity.normalize();
            self.body.velocity += against * (power * dt);
        } else {
            self.body.velocity = Vec2::ZERO;
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_time > 0.0
    }

    pub fn can_shoot(&self) -> bool {
        self.shoot_cooldown <= 0.0
    }

    pub fn mark_shot(&mut self) {
        self.shoot_cooldown = ship::SHOOT_COOLDOWN;
    }

    /// Move to `position` at rest with a fresh invulnerability window
    pub fn respawn_at(&mut self, position: Vec2) {
        self.body.position = position;
        self.body.velocity = Vec2::ZERO;
        self.invulnerable_time = ship::INVULNERABLE_DURATION;
    }

    /// Advance timers
    pub fn update(&mut self, dt: f32) {
        if self.invulnerable_time > 0.0 {
            self.invulnerable_time = (self.invulnerable_time - dt).max(0.0);
        }
        if self.shoot_cooldown > 0.0 {
            self.shoot_cooldown -= dt;
        }
    }
}

/// Asteroid, size class 0 (large) to 5 (dust)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub body: Body,
    pub radius: f32,
    pub size: u8,
    /// Visual rotation (radians)
    pub rotation: f32,
    pub rotation_speed: f32,
}

impl Asteroid {
    pub fn new(
        id: EntityId,
        position: Vec2,
        velocity: Vec2,
        size: u8,
        base_mass: f32,
        rotation_speed: f32,
    ) -> Self {
        let size = size.min(asteroid::DUST_SIZE);
        Self {
            body: Body::new(
                id,
                BodyKind::Asteroid,
                position,
                velocity,
                Self::mass_for_size(base_mass, size),
            ),
            radius: Self::radius_for_size(size),
            size,
            rotation: 0.0,
            rotation_speed,
        }
    }

    /// `base_mass / 2^size`
    pub fn mass_for_size(base_mass: f32, size: u8) -> f32 {
        base_mass / (1u32 << size.min(asteroid::DUST_SIZE)) as f32
    }

    pub fn radius_for_size(size: u8) -> f32 {
        asteroid::RADII[usize::from(size.min(asteroid::DUST_SIZE))]
    }

    /// Size-0 mass implied by the current mass
    pub fn base_mass(&self) -> f32 {
        self.body.mass * (1u32 << self.size) as f32
    }

    pub fn is_dust(&self) -> bool {
        self.size >= asteroid::DUST_SIZE
    }

    pub fn update(&mut self, dt: f32) {
        self.rotation += self.rotation_speed * dt;
    }
}

/// Projectile fired by a ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub body: Body,
    pub player_id: PlayerId,
    pub lifetime: f32,
    pub radius: f32,
}

impl Bullet {
    pub fn new(id: EntityId, position: Vec2, velocity: Vec2, player_id: PlayerId, mass: f32) -> Self {
        Self {
            body: Body::new(id, BodyKind::Bullet, position, velocity, mass),
            player_id,
            lifetime: bullet::LIFETIME,
            radius: bullet::RADIUS,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            self.body.active = false;
        }
    }
}

/// Roaming black hole; does not wrap and leaves through the world edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlackHole {
    pub body: Body,
    /// Bodies closer than this are swallowed
    pub accretion_radius: f32,
    /// Event-horizon radius for rendering only
    pub visual_radius: f32,
}

impl BlackHole {
    pub fn new(id: EntityId, position: Vec2, velocity: Vec2, mass: f32, accretion_radius: f32) -> Self {
        Self {
            body: Body::new(id, BodyKind::BlackHole, position, velocity, mass),
            accretion_radius,
            visual_radius: black_hole::VISUAL_RADIUS,
        }
    }

    pub fn is_offscreen(&self, bounds: &WorldBounds) -> bool {
        bounds.is_outside(self.body.position, black_hole::OFFSCREEN_MARGIN)
    }
}

/// Explosion debris, purely visual
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub body: Body,
    pub lifetime: f32,
    pub max_lifetime: f32,
    /// -1 white, 0/1 player colours
    pub color: i32,
}

impl Particle {
    pub fn new(id: EntityId, position: Vec2, velocity: Vec2, lifetime: f32, color: i32) -> Self {
        Self {
            body: Body::new(id, BodyKind::Particle, position, velocity, particle::MASS),
            lifetime,
            max_lifetime: lifetime,
            color,
        }
    }

    /// Remaining life as a 0..1 fade factor
    pub fn alpha(&self) -> f32 {
        if self.max_lifetime > 0.0 {
            (self.lifetime / self.max_lifetime).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Ballistic motion, no gravity and no wrapping
    pub fn update(&mut self, dt: f32) {
        self.body.position += self.body.velocity * dt;
        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            self.body.active = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wrapping() {
        assert!(BodyKind::Ship.wraps());
        assert!(BodyKind::Asteroid.wraps());
        assert!(BodyKind::Bullet.wraps());
        assert!(!BodyKind::BlackHole.wraps());
        assert!(!BodyKind::Particle.wraps());
    }

    #[test]
    fn test_asteroid_mass_halves_per_size() {
        for size in 0..=asteroid::DUST_SIZE {
            let mass = Asteroid::mass_for_size(8000.0, size);
            assert!((mass - 8000.0 / 2f32.powi(size as i32)).abs() < 1e-3);
        }
    }

    #[test]
    fn test_asteroid_radius_table() {
        assert_eq!(Asteroid::radius_for_size(0), 40.0);
        assert_eq!(Asteroid::radius_for_size(5), 3.0);
        assert_eq!(Asteroid::radius_for_size(9), 3.0);
    }

    #[test]
    fn test_asteroid_base_mass_round_trip() {
        let a = Asteroid::new(1, Vec2::ZERO, Vec2::ZERO, 3, 6000.0, 0.0);
        assert!((a.body.mass - 750.0).abs() < 1e-3);
        assert!((a.base_mass() - 6000.0).abs() < 1e-2);
        assert!(a.body.wraps);
    }

    #[test]
    fn test_ship_spawns_invulnerable_pointing_up() {
        let s = Ship::new(0, Vec2::new(10.0, 10.0), 0, 1500.0);
        assert!(s.is_invulnerable());
        assert_eq!(s.lives, ship::STARTING_LIVES);
        assert!(s.heading().approx_eq(Vec2::new(0.0, -1.0), 1e-5));
    }

    #[test]
    fn test_ship_invulnerability_expires() {
        let mut s = Ship::new(0, Vec2::ZERO, 0, 1500.0);
        for _ in 0..400 {
            s.update(1.0 / 120.0);
        }
        assert!(!s.is_invulnerable());
        assert_eq!(s.invulnerable_time, 0.0);
    }

    #[test]
    fn test_ship_brake_stops_slow_ship() {
        let mut s = Ship::new(0, Vec2::ZERO, 0, 1500.0);
        s.body.velocity = Vec2::new(0.5, 0.0);
        s.brake(ship::BRAKE, 1.0 / 120.0);
        assert_eq!(s.body.velocity, Vec2::ZERO);

        s.body.velocity = Vec2::new(100.0, 0.0);
        s.brake(ship::BRAKE, 0.1);
        assert!((s.body.velocity.x - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_bullet_expires() {
        let mut b = Bullet::new(0, Vec2::ZERO, Vec2::ZERO, 0, 100.0);
        b.update(bullet::LIFETIME - 0.5);
        assert!(b.is_active());
        b.update(0.5);
        assert!(!b.is_active());
    }

    #[test]
    fn test_black_hole_offscreen() {
        let bounds = WorldBounds::new(800.0, 600.0);
        let mut bh = BlackHole::new(0, Vec2::new(-50.0, 100.0), Vec2::ZERO, 5000.0, 25.0);
        assert!(!bh.is_offscreen(&bounds));
        bh.body.position.x = -150.0;
        assert!(bh.is_offscreen(&bounds));
        assert!(!bh.body.wraps);
    }

    #[test]
    fn test_particle_moves_and_fades() {
        let mut p = Particle::new(0, Vec2::ZERO, Vec2::new(10.0, 0.0), 2.0, -1);
        p.update(0.5);
        assert!(p.body.position.approx_eq(Vec2::new(5.0, 0.0), 1e-5));
        assert!((p.alpha() - 0.75).abs() < 1e-5);
        p.update(2.0);
        assert!(!p.is_active());
    }
}
