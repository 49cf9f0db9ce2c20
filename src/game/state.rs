//! Game state definitions and structures
//!
//! Holds every entity collection, the seeded RNG, the id allocator, the
//! clock and the per-tick event log. Systems operate on `&mut GameState`.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::game::bounds::WorldBounds;
use crate::game::entity::{
    Asteroid, BlackHole, Body, BodyRef, Bullet, EntityId, HasBody, Particle, PlayerId, Ship,
};
use crate::util::vec2::Vec2;

/// Notable outcome of a tick, for audio/HUD hosts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A ship lost a life but keeps playing
    ShipHit { player_id: PlayerId, lives: u32 },
    /// A ship lost its last life
    ShipDestroyed { player_id: PlayerId },
    /// An asteroid broke into two fragments
    AsteroidSplit { position: Vec2, size: u8 },
    /// Dust was shot to nothing
    AsteroidDestroyed { position: Vec2 },
    /// A black hole swallowed a body
    Accreted { position: Vec2, victim: EntityId },
    WaveStarted { wave: u32, asteroids: u32 },
    BlackHoleSpawned { position: Vec2, mass: f32 },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub bounds: WorldBounds,
    pub ships: Vec<Ship>,
    pub asteroids: Vec<Asteroid>,
    pub bullets: Vec<Bullet>,
    pub black_holes: Vec<BlackHole>,
    pub particles: Vec<Particle>,
    pub rng: Pcg32,
    /// Seed the RNG is restored to on reset
    pub seed: u64,
    /// Simulated seconds since the last reset
    pub time: f32,
    /// Current wave (1-based)
    pub wave: u32,
    /// Events raised during the current tick
    pub events: Vec<GameEvent>,
    next_entity_id: EntityId,
}

impl GameState {
    pub fn new(bounds: WorldBounds, seed: u64) -> Self {
        Self {
            bounds,
            ships: Vec::new(),
            asteroids: Vec::new(),
            bullets: Vec::new(),
            black_holes: Vec::new(),
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            seed,
            time: 0.0,
            wave: 1,
            events: Vec::new(),
            next_entity_id: 0,
        }
    }

    /// Drop every entity, rewind the clock and id counter, and reseed
    pub fn clear(&mut self) {
        self.ships.clear();
        self.asteroids.clear();
        self.bullets.clear();
        self.black_holes.clear();
        self.particles.clear();
        self.events.clear();
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.time = 0.0;
        self.wave = 1;
        self.next_entity_id = 0;
    }

    /// Generate a new unique entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    pub fn body(&self, r: BodyRef) -> &Body {
        match r {
            BodyRef::Ship(i) => self.ships[i].body(),
            BodyRef::Asteroid(i) => self.asteroids[i].body(),
            BodyRef::Bullet(i) => self.bullets[i].body(),
            BodyRef::BlackHole(i) => self.black_holes[i].body(),
        }
    }

    pub fn body_mut(&mut self, r: BodyRef) -> &mut Body {
        match r {
            BodyRef::Ship(i) => self.ships[i].body_mut(),
            BodyRef::Asteroid(i) => self.asteroids[i].body_mut(),
            BodyRef::Bullet(i) => self.bullets[i].body_mut(),
            BodyRef::BlackHole(i) => self.black_holes[i].body_mut(),
        }
    }

    /// Whether the handle still points at a live body
    pub fn is_active(&self, r: BodyRef) -> bool {
        self.body(r).active
    }

    /// Handles to every active body that takes part in gravity
    pub fn gravity_refs(&self) -> Vec<BodyRef> {
        let mut refs = Vec::with_capacity(
            self.ships.len() + self.asteroids.len() + self.bullets.len() + self.black_holes.len(),
        );
        refs.extend(active_indices(&self.ships).map(BodyRef::Ship));
        refs.extend(active_indices(&self.asteroids).map(BodyRef::Asteroid));
        refs.extend(active_indices(&self.bullets).map(BodyRef::Bullet));
        refs.extend(active_indices(&self.black_holes).map(BodyRef::BlackHole));
        refs
    }

    /// Remove inactive asteroids, bullets, black holes and particles.
    /// Ships stay in place so player slots keep their index.
    pub fn remove_inactive(&mut self) {
        self.asteroids.retain(|a| a.is_active());
        self.bullets.retain(|b| b.is_active());
        self.black_holes.retain(|b| b.is_active());
        self.particles.retain(|p| p.is_active());
    }

    /// All ships are out of play
    pub fn is_game_over(&self) -> bool {
        self.ships.iter().all(|s| !s.is_active())
    }

    pub fn active_asteroid_count(&self) -> usize {
        self.asteroids.iter().filter(|a| a.is_active()).count()
    }

    pub fn entity_count(&self) -> usize {
        self.ships.len()
            + self.asteroids.len()
            + self.bullets.len()
            + self.black_holes.len()
            + self.particles.len()
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

fn active_indices<T: HasBody>(items: &[T]) -> impl Iterator<Item = usize> + '_ {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.is_active())
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn state() -> GameState {
        GameState::new(WorldBounds::new(800.0, 600.0), 42)
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut s = state();
        let a = s.next_entity_id();
        let b = s.next_entity_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_game_over_requires_all_ships_inactive() {
        let mut s = state();
        for player in 0..2 {
            let id = s.next_entity_id();
            s.ships.push(Ship::new(id, Vec2::ZERO, player, 1500.0));
        }
        assert!(!s.is_game_over());
        s.ships[0].body.active = false;
        assert!(!s.is_game_over());
        s.ships[1].body.active = false;
        assert!(s.is_game_over());
    }

    #[test]
    fn test_gravity_refs_skip_inactive_and_particles() {
        let mut s = state();
        s.ships.push(Ship::new(0, Vec2::ZERO, 0, 1500.0));
        s.asteroids.push(Asteroid::new(1, Vec2::ZERO, Vec2::ZERO, 0, 6000.0, 0.0));
        s.asteroids.push(Asteroid::new(2, Vec2::ZERO, Vec2::ZERO, 0, 6000.0, 0.0));
        s.particles.push(Particle::new(3, Vec2::ZERO, Vec2::ZERO, 1.0, -1));
        s.asteroids[0].body.active = false;

        let refs = s.gravity_refs();
        assert_eq!(refs, vec![BodyRef::Ship(0), BodyRef::Asteroid(1)]);
    }

    #[test]
    fn test_remove_inactive_keeps_ships() {
        let mut s = state();
        s.ships.push(Ship::new(0, Vec2::ZERO, 0, 1500.0));
        s.ships[0].body.active = false;
        s.bullets.push(Bullet::new(1, Vec2::ZERO, Vec2::ZERO, 0, 100.0));
        s.bullets[0].body.active = false;

        s.remove_inactive();
        assert_eq!(s.ships.len(), 1);
        assert!(s.bullets.is_empty());
    }

    #[test]
    fn test_clear_reseeds_rng() {
        let mut s = state();
        let first: u32 = s.rng.gen();
        s.time = 10.0;
        s.wave = 4;
        s.clear();
        let again: u32 = s.rng.gen();
        assert_eq!(first, again);
        assert_eq!(s.time, 0.0);
        assert_eq!(s.wave, 1);
    }

    #[test]
    fn test_body_mut_by_handle() {
        let mut s = state();
        s.black_holes.push(BlackHole::new(0, Vec2::ZERO, Vec2::ZERO, 5000.0, 25.0));
        s.body_mut(BodyRef::BlackHole(0)).velocity = Vec2::new(1.0, 2.0);
        assert_eq!(s.black_holes[0].body.velocity, Vec2::new(1.0, 2.0));
        assert!(s.is_active(BodyRef::BlackHole(0)));
    }
}
