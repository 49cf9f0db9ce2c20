//! Engine facade
//!
//! [`Engine`] owns the game state, the Barnes-Hut tree and the active
//! potential, and exposes the command/query surface a host drives: set
//! inputs, call [`Engine::step`] at the physics rate, read entity slices.

use serde::{Deserialize, Serialize};

use crate::config::{DifficultyConfig, EngineConfig, GameMode, PhysicsConfig};
use crate::game::bounds::WorldBounds;
use crate::game::constants::ship;
use crate::game::entity::{Asteroid, BlackHole, Bullet, Particle, PlayerId, Ship};
use crate::game::performance::{PerformanceMonitor, StepStats};
use crate::game::potential::Potential;
use crate::game::quadtree::QuadTree;
use crate::game::state::{GameEvent, GameState};
use crate::game::systems::collision::{self, CollisionPair};
use crate::game::systems::physics::{self, InputState};
use crate::game::systems::{gravity, response, spawn};
use crate::util::vec2::Vec2;

/// Input slots; player ids outside this range are ignored
pub const MAX_PLAYERS: usize = 2;

/// Serializable copy of everything a renderer or replay needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub time: f32,
    pub wave: u32,
    pub mode: GameMode,
    pub level: i32,
    pub potential: String,
    pub bounds: WorldBounds,
    pub ships: Vec<Ship>,
    pub asteroids: Vec<Asteroid>,
    pub bullets: Vec<Bullet>,
    pub black_holes: Vec<BlackHole>,
    pub particles: Vec<Particle>,
    pub game_over: bool,
}

pub struct Engine {
    config: EngineConfig,
    state: GameState,
    tree: QuadTree,
    potential: Potential,
    inputs: [InputState; MAX_PLAYERS],
    pairs: Vec<CollisionPair>,
    monitor: PerformanceMonitor,
    last_stats: StepStats,
    tick: u64,
}

impl Engine {
    /// Engine with default physics and difficulty for a `width` x `height` world
    pub fn new(width: f32, height: f32, seed: u64) -> Self {
        Self::with_config(EngineConfig {
            width,
            height,
            seed,
            ..EngineConfig::default()
        })
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let bounds = WorldBounds::new(config.width, config.height);
        let mut engine = Self {
            config,
            state: GameState::new(bounds, config.seed),
            tree: QuadTree::new(bounds),
            potential: Potential::for_level(config.level, bounds.center(), bounds.width),
            inputs: [InputState::default(); MAX_PLAYERS],
            pairs: Vec::new(),
            monitor: PerformanceMonitor::new(config.physics.dt),
            last_stats: StepStats::default(),
            tick: 0,
        };
        engine.reset();
        engine
    }

    /// Clear the world, reseed and start wave 1. Mode, level and difficulty carry over.
    pub fn reset(&mut self) {
        self.state.clear();
        self.pairs.clear();
        self.monitor.clear();
        self.last_stats = StepStats::default();
        self.tick = 0;

        let bounds = self.state.bounds;
        for player in 0..self.config.mode.ship_count() {
            let x = bounds.width * (ship::SPAWN_X_FRACTION + player as f32 * ship::SPAWN_SPACING);
            let position = Vec2::new(x, bounds.height * 0.5);
            let id = self.state.next_entity_id();
            self.state
                .ships
                .push(Ship::new(id, position, player, self.config.difficulty.ship_mass));
        }

        spawn::spawn_wave(&mut self.state, &self.config.difficulty);
        tracing::debug!(
            mode = ?self.config.mode,
            level = self.config.level,
            seed = self.config.seed,
            "Engine reset"
        );
    }

    /// Advance the simulation by one fixed timestep
    pub fn step(&mut self) {
        self.monitor.step_start();
        let dt = self.config.physics.dt;
        let difficulty = self.config.difficulty;
        self.state.events.clear();

        physics::update(&mut self.state, dt);
        for (player, input) in self.inputs.iter().enumerate() {
            physics::apply_input(&mut self.state, player, input, difficulty.bullet_mass, dt);
        }

        let leapfrog = gravity::update(
            &mut self.state,
            &mut self.tree,
            &self.potential,
            &self.config.physics,
        );

        collision::detect(&self.state, &mut self.pairs);
        let handled = response::resolve(&mut self.state, &self.pairs);

        let spawned = spawn::maybe_spawn_black_hole(&mut self.state, &difficulty);
        self.state.remove_inactive();
        let advanced = spawn::check_wave_complete(&mut self.state, &difficulty);

        self.state.time += dt;
        self.tick += 1;

        self.last_stats = StepStats {
            tick: self.tick,
            gravity_bodies: leapfrog.bodies,
            tree_nodes: self.tree.node_count(),
            collisions_detected: self.pairs.len(),
            collisions_handled: handled,
            black_holes_retired: leapfrog.black_holes_retired,
            black_hole_spawned: spawned,
            wave_advanced: advanced,
            entities: self.state.entity_count(),
            kinetic_energy: physics::total_kinetic_energy(&self.state),
            momentum: physics::total_momentum(&self.state),
            duration: self.monitor.step_end(),
        };
        tracing::trace!(
            tick = self.tick,
            bodies = leapfrog.bodies,
            nodes = self.last_stats.tree_nodes,
            collisions = handled,
            "Step complete"
        );
    }

    // === Commands ===

    /// Switch player arrangement; always resets the game
    pub fn set_mode(&mut self, mode: GameMode) {
        self.config.mode = mode;
        self.reset();
    }

    /// Select the background potential; takes effect on the next step
    pub fn set_level(&mut self, level: i32) {
        self.config.level = level;
        let bounds = self.state.bounds;
        self.potential = Potential::for_level(level, bounds.center(), bounds.width);
    }

    /// Replace the difficulty settings. Live entities keep their masses.
    pub fn set_difficulty(&mut self, difficulty: DifficultyConfig) {
        self.config.difficulty = difficulty;
    }

    pub fn set_black_holes_enabled(&mut self, enabled: bool) {
        self.config.difficulty.black_holes_enabled = enabled;
    }

    /// Set ship mass for new and existing ships
    pub fn set_ship_mass(&mut self, mass: f32) {
        self.config.difficulty.ship_mass = mass;
        for s in &mut self.state.ships {
            s.body.mass = mass;
        }
    }

    /// Set bullet mass for new and existing bullets
    pub fn set_bullet_mass(&mut self, mass: f32) {
        self.config.difficulty.bullet_mass = mass;
        for b in &mut self.state.bullets {
            b.body.mass = mass;
        }
    }

    /// Set the size-0 asteroid mass and rescale existing asteroids by size
    pub fn set_asteroid_base_mass(&mut self, mass: f32) {
        self.config.difficulty.asteroid_base_mass = mass;
        for a in &mut self.state.asteroids {
            a.body.mass = Asteroid::mass_for_size(mass, a.size);
        }
    }

    /// Controls held by `player` from the next step on
    pub fn set_input(&mut self, player: PlayerId, input: InputState) {
        if let Some(slot) = self.inputs.get_mut(player) {
            *slot = input;
        }
    }

    // === Queries ===

    pub fn ships(&self) -> &[Ship] {
        &self.state.ships
    }

    pub fn asteroids(&self) -> &[Asteroid] {
        &self.state.asteroids
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.state.bullets
    }

    pub fn black_holes(&self) -> &[BlackHole] {
        &self.state.black_holes
    }

    pub fn particles(&self) -> &[Particle] {
        &self.state.particles
    }

    pub fn ship(&self, index: usize) -> Option<&Ship> {
        self.state.ships.get(index)
    }

    pub fn asteroid(&self, index: usize) -> Option<&Asteroid> {
        self.state.asteroids.get(index)
    }

    pub fn bullet(&self, index: usize) -> Option<&Bullet> {
        self.state.bullets.get(index)
    }

    pub fn black_hole(&self, index: usize) -> Option<&BlackHole> {
        self.state.black_holes.get(index)
    }

    pub fn particle(&self, index: usize) -> Option<&Particle> {
        self.state.particles.get(index)
    }

    pub fn world_width(&self) -> f32 {
        self.state.bounds.width
    }

    pub fn world_height(&self) -> f32 {
        self.state.bounds.height
    }

    pub fn time(&self) -> f32 {
        self.state.time
    }

    pub fn wave(&self) -> u32 {
        self.state.wave
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    pub fn mode(&self) -> GameMode {
        self.config.mode
    }

    pub fn level(&self) -> i32 {
        self.config.level
    }

    pub fn difficulty(&self) -> &DifficultyConfig {
        &self.config.difficulty
    }

    pub fn physics(&self) -> &PhysicsConfig {
        &self.config.physics
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn potential(&self) -> &Potential {
        &self.potential
    }

    pub fn potential_name(&self) -> &'static str {
        self.potential.name()
    }

    pub fn potential_description(&self) -> &'static str {
        self.potential.description()
    }

    /// Events raised by the most recent step
    pub fn events(&self) -> &[GameEvent] {
        &self.state.events
    }

    pub fn last_step_stats(&self) -> &StepStats {
        &self.last_stats
    }

    pub fn performance(&self) -> &PerformanceMonitor {
        &self.monitor
    }

    /// Tree built during the last step
    pub fn tree(&self) -> &QuadTree {
        &self.tree
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            time: self.state.time,
            wave: self.state.wave,
            mode: self.config.mode,
            level: self.config.level,
            potential: self.potential.name().to_string(),
            bounds: self.state.bounds,
            ships: self.state.ships.clone(),
            asteroids: self.state.asteroids.clone(),
            bullets: self.state.bullets.clone(),
            black_holes: self.state.black_holes.clone(),
            particles: self.state.particles.clone(),
            game_over: self.state.is_game_over(),
        }
    }
}
