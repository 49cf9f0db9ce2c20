//! N-body Asteroids engine library
//!
//! A 2D arcade world where ships, asteroids, bullets and roaming black holes
//! attract each other through a Barnes-Hut tree, under an optional
//! background potential, integrated with a fixed-step leapfrog.
//!
//! # Features
//!
//! - `parallel` - Evaluate per-body gravity on the rayon thread pool

pub mod config;
pub mod game;
pub mod util;

pub use config::{ConfigError, DifficultyConfig, EngineConfig, GameMode, PhysicsConfig};
pub use game::engine::{Engine, Snapshot};
pub use game::performance::StepStats;
pub use game::potential::Potential;
pub use game::state::GameEvent;
pub use game::systems::physics::InputState;
pub use util::vec2::Vec2;
