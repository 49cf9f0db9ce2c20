use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::constants::{difficulty, physics, world};

/// Configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("world size must be positive and finite, got {width}x{height}")]
    InvalidWorldSize { width: f32, height: f32 },
    #[error("timestep must be positive and finite, got {0}")]
    InvalidTimestep(f32),
    #[error("{name} must be non-negative and finite, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[error("black hole spawn probability must be within [0, 1], got {0}")]
    InvalidProbability(f32),
    #[error("unknown game mode {0}")]
    UnknownGameMode(String),
}

/// Player arrangement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Solo,
    Coop,
    Versus,
}

impl GameMode {
    /// Number of ships spawned on reset
    pub fn ship_count(self) -> usize {
        match self {
            GameMode::Solo => 1,
            GameMode::Coop | GameMode::Versus => 2,
        }
    }
}

impl TryFrom<u8> for GameMode {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GameMode::Solo),
            1 => Ok(GameMode::Coop),
            2 => Ok(GameMode::Versus),
            other => Err(ConfigError::UnknownGameMode(other.to_string())),
        }
    }
}

impl FromStr for GameMode {
    type Err = ConfigError;

    /// Accepts the numeric id or the name, case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<u8>() {
            return GameMode::try_from(id);
        }
        match s.to_ascii_lowercase().as_str() {
            "solo" => Ok(GameMode::Solo),
            "coop" => Ok(GameMode::Coop),
            "versus" => Ok(GameMode::Versus),
            _ => Err(ConfigError::UnknownGameMode(s.to_string())),
        }
    }
}

/// Integrator configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Fixed timestep (seconds)
    pub dt: f32,
    /// Gravitational constant
    pub g: f32,
    /// Softening length
    pub epsilon: f32,
    /// Barnes-Hut opening angle
    pub theta: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            dt: physics::DT,
            g: physics::G,
            epsilon: physics::EPSILON,
            theta: physics::THETA,
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ConfigError::InvalidTimestep(self.dt));
        }
        non_negative("g", self.g)?;
        non_negative("epsilon", self.epsilon)?;
        non_negative("theta", self.theta)?;
        Ok(())
    }
}

/// Difficulty settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    /// Chance per tick that a black hole enters the world
    pub black_hole_spawn_rate: f32,
    /// Multiplier on black hole mass
    pub black_hole_mass_mult: f32,
    /// Radius inside which black holes swallow bodies
    pub black_hole_accretion_radius: f32,
    pub black_holes_enabled: bool,
    pub ship_mass: f32,
    pub bullet_mass: f32,
    /// Mass of a size-0 asteroid
    pub asteroid_base_mass: f32,
    /// Asteroids in a wave before the per-wave bonus
    pub asteroids_per_wave: u32,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            black_hole_spawn_rate: difficulty::BH_SPAWN_RATE,
            black_hole_mass_mult: difficulty::BH_MASS_MULT,
            black_hole_accretion_radius: difficulty::BH_ACCRETION_RADIUS,
            black_holes_enabled: true,
            ship_mass: difficulty::SHIP_MASS,
            bullet_mass: difficulty::BULLET_MASS,
            asteroid_base_mass: difficulty::ASTEROID_BASE_MASS,
            asteroids_per_wave: difficulty::ASTEROID_COUNT,
        }
    }
}

impl DifficultyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = self.black_hole_spawn_rate;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::InvalidProbability(p));
        }
        non_negative("black_hole_mass_mult", self.black_hole_mass_mult)?;
        non_negative("black_hole_accretion_radius", self.black_hole_accretion_radius)?;
        non_negative("ship_mass", self.ship_mass)?;
        non_negative("bullet_mass", self.bullet_mass)?;
        non_negative("asteroid_base_mass", self.asteroid_base_mass)?;
        Ok(())
    }
}

/// Full engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub width: f32,
    pub height: f32,
    pub seed: u64,
    pub mode: GameMode,
    /// Potential level id (0-4, others mean free space)
    pub level: i32,
    pub physics: PhysicsConfig,
    pub difficulty: DifficultyConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: world::WIDTH,
            height: world::HEIGHT,
            seed: world::SEED,
            mode: GameMode::default(),
            level: 0,
            physics: PhysicsConfig::default(),
            difficulty: DifficultyConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        env_override("WORLD_WIDTH", &mut config.width, |v: &f32| *v > 0.0, "must be > 0");
        env_override("WORLD_HEIGHT", &mut config.height, |v: &f32| *v > 0.0, "must be > 0");
        env_override("SEED", &mut config.seed, |_: &u64| true, "");
        env_override("GAME_MODE", &mut config.mode, |_: &GameMode| true, "");
        env_override("LEVEL", &mut config.level, |_: &i32| true, "");

        let physics = &mut config.physics;
        env_override("PHYSICS_DT", &mut physics.dt, |v: &f32| *v > 0.0, "must be > 0");
        env_override("PHYSICS_G", &mut physics.g, |v: &f32| *v >= 0.0, "must be >= 0");
        env_override("PHYSICS_EPSILON", &mut physics.epsilon, |v: &f32| *v >= 0.0, "must be >= 0");
        env_override("PHYSICS_THETA", &mut physics.theta, |v: &f32| *v >= 0.0, "must be >= 0");

        let diff = &mut config.difficulty;
        env_override(
            "BH_SPAWN_RATE",
            &mut diff.black_hole_spawn_rate,
            |v: &f32| (0.0..=1.0).contains(v),
            "must be within 0-1",
        );
        env_override("BH_MASS_MULT", &mut diff.black_hole_mass_mult, |v: &f32| *v >= 0.0, "must be >= 0");
        env_override(
            "BH_ACCRETION_RADIUS",
            &mut diff.black_hole_accretion_radius,
            |v: &f32| *v >= 0.0,
            "must be >= 0",
        );
        env_override("BH_ENABLED", &mut diff.black_holes_enabled, |_: &bool| true, "");
        env_override("SHIP_MASS", &mut diff.ship_mass, |v: &f32| *v >= 0.0, "must be >= 0");
        env_override("BULLET_MASS", &mut diff.bullet_mass, |v: &f32| *v >= 0.0, "must be >= 0");
        env_override("ASTEROID_BASE_MASS", &mut diff.asteroid_base_mass, |v: &f32| *v >= 0.0, "must be >= 0");
        env_override("ASTEROID_COUNT", &mut diff.asteroids_per_wave, |_: &u32| true, "");

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sized = |v: f32| v.is_finite() && v > 0.0;
        if !(sized(self.width) && sized(self.height)) {
            return Err(ConfigError::InvalidWorldSize {
                width: self.width,
                height: self.height,
            });
        }
        self.physics.validate()?;
        self.difficulty.validate()?;
        Ok(())
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

/// Replace `target` with the parsed env var when it parses and passes `valid`
fn env_override<T: FromStr>(name: &str, target: &mut T, valid: impl Fn(&T) -> bool, rule: &str) {
    let Ok(raw) = std::env::var(name) else {
        return;
    };
    match raw.parse::<T>() {
        Ok(parsed) if valid(&parsed) => *target = parsed,
        Ok(_) => tracing::warn!("{} {}, using default", name, rule),
        Err(_) => tracing::warn!("Invalid {} '{}', using default", name, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.width, 1280.0);
        assert_eq!(config.height, 720.0);
        assert_eq!(config.mode, GameMode::Solo);
        assert_eq!(config.physics.g, 100.0);
        assert_eq!(config.physics.theta, 0.5);
        assert_eq!(config.difficulty.asteroids_per_wave, 4);
        assert!(config.difficulty.black_holes_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_or_default() {
        let config = EngineConfig::load_or_default();
        assert!(config.width > 0.0);
        assert!(config.physics.dt > 0.0);
    }

    #[test]
    fn test_validate_rejects_bad_world() {
        let config = EngineConfig {
            width: 0.0,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidWorldSize { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_physics() {
        let mut config = EngineConfig::default();
        config.physics.dt = -1.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidTimestep(-1.0)));

        let mut config = EngineConfig::default();
        config.physics.theta = -0.1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative { name: "theta", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_difficulty() {
        let mut config = EngineConfig::default();
        config.difficulty.black_hole_spawn_rate = 1.5;
        assert_eq!(config.validate(), Err(ConfigError::InvalidProbability(1.5)));

        let mut config = EngineConfig::default();
        config.difficulty.ship_mass = -10.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative { name: "ship_mass", .. })
        ));
    }

    #[test]
    fn test_game_mode_conversions() {
        assert_eq!(GameMode::try_from(0), Ok(GameMode::Solo));
        assert_eq!(GameMode::try_from(2), Ok(GameMode::Versus));
        assert!(GameMode::try_from(3).is_err());
        assert_eq!("coop".parse::<GameMode>(), Ok(GameMode::Coop));
        assert_eq!("1".parse::<GameMode>(), Ok(GameMode::Coop));
        assert!("duel".parse::<GameMode>().is_err());
        assert_eq!(GameMode::Solo.ship_count(), 1);
        assert_eq!(GameMode::Versus.ship_count(), 2);
    }

    #[test]
    fn test_config_serializes() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
