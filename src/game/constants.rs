/// Integrator defaults (overridable through `PhysicsConfig`)
pub mod physics {
    /// Fixed timestep in seconds (120 Hz)
    pub const DT: f32 = 1.0 / 120.0;
    /// Gravitational constant for body-body attraction
    pub const G: f32 = 100.0;
    /// Softening length
    pub const EPSILON: f32 = 5.0;
    /// Barnes-Hut opening angle
    pub const THETA: f32 = 0.5;
    /// Distances below this are treated as coincident
    pub const DEGENERATE_DISTANCE: f32 = 1e-6;
}

/// Barnes-Hut tree limits
pub mod tree {
    /// Maximum subdivision depth. Deeper inserts aggregate into the leaf,
    /// which stops endless splitting of coincident bodies.
    pub const MAX_DEPTH: u32 = 48;
    /// Initial arena capacity (nodes)
    pub const INITIAL_CAPACITY: usize = 256;
}

/// Ship constants
pub mod ship {
    pub const RADIUS: f32 = 10.0;
    pub const STARTING_LIVES: u32 = 3;
    /// Heading at spawn (pointing up-screen)
    pub const SPAWN_ANGLE: f32 = -std::f32::consts::FRAC_PI_2;
    /// Invulnerability window after spawn or respawn (seconds)
    pub const INVULNERABLE_DURATION: f32 = 3.0;
    /// Minimum time between shots (seconds)
    pub const SHOOT_COOLDOWN: f32 = 0.2;
    /// Turn rate (radians per second)
    pub const TURN_RATE: f32 = 3.0;
    /// Thrust acceleration (units per second squared)
    pub const THRUST: f32 = 500.0;
    /// Brake deceleration (units per second squared)
    pub const BRAKE: f32 = 500.0;
    /// Below this speed the brake stops the ship outright
    pub const BRAKE_STOP_SPEED: f32 = 1.0;
    /// Horizontal spawn fraction for player 0; player 1 adds `SPAWN_SPACING`
    pub const SPAWN_X_FRACTION: f32 = 0.3;
    pub const SPAWN_SPACING: f32 = 0.4;
}

/// Asteroid constants
pub mod asteroid {
    /// Smallest size class ("dust"), destroyed instead of split
    pub const DUST_SIZE: u8 = 5;
    /// Collision radius by size class, large to dust
    pub const RADII: [f32; 6] = [40.0, 25.0, 15.0, 10.0, 6.0, 3.0];
    /// Visual spin is drawn from [-MAX_SPIN, MAX_SPIN)
    pub const MAX_SPIN: f32 = 0.5;
    /// Fragment spawn offset as a multiple of the parent radius
    pub const FRAGMENT_OFFSET: f32 = 1.5;
    /// Share of the parent velocity kept by each fragment
    pub const FRAGMENT_VELOCITY_KEEP: f32 = 0.3;
    /// Separation speed is drawn from [MIN, MIN + RANGE)
    pub const FRAGMENT_SPEED_MIN: f32 = 100.0;
    pub const FRAGMENT_SPEED_RANGE: f32 = 100.0;
    /// Coefficient of restitution for asteroid-asteroid bounces
    pub const RESTITUTION: f32 = 1.0;
    /// Merged radius: sqrt(mass / MERGE_RADIUS_MASS) * MERGE_RADIUS_SCALE
    pub const MERGE_RADIUS_MASS: f32 = 100.0;
    pub const MERGE_RADIUS_SCALE: f32 = 40.0;
}

/// Bullet constants
pub mod bullet {
    pub const RADIUS: f32 = 2.0;
    pub const LIFETIME: f32 = 3.0;
    /// Muzzle speed added to the ship velocity
    pub const SPEED: f32 = 300.0;
    /// Spawn distance beyond the ship radius
    pub const SPAWN_GAP: f32 = 5.0;
}

/// Black hole constants
pub mod black_hole {
    /// Purely visual event-horizon radius
    pub const VISUAL_RADIUS: f32 = 15.0;
    /// Distance outside the world before a black hole is retired
    pub const OFFSCREEN_MARGIN: f32 = 100.0;
    /// Spawn distance outside the world edge
    pub const SPAWN_OFFSET: f32 = 50.0;
    /// Inward speed range at spawn
    pub const INWARD_SPEED_MIN: f32 = 80.0;
    pub const INWARD_SPEED_MAX: f32 = 150.0;
    /// Lateral speed range at spawn is [-LATERAL_SPEED, LATERAL_SPEED)
    pub const LATERAL_SPEED: f32 = 50.0;
    /// Mass = (BASE_MASS + wave * MASS_PER_WAVE) * multiplier
    pub const BASE_MASS: f32 = 5000.0;
    pub const MASS_PER_WAVE: f32 = 500.0;
}

/// Particle constants
pub mod particle {
    /// Nominal particle mass (particles never take part in gravity)
    pub const MASS: f32 = 0.1;
    /// Base lifetime before the explosion multiplier
    pub const BASE_LIFETIME: f32 = 1.0;
    /// Colour class for neutral (white) debris
    pub const WHITE: i32 = -1;
}

/// Explosion presets: (particle count, min speed, max speed, lifetime multiplier)
pub mod explosion {
    pub type Preset = (usize, f32, f32, f32);

    pub const SHIP_DEATH_CONTACT: Preset = (50, 150.0, 350.0, 1.3);
    pub const SHIP_DEATH_HULL: Preset = (40, 100.0, 300.0, 1.5);
    pub const SHIP_HIT: Preset = (40, 150.0, 350.0, 1.3);
    pub const ASTEROID_SPLIT: Preset = (8, 50.0, 150.0, 1.0);
    pub const ASTEROID_DUST: Preset = (15, 50.0, 150.0, 1.0);
    pub const ACCRETION_SHIP_DEATH: Preset = (60, 50.0, 250.0, 2.0);
    pub const ACCRETION_SHIP_HIT: Preset = (40, 50.0, 200.0, 1.5);
    pub const ACCRETION_OTHER: Preset = (20, 50.0, 150.0, 1.0);
}

/// Wave progression constants
pub mod wave {
    /// Extra asteroids per wave number
    pub const ASTEROIDS_PER_WAVE_NUMBER: u32 = 2;
    /// Asteroid speed = BASE_SPEED + wave * SPEED_PER_WAVE
    pub const BASE_SPEED: f32 = 20.0;
    pub const SPEED_PER_WAVE: f32 = 5.0;
}

/// Scoring constants
pub mod score {
    /// Points for any asteroid hit by a bullet (split or destroyed)
    pub const BULLET_KILL: u32 = 10;
}

/// Difficulty defaults (overridable through `DifficultyConfig`)
pub mod difficulty {
    pub const BH_SPAWN_RATE: f32 = 0.0005;
    pub const BH_MASS_MULT: f32 = 1.0;
    pub const BH_ACCRETION_RADIUS: f32 = 25.0;
    pub const SHIP_MASS: f32 = 1500.0;
    pub const BULLET_MASS: f32 = 100.0;
    pub const ASTEROID_BASE_MASS: f32 = 6000.0;
    pub const ASTEROID_COUNT: u32 = 4;
}

/// Potential tuning per level
pub mod potential {
    pub const POINT_MASS_GM: f32 = 50_000.0;
    pub const POINT_MASS_EPS: f32 = 20.0;
    pub const HARMONIC_OMEGA2: f32 = 0.0001;
    pub const LOG_V0: f32 = 10.0;
    /// Core radius as a fraction of world width
    pub const LOG_CORE_FRACTION: f32 = 0.1;
    pub const NFW_RHO_S: f32 = 0.004;
    /// Scale radius as a fraction of world width
    pub const NFW_SCALE_FRACTION: f32 = 0.2;
    pub const NFW_G: f32 = 50.0;
    pub const NFW_EPS: f32 = 10.0;
}

/// World defaults for the headless runner
pub mod world {
    pub const WIDTH: f32 = 1280.0;
    pub const HEIGHT: f32 = 720.0;
    pub const SEED: u64 = 12345;
}
