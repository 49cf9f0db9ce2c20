use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nbody_asteroids::config::EngineConfig;
use nbody_asteroids::game::engine::Engine;
use nbody_asteroids::game::state::GameEvent;
use nbody_asteroids::game::systems::physics::InputState;

const DEFAULT_TICKS: u64 = 1200;

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("N-body asteroids v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = EngineConfig::load_or_default();
    config.validate().context("invalid engine configuration")?;
    info!(
        "Configuration loaded: {}x{}, seed={}, mode={:?}, level={}",
        config.width, config.height, config.seed, config.mode, config.level
    );

    let ticks = match std::env::var("TICKS") {
        Ok(raw) => raw.parse::<u64>().unwrap_or_else(|_| {
            warn!("Invalid TICKS '{}', using default", raw);
            DEFAULT_TICKS
        }),
        Err(_) => DEFAULT_TICKS,
    };
    let autopilot = std::env::var("AUTOPILOT").map(|v| v == "1").unwrap_or(false);

    let mut engine = Engine::with_config(config);
    info!("Potential: {}", engine.potential_name());

    let mut ticks_run = 0;
    for tick in 0..ticks {
        if autopilot {
            let phase = (tick / 120) % 2 == 0;
            for player in 0..engine.ships().len() {
                engine.set_input(
                    player,
                    InputState {
                        right: player == 0,
                        left: player == 1,
                        thrust: phase,
                        brake: !phase,
                        shoot: true,
                    },
                );
            }
        }

        engine.step();
        ticks_run += 1;

        for event in engine.events() {
            match event {
                GameEvent::WaveStarted { wave, asteroids } => {
                    info!("Wave {} started with {} asteroids", wave, asteroids)
                }
                GameEvent::ShipDestroyed { player_id } => {
                    info!("Player {} ship destroyed", player_id)
                }
                GameEvent::BlackHoleSpawned { mass, .. } => {
                    info!("Black hole entered (mass {:.0})", mass)
                }
                _ => {}
            }
        }

        if engine.is_game_over() {
            info!("Game over at t={:.2}s", engine.time());
            break;
        }
    }

    let scores: Vec<_> = engine.ships().iter().map(|s| (s.player_id, s.score, s.lives)).collect();
    info!(
        "Ran {} ticks: t={:.2}s, wave {}, {} asteroids, scores (player, score, lives) {:?}",
        ticks_run,
        engine.time(),
        engine.wave(),
        engine.asteroids().len(),
        scores
    );
    let stats = engine.last_step_stats();
    info!(
        "Kinetic energy {:.1}, momentum ({:.2}, {:.2})",
        stats.kinetic_energy, stats.momentum.x, stats.momentum.y
    );
    let performance = engine.performance();
    if performance.status().is_real_time() {
        info!("Performance: {}", performance.status_message());
    } else {
        warn!("Steps are slower than real time: {}", performance.status_message());
    }

    if let Ok(path) = std::env::var("SNAPSHOT_PATH") {
        let json = serde_json::to_string_pretty(&engine.snapshot())?;
        std::fs::write(&path, json).with_context(|| format!("writing snapshot to {}", path))?;
        info!("Snapshot written to {}", path);
    }

    Ok(())
}
