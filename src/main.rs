//! Headless runner for the particle field
//!
//! Drives the simulator on an in-memory surface at a fixed tick rate and logs
//! field statistics. Configured through `NEON_FIELD_*` variables, see
//! `neon_field::config`.
//!
//! Run with: cargo run --features cli --bin neon-cli

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use neon_field::config::HeadlessConfig;
    use neon_field::core::{FieldSimulator, ManualClock, RecordingSurface};
    use neon_field::time::now_seconds;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;
    use tracing::{info, warn};
    use tracing_subscriber::{fmt, EnvFilter};

    const STATS_EVERY: u64 = 60;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,neon_field=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let config = HeadlessConfig::from_env()?;
    info!(
        width = config.size.x,
        height = config.size.y,
        ratio = config.pixel_ratio,
        frames = ?config.frames,
        fps = config.fps,
        seed = ?config.seed,
        "Starting particle field"
    );

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let surface = RecordingSurface::new(config.size, config.pixel_ratio);
    let mut sim = FieldSimulator::mount(Some(surface), ManualClock::new(), rng)
        .ok_or("particle field failed to mount")?;

    if let Some(pointer) = config.pointer {
        sim.pointer_moved(pointer, glam::DVec2::ZERO);
    }

    let started = now_seconds();
    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / config.fps));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !sim.advance() {
                    warn!("No frame pending, stopping");
                    break;
                }
                let frames = sim.frames();
                if frames % STATS_EVERY == 0 {
                    let elapsed = now_seconds() - started;
                    info!(
                        frame = frames,
                        links = sim.last_stats().links,
                        mean_speed = format!("{:.3}", sim.field().mean_speed()),
                        fps = format!("{:.1}", frames as f64 / elapsed.max(f64::EPSILON)),
                        "stats"
                    );
                }
                if config.frames.is_some_and(|limit| frames >= limit) {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break;
            }
        }
    }

    sim.unmount();
    info!(
        frames = sim.frames(),
        seconds = format!("{:.2}", now_seconds() - started),
        "Particle field stopped"
    );

    if let Some(path) = &config.snapshot {
        let json = serde_json::to_string_pretty(&sim.snapshot())?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "Snapshot written");
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
