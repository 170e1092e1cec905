use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::{info, warn};

use posture_monitor::{Config, KeypointSet, MonitoringSession, SystemClock, TracingAlertSink};

const DEFAULT_CONFIG_PATH: &str = "posture.toml";

/// Replays keypoint frames through one monitoring session.
///
/// Reads one JSON value per stdin line: an object of named joints, or
/// `null` when the detector found nobody. Writes one analysis result per
/// line to stdout.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(io::stderr)
        .init();

    info!("posture-monitor v{} starting", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = if Path::new(&config_path).exists() {
        Config::load(&config_path).with_context(|| format!("loading {config_path}"))?
    } else {
        info!(path = %config_path, "no config file, using defaults");
        Config::default()
    };

    let mut session = MonitoringSession::new(config, SystemClock, TracingAlertSink);
    session.start();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (line_no, line) in io::stdin().lock().lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let keypoints: Option<KeypointSet> = match serde_json::from_str(&line) {
            Ok(keypoints) => keypoints,
            Err(err) => {
                warn!(line = line_no + 1, error = %err, "skipping malformed frame");
                continue;
            }
        };

        let frame = session.process(keypoints.as_ref());
        serde_json::to_writer(&mut out, &frame.result)?;
        writeln!(out)?;
    }

    session.stop();

    Ok(())
}
