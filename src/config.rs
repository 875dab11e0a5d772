//! Headless run configuration
//!
//! Simulation constants are fixed in code; only the host is configurable.
//! Every variable is optional:
//!
//! - `NEON_FIELD_SIZE`: logical surface size, `WIDTHxHEIGHT` (default `1280x720`)
//! - `NEON_FIELD_RATIO`: device pixel ratio (default `1`)
//! - `NEON_FIELD_FRAMES`: frames to run, `0` = until Ctrl-C (default `600`)
//! - `NEON_FIELD_FPS`: frame rate of the tick clock (default `60`)
//! - `NEON_FIELD_SEED`: RNG seed for reproducible runs
//! - `NEON_FIELD_POINTER`: fixed pointer position, `X,Y`
//! - `NEON_FIELD_SNAPSHOT`: write the final field as JSON to this path

use std::path::PathBuf;

use glam::DVec2;
use thiserror::Error;

pub const ENV_SIZE: &str = "NEON_FIELD_SIZE";
pub const ENV_RATIO: &str = "NEON_FIELD_RATIO";
pub const ENV_FRAMES: &str = "NEON_FIELD_FRAMES";
pub const ENV_FPS: &str = "NEON_FIELD_FPS";
pub const ENV_SEED: &str = "NEON_FIELD_SEED";
pub const ENV_POINTER: &str = "NEON_FIELD_POINTER";
pub const ENV_SNAPSHOT: &str = "NEON_FIELD_SNAPSHOT";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{var}: expected WIDTHxHEIGHT, got {value:?}")]
    InvalidSize { var: &'static str, value: String },
    #[error("{var}: expected X,Y, got {value:?}")]
    InvalidPointer { var: &'static str, value: String },
    #[error("{var}: not a valid number: {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var}: must be positive, got {value}")]
    NotPositive { var: &'static str, value: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeadlessConfig {
    pub size: DVec2,
    pub pixel_ratio: f64,
    /// None runs until interrupted
    pub frames: Option<u64>,
    pub fps: f64,
    pub seed: Option<u64>,
    pub pointer: Option<DVec2>,
    pub snapshot: Option<PathBuf>,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            size: DVec2::new(1280.0, 720.0),
            pixel_ratio: 1.0,
            frames: Some(600),
            fps: 60.0,
            seed: None,
            pointer: None,
            snapshot: None,
        }
    }
}

impl HeadlessConfig {
    /// Read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or empty keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(value) = get(ENV_SIZE) {
            config.size = parse_pair(&value, 'x').ok_or(ConfigError::InvalidSize {
                var: ENV_SIZE,
                value: value.clone(),
            })?;
            if config.size.x < 0.0 || config.size.y < 0.0 {
                return Err(ConfigError::InvalidSize { var: ENV_SIZE, value });
            }
        }
        if let Some(value) = get(ENV_RATIO) {
            config.pixel_ratio = positive(ENV_RATIO, parse_number(ENV_RATIO, &value)?)?;
        }
        if let Some(value) = get(ENV_FRAMES) {
            let frames: u64 = parse_number(ENV_FRAMES, &value)?;
            config.frames = (frames > 0).then_some(frames);
        }
        if let Some(value) = get(ENV_FPS) {
            config.fps = positive(ENV_FPS, parse_number(ENV_FPS, &value)?)?;
        }
        if let Some(value) = get(ENV_SEED) {
            config.seed = Some(parse_number(ENV_SEED, &value)?);
        }
        if let Some(value) = get(ENV_POINTER) {
            config.pointer = Some(parse_pair(&value, ',').ok_or(ConfigError::InvalidPointer {
                var: ENV_POINTER,
                value,
            })?);
        }
        config.snapshot = get(ENV_SNAPSHOT).map(PathBuf::from);

        Ok(config)
    }
}

fn parse_pair(value: &str, separator: char) -> Option<DVec2> {
    let (a, b) = value.split_once(separator)?;
    let x: f64 = a.trim().parse().ok()?;
    let y: f64 = b.trim().parse().ok()?;
    (x.is_finite() && y.is_finite()).then(|| DVec2::new(x, y))
}

fn parse_number<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: value.to_string(),
    })
}

fn positive(var: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NotPositive { var, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<HeadlessConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HeadlessConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_set() {
        assert_eq!(config(&[]).unwrap(), HeadlessConfig::default());
    }

    #[test]
    fn parses_every_variable() {
        let cfg = config(&[
            (ENV_SIZE, "1920x1080"),
            (ENV_RATIO, "1.5"),
            (ENV_FRAMES, "120"),
            (ENV_FPS, "30"),
            (ENV_SEED, "99"),
            (ENV_POINTER, " 640 , 360 "),
            (ENV_SNAPSHOT, "/tmp/field.json"),
        ])
        .unwrap();

        assert_eq!(cfg.size, DVec2::new(1920.0, 1080.0));
        assert_eq!(cfg.pixel_ratio, 1.5);
        assert_eq!(cfg.frames, Some(120));
        assert_eq!(cfg.fps, 30.0);
        assert_eq!(cfg.seed, Some(99));
        assert_eq!(cfg.pointer, Some(DVec2::new(640.0, 360.0)));
        assert_eq!(cfg.snapshot, Some(PathBuf::from("/tmp/field.json")));
    }

    #[test]
    fn zero_frames_means_unbounded() {
        assert_eq!(config(&[(ENV_FRAMES, "0")]).unwrap().frames, None);
    }

    #[test]
    fn empty_values_keep_defaults() {
        assert_eq!(config(&[(ENV_SIZE, "  ")]).unwrap().size, DVec2::new(1280.0, 720.0));
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(matches!(
            config(&[(ENV_SIZE, "1920by1080")]),
            Err(ConfigError::InvalidSize { .. })
        ));
        assert!(matches!(
            config(&[(ENV_SIZE, "-5x10")]),
            Err(ConfigError::InvalidSize { .. })
        ));
        assert!(matches!(
            config(&[(ENV_POINTER, "12")]),
            Err(ConfigError::InvalidPointer { .. })
        ));
        assert!(matches!(
            config(&[(ENV_FRAMES, "-1")]),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert_eq!(
            config(&[(ENV_FPS, "0")]),
            Err(ConfigError::NotPositive { var: ENV_FPS, value: 0.0 })
        );
    }

    #[test]
    fn error_messages_name_the_variable() {
        let err = config(&[(ENV_RATIO, "fast")]).unwrap_err();
        assert_eq!(err.to_string(), "NEON_FIELD_RATIO: not a valid number: \"fast\"");
    }
}
