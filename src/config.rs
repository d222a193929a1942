// SPDX-License-Identifier: MPL-2.0
//! Engine configuration, including loading and saving settings from a
//! TOML file.
//!
//! All values are fixed at engine construction. Durations are expressed as
//! fractional seconds in the file format.
//!
//! # Examples
//!
//! ```no_run
//! use notiq::config::{self, Config};
//! use std::path::Path;
//!
//! let mut config = config::load_from_path(Path::new("notices.toml"))
//!     .unwrap_or_default();
//! config.capacity = Some(5);
//! config::save_to_path(&config, Path::new("notices.toml"))
//!     .expect("Failed to save config");
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default minimum gap between two consecutive activations, in seconds.
pub const DEFAULT_MIN_GAP_SECS: f32 = 1.0;

/// Default display lifetime of each notice, in seconds.
pub const DEFAULT_LIFETIME_SECS: f32 = 3.0;

/// What to do with an incoming notice when the optional ingest ceiling is
/// reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowPolicy {
    /// Drop the oldest queued notice to make room for the new one.
    #[default]
    DropOldest,
    /// Drop the incoming notice and keep the queue as-is.
    RejectNewest,
}

/// Configuration for a [`NoticeEngine`](crate::engine::NoticeEngine).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active-set size bound. When unset, derived as `ceil(lifetime_secs)`,
    /// which keeps admission and retirement animations from overlapping.
    #[serde(default)]
    pub capacity: Option<usize>,
    /// Display lifetime of each notice, in seconds.
    #[serde(default = "default_lifetime_secs")]
    pub lifetime_secs: f32,
    /// Minimum gap between two consecutive activations, in seconds.
    #[serde(default = "default_min_gap_secs")]
    pub min_gap_secs: f32,
    /// Optional ceiling on the ingest queue. Unset means unbounded.
    #[serde(default)]
    pub max_queued: Option<usize>,
    /// Policy applied when `max_queued` is reached.
    #[serde(default)]
    pub overflow: OverflowPolicy,
    /// Optional bound on the dispatcher's removal animation, in seconds.
    /// When set, a stuck animation is abandoned after this long and the
    /// notice is evicted anyway. Unset means wait indefinitely.
    #[serde(default)]
    pub removal_timeout_secs: Option<f32>,
}

fn default_lifetime_secs() -> f32 {
    DEFAULT_LIFETIME_SECS
}

fn default_min_gap_secs() -> f32 {
    DEFAULT_MIN_GAP_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: None,
            lifetime_secs: DEFAULT_LIFETIME_SECS,
            min_gap_secs: DEFAULT_MIN_GAP_SECS,
            max_queued: None,
            overflow: OverflowPolicy::default(),
            removal_timeout_secs: None,
        }
    }
}

impl Config {
    /// Resolved active-set size bound.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
            .unwrap_or_else(|| self.lifetime_secs.ceil().max(1.0) as usize)
    }

    /// Resolved display lifetime.
    #[must_use]
    pub fn lifetime(&self) -> Duration {
        Duration::from_secs_f32(self.lifetime_secs)
    }

    /// Resolved minimum inter-activation gap.
    #[must_use]
    pub fn min_gap(&self) -> Duration {
        Duration::from_secs_f32(self.min_gap_secs)
    }

    /// Resolved removal animation bound, if configured.
    #[must_use]
    pub fn removal_timeout(&self) -> Option<Duration> {
        self.removal_timeout_secs.map(Duration::from_secs_f32)
    }

    /// Checks that all values are usable by the engine.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the lifetime is not positive, the gap is
    /// negative or not finite, or any explicit bound is zero or negative.
    pub fn validate(&self) -> Result<()> {
        if self.lifetime_secs <= 0.0 || !self.lifetime_secs.is_finite() {
            return Err(Error::Config(format!(
                "lifetime_secs must be a positive number, got {}",
                self.lifetime_secs
            )));
        }
        if self.min_gap_secs < 0.0 || !self.min_gap_secs.is_finite() {
            return Err(Error::Config(format!(
                "min_gap_secs must be a non-negative number, got {}",
                self.min_gap_secs
            )));
        }
        if self.capacity == Some(0) {
            return Err(Error::Config("capacity must be at least 1".to_string()));
        }
        if self.max_queued == Some(0) {
            return Err(Error::Config("max_queued must be at least 1".to_string()));
        }
        if let Some(secs) = self.removal_timeout_secs {
            if secs <= 0.0 || !secs.is_finite() {
                return Err(Error::Config(format!(
                    "removal_timeout_secs must be a positive number, got {}",
                    secs
                )));
            }
        }
        Ok(())
    }
}

/// Loads a configuration from the given TOML file.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

/// Saves a configuration to the given TOML file, creating parent
/// directories as needed.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = toml::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}
