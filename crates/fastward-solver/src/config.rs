//! Solver configuration.
//!
//! Loadable from TOML so runs can be reproduced without code changes:
//!
//! ```
//! use fastward_solver::config::SolverConfig;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     seed = 7
//!     mode = "backward_min"
//!     time_limit_seconds = 30
//!
//!     [window]
//!     start = 0.25
//!     end = 0.75
//! "#).unwrap();
//! assert_eq!(config.seed, 7);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::heuristic::HeuristicMode;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A fractional `[start, end)` window over an existing plan's length,
/// used by plan refinement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub start: f64,
    pub end: f64,
}

impl Window {
    /// Resolves the fractions against a plan length.
    pub fn resolve(&self, plan_len: usize) -> (usize, usize) {
        let start = (plan_len as f64 * self.start) as usize;
        let end = (plan_len as f64 * self.end) as usize;
        (start, end)
    }

    /// Checks `0 <= start < end <= 1`. Run on every window, whether it
    /// came from a file or was built programmatically.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.start)
            || !(0.0..=1.0).contains(&self.end)
            || self.start >= self.end
        {
            return Err(ConfigError::Invalid(format!(
                "window requires 0 <= start < end <= 1, got [{}, {})",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

/// Everything one `solve` run needs beyond the task itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Seed for the tie-breaking generator; a given seed plus a given
    /// task reproduces the trace.
    pub seed: u64,

    /// Action-ranking strategy.
    pub mode: HeuristicMode,

    /// Run the integrity verifier on every successful plan.
    pub verify: bool,

    /// Watchdog deadline in seconds; absent means unbounded.
    pub time_limit_seconds: Option<u64>,

    /// Refinement window, for the re-solve modes.
    pub window: Option<Window>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            mode: HeuristicMode::default(),
            verify: false,
            time_limit_seconds: None,
            window: None,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: SolverConfig = toml::from_str(input)?;
        if let Some(window) = &config.window {
            window.validate()?;
        }
        Ok(config)
    }

    /// The watchdog deadline, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_seconds.map(Duration::from_secs)
    }
}
