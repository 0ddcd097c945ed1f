//! Tunables for the speculate-and-recolor loop.
//!
//! Every field has a default, so a partial JSON document such as
//! `{"seed": 7, "verbose": true}` is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ColoringError, Result};

/// Configuration for [`DistributedColoring`](crate::DistributedColoring).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColoringConfig {
    /// Seed mixed into the tie-break hash.
    pub seed: u64,
    /// Recoloring uses the bitwise kernel only while the global max degree is below this.
    pub bitwise_max_degree: usize,
    /// Recoloring uses the bitwise kernel only while fewer than this fraction of all
    /// vertices are being recolored.
    pub bitwise_recolor_fraction: f64,
    /// Hard cap on recolor rounds. `None` runs until no conflicts remain.
    pub max_rounds: Option<usize>,
    /// Include ghost slots in the initial local coloring.
    pub color_ghosts_initially: bool,
    /// Print rank-tagged round statistics to stdout when the run finishes.
    pub verbose: bool,
    /// Run a full exchange and conflict scan after convergence.
    pub validate: bool,
}

impl Default for ColoringConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            bitwise_max_degree: 6000,
            bitwise_recolor_fraction: 0.1,
            max_rounds: Some(100),
            color_ghosts_initially: false,
            verbose: false,
            validate: false,
        }
    }
}

impl ColoringConfig {
    /// Sets the tie-break seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets (or removes) the round cap.
    #[must_use]
    pub fn with_max_rounds(mut self, max_rounds: Option<usize>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Sets the bitwise kernel thresholds.
    #[must_use]
    pub fn with_bitwise_thresholds(mut self, max_degree: usize, recolor_fraction: f64) -> Self {
        self.bitwise_max_degree = max_degree;
        self.bitwise_recolor_fraction = recolor_fraction;
        self
    }

    /// Enables ghost slots in the initial coloring pass.
    #[must_use]
    pub fn with_ghosts_initially(mut self, enabled: bool) -> Self {
        self.color_ghosts_initially = enabled;
        self
    }

    /// Enables the stdout round report.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Enables post-run validation.
    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Parses a JSON document and validates it.
    ///
    /// # Errors
    /// Returns [`ColoringError::InvalidConfig`] on parse failure or out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ColoringError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    /// Returns [`ColoringError::InvalidConfig`] if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ColoringError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&content)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    /// Returns [`ColoringError::InvalidConfig`] if the recolor fraction is outside
    /// `(0, 1]` or the round cap is zero.
    pub fn validate(&self) -> Result<()> {
        if !(self.bitwise_recolor_fraction > 0.0 && self.bitwise_recolor_fraction <= 1.0) {
            return Err(ColoringError::InvalidConfig(format!(
                "bitwise_recolor_fraction must be in (0, 1], got {}",
                self.bitwise_recolor_fraction
            )));
        }
        if self.max_rounds == Some(0) {
            return Err(ColoringError::InvalidConfig("max_rounds must be at least 1".into()));
        }
        Ok(())
    }
}
