/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Pipeline configuration.
//!
//! - [`SimulationConfig`]: diffusion, forcing, sink and noise parameters of the field evolution.
//! - [`ScoringConfig`]: edge thresholds and the closed-form metric constants.
//! - [`EsqetConfig`]: both halves, validated together.
//!
//! Defaults reproduce the reference constants exactly. Tests and callers
//! override individual fields instead of touching process-wide state.

use crate::error::{EsqetError, EsqetResult};

/// Default grid side length N.
pub const GRID_SIZE: usize = 32;
/// Default number of evolution steps.
pub const STEP_COUNT: usize = 30;
/// Default history capacity H.
pub const HISTORY_LENGTH: usize = 10;

// ─── SimulationConfig ───────────────────────────────────────────────────────

/// Parameters of the diffusion-reaction update.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// Side length N of the square field. Default 32.
    pub grid_size: usize,
    /// Number of discrete steps per run. Default 30.
    pub step_count: usize,
    /// Weight of the 5-point Laplacian. Default 0.1.
    pub diffusion_rate: f64,
    /// Peak of the column-periodic forcing term. Default 0.05.
    pub emf_amplitude: f64,
    /// Amount removed from the sink cell each step. Default 0.3.
    pub sink_strength: f64,
    /// `(row, col)` of the sink cell. Default `(15, 11)`.
    pub sink_cell: (usize, usize),
    /// Standard deviation of the additive Gaussian noise. Default 0.01.
    pub noise_stddev: f64,
}

impl SimulationConfig {
    /// Construct the reference configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Same configuration with forcing, sink and noise switched off.
    ///
    /// Only the diffusion kernel remains, which keeps any field in [0, 1]
    /// indefinitely.
    pub fn diffusion_only() -> Self {
        Self {
            emf_amplitude: 0.0,
            sink_strength: 0.0,
            noise_stddev: 0.0,
            ..Self::default()
        }
    }

    /// Forcing value for column `col`: `A · sin(2π·col / (N − 1))`.
    pub fn forcing(&self, col: usize) -> f64 {
        let period = (self.grid_size - 1) as f64;
        self.emf_amplitude * (core::f64::consts::TAU * col as f64 / period).sin()
    }

    /// Reject configurations the simulator cannot run.
    pub fn validate(&self) -> EsqetResult<()> {
        if self.grid_size < 2 {
            return Err(EsqetError::Config(format!(
                "grid_size must be >= 2, got {}",
                self.grid_size
            )));
        }
        let (row, col) = self.sink_cell;
        if row >= self.grid_size || col >= self.grid_size {
            return Err(EsqetError::Config(format!(
                "sink_cell ({row}, {col}) outside {n}x{n} grid",
                n = self.grid_size
            )));
        }
        for (name, value) in [
            ("diffusion_rate", self.diffusion_rate),
            ("sink_strength", self.sink_strength),
            ("noise_stddev", self.noise_stddev),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EsqetError::Config(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }
        if !self.emf_amplitude.is_finite() {
            return Err(EsqetError::Config("emf_amplitude must be finite".into()));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            step_count: STEP_COUNT,
            diffusion_rate: 0.1,
            emf_amplitude: 0.05,
            sink_strength: 0.3,
            sink_cell: (15, 11),
            noise_stddev: 0.01,
        }
    }
}

// ─── ScoringConfig ──────────────────────────────────────────────────────────

/// Edge-detector thresholds and metric constants.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScoringConfig {
    /// Lower hysteresis threshold on gradient magnitude. Default 100.
    pub edge_low_threshold: f32,
    /// Upper hysteresis threshold on gradient magnitude. Default 200.
    pub edge_high_threshold: f32,
    /// `coherence = density × coherence_scale`. Default 1000.
    pub coherence_scale: f64,
    /// `rating = coherence × rating_factor`. Default 0.975.
    pub rating_factor: f64,
    /// `minted = max(1, coherence / mint_divisor)`. Default 100.
    pub mint_divisor: f64,
    /// Cost at zero coherence; scaled down as coherence rises. Default 100.
    pub base_cost: f64,
}

impl ScoringConfig {
    /// Construct the reference configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject configurations that would make the metric formulas undefined.
    pub fn validate(&self) -> EsqetResult<()> {
        if !(self.edge_low_threshold.is_finite() && self.edge_high_threshold.is_finite()) {
            return Err(EsqetError::Config("edge thresholds must be finite".into()));
        }
        if self.edge_low_threshold > self.edge_high_threshold {
            return Err(EsqetError::Config(format!(
                "edge_low_threshold {} exceeds edge_high_threshold {}",
                self.edge_low_threshold, self.edge_high_threshold
            )));
        }
        if !(self.mint_divisor.is_finite() && self.mint_divisor > 0.0) {
            return Err(EsqetError::Config(format!(
                "mint_divisor must be > 0, got {}",
                self.mint_divisor
            )));
        }
        for (name, value) in [
            ("coherence_scale", self.coherence_scale),
            ("rating_factor", self.rating_factor),
            ("base_cost", self.base_cost),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EsqetError::Config(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            edge_low_threshold: 100.0,
            edge_high_threshold: 200.0,
            coherence_scale: 1000.0,
            rating_factor: 0.975,
            mint_divisor: 100.0,
            base_cost: 100.0,
        }
    }
}

// ─── EsqetConfig ────────────────────────────────────────────────────────────

/// Full pipeline configuration.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EsqetConfig {
    /// Field evolution parameters.
    pub simulation: SimulationConfig,
    /// Extraction and metric parameters.
    pub scoring: ScoringConfig,
}

impl EsqetConfig {
    /// Validate both halves.
    pub fn validate(&self) -> EsqetResult<()> {
        self.simulation.validate()?;
        self.scoring.validate()
    }

    /// Parse and validate a JSON configuration. Absent fields keep their
    /// defaults.
    #[cfg(feature = "serde")]
    pub fn from_json_str(text: &str) -> EsqetResult<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| EsqetError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file. Absent fields keep their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> EsqetResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text).map_err(|e| match e {
            EsqetError::Config(msg) => EsqetError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }
}
