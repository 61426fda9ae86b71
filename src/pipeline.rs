//! End-to-end analysis: image → field → evolved field → density → metrics,
//! with the identity fingerprint taken from the evolved field.
//!
//! ```text
//! bytes ─▶ Field ─▶ Simulator ─▶ extract_density ─▶ derive_metrics ─┐
//!                        │                                          ├─▶ ScoreBundle
//!                        └──────────▶ Fingerprint::of_field ────────┘
//! ```
//!
//! Stages run strictly in sequence and the first failure aborts the analysis.

use std::path::Path;

use rand::rngs::StdRng;

use crate::config::EsqetConfig;
use crate::error::EsqetResult;
use crate::extract::{extract_density, Density};
use crate::field::Field;
use crate::identity::Fingerprint;
use crate::ledger::Ledger;
use crate::metrics::{derive_metrics, Metrics};
use crate::noise::{GaussianNoise, NoiseSource};
use crate::simulate::{Evolution, Simulator};

/// Result of one analysis, handed to the ledger and to the caller.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreBundle {
    /// Density × coherence scale.
    pub coherence: f64,
    /// Display rating.
    pub rating: f64,
    /// Minted amount, >= 1.0.
    pub minted_amount: f64,
    /// Effective cost, >= 0.
    pub effective_cost: f64,
    /// Fingerprint of the evolved field.
    pub identity: Fingerprint,
}

impl ScoreBundle {
    /// Combine derived metrics with the identity.
    pub fn new(metrics: Metrics, identity: Fingerprint) -> Self {
        Self {
            coherence: metrics.coherence,
            rating: metrics.rating,
            minted_amount: metrics.minted_amount,
            effective_cost: metrics.effective_cost,
            identity,
        }
    }
}

/// Everything an analysis produced.
#[derive(Clone, Debug)]
pub struct Analysis {
    /// Caller-facing scores.
    pub bundle: ScoreBundle,
    /// Edge density the metrics were derived from.
    pub density: Density,
    /// Evolved field and its history window.
    pub evolution: Evolution,
}

/// Pipeline bound to one validated configuration.
#[derive(Clone, Debug)]
pub struct Analyzer {
    config: EsqetConfig,
    simulator: Simulator,
}

impl Analyzer {
    /// Validate `config` and build the simulator.
    pub fn new(config: EsqetConfig) -> EsqetResult<Self> {
        config.validate()?;
        let simulator = Simulator::new(config.simulation.clone())?;
        Ok(Self { config, simulator })
    }

    /// Active configuration.
    pub fn config(&self) -> &EsqetConfig {
        &self.config
    }

    /// Gaussian noise at the configured stddev; seeded when `seed` is given,
    /// otherwise drawn from OS entropy.
    pub fn noise(&self, seed: Option<u64>) -> EsqetResult<GaussianNoise<StdRng>> {
        let stddev = self.config.simulation.noise_stddev;
        match seed {
            Some(seed) => GaussianNoise::seeded(stddev, seed),
            None => GaussianNoise::from_entropy(stddev),
        }
    }

    /// Run the pipeline on an initialized field.
    pub fn analyze_field<N: NoiseSource>(&self, initial: Field, noise: N) -> EsqetResult<Analysis> {
        let evolution: Evolution = self.simulator.evolve(initial, noise)?;
        let density = extract_density(&evolution.field, &self.config.scoring)?;
        let metrics = derive_metrics(density, &self.config.scoring)?;
        let identity = Fingerprint::of_field(&evolution.field);
        tracing::debug!(
            identity = %identity,
            density = density.value(),
            coherence = metrics.coherence,
            "analysis complete"
        );
        Ok(Analysis {
            bundle: ScoreBundle::new(metrics, identity),
            density,
            evolution,
        })
    }

    /// Decode `bytes` and run the pipeline.
    pub fn analyze_bytes<N: NoiseSource>(&self, bytes: &[u8], noise: N) -> EsqetResult<Analysis> {
        let field = Field::from_image_bytes(bytes, self.config.simulation.grid_size)?;
        self.analyze_field(field, noise)
    }

    /// Read and decode the image at `path` and run the pipeline.
    pub fn analyze_path<N: NoiseSource>(
        &self,
        path: impl AsRef<Path>,
        noise: N,
    ) -> EsqetResult<Analysis> {
        let field = Field::from_image_path(path, self.config.simulation.grid_size)?;
        self.analyze_field(field, noise)
    }

    /// Persist `analysis` as `(identity, minted_amount, item_count)`.
    pub fn record<L: Ledger + ?Sized>(
        &self,
        analysis: &Analysis,
        ledger: &L,
        item_count: u64,
    ) -> EsqetResult<()> {
        let bundle = &analysis.bundle;
        ledger.put(&bundle.identity.to_hex(), bundle.minted_amount, item_count)
    }
}
