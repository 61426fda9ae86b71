//! Error taxonomy for the analysis pipeline.
//!
//! Every failure is a single tagged [`EsqetError`]. The variant carries the
//! diagnostic payload and [`EsqetError::stage`] names the pipeline stage that
//! produced it, so a host layer can pick a status code without inspecting
//! message strings.

use thiserror::Error;

/// Pipeline stage that produced an [`EsqetError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Stage {
    /// Image bytes could not be turned into a field.
    Decode,
    /// Diffusion-reaction evolution.
    Simulate,
    /// Edge density extraction.
    Extract,
    /// Metric derivation.
    Derive,
    /// Keyed record store.
    Ledger,
    /// Configuration validation or loading.
    Config,
    /// File access outside image decoding.
    Io,
}

impl Stage {
    /// `true` when the failure was caused by the caller's input rather than
    /// by the pipeline itself.
    pub fn is_client_error(self) -> bool {
        matches!(self, Stage::Decode | Stage::Config)
    }

    /// Stable lowercase label for logs and structured output.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Decode => "decode",
            Stage::Simulate => "simulate",
            Stage::Extract => "extract",
            Stage::Derive => "derive",
            Stage::Ledger => "ledger",
            Stage::Config => "config",
            Stage::Io => "io",
        }
    }
}

impl core::fmt::Display for Stage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root error type for every fallible operation in the crate.
#[derive(Error, Debug)]
pub enum EsqetError {
    /// Input is absent, empty, or not a decodable raster image.
    #[error("cannot decode image at {path}: {reason}")]
    Decode {
        /// Offending path, or `<memory>` for in-memory input.
        path: String,
        /// Decoder message.
        reason: String,
    },

    /// A cell went negative or NaN before clamping.
    #[error("numerical instability at step {step}, cell ({row}, {col}): {value}")]
    Instability {
        /// Zero-based step index.
        step: usize,
        /// Row of the first offending cell in row-major order.
        row: usize,
        /// Column of the first offending cell.
        col: usize,
        /// Pre-clamp value that tripped the check.
        value: f64,
    },

    /// Edge density came out negative or NaN.
    #[error("invalid edge density: {0}")]
    Extraction(String),

    /// A derived metric is NaN.
    #[error("invalid metric: {0}")]
    InvalidMetric(String),

    /// The keyed store could not be read or written.
    #[error("ledger error: {0}")]
    Ledger(String),

    /// Configuration rejected.
    #[error("config error: {0}")]
    Config(String),

    /// Filesystem failure outside image decoding.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EsqetError {
    /// The stage that produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            EsqetError::Decode { .. } => Stage::Decode,
            EsqetError::Instability { .. } => Stage::Simulate,
            EsqetError::Extraction(_) => Stage::Extract,
            EsqetError::InvalidMetric(_) => Stage::Derive,
            EsqetError::Ledger(_) => Stage::Ledger,
            EsqetError::Config(_) => Stage::Config,
            EsqetError::Io(_) => Stage::Io,
        }
    }

    pub(crate) fn decode(path: impl Into<String>, reason: impl core::fmt::Display) -> Self {
        EsqetError::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type EsqetResult<T> = Result<T, EsqetError>;
