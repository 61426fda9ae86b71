//! Analysis reports.
//!
//! An [`AnalysisReport`] pairs a [`ScoreBundle`] with its input path, density
//! and generation time. It renders as a labeled text block for people
//! (`Display`) and, with the `serde` feature, as JSON for programs. Tools that
//! feed the ledger read the JSON form; the text form is for display only.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::pipeline::{Analysis, ScoreBundle};

/// Display and interchange record for one analysis.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisReport {
    /// Path or label of the analyzed image.
    pub input: String,
    /// When the report was produced (UTC).
    pub generated_at: DateTime<Utc>,
    /// Edge density behind the scores.
    pub density: f64,
    /// Scores and identity.
    pub bundle: ScoreBundle,
}

impl AnalysisReport {
    /// Report for `analysis`, stamped now.
    pub fn new(input: impl Into<String>, analysis: &Analysis) -> Self {
        Self {
            input: input.into(),
            generated_at: Utc::now(),
            density: analysis.density.value(),
            bundle: analysis.bundle.clone(),
        }
    }

    /// Write the JSON form to `path`.
    #[cfg(feature = "serde")]
    pub fn write_json(&self, path: impl AsRef<std::path::Path>) -> crate::error::EsqetResult<()> {
        let bytes = serde_json::to_vec_pretty(self).map_err(std::io::Error::from)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read a report previously written with [`write_json`](Self::write_json).
    #[cfg(feature = "serde")]
    pub fn read_json(path: impl AsRef<std::path::Path>) -> crate::error::EsqetResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            crate::error::EsqetError::Config(format!("report {}: {e}", path.display()))
        })
    }
}

impl core::fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let b = &self.bundle;
        writeln!(
            f,
            "Analysis Report ({})",
            self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
        writeln!(f, "  Input Image:     {}", self.input)?;
        writeln!(f, "  Edge Density:    {:.4}", self.density)?;
        writeln!(f, "  Coherence:       {:.4}", b.coherence)?;
        writeln!(f, "  Rating:          {:.1}", b.rating)?;
        writeln!(f, "  Minted:          {:.1}", b.minted_amount)?;
        writeln!(f, "  Effective Cost:  {:.2}", b.effective_cost)?;
        write!(f, "  Identity:        {}", b.identity)
    }
}
