/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Closed-form metrics derived from edge density.
//!
//! ```text
//! coherence      = density × 1000
//! rating         = coherence × 0.975
//! minted_amount  = max(1.0, coherence / 100)
//! effective_cost = 100 / (coherence / 1000)    if coherence > 0
//!                = 100                         otherwise
//! ```
//!
//! # Invariants
//!
//! - **MET-001**: `minted_amount >= 1.0` for every non-negative coherence.
//! - **MET-002**: the cost never divides by zero; zero coherence short-circuits
//!   to the base cost.
//! - **MET-003**: a NaN minted amount or cost is an error, never a result.

use crate::config::ScoringConfig;
use crate::error::{EsqetError, EsqetResult};
use crate::extract::Density;

/// Minimum minted amount regardless of coherence.
pub const MINT_FLOOR: f64 = 1.0;

/// Metrics derived from one density value.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metrics {
    /// Linear rescaling of density; the primary quality signal.
    pub coherence: f64,
    /// Display rating derived from coherence.
    pub rating: f64,
    /// Token amount, floored at [`MINT_FLOOR`].
    pub minted_amount: f64,
    /// Inverse-coherence cost; equals the base cost at zero coherence.
    pub effective_cost: f64,
}

/// `density × coherence_scale`.
pub fn coherence(density: Density, scoring: &ScoringConfig) -> f64 {
    density.value() * scoring.coherence_scale
}

/// `max(1.0, coherence / mint_divisor)`.
pub fn minted_amount(coherence: f64, scoring: &ScoringConfig) -> f64 {
    MINT_FLOOR.max(coherence / scoring.mint_divisor)
}

/// `base_cost / (coherence / 1000)` with a zero-coherence guard.
pub fn effective_cost(coherence: f64, scoring: &ScoringConfig) -> f64 {
    if coherence > 0.0 {
        scoring.base_cost / (coherence / 1000.0)
    } else {
        scoring.base_cost
    }
}

/// Derive every metric from `density`.
pub fn derive_metrics(density: Density, scoring: &ScoringConfig) -> EsqetResult<Metrics> {
    let coherence = coherence(density, scoring);
    let rating = coherence * scoring.rating_factor;
    // f64::max ignores a NaN operand, so test the quotient itself.
    let quotient = coherence / scoring.mint_divisor;
    if quotient.is_nan() {
        return Err(EsqetError::InvalidMetric(format!(
            "minted amount undefined for coherence {coherence}"
        )));
    }
    let minted_amount = minted_amount(coherence, scoring);
    let effective_cost = effective_cost(coherence, scoring);
    if effective_cost.is_nan() {
        return Err(EsqetError::InvalidMetric(format!(
            "effective cost undefined for coherence {coherence}"
        )));
    }
    tracing::debug!(coherence, rating, minted_amount, effective_cost, "metrics derived");
    Ok(Metrics {
        coherence,
        rating,
        minted_amount,
        effective_cost,
    })
}
