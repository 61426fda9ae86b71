/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Diffusion-reaction evolution of a [`Field`].
//!
//! Each step applies, for every cell on a periodic N×N torus:
//!
//! ```text
//! lap(i,j)  = f(i-1,j) + f(i+1,j) + f(i,j-1) + f(i,j+1) - 4·f(i,j)
//! next(i,j) = f(i,j) + D·lap(i,j) - sink(i,j) + forcing(j) + noise(i,j)
//! ```
//!
//! then checks `next` for negative or NaN cells, then clamps to [0, 1].
//!
//! # Invariants
//!
//! - **SIM-001**: the stability check runs on the pre-clamp values. A transient
//!   negative that clamping would hide still aborts the run.
//! - **SIM-002**: every field carried forward or stored in history lies in [0, 1].
//! - **SIM-003**: one noise sample per cell per step, drawn in row-major order,
//!   so a seeded source reproduces a run bit for bit.
//! - **SIM-004**: no partial result on failure; the caller gets the error only.

use crate::config::{SimulationConfig, HISTORY_LENGTH};
use crate::error::{EsqetError, EsqetResult};
use crate::field::Field;
use crate::history::HistoryBuffer;
use crate::noise::NoiseSource;

/// Output of a completed run.
#[derive(Clone, Debug)]
pub struct Evolution<const H: usize = HISTORY_LENGTH> {
    /// Field after the last step.
    pub field: Field,
    /// The last `H` clamped fields, oldest first. The last entry equals `field`.
    pub history: HistoryBuffer<H>,
    /// Number of steps applied.
    pub steps: usize,
}

/// Diffusion-reaction simulator bound to one configuration.
#[derive(Clone, Debug)]
pub struct Simulator {
    config: SimulationConfig,
    forcing: Vec<f64>,
}

impl Simulator {
    /// Validate `config` and precompute the per-column forcing profile.
    pub fn new(config: SimulationConfig) -> EsqetResult<Self> {
        config.validate()?;
        let forcing = (0..config.grid_size).map(|c| config.forcing(c)).collect();
        Ok(Self { config, forcing })
    }

    /// The configuration this simulator runs with.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Apply one update to `field`, returning the clamped result.
    ///
    /// `step` is only used to label an [`EsqetError::Instability`].
    pub fn step<N: NoiseSource>(
        &self,
        field: &Field,
        noise: &mut N,
        step: usize,
    ) -> EsqetResult<Field> {
        self.check_shape(field)?;
        let n = self.config.grid_size;
        let d = self.config.diffusion_rate;
        let (sink_row, sink_col) = self.config.sink_cell;

        let mut next = Field::filled(n, 0.0);
        {
            let out = next.cells_mut();
            for row in 0..n {
                let (r, up, down) = (row as isize, row as isize - 1, row as isize + 1);
                for col in 0..n {
                    let (c, left, right) = (col as isize, col as isize - 1, col as isize + 1);
                    let center = field.get(row, col);
                    let lap = field.get_wrapped(up, c)
                        + field.get_wrapped(down, c)
                        + field.get_wrapped(r, left)
                        + field.get_wrapped(r, right)
                        - 4.0 * center;
                    let sink = if row == sink_row && col == sink_col {
                        self.config.sink_strength
                    } else {
                        0.0
                    };
                    out[row * n + col] =
                        center + d * lap - sink + self.forcing[col] + noise.sample();
                }
            }
        }

        if let Some((idx, &value)) = next
            .cells()
            .iter()
            .enumerate()
            .find(|(_, v)| v.is_nan() || **v < 0.0)
        {
            let (row, col) = (idx / n, idx % n);
            tracing::warn!(step, row, col, value, "field evolution unstable");
            return Err(EsqetError::Instability { step, row, col, value });
        }

        next.clamp_unit();
        Ok(next)
    }

    /// Run `step_count` steps from `initial`, keeping the last `H` fields.
    pub fn evolve<const H: usize, N: NoiseSource>(
        &self,
        initial: Field,
        mut noise: N,
    ) -> EsqetResult<Evolution<H>> {
        self.check_shape(&initial)?;
        let mut history = HistoryBuffer::<H>::new();
        let mut current = initial;

        for step in 0..self.config.step_count {
            let next = self.step(&current, &mut noise, step)?;
            if tracing::enabled!(tracing::Level::TRACE) {
                let (lo, hi) = next.min_max();
                tracing::trace!(step, min = lo, max = hi, "field step");
            }
            history.push(next.clone());
            current = next;
        }

        tracing::debug!(
            grid = self.config.grid_size,
            steps = self.config.step_count,
            retained = history.len(),
            "field evolution complete"
        );
        Ok(Evolution {
            field: current,
            history,
            steps: self.config.step_count,
        })
    }

    fn check_shape(&self, field: &Field) -> EsqetResult<()> {
        if field.side() != self.config.grid_size {
            return Err(EsqetError::Config(format!(
                "field side {} does not match grid_size {}",
                field.side(),
                self.config.grid_size
            )));
        }
        Ok(())
    }
}
