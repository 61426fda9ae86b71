//! Python FFI bindings via PyO3.
//!
//! Exposes the analysis pipeline and the ledger to a Python host (e.g. a web
//! upload handler). `analyze` takes an optional JSON configuration in the
//! same shape as the CLI's `--config` file; without one it runs the
//! reference constants, under which the forcing trough drives every input
//! unstable within the step budget.
//!
//! # Building the Python extension
//!
//! ```bash
//! pip install maturin
//! maturin develop --features python-ffi
//! ```
//!
//! # Usage
//!
//! ```python
//! from esqet_core import analyze, Ledger
//!
//! cfg = '{"simulation": {"emf_amplitude": 0.005, "sink_strength": 0.05}}'
//! with open("upload.png", "rb") as f:
//!     result = analyze(f.read(), seed=42, config=cfg)
//! print(result["coherence"], result["identity"])
//!
//! ledger = Ledger("wallet.json")
//! ledger.put(result["identity"], result["minted_amount"], 0)
//! print(ledger.get(result["identity"]))   # (minted, count)
//! ```

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::config::EsqetConfig;
use crate::error::EsqetError;
use crate::ledger::{FileLedger, Ledger as _, MemoryLedger};
use crate::pipeline::Analyzer;

fn to_py_err(e: EsqetError) -> PyErr {
    let msg = format!("[{}] {e}", e.stage());
    if e.stage().is_client_error() {
        PyValueError::new_err(msg)
    } else {
        PyRuntimeError::new_err(msg)
    }
}

fn analyzer_for(config: Option<&str>) -> Result<Analyzer, EsqetError> {
    let config = match config {
        Some(json) => EsqetConfig::from_json_str(json)?,
        None => EsqetConfig::default(),
    };
    Analyzer::new(config)
}

// ── analyze ──────────────────────────────────────────────────────────────────

/// Analyze raw image bytes.
///
/// Args:
///     image:  encoded image bytes (PNG, JPEG, ...)
///     seed:   optional noise seed; omit for OS entropy
///     config: optional JSON configuration; absent fields keep defaults
///
/// Returns:
///     dict with coherence, rating, minted_amount, effective_cost, identity, density
///
/// Raises:
///     ValueError for undecodable input or a rejected config, RuntimeError for
///     pipeline failures
#[pyfunction]
#[pyo3(signature = (image, seed=None, config=None))]
pub fn analyze<'py>(
    py: Python<'py>,
    image: &[u8],
    seed: Option<u64>,
    config: Option<&str>,
) -> PyResult<Bound<'py, PyDict>> {
    let analyzer = analyzer_for(config).map_err(to_py_err)?;
    let noise = analyzer.noise(seed).map_err(to_py_err)?;
    let analysis = py
        .allow_threads(|| analyzer.analyze_bytes(image, noise))
        .map_err(to_py_err)?;

    let b = &analysis.bundle;
    let out = PyDict::new_bound(py);
    out.set_item("coherence", b.coherence)?;
    out.set_item("rating", b.rating)?;
    out.set_item("minted_amount", b.minted_amount)?;
    out.set_item("effective_cost", b.effective_cost)?;
    out.set_item("identity", b.identity.to_hex())?;
    out.set_item("density", analysis.density.value())?;
    Ok(out)
}

// ── Ledger ───────────────────────────────────────────────────────────────────

enum Backend {
    Memory(MemoryLedger),
    File(FileLedger),
}

/// Identity-keyed balance store. `put` replaces, it does not accumulate.
///
/// Args:
///     path: JSON file to persist to; omit for an in-memory ledger
#[pyclass(name = "Ledger")]
pub struct PyLedger {
    inner: Backend,
}

#[pymethods]
impl PyLedger {
    /// Open a file-backed ledger, or an in-memory one when `path` is None.
    #[new]
    #[pyo3(signature = (path=None))]
    pub fn new(path: Option<String>) -> Self {
        let inner = match path {
            Some(p) => Backend::File(FileLedger::open(p)),
            None => Backend::Memory(MemoryLedger::new()),
        };
        Self { inner }
    }

    /// Replace the record for `identity`.
    pub fn put(&self, identity: &str, minted_amount: f64, item_count: u64) -> PyResult<()> {
        match &self.inner {
            Backend::Memory(l) => l.put(identity, minted_amount, item_count),
            Backend::File(l) => l.put(identity, minted_amount, item_count),
        }
        .map_err(to_py_err)
    }

    /// `(minted_amount, item_count)` for `identity`; `(0.0, 0)` if unknown.
    pub fn get(&self, identity: &str) -> PyResult<(f64, u64)> {
        let b = match &self.inner {
            Backend::Memory(l) => l.get(identity),
            Backend::File(l) => l.get(identity),
        }
        .map_err(to_py_err)?;
        Ok((b.minted_amount, b.item_count))
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        match &self.inner {
            Backend::Memory(_) => "Ledger()".to_string(),
            Backend::File(l) => format!("Ledger({:?})", l.path().display().to_string()),
        }
    }
}

// ── Module entry point ────────────────────────────────────────────────────────

/// Image coherence scoring and identity-keyed ledger.
#[pymodule]
pub fn esqet_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(analyze, m)?)?;
    m.add_class::<PyLedger>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("GRID_SIZE", crate::config::GRID_SIZE)?;
    Ok(())
}
