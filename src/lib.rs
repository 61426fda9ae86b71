//! # esqet-core
//!
//! Deterministic coherence scoring for still images.
//!
//! An image is reduced to a small scalar field, evolved through a
//! diffusion-reaction process, and summarized by its edge density. Fixed
//! formulas turn that density into a coherence score, a rating, a minted
//! amount and an effective cost. A SHA-256 fingerprint of the evolved field
//! is the result's identity and the key under which it is stored.
//!
//! ---
//!
//! ## The pipeline
//!
//! ```text
//! image bytes → Field → Simulator → Density → Metrics ─┐
//!                          │                           ├→ ScoreBundle → Ledger
//!                          └──────→ Fingerprint ───────┘
//!                    NoiseSource   HistoryBuffer
//! ```
//!
//! Every stage consumes its predecessor's output in full before the next
//! starts. Any failure aborts the analysis with a single [`EsqetError`]
//! whose [`stage`](EsqetError::stage) says where it happened.
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`config`] | [`EsqetConfig`], [`SimulationConfig`], [`ScoringConfig`] | Constants as explicit, overridable configuration |
//! | [`field`] | [`Field`] | Decode, grayscale, resample and normalize an image to an N×N grid |
//! | [`noise`] | [`NoiseSource`], [`GaussianNoise`] | Injectable, seedable per-cell noise |
//! | [`history`] | [`HistoryBuffer`] | Statically bounded FIFO of recent fields |
//! | [`simulate`] | [`Simulator`], [`Evolution`] | Periodic 5-point diffusion with forcing, sink, noise and abort-on-instability |
//! | [`extract`] | [`Density`] | Hysteresis edge detection normalized by grid area |
//! | [`metrics`] | [`Metrics`] | Coherence, rating, minted amount and cost formulas |
//! | [`identity`] | [`Fingerprint`] | SHA-256 content fingerprint |
//! | [`ledger`] | [`Ledger`], [`MemoryLedger`] | Identity-keyed, last-write-wins balance store |
//! | [`pipeline`] | [`Analyzer`], [`ScoreBundle`] | End-to-end analysis |
//! | [`report`] | [`AnalysisReport`] | Text and JSON reports |
//!
//! ## Example
//!
//! ```rust,ignore
//! use esqet_core::{Analyzer, EsqetConfig, MemoryLedger};
//!
//! let analyzer = Analyzer::new(EsqetConfig::default())?;
//! let noise = analyzer.noise(Some(42))?;
//! let analysis = analyzer.analyze_path("mint0.jpg", noise)?;
//! println!("{}", analysis.bundle.identity);
//!
//! let ledger = MemoryLedger::new();
//! analyzer.record(&analysis, &ledger, 0)?;
//! ```
//!
//! ## Features
//!
//! - `serde` (default): serialization of configs, records and reports; the
//!   JSON-file ledger.
//! - `cli` (default): the `esqet` binary.
//! - `python-ffi`: PyO3 extension module.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod error;
pub mod extract;
pub mod field;
pub mod history;
pub mod identity;
pub mod ledger;
pub mod metrics;
pub mod noise;
pub mod pipeline;
pub mod report;
pub mod simulate;

#[cfg(feature = "python-ffi")]
pub mod ffi;

pub use config::{EsqetConfig, ScoringConfig, SimulationConfig};
pub use error::{EsqetError, EsqetResult, Stage};
pub use extract::Density;
pub use field::Field;
pub use history::HistoryBuffer;
pub use identity::Fingerprint;
#[cfg(feature = "serde")]
pub use ledger::FileLedger;
pub use ledger::{Balance, Ledger, LedgerRecord, MemoryLedger};
pub use metrics::Metrics;
pub use noise::{GaussianNoise, NoiseSource, Silent};
pub use pipeline::{Analysis, Analyzer, ScoreBundle};
pub use report::AnalysisReport;
pub use simulate::{Evolution, Simulator};
