//! `esqet`: analyze images and manage the identity ledger from the shell.
//!
//! ```text
//! esqet analyze --image mint0.jpg --seed 42 --ledger wallet.json --json
//! esqet balance --ledger wallet.json --identity 724fd82b…
//! esqet credit  --ledger wallet.json --report report.json --items 3
//! ```
//!
//! Configuration is layered: built-in defaults, then `--config <file>`, then
//! individual flags. Logging goes to stderr and is controlled by `RUST_LOG`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use esqet_core::{
    AnalysisReport, Analyzer, EsqetConfig, EsqetResult, FileLedger, Fingerprint, Ledger,
};

#[derive(Parser, Debug)]
#[command(
    name = "esqet",
    version,
    about = "Image coherence scoring with an identity-keyed ledger"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score an image and optionally record it in a ledger
    Analyze {
        /// Image to analyze (PNG, JPEG, BMP, GIF, TIFF, WebP)
        #[arg(long)]
        image: PathBuf,
        /// Noise seed; omit for OS entropy
        #[arg(long)]
        seed: Option<u64>,
        /// Ledger file to record the result in
        #[arg(long)]
        ledger: Option<PathBuf>,
        /// Item count stored with the record
        #[arg(long, default_value_t = 0)]
        items: u64,
        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
        /// Also write the JSON report to this file
        #[arg(long)]
        report_out: Option<PathBuf>,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Print the balance stored for an identity
    Balance {
        #[arg(long)]
        ledger: PathBuf,
        /// 64-character hex fingerprint
        #[arg(long)]
        identity: String,
    },
    /// Credit a ledger from a saved JSON report
    Credit {
        #[arg(long)]
        ledger: PathBuf,
        /// Report written by `analyze --report-out`
        #[arg(long)]
        report: PathBuf,
        /// Item count stored with the record
        #[arg(long, default_value_t = 0)]
        items: u64,
    },
}

/// Flag-level overrides applied on top of the config file.
#[derive(Args, Debug, Default)]
struct Overrides {
    /// JSON config file; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    grid_size: Option<usize>,
    #[arg(long)]
    steps: Option<usize>,
    #[arg(long)]
    diffusion_rate: Option<f64>,
    #[arg(long)]
    emf_amplitude: Option<f64>,
    #[arg(long)]
    sink_strength: Option<f64>,
    #[arg(long)]
    noise_stddev: Option<f64>,
}

impl Overrides {
    fn resolve(&self) -> EsqetResult<EsqetConfig> {
        let mut cfg = match &self.config {
            Some(path) => EsqetConfig::from_json_file(path)?,
            None => EsqetConfig::default(),
        };
        let sim = &mut cfg.simulation;
        if let Some(v) = self.grid_size {
            sim.grid_size = v;
        }
        if let Some(v) = self.steps {
            sim.step_count = v;
        }
        if let Some(v) = self.diffusion_rate {
            sim.diffusion_rate = v;
        }
        if let Some(v) = self.emf_amplitude {
            sim.emf_amplitude = v;
        }
        if let Some(v) = self.sink_strength {
            sim.sink_strength = v;
        }
        if let Some(v) = self.noise_stddev {
            sim.noise_stddev = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("esqet_core=info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error [{}]: {e}", e.stage());
            if e.stage().is_client_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(command: Command) -> EsqetResult<()> {
    match command {
        Command::Analyze {
            image,
            seed,
            ledger,
            items,
            json,
            report_out,
            overrides,
        } => {
            let analyzer = Analyzer::new(overrides.resolve()?)?;
            let noise = analyzer.noise(seed)?;
            let analysis = analyzer.analyze_path(&image, noise)?;
            let report = AnalysisReport::new(image.display().to_string(), &analysis);

            if let Some(path) = &ledger {
                analyzer.record(&analysis, &FileLedger::open(path), items)?;
            }
            if let Some(path) = &report_out {
                report.write_json(path)?;
            }
            if json {
                let text = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
                println!("{text}");
            } else {
                println!("{report}");
            }
            Ok(())
        }
        Command::Balance { ledger, identity } => {
            let identity = Fingerprint::from_hex(&identity)?;
            let ledger = FileLedger::open(ledger);
            match ledger.record(&identity.to_hex())? {
                Some(rec) => println!(
                    "{identity}  minted={:.1}  items={}  updated={}",
                    rec.minted_amount,
                    rec.item_count,
                    rec.updated_at.to_rfc3339()
                ),
                None => println!("{identity}  minted=0.0  items=0"),
            }
            Ok(())
        }
        Command::Credit {
            ledger,
            report,
            items,
        } => {
            let report = AnalysisReport::read_json(&report)?;
            let identity = report.bundle.identity.to_hex();
            let minted = report.bundle.minted_amount.max(0.0);
            let ledger = FileLedger::open(ledger);
            ledger.put(&identity, minted, items)?;
            let balance = ledger.get(&identity)?;
            println!(
                "credited {identity}  minted={:.1}  items={}",
                balance.minted_amount, balance.item_count
            );
            Ok(())
        }
    }
}
