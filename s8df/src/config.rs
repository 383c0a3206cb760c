//! Run configuration of the converter.

use std::path::PathBuf;

use clap::Parser;
use s8core::btag::operating_point::{OperatingPoint, Tagger};
use s8core::data::run_mode::RunMode;
use s8core::selection::cuts::SelectionCuts;
use tracing::{info, warn};

use crate::error::{DfError, Result};

#[derive(Parser, Debug)]
#[command(name = "s8convert")]
#[command(about = "Fill p_T^rel vs p_T muon-in-jet histograms for the b-tag efficiency measurement")]
#[command(version)]
pub struct Args {
    /// Maximum number of events to be processed. 0 - all
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    pub events: i64,

    /// Data input flag. Default: Monte-Carlo
    #[arg(long)]
    pub data: bool,

    /// b-Tagger operating point of the muon jet (TCHE discriminant)
    #[arg(long, default_value = "TCHEM")]
    pub tag: String,

    /// Operating point of the away jet (TCHP discriminant). Default: TCHPL
    #[arg(long)]
    pub away_tag: Option<String>,

    /// Output file. An empty value disables saving
    #[arg(short, long, default_value = "s8input.db")]
    pub output: String,

    /// JSON file overriding the selection cuts
    #[arg(long)]
    pub cuts: Option<PathBuf>,

    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    /// Input events: SQLite file, or JSON lines with a .jsonl/.json extension
    pub input: Option<PathBuf>,
}

/// Validated settings of one converter run.
#[derive(Clone, Debug)]
pub struct Config {
    /// Event cap, 0 processes everything.
    pub events: u64,
    pub run_mode: RunMode,
    /// In-jet tag operating point.
    pub operating_point: OperatingPoint,
    pub cuts: SelectionCuts,
    /// `None` disables saving.
    pub output: Option<PathBuf>,
    pub input: PathBuf,
}

impl Config {
    /// Default settings for the given input.
    pub fn new(input: PathBuf) -> Self {
        Config {
            events: 0,
            run_mode: RunMode::MonteCarlo,
            operating_point: OperatingPoint::default(),
            cuts: SelectionCuts::default(),
            output: Some(PathBuf::from("s8input.db")),
            input,
        }
    }

    pub fn from_args(args: &Args) -> Result<Self> {
        if args.events < 0 {
            return Err(DfError::Config(format!(
                "wrong number of events is specified: {}",
                args.events
            )));
        }

        let input = match &args.input {
            Some(input) if !input.as_os_str().is_empty() => input.clone(),
            _ => return Err(DfError::Config("input is not specified".to_string())),
        };

        let operating_point = OperatingPoint::parse(&args.tag)
            .map_err(|e| DfError::Config(format!("--tag: {}", e)))?;
        warn_on_tagger_mismatch(&operating_point);

        let mut cuts = match &args.cuts {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    DfError::Config(format!("failed to read cuts file {}: {}", path.display(), e))
                })?;
                serde_json::from_str(&text).map_err(|e| {
                    DfError::Config(format!("invalid cuts file {}: {}", path.display(), e))
                })?
            }
            None => SelectionCuts::default(),
        };

        if let Some(label) = &args.away_tag {
            cuts.away_tag = OperatingPoint::parse(label)
                .map_err(|e| DfError::Config(format!("--away-tag: {}", e)))?;
        }

        let output = if args.output.is_empty() {
            warn!("output file is not specified. Results are not saved.");
            None
        } else {
            Some(PathBuf::from(&args.output))
        };

        Ok(Config {
            events: args.events as u64,
            run_mode: RunMode::from_data_flag(args.data),
            operating_point,
            cuts,
            output,
            input,
        })
    }

    /// Logs the accepted arguments.
    pub fn log_summary(&self) {
        info!("Arguments");
        info!(" [+] Events      {}", self.events);
        info!(" [+] Input Type  {}", self.run_mode);
        info!(" [+] Tag         {}", self.operating_point);
        info!(" [+] Away Tag    {}", self.cuts.away_tag);
        info!(
            " [+] Output      {}",
            self.output.as_ref().map(|p| p.display().to_string()).unwrap_or_default()
        );
        info!(" [+] Input       {}", self.input.display());
    }
}

// The in-jet tag is always read from the TCHE discriminant; returns true
// when the label names another tagger.
fn warn_on_tagger_mismatch(operating_point: &OperatingPoint) -> bool {
    match operating_point.tagger() {
        Some(tagger) if tagger != Tagger::Tche => {
            warn!(
                "--tag {} names the {} tagger but is applied to the TCHE discriminant",
                operating_point.label(),
                tagger
            );
            true
        }
        _ => false,
    }
}
