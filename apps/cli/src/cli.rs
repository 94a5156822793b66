//! Argument definitions

use chrono::{DateTime, Utc};
use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;
use wardline_engine::lookup::CatalogKind;
use wardline_engine::scheduler::WeightingMode;

#[derive(Debug, Parser)]
#[command(name = "wardline")]
#[command(about = "Triage, clinical lookup and OR scheduling from the command line")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON); `wardline.toml` when present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding codes.json, drugs.json and patients.json
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Append Prometheus metrics after the command output
    #[arg(long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up a medical code or drug by key
    Find {
        #[arg(long, default_value = "code")]
        kind: CatalogKind,
        key: String,
    },
    /// Look up a patient by id, email or phone
    Patient(PatientArgs),
    /// Check a medication list for drug-drug interactions
    Interactions {
        #[arg(required = true)]
        drugs: Vec<String>,
    },
    /// Replay a triage scenario file and print each event's result
    Triage { scenario: PathBuf },
    /// Optimize an OR schedule from a JSON array of surgery requests
    Schedule(ScheduleArgs),
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("key").required(true).args(["id", "email", "phone"])))]
pub struct PatientArgs {
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(Debug, Args)]
pub struct ScheduleArgs {
    pub surgeries: PathBuf,

    /// `revenue` or `priority-revenue`
    #[arg(long)]
    pub weighting: WeightingMode,

    #[arg(long, requires = "horizon_end")]
    pub horizon_start: Option<DateTime<Utc>>,

    #[arg(long, requires = "horizon_start")]
    pub horizon_end: Option<DateTime<Utc>>,
}
