//! AI Health Monitor - Main Entry Point

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use ai_health_core::api::commands;
use ai_health_core::constants::{APP_NAME, APP_VERSION};
use ai_health_core::logic::simulate::{simulate, SimulationConfig};
use ai_health_core::Config;

/// Command-line interface for the health monitor
#[derive(Parser, Debug)]
#[command(name = "health-monitor", version, about = "Vital-sign anomaly scoring and history summaries")]
struct Cli {
    /// Directory holding `<subject_id>_history.csv` logs [env: HEALTH_HISTORY_DIR]
    #[arg(long, global = true)]
    history_dir: Option<PathBuf>,

    /// Expected outlier fraction, in (0, 0.5) [env: HEALTH_CONTAMINATION]
    #[arg(long, global = true)]
    contamination: Option<f64>,

    /// Isolation forest seed [env: HEALTH_SEED]
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate a batch, score it and append it to history
    Analyze {
        #[arg(long, default_value_t = 5)]
        subjects: usize,

        /// Readings per subject, one per minute
        #[arg(long, default_value_t = 120)]
        minutes: usize,

        /// Simulator seed
        #[arg(long, default_value_t = 42)]
        sim_seed: u64,

        /// Also write a per-sample anomaly report CSV
        #[arg(long)]
        report: Option<PathBuf>,

        /// Score only, leave history untouched
        #[arg(long)]
        dry_run: bool,
    },
    /// Print summaries as JSON
    Summary {
        /// Only this subject
        #[arg(long)]
        subject: Option<String>,
    },
    /// Merge all history logs into one CSV
    Export {
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Print engine status as JSON
    Status,
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(dir) = &self.history_dir {
            config.history_dir = dir.clone();
        }
        if let Some(c) = self.contamination {
            config.contamination = c;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.config();
    log::info!("Starting {} v{} (history: {:?})", APP_NAME, APP_VERSION, config.history_dir);

    match cli.command {
        Command::Analyze { subjects, minutes, sim_seed, report, dry_run } => {
            let samples = simulate(&SimulationConfig { subjects, minutes, seed: sim_seed, start: None });

            let analysis = commands::analyze(&config, &samples).context("scoring failed")?;
            if let Some(path) = &report {
                commands::export_anomaly_report(&analysis, path)
                    .with_context(|| format!("cannot write report to {}", path.display()))?;
            }

            let result = if dry_run {
                commands::BatchResult::from(&analysis)
            } else {
                commands::record_analysis(&config, &analysis).context("recording failed")?
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Summary { subject } => {
            let json = match subject {
                Some(id) => serde_json::to_string_pretty(&commands::get_subject_summary(&config, &id)?)?,
                None => serde_json::to_string_pretty(&commands::get_overall_summary(&config)?)?,
            };
            println!("{}", json);
        }
        Command::Export { output } => {
            let merged = commands::export_history(&config, &output)
                .with_context(|| format!("cannot export to {}", output.display()))?;
            log::info!("Merged {} subject log(s) into {:?}", merged, output);
        }
        Command::Status => {
            println!("{}", serde_json::to_string_pretty(&commands::get_engine_status(&config)?)?);
        }
    }

    Ok(())
}
