use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, ValueEnum};
use tracing::Level;

use crate::config::{ConfigError, SimulationConfig};
use crate::devices::DemandScenario;

/// Optimizes daily pump schedules for every requested demand scenario and
/// cycle count.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    #[command(flatten)]
    pub source: ConfigSource,
    /// Demand scenarios to optimize.
    #[arg(long, value_enum, default_value_t = DemandChoice::Both)]
    pub demand: DemandChoice,
    /// Comma-separated pump cycle counts to optimize.
    #[arg(long, value_delimiter = ',', default_values_t = [2, 3], value_parser = parse_cycle_count)]
    pub cycles: Vec<usize>,
    /// Override the optimizer seed.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Override the optimizer generation budget.
    #[arg(long)]
    pub max_generations: Option<usize>,
    /// Directory receiving one telemetry CSV per accepted solution.
    #[arg(long)]
    pub telemetry_dir: Option<PathBuf>,
    /// File receiving a JSON array of solution summaries.
    #[arg(long)]
    pub report_out: Option<PathBuf>,
    /// Raise log verbosity (`-v` debug, `-vv` trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Where the plant configuration comes from; the baseline preset when
/// neither is given.
#[derive(Args, Clone, Default, Debug)]
#[group(required = false, multiple = false)]
pub struct ConfigSource {
    /// TOML scenario file.
    #[arg(long)]
    pub scenario: Option<PathBuf>,
    /// Built-in preset name.
    #[arg(long)]
    pub preset: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DemandChoice {
    #[value(alias = "max")]
    High,
    #[value(alias = "min")]
    Low,
    Both,
}

impl DemandChoice {
    pub fn scenarios(self) -> &'static [DemandScenario] {
        match self {
            Self::High => &[DemandScenario::High],
            Self::Low => &[DemandScenario::Low],
            Self::Both => &DemandScenario::ALL,
        }
    }
}

fn parse_cycle_count(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("cycle count must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("invalid cycle count \"{s}\": {e}")),
    }
}

impl CliArgs {
    /// Resolves the configuration source and applies command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the scenario file cannot be loaded or the
    /// preset is unknown. The result is not validated.
    pub fn load_config(&self) -> Result<SimulationConfig, ConfigError> {
        let mut config = if let Some(path) = &self.source.scenario {
            SimulationConfig::from_toml_file(path)?
        } else if let Some(name) = &self.source.preset {
            SimulationConfig::from_preset(name)?
        } else {
            SimulationConfig::baseline()
        };

        if let Some(seed) = self.seed {
            config.optimizer.seed = seed;
        }
        if let Some(generations) = self.max_generations {
            config.optimizer.max_generations = generations;
        }
        Ok(config)
    }

    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

/// Telemetry file for one accepted solution, `<scenario>_<N>cycles.csv`.
pub fn telemetry_path(dir: &Path, scenario: DemandScenario, cycles: usize) -> PathBuf {
    dir.join(format!("{}_{cycles}cycles.csv", scenario.label()))
}
