use std::{env, path::Path};

use log::LevelFilter;
use pci_derive::{CliOptions, CliValue, KvDisplay};

use crate::{
    ClassifierTuning, Error, OptimizerOptions, Result,
    algo::suggest::DEFAULT_SUGGESTION_COUNT,
};

/// Command-line options of the planner binary.
#[derive(Clone, Debug, CliOptions, KvDisplay)]
pub struct PlannerOptions {
    /// What to do with the input cells: `analyze`, `optimize` or `suggest`.
    #[cli(long = "mode", parse_with = "RunMode::parse")]
    pub mode: RunMode,
    /// Lowest assignable PCI.
    #[cli(long = "pci-min")]
    pub pci_min: u16,
    /// Highest assignable PCI (at most 503).
    #[cli(long = "pci-max")]
    pub pci_max: u16,
    #[cli(long = "max-iterations")]
    pub max_iterations: usize,
    /// Non-improving iterations before a shakeup.
    #[cli(long = "stagnation-limit")]
    pub stagnation_limit: usize,
    #[cli(long = "max-shakeups")]
    pub max_shakeups: usize,
    #[cli(long = "seed")]
    pub seed: u64,
    #[cli(long = "batch-size")]
    pub batch_size: usize,
    #[cli(long = "max-batch-size")]
    pub max_batch_size: usize,
    /// Neighbour radius (meters) for candidate costs.
    #[cli(long = "interference-radius")]
    pub interference_radius: f64,
    #[cli(long = "tie-pool")]
    pub tie_pool: usize,
    /// Wall-clock bound in seconds; 0 means none.
    #[cli(long = "time-limit")]
    pub time_limit: u64,
    /// Allowed deviation (degrees) from the expected sector spacing on one site.
    #[cli(long = "azimuth-tolerance")]
    pub azimuth_tolerance: f64,
    /// Guard (MHz) past the band edges that still counts as adjacent channel.
    #[cli(long = "adjacent-guard")]
    pub adjacent_guard: f64,
    /// Same-PCI co-channel pairs closer than this (meters) are always critical.
    #[cli(long = "coordination-distance")]
    pub coordination_distance: f64,
    /// Ignore pairs beyond the frequency-dependent propagation range.
    #[cli(flag = "propagation-cutoff")]
    pub propagation_cutoff: bool,
    /// Number of PCIs printed in `suggest` mode.
    #[cli(long = "suggestions")]
    pub suggestions: usize,
    #[cli(long = "log-level", parse_with = "LogLevel::parse")]
    pub log_level: LogLevel,
    #[cli(long = "log-format", parse_with = "LogFormat::parse")]
    pub log_format: LogFormat,
    #[cli(flag = "log-timestamp")]
    pub log_timestamp: bool,
    /// Log file path. Empty means stderr.
    #[cli(long = "log-output")]
    #[kv(fmt = "empty_dash")]
    pub log_output: String,
    /// Cell file path. Empty means stdin.
    #[cli(long = "input")]
    #[kv(fmt = "empty_dash")]
    pub input: String,
    /// Result file path. Empty means stdout.
    #[cli(long = "output")]
    #[kv(fmt = "empty_dash")]
    pub output: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "mode")]
pub enum RunMode {
    #[cli(alias = "analyse", alias = "audit")]
    Analyze,
    Optimize,
    Suggest,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-level")]
pub enum LogLevel {
    Error,
    #[cli(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
            Self::Off => LevelFilter::Off,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-format")]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        let optimizer = OptimizerOptions::default();
        let tuning = ClassifierTuning::default();
        Self {
            mode: RunMode::Analyze,
            pci_min: optimizer.pci_min,
            pci_max: optimizer.pci_max,
            max_iterations: optimizer.max_iterations,
            stagnation_limit: optimizer.stagnation_limit,
            max_shakeups: optimizer.max_shakeups,
            seed: optimizer.seed,
            batch_size: optimizer.batch_size,
            max_batch_size: optimizer.max_batch_size,
            interference_radius: optimizer.interference_radius_m,
            tie_pool: optimizer.tie_pool,
            time_limit: optimizer.time_limit_secs,
            azimuth_tolerance: tuning.azimuth_tolerance_deg,
            adjacent_guard: tuning.adjacent_guard_mhz,
            coordination_distance: tuning.coordination_distance_m,
            propagation_cutoff: tuning.propagation_cutoff,
            suggestions: DEFAULT_SUGGESTION_COUNT,
            log_level: LogLevel::Warn,
            log_format: LogFormat::Compact,
            log_timestamp: false,
            log_output: String::new(),
            input: String::new(),
            output: String::new(),
        }
    }
}

impl PlannerOptions {
    pub fn from_args() -> Result<Self> {
        Self::parse_from_iter(env::args().skip(1))
    }

    pub fn parse_from_iter<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        let mut args = args
            .into_iter()
            .map(|arg| arg.as_ref().to_owned())
            .peekable();

        while let Some(arg) = args.next() {
            if arg == "--help" || arg == "-h" {
                return Err(Error::invalid_input(Self::usage()));
            }

            let Some(raw_name) = arg.strip_prefix("--") else {
                return Err(Error::invalid_input(format!(
                    "Unexpected argument: {arg}\n\n{}",
                    Self::usage()
                )));
            };

            if raw_name.is_empty() {
                return Err(Error::invalid_input(format!(
                    "Invalid option name: {arg}\n\n{}",
                    Self::usage()
                )));
            }

            let (name, value) = Self::split_arg(raw_name, &mut args);
            if !options.apply_cli_option(&name, value)? {
                return Err(Error::invalid_input(format!(
                    "Unknown option: --{name}\n\n{}",
                    Self::usage()
                )));
            }
        }

        Ok(options)
    }

    pub fn usage() -> String {
        format!(
            concat!(
                "Usage:\n",
                "  pci-planner [options] [--input cells.csv]\n",
                "  pci-planner [options] < cells.csv\n\n",
                "Input: one cell per line\n",
                "  id,site_id,sector,pci,latitude,longitude,frequency_mhz,earfcn,bandwidth_mhz,",
                "azimuth,beamwidth,tower,rs_power_dbm\n\n",
                "Options:\n",
                "{}",
                "  --help\n",
                "\n",
                "Values:\n",
                "  mode       {}\n",
                "  log-level  {}\n",
                "  log-format {}\n",
                "\n",
                "Examples:\n",
                "  pci-planner --mode analyze --input cells.csv\n",
                "  pci-planner --mode optimize --seed 7 --output plan.csv < cells.csv\n",
                "  pci-planner --mode suggest --pci-min 0 --suggestions 5 < cells.csv\n",
                "  pci-planner --mode optimize --log-level=info --log-output run.log < cells.csv\n",
            ),
            Self::cli_option_lines(),
            RunMode::expected(),
            LogLevel::expected(),
            LogFormat::expected(),
        )
    }

    pub fn to_optimizer_options(&self) -> OptimizerOptions {
        OptimizerOptions {
            pci_min: self.pci_min,
            pci_max: self.pci_max,
            max_iterations: self.max_iterations,
            stagnation_limit: self.stagnation_limit,
            max_shakeups: self.max_shakeups,
            seed: self.seed,
            batch_size: self.batch_size,
            max_batch_size: self.max_batch_size,
            interference_radius_m: self.interference_radius,
            tie_pool: self.tie_pool,
            time_limit_secs: self.time_limit,
            classifier: self.classifier_tuning(),
        }
    }

    pub fn classifier_tuning(&self) -> ClassifierTuning {
        ClassifierTuning {
            azimuth_tolerance_deg: self.azimuth_tolerance,
            adjacent_guard_mhz: self.adjacent_guard,
            coordination_distance_m: self.coordination_distance,
            propagation_cutoff: self.propagation_cutoff,
        }
    }

    pub fn log_output_path(&self) -> Option<&Path> {
        stdio_or_path(&self.log_output)
    }

    pub fn output_path(&self) -> Option<&Path> {
        stdio_or_path(&self.output)
    }

    pub fn input_path(&self) -> Option<&Path> {
        stdio_or_path(&self.input)
    }
}

/// Empty and `-` select the standard stream.
fn stdio_or_path(raw: &str) -> Option<&Path> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "-" {
        None
    } else {
        Some(Path::new(raw))
    }
}
