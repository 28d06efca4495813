use std::{fs::File, io::Write, path::Path};

use env_logger::{Builder, Target, WriteStyle, fmt::Formatter};
use log::{Level, Record};

use crate::{
    Error, Result,
    options::{LogFormat, PlannerOptions},
};

/// Installs the process-wide logger described by the `--log-*` options.
pub fn init_logger(options: &PlannerOptions) -> Result<()> {
    let mut builder = formatted_builder(options.log_format, options.log_timestamp);
    builder
        .filter_level(options.log_level.to_filter())
        .target(log_target(options.log_output_path())?);

    builder
        .try_init()
        .map_err(|e| Error::other(format!("logger init failed: {e}")))?;
    log::debug!(
        "logging: ready level={} format={}",
        options.log_level,
        options.log_format
    );
    Ok(())
}

fn formatted_builder(format: LogFormat, timestamp: bool) -> Builder {
    let mut builder = Builder::new();
    builder
        .write_style(WriteStyle::Never)
        .format(move |buf: &mut Formatter, record| {
            if timestamp {
                write!(buf, "{} ", buf.timestamp_millis())?;
            }
            writeln!(buf, "{}", render(format, record))
        });
    builder
}

fn render(format: LogFormat, record: &Record<'_>) -> String {
    match format {
        LogFormat::Compact => format!("{} {}", level_tag(record.level()), record.args()),
        LogFormat::Pretty => format!(
            "{:<5} [{}] {}",
            level_tag(record.level()),
            record.module_path().unwrap_or_else(|| record.target()),
            record.args()
        ),
    }
}

fn log_target(path: Option<&Path>) -> Result<Target> {
    let Some(path) = path else {
        return Ok(Target::Stderr);
    };
    let file = File::create(path).map_err(|e| {
        Error::other(format!(
            "failed to create log output file {}: {e}",
            path.display()
        ))
    })?;
    Ok(Target::Pipe(Box::new(file)))
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}
