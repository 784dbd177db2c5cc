use std::{str::FromStr, time::SystemTime};

use anyhow::{Context, Result};
use colored::Colorize;
use log::{Level, LevelFilter};

fn colored_level(level: Level) -> colored::ColoredString {
    let text = level.to_string();
    match level {
        Level::Error => text.red().bold(),
        Level::Warn => text.yellow(),
        Level::Info => text.green(),
        Level::Debug => text.blue(),
        Level::Trace => text.dimmed(),
    }
}

pub fn setup_logger() -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {} {}: {}",
                humantime::format_rfc3339_seconds(SystemTime::now()),
                colored_level(record.level()),
                record.target(),
                message
            ))
        })
        .level(LevelFilter::Trace)
        .level_for("hyper", LevelFilter::Warn)
        .level_for("reqwest", LevelFilter::Warn)
        .chain(std::io::stdout())
        .apply()
        .context("logger already initialized")?;

    log::set_max_level(LevelFilter::Info);
    Ok(())
}

/// Applies the configured level, e.g. "debug". Unknown names fall back to info.
pub fn set_level(level: &str) -> LevelFilter {
    let filter = LevelFilter::from_str(level).unwrap_or(LevelFilter::Info);
    log::set_max_level(filter);
    filter
}
