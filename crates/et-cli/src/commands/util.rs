//! Shared utilities for CLI commands.

use std::fs::{File, OpenOptions};
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};

use et_core::{CsvExporter, MachineConfig, MatchId, Period};

use crate::Config;

/// Formats seconds as `mm:ss`; minutes keep counting past the hour.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Machine configuration for a run; `--strict` can only tighten the config.
pub fn machine_config(config: &Config, strict: bool) -> MachineConfig {
    MachineConfig {
        strict_ordering: config.strict_ordering || strict,
        ..MachineConfig::default()
    }
}

pub fn parse_match(match_id: &str) -> Result<MatchId> {
    MatchId::new(match_id).context("invalid --match")
}

pub fn parse_period(period: u8) -> Result<Period> {
    Period::new(period).context("invalid --period")
}

/// Opens the configured CSV results file for appending, if any.
pub fn csv_exporter(config: &Config) -> Result<Option<CsvExporter<BufWriter<File>>>> {
    config
        .csv_export_path
        .as_deref()
        .map(open_append)
        .transpose()
}

fn open_append(path: &Path) -> Result<CsvExporter<BufWriter<File>>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    Ok(CsvExporter::new(BufWriter::new(file)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_pads_minutes_and_seconds() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(77), "01:17");
        assert_eq!(format_clock(5999), "99:59");
        assert_eq!(format_clock(6000), "100:00");
    }

    #[test]
    fn test_strict_flag_tightens_config() {
        let config = Config::default();
        assert!(!machine_config(&config, false).strict_ordering);
        assert!(machine_config(&config, true).strict_ordering);

        let strict = Config {
            strict_ordering: true,
            ..Config::default()
        };
        assert!(machine_config(&strict, false).strict_ordering);
    }
}
