//! # Telemetry Module
//!
//! Handles plant-state snapshot logging to JSONL files with rotation.
//!
//! This module handles:
//! - Formatting periodic plant-state snapshots as JSONL (JSON Lines)
//! - Writing to rotating log files (max N records per file)
//! - Retaining only the last M files

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use crate::ems::state::{PlantState, Strategy};

const FILE_PREFIX: &str = "telemetry-";
const FILE_SUFFIX: &str = ".jsonl";

/// One snapshot line
#[derive(Debug, Serialize)]
struct SnapshotRecord<'a> {
    timestamp: String,
    mode: &'static str,
    strategy: Strategy,
    generator_power: &'a [u32; 2],
    battery_power: &'a [f64; 2],
    battery_soc: &'a [f32; 2],
    fuel_efficiency: &'a [f32; 2],
    latency_counter: u32,
}

/// JSONL snapshot writer with record-count rotation
#[derive(Debug)]
pub struct TelemetryLogger {
    log_dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    records_in_file: usize,
    files_written: usize,
}

impl TelemetryLogger {
    /// Create a logger writing into `log_dir`, creating the directory
    pub fn new<P: AsRef<Path>>(
        log_dir: P,
        max_records_per_file: usize,
        max_files_to_keep: usize,
    ) -> io::Result<Self> {
        fs::create_dir_all(&log_dir)?;
        Ok(Self {
            log_dir: log_dir.as_ref().to_path_buf(),
            max_records_per_file: max_records_per_file.max(1),
            max_files_to_keep: max_files_to_keep.max(1),
            writer: None,
            records_in_file: 0,
            files_written: 0,
        })
    }

    /// Append one snapshot record, rotating the file when it is full
    pub fn log_snapshot(&mut self, state: &PlantState) -> io::Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        let record = SnapshotRecord {
            timestamp: Utc::now().to_rfc3339(),
            mode: state.mode.label(),
            strategy: state.strategy,
            generator_power: &state.generator_power,
            battery_power: &state.battery_power,
            battery_soc: &state.battery_soc,
            fuel_efficiency: &state.fuel_efficiency,
            latency_counter: state.latency_counter,
        };
        let line = serde_json::to_string(&record)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        if let Some(writer) = self.writer.as_mut() {
            writeln!(writer, "{}", line)?;
            writer.flush()?;
            self.records_in_file += 1;
        }
        Ok(())
    }

    /// Start a fresh file and prune the oldest ones past the retention cap
    fn rotate(&mut self) -> io::Result<()> {
        let name = format!(
            "{}{}-{:04}{}",
            FILE_PREFIX,
            Utc::now().format("%Y%m%d-%H%M%S"),
            self.files_written,
            FILE_SUFFIX
        );
        let path = self.log_dir.join(&name);
        debug!("Rotating telemetry log to {}", path.display());

        self.writer = Some(BufWriter::new(File::create(path)?));
        self.records_in_file = 0;
        self.files_written += 1;

        self.prune_old_files()
    }

    fn prune_old_files(&self) -> io::Result<()> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.log_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX))
                    .unwrap_or(false)
            })
            .collect();

        // Names sort chronologically: timestamp plus a running index
        files.sort();
        while files.len() > self.max_files_to_keep {
            let oldest = files.remove(0);
            debug!("Pruning telemetry log {}", oldest.display());
            fs::remove_file(oldest)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ems::state::Strategy;

    fn sample_state() -> PlantState {
        let mut state = PlantState::new(Strategy::Soc);
        state.battery_soc = [60.0, 55.0];
        state.generator_power = [1300, 1300];
        state
    }

    #[test]
    fn test_snapshot_lines_are_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = TelemetryLogger::new(dir.path(), 100, 3).unwrap();

        logger.log_snapshot(&sample_state()).unwrap();
        logger.log_snapshot(&sample_state()).unwrap();

        let file = fs::read_dir(dir.path()).unwrap().next().unwrap().unwrap();
        let contents = fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        for line in lines {
            let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(parsed["mode"], "initializing");
            assert_eq!(parsed["generator_power"][0], 1300);
            assert!(parsed["timestamp"].is_string());
        }
    }

    #[test]
    fn test_rotation_by_record_count() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = TelemetryLogger::new(dir.path(), 2, 10).unwrap();

        for _ in 0..5 {
            logger.log_snapshot(&sample_state()).unwrap();
        }

        let count = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, 3, "five records at two per file need three files");
    }

    #[test]
    fn test_retention_prunes_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = TelemetryLogger::new(dir.path(), 1, 2).unwrap();

        for _ in 0..5 {
            logger.log_snapshot(&sample_state()).unwrap();
        }

        let count = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, 2, "only the retention cap of files survives");
    }
}
