//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::ems::state::Strategy;
use crate::error::Result;
use crate::sgp::crc::CrcConfig;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub link: LinkConfig,
    pub queue: QueueConfig,
    pub crc: CrcSection,
    pub ems: EmsConfig,
    pub telemetry: TelemetryConfig,
    pub logging: LoggingConfig,
}

/// Simulator link configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LinkConfig {
    #[serde(default = "default_device_paths")]
    pub device_paths: Vec<String>,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,
}

/// Frame queue configuration
#[derive(Debug, Deserialize, Clone)]
pub struct QueueConfig {
    #[serde(default = "default_queue_capacity")]
    pub transmit_capacity: usize,

    #[serde(default = "default_queue_capacity")]
    pub receive_capacity: usize,
}

/// Link CRC parameters
///
/// Validated as a whole by the CRC engine at startup; a bad combination is
/// fatal, never silently defaulted.
#[derive(Debug, Deserialize, Clone)]
pub struct CrcSection {
    #[serde(default = "default_crc_bit_length")]
    pub bit_length: u8,

    #[serde(default = "default_crc_polynomial")]
    pub polynomial: u32,

    #[serde(default)]
    pub initial_value: u32,

    #[serde(default)]
    pub final_xor_value: u32,

    #[serde(default)]
    pub input_reflected: bool,

    #[serde(default)]
    pub result_reflected: bool,
}

/// Rule engine configuration
#[derive(Debug, Deserialize, Clone)]
pub struct EmsConfig {
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,

    #[serde(default = "default_producer_period_ms")]
    pub producer_period_ms: u64,
}

/// Telemetry snapshot configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_snapshot_interval_ms")]
    pub snapshot_interval_ms: u64,
}

/// Log output configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default)]
    pub file_enabled: bool,

    #[serde(default = "default_log_dir")]
    pub dir: String,
}

// Default value functions
fn default_device_paths() -> Vec<String> {
    vec!["/dev/ttyACM0".to_string(), "/dev/ttyUSB0".to_string()]
}
fn default_baud_rate() -> u32 { 115_200 }
fn default_tick_period_ms() -> u64 { 10 }

fn default_queue_capacity() -> usize { 100 }

fn default_crc_bit_length() -> u8 { 16 }
fn default_crc_polynomial() -> u32 { 0x1021 }

fn default_strategy() -> Strategy { Strategy::Inefficient }
fn default_producer_period_ms() -> u64 { 100 }

fn default_telemetry_enabled() -> bool { true }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_snapshot_interval_ms() -> u64 { 1000 }

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            device_paths: default_device_paths(),
            baud_rate: default_baud_rate(),
            tick_period_ms: default_tick_period_ms(),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            transmit_capacity: default_queue_capacity(),
            receive_capacity: default_queue_capacity(),
        }
    }
}

impl Default for CrcSection {
    fn default() -> Self {
        Self {
            bit_length: default_crc_bit_length(),
            polynomial: default_crc_polynomial(),
            initial_value: 0,
            final_xor_value: 0,
            input_reflected: false,
            result_reflected: false,
        }
    }
}

impl Default for EmsConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            producer_period_ms: default_producer_period_ms(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_telemetry_enabled(),
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
            snapshot_interval_ms: default_snapshot_interval_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file_enabled: false,
            dir: default_log_dir(),
        }
    }
}

impl CrcSection {
    /// The engine parameters this section describes
    ///
    /// Range validation is the engine's job, not the parser's.
    pub fn to_crc_config(&self) -> CrcConfig {
        CrcConfig {
            bit_length: self.bit_length,
            polynomial: self.polynomial,
            initial_value: self.initial_value,
            final_xor_value: self.final_xor_value,
            input_reflected: self.input_reflected,
            result_reflected: self.result_reflected,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, TOML parsing fails or
    /// validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the given file, or fall back to built-in defaults
    ///
    /// An explicitly named file must load; only its absence falls back.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let config = Config::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.link.device_paths.is_empty() {
            return Err(crate::error::EmsBridgeError::Config(
                toml::de::Error::custom("link device_paths cannot be empty")
            ));
        }

        if self.link.baud_rate == 0 {
            return Err(crate::error::EmsBridgeError::Config(
                toml::de::Error::custom("baud_rate must be greater than 0")
            ));
        }

        if self.link.tick_period_ms == 0 || self.link.tick_period_ms > 1000 {
            return Err(crate::error::EmsBridgeError::Config(
                toml::de::Error::custom("tick_period_ms must be between 1 and 1000")
            ));
        }

        // Queue sizes mirror the peer's single-byte size counters
        if self.queue.transmit_capacity == 0 || self.queue.transmit_capacity > 255 {
            return Err(crate::error::EmsBridgeError::Config(
                toml::de::Error::custom("transmit_capacity must be between 1 and 255")
            ));
        }

        if self.queue.receive_capacity == 0 || self.queue.receive_capacity > 255 {
            return Err(crate::error::EmsBridgeError::Config(
                toml::de::Error::custom("receive_capacity must be between 1 and 255")
            ));
        }

        if self.ems.producer_period_ms == 0 || self.ems.producer_period_ms > 60000 {
            return Err(crate::error::EmsBridgeError::Config(
                toml::de::Error::custom("producer_period_ms must be between 1 and 60000")
            ));
        }

        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(crate::error::EmsBridgeError::Config(
                toml::de::Error::custom("telemetry log_dir cannot be empty when enabled")
            ));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(crate::error::EmsBridgeError::Config(
                toml::de::Error::custom("max_records_per_file must be greater than 0")
            ));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(crate::error::EmsBridgeError::Config(
                toml::de::Error::custom("max_files_to_keep must be greater than 0")
            ));
        }

        if self.telemetry.snapshot_interval_ms == 0 || self.telemetry.snapshot_interval_ms > 60000 {
            return Err(crate::error::EmsBridgeError::Config(
                toml::de::Error::custom("snapshot_interval_ms must be between 1 and 60000")
            ));
        }

        if self.logging.file_enabled && self.logging.dir.is_empty() {
            return Err(crate::error::EmsBridgeError::Config(
                toml::de::Error::custom("logging dir cannot be empty when file logging is enabled")
            ));
        }

        Ok(())
    }
}
