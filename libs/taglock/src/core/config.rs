// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Clock-lock configuration
//!
//! `PllConfig` carries everything the engines need: which channels to read,
//! how the recovered period is subdivided, loop-filter gains and the data
//! alignment policy. It can be built in code or loaded from a YAML, TOML or
//! JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::events::ChannelId;
use crate::core::{ClockLockError, Result};

pub const DEFAULT_WINDOW: f64 = 0.5;
pub const DEFAULT_DERIV_GAIN: f64 = 1800.0;
pub const DEFAULT_PROP_GAIN: f64 = 2e-12;
pub const DEFAULT_BOOTSTRAP_WINDOW: usize = 1000;

/// How data events are accepted once their cycle position is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentMode {
    /// Keep only events within `window` cycles of an expected pulse.
    #[default]
    Windowed,
    /// Keep every event after the guard period. Used while scanning the
    /// phase offset, where discarding would bias the result.
    Unconditional,
}

impl std::fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignmentMode::Windowed => write!(f, "windowed"),
            AlignmentMode::Unconditional => write!(f, "unconditional"),
        }
    }
}

impl std::str::FromStr for AlignmentMode {
    type Err = ClockLockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "windowed" => Ok(AlignmentMode::Windowed),
            "unconditional" | "agnostic" => Ok(AlignmentMode::Unconditional),
            other => Err(ClockLockError::Configuration(format!(
                "Unknown alignment mode '{}' (expected 'windowed' or 'unconditional')",
                other
            ))),
        }
    }
}

/// Configuration for the clock-recovery engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PllConfig {
    /// Channel carrying the reference clock pulses
    pub clock_channel: ChannelId,
    /// Channel carrying the detector events to align
    pub data_channel: ChannelId,
    /// Expected sub-pulses (e.g. laser pulses) per clock period
    pub pulses_per_clock: u32,
    /// Offset added to each event's phase before binning, in timetag units
    #[serde(default)]
    pub phase_offset: f64,
    /// Maximum distance, in cycles, from the nearest pulse (windowed mode)
    #[serde(default = "default_window")]
    pub window: f64,
    /// Derivative gain of the loop filter
    #[serde(default = "default_deriv_gain")]
    pub deriv_gain: f64,
    /// Proportional gain applied to the filtered phase error
    #[serde(default = "default_prop_gain")]
    pub prop_gain: f64,
    /// Clock pulses consumed to settle the loop before anything is reported
    #[serde(default)]
    pub guard_period: u64,
    /// Events examined for the initial period estimate
    #[serde(default = "default_bootstrap_window")]
    pub bootstrap_window: usize,
    #[serde(default)]
    pub alignment: AlignmentMode,
    /// Subdivision used for `relative_clocks`; defaults to `pulses_per_clock`
    #[serde(default)]
    pub clock_mult: Option<u32>,
    /// Events per chunk for the incremental engine
    #[serde(default)]
    pub chunk_size: Option<usize>,
}

fn default_window() -> f64 {
    DEFAULT_WINDOW
}

fn default_deriv_gain() -> f64 {
    DEFAULT_DERIV_GAIN
}

fn default_prop_gain() -> f64 {
    DEFAULT_PROP_GAIN
}

fn default_bootstrap_window() -> usize {
    DEFAULT_BOOTSTRAP_WINDOW
}

impl PllConfig {
    /// Config with default gains for the given channels.
    pub fn new(clock_channel: ChannelId, data_channel: ChannelId, pulses_per_clock: u32) -> Self {
        Self {
            clock_channel,
            data_channel,
            pulses_per_clock,
            phase_offset: 0.0,
            window: DEFAULT_WINDOW,
            deriv_gain: DEFAULT_DERIV_GAIN,
            prop_gain: DEFAULT_PROP_GAIN,
            guard_period: 0,
            bootstrap_window: DEFAULT_BOOTSTRAP_WINDOW,
            alignment: AlignmentMode::Windowed,
            clock_mult: None,
            chunk_size: None,
        }
    }

    pub fn with_phase_offset(mut self, phase_offset: f64) -> Self {
        self.phase_offset = phase_offset;
        self
    }

    pub fn with_window(mut self, window: f64) -> Self {
        self.window = window;
        self
    }

    pub fn with_gains(mut self, deriv_gain: f64, prop_gain: f64) -> Self {
        self.deriv_gain = deriv_gain;
        self.prop_gain = prop_gain;
        self
    }

    pub fn with_guard_period(mut self, guard_period: u64) -> Self {
        self.guard_period = guard_period;
        self
    }

    pub fn with_bootstrap_window(mut self, bootstrap_window: usize) -> Self {
        self.bootstrap_window = bootstrap_window;
        self
    }

    pub fn with_alignment(mut self, alignment: AlignmentMode) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_clock_mult(mut self, clock_mult: u32) -> Self {
        self.clock_mult = Some(clock_mult);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    /// Subdivision used for relative clocks.
    pub fn effective_clock_mult(&self) -> u32 {
        self.clock_mult.unwrap_or(self.pulses_per_clock)
    }

    pub fn validate(&self) -> Result<()> {
        if self.clock_channel == self.data_channel {
            return Err(ClockLockError::Configuration(format!(
                "clock_channel and data_channel are both {}",
                self.clock_channel
            )));
        }
        if self.pulses_per_clock == 0 {
            return Err(ClockLockError::Configuration(
                "pulses_per_clock must be at least 1".to_string(),
            ));
        }
        if self.clock_mult == Some(0) {
            return Err(ClockLockError::Configuration(
                "clock_mult must be at least 1".to_string(),
            ));
        }
        if self.bootstrap_window < 2 {
            return Err(ClockLockError::Configuration(format!(
                "bootstrap_window must be at least 2 (got {})",
                self.bootstrap_window
            )));
        }
        if self.chunk_size == Some(0) {
            return Err(ClockLockError::Configuration(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if !self.window.is_finite() || self.window < 0.0 {
            return Err(ClockLockError::Configuration(format!(
                "window must be a non-negative finite number (got {})",
                self.window
            )));
        }
        for (name, value) in [
            ("phase_offset", self.phase_offset),
            ("deriv_gain", self.deriv_gain),
            ("prop_gain", self.prop_gain),
        ] {
            if !value.is_finite() {
                return Err(ClockLockError::Configuration(format!(
                    "{} must be finite (got {})",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Load and validate a config file. The format follows the extension:
    /// `.yaml`/`.yml`, `.toml` or `.json`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClockLockError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let config: Self = match extension.as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| {
                ClockLockError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
            })?,
            Some("toml") => toml::from_str(&content).map_err(|e| {
                ClockLockError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
            })?,
            Some("json") => serde_json::from_str(&content).map_err(|e| {
                ClockLockError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
            })?,
            _ => {
                return Err(ClockLockError::Configuration(format!(
                    "Unsupported config format for {} (expected .yaml, .toml or .json)",
                    path.display()
                )));
            }
        };

        config.validate()?;
        tracing::info!("Loaded clock-lock config from {}", path.display());
        Ok(config)
    }
}
