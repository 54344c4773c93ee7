// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use thiserror::Error;

use super::events::ChannelId;

#[derive(Error, Debug)]
pub enum ClockLockError {
    #[error(
        "Insufficient clock data: found {found} clock tag(s) on channel {channel} in the first {window} events (need at least 2)"
    )]
    InsufficientClockData {
        channel: ChannelId,
        window: usize,
        found: usize,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(
        "Loop diverged at clock pulse {pulse}: frequency estimate {frequency} does not give a positive finite period"
    )]
    LoopDivergence { pulse: u64, frequency: f64 },

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ClockLockError>;
