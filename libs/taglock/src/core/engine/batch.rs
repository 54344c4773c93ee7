// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Whole-stream clock recovery.

use crate::core::config::PllConfig;
use crate::core::events::{ChannelId, EventStream, Timetag, validate_events};
use crate::core::output::ClockLockOutput;
use crate::core::pll::{PeriodEstimate, PllState, estimate_period, lock_events};
use crate::core::Result;

/// Everything a batch run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct LockRun {
    pub estimate: PeriodEstimate,
    /// Loop state after the last event
    pub state: PllState,
    pub output: ClockLockOutput,
}

/// Recover the clock over a complete stream, keeping the estimate and final
/// loop state alongside the records.
pub fn run_batch(
    channels: &[ChannelId],
    timetags: &[Timetag],
    config: &PllConfig,
) -> Result<LockRun> {
    config.validate()?;
    validate_events(channels, timetags, None)?;

    let estimate = estimate_period(
        channels,
        timetags,
        config.clock_channel,
        config.bootstrap_window,
    )?;
    let (state, output) = lock_events(&PllState::seeded(&estimate), config, channels, timetags)?;

    tracing::debug!(
        "Batch lock over {} events: {} clocks, {} data accepted ({} mode)",
        timetags.len(),
        output.clock_count(),
        output.data_count(),
        config.alignment
    );

    Ok(LockRun {
        estimate,
        state,
        output,
    })
}

/// Recover the clock over a complete stream.
pub fn clock_lock(
    channels: &[ChannelId],
    timetags: &[Timetag],
    config: &PllConfig,
) -> Result<ClockLockOutput> {
    run_batch(channels, timetags, config).map(|run| run.output)
}

/// [`clock_lock`] over an owned stream.
pub fn clock_lock_stream(stream: &EventStream, config: &PllConfig) -> Result<ClockLockOutput> {
    clock_lock(&stream.channels, &stream.timetags, config)
}
