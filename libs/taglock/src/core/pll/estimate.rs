// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Rough initial period estimate used to seed the loop filter.

use serde::{Deserialize, Serialize};

use crate::core::events::{ChannelId, Timetag};
use crate::core::{ClockLockError, Result};

/// Mean clock spacing over the bootstrap window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodEstimate {
    pub period: f64,
    pub frequency: f64,
    /// Clock tags found in the window
    pub clock_count: usize,
    pub first_clock: Timetag,
    pub last_clock: Timetag,
}

/// Estimate the clock period from the first `window` events.
///
/// Streams shorter than `window` are examined in full. The estimate only has
/// to be close enough for the loop to pull in; missing clock tags inside the
/// window bias it high.
pub fn estimate_period(
    channels: &[ChannelId],
    timetags: &[Timetag],
    clock_channel: ChannelId,
    window: usize,
) -> Result<PeriodEstimate> {
    let span = window.min(channels.len()).min(timetags.len());

    let mut clock_count = 0usize;
    let mut first_clock = None;
    let mut last_clock = None;
    for (&channel, &tag) in channels[..span].iter().zip(&timetags[..span]) {
        if channel == clock_channel {
            first_clock.get_or_insert(tag);
            last_clock = Some(tag);
            clock_count += 1;
        }
    }

    let (first_clock, last_clock) = match (first_clock, last_clock) {
        (Some(first), Some(last)) if clock_count >= 2 => (first, last),
        _ => {
            return Err(ClockLockError::InsufficientClockData {
                channel: clock_channel,
                window: span,
                found: clock_count,
            });
        }
    };

    let period = last_clock.abs_diff(first_clock) as f64 / (clock_count - 1) as f64;
    if period <= 0.0 {
        return Err(ClockLockError::InvalidInput(format!(
            "{} bootstrap clock tags on channel {} all share timetag {}",
            clock_count, clock_channel, first_clock
        )));
    }

    tracing::debug!(
        "Initial period estimate {:.3} from {} clock tags in {} events",
        period,
        clock_count,
        span
    );

    Ok(PeriodEstimate {
        period,
        frequency: 1.0 / period,
        clock_count,
        first_clock,
        last_clock,
    })
}
