// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Software phase-locked loop
//!
//! [`lock_events`] is the single routine both engines drive: it takes the
//! loop state by reference, runs every event of one slice through the loop
//! filter (clock channel) or the aligner (data channel), and returns the new
//! state together with the records accepted from that slice. Feeding a
//! stream through it in one slice or in many gives the same result, because
//! everything that carries over between slices lives in [`PllState`].

mod align;
mod estimate;
mod state;

pub use align::{Alignment, align_event};
pub use estimate::{PeriodEstimate, estimate_period};
pub use state::PllState;

use crate::core::config::PllConfig;
use crate::core::events::{ChannelId, Timetag, validate_events};
use crate::core::output::ClockLockOutput;
use crate::core::{ClockLockError, Result};

/// Run one slice of events through the loop.
///
/// `state` must already carry a bootstrap estimate ([`PllState::seeded`]).
/// The slice is validated against `state`'s last timetag before anything is
/// processed; on any error the caller's state is unchanged.
pub fn lock_events(
    state: &PllState,
    config: &PllConfig,
    channels: &[ChannelId],
    timetags: &[Timetag],
) -> Result<(PllState, ClockLockOutput)> {
    if !state.is_initialized() {
        return Err(ClockLockError::InvalidInput(
            "PLL state has no period estimate; seed it before processing events".to_string(),
        ));
    }
    config.validate()?;

    let mut next = *state;
    next.set_last_timetag(validate_events(channels, timetags, state.last_timetag())?);

    let mut output = ClockLockOutput::new();
    for (&channel, &timetag) in channels.iter().zip(timetags) {
        if channel == config.clock_channel {
            if next.advance(timetag, config)? {
                if let Some(clock0) = next.clock0() {
                    output.push_clock(timetag, clock0, next.period());
                }
            }
        } else if channel == config.data_channel {
            if let Some(alignment) = next.align(timetag, config) {
                output.push_data(timetag, &alignment);
            }
        }
    }

    tracing::trace!(
        "Locked {} events: {} clocks, {} data accepted, period {:.3}",
        timetags.len(),
        output.clock_count(),
        output.data_count(),
        next.period()
    );

    Ok((next, output))
}
