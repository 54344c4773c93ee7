// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Assign data events to the nearest expected pulse of the recovered clock.

use super::state::PllState;
use crate::core::config::{AlignmentMode, PllConfig};
use crate::core::events::Timetag;

/// Placement of one data event relative to the recovered clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    /// Fractional sub-pulse index measured from `reference_clock`
    pub cycles: f64,
    pub nearest_pulse_time: f64,
    /// Recovered clock edge the event was measured against
    pub reference_clock: f64,
    /// Start of the `clock_mult` sub-period containing the event
    pub relative_clock: f64,
}

/// Align `timetag` against the clock edge `clock0` with period `period`.
///
/// Returns `None` when windowed alignment rejects the event. Ties round to
/// even.
pub fn align_event(
    timetag: Timetag,
    clock0: f64,
    period: f64,
    config: &PllConfig,
) -> Option<Alignment> {
    let hist = timetag as f64 - clock0;
    let bin_time = period / f64::from(config.pulses_per_clock);
    let cycles = (hist + config.phase_offset) / bin_time;
    let nearest_cycle = cycles.round_ties_even();

    if config.alignment == AlignmentMode::Windowed && (cycles - nearest_cycle).abs() > config.window
    {
        return None;
    }

    let sub_period = period / f64::from(config.effective_clock_mult());
    Some(Alignment {
        cycles,
        nearest_pulse_time: nearest_cycle * bin_time + clock0,
        reference_clock: clock0,
        relative_clock: clock0 + (hist / sub_period).floor() * sub_period,
    })
}

impl PllState {
    /// Align a data event, or `None` if the clock is not yet usable (no edge,
    /// or fewer than `guard_period` pulses consumed) or the event is rejected.
    pub fn align(&self, timetag: Timetag, config: &PllConfig) -> Option<Alignment> {
        if !self.is_locked(config.guard_period) {
            return None;
        }
        let clock0 = self.clock0()?;
        align_event(timetag, clock0, self.period(), config)
    }
}
