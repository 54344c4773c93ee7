// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Result records produced by the clock-lock engines.

use serde::{Deserialize, Serialize};

use crate::core::events::Timetag;
use crate::core::pll::Alignment;

/// Column-oriented record set.
///
/// Clock columns (`clocks`, `recovered_clocks`, `periods`) share one length,
/// data columns (everything else) share another. Sequences only grow, sized
/// by what was actually accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClockLockOutput {
    /// Raw timetag of each reported clock pulse
    pub clocks: Vec<Timetag>,
    /// Recovered clock edge after each reported pulse
    pub recovered_clocks: Vec<f64>,
    /// Recovered period after each reported pulse
    pub periods: Vec<f64>,
    /// Raw timetag of each accepted data event
    pub data_tags: Vec<Timetag>,
    pub nearest_pulse_times: Vec<f64>,
    /// Fractional cycle position before rounding
    pub cycles: Vec<f64>,
    /// Clock edge each data event was aligned against
    pub reference_clocks: Vec<f64>,
    pub relative_clocks: Vec<f64>,
}

impl ClockLockOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_clock(&mut self, timetag: Timetag, recovered_clock: f64, period: f64) {
        self.clocks.push(timetag);
        self.recovered_clocks.push(recovered_clock);
        self.periods.push(period);
    }

    pub(crate) fn push_data(&mut self, timetag: Timetag, alignment: &Alignment) {
        self.data_tags.push(timetag);
        self.nearest_pulse_times.push(alignment.nearest_pulse_time);
        self.cycles.push(alignment.cycles);
        self.reference_clocks.push(alignment.reference_clock);
        self.relative_clocks.push(alignment.relative_clock);
    }

    /// Append another record set, e.g. the output of the next chunk.
    pub fn append(&mut self, mut other: ClockLockOutput) {
        self.clocks.append(&mut other.clocks);
        self.recovered_clocks.append(&mut other.recovered_clocks);
        self.periods.append(&mut other.periods);
        self.data_tags.append(&mut other.data_tags);
        self.nearest_pulse_times
            .append(&mut other.nearest_pulse_times);
        self.cycles.append(&mut other.cycles);
        self.reference_clocks.append(&mut other.reference_clocks);
        self.relative_clocks.append(&mut other.relative_clocks);
    }

    pub fn clock_count(&self) -> usize {
        self.clocks.len()
    }

    pub fn data_count(&self) -> usize {
        self.data_tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clocks.is_empty() && self.data_tags.is_empty()
    }
}

impl Extend<ClockLockOutput> for ClockLockOutput {
    fn extend<I: IntoIterator<Item = ClockLockOutput>>(&mut self, iter: I) {
        for chunk in iter {
            self.append(chunk);
        }
    }
}

impl FromIterator<ClockLockOutput> for ClockLockOutput {
    fn from_iter<I: IntoIterator<Item = ClockLockOutput>>(iter: I) -> Self {
        let mut output = Self::new();
        output.extend(iter);
        output
    }
}
