// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Loop-filter state carried across the whole stream (or across chunks).

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use super::estimate::PeriodEstimate;
use crate::core::config::PllConfig;
use crate::core::events::Timetag;
use crate::core::{ClockLockError, Result};

/// Recovered-clock state of the software PLL.
///
/// The state is plain data: the core routine takes it by reference, works on
/// a copy and hands back the updated value, so a failed call never leaves a
/// half-updated loop behind. It serializes, which lets a long-running session
/// be checkpointed and resumed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PllState {
    /// Most recent recovered clock edge; `None` until the first clock pulse
    clock0: Option<f64>,
    period: f64,
    frequency: f64,
    phase_error_prev: f64,
    /// Whether the bootstrap period estimate has been applied
    initialized: bool,
    pulses_seen: u64,
    last_timetag: Option<Timetag>,
}

impl Default for PllState {
    fn default() -> Self {
        Self::new()
    }
}

impl PllState {
    /// Fresh state awaiting its bootstrap estimate.
    pub fn new() -> Self {
        Self {
            clock0: None,
            period: 1.0,
            frequency: 1.0,
            phase_error_prev: 0.0,
            initialized: false,
            pulses_seen: 0,
            last_timetag: None,
        }
    }

    /// State seeded with a bootstrap estimate, ready for the first pulse.
    pub fn seeded(estimate: &PeriodEstimate) -> Self {
        Self {
            period: estimate.period,
            frequency: estimate.frequency,
            initialized: true,
            ..Self::new()
        }
    }

    pub fn clock0(&self) -> Option<f64> {
        self.clock0
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn phase_error_prev(&self) -> f64 {
        self.phase_error_prev
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn pulses_seen(&self) -> u64 {
        self.pulses_seen
    }

    pub fn last_timetag(&self) -> Option<Timetag> {
        self.last_timetag
    }

    pub(crate) fn set_last_timetag(&mut self, last_timetag: Option<Timetag>) {
        self.last_timetag = last_timetag;
    }

    /// True once a clock edge exists and at least `guard_period` pulses have
    /// been consumed.
    pub fn is_locked(&self, guard_period: u64) -> bool {
        self.clock0.is_some() && self.pulses_seen >= guard_period
    }

    /// Feed one clock pulse through the loop filter.
    ///
    /// Returns whether this pulse falls after the guard period and should be
    /// reported. On divergence the state is left as it was before the call.
    pub fn advance(&mut self, timetag: Timetag, config: &PllConfig) -> Result<bool> {
        let tag = timetag as f64;
        let clock0 = self.clock0.unwrap_or(tag - self.period);

        // Sinusoidal phase detector: zero when the pulse lands on the
        // predicted edge, bounded and periodic in the deviation.
        let phase_error = (TAU * (tag - (clock0 + self.period)) / self.period).sin();
        let filtered = phase_error + (phase_error - self.phase_error_prev) * config.deriv_gain;
        let frequency = self.frequency - filtered * config.prop_gain;
        let period = 1.0 / frequency;

        if !frequency.is_finite() || frequency <= 0.0 || !period.is_finite() {
            tracing::warn!(
                "PLL diverged at pulse {} (timetag {}): frequency {} after filtered error {}",
                self.pulses_seen + 1,
                timetag,
                frequency,
                filtered
            );
            return Err(ClockLockError::LoopDivergence {
                pulse: self.pulses_seen + 1,
                frequency,
            });
        }

        self.clock0 = Some(clock0 + period);
        self.frequency = frequency;
        self.period = period;
        self.phase_error_prev = phase_error;

        let index = self.pulses_seen;
        self.pulses_seen += 1;
        Ok(index >= config.guard_period)
    }
}
