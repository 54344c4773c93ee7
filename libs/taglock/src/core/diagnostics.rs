// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Lock-quality summary of a result set.

use serde::{Deserialize, Serialize};

use crate::core::output::ClockLockOutput;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LockSummary {
    pub clock_count: usize,
    pub data_count: usize,
    pub mean_period: f64,
    /// Population standard deviation of the recovered period
    pub period_std_dev: f64,
    /// RMS of `clock - recovered_clock` over the reported pulses
    pub rms_clock_residual: f64,
    pub max_abs_clock_residual: f64,
}

impl LockSummary {
    pub fn from_output(output: &ClockLockOutput) -> Self {
        let clock_count = output.clock_count();
        if clock_count == 0 {
            return Self {
                data_count: output.data_count(),
                ..Self::default()
            };
        }
        let n = clock_count as f64;

        let mean_period = output.periods.iter().sum::<f64>() / n;
        let period_variance = output
            .periods
            .iter()
            .map(|p| (p - mean_period).powi(2))
            .sum::<f64>()
            / n;

        let (square_sum, max_abs) = output
            .clocks
            .iter()
            .zip(&output.recovered_clocks)
            .map(|(&clock, &recovered)| clock as f64 - recovered)
            .fold((0.0, 0.0_f64), |(sum, max), residual| {
                (sum + residual * residual, max.max(residual.abs()))
            });

        Self {
            clock_count,
            data_count: output.data_count(),
            mean_period,
            period_std_dev: period_variance.sqrt(),
            rms_clock_residual: (square_sum / n).sqrt(),
            max_abs_clock_residual: max_abs,
        }
    }
}

impl std::fmt::Display for LockSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} clocks, {} aligned events, period {:.3} ± {:.3}, clock residual rms {:.3} (max {:.3})",
            self.clock_count,
            self.data_count,
            self.mean_period,
            self.period_std_dev,
            self.rms_clock_residual,
            self.max_abs_clock_residual
        )
    }
}
