// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod events;
pub mod io;
pub mod output;
pub mod pll;

pub use config::{AlignmentMode, PllConfig};
pub use diagnostics::LockSummary;
pub use engine::*;
pub use error::*;
pub use events::{ChannelId, EventStream, Timetag, validate_events};
pub use io::DataFormat;
pub use output::ClockLockOutput;
pub use pll::{Alignment, PeriodEstimate, PllState, estimate_period, lock_events};
