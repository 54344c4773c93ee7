// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Clock recovery for time-tagged photon-counting data
//!
//! A software phase-locked loop rebuilds a stable virtual clock from noisy
//! clock-channel timetags, then places every data-channel event on the
//! nearest expected pulse of that clock. The same loop runs over a whole
//! stream ([`clock_lock`]) or chunk by chunk inside a real-time pipeline
//! ([`IncrementalClockLock`]), with identical results.
//!
//! ```no_run
//! use taglock::{PllConfig, clock_lock};
//!
//! # fn main() -> taglock::Result<()> {
//! let stream = taglock::core::io::read_events("run.json".as_ref())?;
//! let config = PllConfig::new(9, -5, 500).with_guard_period(100);
//! let output = clock_lock(&stream.channels, &stream.timetags, &config)?;
//! println!("{} events aligned", output.data_count());
//! # Ok(())
//! # }
//! ```

pub mod core;

pub use crate::core::{
    AlignmentMode, ChannelId, ClockLockError, ClockLockOutput, DataFormat, EventStream,
    IncrementalClockLock, LockRun, LockSummary, PeriodEstimate, PllConfig, PllState, Result,
    Timetag, clock_lock, clock_lock_stream, run_batch,
};
