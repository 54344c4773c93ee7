// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

mod batch;
mod incremental;

pub use batch::{LockRun, clock_lock, clock_lock_stream, run_batch};
pub use incremental::IncrementalClockLock;
