// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::path::Path;

use anyhow::Result;
use taglock::{ChannelId, DataFormat};

/// Print the bootstrap period estimate for the start of a stream.
pub fn run(
    events: &Path,
    clock_channel: ChannelId,
    window: usize,
    input_format: Option<DataFormat>,
) -> Result<()> {
    let stream = super::load_events(events, input_format)?;
    let estimate =
        taglock::core::estimate_period(&stream.channels, &stream.timetags, clock_channel, window)?;

    println!("Clock channel {}", clock_channel);
    println!("  clock tags:  {}", estimate.clock_count);
    println!(
        "  span:        {} .. {}",
        estimate.first_clock, estimate.last_clock
    );
    println!("  period:      {:.6}", estimate.period);
    println!("  frequency:   {:.6e}", estimate.frequency);

    Ok(())
}
