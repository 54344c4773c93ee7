// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

#![allow(dead_code)]

use taglock::{ChannelId, EventStream, PllConfig, Timetag};

pub const CLOCK: ChannelId = 9;
pub const DATA: ChannelId = -5;
pub const OTHER: ChannelId = 3;
pub const PERIOD: i64 = 100_000;
pub const PULSES_PER_CLOCK: u32 = 20;

/// Jittered, slowly drifting clock with laser-locked detector clicks,
/// uncorrelated background clicks and traffic on an unrelated channel.
pub fn synthetic_stream(clock_count: i64, seed: u64) -> EventStream {
    let mut rng = fastrand::Rng::with_seed(seed);
    let sub_period = PERIOD / i64::from(PULSES_PER_CLOCK);
    let mut events: Vec<(ChannelId, Timetag)> = Vec::new();

    for k in 0..clock_count {
        let clock = 1_000_000 + k * PERIOD + k * k / 20_000 + rng.i64(-20..=20);
        events.push((CLOCK, clock));

        for _ in 0..rng.u32(0..=3) {
            let pulse = rng.i64(1..i64::from(PULSES_PER_CLOCK));
            events.push((DATA, clock + pulse * sub_period + rng.i64(-300..=300)));
        }
        if rng.f64() < 0.3 {
            events.push((DATA, clock + rng.i64(1..PERIOD)));
        }
        if rng.f64() < 0.1 {
            events.push((OTHER, clock + rng.i64(1..PERIOD)));
        }
    }

    events.sort_by_key(|&(_, timetag)| timetag);
    let (channels, timetags) = events.into_iter().unzip();
    EventStream::new(channels, timetags).expect("synthetic stream is ordered")
}

pub fn config() -> PllConfig {
    PllConfig::new(CLOCK, DATA, PULSES_PER_CLOCK)
}

/// Data events that arrive after the first clock pulse once at least
/// `guard_period` clock pulses have been seen.
pub fn data_events_after_guard(stream: &EventStream, guard_period: u64) -> usize {
    let mut pulses = 0u64;
    let mut count = 0;
    for (channel, _) in stream.iter() {
        if channel == CLOCK {
            pulses += 1;
        } else if channel == DATA && pulses > 0 && pulses >= guard_period {
            count += 1;
        }
    }
    count
}

pub fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (index, (a, e)) in actual.iter().zip(expected).enumerate() {
        let tolerance = 1e-9 * e.abs().max(1.0);
        assert!(
            (a - e).abs() <= tolerance,
            "index {}: {} differs from {}",
            index,
            a,
            e
        );
    }
}
