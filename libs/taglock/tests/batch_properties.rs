// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Behavioral properties of whole-stream clock recovery.

mod common;

use common::{CLOCK, DATA, PERIOD, PULSES_PER_CLOCK, config, synthetic_stream};
use taglock::{
    AlignmentMode, ClockLockError, LockSummary, PllConfig, Timetag, clock_lock, clock_lock_stream,
    run_batch,
};

#[test]
fn test_exact_clock_with_disabled_filter() {
    let channels = vec![1; 20];
    let timetags: Vec<Timetag> = (0..20).map(|i| i * 1000).collect();
    let config = PllConfig::new(1, 2, 1).with_gains(0.0, 0.0);

    let output = clock_lock(&channels, &timetags, &config).unwrap();

    let expected: Vec<f64> = (0..20).map(|i| (i * 1000) as f64).collect();
    assert_eq!(output.recovered_clocks, expected);
    assert_eq!(output.periods, vec![1000.0; 20]);
}

#[test]
fn test_recovered_clocks_are_monotonic() {
    let stream = synthetic_stream(3000, 7);
    let output = clock_lock_stream(&stream, &config()).unwrap();

    assert!(
        output
            .recovered_clocks
            .windows(2)
            .all(|pair| pair[0] <= pair[1])
    );
    assert!(output.periods.iter().all(|&p| p > 0.0));
}

#[test]
fn test_loop_tracks_drifting_clock() {
    let stream = synthetic_stream(3000, 11);
    let output = clock_lock_stream(&stream, &config().with_guard_period(200)).unwrap();
    let summary = LockSummary::from_output(&output);

    // Pulses carry +-20 of jitter; a locked loop stays well inside a
    // sub-period of them.
    assert!(summary.max_abs_clock_residual < 500.0, "{}", summary);
    let final_period = *output.periods.last().unwrap();
    assert!((final_period - PERIOD as f64).abs() < 5.0);
}

#[test]
fn test_guard_period_excludes_first_pulses() {
    let stream = synthetic_stream(500, 3);
    let total = stream.count(CLOCK);

    for guard in [0u64, 1, 37, 250] {
        let output = clock_lock_stream(&stream, &config().with_guard_period(guard)).unwrap();
        assert_eq!(output.clock_count(), total - guard as usize);

        let clock_tags: Vec<Timetag> = stream
            .iter()
            .filter(|&(channel, _)| channel == CLOCK)
            .map(|(_, tag)| tag)
            .skip(guard as usize)
            .collect();
        assert_eq!(output.clocks, clock_tags);
    }
}

#[test]
fn test_data_aligned_once_guard_pulses_consumed() {
    let channels = [1, 1, 2, 1, 1];
    let timetags: [Timetag; 5] = [0, 1000, 1500, 2000, 3000];
    let config = PllConfig::new(1, 2, 2)
        .with_gains(0.0, 0.0)
        .with_guard_period(2)
        .with_alignment(AlignmentMode::Unconditional);

    let output = clock_lock(&channels, &timetags, &config).unwrap();
    assert_eq!(output.clocks, vec![2000, 3000]);
    assert_eq!(output.data_tags, vec![1500]);
    assert_eq!(output.nearest_pulse_times, vec![1500.0]);
    assert_eq!(output.reference_clocks, vec![1000.0]);
}

#[test]
fn test_guard_period_longer_than_stream_reports_nothing() {
    let stream = synthetic_stream(50, 3);
    let output = clock_lock_stream(&stream, &config().with_guard_period(51)).unwrap();
    assert!(output.is_empty());
}

#[test]
fn test_windowed_events_lie_inside_window() {
    let stream = synthetic_stream(2000, 5);
    for window in [0.5, 0.2, 0.05] {
        let output = clock_lock_stream(&stream, &config().with_window(window)).unwrap();
        assert!(output.data_count() > 0);
        for &cycles in &output.cycles {
            assert!((cycles - cycles.round_ties_even()).abs() <= window);
        }
    }
}

#[test]
fn test_narrow_window_discards_background() {
    let stream = synthetic_stream(2000, 5);
    let wide = clock_lock_stream(&stream, &config()).unwrap();
    let narrow = clock_lock_stream(&stream, &config().with_window(0.1)).unwrap();
    assert!(narrow.data_count() < wide.data_count());
}

#[test]
fn test_unconditional_accepts_every_event_after_guard() {
    let stream = synthetic_stream(2000, 9);
    for guard in [0u64, 100] {
        let config = config()
            .with_window(0.0)
            .with_guard_period(guard)
            .with_alignment(AlignmentMode::Unconditional);
        let output = clock_lock_stream(&stream, &config).unwrap();
        assert_eq!(
            output.data_count(),
            common::data_events_after_guard(&stream, guard)
        );
    }
}

#[test]
fn test_nearest_pulse_time_reconstructs_from_cycles() {
    let stream = synthetic_stream(1000, 13);
    let config = config().with_guard_period(10).with_phase_offset(1234.0);
    let output = clock_lock_stream(&stream, &config).unwrap();
    assert!(output.data_count() > 0);

    for i in 0..output.data_count() {
        let reference = output.reference_clocks[i];
        // The last guard-period edge is used for alignment but not reported.
        let Some(pulse) = output
            .recovered_clocks
            .iter()
            .position(|&clock| clock == reference)
        else {
            continue;
        };
        let bin_time = output.periods[pulse] / f64::from(PULSES_PER_CLOCK);

        let rebuilt = output.cycles[i].round_ties_even() * bin_time + reference;
        assert_eq!(output.nearest_pulse_times[i], rebuilt);
    }
}

#[test]
fn test_relative_clocks_precede_their_events() {
    let stream = synthetic_stream(500, 17);
    let output = clock_lock_stream(&stream, &config()).unwrap();
    for (&tag, &relative) in output.data_tags.iter().zip(&output.relative_clocks) {
        let sub_period = PERIOD as f64 / f64::from(PULSES_PER_CLOCK);
        assert!(relative <= tag as f64 + 1e-3);
        assert!(tag as f64 - relative < sub_period + 1.0);
    }
}

#[test]
fn test_stream_without_data_events() {
    let stream = synthetic_stream(300, 21);
    let clock_only: Vec<_> = stream.iter().filter(|&(c, _)| c == CLOCK).collect();
    let (channels, timetags): (Vec<_>, Vec<_>) = clock_only.into_iter().unzip();

    let output = clock_lock(&channels, &timetags, &config()).unwrap();
    assert!(output.data_tags.is_empty());
    assert!(output.nearest_pulse_times.is_empty());
    assert_eq!(output.clock_count(), 300);
}

#[test]
fn test_run_batch_reports_estimate() {
    let stream = synthetic_stream(300, 23);
    let run = run_batch(&stream.channels, &stream.timetags, &config()).unwrap();
    assert!((run.estimate.period - PERIOD as f64).abs() < 50.0);
    assert_eq!(run.state.pulses_seen(), 300);
    assert_eq!(run.state.last_timetag(), stream.timetags.last().copied());
}

#[test]
fn test_unstable_gains_fail_with_divergence() {
    let stream = synthetic_stream(200, 29);
    let config = config().with_gains(1800.0, 1.0);
    let err = clock_lock_stream(&stream, &config).unwrap_err();
    assert!(matches!(err, ClockLockError::LoopDivergence { .. }));
}

#[test]
fn test_data_channel_only_stream_is_insufficient() {
    let timetags: Vec<Timetag> = (0..10).collect();
    let err = clock_lock(&[DATA; 10], &timetags, &config()).unwrap_err();
    assert!(matches!(
        err,
        ClockLockError::InsufficientClockData { found: 0, .. }
    ));
}
