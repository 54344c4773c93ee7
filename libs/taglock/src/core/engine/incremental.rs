// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Chunked clock recovery for real-time pipelines
//!
//! A session owns the loop state between chunks. Until the bootstrap window
//! has filled, incoming events are held back so that the initial period
//! estimate sees the first `bootstrap_window` events of the whole stream,
//! exactly as the batch engine does. Once the estimate is made the held
//! events are replayed and every later chunk goes straight through the loop.
//!
//! Chunk calls take `&mut self`, so a session can only ever be driven by one
//! caller at a time.

use crate::core::config::PllConfig;
use crate::core::events::{ChannelId, EventStream, Timetag};
use crate::core::output::ClockLockOutput;
use crate::core::pll::{PeriodEstimate, PllState, estimate_period, lock_events};
use crate::core::{ClockLockError, Result};

pub struct IncrementalClockLock {
    config: PllConfig,
    state: PllState,
    estimate: Option<PeriodEstimate>,
    /// Events waiting for the bootstrap window to fill
    pending: EventStream,
    chunks_processed: u64,
}

impl IncrementalClockLock {
    pub fn new(config: PllConfig) -> Result<Self> {
        Self::resume(config, PllState::new())
    }

    /// Continue a session from a previously saved state.
    pub fn resume(config: PllConfig, state: PllState) -> Result<Self> {
        config.validate()?;
        tracing::debug!(
            "Clock-lock session on clock channel {} / data channel {} (resumed: {})",
            config.clock_channel,
            config.data_channel,
            state.is_initialized()
        );
        Ok(Self {
            config,
            state,
            estimate: None,
            pending: EventStream::default(),
            chunks_processed: 0,
        })
    }

    pub fn config(&self) -> &PllConfig {
        &self.config
    }

    /// Current loop state; save it to resume the session later.
    pub fn state(&self) -> &PllState {
        &self.state
    }

    /// Bootstrap estimate made by this session, if any.
    pub fn estimate(&self) -> Option<&PeriodEstimate> {
        self.estimate.as_ref()
    }

    /// Events held back while the bootstrap window fills.
    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    pub fn chunks_processed(&self) -> u64 {
        self.chunks_processed
    }

    /// Process the next chunk of the stream and return the records it
    /// produced. On error the session is left as it was before the call.
    pub fn process_chunk(
        &mut self,
        channels: &[ChannelId],
        timetags: &[Timetag],
    ) -> Result<ClockLockOutput> {
        let output = if self.state.is_initialized() {
            let (state, output) = lock_events(&self.state, &self.config, channels, timetags)?;
            self.state = state;
            output
        } else {
            let held = self.pending.len();
            self.pending.extend_from_slices(channels, timetags)?;
            if self.pending.len() < self.config.bootstrap_window {
                tracing::trace!(
                    "Holding {} events until the bootstrap window ({}) fills",
                    self.pending.len(),
                    self.config.bootstrap_window
                );
                ClockLockOutput::new()
            } else {
                match self.flush_pending() {
                    Ok(output) => output,
                    Err(e) => {
                        self.pending.truncate(held);
                        return Err(e);
                    }
                }
            }
        };

        self.chunks_processed += 1;
        Ok(output)
    }

    /// Signal end of stream. Streams shorter than the bootstrap window are
    /// estimated and processed here; otherwise this returns no records.
    pub fn finish(&mut self) -> Result<ClockLockOutput> {
        if self.state.is_initialized() {
            return Ok(ClockLockOutput::new());
        }
        self.flush_pending()
    }

    /// Feed a complete in-memory stream through the session in
    /// `chunk_size`-event slices and concatenate the records.
    pub fn process_in_chunks(
        &mut self,
        channels: &[ChannelId],
        timetags: &[Timetag],
        chunk_size: usize,
    ) -> Result<ClockLockOutput> {
        if chunk_size == 0 {
            return Err(ClockLockError::Configuration(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if channels.len() != timetags.len() {
            return Err(ClockLockError::InvalidInput(format!(
                "channel and timetag sequences differ in length ({} vs {})",
                channels.len(),
                timetags.len()
            )));
        }

        let mut output = ClockLockOutput::new();
        for (chunk_channels, chunk_timetags) in
            channels.chunks(chunk_size).zip(timetags.chunks(chunk_size))
        {
            output.append(self.process_chunk(chunk_channels, chunk_timetags)?);
        }
        output.append(self.finish()?);
        Ok(output)
    }

    fn flush_pending(&mut self) -> Result<ClockLockOutput> {
        let estimate = estimate_period(
            &self.pending.channels,
            &self.pending.timetags,
            self.config.clock_channel,
            self.config.bootstrap_window,
        )?;
        let (state, output) = lock_events(
            &PllState::seeded(&estimate),
            &self.config,
            &self.pending.channels,
            &self.pending.timetags,
        )?;

        tracing::debug!(
            "Bootstrap complete after {} held events: period {:.3}",
            self.pending.len(),
            estimate.period
        );

        self.state = state;
        self.estimate = Some(estimate);
        self.pending = EventStream::default();
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock_only(count: i64, period: i64) -> (Vec<ChannelId>, Vec<Timetag>) {
        ((0..count).map(|_| 1).collect(), (0..count).map(|i| i * period).collect())
    }

    #[test]
    fn test_holds_events_until_window_fills() {
        let config = PllConfig::new(1, 2, 1)
            .with_gains(0.0, 0.0)
            .with_bootstrap_window(4);
        let mut session = IncrementalClockLock::new(config).unwrap();
        let (channels, timetags) = clock_only(6, 100);

        let first = session.process_chunk(&channels[..3], &timetags[..3]).unwrap();
        assert!(first.is_empty());
        assert_eq!(session.pending_events(), 3);
        assert!(!session.state().is_initialized());

        let second = session.process_chunk(&channels[3..], &timetags[3..]).unwrap();
        assert_eq!(second.clocks, timetags);
        assert_eq!(session.pending_events(), 0);
        assert_eq!(session.estimate().map(|e| e.period), Some(100.0));
        assert_eq!(session.chunks_processed(), 2);
    }

    #[test]
    fn test_finish_flushes_short_stream() {
        let config = PllConfig::new(1, 2, 1).with_gains(0.0, 0.0);
        let mut session = IncrementalClockLock::new(config).unwrap();
        let (channels, timetags) = clock_only(5, 100);

        assert!(session.process_chunk(&channels, &timetags).unwrap().is_empty());
        let output = session.finish().unwrap();
        assert_eq!(output.clock_count(), 5);
        assert!(session.finish().unwrap().is_empty());
    }

    #[test]
    fn test_finish_without_clock_data_fails() {
        let mut session = IncrementalClockLock::new(PllConfig::new(1, 2, 1)).unwrap();
        session.process_chunk(&[2, 2], &[0, 10]).unwrap();
        let err = session.finish().unwrap_err();
        assert!(matches!(err, ClockLockError::InsufficientClockData { .. }));
    }

    #[test]
    fn test_failed_bootstrap_keeps_pending_events() {
        let config = PllConfig::new(1, 2, 1).with_bootstrap_window(3);
        let mut session = IncrementalClockLock::new(config).unwrap();

        session.process_chunk(&[2], &[0]).unwrap();
        let err = session.process_chunk(&[2, 1], &[5, 6]).unwrap_err();
        assert!(matches!(err, ClockLockError::InsufficientClockData { .. }));
        assert_eq!(session.pending_events(), 1);
    }

    #[test]
    fn test_rejects_chunk_that_goes_back_in_time() {
        let config = PllConfig::new(1, 2, 1).with_bootstrap_window(2);
        let mut session = IncrementalClockLock::new(config).unwrap();
        session.process_chunk(&[1, 1], &[0, 100]).unwrap();

        let before = *session.state();
        let err = session.process_chunk(&[1], &[50]).unwrap_err();
        assert!(matches!(err, ClockLockError::InvalidInput(_)));
        assert_eq!(*session.state(), before);
    }

    #[test]
    fn test_resume_continues_from_saved_state() {
        let config = PllConfig::new(1, 2, 1)
            .with_gains(0.0, 0.0)
            .with_bootstrap_window(2);
        let (channels, timetags) = clock_only(6, 100);

        let mut session = IncrementalClockLock::new(config.clone()).unwrap();
        let mut output = session.process_chunk(&channels[..3], &timetags[..3]).unwrap();
        let saved = serde_json::to_string(session.state()).unwrap();
        drop(session);

        let state: PllState = serde_json::from_str(&saved).unwrap();
        let mut resumed = IncrementalClockLock::resume(config, state).unwrap();
        output.append(resumed.process_chunk(&channels[3..], &timetags[3..]).unwrap());

        let expected: Vec<f64> = timetags.iter().map(|&t| t as f64).collect();
        assert_eq!(output.recovered_clocks, expected);
    }

    #[test]
    fn test_process_in_chunks_rejects_zero_chunk_size() {
        let mut session = IncrementalClockLock::new(PllConfig::new(1, 2, 1)).unwrap();
        assert!(matches!(
            session.process_in_chunks(&[1], &[0], 0),
            Err(ClockLockError::Configuration(_))
        ));
    }
}
