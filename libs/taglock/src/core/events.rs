// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Timetag event streams
//!
//! A stream is two parallel sequences: the channel each event arrived on and
//! its integer timetag. Timetags must be non-decreasing; the engines never
//! reorder or repair input.

use serde::{Deserialize, Serialize};

use crate::core::{ClockLockError, Result};

/// Hardware input channel. Signed because time taggers report falling-edge
/// inputs as negative channel numbers.
pub type ChannelId = i32;

/// Integer detector timestamp, in the time tagger's native unit (usually ps).
pub type Timetag = i64;

/// Check that `channels` and `timetags` describe a well-formed stream.
///
/// `previous` is the last timetag consumed before this slice, so ordering is
/// enforced across chunk boundaries. Returns the last timetag of the slice
/// (or `previous` if the slice is empty).
pub fn validate_events(
    channels: &[ChannelId],
    timetags: &[Timetag],
    previous: Option<Timetag>,
) -> Result<Option<Timetag>> {
    if channels.len() != timetags.len() {
        return Err(ClockLockError::InvalidInput(format!(
            "channel and timetag sequences differ in length ({} vs {})",
            channels.len(),
            timetags.len()
        )));
    }

    let mut last = previous;
    for (index, &tag) in timetags.iter().enumerate() {
        if let Some(prev) = last.filter(|&prev| tag < prev) {
            return Err(ClockLockError::InvalidInput(format!(
                "timetag {} at index {} precedes previous timetag {}",
                tag, index, prev
            )));
        }
        last = Some(tag);
    }

    Ok(last)
}

/// An owned, validated event stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStream {
    pub channels: Vec<ChannelId>,
    pub timetags: Vec<Timetag>,
}

impl EventStream {
    pub fn new(channels: Vec<ChannelId>, timetags: Vec<Timetag>) -> Result<Self> {
        validate_events(&channels, &timetags, None)?;
        Ok(Self { channels, timetags })
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Vec::with_capacity(capacity),
            timetags: Vec::with_capacity(capacity),
        }
    }

    /// Append one event, rejecting it if it would break ordering.
    pub fn push(&mut self, channel: ChannelId, timetag: Timetag) -> Result<()> {
        if let Some(&last) = self.timetags.last().filter(|&&last| timetag < last) {
            return Err(ClockLockError::InvalidInput(format!(
                "timetag {} precedes previous timetag {}",
                timetag, last
            )));
        }
        self.channels.push(channel);
        self.timetags.push(timetag);
        Ok(())
    }

    /// Append a slice of events after validating it against this stream's
    /// last timetag. Nothing is appended on error.
    pub fn extend_from_slices(&mut self, channels: &[ChannelId], timetags: &[Timetag]) -> Result<()> {
        validate_events(channels, timetags, self.timetags.last().copied())?;
        self.channels.extend_from_slice(channels);
        self.timetags.extend_from_slice(timetags);
        Ok(())
    }

    pub fn truncate(&mut self, len: usize) {
        self.channels.truncate(len);
        self.timetags.truncate(len);
    }

    /// Re-check the invariants, e.g. after deserializing.
    pub fn validate(&self) -> Result<()> {
        validate_events(&self.channels, &self.timetags, None).map(|_| ())
    }

    pub fn len(&self) -> usize {
        self.timetags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timetags.is_empty()
    }

    /// Number of events on `channel`.
    pub fn count(&self, channel: ChannelId) -> usize {
        self.channels.iter().filter(|&&c| c == channel).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChannelId, Timetag)> + '_ {
        self.channels.iter().copied().zip(self.timetags.iter().copied())
    }
}
