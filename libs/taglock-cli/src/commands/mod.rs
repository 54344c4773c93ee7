// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod config;
pub mod estimate;
pub mod lock;

use std::path::Path;

use anyhow::{Context, Result};
use taglock::{DataFormat, EventStream};

/// Read an event file, with an explicit format or one inferred from the path.
pub fn load_events(path: &Path, format: Option<DataFormat>) -> Result<EventStream> {
    let stream = match format {
        Some(format) => taglock::core::io::read_events_as(path, format),
        None => taglock::core::io::read_events(path),
    };
    stream.with_context(|| format!("Failed to load events from {}", path.display()))
}
