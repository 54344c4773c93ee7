// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Event-stream and result files
//!
//! Event streams are stored either as a serialized `{channels, timetags}`
//! document (JSON or MessagePack) or as plain text with one
//! `channel,timetag` (or whitespace separated) pair per line. Results are
//! written as JSON or MessagePack.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::events::EventStream;
use crate::core::output::ClockLockOutput;
use crate::core::{ClockLockError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFormat {
    Json,
    MessagePack,
    Text,
}

impl DataFormat {
    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        extension.parse().map_err(|_| {
            ClockLockError::Configuration(format!(
                "Cannot infer data format from {} (expected .json, .msgpack, .txt or .csv)",
                path.display()
            ))
        })
    }
}

impl std::str::FromStr for DataFormat {
    type Err = ClockLockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(DataFormat::Json),
            "msgpack" | "mpk" | "messagepack" => Ok(DataFormat::MessagePack),
            "txt" | "csv" | "tsv" | "text" => Ok(DataFormat::Text),
            other => Err(ClockLockError::Configuration(format!(
                "Unknown data format '{}'",
                other
            ))),
        }
    }
}

/// Read an event stream, choosing the format from the extension.
pub fn read_events(path: &Path) -> Result<EventStream> {
    read_events_as(path, DataFormat::from_path(path)?)
}

pub fn read_events_as(path: &Path, format: DataFormat) -> Result<EventStream> {
    let stream = match format {
        DataFormat::Json => {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str::<EventStream>(&content).map_err(|e| {
                ClockLockError::Encoding(format!("Failed to parse {}: {}", path.display(), e))
            })?
        }
        DataFormat::MessagePack => {
            let bytes = std::fs::read(path)?;
            rmp_serde::from_slice::<EventStream>(&bytes).map_err(|e| {
                ClockLockError::Encoding(format!("Failed to decode {}: {}", path.display(), e))
            })?
        }
        DataFormat::Text => parse_text_events(&std::fs::read_to_string(path)?)?,
    };

    stream.validate()?;
    tracing::info!("Read {} events from {}", stream.len(), path.display());
    Ok(stream)
}

/// Parse `channel,timetag` lines. Commas, semicolons and whitespace all
/// separate fields; blank lines and `#` comments are skipped.
pub fn parse_text_events(content: &str) -> Result<EventStream> {
    let mut stream = EventStream::default();

    for (number, line) in content.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .filter(|field| !field.is_empty());
        let (Some(channel), Some(timetag), None) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(ClockLockError::Encoding(format!(
                "line {}: expected 'channel,timetag', got '{}'",
                number + 1,
                line
            )));
        };

        let channel = channel.parse().map_err(|e| {
            ClockLockError::Encoding(format!("line {}: bad channel '{}': {}", number + 1, channel, e))
        })?;
        let timetag = timetag.parse().map_err(|e| {
            ClockLockError::Encoding(format!("line {}: bad timetag '{}': {}", number + 1, timetag, e))
        })?;
        stream.push(channel, timetag).map_err(|e| match e {
            ClockLockError::InvalidInput(msg) => {
                ClockLockError::InvalidInput(format!("line {}: {}", number + 1, msg))
            }
            other => other,
        })?;
    }

    Ok(stream)
}

/// Serialize a result set.
pub fn encode_output(output: &ClockLockOutput, format: DataFormat) -> Result<Vec<u8>> {
    match format {
        DataFormat::Json => serde_json::to_vec_pretty(output)
            .map_err(|e| ClockLockError::Encoding(format!("Failed to encode JSON: {}", e))),
        DataFormat::MessagePack => rmp_serde::to_vec_named(output)
            .map_err(|e| ClockLockError::Encoding(format!("Failed to encode MessagePack: {}", e))),
        DataFormat::Text => Err(ClockLockError::Configuration(
            "Results can only be written as JSON or MessagePack".to_string(),
        )),
    }
}

pub fn write_output(path: &Path, output: &ClockLockOutput, format: DataFormat) -> Result<()> {
    std::fs::write(path, encode_output(output, format)?)?;
    tracing::info!(
        "Wrote {} clocks and {} aligned events to {}",
        output.clock_count(),
        output.data_count(),
        path.display()
    );
    Ok(())
}
