// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use taglock::{
    AlignmentMode, ChannelId, ClockLockOutput, DataFormat, EventStream, IncrementalClockLock,
    LockSummary, PllConfig, clock_lock_stream,
};

#[derive(Args)]
pub struct LockArgs {
    /// Event file (.json, .msgpack, .txt or .csv)
    #[arg(value_name = "EVENTS")]
    events: PathBuf,

    /// Config file (.yaml, .toml or .json); flags below override it
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Event file format (inferred from the extension if omitted)
    #[arg(long = "input-format")]
    input_format: Option<DataFormat>,

    /// Channel carrying the clock
    #[arg(long)]
    clock_channel: Option<ChannelId>,

    /// Channel carrying the data events
    #[arg(long)]
    data_channel: Option<ChannelId>,

    /// Expected data pulses per clock period
    #[arg(long)]
    pulses_per_clock: Option<u32>,

    /// Phase offset added before alignment, in timetag units
    #[arg(long, allow_hyphen_values = true)]
    phase_offset: Option<f64>,

    /// Acceptance window around each expected pulse, in cycles
    #[arg(long)]
    window: Option<f64>,

    /// Derivative gain of the loop filter
    #[arg(long)]
    deriv_gain: Option<f64>,

    /// Proportional gain applied to the frequency
    #[arg(long)]
    prop_gain: Option<f64>,

    /// Clock pulses to let the loop settle before reporting
    #[arg(long)]
    guard_period: Option<u64>,

    /// Leading events used for the initial period estimate
    #[arg(long)]
    bootstrap_window: Option<usize>,

    /// Alignment mode (windowed or unconditional)
    #[arg(long)]
    alignment: Option<AlignmentMode>,

    /// Subdivisions of the recovered clock for relative clocks
    #[arg(long)]
    clock_mult: Option<u32>,

    /// Process the stream in chunks of this many events
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Where to write the aligned records
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Output format (json or msgpack; inferred from --output if omitted)
    #[arg(long)]
    format: Option<DataFormat>,
}

impl LockArgs {
    /// Build the effective config: the file (if any) with flags on top.
    fn resolve_config(&self) -> Result<PllConfig> {
        let mut config = match &self.config {
            Some(path) => PllConfig::load(path)?,
            None => match (self.clock_channel, self.data_channel, self.pulses_per_clock) {
                (Some(clock), Some(data), Some(ppc)) => PllConfig::new(clock, data, ppc),
                _ => bail!(
                    "--clock-channel, --data-channel and --pulses-per-clock are required without --config"
                ),
            },
        };

        if let Some(value) = self.clock_channel {
            config.clock_channel = value;
        }
        if let Some(value) = self.data_channel {
            config.data_channel = value;
        }
        if let Some(value) = self.pulses_per_clock {
            config.pulses_per_clock = value;
        }
        if let Some(value) = self.phase_offset {
            config.phase_offset = value;
        }
        if let Some(value) = self.window {
            config.window = value;
        }
        if let Some(value) = self.deriv_gain {
            config.deriv_gain = value;
        }
        if let Some(value) = self.prop_gain {
            config.prop_gain = value;
        }
        if let Some(value) = self.guard_period {
            config.guard_period = value;
        }
        if let Some(value) = self.bootstrap_window {
            config.bootstrap_window = value;
        }
        if let Some(value) = self.alignment {
            config.alignment = value;
        }
        if self.clock_mult.is_some() {
            config.clock_mult = self.clock_mult;
        }
        if self.chunk_size.is_some() {
            config.chunk_size = self.chunk_size;
        }

        config.validate()?;
        Ok(config)
    }
}

pub fn run(args: LockArgs) -> Result<()> {
    let config = args.resolve_config()?;
    let stream = super::load_events(&args.events, args.input_format)?;

    tracing::info!(
        "Locking {} events ({} clock tags on channel {})",
        stream.len(),
        stream.count(config.clock_channel),
        config.clock_channel
    );

    let output = lock(&stream, &config)?;
    let summary = LockSummary::from_output(&output);
    println!("{}", summary);

    if let Some(path) = &args.output {
        let format = match args.format {
            Some(format) => format,
            None => DataFormat::from_path(path)?,
        };
        taglock::core::io::write_output(path, &output, format)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Wrote {} records to {}", output.data_count(), path.display());
    }

    Ok(())
}

fn lock(stream: &EventStream, config: &PllConfig) -> Result<ClockLockOutput> {
    let output = match config.chunk_size {
        Some(chunk_size) => {
            let mut session = IncrementalClockLock::new(config.clone())?;
            let output =
                session.process_in_chunks(&stream.channels, &stream.timetags, chunk_size)?;
            tracing::debug!(
                "Processed {} chunks of up to {} events",
                session.chunks_processed(),
                chunk_size
            );
            output
        }
        None => clock_lock_stream(stream, config)?,
    };
    Ok(output)
}
