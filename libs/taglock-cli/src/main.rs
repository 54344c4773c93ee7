// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! taglock CLI
//!
//! Recover a clock from a recorded timetag stream and align its data events.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use taglock::DataFormat;

mod commands;

#[derive(Parser)]
#[command(name = "taglock")]
#[command(author, version, about = "Timetag clock recovery", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lock onto the clock channel and align data events
    Lock(commands::lock::LockArgs),

    /// Estimate the clock period from the start of a stream
    Estimate {
        /// Event file (.json, .msgpack, .txt or .csv)
        #[arg(value_name = "EVENTS")]
        events: PathBuf,

        /// Channel carrying the clock
        #[arg(long)]
        clock_channel: i32,

        /// Number of leading events to examine
        #[arg(long, default_value_t = taglock::core::config::DEFAULT_BOOTSTRAP_WINDOW)]
        window: usize,

        /// Event file format (inferred from the extension if omitted)
        #[arg(long = "input-format")]
        input_format: Option<DataFormat>,
    },

    /// Validate a config file and print it with every default filled in
    Config {
        /// Config file (.yaml, .toml or .json)
        #[arg(value_name = "CONFIG")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Lock(args) => commands::lock::run(args),
        Commands::Estimate {
            events,
            clock_channel,
            window,
            input_format,
        } => commands::estimate::run(&events, clock_channel, window, input_format),
        Commands::Config { path } => commands::config::show(&path),
    }
}
