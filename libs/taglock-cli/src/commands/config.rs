// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::path::Path;

use anyhow::Result;
use taglock::PllConfig;

/// Load a config file and print the resolved configuration as JSON.
pub fn show(path: &Path) -> Result<()> {
    let config = PllConfig::load(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
