//! `squad-scout config`: show the resolved configuration.

use anyhow::Result;
use squad_scout::ScoutConfig;

pub fn run(config: &ScoutConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
