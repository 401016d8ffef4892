//! `squad-scout fetch <url> <id>`: acquire one player profile.

use crate::cli::output;
use anyhow::Result;
use squad_scout::{PlayerScout, ScoutConfig};

/// Run the fetch command. Finding nothing is not an error.
pub async fn run(config: &ScoutConfig, url: &str, id: u64) -> Result<()> {
    let scout = PlayerScout::new(config);
    let record = scout.fetch_player_data(url, id).await;
    output::print_record(&id.to_string(), record.as_ref());
    Ok(())
}
