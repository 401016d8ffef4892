//! `squad-scout parse-url <url>`: run only the network-free URL fallback.

use crate::cli::output;
use anyhow::Result;
use squad_scout::strategy::UrlStructuralStrategy;

pub fn run(url: &str) -> Result<()> {
    let record = UrlStructuralStrategy::record_for(url);
    output::print_record(url, record.as_ref());
    Ok(())
}
