//! `squad-scout extract <file>`: run the field extractor on saved markup.

use crate::cli::output;
use anyhow::{Context, Result};
use chrono::Utc;
use squad_scout::{HtmlExtractor, PlayerRecord};

pub fn run(path: &str, id: u64) -> Result<()> {
    let markup =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;

    let record = HtmlExtractor::new()
        .extract(&markup)
        .map(|fields| PlayerRecord::from_fields(id, fields, None, Utc::now()));
    output::print_record(path, record.as_ref());
    Ok(())
}
