//! `squad-scout batch <file>`: run many fetches through one client.
//!
//! Each non-blank, non-`#` line is `<id> <url>`. Lines run sequentially
//! against a single scout, so repeated ids hit the cache and the rate
//! limiter applies across the whole file.

use crate::cli::output;
use anyhow::{bail, Context, Result};
use squad_scout::{PlayerScout, ScoutConfig};

/// One parsed batch line.
#[derive(Debug, PartialEq, Eq)]
pub struct BatchEntry {
    pub id: u64,
    pub url: String,
}

/// Parse a batch line. `Ok(None)` for blank and comment lines.
pub fn parse_line(line: &str) -> Result<Option<BatchEntry>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let (Some(id), Some(url), None) = (parts.next(), parts.next(), parts.next()) else {
        bail!("expected '<id> <url>', got '{line}'");
    };
    let id = id
        .parse::<u64>()
        .with_context(|| format!("invalid player id '{id}'"))?;

    Ok(Some(BatchEntry {
        id,
        url: url.to_string(),
    }))
}

pub fn parse_batch(text: &str) -> Result<Vec<BatchEntry>> {
    let mut entries = Vec::new();
    for (n, line) in text.lines().enumerate() {
        if let Some(entry) = parse_line(line).with_context(|| format!("line {}", n + 1))? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Run the batch command.
pub async fn run(config: &ScoutConfig, path: &str) -> Result<()> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    let entries = parse_batch(&text)?;
    tracing::info!("running {} batch entries from {path}", entries.len());

    let scout = PlayerScout::new(config);
    for entry in &entries {
        let record = scout.fetch_player_data(&entry.url, entry.id).await;
        output::print_record(&entry.id.to_string(), record.as_ref());
    }

    output::print_status(&scout.cache_stats(), &scout.rate_limiter_status());
    Ok(())
}
