//! Output helpers shared by the subcommands.

use squad_scout::{CacheStats, PlayerRecord, RateWindowStatus};
use std::sync::atomic::{AtomicBool, Ordering};

static JSON: AtomicBool = AtomicBool::new(false);

pub fn set_json(enabled: bool) {
    JSON.store(enabled, Ordering::Relaxed);
}

pub fn is_json() -> bool {
    JSON.load(Ordering::Relaxed)
}

/// Print a JSON value on one line.
pub fn print_json(value: &serde_json::Value) {
    println!("{value}");
}

/// Print a record, or a "no data" marker when acquisition came up empty.
pub fn print_record(label: &str, record: Option<&PlayerRecord>) {
    if is_json() {
        print_json(&serde_json::json!({
            "input": label,
            "record": record,
        }));
        return;
    }

    let Some(r) = record else {
        println!("  {label}: no data");
        return;
    };

    println!("  {label}:");
    println!("    id:          {}", r.source_id);
    println!("    name:        {}", r.name.as_deref().unwrap_or("-"));
    println!("    overall:     {}", opt(r.overall_rating));
    println!("    potential:   {}", opt(r.potential_rating));
    println!(
        "    positions:   {}",
        r.positions
            .as_ref()
            .map(|p| p.join(", "))
            .unwrap_or_else(|| "-".to_string())
    );
    println!("    age:         {}", opt(r.age));
    println!("    club:        {}", r.club.as_deref().unwrap_or("-"));
    println!("    nationality: {}", r.nationality.as_deref().unwrap_or("-"));
    println!("    version:     {}", opt(r.version_id));
    println!("    origin:      {:?}", r.origin);
    println!("    observed:    {}", r.observed_at.to_rfc3339());
}

/// Print cache and rate limiter state.
pub fn print_status(cache: &CacheStats, limiter: &RateWindowStatus) {
    if is_json() {
        print_json(&serde_json::json!({
            "cache": cache,
            "rate_limiter": limiter,
        }));
        return;
    }

    let keys: Vec<String> = cache.keys.iter().map(|k| k.to_string()).collect();
    println!("  cache:        {} entries [{}]", cache.size, keys.join(", "));
    println!(
        "  rate limiter: {}/{} until {}",
        limiter.request_count,
        limiter.max_requests,
        limiter.window_reset_at.to_rfc3339()
    );
}

fn opt<T: std::fmt::Display>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
