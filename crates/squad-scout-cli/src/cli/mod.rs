//! CLI subcommand implementations for the squad-scout binary.

pub mod batch_cmd;
pub mod config_cmd;
pub mod extract_cmd;
pub mod fetch_cmd;
pub mod output;
pub mod parse_url_cmd;
