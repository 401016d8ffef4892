//! Squad Scout CLI entry point.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use squad_scout::ScoutConfig;

mod cli;

#[derive(Parser)]
#[command(
    name = "squad-scout",
    about = "Squad Scout: best-effort player profile acquisition",
    version,
    after_help = "Run 'squad-scout <command> --help' for details on each command."
)]
struct Cli {
    /// Path to a JSON config file (also read from SQUAD_SCOUT_CONFIG).
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output results as JSON (machine-readable).
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one player profile.
    Fetch {
        /// Profile URL on the source site.
        url: String,
        /// External player id.
        id: u64,
    },
    /// Fetch every "<id> <url>" line of a file through one client.
    Batch {
        /// Path to the batch file.
        file: String,
    },
    /// Derive a record from the URL alone, without any request.
    ParseUrl {
        /// Profile URL on the source site.
        url: String,
    },
    /// Run the field extractor on a saved HTML page.
    Extract {
        /// Path to the HTML file.
        file: String,
        /// Player id to attach to the result.
        #[arg(long, default_value = "0")]
        id: u64,
    },
    /// Print the resolved configuration.
    Config,
    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

fn load_config(path: Option<&str>) -> anyhow::Result<ScoutConfig> {
    Ok(ScoutConfig::load(path)?)
}

async fn run(command: Commands, config_path: Option<&str>) -> anyhow::Result<()> {
    match command {
        Commands::Fetch { url, id } => {
            cli::fetch_cmd::run(&load_config(config_path)?, &url, id).await
        }
        Commands::Batch { file } => cli::batch_cmd::run(&load_config(config_path)?, &file).await,
        Commands::ParseUrl { url } => cli::parse_url_cmd::run(&url),
        Commands::Extract { file, id } => cli::extract_cmd::run(&file, id),
        Commands::Config => cli::config_cmd::run(&load_config(config_path)?),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "squad-scout", &mut std::io::stdout());
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    cli::output::set_json(cli.json);

    let result = run(cli.command, cli.config.as_deref()).await;

    if let Err(e) = &result {
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        } else {
            eprintln!("  Error: {e:#}");
        }
        std::process::exit(1);
    }

    result
}
