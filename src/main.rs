use anyhow::{Context, Result};
use clap::Parser;
use dynhook::config::ProbeConfig;
use dynhook::probe;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// dynhook - open a native library and resolve its exports
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Library path or loader-resolvable name (overrides the config file)
    library: Option<String>,

    /// Symbols that must resolve
    symbols: Vec<String>,

    /// Symbols that may be missing
    #[arg(short, long)]
    optional: Vec<String>,

    /// Path to probe manifest
    #[arg(short, long)]
    config: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

/// Logging filter: `RUST_LOG` directives when set and valid, else `--debug` picks the level
fn log_filter(directives: Option<String>, debug: bool) -> EnvFilter {
    if let Some(filter) = directives.and_then(|d| EnvFilter::try_new(d).ok()) {
        return filter;
    }

    let log_level = if debug { "debug" } else { "info" };
    EnvFilter::new(log_level)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok(), args.debug))
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global default subscriber")?;

    let config = if let Some(library) = args.library {
        ProbeConfig {
            library,
            required: args.symbols,
            optional: args.optional,
        }
    } else {
        let mut config = if let Some(config_path) = args.config {
            ProbeConfig::load_from_file(&config_path)?
        } else {
            ProbeConfig::load_default()?
        };
        config.optional.extend(args.optional);
        config
    };

    let report = probe::probe(&config)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{json}");
    } else {
        print!("{report}");
    }

    Ok(())
}
