use clap::{Parser, Subcommand, builder::styling};
use eyre::Result;
use multistage_ingest::{
    PropertyCatalog,
    cli::{SourceKind, check_properties, describe_catalog, initialize_source, load_config},
    diagnostics,
};
use owo_colors::OwoColorize;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Multistage Ingest: validate extraction job configuration before any connection is opened
#[derive(Parser)]
#[command(name = "mstage", version, styles = STYLES)]
struct Cli {
    /// More verbose logging, including full extraction key snapshots
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a job configuration file and initialize a source from it
    Check {
        /// A key=value (or .yml) configuration file
        #[arg(default_value = "job.env")]
        config: String,

        /// Source type to initialize
        #[arg(short, long, value_enum, default_value_t = SourceKind::S3)]
        source: SourceKind,
    },

    /// List every known property with its type, default and bounds
    Describe,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    let catalog = PropertyCatalog::new();

    match cli.command {
        Commands::Check { config, source } => {
            log::info!(
                "Checking {} as a {} source",
                config.bright_black(),
                format!("{:?}", source).to_lowercase().cyan()
            );
            let config = load_config(&config)?;

            let report = check_properties(&catalog, &config);
            for key in &report.invalid {
                log::error!("Invalid value for {}, the default will be used", key.red());
            }

            let snapshot = initialize_source(source, &catalog, &config)?;
            for line in diagnostics::snapshot_lines(&snapshot, "cli") {
                println!("{}", line);
            }

            if report.is_clean() {
                log::info!("{}", "✓ Configuration is valid".green());
            } else {
                log::warn!(
                    "Configuration has {} invalid and {} unknown properties",
                    report.invalid.len(),
                    report.unknown.len()
                );
            }
        }
        Commands::Describe => {
            for line in describe_catalog(&catalog) {
                println!("{}", line);
            }
        }
    }

    Ok(())
}
