//! Lusocite: citation and affiliation analysis for a DBLP conference.
//! Entry point for the `lusocite` binary.

mod commands;
mod config;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Who cites a conference, and from where in the Portuguese-speaking world.
#[derive(Parser, Debug)]
#[command(name = "lusocite", version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Never prompt; unknown affiliations stay unknown
    #[arg(long, global = true)]
    unattended: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Download (or reuse) the DBLP snapshot of a conference
    Download {
        /// DBLP stream alias, e.g. `sbsi`
        alias: String,
        /// Re-download even when a snapshot exists
        #[arg(long)]
        force: bool,
    },
    /// Fetch DBLP affiliations for every author of a conference
    Authors { alias: String },
    /// Discover citing works and fetch their metadata
    Citations {
        alias: String,
        #[arg(long)]
        year: Option<String>,
        /// Query indexes again for publications already in the cache
        #[arg(long)]
        refresh: bool,
    },
    /// Classify the authors of citing works
    Classify {
        /// Only works citing this conference (all records otherwise)
        #[arg(long)]
        alias: Option<String>,
        #[arg(long)]
        year: Option<String>,
    },
    /// Yearly statistics and the citation-type tally
    Report {
        alias: String,
        #[arg(long)]
        year: Option<String>,
        /// Classify pending citers first
        #[arg(long)]
        classify: bool,
        /// Write the citation graph as GEXF
        #[arg(long)]
        gexf: Option<PathBuf>,
    },
    /// Print one raw ORCID record section
    Orcid {
        id: String,
        /// `person` or `employments`
        section: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lusocite=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!(version = env!("CARGO_PKG_VERSION"), "Lusocite starting");

    let config = config::Config::load(cli.config.as_deref())?;
    let interactive = config.prompt.interactive && !cli.unattended;
    info!(
        data_dir = %config.storage.data_dir.display(),
        language = %config.language.backend,
        interactive,
        "Configuration loaded"
    );

    match cli.command {
        Command::Download { alias, force } => commands::download(&config, &alias, force).await,
        Command::Authors { alias } => commands::authors(&config, &alias).await,
        Command::Citations { alias, year, refresh } => {
            commands::citations(&config, interactive, &alias, year.as_deref(), refresh).await
        }
        Command::Classify { alias, year } => {
            commands::classify(&config, interactive, alias.as_deref(), year.as_deref()).await
        }
        Command::Report { alias, year, classify, gexf } => {
            commands::report(&config, interactive, &alias, year.as_deref(), classify, gexf.as_deref()).await
        }
        Command::Orcid { id, section } => commands::orcid(&config, &id, &section).await,
    }
}
