use clap::{ArgAction, Parser, Subcommand};
use ruidex_config::Config;
use ruidex_pipeline::{Pipeline, Step};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ruidex", version, about = "Recover sprites and animation clips from a resource cache")]
struct Cli {
    /// Config file (TOML, YAML or JSON), layered over the user config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity; ignored when RUST_LOG is set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk the cache and output trees into listing tables.
    List,
    /// Decode single-image containers to PNG and record placements.
    Decode,
    /// Build the fingerprint map from sprite containers.
    Fingerprint,
    /// Resolve animation clip frames against the fingerprint map.
    Frames,
    /// Assemble the final tables (and load the database, if configured).
    Assemble,
    /// Every step, in order.
    Run,
}

impl Command {
    fn steps(&self) -> &'static [Step] {
        match self {
            Self::List => &[Step::List],
            Self::Decode => &[Step::Decode],
            Self::Fingerprint => &[Step::Fingerprint],
            Self::Frames => &[Step::Frames],
            Self::Assemble => &[Step::Assemble],
            Self::Run => &Step::ALL,
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("{err:?}");
            return ExitCode::FAILURE;
        },
    };
    tracing::debug!(?config, "loaded configuration");

    let pipeline = Pipeline::new(config);
    for step in cli.command.steps() {
        match pipeline.step(*step).await {
            Ok(report) => println!("{report}"),
            Err(err) => {
                tracing::error!(%step, "{err:?}");
                return ExitCode::FAILURE;
            },
        }
    }
    ExitCode::SUCCESS
}
