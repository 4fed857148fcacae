use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use lightctl::api::ApiClient;
use lightctl::api::Hsv;
use lightctl::api::HttpTransport;
use lightctl::config::Config;
use lightctl::dashboard::Dashboard;
use lightctl::dashboard::Outcome;
use lightctl::dashboard::StderrAlert;
use lightctl::shell;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::prelude::*;

/// Control smart bulbs through a lighting server
#[derive(Debug, Parser)]
#[command(name = "lightctl", version)]
struct Cli {
    /// Path to the TOML config file (default: ./lightctl.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base address of the lighting server, e.g. http://localhost:5000
    #[arg(short, long, env = "LIGHTCTL_SERVER")]
    server: Option<String>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Show every device the server reports
    List,

    /// Open a server-side session with a device
    Connect { address: String },

    /// Turn a device on
    On { address: String },

    /// Turn a device off
    Off { address: String },

    /// Set a bulb's color
    Hsv {
        address: String,

        /// Hue in degrees
        #[arg(value_parser = clap::value_parser!(u16).range(0..=360))]
        hue: u16,

        /// Saturation in percent
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        saturation: u8,

        /// Brightness in percent
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        value: Option<u8>,

        /// Fade duration in milliseconds
        #[arg(short, long, requires = "value")]
        transition: Option<u32>,
    },

    /// Cycle random colors on a bulb
    Random {
        #[command(subcommand)]
        action: RandomAction,
    },

    /// Interactive session reading commands from stdin
    Shell,
}

#[derive(Debug, Subcommand)]
enum RandomAction {
    /// Start cycling every INTERVAL_MS milliseconds
    Start { address: String, interval_ms: u32 },

    /// Stop cycling
    Stop { address: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config
        .override_base_url(cli.server)
        .context("Invalid server address")?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(config.logging.targets())
        .init();

    let base_url = config.server.url()?;
    info!("Using lighting server at {}", base_url);

    let transport = HttpTransport::new(&base_url, config.server.timeout())?;
    let dashboard = Dashboard::new(ApiClient::new(transport), Arc::new(StderrAlert));

    // A shell session starts with an empty map and can `refresh` later.
    let loaded = dashboard.load().await.is_success();
    if !loaded && !matches!(cli.command, CliCommand::Shell) {
        return Ok(ExitCode::FAILURE);
    }

    let outcome = match cli.command {
        CliCommand::List => {
            println!("{}", dashboard.render());
            Outcome::Succeeded
        }
        CliCommand::Connect { address } => dashboard.connect(&address).await?,
        CliCommand::On { address } => dashboard.on(&address).await?,
        CliCommand::Off { address } => dashboard.off(&address).await?,
        CliCommand::Hsv {
            address,
            hue,
            saturation,
            value,
            transition,
        } => {
            let hsv = Hsv::new(hue, saturation, value, transition)?;
            dashboard.set_hsv(&address, hsv).await?
        }
        CliCommand::Random {
            action: RandomAction::Start {
                address,
                interval_ms,
            },
        } => dashboard.start_random(&address, interval_ms).await?,
        CliCommand::Random {
            action: RandomAction::Stop { address },
        } => dashboard.stop_random(&address).await?,
        CliCommand::Shell => {
            let stdin = BufReader::new(tokio::io::stdin());
            shell::run(&dashboard, stdin, tokio::io::stdout())
                .await
                .context("Shell session failed")?;
            Outcome::Succeeded
        }
    };

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
