use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod auth;
pub mod schedule;
pub mod serve;
pub mod suggest;

use crate::core::AppConfig;

#[derive(Subcommand)]
enum Command {
    /// Suggest open slots for a meeting request
    Suggest {
        /// The meeting request in plain language
        #[arg(long)]
        text: String,

        /// Book the suggested slot with this number (starting at 1)
        #[arg(long)]
        book: Option<usize>,
    },
    /// Interactively suggest slots and book one
    Schedule {},
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Perform OAuth authentication and print a refresh token
    Auth {
        #[arg(long, default_value = "urn:ietf:wg:oauth:2.0:oob")]
        redirect_uri: String,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    let config = AppConfig::from_env()?;

    // Handle each sub command
    match args.command {
        Some(Command::Suggest { text, book }) => {
            init_tracing();
            suggest::run(&text, book, &config).await?;
        }
        Some(Command::Schedule {}) => {
            init_tracing();
            schedule::run(&config).await?;
        }
        Some(Command::Serve { host, port }) => {
            // The server sets up its own subscriber
            serve::run(host, port, config).await?;
        }
        Some(Command::Auth { redirect_uri }) => {
            auth::run(&redirect_uri, &config).await?;
        }
        None => {}
    }

    Ok(())
}
