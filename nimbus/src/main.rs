use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use nimbus::{trigger, Config, Nimbus};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nimbus")]
#[command(version, about = "Raindrop.io function handler")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Listen for function-host triggers (default)
    Serve,
    /// Run the demonstration once and print the response body
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "nimbus=info,raindrop_core=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let nimbus = Nimbus::from_config(&config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let addr = config.listen_addr();
            let listener = TcpListener::bind(addr).await?;
            info!(%addr, "listening for triggers on /trigger");
            trigger::serve(listener, Arc::new(nimbus)).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Run => {
            let outcome = tokio::task::spawn_blocking(move || nimbus.run_example()).await??;
            println!("{}", outcome.body);
            Ok(if outcome.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
