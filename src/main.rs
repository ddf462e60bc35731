/*!
 * Command-line interface for tokserve
 */

use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tokserve::config::{Args, Config};
use tokserve::Service;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.generate {
        clap_complete::generate(shell, &mut Args::command(), "tokserve", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Create configuration
    let config = Config::from_args(args);

    // Load tokenizer and template; failures here are fatal
    let service = match Service::load(config) {
        Ok(service) => service,
        Err(e) => {
            error!("Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    service.report().print();

    let addr = service.config().bind_addr();
    if let Err(e) = service.http_server().run(&addr).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
