//! Storefront CLI

use std::process::ExitCode;

use clap::Parser;
use storefront_app::observability;
use tracing::error;

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    _ = dotenvy::dotenv();

    let cli = cli::Cli::parse();

    if let Err(error) = observability::init_logging(&cli.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging could not be initialised, must use eprintln"
        )]
        {
            eprintln!("{error}");
        }

        return ExitCode::FAILURE;
    }

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!(%message, "command failed");

            #[expect(
                clippy::print_stderr,
                reason = "the failure is reported to the terminal user"
            )]
            {
                eprintln!("error: {message}");
            }

            ExitCode::FAILURE
        }
    }
}
