use clap::Parser;
use ghactions::cli::{self, Args};
use ghactions::logging;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let _guard = match logging::init(&args) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("failed to initialize logging: {:#}", err);
            return ExitCode::FAILURE;
        }
    };

    match cli::run(args).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
