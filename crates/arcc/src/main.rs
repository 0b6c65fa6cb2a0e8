//! arcc CLI - C compiler and assembler targeting AArch64

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use arcc::cli::{Cli, EXIT_FAILURE, EXIT_SUCCESS};

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("arcc=warn".parse().unwrap()),
        )
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();

    let options = cli.options();
    let exit_code = match arcc::run(&options) {
        Ok(()) => EXIT_SUCCESS,
        Err(error) => {
            if !matches!(error, arcc::Error::Invalid) {
                eprintln!("{error}");
            }
            EXIT_FAILURE
        }
    };

    std::process::exit(exit_code);
}
