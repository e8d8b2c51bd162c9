use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use godepviz_cli::output::write_output;
use godepviz_cli::{Cli, exit_status, run_main};

fn main() -> ExitCode {
    let args = Cli::parse();

    // Diagnostics go to stderr so they never mix with the diagram
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let total_start = Instant::now();
    let result =
        run_main(&args).and_then(|text| write_output(&text, args.output.output.as_deref()));

    let total_secs = total_start.elapsed().as_secs_f64();
    match result {
        Ok(()) => {
            tracing::info!(total_secs, "complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "execution failed");
            eprintln!("Error: {e}");
            ExitCode::from(exit_status(&e))
        }
    }
}
