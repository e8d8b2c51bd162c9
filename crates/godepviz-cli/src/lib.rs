//! godepviz command-line interface.

pub mod golist;
pub mod options;
pub mod output;
pub mod pipeline;

use godepviz_core::StaticResolver;
use godepviz_error::{Error, Result};

pub use golist::GoListResolver;
pub use options::{Cli, FilterOptions, OutputOptions, TraversalOptions};
pub use pipeline::process;

/// Exit status for input mistakes, matching clap's usage errors.
const EXIT_USAGE: u8 = 2;
const EXIT_FAILURE: u8 = 1;

/// Main entry point: resolve from the current directory and render.
pub fn run_main(cli: &Cli) -> Result<String> {
    let search_root = std::env::current_dir()?;
    match &cli.manifest {
        Some(path) => {
            let resolver = StaticResolver::from_path(path)?;
            process(cli, &resolver, &search_root)
        }
        None => process(cli, GoListResolver::new(), &search_root),
    }
}

/// Process exit status for a failed run.
pub fn exit_status(err: &Error) -> u8 {
    if err.kind().is_input_error() {
        EXIT_USAGE
    } else {
        EXIT_FAILURE
    }
}
