//! Core processing pipeline: validate → build graph → render.

use std::path::Path;
use std::time::Instant;

use tracing::info;

use godepviz_core::{GraphBuilder, PackageResolver};
use godepviz_error::{Error, Result};

use crate::options::Cli;
use crate::output::render_output;

/// Run one invocation against `resolver`, returning the diagram text.
///
/// Input errors are reported before any package is resolved.
pub fn process<R: PackageResolver>(cli: &Cli, resolver: R, search_root: &Path) -> Result<String> {
    let format = cli.output_format()?;
    if cli.packages.is_empty() {
        return Err(Error::invalid_argument(
            "need at least one package name to process",
        ));
    }
    let config = cli.graph_config();

    let build_start = Instant::now();
    info!("Resolving {} root package(s)", cli.packages.len());
    let graph = GraphBuilder::new(resolver, &config).build(search_root, cli.packages.as_slice())?;
    info!(
        "Graph build: {} packages, {} errors in {:.2}s",
        graph.len(),
        graph.errors().len(),
        build_start.elapsed().as_secs_f64()
    );

    Ok(render_output(&graph, &config, format, cli.layout()))
}
