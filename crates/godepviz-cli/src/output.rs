//! Output generation and delivery.

use std::io::Write;
use std::path::Path;
use std::time::Instant;

use tracing::info;

use godepviz_core::{DepGraph, GraphConfig};
use godepviz_error::{Error, Result};
use godepviz_render::{Layout, OutputFormat, render_as};

/// Render the finished graph in the requested dialect.
pub fn render_output(
    graph: &DepGraph,
    config: &GraphConfig,
    format: OutputFormat,
    layout: Layout,
) -> String {
    let render_start = Instant::now();
    let result = render_as(graph, config, format, layout);
    info!(
        "Rendering {}: {:.2}s",
        format,
        render_start.elapsed().as_secs_f64()
    );
    result
}

/// Write the diagram to `path`, or to stdout when no path is given.
pub fn write_output(text: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, text).map_err(|err| {
                Error::from(err).with_context("path", path.display().to_string())
            })?;
            info!(path = %path.display(), "output written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
