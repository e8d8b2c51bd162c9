//! Diagram rendering for dependency graphs.
//!
//! A [`GraphPrinter`] knows how to spell one diagram dialect; [`render_graph`]
//! drives any printer over a finished [`DepGraph`] in a fixed order:
//! header, then every visible package sorted by canonical path followed by
//! its visible outgoing edges, then the footer.
//!
//! # Module Structure
//!
//! - [`dot`]: GraphViz DOT output
//! - [`mermaid`]: Mermaid flowchart output

mod dot;
mod mermaid;

use std::str::FromStr;

use strum_macros::{Display, IntoStaticStr};
use tracing::debug;

use godepviz_core::{DepGraph, Filter, GraphConfig, IdentityResolver, Package};
use godepviz_error::Error;

pub use dot::{DotWriter, escape_label};
pub use mermaid::MermaidWriter;

/// Direction the diagram flows in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    #[default]
    Vertical,
    Horizontal,
}

impl Layout {
    pub fn from_horizontal(horizontal: bool) -> Self {
        if horizontal {
            Layout::Horizontal
        } else {
            Layout::Vertical
        }
    }
}

/// Supported diagram dialects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Dot,
    Mermaid,
}

impl OutputFormat {
    /// A fresh printer with its own identity space.
    pub fn printer(self) -> Box<dyn GraphPrinter> {
        match self {
            OutputFormat::Dot => Box::new(DotWriter::new()),
            OutputFormat::Mermaid => Box::new(MermaidWriter::new()),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dot" => Ok(OutputFormat::Dot),
            "mermaid" => Ok(OutputFormat::Mermaid),
            other => Err(Error::unsupported_format(other).with_operation("render::format")),
        }
    }
}

/// One diagram dialect.
///
/// Printers accumulate text internally; [`GraphPrinter::finish`] hands it over.
pub trait GraphPrinter {
    /// Identity memo used for node references in this dialect.
    fn identities(&mut self) -> &mut IdentityResolver;

    fn write_header(&mut self, layout: Layout);

    fn write_node(&mut self, pkg: &Package, id: &str);

    fn write_edge(&mut self, from: &str, to: &str);

    fn write_end(&mut self);

    /// Take the rendered text, leaving the printer empty.
    fn finish(&mut self) -> String;
}

/// Render `graph` through `printer`.
///
/// Visibility is evaluated again with the same filter the builder used, bound
/// to the root recorded during the build.
pub fn render_graph(
    graph: &DepGraph,
    config: &GraphConfig,
    printer: &mut dyn GraphPrinter,
    layout: Layout,
) -> String {
    let filter = Filter::new(&config.filter).with_expected_root(graph.expected_root());

    printer.write_header(layout);
    let mut nodes = 0usize;
    let mut edges = 0usize;

    for pkg in graph.packages() {
        if !filter.is_visible(pkg) {
            continue;
        }
        let from = printer.identities().assign(&pkg.canonical_path);
        printer.write_node(pkg, &from);
        nodes += 1;

        if pkg.is_std && !config.delve_std {
            continue;
        }

        for target in pkg.edge_targets() {
            let Some(dep) = graph.package(target) else {
                continue;
            };
            if !filter.is_visible(dep) {
                continue;
            }
            let to = printer.identities().assign(target);
            printer.write_edge(&from, &to);
            edges += 1;
        }
    }

    printer.write_end();
    debug!("rendered {} nodes and {} edges", nodes, edges);
    printer.finish()
}

/// Render `graph` in `format` with a freshly created printer.
pub fn render_as(
    graph: &DepGraph,
    config: &GraphConfig,
    format: OutputFormat,
    layout: Layout,
) -> String {
    let mut printer = format.printer();
    render_graph(graph, config, printer.as_mut(), layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use godepviz_error::ErrorKind;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("dot".parse::<OutputFormat>().unwrap(), OutputFormat::Dot);
        assert_eq!(
            "mermaid".parse::<OutputFormat>().unwrap(),
            OutputFormat::Mermaid
        );
        let err = "svg".parse::<OutputFormat>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert_eq!(err.context_value("format"), Some("svg"));
    }

    #[test]
    fn test_output_format_names() {
        assert_eq!(OutputFormat::Dot.to_string(), "dot");
        let name: &'static str = OutputFormat::Mermaid.into();
        assert_eq!(name, "mermaid");
    }

    #[test]
    fn test_layout_from_flag() {
        assert_eq!(Layout::from_horizontal(true), Layout::Horizontal);
        assert_eq!(Layout::from_horizontal(false), Layout::default());
    }
}
