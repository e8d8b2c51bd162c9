//! Command-line options for godepviz.
//!
//! Options are split into flattened groups so the corpus runner can parse
//! the same surface from a case's `args:` line.

use std::path::PathBuf;

use clap::{Args, Parser};

use godepviz_core::{FilterConfig, GraphConfig};
use godepviz_error::Result;
use godepviz_render::{Layout, OutputFormat};

/// Which packages end up in the graph.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterOptions {
    /// Ignore packages in the Go standard library
    #[arg(short = 's', long = "ignore-stdlib")]
    pub ignore_stdlib: bool,

    /// Ignore packages found in vendor directories
    #[arg(long = "no-vendor")]
    pub no_vendor: bool,

    /// Comma-separated list of packages to ignore
    #[arg(short = 'i', long = "ignore", value_delimiter = ',', value_name = "PKGS")]
    pub ignore: Vec<String>,

    /// Comma-separated list of prefixes to ignore
    #[arg(
        short = 'p',
        long = "ignore-prefixes",
        value_delimiter = ',',
        value_name = "PREFIXES"
    )]
    pub ignore_prefixes: Vec<String>,

    /// Comma-separated list of prefixes to include; everything else is ignored
    #[arg(short = 'o', long = "only", value_delimiter = ',', value_name = "PREFIXES")]
    pub only_prefixes: Vec<String>,

    /// Only include packages under the same source root as the first root package
    #[arg(long = "same-root")]
    pub same_root: bool,
}

/// How far and how strictly the import graph is followed.
#[derive(Args, Debug, Clone)]
pub struct TraversalOptions {
    /// Show dependencies of packages in the Go standard library
    #[arg(short = 'd', long = "delve-stdlib")]
    pub delve_stdlib: bool,

    /// Abort on the first package that cannot be imported
    #[arg(
        long = "stop-on-error",
        value_name = "BOOL",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub stop_on_error: bool,

    /// Comma-separated list of build tags considered satisfied
    #[arg(long = "tags", value_delimiter = ',', value_name = "TAGS")]
    pub tags: Vec<String>,

    /// Include test packages
    #[arg(short = 't', long = "include-tests")]
    pub include_tests: bool,

    /// Maximum depth of the dependency graph
    #[arg(short = 'l', long = "max-depth", default_value_t = 256)]
    pub max_depth: usize,
}

/// Diagram dialect and destination.
#[derive(Args, Debug, Clone)]
pub struct OutputOptions {
    /// Output format: 'dot' or 'mermaid'
    #[arg(short = 'f', long = "format", value_name = "FORMAT", default_value = "dot")]
    pub format: String,

    /// Lay out the dependency graph horizontally instead of vertically
    #[arg(long)]
    pub horizontal: bool,

    /// Output file path (writes to file instead of stdout)
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "godepviz",
    about = "Render the import graph of Go packages as DOT or Mermaid",
    version
)]
pub struct Cli {
    /// Root packages to start from
    #[arg(value_name = "PACKAGE")]
    pub packages: Vec<String>,

    #[command(flatten)]
    pub filter: FilterOptions,

    #[command(flatten)]
    pub traversal: TraversalOptions,

    #[command(flatten)]
    pub output: OutputOptions,

    /// Resolve packages from a JSON manifest instead of running `go list`
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,
}

impl Cli {
    pub fn filter_config(&self) -> FilterConfig {
        let opts = &self.filter;
        FilterConfig::default()
            .with_ignored(non_empty(&opts.ignore))
            .with_ignore_prefixes(non_empty(&opts.ignore_prefixes))
            .with_allow_prefixes(non_empty(&opts.only_prefixes))
            .with_ignore_std(opts.ignore_stdlib)
            .with_ignore_vendored(opts.no_vendor)
            .with_same_root(opts.same_root)
    }

    pub fn graph_config(&self) -> GraphConfig {
        let opts = &self.traversal;
        GraphConfig::default()
            .with_filter(self.filter_config())
            .with_max_depth(opts.max_depth)
            .with_include_tests(opts.include_tests)
            .with_delve_std(opts.delve_stdlib)
            .with_stop_on_error(opts.stop_on_error)
            .with_build_tags(non_empty(&opts.tags))
    }

    pub fn output_format(&self) -> Result<OutputFormat> {
        self.output.format.parse()
    }

    pub fn layout(&self) -> Layout {
        Layout::from_horizontal(self.output.horizontal)
    }
}

// `-i ''` should mean "nothing", not "the empty package".
fn non_empty(values: &[String]) -> impl Iterator<Item = String> + '_ {
    values.iter().filter(|v| !v.is_empty()).cloned()
}
