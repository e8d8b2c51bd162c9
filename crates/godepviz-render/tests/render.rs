use std::path::Path;

use godepviz_core::{DepGraph, FilterConfig, GraphConfig, PackageInfo, StaticResolver, build_dep_graph};
use godepviz_render::{DotWriter, Layout, MermaidWriter, OutputFormat, render_as, render_graph};
use pretty_assertions::assert_eq;

fn text(lines: &[&str]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn abc_resolver() -> StaticResolver {
    StaticResolver::new([
        PackageInfo::new("pkgA").with_imports(["pkgB", "pkgSTD"]),
        PackageInfo::new("pkgB").with_imports(["pkgSTD"]),
        PackageInfo::new("pkgSTD")
            .with_goroot(true)
            .with_imports(["pkgSTD2"]),
        PackageInfo::new("pkgSTD2").with_goroot(true),
    ])
}

fn build(resolver: &StaticResolver, config: &GraphConfig) -> DepGraph {
    build_dep_graph(resolver, Path::new("."), &["pkgA"], config).unwrap()
}

#[test]
fn dot_scenario() {
    let config = GraphConfig::default();
    let graph = build(&abc_resolver(), &config);
    let output = render_graph(&graph, &config, &mut DotWriter::new(), Layout::Vertical);

    assert_eq!(
        output,
        text(&[
            "digraph godep {",
            "  splines=\"ortho\";",
            "  nodesep=\"0.4\";",
            "  ranksep=\"0.8\";",
            "  node [shape=\"box\", style=\"rounded,filled\"];",
            "  edge [arrowsize=\"0.5\"];",
            "",
            "  \"pkgA\"[label=\"pkgA\", color=\"paleturquoise\", URL=\"https://pkg.go.dev/pkgA\", target=\"_blank\"];",
            "  \"pkgA\" -> \"pkgB\";",
            "  \"pkgA\" -> \"pkgSTD\";",
            "  \"pkgB\"[label=\"pkgB\", color=\"paleturquoise\", URL=\"https://pkg.go.dev/pkgB\", target=\"_blank\"];",
            "  \"pkgB\" -> \"pkgSTD\";",
            "  \"pkgSTD\"[label=\"pkgSTD\", color=\"palegreen\", URL=\"https://pkg.go.dev/pkgSTD\", target=\"_blank\"];",
            "}",
        ])
    );
}

#[test]
fn mermaid_scenario() {
    let config = GraphConfig::default();
    let graph = build(&abc_resolver(), &config);
    let output = render_graph(&graph, &config, &mut MermaidWriter::new(), Layout::Horizontal);

    assert_eq!(
        output,
        text(&[
            "flowchart LR",
            "",
            "classDef stdlib fill:#1D4,color:white",
            "classDef cgo fill:#D52,color:white",
            "classDef vendored fill:#D90,color:white",
            "classDef errored fill:#C10,color:white",
            "",
            "1[\"pkgA\"]",
            "click 1 href \"https://pkg.go.dev/pkgA\"",
            "1 --> 2",
            "1 --> 3",
            "",
            "2[\"pkgB\"]",
            "click 2 href \"https://pkg.go.dev/pkgB\"",
            "2 --> 3",
            "",
            "3[\"pkgSTD\"]",
            "click 3 href \"https://pkg.go.dev/pkgSTD\"",
            "class 3 stdlib",
        ])
    );
}

#[test]
fn std_edges_need_delve() {
    let config = GraphConfig::default().with_delve_std(true);
    let graph = build(&abc_resolver(), &config);
    let output = render_as(&graph, &config, OutputFormat::Mermaid, Layout::Vertical);

    assert!(output.contains("3 --> 4\n"));
    assert!(output.contains("4[\"pkgSTD2\"]\n"));
}

#[test]
fn render_filter_matches_build_filter() {
    let build_config = GraphConfig::default();
    let graph = build(&abc_resolver(), &build_config);

    let render_config =
        GraphConfig::default().with_filter(FilterConfig::default().with_ignore_std(true));
    let output = render_as(&graph, &render_config, OutputFormat::Dot, Layout::Vertical);

    assert!(!output.contains("pkgSTD"));
    assert!(output.contains("  \"pkgA\" -> \"pkgB\";\n"));
}

#[test]
fn failed_packages_render_without_edges() {
    let resolver = StaticResolver::new([
        PackageInfo::new("pkgA").with_imports(["pkgC", "pkgB"]),
        PackageInfo::new("pkgB"),
    ]);
    let config = GraphConfig::default().with_stop_on_error(false);
    let graph = build(&resolver, &config);
    let output = render_as(&graph, &config, OutputFormat::Mermaid, Layout::Vertical);

    assert!(output.ends_with(&text(&[
        "",
        "2[\"pkgC\"]",
        "click 2 href \"https://pkg.go.dev/pkgC\"",
        "class 2 errored",
    ])));
    assert!(output.contains("1 --> 2\n1 --> 3\n"));
}

#[test]
fn identities_are_per_printer() {
    let config = GraphConfig::default();
    let graph = build(&abc_resolver(), &config);

    let first = render_as(&graph, &config, OutputFormat::Mermaid, Layout::Vertical);
    let dot = render_as(&graph, &config, OutputFormat::Dot, Layout::Vertical);
    let second = render_as(&graph, &config, OutputFormat::Mermaid, Layout::Vertical);

    assert_eq!(first, second);
    assert!(!dot.contains("-->"));
}

#[test]
fn empty_graph_renders_frame_only() {
    let output = render_as(
        &DepGraph::default(),
        &GraphConfig::default(),
        OutputFormat::Dot,
        Layout::Vertical,
    );
    assert!(output.starts_with("digraph godep {\n"));
    assert!(output.ends_with("\n\n}\n"));
}
