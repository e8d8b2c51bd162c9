use std::path::Path;

use godepviz_core::{
    DepGraph, ErrorKind, FilterConfig, GraphConfig, PackageClass, PackageInfo, StaticResolver,
    build_dep_graph,
};

/// pkgA imports pkgB and pkgSTD; pkgB imports pkgSTD; pkgSTD imports pkgSTD2.
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

fn build(resolver: &StaticResolver, roots: &[&str], config: &GraphConfig) -> DepGraph {
    build_dep_graph(resolver, Path::new("."), roots, config).expect("graph builds")
}

fn paths(graph: &DepGraph) -> Vec<&str> {
    graph.packages().map(|p| p.canonical_path.as_str()).collect()
}

#[test]
fn default_config_keeps_std_leaves() {
    let graph = build(&abc_resolver(), &["pkgA"], &GraphConfig::default());

    assert_eq!(paths(&graph), ["pkgA", "pkgB", "pkgSTD"]);
    assert_eq!(
        graph.edges(),
        [("pkgA", "pkgB"), ("pkgA", "pkgSTD"), ("pkgB", "pkgSTD")]
    );
    assert!(graph.errors().is_empty());
}

#[test]
fn std_exclusion_drops_std_nodes() {
    let config =
        GraphConfig::default().with_filter(FilterConfig::default().with_ignore_std(true));
    let graph = build(&abc_resolver(), &["pkgA"], &config);

    assert_eq!(paths(&graph), ["pkgA", "pkgB"]);
    assert_eq!(graph.edges(), [("pkgA", "pkgB")]);
}

#[test]
fn ignore_prefix_prunes_subtree() {
    let resolver = StaticResolver::new([
        PackageInfo::new("pkgA").with_imports(["pkgB", "pkgD"]),
        PackageInfo::new("pkgB").with_imports(["pkgOnlyViaB"]),
        PackageInfo::new("pkgD"),
        PackageInfo::new("pkgOnlyViaB"),
    ]);
    let config = GraphConfig::default()
        .with_filter(FilterConfig::default().with_ignore_prefixes(["pkgB"]));
    let graph = build(&resolver, &["pkgA"], &config);

    assert_eq!(paths(&graph), ["pkgA", "pkgD"]);
    assert_eq!(graph.edges(), [("pkgA", "pkgD")]);
}

#[test]
fn continue_on_error_renders_failed_package() {
    let resolver = StaticResolver::new([
        PackageInfo::new("pkgA").with_imports(["pkgC", "pkgB"]),
        PackageInfo::new("pkgB"),
    ]);
    let config = GraphConfig::default().with_stop_on_error(false);
    let graph = build(&resolver, &["pkgA"], &config);

    assert_eq!(paths(&graph), ["pkgA", "pkgB", "pkgC"]);
    assert_eq!(graph.errors().iter().collect::<Vec<_>>(), ["pkgC"]);

    let failed = graph.package("pkgC").unwrap();
    assert!(failed.resolution_failed);
    assert_eq!(failed.classify(), PackageClass::ResolutionError);
    assert_eq!(failed.edge_targets().count(), 0);
    assert_eq!(graph.edges(), [("pkgA", "pkgC"), ("pkgA", "pkgB")]);
}

#[test]
fn stop_on_error_reports_import_chain() {
    let resolver = StaticResolver::new([
        PackageInfo::new("pkgA").with_imports(["pkgB"]),
        PackageInfo::new("pkgB").with_imports(["pkgC"]),
    ]);
    let err = build_dep_graph(&resolver, Path::new("."), &["pkgA"], &GraphConfig::default())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ResolutionFailed);
    assert_eq!(err.operation(), "graph::build");
    assert_eq!(err.context_value("package"), Some("pkgC"));
    assert_eq!(err.context_value("imported_by"), Some("pkgA -> pkgB"));
    assert!(err.to_string().contains("failed to import pkgC"));
}

#[test]
fn cycles_terminate() {
    let resolver = StaticResolver::new([
        PackageInfo::new("a").with_imports(["b"]),
        PackageInfo::new("b").with_imports(["a"]),
    ]);
    let graph = build(&resolver, &["a"], &GraphConfig::default());

    assert_eq!(paths(&graph), ["a", "b"]);
    assert_eq!(graph.edges(), [("a", "b"), ("b", "a")]);
}

#[test]
fn test_imports_never_point_back_at_package() {
    let resolver = StaticResolver::new([
        PackageInfo::new("example.com/a")
            .with_imports(["example.com/b"])
            .with_test_imports(["testing"])
            .with_xtest_imports(["example.com/a", "example.com/a/internal/fake"]),
        PackageInfo::new("example.com/b"),
        PackageInfo::new("testing").with_goroot(true),
        PackageInfo::new("example.com/a/internal/fake"),
    ]);

    let graph = build(&resolver, &["example.com/a"], &GraphConfig::default());
    assert_eq!(paths(&graph), ["example.com/a", "example.com/b"]);

    let config = GraphConfig::default().with_include_tests(true);
    let graph = build(&resolver, &["example.com/a"], &config);
    assert_eq!(
        graph.edges(),
        [
            ("example.com/a", "example.com/b"),
            ("example.com/a", "testing"),
            ("example.com/a", "example.com/a/internal/fake"),
        ]
    );
    assert!(graph.edges().iter().all(|(from, to)| from != to));
}

#[test]
fn zero_depth_keeps_only_roots() {
    let config = GraphConfig::default().with_max_depth(0);
    let graph = build(&abc_resolver(), &["pkgA"], &config);
    assert_eq!(paths(&graph), ["pkgA"]);
    assert!(graph.edges().is_empty());

    // two roots at depth 0 still see each other
    let graph = build(&abc_resolver(), &["pkgA", "pkgB"], &config);
    assert_eq!(paths(&graph), ["pkgA", "pkgB"]);
    assert_eq!(graph.edges(), [("pkgA", "pkgB")]);
}

#[test]
fn allowlist_wins_over_other_toggles() {
    let resolver = StaticResolver::new([
        PackageInfo::new("example.com/app").with_imports([
            "example.com/app/db",
            "github.com/lib/pq",
            "fmt",
        ]),
        PackageInfo::new("example.com/app/db").with_imports(["github.com/lib/pq"]),
        PackageInfo::new("github.com/lib/pq"),
        PackageInfo::new("fmt").with_goroot(true),
    ]);
    let config = GraphConfig::default().with_filter(
        FilterConfig::default()
            .with_allow_prefixes(["example.com/"])
            .with_ignore_std(false),
    );
    let graph = build(&resolver, &["example.com/app"], &config);

    assert_eq!(paths(&graph), ["example.com/app", "example.com/app/db"]);
}

#[test]
fn vendored_copies_collapse_to_one_node() {
    let resolver = StaticResolver::new([
        PackageInfo::new("example.com/app").with_imports([
            "example.com/app/vendor/github.com/pkg/errors",
            "example.com/app/util",
        ]),
        PackageInfo::new("example.com/app/util")
            .with_imports(["example.com/app/vendor/github.com/pkg/errors"]),
        PackageInfo::new("example.com/app/vendor/github.com/pkg/errors"),
    ]);
    let graph = build(&resolver, &["example.com/app"], &GraphConfig::default());

    assert_eq!(
        paths(&graph),
        ["example.com/app", "example.com/app/util", "github.com/pkg/errors"]
    );
    let errors = graph.package("github.com/pkg/errors").unwrap();
    assert_eq!(errors.classify(), PackageClass::Vendored);

    let config =
        GraphConfig::default().with_filter(FilterConfig::default().with_ignore_vendored(true));
    let graph = build(&resolver, &["example.com/app"], &config);
    assert_eq!(paths(&graph), ["example.com/app", "example.com/app/util"]);
}

#[test]
fn repeated_builds_are_identical() {
    let resolver = abc_resolver();
    let config = GraphConfig::default().with_delve_std(true);
    let first = build(&resolver, &["pkgA"], &config);
    let second = build(&resolver, &["pkgA"], &config);

    assert_eq!(first, second);
    assert!(first.contains("pkgSTD2"));
}

#[test]
fn manifest_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("deps.json");
    std::fs::write(
        &manifest,
        r#"{"packages": [
            {"import_path": "example.com/a", "imports": ["example.com/b"]},
            {"import_path": "example.com/b", "error": "no Go files"}
        ]}"#,
    )
    .unwrap();

    let resolver = StaticResolver::from_path(&manifest).unwrap();
    let config = GraphConfig::default().with_stop_on_error(false);
    let graph = build(&resolver, &["example.com/a"], &config);
    assert!(graph.package("example.com/b").unwrap().resolution_failed);

    let missing = StaticResolver::from_path(&dir.path().join("nope.json")).unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::FileNotFound);
}
