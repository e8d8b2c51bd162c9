//! Depth-first construction of the package import graph.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use tracing::{debug, trace, warn};

use godepviz_error::{Error, ErrorKind, Result};

use crate::filter::{Filter, FilterConfig};
use crate::identity::normalize;
use crate::package::Package;
use crate::resolver::{BuildOptions, PackageResolver};

const DEFAULT_MAX_DEPTH: usize = 256;

// Remaining stack below which the visitor switches to a fresh segment.
const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_SEGMENT: usize = 1024 * 1024;

/// Traversal settings for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphConfig {
    pub filter: FilterConfig,
    /// Packages deeper than this are not visited. Roots sit at depth 0.
    pub max_depth: usize,
    pub include_tests: bool,
    /// Follow imports of standard library packages.
    pub delve_std: bool,
    /// Abort the whole build on the first resolution failure.
    pub stop_on_error: bool,
    pub build_tags: Vec<String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            include_tests: false,
            delve_std: false,
            stop_on_error: true,
            build_tags: Vec::new(),
        }
    }
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_include_tests(mut self, include_tests: bool) -> Self {
        self.include_tests = include_tests;
        self
    }

    pub fn with_delve_std(mut self, delve_std: bool) -> Self {
        self.delve_std = delve_std;
        self
    }

    pub fn with_stop_on_error(mut self, stop_on_error: bool) -> Self {
        self.stop_on_error = stop_on_error;
        self
    }

    pub fn with_build_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.build_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            tags: self.build_tags.clone(),
            include_tests: self.include_tests,
        }
    }
}

/// Finalized node table of one traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepGraph {
    packages: BTreeMap<String, Package>,
    errors: BTreeSet<String>,
    expected_root: Option<String>,
}

impl DepGraph {
    /// Packages sorted by canonical path.
    pub fn packages(&self) -> impl Iterator<Item = &Package> + '_ {
        self.packages.values()
    }

    pub fn package(&self, canonical_path: &str) -> Option<&Package> {
        self.packages.get(canonical_path)
    }

    pub fn contains(&self, canonical_path: &str) -> bool {
        self.packages.contains_key(canonical_path)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Canonical paths that failed to resolve.
    pub fn errors(&self) -> &BTreeSet<String> {
        &self.errors
    }

    /// Source root of the first root package, recorded when root scoping is on.
    pub fn expected_root(&self) -> Option<&str> {
        self.expected_root.as_deref()
    }

    /// `(from, to)` pairs whose endpoints are both in the node table, sorted
    /// by `from` and then in import order.
    ///
    /// This is the raw table: it does not re-run visibility and keeps the
    /// outgoing edges of standard library packages. The renderer applies both.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.packages
            .values()
            .flat_map(|pkg| {
                pkg.edge_targets()
                    .filter(|target| self.contains(target))
                    .map(move |target| (pkg.canonical_path.as_str(), target))
            })
            .collect()
    }
}

/// Recursive visitor owning the frontier of one build.
pub struct GraphBuilder<'a, R: PackageResolver> {
    resolver: R,
    config: &'a GraphConfig,
    options: BuildOptions,
    graph: DepGraph,
    visited: HashSet<String>,
    /// Canonical paths from the root down to the package being expanded.
    chain: Vec<String>,
}

impl<'a, R: PackageResolver> GraphBuilder<'a, R> {
    pub fn new(resolver: R, config: &'a GraphConfig) -> Self {
        Self {
            resolver,
            config,
            options: config.build_options(),
            graph: DepGraph::default(),
            visited: HashSet::new(),
            chain: Vec::new(),
        }
    }

    /// Traverse every root, in order, into a single graph.
    pub fn build<S: AsRef<str>>(mut self, search_root: &Path, roots: &[S]) -> Result<DepGraph> {
        if roots.is_empty() {
            return Err(Error::invalid_argument(
                "need at least one package name to process",
            ));
        }

        for root in roots {
            self.visit(search_root, root.as_ref(), 0)?;
        }
        Ok(self.graph)
    }

    fn visit(&mut self, search_root: &Path, raw: &str, depth: usize) -> Result<()> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
            self.visit_package(search_root, raw, depth)
        })
    }

    fn visit_package(&mut self, search_root: &Path, raw: &str, depth: usize) -> Result<()> {
        if depth > self.config.max_depth {
            trace!("depth {} exceeds limit, not visiting {}", depth, raw);
            return Ok(());
        }

        let canonical = normalize(raw);
        if self.visited.contains(canonical) {
            return Ok(());
        }
        self.visited.insert(canonical.to_string());

        // Roots may be relative (`.`, `./cmd/x`); their real path is only
        // known after resolution.
        if depth > 0 && !Filter::new(&self.config.filter).admits_path(raw) {
            trace!("pruned {} before resolution", canonical);
            return Ok(());
        }

        let info = match self.resolver.resolve(search_root, raw, &self.options) {
            Ok(info) => info,
            Err(err) => return self.record_failure(raw, err),
        };

        let pkg = Package::resolved(info, self.config.include_tests);
        if pkg.canonical_path != canonical {
            if self.visited.contains(&pkg.canonical_path) {
                return Ok(());
            }
            self.visited.insert(pkg.canonical_path.clone());
        }

        if depth == 0 && self.config.filter.same_root && self.graph.expected_root.is_none() {
            self.graph.expected_root = Some(pkg.source_root.clone());
        }

        let visible = Filter::new(&self.config.filter)
            .with_expected_root(self.graph.expected_root.as_deref())
            .is_visible(&pkg);
        if !visible {
            trace!("pruned {} after resolution", pkg.canonical_path);
            return Ok(());
        }

        debug!(
            "visited {} at depth {} ({} imports)",
            pkg.canonical_path,
            depth,
            pkg.imports().len()
        );

        let descend = !pkg.is_std || self.config.delve_std;
        let imports = if descend { pkg.imports().to_vec() } else { Vec::new() };
        let child_root = if pkg.dir.as_os_str().is_empty() {
            search_root.to_path_buf()
        } else {
            pkg.dir.clone()
        };
        let canonical_path = pkg.canonical_path.clone();
        self.graph.packages.insert(canonical_path.clone(), pkg);

        if imports.is_empty() {
            return Ok(());
        }

        self.chain.push(canonical_path);
        for import in &imports {
            self.visit(&child_root, import, depth + 1)?;
        }
        self.chain.pop();
        Ok(())
    }

    fn record_failure(&mut self, raw: &str, err: Error) -> Result<()> {
        // Only a package the resolver could not find becomes an error node;
        // a broken resolver backend always aborts.
        if self.config.stop_on_error || err.kind() != ErrorKind::ResolutionFailed {
            let mut err = err;
            if err.context_value("package").is_none() {
                err = err.with_context("package", raw);
            }
            if !self.chain.is_empty() {
                err = err.with_context("imported_by", self.chain.join(" -> "));
            }
            return Err(err.with_operation("graph::build"));
        }

        let canonical = normalize(raw).to_string();
        self.graph.errors.insert(canonical.clone());
        warn!("{}, continuing", err.message());
        self.graph
            .packages
            .insert(canonical, Package::unresolved(raw));
        Ok(())
    }
}

/// Build the import graph reachable from `roots`.
pub fn build_dep_graph<R, S>(
    resolver: R,
    search_root: &Path,
    roots: &[S],
    config: &GraphConfig,
) -> Result<DepGraph>
where
    R: PackageResolver,
    S: AsRef<str>,
{
    GraphBuilder::new(resolver, config).build(search_root, roots)
}
