//! Package visibility rules.
//!
//! The graph builder and the renderers both ask the same [`Filter`], so a
//! package pruned during traversal is never resurrected at render time and a
//! package hidden by post-resolution data stays hidden in the diagram.

use std::collections::BTreeSet;

use crate::identity::{is_vendored, normalize};
use crate::package::Package;

/// Pseudo-package used by cgo; it never resolves to real sources.
pub const CGO_PSEUDO_PACKAGE: &str = "C";

/// Inclusion and exclusion rules, fixed once the command line is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Canonical paths excluded outright.
    pub ignored: BTreeSet<String>,
    pub ignore_prefixes: Vec<String>,
    /// When non-empty, only paths starting with one of these are admitted.
    pub allow_prefixes: Vec<String>,
    pub ignore_std: bool,
    pub ignore_vendored: bool,
    /// Only admit packages living under the same source root as the first root.
    pub same_root: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ignored: BTreeSet::from([CGO_PSEUDO_PACKAGE.to_string()]),
            ignore_prefixes: Vec::new(),
            allow_prefixes: Vec::new(),
            ignore_std: false,
            ignore_vendored: false,
            same_root: false,
        }
    }
}

impl FilterConfig {
    pub fn with_ignored<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn with_ignore_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_allow_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ignore_std(mut self, ignore_std: bool) -> Self {
        self.ignore_std = ignore_std;
        self
    }

    pub fn with_ignore_vendored(mut self, ignore_vendored: bool) -> Self {
        self.ignore_vendored = ignore_vendored;
        self
    }

    pub fn with_same_root(mut self, same_root: bool) -> Self {
        self.same_root = same_root;
        self
    }
}

/// A [`FilterConfig`] bound to the expected source root of one build.
#[derive(Debug, Clone, Copy)]
pub struct Filter<'a> {
    config: &'a FilterConfig,
    expected_root: Option<&'a str>,
}

impl<'a> Filter<'a> {
    pub fn new(config: &'a FilterConfig) -> Self {
        Self {
            config,
            expected_root: None,
        }
    }

    pub fn with_expected_root(mut self, root: Option<&'a str>) -> Self {
        self.expected_root = root;
        self
    }

    pub fn config(&self) -> &'a FilterConfig {
        self.config
    }

    /// Rules that only need the import path, checked before resolving.
    pub fn admits_path(&self, raw: &str) -> bool {
        let canonical = normalize(raw);
        self.allowed(canonical)
            && !self.vendored_excluded(raw)
            && !self.explicitly_ignored(canonical)
            && !self.prefix_ignored(canonical)
    }

    /// Full rule set, first exclusion wins:
    /// allowlist, source root, vendoring, explicit ignore, standard library,
    /// ignore prefixes.
    pub fn is_visible(&self, pkg: &Package) -> bool {
        let canonical = pkg.canonical_path.as_str();
        if !self.allowed(canonical) {
            return false;
        }
        if self.outside_root(pkg) {
            return false;
        }
        if self.vendored_excluded(&pkg.import_path) {
            return false;
        }
        if self.explicitly_ignored(canonical) {
            return false;
        }
        if pkg.is_std && self.config.ignore_std {
            return false;
        }
        !self.prefix_ignored(canonical)
    }

    fn allowed(&self, canonical: &str) -> bool {
        self.config.allow_prefixes.is_empty() || has_prefix(canonical, &self.config.allow_prefixes)
    }

    fn outside_root(&self, pkg: &Package) -> bool {
        if !self.config.same_root || pkg.resolution_failed {
            return false;
        }
        match self.expected_root {
            Some(root) => pkg.source_root != root,
            None => false,
        }
    }

    fn vendored_excluded(&self, raw: &str) -> bool {
        self.config.ignore_vendored && is_vendored(raw)
    }

    fn explicitly_ignored(&self, canonical: &str) -> bool {
        self.config.ignored.contains(canonical)
    }

    fn prefix_ignored(&self, canonical: &str) -> bool {
        has_prefix(canonical, &self.config.ignore_prefixes)
    }
}

fn has_prefix(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::PackageInfo;

    fn pkg(path: &str) -> Package {
        Package::resolved(PackageInfo::new(path).with_root("/go"), false)
    }

    fn std_pkg(path: &str) -> Package {
        Package::resolved(PackageInfo::new(path).with_goroot(true).with_root("/goroot"), false)
    }

    #[test]
    fn test_default_config_admits_everything_but_cgo() {
        let config = FilterConfig::default();
        let filter = Filter::new(&config);
        assert!(filter.is_visible(&pkg("example.com/a")));
        assert!(filter.is_visible(&std_pkg("fmt")));
        assert!(!filter.admits_path("C"));
        assert!(!filter.is_visible(&pkg("C")));
    }

    #[test]
    fn test_std_exclusion_needs_resolution() {
        let config = FilterConfig::default().with_ignore_std(true);
        let filter = Filter::new(&config);
        assert!(filter.admits_path("fmt"));
        assert!(!filter.is_visible(&std_pkg("fmt")));
    }

    #[test]
    fn test_allowlist_overrides_everything() {
        let config = FilterConfig::default().with_allow_prefixes(["example.com/"]);
        let filter = Filter::new(&config);
        assert!(filter.is_visible(&pkg("example.com/a")));
        assert!(!filter.is_visible(&std_pkg("fmt")));
        assert!(!filter.admits_path("github.com/x/y"));
    }

    #[test]
    fn test_allowlist_uses_canonical_path() {
        let config = FilterConfig::default().with_allow_prefixes(["github.com/x"]);
        let filter = Filter::new(&config);
        assert!(filter.admits_path("example.com/app/vendor/github.com/x/y"));
    }

    #[test]
    fn test_vendoring_exclusion_uses_raw_path() {
        let config = FilterConfig::default().with_ignore_vendored(true);
        let filter = Filter::new(&config);
        assert!(!filter.admits_path("example.com/app/vendor/github.com/x/y"));
        assert!(filter.admits_path("github.com/x/y"));
        assert!(!filter.is_visible(&pkg("example.com/app/vendor/github.com/x/y")));
    }

    #[test]
    fn test_ignore_set_and_prefixes() {
        let config = FilterConfig::default()
            .with_ignored(["example.com/skip"])
            .with_ignore_prefixes(["example.com/internal"]);
        let filter = Filter::new(&config);
        assert!(!filter.admits_path("example.com/skip"));
        assert!(filter.admits_path("example.com/skipper"));
        assert!(!filter.admits_path("example.com/internal/db"));
        assert!(!filter.is_visible(&pkg("example.com/internal")));
        assert!(config.ignored.contains(CGO_PSEUDO_PACKAGE));
    }

    #[test]
    fn test_same_root_scoping() {
        let config = FilterConfig::default().with_same_root(true);

        let unbound = Filter::new(&config);
        assert!(unbound.is_visible(&std_pkg("fmt")));

        let filter = Filter::new(&config).with_expected_root(Some("/go"));
        assert!(filter.is_visible(&pkg("example.com/a")));
        assert!(!filter.is_visible(&std_pkg("fmt")));
        assert!(filter.is_visible(&Package::unresolved("example.com/missing")));
    }
}
