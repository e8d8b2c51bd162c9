//! The package resolver seam.
//!
//! Turning an import path into package metadata is delegated to an
//! implementation of [`PackageResolver`]. The command-line tool shells out
//! to `go list`; tests and offline runs use [`StaticResolver`], which serves
//! packages from a JSON manifest.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use godepviz_error::{Error, Result};

use crate::identity::normalize;

/// Build configuration handed to the resolver on every lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Build tags considered satisfied.
    pub tags: Vec<String>,
    /// Whether test imports should be reported.
    pub include_tests: bool,
}

/// Raw package metadata reported by a resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageInfo {
    /// Import path as reported, possibly inside a vendored tree.
    pub import_path: String,
    /// Directory holding the package sources.
    pub dir: PathBuf,
    /// Source root the package was found under (GOROOT, GOPATH entry, module root).
    pub root: String,
    /// Part of the host toolchain's standard library.
    pub goroot: bool,
    /// Sources that need the foreign function interface.
    pub cgo_files: Vec<String>,
    pub imports: Vec<String>,
    pub test_imports: Vec<String>,
    pub xtest_imports: Vec<String>,
    /// Manifest-only: when set, resolving this package fails with this message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PackageInfo {
    pub fn new(import_path: impl Into<String>) -> Self {
        Self {
            import_path: import_path.into(),
            ..Self::default()
        }
    }

    pub fn with_imports<I, S>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.imports = imports.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_test_imports<I, S>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.test_imports = imports.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_xtest_imports<I, S>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.xtest_imports = imports.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_goroot(mut self, goroot: bool) -> Self {
        self.goroot = goroot;
        self
    }

    pub fn with_cgo_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cgo_files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Resolves import paths to package metadata.
pub trait PackageResolver {
    /// Resolve `import_path` as seen from the `search_root` directory.
    fn resolve(
        &self,
        search_root: &Path,
        import_path: &str,
        options: &BuildOptions,
    ) -> Result<PackageInfo>;
}

impl<R: PackageResolver + ?Sized> PackageResolver for &R {
    fn resolve(
        &self,
        search_root: &Path,
        import_path: &str,
        options: &BuildOptions,
    ) -> Result<PackageInfo> {
        (**self).resolve(search_root, import_path, options)
    }
}

#[derive(Debug, Deserialize)]
struct Manifest {
    packages: Vec<PackageInfo>,
}

/// Resolver serving a fixed set of packages.
///
/// Lookups try the exact import path first and then its canonical form, so a
/// manifest may list a vendored package once under its canonical path.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    packages: HashMap<String, PackageInfo>,
}

impl StaticResolver {
    pub fn new(packages: impl IntoIterator<Item = PackageInfo>) -> Self {
        let mut resolver = Self::default();
        for info in packages {
            resolver.insert(info);
        }
        resolver
    }

    /// Parse a manifest of the form `{"packages": [{"import_path": ...}, ...]}`.
    pub fn from_json(text: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(text).map_err(|err| {
            Error::deserialization_failed(format!("invalid package manifest: {err}"))
                .with_operation("resolver::from_json")
                .set_source(err)
        })?;
        Ok(Self::new(manifest.packages))
    }

    /// Load a manifest from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| Error::from(err).with_context("path", path.display().to_string()))?;
        Self::from_json(&text).map_err(|err| err.with_context("path", path.display().to_string()))
    }

    pub fn insert(&mut self, info: PackageInfo) {
        self.packages.insert(info.import_path.clone(), info);
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl PackageResolver for StaticResolver {
    fn resolve(
        &self,
        _search_root: &Path,
        import_path: &str,
        _options: &BuildOptions,
    ) -> Result<PackageInfo> {
        let info = self
            .packages
            .get(import_path)
            .or_else(|| self.packages.get(normalize(import_path)))
            .ok_or_else(|| {
                Error::resolution_failed(import_path, "cannot find package")
                    .with_operation("resolver::static")
            })?;

        match &info.error {
            Some(message) => Err(Error::resolution_failed(import_path, message.clone())
                .with_operation("resolver::static")),
            None => Ok(info.clone()),
        }
    }
}
