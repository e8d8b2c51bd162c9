//! Node table entries.

use std::collections::HashSet;
use std::path::PathBuf;

use strum_macros::{Display, IntoStaticStr};

use crate::identity::{is_vendored, normalize};
use crate::resolver::PackageInfo;

/// Style category of a rendered package, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum PackageClass {
    StandardLibrary,
    NativeInterop,
    Vendored,
    ResolutionError,
    Ordinary,
}

/// One package in the dependency graph, keyed by its canonical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Vendoring-normalized identity.
    pub canonical_path: String,
    /// Import path as resolved, vendoring segments included.
    pub import_path: String,
    /// Directory the package was found in; children resolve from here.
    pub dir: PathBuf,
    /// Source root, only consulted by root scoping.
    pub source_root: String,
    pub is_std: bool,
    pub has_cgo: bool,
    /// Declared imports, raw.
    pub direct_imports: Vec<String>,
    /// Test and external test imports, raw. Empty unless tests are included.
    pub test_imports: Vec<String>,
    pub resolution_failed: bool,
    imports: Vec<String>,
}

impl Package {
    /// Build a node from resolver output.
    pub fn resolved(info: PackageInfo, include_tests: bool) -> Self {
        let canonical_path = normalize(&info.import_path).to_string();
        let test_imports = if include_tests {
            info.test_imports
                .into_iter()
                .chain(info.xtest_imports)
                .collect()
        } else {
            Vec::new()
        };
        let imports = import_set(&canonical_path, &info.imports, &test_imports);

        Self {
            canonical_path,
            import_path: info.import_path,
            dir: info.dir,
            source_root: info.root,
            is_std: info.goroot,
            has_cgo: !info.cgo_files.is_empty(),
            direct_imports: info.imports,
            test_imports,
            resolution_failed: false,
            imports,
        }
    }

    /// Build an error node for a path the resolver could not handle.
    pub fn unresolved(import_path: &str) -> Self {
        Self {
            canonical_path: normalize(import_path).to_string(),
            import_path: import_path.to_string(),
            dir: PathBuf::new(),
            source_root: String::new(),
            is_std: false,
            has_cgo: false,
            direct_imports: Vec::new(),
            test_imports: Vec::new(),
            resolution_failed: true,
            imports: Vec::new(),
        }
    }

    /// Raw import paths to traverse, de-duplicated by canonical path, in
    /// first-seen order, without self references.
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /// Canonical targets of this package's outgoing edges, in insertion order.
    pub fn edge_targets(&self) -> impl Iterator<Item = &str> + '_ {
        self.imports.iter().map(|raw| normalize(raw))
    }

    pub fn is_vendored(&self) -> bool {
        is_vendored(&self.import_path)
    }

    pub fn classify(&self) -> PackageClass {
        if self.is_std {
            PackageClass::StandardLibrary
        } else if self.has_cgo {
            PackageClass::NativeInterop
        } else if self.is_vendored() {
            PackageClass::Vendored
        } else if self.resolution_failed {
            PackageClass::ResolutionError
        } else {
            PackageClass::Ordinary
        }
    }
}

fn import_set(own: &str, direct: &[String], tests: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut imports = Vec::with_capacity(direct.len() + tests.len());
    for raw in direct.iter().chain(tests) {
        let canonical = normalize(raw);
        // foo_test importing foo must not draw an edge back to itself
        if canonical == own {
            continue;
        }
        if seen.insert(canonical) {
            imports.push(raw.clone());
        }
    }
    imports
}
