//! Package resolution through the Go toolchain.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use tracing::trace;

use godepviz_core::{BuildOptions, PackageInfo, PackageResolver};
use godepviz_error::{Error, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct GoListPackage {
    import_path: String,
    dir: PathBuf,
    root: String,
    goroot: bool,
    standard: bool,
    cgo_files: Vec<String>,
    imports: Vec<String>,
    test_imports: Vec<String>,
    #[serde(rename = "XTestImports")]
    xtest_imports: Vec<String>,
    error: Option<GoListError>,
}

#[derive(Debug, Deserialize)]
struct GoListError {
    #[serde(rename = "Err")]
    err: String,
}

/// Resolver running `go list -e -json` for every import path.
#[derive(Debug, Clone)]
pub struct GoListResolver {
    go: PathBuf,
}

impl GoListResolver {
    pub fn new() -> Self {
        Self::with_binary("go")
    }

    pub fn with_binary(go: impl Into<PathBuf>) -> Self {
        Self { go: go.into() }
    }

    fn command(&self, search_root: &Path, import_path: &str, options: &BuildOptions) -> Command {
        let mut cmd = Command::new(&self.go);
        cmd.args(["list", "-e", "-json"]);
        if !options.tags.is_empty() {
            cmd.arg("-tags").arg(options.tags.join(","));
        }
        cmd.arg(import_path);
        if !search_root.as_os_str().is_empty() {
            cmd.current_dir(search_root);
        }
        cmd
    }
}

impl Default for GoListResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageResolver for GoListResolver {
    fn resolve(
        &self,
        search_root: &Path,
        import_path: &str,
        options: &BuildOptions,
    ) -> Result<PackageInfo> {
        trace!("go list {} in {}", import_path, search_root.display());
        let output = self
            .command(search_root, import_path, options)
            .output()
            .map_err(|err| {
                Error::import_failed(format!("failed to run {}: {err}", self.go.display()))
                    .with_operation("golist::resolve")
                    .with_context("package", import_path)
                    .set_source(err)
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::resolution_failed(import_path, stderr.trim())
                .with_operation("golist::resolve"));
        }

        decode(import_path, &output.stdout)
    }
}

/// Decode one `go list -json` record.
pub fn decode(import_path: &str, stdout: &[u8]) -> Result<PackageInfo> {
    let pkg: GoListPackage = serde_json::from_slice(stdout).map_err(|err| {
        Error::import_failed(format!("undecodable go list output: {err}"))
            .with_operation("golist::decode")
            .with_context("package", import_path)
            .set_source(err)
    })?;

    if let Some(error) = pkg.error {
        return Err(Error::resolution_failed(import_path, error.err).with_operation("golist::decode"));
    }

    Ok(PackageInfo {
        import_path: pkg.import_path,
        dir: pkg.dir,
        root: pkg.root,
        goroot: pkg.goroot || pkg.standard,
        cgo_files: pkg.cgo_files,
        imports: pkg.imports,
        test_imports: pkg.test_imports,
        xtest_imports: pkg.xtest_imports,
        error: None,
    })
}
