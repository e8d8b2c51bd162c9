//! Error kinds for godepviz operations

use strum_macros::{Display, IntoStaticStr};

/// The kind of error that occurred.
///
/// Callers match on `ErrorKind` to tell user input mistakes apart from
/// packages the resolver could not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // Input errors
    // =========================================================================
    /// Invalid argument (missing root package, bad flag value)
    InvalidArgument,

    /// Output format selector names no known diagram dialect
    UnsupportedFormat,

    // =========================================================================
    // Resolution errors
    // =========================================================================
    /// The package resolver could not resolve an import path
    ResolutionFailed,

    /// The resolver backend itself failed (could not run, bad output)
    ImportFailed,

    // =========================================================================
    // File/IO errors
    // =========================================================================
    /// File not found
    FileNotFound,

    /// Permission denied
    PermissionDenied,

    /// IO operation failed
    IoFailed,

    // =========================================================================
    // Serialization errors
    // =========================================================================
    /// Deserialization failed (package manifests, resolver output)
    DeserializationFailed,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Check if this kind stems from user input rather than the package tree
    pub fn is_input_error(&self) -> bool {
        matches!(self, ErrorKind::InvalidArgument | ErrorKind::UnsupportedFormat)
    }
}
