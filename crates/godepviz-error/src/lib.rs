//! # godepviz-error
//!
//! Unified error handling for godepviz.
//!
//! ## Design Philosophy
//!
//! - **ErrorKind**: Know what went wrong (e.g. InvalidArgument, ResolutionFailed)
//! - **Error Context**: Locate the cause (which package, who imported it)
//! - **Error Source**: Wrap underlying errors without leaking raw types
//!
//! ## Usage
//!
//! ```rust
//! use godepviz_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::ResolutionFailed, "cannot find package")
//!         .with_operation("graph::visit")
//!         .with_context("package", "example.com/missing")
//!         .with_context("imported_by", "example.com/app"))
//! }
//! ```
//!
//! ## Principles
//!
//! - All library functions return `Result<T, godepviz_error::Error>`
//! - External errors are wrapped with `set_source(err)`
//! - Same error handled once, subsequent ops only append context
//! - Resolution is a deterministic local lookup, so nothing here is retried

mod error;
mod kind;

pub use error::Error;
pub use kind::ErrorKind;

/// Result type alias using godepviz Error
pub type Result<T> = std::result::Result<T, Error>;
