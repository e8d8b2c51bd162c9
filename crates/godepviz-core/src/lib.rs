pub mod docs;
pub mod filter;
pub mod graph_builder;
pub mod identity;
pub mod package;
pub mod resolver;

pub use docs::docs_url;
pub use filter::{Filter, FilterConfig};
pub use godepviz_error::{Error, ErrorKind, Result};
pub use graph_builder::{DepGraph, GraphBuilder, GraphConfig, build_dep_graph};
pub use identity::{IdentityResolver, IdentityStyle, is_vendored, normalize};
pub use package::{Package, PackageClass};
pub use resolver::{BuildOptions, PackageInfo, PackageResolver, StaticResolver};
