//! Canonical package identities and per-format node ids.

use std::collections::HashMap;

/// Path segment marking a locally copied dependency tree.
pub const VENDOR_SEGMENT: &str = "vendor/";

const NESTED_VENDOR_SEGMENT: &str = "/vendor/";

/// Strip everything up to and including the last vendoring segment.
///
/// `a/vendor/b/vendor/c` and `vendor/c` both normalize to `c`; paths without
/// a vendoring segment are returned unchanged.
pub fn normalize(raw: &str) -> &str {
    match raw.rfind(NESTED_VENDOR_SEGMENT) {
        Some(idx) => &raw[idx + NESTED_VENDOR_SEGMENT.len()..],
        None => raw.strip_prefix(VENDOR_SEGMENT).unwrap_or(raw),
    }
}

/// Whether the raw import path points into a vendored tree.
pub fn is_vendored(raw: &str) -> bool {
    raw.starts_with(VENDOR_SEGMENT) || raw.contains(NESTED_VENDOR_SEGMENT)
}

/// How a renderer spells node references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityStyle {
    /// Monotonically increasing integers beginning at `start`.
    Sequential { start: usize },
    /// The package path itself as a double-quoted literal.
    Quoted,
}

/// Memo table handing out one stable identity per canonical path.
///
/// Every renderer owns its own instance, so identity spaces of different
/// output formats never mix.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    style: IdentityStyle,
    ids: HashMap<String, String>,
    next: usize,
}

impl IdentityResolver {
    pub fn new(style: IdentityStyle) -> Self {
        let next = match style {
            IdentityStyle::Sequential { start } => start,
            IdentityStyle::Quoted => 0,
        };
        Self {
            style,
            ids: HashMap::new(),
            next,
        }
    }

    pub fn style(&self) -> IdentityStyle {
        self.style
    }

    /// Return the identity of `path`, allocating one on first use.
    pub fn assign(&mut self, path: &str) -> String {
        if let Some(id) = self.ids.get(path) {
            return id.clone();
        }

        let id = match self.style {
            IdentityStyle::Sequential { .. } => {
                let id = self.next.to_string();
                self.next += 1;
                id
            }
            IdentityStyle::Quoted => quote(path),
        };
        debug_assert!(
            !self.ids.values().any(|existing| *existing == id),
            "identity {id} handed out twice"
        );
        self.ids.insert(path.to_string(), id.clone());
        id
    }

    /// Look up an already assigned identity.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.ids.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

fn quote(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 2);
    out.push('"');
    for ch in path.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}
