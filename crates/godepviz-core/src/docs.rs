//! Documentation links attached to rendered nodes.

const DOCS_INDEX: &str = "https://pkg.go.dev/";

/// Documentation URL for a canonical package path.
///
/// Repositories hosted on GitHub link to the repository root; everything else
/// links to the package documentation index. GitHub paths too short to name
/// a repository get no link.
pub fn docs_url(canonical_path: &str) -> Option<String> {
    if canonical_path.starts_with("github.") {
        let segments: Vec<&str> = canonical_path.splitn(4, '/').collect();
        if segments.len() < 3 {
            return None;
        }
        return Some(format!(
            "https://{}/{}/{}",
            segments[0], segments[1], segments[2]
        ));
    }
    Some(format!("{DOCS_INDEX}{canonical_path}"))
}
