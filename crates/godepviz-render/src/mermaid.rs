//! Mermaid flowchart output.

use std::fmt::Write;

use godepviz_core::{IdentityResolver, IdentityStyle, Package, PackageClass, docs_url};

use crate::{GraphPrinter, Layout};

const CLASS_DEFS: [(&str, &str); 4] = [
    ("stdlib", "#1D4"),
    ("cgo", "#D52"),
    ("vendored", "#D90"),
    ("errored", "#C10"),
];

fn class_name(class: PackageClass) -> Option<&'static str> {
    match class {
        PackageClass::StandardLibrary => Some("stdlib"),
        PackageClass::NativeInterop => Some("cgo"),
        PackageClass::Vendored => Some("vendored"),
        PackageClass::ResolutionError => Some("errored"),
        PackageClass::Ordinary => None,
    }
}

// Mermaid has no escape for quotes inside labels; it expects the HTML entity.
fn label(path: &str) -> String {
    path.replace('"', "#quot;")
}

/// Printer for the `mermaid` format. Nodes are numbered from 1.
pub struct MermaidWriter {
    output: String,
    ids: IdentityResolver,
}

impl MermaidWriter {
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            ids: IdentityResolver::new(IdentityStyle::Sequential { start: 1 }),
        }
    }
}

impl Default for MermaidWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphPrinter for MermaidWriter {
    fn identities(&mut self) -> &mut IdentityResolver {
        &mut self.ids
    }

    fn write_header(&mut self, layout: Layout) {
        let direction = match layout {
            Layout::Horizontal => "LR",
            Layout::Vertical => "TD",
        };
        let _ = writeln!(self.output, "flowchart {direction}");
        self.output.push('\n');
        for (name, fill) in CLASS_DEFS {
            let _ = writeln!(self.output, "classDef {name} fill:{fill},color:white");
        }
    }

    fn write_node(&mut self, pkg: &Package, id: &str) {
        self.output.push('\n');
        let _ = writeln!(self.output, "{id}[\"{}\"]", label(&pkg.canonical_path));
        if let Some(url) = docs_url(&pkg.canonical_path) {
            let _ = writeln!(self.output, "click {id} href \"{url}\"");
        }
        if let Some(class) = class_name(pkg.classify()) {
            let _ = writeln!(self.output, "class {id} {class}");
        }
    }

    fn write_edge(&mut self, from: &str, to: &str) {
        let _ = writeln!(self.output, "{from} --> {to}");
    }

    fn write_end(&mut self) {}

    fn finish(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use godepviz_core::PackageInfo;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_declares_every_class() {
        let mut mermaid = MermaidWriter::new();
        mermaid.write_header(Layout::Vertical);
        assert_eq!(
            mermaid.finish(),
            "flowchart TD\n\nclassDef stdlib fill:#1D4,color:white\nclassDef cgo fill:#D52,color:white\nclassDef vendored fill:#D90,color:white\nclassDef errored fill:#C10,color:white\n"
        );
    }

    #[test]
    fn test_cgo_node() {
        let mut mermaid = MermaidWriter::new();
        let pkg = Package::resolved(
            PackageInfo::new("github.com/mattn/go-sqlite3").with_cgo_files(["sqlite3.go"]),
            false,
        );
        let id = mermaid.identities().assign(&pkg.canonical_path);
        mermaid.write_node(&pkg, &id);
        assert_eq!(
            mermaid.finish(),
            "\n1[\"github.com/mattn/go-sqlite3\"]\nclick 1 href \"https://github.com/mattn/go-sqlite3\"\nclass 1 cgo\n"
        );
    }

    #[test]
    fn test_ordinary_node_has_no_class() {
        let mut mermaid = MermaidWriter::new();
        let pkg = Package::resolved(PackageInfo::new("example.com/a"), false);
        mermaid.write_node(&pkg, "7");
        mermaid.write_edge("7", "8");
        assert_eq!(
            mermaid.finish(),
            "\n7[\"example.com/a\"]\nclick 7 href \"https://pkg.go.dev/example.com/a\"\n7 --> 8\n"
        );
    }
}
