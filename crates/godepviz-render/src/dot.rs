//! GraphViz DOT output.

use std::fmt::Write;

use godepviz_core::{IdentityResolver, IdentityStyle, Package, PackageClass, docs_url};

use crate::{GraphPrinter, Layout};

const GRAPH_NAME: &str = "godep";

/// Escape special characters for DOT labels.
pub fn escape_label(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn fill_color(class: PackageClass) -> &'static str {
    match class {
        PackageClass::StandardLibrary => "palegreen",
        PackageClass::NativeInterop => "darkgoldenrod1",
        PackageClass::Vendored => "palegoldenrod",
        PackageClass::ResolutionError => "red",
        PackageClass::Ordinary => "paleturquoise",
    }
}

fn write_indent(output: &mut String, level: usize) {
    for _ in 0..level {
        output.push_str("  ");
    }
}

/// Printer for the `dot` format. Nodes are referenced by their quoted path.
pub struct DotWriter {
    output: String,
    indent: usize,
    ids: IdentityResolver,
}

impl DotWriter {
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            indent: 1,
            ids: IdentityResolver::new(IdentityStyle::Quoted),
        }
    }

    fn attr(&mut self, key: &str, value: &str) {
        write_indent(&mut self.output, self.indent);
        let _ = writeln!(self.output, "{}=\"{}\";", key, escape_label(value));
    }

    fn defaults(&mut self, target: &str, attrs: &[(&str, &str)]) {
        write_indent(&mut self.output, self.indent);
        let _ = write!(self.output, "{target} [");
        self.write_attrs(attrs);
        self.output.push_str("];\n");
    }

    fn write_attrs(&mut self, attrs: &[(&str, &str)]) {
        for (i, (key, value)) in attrs.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            let _ = write!(self.output, "{}=\"{}\"", key, escape_label(value));
        }
    }
}

impl Default for DotWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphPrinter for DotWriter {
    fn identities(&mut self) -> &mut IdentityResolver {
        &mut self.ids
    }

    fn write_header(&mut self, layout: Layout) {
        let _ = writeln!(self.output, "digraph {GRAPH_NAME} {{");
        if layout == Layout::Horizontal {
            self.attr("rankdir", "LR");
        }
        self.attr("splines", "ortho");
        self.attr("nodesep", "0.4");
        self.attr("ranksep", "0.8");
        self.defaults("node", &[("shape", "box"), ("style", "rounded,filled")]);
        self.defaults("edge", &[("arrowsize", "0.5")]);
        self.output.push('\n');
    }

    fn write_node(&mut self, pkg: &Package, id: &str) {
        let color = fill_color(pkg.classify());
        let url = docs_url(&pkg.canonical_path);

        let mut attrs = vec![("label", pkg.canonical_path.as_str()), ("color", color)];
        if let Some(url) = url.as_deref() {
            attrs.push(("URL", url));
            attrs.push(("target", "_blank"));
        }

        write_indent(&mut self.output, self.indent);
        self.output.push_str(id);
        self.output.push('[');
        self.write_attrs(&attrs);
        self.output.push_str("];\n");
    }

    fn write_edge(&mut self, from: &str, to: &str) {
        write_indent(&mut self.output, self.indent);
        let _ = writeln!(self.output, "{from} -> {to};");
    }

    fn write_end(&mut self) {
        self.output.push_str("}\n");
    }

    fn finish(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}
