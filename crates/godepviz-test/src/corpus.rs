use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use godepviz_core::PackageInfo;
use shell_words::{join, split};
use walkdir::WalkDir;

const CASE_BANNER: &str =
    "===============================================================================";

const CORPUS_EXTENSION: &str = "godep";

fn slugify_case_name(raw: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_dash = false;
        } else if !slug.is_empty() {
            pending_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        "case".to_string()
    } else {
        slug
    }
}

/// Top-level corpus container discovered under a directory (e.g. `tests/corpus`).
pub struct Corpus {
    files: Vec<CorpusFile>,
}

impl Corpus {
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let mut files = Vec::new();
        if !root.exists() {
            return Err(anyhow!("corpus root {} does not exist", root.display()));
        }

        for entry in WalkDir::new(&root)
            .into_iter()
            .filter_map(|res| res.ok())
            .filter(|entry| entry.file_type().is_file())
        {
            if entry.path().extension().and_then(|ext| ext.to_str()) != Some(CORPUS_EXTENSION) {
                continue;
            }

            let rel = entry
                .path()
                .strip_prefix(&root)
                .unwrap_or_else(|_| entry.path());
            let suite = rel.with_extension("").to_string_lossy().replace('\\', "/");
            let canonical = entry
                .path()
                .canonicalize()
                .with_context(|| format!("failed to resolve {}", entry.path().display()))?;
            let content = fs::read_to_string(&canonical)
                .with_context(|| format!("failed to read {}", canonical.display()))?;
            let cases = parse_corpus_file(&suite, &canonical, &content)?;
            files.push(CorpusFile {
                path: canonical,
                suite,
                cases,
                dirty: false,
            });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(Self { files })
    }

    pub fn files(&self) -> &[CorpusFile] {
        &self.files
    }

    pub fn files_mut(&mut self) -> &mut [CorpusFile] {
        &mut self.files
    }

    pub fn write_updates(&mut self) -> Result<()> {
        for file in &mut self.files {
            if file.dirty {
                let rendered = file.render();
                fs::write(&file.path, rendered)
                    .with_context(|| format!("failed to update {}", file.path.display()))?;
                file.dirty = false;
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct CorpusFile {
    pub path: PathBuf,
    pub suite: String,
    pub cases: Vec<CorpusCase>,
    pub(crate) dirty: bool,
}

impl CorpusFile {
    pub fn cases(&self) -> &[CorpusCase] {
        &self.cases
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn render(&self) -> String {
        let mut buf = String::new();
        for (idx, case) in self.cases.iter().enumerate() {
            if idx > 0 {
                buf.push_str("\n\n");
            }
            let rendered = case.render();
            buf.push_str(rendered.trim_end_matches('\n'));
        }
        buf.push('\n');
        buf
    }
}

#[derive(Debug, Clone)]
pub struct CorpusCase {
    pub suite: String,
    pub name: String,
    /// Command line after the program name.
    pub args: Vec<String>,
    pub packages: Vec<PackageFixture>,
    pub expectations: Vec<CorpusCaseExpectation>,
    /// Comment lines (starting with $//)
    pub comments: Vec<String>,
}

impl CorpusCase {
    pub fn id(&self) -> String {
        format!("{}::{}", self.suite, self.name)
    }

    pub fn expectation(&self, key: &str) -> Option<&str> {
        self.expectations
            .iter()
            .find(|entry| entry.kind == key)
            .map(|entry| entry.value.as_str())
    }

    /// Decode every fixture into resolver input.
    pub fn package_infos(&self) -> Result<Vec<PackageInfo>> {
        self.packages
            .iter()
            .map(|fixture| {
                fixture
                    .to_info()
                    .with_context(|| format!("in case {}", self.id()))
            })
            .collect()
    }

    pub fn render(&self) -> String {
        let mut buf = String::new();
        for comment in &self.comments {
            buf.push_str(comment);
            buf.push('\n');
        }
        buf.push_str(CASE_BANNER);
        buf.push('\n');
        buf.push_str(&self.name);
        buf.push('\n');
        buf.push_str(CASE_BANNER);
        buf.push('\n');
        buf.push('\n');
        if !self.args.is_empty() {
            buf.push_str(&format!("args: {}\n", join(&self.args)));
        }
        buf.push('\n');
        for package in &self.packages {
            buf.push_str(&format!("--- package: {} ---\n", package.path));
            push_section_body(&mut buf, &package.contents);
        }

        for expect in &self.expectations {
            buf.push_str(&format!("--- expect:{} ---\n", expect.kind));
            push_section_body(&mut buf, &expect.value);
        }

        buf
    }
}

fn push_section_body(buf: &mut String, body: &str) {
    buf.push_str(body);
    if !body.is_empty() && !body.ends_with('\n') {
        buf.push('\n');
    }
    buf.push('\n');
}

/// A package served by the case's resolver, declared as `key: value` lines.
///
/// Recognized keys: `imports`, `test-imports`, `xtest-imports`, `cgo-files`
/// (comma-separated lists), `std` (true/false), `root`, `dir` and `error`.
#[derive(Debug, Clone)]
pub struct PackageFixture {
    pub path: String,
    pub contents: String,
}

impl PackageFixture {
    pub fn to_info(&self) -> Result<PackageInfo> {
        let mut info = PackageInfo::new(self.path.clone());
        for line in self.contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (key, value) = line
                .split_once(':')
                .ok_or_else(|| anyhow!("package {}: expected 'key: value', got '{}'", self.path, line))?;
            let value = value.trim();
            match key.trim() {
                "imports" => info.imports = list(value),
                "test-imports" => info.test_imports = list(value),
                "xtest-imports" => info.xtest_imports = list(value),
                "cgo-files" => info.cgo_files = list(value),
                "std" => {
                    info.goroot = value
                        .parse()
                        .with_context(|| format!("package {}: bad std flag", self.path))?
                }
                "root" => info.root = value.to_string(),
                "dir" => info.dir = PathBuf::from(value),
                "error" => info.error = Some(value.to_string()),
                other => bail!("package {}: unsupported key '{}'", self.path, other),
            }
        }
        Ok(info)
    }
}

fn list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone)]
pub struct CorpusCaseExpectation {
    pub kind: String,
    pub value: String,
}

fn new_case(suite: &str, name: String, comments: Vec<String>) -> CorpusCase {
    CorpusCase {
        suite: suite.to_string(),
        name,
        args: Vec::new(),
        packages: Vec::new(),
        expectations: Vec::new(),
        comments,
    }
}

fn parse_corpus_file(suite: &str, path: &Path, content: &str) -> Result<Vec<CorpusCase>> {
    let mut cases = Vec::new();
    let mut current: Option<CorpusCase> = None;
    let mut pending_section: Option<SectionHeader> = None;
    let mut section_lines: Vec<String> = Vec::new();
    let mut awaiting_banner_name = false;
    let mut awaiting_banner_close = false;
    let mut pending_comments: Vec<String> = Vec::new();

    for raw_line in content.lines() {
        let line = raw_line.trim_end_matches('\r');
        let trimmed = line.trim();

        if trimmed.starts_with("$//") {
            pending_comments.push(line.to_string());
            continue;
        }

        if awaiting_banner_close {
            if trimmed.is_empty() {
                continue;
            }
            if is_banner_line(line) {
                awaiting_banner_close = false;
                continue;
            }
            return Err(anyhow!(
                "expected closing banner after case '{}' in {}",
                current
                    .as_ref()
                    .map(|c| c.name.as_str())
                    .unwrap_or("unknown"),
                path.display()
            ));
        }

        if awaiting_banner_name {
            if trimmed.is_empty() {
                continue;
            }

            finalize_section(&mut current, &mut pending_section, &mut section_lines)?;
            if let Some(case) = current.take() {
                cases.push(case);
            }

            current = Some(new_case(
                suite,
                slugify_case_name(trimmed),
                std::mem::take(&mut pending_comments),
            ));
            awaiting_banner_name = false;
            awaiting_banner_close = true;
            continue;
        }

        if is_banner_line(line) {
            finalize_section(&mut current, &mut pending_section, &mut section_lines)?;
            if let Some(case) = current.take() {
                cases.push(case);
            }
            awaiting_banner_name = true;
            continue;
        }

        if let Some(section) = parse_section_header(line) {
            finalize_section(&mut current, &mut pending_section, &mut section_lines)?;
            pending_section = Some(section);
            continue;
        }

        if pending_section.is_some() {
            section_lines.push(line.to_string());
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }

        let case = current.as_mut().ok_or_else(|| {
            anyhow!(
                "content encountered before case header in {}",
                path.display()
            )
        })?;

        match trimmed.split_once(':') {
            Some(("args", value)) => {
                case.args = split(value.trim())
                    .map_err(|err| anyhow!("invalid args in {}: {}", path.display(), err))?
            }
            Some((other, _)) => {
                return Err(anyhow!(
                    "unsupported metadata '{}' in {} case {}",
                    other.trim(),
                    path.display(),
                    case.name
                ));
            }
            None => {
                return Err(anyhow!(
                    "unexpected line '{}' in {} (within case {})",
                    line,
                    path.display(),
                    case.name
                ));
            }
        }
    }

    finalize_section(&mut current, &mut pending_section, &mut section_lines)?;
    if awaiting_banner_name || awaiting_banner_close {
        return Err(anyhow!(
            "unterminated banner in {} (missing case name or closing separator)",
            path.display()
        ));
    }
    if let Some(case) = current.take() {
        cases.push(case);
    }

    if cases.is_empty() {
        return Err(anyhow!(
            "corpus file {} does not contain any cases",
            path.display()
        ));
    }

    Ok(cases)
}

fn is_banner_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }
    trimmed.chars().all(|ch| ch == '=') && trimmed.len() >= 5
}

#[derive(Debug, Clone)]
enum SectionHeader {
    Package { path: String },
    Expect { kind: String },
}

fn parse_section_header(line: &str) -> Option<SectionHeader> {
    if !line.starts_with("---") || !line.ends_with("---") {
        return None;
    }

    let inner = line.trim_start_matches('-').trim_end_matches('-').trim();
    if let Some(rest) = inner.strip_prefix("package:") {
        return Some(SectionHeader::Package {
            path: rest.trim().to_string(),
        });
    }

    if let Some(rest) = inner.strip_prefix("expect:") {
        return Some(SectionHeader::Expect {
            kind: rest.trim().to_string(),
        });
    }

    None
}

fn finalize_section(
    current: &mut Option<CorpusCase>,
    pending: &mut Option<SectionHeader>,
    lines: &mut Vec<String>,
) -> Result<()> {
    let Some(section) = pending.take() else {
        lines.clear();
        return Ok(());
    };

    let case = current
        .as_mut()
        .ok_or_else(|| anyhow!("section declared before any case header"))?;

    // blank separator lines before the next header are not part of the body
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    let mut content = lines.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }

    match section {
        SectionHeader::Package { path } => {
            case.packages.push(PackageFixture {
                path,
                contents: content,
            });
        }
        SectionHeader::Expect { kind } => {
            case.expectations.push(CorpusCaseExpectation {
                kind,
                value: content,
            });
        }
    }

    lines.clear();
    Ok(())
}
