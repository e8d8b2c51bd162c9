use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use godepviz_cli::{Cli, process};
use godepviz_core::StaticResolver;
use similar::TextDiff;

use crate::corpus::{Corpus, CorpusCase, CorpusFile};

#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    /// Only run cases whose id contains this substring.
    pub filter: Option<String>,
    /// Update expectation sections with current output (bless).
    pub update: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStatus {
    Passed,
    Failed,
    Updated,
    NoExpectations,
}

#[derive(Debug, Clone)]
pub struct CaseOutcome {
    pub id: String,
    pub status: CaseStatus,
    pub message: Option<String>,
}

pub fn run_cases(corpus: &mut Corpus, config: RunnerConfig) -> Result<Vec<CaseOutcome>> {
    let mut outcomes = Vec::new();
    let mut matched = 0usize;

    for file in corpus.files_mut() {
        outcomes.extend(run_cases_in_file(file, &config, &mut matched)?);
    }

    if matched == 0 {
        return Err(anyhow!(
            "no godepviz-test cases matched filter {:?}",
            config.filter
        ));
    }

    Ok(outcomes)
}

fn run_cases_in_file(
    file: &mut CorpusFile,
    config: &RunnerConfig,
    matched: &mut usize,
) -> Result<Vec<CaseOutcome>> {
    let mut file_outcomes = Vec::new();
    for idx in 0..file.cases.len() {
        let case_id = file.cases[idx].id();
        if let Some(term) = config.filter.as_deref() {
            if !case_id.contains(term) {
                continue;
            }
        }

        *matched += 1;
        print!("  {case_id} ... ");
        let _ = std::io::stdout().flush();

        let (outcome, mutated) = evaluate_case(&mut file.cases[idx], config.update)?;

        match outcome.status {
            CaseStatus::Passed => println!("ok"),
            CaseStatus::Updated => println!("updated"),
            CaseStatus::Failed => {
                println!("FAILED");
                if let Some(message) = &outcome.message {
                    for line in message.lines() {
                        println!("        {line}");
                    }
                }
            }
            CaseStatus::NoExpectations => println!("skipped (no expectations)"),
        }

        if mutated {
            file.mark_dirty();
        }
        file_outcomes.push(outcome);
    }
    Ok(file_outcomes)
}

fn evaluate_case(case: &mut CorpusCase, update: bool) -> Result<(CaseOutcome, bool)> {
    let case_id = case.id();

    if case.expectations.is_empty() {
        return Ok((
            CaseOutcome {
                id: case_id,
                status: CaseStatus::NoExpectations,
                message: Some("no expectation blocks declared".to_string()),
            },
            false,
        ));
    }

    let resolver = StaticResolver::new(case.package_infos()?);
    let mut mutated = false;
    let mut status = CaseStatus::Passed;
    let mut failures = Vec::new();

    for idx in 0..case.expectations.len() {
        let kind = case.expectations[idx].kind.clone();
        let actual = render_expectation(&kind, &case.args, &resolver)
            .with_context(|| format!("case {case_id}"))?;
        let expected_norm = normalize(&case.expectations[idx].value);
        let actual_norm = normalize(&actual);

        if expected_norm == actual_norm {
            continue;
        }

        if update {
            case.expectations[idx].value = ensure_trailing_newline(actual);
            mutated = true;
            status = CaseStatus::Updated;
        } else {
            status = CaseStatus::Failed;
            failures.push(format_expectation_diff(&kind, &expected_norm, &actual_norm));
        }
    }

    let message = if failures.is_empty() {
        None
    } else {
        Some(failures.join("\n"))
    };

    Ok((
        CaseOutcome {
            id: case_id,
            status,
            message,
        },
        mutated,
    ))
}

/// Produce the text an expectation of `kind` is compared against.
///
/// `dot` and `mermaid` force the output format; `error` runs the arguments as
/// given and captures the error display (or the diagram, if none occurred).
fn render_expectation(kind: &str, args: &[String], resolver: &StaticResolver) -> Result<String> {
    let mut cli = Cli::try_parse_from(std::iter::once("godepviz").chain(args.iter().map(String::as_str)))
        .map_err(|err| anyhow!("invalid args {:?}: {}", args, err))?;

    match kind {
        "dot" | "mermaid" => {
            cli.output.format = kind.to_string();
            Ok(match process(&cli, resolver, Path::new(".")) {
                Ok(text) => text,
                Err(err) => format!("unexpected error: {err}\n"),
            })
        }
        "error" => Ok(match process(&cli, resolver, Path::new(".")) {
            Ok(text) => text,
            Err(err) => format!("{err}\n"),
        }),
        other => Err(anyhow!("unknown expectation kind '{other}'")),
    }
}

fn format_expectation_diff(kind: &str, expected: &str, actual: &str) -> String {
    let diff = TextDiff::from_lines(expected, actual);
    let mut buf = String::new();
    let _ = writeln!(buf, "Expectation '{kind}' mismatch:");
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            similar::ChangeTag::Delete => "-",
            similar::ChangeTag::Insert => "+",
            similar::ChangeTag::Equal => " ",
        };
        let _ = write!(buf, "{sign}{change}");
    }
    buf
}

fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n").trim_end_matches('\n').to_string()
}

fn ensure_trailing_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
