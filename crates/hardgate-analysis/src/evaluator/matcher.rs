//! Compiled gate patterns.
//!
//! Patterns are compiled per evaluation so a malformed body only fails the
//! gate that declares it.

use aho_corasick::AhoCorasick;
use hardgate_core::errors::GateEvaluationError;
use regex::{Regex, RegexBuilder};

use crate::gates::{Pattern, PatternKind, PatternTarget, Polarity};

/// Compiled regexes larger than this are rejected as malformed.
const REGEX_SIZE_LIMIT: usize = 1 << 20;

enum Matcher {
    Literal(AhoCorasick),
    Regex(Regex),
    Window {
        anchor: Regex,
        context: Regex,
        lines: usize,
    },
}

/// A pattern ready to run against file bodies and paths.
pub struct CompiledPattern {
    pub id: String,
    pub polarity: Polarity,
    pub target: PatternTarget,
    /// Score points of a first hit in a file.
    pub weight: f64,
    matcher: Matcher,
}

impl CompiledPattern {
    /// Compile `pattern`. `default_weight` applies when the pattern carries none.
    pub fn compile(pattern: &Pattern, default_weight: f64) -> Result<Self, GateEvaluationError> {
        let malformed = |message: String| GateEvaluationError::MalformedPattern {
            pattern_id: pattern.id.clone(),
            message,
        };
        let matcher = match &pattern.matcher {
            PatternKind::Literal(body) => {
                if body.is_empty() {
                    return Err(malformed("empty literal".to_string()));
                }
                let ac = AhoCorasick::builder()
                    .ascii_case_insensitive(true)
                    .build([body.as_str()])
                    .map_err(|e| malformed(e.to_string()))?;
                Matcher::Literal(ac)
            }
            PatternKind::Regex(body) => Matcher::Regex(build_regex(body).map_err(malformed)?),
            PatternKind::Window {
                anchor,
                context,
                lines,
            } => Matcher::Window {
                anchor: build_regex(anchor).map_err(|m| malformed(format!("anchor: {m}")))?,
                context: build_regex(context).map_err(|m| malformed(format!("context: {m}")))?,
                lines: *lines as usize,
            },
        };
        Ok(Self {
            id: pattern.id.clone(),
            polarity: pattern.polarity,
            target: pattern.target,
            weight: pattern.weight.unwrap_or(default_weight),
            matcher,
        })
    }

    /// True when the file path matches. Window patterns match a path when the
    /// anchor and the context both do.
    pub fn matches_path(&self, path: &str) -> bool {
        match &self.matcher {
            Matcher::Literal(ac) => ac.is_match(path),
            Matcher::Regex(re) => re.is_match(path),
            Matcher::Window {
                anchor, context, ..
            } => anchor.is_match(path) && context.is_match(path),
        }
    }

    /// 1-based numbers of matching lines, ascending.
    pub fn matching_lines(&self, lines: &[&str]) -> Vec<usize> {
        match &self.matcher {
            Matcher::Literal(ac) => hits(lines, |l| ac.is_match(l)),
            Matcher::Regex(re) => hits(lines, |l| re.is_match(l)),
            Matcher::Window {
                anchor,
                context,
                lines: reach,
            } => {
                let context_lines: Vec<bool> = lines.iter().map(|l| context.is_match(l)).collect();
                lines
                    .iter()
                    .enumerate()
                    .filter(|(i, line)| {
                        anchor.is_match(line) && {
                            let lo = i.saturating_sub(*reach);
                            let hi = (i + reach).min(lines.len() - 1);
                            context_lines[lo..=hi].iter().any(|&m| m)
                        }
                    })
                    .map(|(i, _)| i + 1)
                    .collect()
            }
        }
    }
}

fn hits(lines: &[&str], is_match: impl Fn(&str) -> bool) -> Vec<usize> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, l)| is_match(l))
        .map(|(i, _)| i + 1)
        .collect()
}

fn build_regex(body: &str) -> Result<Regex, String> {
    if body.is_empty() {
        return Err("empty expression".to_string());
    }
    RegexBuilder::new(body)
        .case_insensitive(true)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|e| e.to_string())
}
