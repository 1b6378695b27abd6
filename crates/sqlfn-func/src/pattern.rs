//! SQL `LIKE` pattern compilation and matching.
//!
//! A pattern is compiled once into a flat token list and can then be matched
//! against any number of subjects.
//!
//! - `%` matches zero or more characters; consecutive `%` collapse.
//! - `_` matches exactly one character.
//! - Every other character is a literal, including `.`, `*`, `\`, `(`, `)`,
//!   `[` and `]`. Nothing is handed to a regular-expression engine.
//! - Matching is exact per character (no case folding) and anchored at both
//!   ends.
//!
//! Compilation is total: every string is a valid pattern.
//!
//! Matching is iterative and only ever resumes from the latest `%`, so
//! patterns that alternate many `%` with literals stay polynomial in the
//! subject length and never grow the call stack.

use std::fmt;

use tracing::trace;

/// One unit of a compiled `LIKE` pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternToken {
    /// A run of characters that must match exactly.
    Literal(String),
    /// `_`: exactly one character.
    AnyOne,
    /// `%`: zero or more characters.
    AnyRun,
}

/// A compiled `LIKE` pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LikePattern {
    tokens: Vec<PatternToken>,
}

impl LikePattern {
    /// Compile `pattern` with no escape character.
    #[must_use]
    pub fn compile(pattern: &str) -> Self {
        Self::compile_with_escape(pattern, None)
    }

    /// Compile `pattern`, treating `escape` (SQL `LIKE ... ESCAPE 'c'`) as
    /// the escape marker.
    ///
    /// The character following the escape marker is always a literal. A
    /// trailing escape marker with nothing after it is a literal itself.
    #[must_use]
    pub fn compile_with_escape(pattern: &str, escape: Option<char>) -> Self {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars();

        while let Some(c) = chars.next() {
            if Some(c) == escape {
                literal.push(chars.next().unwrap_or(c));
                continue;
            }
            match c {
                '%' => {
                    flush_literal(&mut tokens, &mut literal);
                    if tokens.last() != Some(&PatternToken::AnyRun) {
                        tokens.push(PatternToken::AnyRun);
                    }
                }
                '_' => {
                    flush_literal(&mut tokens, &mut literal);
                    tokens.push(PatternToken::AnyOne);
                }
                _ => literal.push(c),
            }
        }
        flush_literal(&mut tokens, &mut literal);

        trace!(pattern, tokens = tokens.len(), "compiled LIKE pattern");
        Self { tokens }
    }

    /// Build a pattern directly from tokens.
    ///
    /// Adjacent literals are merged, empty literals dropped and consecutive
    /// `AnyRun` collapsed, so the result equals what [`compile`](Self::compile)
    /// would produce for the equivalent pattern text.
    #[must_use]
    pub fn from_tokens(tokens: impl IntoIterator<Item = PatternToken>) -> Self {
        let mut out = Vec::new();
        let mut literal = String::new();
        for token in tokens {
            match token {
                PatternToken::Literal(s) => literal.push_str(&s),
                PatternToken::AnyRun => {
                    flush_literal(&mut out, &mut literal);
                    if out.last() != Some(&PatternToken::AnyRun) {
                        out.push(PatternToken::AnyRun);
                    }
                }
                PatternToken::AnyOne => {
                    flush_literal(&mut out, &mut literal);
                    out.push(PatternToken::AnyOne);
                }
            }
        }
        flush_literal(&mut out, &mut literal);
        Self { tokens: out }
    }

    pub fn tokens(&self) -> &[PatternToken] {
        &self.tokens
    }

    /// Concatenation of all literal tokens, i.e. the pattern text with
    /// wildcards removed and escapes resolved.
    pub fn literal_text(&self) -> String {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                PatternToken::Literal(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn has_wildcards(&self) -> bool {
        self.tokens
            .iter()
            .any(|t| !matches!(t, PatternToken::Literal(_)))
    }

    /// Minimum number of subject characters any match needs.
    pub fn min_len(&self) -> usize {
        self.tokens
            .iter()
            .map(|t| match t {
                PatternToken::Literal(s) => s.chars().count(),
                PatternToken::AnyOne => 1,
                PatternToken::AnyRun => 0,
            })
            .sum()
    }

    /// Whether the whole of `subject` matches this pattern.
    pub fn matches(&self, subject: &str) -> bool {
        match self.tokens.as_slice() {
            [] => return subject.is_empty(),
            [PatternToken::AnyRun] => return true,
            [PatternToken::Literal(lit)] => return lit == subject,
            _ => {}
        }

        let mut matcher = Matcher::new(&self.tokens, subject);
        let matched = matcher.run();
        trace!(
            tokens = self.tokens.len(),
            subject_len = subject.len(),
            resumes = matcher.resumes,
            matched,
            "LIKE match"
        );
        matched
    }
}

impl fmt::Display for LikePattern {
    /// Renders the pattern back to `LIKE` syntax, using `\` to escape
    /// literal `%`, `_` and `\`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            match token {
                PatternToken::Literal(s) => {
                    for c in s.chars() {
                        if matches!(c, '%' | '_' | '\\') {
                            f.write_str("\\")?;
                        }
                        write!(f, "{c}")?;
                    }
                }
                PatternToken::AnyOne => f.write_str("_")?,
                PatternToken::AnyRun => f.write_str("%")?,
            }
        }
        Ok(())
    }
}

fn flush_literal(tokens: &mut Vec<PatternToken>, literal: &mut String) {
    if !literal.is_empty() {
        tokens.push(PatternToken::Literal(std::mem::take(literal)));
    }
}

/// Greedy matcher over byte offsets of `subject` (always on char
/// boundaries). Only the most recent `%` is ever resumed: a later `%` can
/// absorb anything an earlier one would have, so older resume points are
/// dropped. Runs in O(pattern × subject) time with constant extra space.
struct Matcher<'a> {
    tokens: &'a [PatternToken],
    subject: &'a str,
    /// Number of times matching resumed from a `%`.
    resumes: usize,
}

impl<'a> Matcher<'a> {
    const fn new(tokens: &'a [PatternToken], subject: &'a str) -> Self {
        Self {
            tokens,
            subject,
            resumes: 0,
        }
    }

    /// Byte offset after matching the non-`%` token at `ti` from `pos`.
    fn step(&self, ti: usize, pos: usize) -> Option<usize> {
        let rest = &self.subject[pos..];
        match &self.tokens[ti] {
            PatternToken::Literal(lit) => {
                rest.starts_with(lit.as_str()).then_some(pos + lit.len())
            }
            PatternToken::AnyOne => rest.chars().next().map(|c| pos + c.len_utf8()),
            PatternToken::AnyRun => Some(pos),
        }
    }

    fn run(&mut self) -> bool {
        let tokens = self.tokens;
        let (mut ti, mut pos) = (0, 0);
        // (token after the last `%`, subject offset that `%` currently ends at)
        let mut resume: Option<(usize, usize)> = None;

        loop {
            if ti < tokens.len() {
                if tokens[ti] == PatternToken::AnyRun {
                    if ti + 1 == tokens.len() {
                        return true;
                    }
                    resume = Some((ti + 1, pos));
                    ti += 1;
                    continue;
                }
                if let Some(next) = self.step(ti, pos) {
                    pos = next;
                    ti += 1;
                    continue;
                }
            } else if pos == self.subject.len() {
                return true;
            }

            // Mismatch: let the last `%` swallow one more character.
            let Some((after_run, run_end)) = resume else {
                return false;
            };
            let Some(c) = self.subject[run_end..].chars().next() else {
                return false;
            };
            let run_end = run_end + c.len_utf8();
            self.resumes += 1;
            resume = Some((after_run, run_end));
            ti = after_run;
            pos = run_end;
        }
    }
}
