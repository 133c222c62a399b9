//! Comment attribution and documentation text helpers.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::domain::anchor::Positions;
use crate::domain::tree::{Comment, Span};

static LEADING_MARKER: OnceLock<Regex> = OnceLock::new();
static TRAILING_MARKER: OnceLock<Regex> = OnceLock::new();

/// Line-indexed comments plus first-claim-wins ownership of each line.
#[derive(Debug, Default)]
pub struct CommentClaimTable {
    by_line: HashMap<usize, Vec<String>>,
    claims: HashMap<usize, usize>,
}

impl CommentClaimTable {
    /// Indexes every comment under each line it spans.
    pub fn new(comments: &[Comment], positions: &Positions<'_>) -> Self {
        let mut by_line: HashMap<usize, Vec<String>> = HashMap::new();
        for comment in comments {
            if !comment.span.is_valid() {
                continue;
            }
            let first = positions.line_of(comment.span.start);
            let last = positions.line_of(comment.span.end.max(comment.span.start + 1) - 1);
            for line in first..=last.max(first) {
                by_line.entry(line).or_default().push(comment.text.clone());
            }
        }
        Self {
            by_line,
            claims: HashMap::new(),
        }
    }

    /// Claims `line` for the declaration on `def_line` and returns the comments on it.
    ///
    /// Returns `None` if there are no comments on the line or another declaration
    /// claimed it first.
    pub fn claim(&mut self, line: usize, def_line: usize) -> Option<&[String]> {
        let comments = self.by_line.get(&line)?;
        let owner = *self.claims.entry(line).or_insert(def_line);
        if owner != def_line {
            return None;
        }
        Some(comments.as_slice())
    }

    /// Unconditionally records `def_line` as the claimant of `line`.
    pub fn force_claim(&mut self, line: usize, def_line: usize) {
        self.claims.insert(line, def_line);
    }

    pub fn claimant(&self, line: usize) -> Option<usize> {
        self.claims.get(&line).copied()
    }

    pub fn comments_on(&self, line: usize) -> &[String] {
        self.by_line.get(&line).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Removes the `//`, `/*` and `*/` markers around a comment.
pub fn strip_comment_markers(text: &str) -> String {
    let leading =
        LEADING_MARKER.get_or_init(|| Regex::new(r"^(//|/\*) ?").expect("valid regex"));
    let trailing = TRAILING_MARKER.get_or_init(|| Regex::new(r" ?\*/$").expect("valid regex"));
    let stripped = leading.replace(text, "");
    trailing.replace(&stripped, "").into_owned()
}

/// Escapes `[`, `]` and `\` and wraps each byte range of `links` in brackets.
pub fn bracket_text(text: &str, links: &[(usize, usize)]) -> String {
    let mut links = links.to_vec();
    links.sort_unstable();
    let mut out = String::with_capacity(text.len() + links.len() * 2);
    let mut opens = links.iter().map(|(s, _)| *s).peekable();
    let mut closes = links.iter().map(|(_, e)| *e).collect::<Vec<_>>();
    closes.sort_unstable();
    let mut closes = closes.into_iter().peekable();

    for (idx, ch) in text.char_indices() {
        while closes.next_if(|e| *e <= idx).is_some() {
            out.push(']');
        }
        while opens.next_if(|s| *s <= idx).is_some() {
            out.push('[');
        }
        if matches!(ch, '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    for _ in closes {
        out.push(']');
    }
    out
}

/// One reference to a symbol inside a documentation comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocReference {
    /// Referenced name as written (`Foo`, `a.b.Foo`, `Foo#bar`).
    pub target: String,
    /// Location of the reference in the file.
    pub span: Span,
    /// Byte range of the reference inside [`ScannedDoc::text`].
    pub text_range: (usize, usize),
}

/// Result of parsing one documentation comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedDoc {
    /// Comment body with markers and leading stars removed.
    pub text: String,
    pub deprecation: Option<String>,
    pub references: Vec<DocReference>,
}
