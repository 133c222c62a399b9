use crate::domain::comments::{DocReference, ScannedDoc};
use crate::domain::ports::DocCommentScanner;
use crate::domain::tree::{DocComment, Span};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

fn link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{@link(?:plain)?\s+([^\s}]+)[^}]*\}").expect("link regex"))
}

fn see_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?m)^@see\s+([^\s<"]+)"#).expect("see regex"))
}

fn deprecated_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?ms)^@deprecated\b[ \t]*(.*?)(?:^@|\z)").expect("deprecated regex"))
}

/// Javadoc-style doc comment scanner: `{@link}`/`{@linkplain}`/`@see` references and
/// the `@deprecated` block tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct JavadocScanner;

impl JavadocScanner {
    pub fn new() -> Self {
        Self
    }
}

impl DocCommentScanner for JavadocScanner {
    fn scan(&self, path: &[&str], comment: &DocComment) -> ScannedDoc {
        let (text, offsets) = clean(&comment.text);

        let mut references = Vec::new();
        let captures = link_regex()
            .captures_iter(&text)
            .chain(see_regex().captures_iter(&text));
        for cap in captures {
            let Some(target) = cap.get(1) else {
                continue;
            };
            let span = if comment.span.is_valid() && target.end() > target.start() {
                let start = offsets[target.start()] as i64;
                let end = offsets[target.end() - 1] as i64 + 1;
                Span::new(comment.span.start + start, comment.span.start + end)
            } else {
                Span::ABSENT
            };
            references.push(DocReference {
                target: target.as_str().to_string(),
                span,
                text_range: (target.start(), target.end()),
            });
        }
        references.sort_by_key(|r| r.text_range);

        let deprecation = deprecated_regex()
            .captures(&text)
            .map(|cap| cap.get(1).map_or("", |m| m.as_str()).trim().to_string());

        debug!(
            path = %path.join("/"),
            references = references.len(),
            deprecated = deprecation.is_some(),
            "scanned doc comment"
        );
        ScannedDoc {
            text,
            deprecation,
            references,
        }
    }
}

/// Strips comment delimiters and leading `*` decoration.
///
/// Returns the cleaned text and, for each of its bytes, the byte offset in `raw`.
fn clean(raw: &str) -> (String, Vec<usize>) {
    let start = if raw.starts_with("/**") {
        3
    } else if raw.starts_with("/*") {
        2
    } else {
        0
    };
    let end = raw.rfind("*/").filter(|e| *e >= start).unwrap_or(raw.len());

    let mut out = String::with_capacity(end - start);
    let mut offsets = Vec::with_capacity(end - start);
    let mut line_start = true;
    let mut skipped_star = false;

    for (idx, ch) in raw[start..end].char_indices() {
        let idx = idx + start;
        if line_start {
            if ch == ' ' || ch == '\t' {
                continue;
            }
            if ch == '*' && !skipped_star {
                skipped_star = true;
                continue;
            }
            line_start = false;
        }
        if ch == '\n' {
            line_start = true;
            skipped_star = false;
        }
        out.push(ch);
        offsets.extend((0..ch.len_utf8()).map(|k| idx + k));
    }

    let trimmed_end = out.trim_end().len();
    out.truncate(trimmed_end);
    offsets.truncate(trimmed_end);
    let leading = out.len() - out.trim_start().len();
    out.drain(..leading);
    offsets.drain(..leading);
    (out, offsets)
}
