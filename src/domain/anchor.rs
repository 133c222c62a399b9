//! Byte-offset bookkeeping over one file's text.

use crate::domain::tree::Span;

/// Line table and identifier search for a source file.
#[derive(Debug, Clone)]
pub struct Positions<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> Positions<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { text, line_starts }
    }

    /// 1-based line containing `offset`; negative offsets map to line 0.
    pub fn line_of(&self, offset: i64) -> usize {
        if offset < 0 {
            return 0;
        }
        let offset = offset as usize;
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }

    /// Span of the first whole-word occurrence of `name` at or after `start`.
    pub fn find_identifier(&self, name: &str, start: i64) -> Option<Span> {
        if name.is_empty() || start < 0 {
            return None;
        }
        let start = start as usize;
        if start > self.text.len() || !self.text.is_char_boundary(start) {
            return None;
        }
        let bytes = self.text.as_bytes();
        let mut from = start;
        while let Some(found) = self.text[from..].find(name) {
            let begin = from + found;
            let end = begin + name.len();
            let before_ok = begin == 0 || !is_ident_byte(bytes[begin - 1]);
            let after_ok = end >= bytes.len() || !is_ident_byte(bytes[end]);
            if before_ok && after_ok {
                return Some(Span::new(begin as i64, end as i64));
            }
            from = begin + name.len();
        }
        None
    }

    /// Source text under `span`, if the span is valid and in range.
    pub fn text_of(&self, span: Span) -> Option<&'a str> {
        if !span.is_valid() {
            return None;
        }
        self.text.get(span.start as usize..span.end as usize)
    }

    /// A span is anchorable if valid and within the file.
    pub fn is_anchorable(&self, span: Span) -> bool {
        span.is_valid() && (span.end as usize) <= self.text.len()
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_one_based() {
        let pos = Positions::new("a\nbc\n\nd");
        assert_eq!(pos.line_of(0), 1);
        assert_eq!(pos.line_of(1), 1);
        assert_eq!(pos.line_of(2), 2);
        assert_eq!(pos.line_of(5), 3);
        assert_eq!(pos.line_of(6), 4);
        assert_eq!(pos.line_of(-1), 0);
    }

    #[test]
    fn identifier_search_respects_word_boundaries() {
        let pos = Positions::new("class Foobar extends Foo {}");
        assert_eq!(pos.find_identifier("Foo", 0), Some(Span::new(21, 24)));
        assert_eq!(pos.find_identifier("Foobar", 0), Some(Span::new(6, 12)));
        assert_eq!(pos.find_identifier("Foo", 25), None);
        assert_eq!(pos.find_identifier("Foo", -1), None);
    }

    #[test]
    fn text_of_rejects_invalid_spans() {
        let pos = Positions::new("int x = 1;");
        assert_eq!(pos.text_of(Span::new(4, 5)), Some("x"));
        assert_eq!(pos.text_of(Span::new(5, 4)), None);
        assert_eq!(pos.text_of(Span::new(4, 99)), None);
        assert!(!pos.is_anchorable(Span::new(0, 99)));
    }
}
