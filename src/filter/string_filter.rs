use memchr::memmem;
use regex::{Regex, RegexBuilder};

use super::{Filter, MatchOutcome, Span};
use crate::error::InvalidPattern;

/// Plain substring filter
///
/// Case-sensitive search runs on raw bytes with `memmem`. Case-insensitive
/// search goes through an escaped literal regex so Unicode case folding
/// reports offsets in the original text rather than in a lowercased copy.
pub struct StringFilter {
    pattern: String,
    matcher: Matcher,
}

enum Matcher {
    Exact(memmem::Finder<'static>),
    Folded(Regex),
}

impl StringFilter {
    pub fn new(pattern: &str, case_sensitive: bool) -> Result<Self, InvalidPattern> {
        let matcher = if case_sensitive {
            Matcher::Exact(memmem::Finder::new(pattern.as_bytes()).into_owned())
        } else {
            let regex = RegexBuilder::new(&regex::escape(pattern))
                .case_insensitive(true)
                .build()
                .map_err(|e| InvalidPattern::from((pattern, e)))?;
            Matcher::Folded(regex)
        };

        Ok(Self {
            pattern: pattern.to_string(),
            matcher,
        })
    }

    /// Find the first occurrence at or after `from`, as (start, len).
    fn find_from(&self, text: &str, from: usize) -> Option<(usize, usize)> {
        match &self.matcher {
            Matcher::Exact(finder) => finder
                .find(&text.as_bytes()[from..])
                .map(|offset| (from + offset, self.pattern.len())),
            Matcher::Folded(regex) => regex.find_at(text, from).map(|m| (m.start(), m.len())),
        }
    }

    /// Scan left to right; after each hit, resume one pattern length further
    /// (at least one byte) so the scan always advances.
    ///
    /// Case folding can match text whose byte length differs from the
    /// pattern's (`k` matches the 3-byte Kelvin sign), so the resume point is
    /// rounded up to the next char boundary. Overlaps this leaves are dropped
    /// by [`MatchOutcome::from_spans`].
    pub fn find_spans(&self, text: &str) -> Vec<Span> {
        let step = self.pattern.len().max(1);
        let mut spans = Vec::new();
        let mut from = 0;

        while from < text.len() {
            let Some((start, len)) = self.find_from(text, from) else {
                break;
            };
            if len == 0 {
                break;
            }
            spans.push(Span::new(start, len));
            from = next_char_boundary(text, start + step);
        }

        spans
    }
}

fn next_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

impl Filter for StringFilter {
    fn evaluate(&self, text: &str) -> Result<MatchOutcome, InvalidPattern> {
        Ok(MatchOutcome::from_spans(self.find_spans(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(pattern: &str, case_sensitive: bool, text: &str) -> Vec<Span> {
        StringFilter::new(pattern, case_sensitive)
            .unwrap()
            .find_spans(text)
    }

    #[test]
    fn test_case_insensitive_finds_all_occurrences() {
        let found = spans("ERR", false, "Error: disk ERR 2");
        assert_eq!(found, vec![Span::new(0, 3), Span::new(12, 3)]);
    }

    #[test]
    fn test_case_sensitive_skips_other_case() {
        let found = spans("ERR", true, "Error: disk ERR 2");
        assert_eq!(found, vec![Span::new(12, 3)]);
    }

    #[test]
    fn test_repeated_literal_does_not_overlap() {
        // "aa" in "aaaaa" is found at 0 and 2; the scan resumes past each hit
        let found = spans("aa", true, "aaaaa");
        assert_eq!(found, vec![Span::new(0, 2), Span::new(2, 2)]);
    }

    #[test]
    fn test_resume_skips_one_pattern_length() {
        // "K" (Kelvin sign) is 3 bytes; its folded match "k" is 1 byte
        let found = spans("\u{212A}", false, "kkk");
        assert_eq!(found, vec![Span::new(0, 1)]);
    }

    #[test]
    fn test_resume_lands_on_char_boundary() {
        let text = "\u{212A}\u{212A}";
        let found = spans("k", false, text);

        assert_eq!(found, vec![Span::new(0, 3), Span::new(3, 3)]);
        for span in &found {
            assert!(text.is_char_boundary(span.start));
            assert!(text.is_char_boundary(span.end()));
        }
    }

    #[test]
    fn test_no_match() {
        let filter = StringFilter::new("timeout", false).unwrap();
        let outcome = filter.evaluate("all good").unwrap();
        assert!(!outcome.is_match);
        assert!(outcome.spans.is_empty());
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let found = spans("a.b", false, "axb a.b");
        assert_eq!(found, vec![Span::new(4, 3)]);
    }

    #[test]
    fn test_unicode_offsets_are_char_boundaries() {
        let text = "température ÉLEVÉE élevée";
        let found = spans("élevée", false, text);

        assert_eq!(found.len(), 2);
        for span in &found {
            assert!(text.is_char_boundary(span.start));
            assert!(text.is_char_boundary(span.end()));
        }
        assert_eq!(&text[found[0].start..found[0].end()], "ÉLEVÉE");
        assert_eq!(&text[found[1].start..found[1].end()], "élevée");
    }

    #[test]
    fn test_evaluate_marks_match() {
        let filter = StringFilter::new("disk", true).unwrap();
        let outcome = filter.evaluate("disk full").unwrap();
        assert!(outcome.is_match);
        assert_eq!(outcome.spans, vec![Span::new(0, 4)]);
    }
}
