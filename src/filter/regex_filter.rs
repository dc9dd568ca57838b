use super::{Filter, MatchOutcome, Span};
use crate::error::InvalidPattern;
use regex::{Regex, RegexBuilder};

/// Regex-based filter
pub struct RegexFilter {
    regex: Regex,
}

impl RegexFilter {
    pub fn new(pattern: &str, case_sensitive: bool) -> Result<Self, InvalidPattern> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|e| InvalidPattern::from((pattern, e)))?;
        Ok(Self { regex })
    }

    /// All non-empty matches, left to right.
    pub fn find_spans(&self, text: &str) -> Vec<Span> {
        self.regex
            .find_iter(text)
            .filter(|m| !m.is_empty())
            .map(|m| Span::new(m.start(), m.len()))
            .collect()
    }
}

impl Filter for RegexFilter {
    fn evaluate(&self, text: &str) -> Result<MatchOutcome, InvalidPattern> {
        Ok(MatchOutcome::from_spans(self.find_spans(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_spans() {
        let filter = RegexFilter::new(r"\d+", true).unwrap();
        assert_eq!(
            filter.find_spans("t=12 v=345"),
            vec![Span::new(2, 2), Span::new(7, 3)]
        );
    }

    #[test]
    fn test_case_insensitive_flag() {
        let filter = RegexFilter::new("warn(ing)?", false).unwrap();
        let outcome = filter.evaluate("WARNING: low voltage").unwrap();
        assert!(outcome.is_match);
        assert_eq!(outcome.spans, vec![Span::new(0, 7)]);

        let filter = RegexFilter::new("warn(ing)?", true).unwrap();
        assert!(!filter.evaluate("WARNING: low voltage").unwrap().is_match);
    }

    #[test]
    fn test_zero_length_matches_are_discarded() {
        let filter = RegexFilter::new("x*", true).unwrap();
        let outcome = filter.evaluate("abc").unwrap();
        assert!(!outcome.is_match);

        let outcome = filter.evaluate("axxb").unwrap();
        assert_eq!(outcome.spans, vec![Span::new(1, 2)]);
    }

    #[test]
    fn test_invalid_regex_reports_engine_message() {
        let err = RegexFilter::new("[invalid", false).err().unwrap();
        assert_eq!(err.pattern, "[invalid");
        assert!(err.message.contains("unclosed"), "got: {}", err.message);
    }
}
