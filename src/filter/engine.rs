use std::sync::Arc;

use super::{
    regex_filter::RegexFilter, string_filter::StringFilter, Filter, FilterRule, MatchOutcome,
};
use crate::error::InvalidPattern;

/// Turns rules into filters and evaluates lines against them.
pub struct MatchEngine;

impl MatchEngine {
    /// Compile a rule into a reusable filter.
    ///
    /// Blank expressions compile to a pass-through filter. A malformed regex
    /// fails with the engine's diagnostic.
    pub fn compile(rule: &FilterRule) -> Result<Arc<dyn Filter>, InvalidPattern> {
        if rule.is_pass_through() {
            return Ok(Arc::new(PassThroughFilter));
        }

        let mode = rule.mode();
        let filter: Arc<dyn Filter> = if mode.is_regex() {
            Arc::new(RegexFilter::new(rule.expression(), mode.is_case_sensitive())?)
        } else {
            Arc::new(StringFilter::new(rule.expression(), mode.is_case_sensitive())?)
        };
        Ok(filter)
    }

    /// Like [`MatchEngine::compile`], but a bad pattern yields a filter that
    /// fails on every line instead of an error.
    ///
    /// Tabs keep such a filter so that each rebuild and each live line reports
    /// the problem where it happens, without affecting other tabs.
    pub fn compile_lenient(rule: &FilterRule) -> Arc<dyn Filter> {
        match Self::compile(rule) {
            Ok(filter) => filter,
            Err(err) => {
                tracing::warn!(tab = %rule.name, pattern = %err.pattern, "invalid filter pattern");
                Arc::new(InvalidFilter { error: err })
            }
        }
    }

    /// Evaluate a single line against a rule.
    pub fn evaluate(text: &str, rule: &FilterRule) -> Result<MatchOutcome, InvalidPattern> {
        Self::compile(rule)?.evaluate(text)
    }
}

/// Filter for blank expressions: every line matches, nothing is highlighted.
pub struct PassThroughFilter;

impl Filter for PassThroughFilter {
    fn evaluate(&self, _text: &str) -> Result<MatchOutcome, InvalidPattern> {
        Ok(MatchOutcome::pass_through())
    }
}

/// Stand-in for a rule whose pattern does not compile.
pub struct InvalidFilter {
    error: InvalidPattern,
}

impl Filter for InvalidFilter {
    fn evaluate(&self, _text: &str) -> Result<MatchOutcome, InvalidPattern> {
        Err(self.error.clone())
    }
}
