//! Pluggable fallback for strings the rule-based heuristic cannot decide.
//!
//! The interactive terminal prompt lives in `lusocite-affiliation`; the
//! implementations here need no terminal and are used for unattended runs
//! and tests.

use std::collections::HashMap;

use crate::error::Result;

/// What kind of free text is being asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Affiliation,
    Biography,
}

impl Subject {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Affiliation => "affiliation",
            Subject::Biography   => "biography",
        }
    }
}

/// Decides an ambiguous string. `Ok(None)` means "still unknown" and is
/// never cached by callers.
pub trait UnknownResolver {
    fn resolve(&mut self, subject: Subject, text: &str) -> Result<Option<bool>>;
}

const YES_ANSWERS: &[&str] = &["s", "sim", "y", "yes"];
const NO_ANSWERS:  &[&str] = &["n", "nao", "não", "no"];

/// Parse an operator answer in Portuguese or English.
pub fn parse_answer(input: &str) -> Option<bool> {
    let answer = input.trim().to_lowercase();
    if YES_ANSWERS.contains(&answer.as_str()) {
        Some(true)
    } else if NO_ANSWERS.contains(&answer.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Leaves every ambiguous string unknown. Used with `--unattended`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unattended;

impl UnknownResolver for Unattended {
    fn resolve(&mut self, subject: Subject, text: &str) -> Result<Option<bool>> {
        tracing::info!(subject = subject.as_str(), text, "Left unclassified (unattended run)");
        Ok(None)
    }
}

/// Answers from a fixed table and records every question.
#[derive(Debug, Default, Clone)]
pub struct CannedResolver {
    answers: HashMap<String, bool>,
    fallback: Option<bool>,
    asked: Vec<(Subject, String)>,
}

impl CannedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, text: &str, related: bool) -> Self {
        self.answers.insert(text.to_string(), related);
        self
    }

    /// Answer used for any text missing from the table.
    pub fn otherwise(mut self, related: Option<bool>) -> Self {
        self.fallback = related;
        self
    }

    pub fn asked(&self) -> &[(Subject, String)] {
        &self.asked
    }

    pub fn times_asked(&self, text: &str) -> usize {
        self.asked.iter().filter(|(_, t)| t == text).count()
    }
}

impl UnknownResolver for CannedResolver {
    fn resolve(&mut self, subject: Subject, text: &str) -> Result<Option<bool>> {
        self.asked.push((subject, text.to_string()));
        Ok(self.answers.get(text).copied().or(self.fallback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer_accepts_both_languages() {
        for yes in ["s", "Sim", " y ", "YES"] {
            assert_eq!(parse_answer(yes), Some(true), "{yes}");
        }
        for no in ["n", "NAO", "não", "No"] {
            assert_eq!(parse_answer(no), Some(false), "{no}");
        }
        assert_eq!(parse_answer("talvez"), None);
        assert_eq!(parse_answer(""), None);
    }

    #[test]
    fn test_canned_resolver_records_questions() {
        let mut resolver = CannedResolver::new().answer("ufrj", true);
        assert_eq!(resolver.resolve(Subject::Affiliation, "ufrj").unwrap(), Some(true));
        assert_eq!(resolver.resolve(Subject::Biography, "somewhere").unwrap(), None);
        assert_eq!(resolver.asked().len(), 2);
        assert_eq!(resolver.times_asked("ufrj"), 1);
    }
}
