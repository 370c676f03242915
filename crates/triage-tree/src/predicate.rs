use regex::Regex;

use triage_core::Context;

/// A pure boolean test over `(text, context)`.
///
/// Implementations must not carry hidden state: traversal may evaluate the
/// same predicate any number of times and relies on the answer not changing.
pub trait Predicate: Send + Sync {
    fn matches(&self, text: &str, context: &Context) -> bool;
}

impl<F> Predicate for F
where
    F: Fn(&str, &Context) -> bool + Send + Sync,
{
    fn matches(&self, text: &str, context: &Context) -> bool { self(text, context) }
}

/// Matches when `keyword` appears in the text as a whole word, case-insensitively.
#[derive(Debug, Clone)]
pub struct KeywordPredicate {
    keyword: String,
    pattern: Regex,
}

impl KeywordPredicate {
    pub fn new(keyword: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword)))?;
        Ok(Self { keyword: keyword.to_string(), pattern })
    }

    pub fn keyword(&self) -> &str { &self.keyword }
}

impl Predicate for KeywordPredicate {
    fn matches(&self, text: &str, _context: &Context) -> bool { self.pattern.is_match(text) }
}
