use std::fmt;
use std::sync::Arc;

use triage_core::{Context, Error, Generator, Result};

use crate::predicate::Predicate;
use crate::tree::NodeId;

/// Computes a response from `(text, context)`, usually by calling the generator.
pub type ResponseFn = Arc<dyn Fn(&str, &Context, &dyn Generator) -> anyhow::Result<String> + Send + Sync>;

/// How a matched node turns a query into response text.
#[derive(Clone)]
pub enum ResponseStrategy {
    /// Always answer with this text.
    Fixed(String),
    /// Compute the answer.
    Dynamic(ResponseFn),
    /// Hand the raw query to `Generator::generate_free`.
    Delegate,
}

impl ResponseStrategy {
    /// Category-specific generation: `generator.generate(category, text, context)`.
    pub fn category(category: impl Into<String>) -> Self {
        let category = category.into();
        Self::Dynamic(Arc::new(move |text: &str, context: &Context, generator: &dyn Generator| {
            generator.generate(&category, text, context)
        }))
    }
}

impl fmt::Debug for ResponseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(s) => f.debug_tuple("Fixed").field(s).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
            Self::Delegate => f.write_str("Delegate"),
        }
    }
}

/// One node of the rule tree. A node without a predicate always matches.
pub struct MatcherNode {
    id: String,
    predicate: Option<Box<dyn Predicate>>,
    response: ResponseStrategy,
    pub(crate) children: Vec<NodeId>,
}

impl MatcherNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), predicate: None, response: ResponseStrategy::Delegate, children: Vec::new() }
    }

    pub fn with_predicate(mut self, predicate: impl Predicate + 'static) -> Self {
        self.predicate = Some(Box::new(predicate));
        self
    }

    pub fn with_response(mut self, response: ResponseStrategy) -> Self {
        self.response = response;
        self
    }

    pub fn id(&self) -> &str { &self.id }

    pub fn children(&self) -> &[NodeId] { &self.children }

    pub fn has_predicate(&self) -> bool { self.predicate.is_some() }

    pub fn matches(&self, text: &str, context: &Context) -> bool {
        self.predicate.as_ref().map_or(true, |p| p.matches(text, context))
    }

    /// Produce the raw response for this node. Personalization is the caller's job.
    pub fn respond(&self, text: &str, context: &Context, generator: &dyn Generator) -> Result<String> {
        match &self.response {
            ResponseStrategy::Fixed(s) => Ok(s.clone()),
            ResponseStrategy::Dynamic(f) => f(text, context, generator).map_err(Error::generation),
            ResponseStrategy::Delegate => generator.generate_free(text, context).map_err(Error::generation),
        }
    }
}

impl fmt::Debug for MatcherNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatcherNode")
            .field("id", &self.id)
            .field("has_predicate", &self.predicate.is_some())
            .field("response", &self.response)
            .field("children", &self.children)
            .finish()
    }
}
