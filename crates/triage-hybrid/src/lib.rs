//! Two-tier category router.
//!
//! The rule tree gets the first say. When it falls through to the `fallback`
//! node, the query is embedded and the nearest category in the vector index
//! is used instead, subject to the `FallbackPolicy`. Each call is independent:
//! the router keeps no per-conversation state and is safe to share between
//! threads.

pub mod personalize;
pub mod policy;

use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, info, warn};

use triage_core::config::Settings;
use triage_core::{Context, Embedder, Error, Generator, MatchTier, Result, RouteOutcome};
use triage_tree::{MatcherNode, ResponseStrategy, RuleTree, FALLBACK_ID};
use triage_vector::{IndexHandle, Neighbor, VectorIndex};

pub use personalize::{clean_response, Personalizer, UsernamePersonalizer};
pub use policy::FallbackPolicy;

/// What `traverse` decided.
#[derive(Debug)]
pub enum MatchResult<'a> {
    /// A rule-tree node other than the fallback matched.
    Rule(&'a MatcherNode),
    /// No rule matched; `node` was synthesized for the nearest category.
    Vector { node: MatcherNode, distance: f32 },
    /// No rule matched and the nearest category was turned down by the policy.
    Rejected { node: &'a MatcherNode, nearest: Neighbor },
}

impl MatchResult<'_> {
    pub fn node(&self) -> &MatcherNode {
        match self {
            Self::Rule(node) | Self::Rejected { node, .. } => *node,
            Self::Vector { node, .. } => node,
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            Self::Rule(node) => Some(node.id()),
            Self::Vector { node, .. } => Some(node.id()),
            Self::Rejected { .. } => None,
        }
    }

    pub fn tier(&self) -> MatchTier {
        match self {
            Self::Rule(_) => MatchTier::Rule,
            Self::Vector { .. } => MatchTier::Vector,
            Self::Rejected { .. } => MatchTier::Free,
        }
    }

    pub fn distance(&self) -> Option<f32> {
        match self {
            Self::Rule(_) => None,
            Self::Vector { distance, .. } => Some(*distance),
            Self::Rejected { nearest, .. } => Some(nearest.distance),
        }
    }
}

pub struct HybridRouter {
    tree: RuleTree,
    index: IndexHandle,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    policy: FallbackPolicy,
    personalizer: Option<Box<dyn Personalizer>>,
}

impl HybridRouter {
    pub fn new(
        tree: RuleTree,
        index: VectorIndex,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        check_index(&index, embedder.as_ref())?;
        let rule_order = tree.categories();
        if rule_order.iter().copied().ne(index.categories().iter().map(String::as_str)) {
            warn!(
                rules = ?rule_order,
                index = ?index.categories(),
                "rule tree and vector index disagree on category order"
            );
        }
        info!(categories = index.len(), "hybrid router ready");
        Ok(Self {
            tree,
            index: IndexHandle::new(index),
            embedder,
            generator,
            policy: FallbackPolicy::default(),
            personalizer: None,
        })
    }

    /// Build the keyword tree and the category-name index from settings.
    pub fn from_settings(
        settings: &Settings,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        let categories = &settings.router.categories;
        let tree = RuleTree::from_categories(categories.as_slice())?;
        let index = VectorIndex::from_categories(categories.as_slice(), embedder.as_ref())?;
        Ok(Self::new(tree, index, embedder, generator)?
            .with_policy(FallbackPolicy::from(&settings.fallback))
            .with_personalizer(UsernamePersonalizer::new(&settings.personalization)))
    }

    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_personalizer(mut self, personalizer: impl Personalizer + 'static) -> Self {
        self.personalizer = Some(Box::new(personalizer));
        self
    }

    pub fn tree(&self) -> &RuleTree { &self.tree }

    pub fn index(&self) -> Arc<VectorIndex> { self.index.current() }

    pub fn policy(&self) -> FallbackPolicy { self.policy }

    /// Swap in a rebuilt index. Calls already in flight finish on the old one.
    pub fn replace_index(&self, index: VectorIndex) -> Result<()> {
        check_index(&index, self.embedder.as_ref())?;
        let old = self.index.replace(index);
        info!(previous = old.len(), current = self.index.current().len(), "vector index replaced");
        Ok(())
    }

    pub fn traverse(&self, text: &str, context: &Context) -> Result<MatchResult<'_>> {
        let node = self.tree.traverse(text, context);
        if node.id() != FALLBACK_ID {
            return Ok(MatchResult::Rule(node));
        }

        let query = self.embedder.embed(text).map_err(Error::embedding)?;
        if query.iter().any(|x| !x.is_finite()) {
            return Err(Error::embedding(anyhow!("embedding of the query has non-finite components")));
        }
        let nearest = self.index.current().nearest(&query)?;
        if self.policy.exceeds(nearest.distance) {
            warn!(category = %nearest.category, distance = nearest.distance, threshold = self.policy.threshold, "low-confidence vector match");
        }
        if !self.policy.accepts(nearest.distance) {
            info!(category = %nearest.category, distance = nearest.distance, "vector match rejected");
            return Ok(MatchResult::Rejected { node, nearest });
        }

        debug!(category = %nearest.category, distance = nearest.distance, "vector match");
        let synthesized = MatcherNode::new(nearest.category.clone())
            .with_response(ResponseStrategy::category(nearest.category));
        Ok(MatchResult::Vector { node: synthesized, distance: nearest.distance })
    }

    /// Raw response for a match, before cleanup and personalization.
    pub fn respond(&self, matched: &MatchResult<'_>, text: &str, context: &Context) -> Result<String> {
        matched.node().respond(text, context, self.generator.as_ref())
    }

    /// Classify, respond, clean up and personalize.
    pub fn route(&self, text: &str, context: &Context) -> Result<RouteOutcome> {
        let matched = self.traverse(text, context)?;
        let raw = self.respond(&matched, text, context)?;
        Ok(RouteOutcome {
            response: self.finish(&raw, context),
            category: matched.category().map(str::to_string),
            tier: matched.tier(),
            distance: matched.distance(),
        })
    }

    /// Up to `n` distinct responses for an explicitly chosen category, in
    /// the order they were first generated.
    pub fn candidates(&self, category: &str, text: &str, context: &Context, n: usize) -> Result<Vec<String>> {
        if !self.tree.categories().contains(&category) {
            return Err(Error::UnknownCategory(category.to_string()));
        }
        let mut out: Vec<String> = Vec::with_capacity(n);
        for _ in 0..n {
            let raw = self.generator.generate(category, text, context).map_err(Error::generation)?;
            let response = self.finish(&raw, context);
            if !out.contains(&response) {
                out.push(response);
            }
        }
        Ok(out)
    }

    fn finish(&self, raw: &str, context: &Context) -> String {
        let cleaned = clean_response(raw);
        match &self.personalizer {
            Some(p) => p.personalize(&cleaned, context),
            None => cleaned,
        }
    }
}

fn check_index(index: &VectorIndex, embedder: &dyn Embedder) -> Result<()> {
    if index.is_empty() {
        return Err(Error::EmptyIndex);
    }
    if index.dim() != embedder.dim() {
        return Err(Error::DimensionMismatch { expected: index.dim(), actual: embedder.dim() });
    }
    Ok(())
}
