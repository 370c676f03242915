//! Rule tree construction and first-match-wins traversal.
//!
//! Nodes live in an arena and refer to their children by index. Traversal is
//! depth-first and pre-order: children are tried in insertion order, the first
//! child that matches is descended into, and a node that matches but has no
//! matching descendant is itself the result. The reserved `fallback` node is
//! the root's last child and has no predicate, so every query resolves.

use std::collections::HashSet;

use tracing::debug;

use triage_core::{Context, Error, Result};

use crate::node::{MatcherNode, ResponseStrategy};
use crate::predicate::KeywordPredicate;

pub type NodeId = usize;

pub const ROOT_ID: &str = "root";
pub const FALLBACK_ID: &str = "fallback";

const ROOT: NodeId = 0;

pub struct TreeBuilder {
    nodes: Vec<MatcherNode>,
}

impl Default for TreeBuilder {
    fn default() -> Self { Self::new() }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self { nodes: vec![MatcherNode::new(ROOT_ID)] }
    }

    pub fn root(&self) -> NodeId { ROOT }

    /// Append `node` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, node: MatcherNode) -> Result<NodeId> {
        if parent >= self.nodes.len() {
            return Err(Error::InvalidTree(format!("no node with index {parent}")));
        }
        let id = self.nodes.len();
        self.nodes.push(node);
        self.nodes[parent].children.push(id);
        Ok(id)
    }

    /// Validate the fallback invariant and freeze the tree.
    pub fn build(self) -> Result<RuleTree> {
        let nodes = self.nodes;
        if nodes[ROOT].has_predicate() {
            return Err(Error::InvalidTree("root must not have a predicate".into()));
        }

        let fallbacks: Vec<NodeId> = (0..nodes.len()).filter(|&i| nodes[i].id() == FALLBACK_ID).collect();
        let fallback = match fallbacks.as_slice() {
            [one] => *one,
            [] => return Err(Error::InvalidTree("no fallback node".into())),
            _ => return Err(Error::InvalidTree(format!("{} fallback nodes, expected one", fallbacks.len()))),
        };
        if nodes[ROOT].children.last() != Some(&fallback) {
            return Err(Error::InvalidTree("fallback must be the last child of root".into()));
        }
        if nodes[fallback].has_predicate() {
            return Err(Error::InvalidTree("fallback must not have a predicate".into()));
        }
        if nodes.iter().skip(1).any(|n| n.id() == ROOT_ID) {
            return Err(Error::InvalidTree("'root' is reserved for the tree root".into()));
        }

        let mut seen = HashSet::new();
        for &child in &nodes[ROOT].children {
            if !seen.insert(nodes[child].id()) {
                return Err(Error::DuplicateCategory(nodes[child].id().to_string()));
            }
        }

        Ok(RuleTree { nodes, fallback })
    }
}

pub struct RuleTree {
    nodes: Vec<MatcherNode>,
    fallback: NodeId,
}

impl RuleTree {
    /// One keyword node per category, in declaration order, followed by the fallback.
    ///
    /// Category nodes answer through `Generator::generate`; the fallback
    /// delegates to `Generator::generate_free`.
    pub fn from_categories<S: AsRef<str>>(categories: &[S]) -> Result<Self> {
        let mut builder = TreeBuilder::new();
        let root = builder.root();
        for category in categories {
            let category = category.as_ref();
            if category == FALLBACK_ID || category == ROOT_ID {
                return Err(Error::InvalidTree(format!("'{category}' is a reserved node id")));
            }
            let predicate = KeywordPredicate::new(category).map_err(|e| Error::InvalidTree(e.to_string()))?;
            builder.add_child(
                root,
                MatcherNode::new(category)
                    .with_predicate(predicate)
                    .with_response(ResponseStrategy::category(category)),
            )?;
        }
        builder.add_child(root, MatcherNode::new(FALLBACK_ID))?;
        builder.build()
    }

    pub fn root(&self) -> &MatcherNode { &self.nodes[ROOT] }

    pub fn node(&self, id: NodeId) -> Option<&MatcherNode> { self.nodes.get(id) }

    pub fn fallback(&self) -> &MatcherNode { &self.nodes[self.fallback] }

    /// Ids of the root's children other than the fallback, in priority order.
    pub fn categories(&self) -> Vec<&str> {
        self.nodes[ROOT]
            .children
            .iter()
            .filter(|&&c| c != self.fallback)
            .map(|&c| self.nodes[c].id())
            .collect()
    }

    /// Deepest node on the first matching path.
    pub fn traverse(&self, text: &str, context: &Context) -> &MatcherNode {
        let id = self.visit(ROOT, text, context).unwrap_or(self.fallback);
        let node = &self.nodes[id];
        debug!(node = node.id(), "rule tree match");
        node
    }

    fn visit(&self, id: NodeId, text: &str, context: &Context) -> Option<NodeId> {
        let node = &self.nodes[id];
        if !node.matches(text, context) {
            return None;
        }
        node.children
            .iter()
            .find_map(|&child| self.visit(child, text, context))
            .or(Some(id))
    }
}
