//! triage-tree
//!
//! Ordered rule tree over keyword predicates. See `node` for the matcher
//! node and its response strategies, `tree` for construction and traversal.

pub mod node;
pub mod predicate;
pub mod tree;

pub use node::{MatcherNode, ResponseFn, ResponseStrategy};
pub use predicate::{KeywordPredicate, Predicate};
pub use tree::{NodeId, RuleTree, TreeBuilder, FALLBACK_ID, ROOT_ID};
