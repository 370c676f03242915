//! Domain types shared by the rule tree, the vector index and the router.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type Category = String;

/// Caller-supplied values (e.g. `user_name`) passed through routing untouched.
pub type Context = HashMap<String, String>;

/// Which tier produced a match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchTier {
    /// A category's keyword rule fired.
    Rule,
    /// No rule fired; the nearest category embedding was used.
    Vector,
    /// No rule fired and the vector match was rejected, or the tree
    /// resolved to a node without a category.
    Free,
}

/// The result of a full `route` call.
///
/// `response` is already cleaned and personalized. `distance` is only set
/// for vector-tier decisions (including rejected ones).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteOutcome {
    pub response: String,
    pub category: Option<Category>,
    pub tier: MatchTier,
    pub distance: Option<f32>,
}
