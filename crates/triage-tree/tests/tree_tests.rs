use triage_core::{Context, Error};
use triage_tree::{KeywordPredicate, MatcherNode, ResponseStrategy, RuleTree, TreeBuilder, FALLBACK_ID};

fn kw(word: &str) -> KeywordPredicate { KeywordPredicate::new(word).unwrap() }

#[test]
fn first_declared_category_wins() {
    let tree = RuleTree::from_categories(&["shipping", "billing"]).unwrap();
    let node = tree.traverse("my billing is wrong and shipping is late", &Context::new());
    assert_eq!(node.id(), "shipping");

    let tree = RuleTree::from_categories(&["billing", "shipping"]).unwrap();
    let node = tree.traverse("my billing is wrong and shipping is late", &Context::new());
    assert_eq!(node.id(), "billing");
}

#[test]
fn no_keyword_reaches_fallback() {
    let tree = RuleTree::from_categories(&["billing", "shipping"]).unwrap();
    let node = tree.traverse("I want a refund for my order", &Context::new());
    assert_eq!(node.id(), FALLBACK_ID);
    assert!(std::ptr::eq(node, tree.fallback()));
}

#[test]
fn empty_query_reaches_fallback() {
    let tree = RuleTree::from_categories(&["billing"]).unwrap();
    assert_eq!(tree.traverse("", &Context::new()).id(), FALLBACK_ID);
}

#[test]
fn categories_keep_declaration_order() {
    let tree = RuleTree::from_categories(&["refund", "billing", "feedback"]).unwrap();
    assert_eq!(tree.categories(), vec!["refund", "billing", "feedback"]);
    assert_eq!(tree.root().children().len(), 4);
}

#[test]
fn deepest_match_on_first_matching_path() {
    let mut b = TreeBuilder::new();
    let root = b.root();
    let billing = b.add_child(root, MatcherNode::new("billing").with_predicate(kw("billing"))).unwrap();
    b.add_child(billing, MatcherNode::new("billing_refund").with_predicate(kw("refund"))).unwrap();
    b.add_child(billing, MatcherNode::new("billing_invoice").with_predicate(kw("invoice"))).unwrap();
    b.add_child(root, MatcherNode::new("refund").with_predicate(kw("refund"))).unwrap();
    b.add_child(root, MatcherNode::new(FALLBACK_ID)).unwrap();
    let tree = b.build().unwrap();
    let ctx = Context::new();

    assert_eq!(tree.traverse("billing refund please", &ctx).id(), "billing_refund");
    assert_eq!(tree.traverse("billing invoice copy", &ctx).id(), "billing_invoice");
    // Matches billing, no grandchild matches: billing itself is the answer.
    assert_eq!(tree.traverse("billing question", &ctx).id(), "billing");
    // Sibling after a non-matching branch.
    assert_eq!(tree.traverse("refund please", &ctx).id(), "refund");
}

#[test]
fn context_predicates_take_part_in_traversal() {
    let mut b = TreeBuilder::new();
    let root = b.root();
    b.add_child(
        root,
        MatcherNode::new("vip")
            .with_predicate(|_: &str, ctx: &Context| ctx.get("tier").map(String::as_str) == Some("vip"))
            .with_response(ResponseStrategy::Fixed("priority line".into())),
    )
    .unwrap();
    b.add_child(root, MatcherNode::new(FALLBACK_ID)).unwrap();
    let tree = b.build().unwrap();

    let mut ctx = Context::new();
    assert_eq!(tree.traverse("hi", &ctx).id(), FALLBACK_ID);
    ctx.insert("tier".into(), "vip".into());
    assert_eq!(tree.traverse("hi", &ctx).id(), "vip");
}

#[test]
fn construction_requires_a_trailing_unconditional_fallback() {
    let mut b = TreeBuilder::new();
    b.add_child(b.root(), MatcherNode::new("billing").with_predicate(kw("billing"))).unwrap();
    assert!(matches!(b.build(), Err(Error::InvalidTree(_))), "missing fallback");

    let mut b = TreeBuilder::new();
    b.add_child(b.root(), MatcherNode::new(FALLBACK_ID)).unwrap();
    b.add_child(b.root(), MatcherNode::new("billing").with_predicate(kw("billing"))).unwrap();
    assert!(matches!(b.build(), Err(Error::InvalidTree(_))), "fallback not last");

    let mut b = TreeBuilder::new();
    b.add_child(b.root(), MatcherNode::new(FALLBACK_ID).with_predicate(kw("help"))).unwrap();
    assert!(matches!(b.build(), Err(Error::InvalidTree(_))), "conditional fallback");

    let mut b = TreeBuilder::new();
    let billing = b.add_child(b.root(), MatcherNode::new("billing")).unwrap();
    b.add_child(billing, MatcherNode::new(FALLBACK_ID)).unwrap();
    b.add_child(b.root(), MatcherNode::new(FALLBACK_ID)).unwrap();
    assert!(matches!(b.build(), Err(Error::InvalidTree(_))), "two fallbacks");
}

#[test]
fn duplicate_and_reserved_categories_are_rejected() {
    assert!(matches!(
        RuleTree::from_categories(&["billing", "billing"]),
        Err(Error::DuplicateCategory(c)) if c == "billing"
    ));
    assert!(matches!(RuleTree::from_categories(&["fallback"]), Err(Error::InvalidTree(_))));
    assert!(matches!(RuleTree::from_categories(&["root"]), Err(Error::InvalidTree(_))));
}

#[test]
fn add_child_rejects_unknown_parent() {
    let mut b = TreeBuilder::new();
    assert!(matches!(b.add_child(42, MatcherNode::new("x")), Err(Error::InvalidTree(_))));
}
