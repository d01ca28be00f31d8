#![allow(dead_code)]

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Once;

use fpat_graph::{Arena, EdgeTag, NodeConstraint, NodeId};
use fpat_subgraph::{ArenaNode, GraphCapability, GraphHelper, MatchContext};

static INIT: Once = Once::new();

/// Configures logging for the test runner.
pub fn setup_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Arena payload carrying nothing but its fingerprint.
#[derive(Debug)]
pub struct TestNode {
    pub constraint: NodeConstraint,
}

impl ArenaNode for TestNode {
    fn constraint(&self) -> NodeConstraint {
        self.constraint.clone()
    }
}

/// Graph description that can be stored in a static and built on demand.
#[derive(Clone, Debug)]
pub struct GraphSpec {
    pub nodes: Vec<NodeConstraint>,
    pub edges: Vec<(usize, usize)>,
}

impl GraphSpec {
    pub fn new(nodes: Vec<NodeConstraint>, edges: Vec<(usize, usize)>) -> Self {
        Self { nodes, edges }
    }

    /// Builds the arena; packed nodes get unindexed adjacency.
    pub fn build(&self) -> Arena<TestNode> {
        let mut arena = Arena::new();
        for constraint in &self.nodes {
            arena.new_node(|_| TestNode {
                constraint: constraint.clone(),
            });
        }
        for &(src, dst) in &self.edges {
            let src = arena.handle(NodeId::new(src)).unwrap();
            let dst = arena.handle(NodeId::new(dst)).unwrap();
            let src_tag = self.tag_of(src.id());
            let dst_tag = self.tag_of(dst.id());
            arena.connect(&src, src_tag, &dst, dst_tag).unwrap();
        }
        arena
    }

    fn tag_of(&self, id: NodeId) -> EdgeTag {
        if self.nodes[id.as_usize()].is_packed() {
            EdgeTag::Unindexed
        } else {
            EdgeTag::Indexed
        }
    }
}

pub fn value() -> NodeConstraint {
    NodeConstraint::NativeValue
}

pub fn op(name: &str) -> NodeConstraint {
    NodeConstraint::native_op(name)
}

/// Checks that every resolved binding satisfies its pattern node and that
/// every pattern edge between resolved nodes exists between their objects.
pub fn assert_sound<P, O>(
    pattern: &dyn GraphCapability<Node = P>,
    object: &dyn GraphCapability<Node = O>,
    ctx: &MatchContext<P, O>,
) where
    P: Clone + Eq + Hash + Debug,
    O: Clone + Eq + Hash + Debug,
{
    assert!(ctx.is_consistent());
    let pattern_walk = GraphHelper::new(pattern);
    let object_walk = GraphHelper::new(object);

    for (ptn, _) in ctx.iter() {
        let Some(obj) = ctx.bound_object(ptn) else {
            continue;
        };
        let wanted = pattern.constraint(ptn).unwrap();
        assert!(
            object.satisfies(obj, &wanted).unwrap(),
            "{obj:?} does not satisfy {wanted} of {ptn:?}"
        );

        for succ in pattern_walk.downstream(ptn).unwrap() {
            if let Some(succ_obj) = ctx.bound_object(&succ) {
                assert!(
                    object_walk.downstream(obj).unwrap().contains(succ_obj),
                    "edge {ptn:?} -> {succ:?} has no image {obj:?} -> {succ_obj:?}"
                );
            }
        }
    }
}
