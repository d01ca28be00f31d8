mod common;

use common::{GraphSpec, assert_sound, op, setup_test_logging, value};
use fpat_graph::NodeConstraint;
use fpat_subgraph::{ArenaGraph, Config, GraphHelper, Matcher, match_arenas};
use quickcheck::{Arbitrary, Gen, quickcheck};

/// Random DAG: edges only run from lower to higher ids.
#[derive(Clone, Debug)]
struct RandomDag(GraphSpec);

impl Arbitrary for RandomDag {
    fn arbitrary(g: &mut Gen) -> Self {
        let kinds = [value(), op("relu"), op("add"), op("mul")];
        let len = 1 + usize::arbitrary(g) % 8;
        let nodes: Vec<NodeConstraint> = (0..len)
            .map(|_| g.choose(&kinds).cloned().unwrap_or_else(value))
            .collect();

        let mut edges = Vec::new();
        for dst in 1..len {
            for src in 0..dst {
                if u8::arbitrary(g) % 3 == 0 {
                    edges.push((src, dst));
                }
            }
        }
        Self(GraphSpec::new(nodes, edges))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let spec = self.0.clone();
        Box::new((0..spec.edges.len()).map(move |skip| {
            let mut smaller = spec.clone();
            smaller.edges.remove(skip);
            Self(smaller)
        }))
    }
}

/// Whether `ctx` binds every node it covers to itself, and covers the whole
/// weakly connected component around the anchor.
fn is_identity_on_component(arena: &fpat_graph::Arena<common::TestNode>) -> bool {
    let ctx = match match_arenas(arena, arena, |_| false, |obj, ptn| std::ptr::eq(obj, ptn), Config::default()) {
        Ok(ctx) => ctx,
        Err(_) => return false,
    };
    if ctx.is_empty() {
        return false;
    }
    let graph = ArenaGraph::new(arena);
    let helper = GraphHelper::new(&graph);
    arena.handles().iter().filter(|h| ctx.has(h)).all(|h| {
        ctx.bound_object(h) == Some(h)
            && helper
                .neighbors(h)
                .is_ok_and(|neighbours| neighbours.iter().all(|n| ctx.has(n)))
    })
}

quickcheck! {
    fn prop_self_match_is_total(dag: RandomDag) -> bool {
        setup_test_logging();
        is_identity_on_component(&dag.0.build())
    }

    fn prop_self_match_is_sound(dag: RandomDag) -> bool {
        setup_test_logging();
        let arena = dag.0.build();
        let graph = ArenaGraph::new(&arena);
        let ctx = match Matcher::new(&graph, &graph).find_match() {
            Ok(ctx) => ctx,
            Err(_) => return false,
        };
        assert_sound(&graph, &graph, &ctx);
        ctx.len() <= arena.len()
    }
}

#[test]
fn symmetric_inputs_bind_to_themselves() {
    setup_test_logging();
    let arena = GraphSpec::new(vec![value(), value(), op("add")], vec![(0, 2), (1, 2)]).build();
    assert!(is_identity_on_component(&arena));
}
