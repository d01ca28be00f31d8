use fpat_graph::{Arena, Direction, EdgeTag, GraphError, NodeId};
use quickcheck::{Arbitrary, Gen, quickcheck};

#[derive(Clone, Debug)]
struct ArbitraryConnect {
    src: usize,
    dst: usize,
    src_tag: EdgeTag,
    dst_tag: EdgeTag,
}

fn arbitrary_tag(g: &mut Gen) -> EdgeTag {
    if bool::arbitrary(g) {
        EdgeTag::Indexed
    } else {
        EdgeTag::Unindexed
    }
}

impl Arbitrary for ArbitraryConnect {
    fn arbitrary(g: &mut Gen) -> Self {
        Self {
            src: usize::arbitrary(g) % 6,
            dst: usize::arbitrary(g) % 6,
            src_tag: arbitrary_tag(g),
            dst_tag: arbitrary_tag(g),
        }
    }
}

quickcheck! {
    fn prop_ids_are_dense_and_increasing(payloads: Vec<i64>) -> bool {
        let mut arena = Arena::new();
        for (expected, payload) in payloads.iter().enumerate() {
            let id = *arena.new_node(|h| (h.id(), *payload));
            if id.0 != NodeId::from(expected) {
                return false;
            }
        }
        arena.len() == payloads.len()
    }

    fn prop_at_round_trips(payloads: Vec<String>) -> bool {
        let mut arena = Arena::new();
        for payload in &payloads {
            arena.new_node(|_| payload.clone());
        }
        let in_range = payloads
            .iter()
            .enumerate()
            .all(|(idx, payload)| arena.at(NodeId::from(idx)).is_ok_and(|p| *p == *payload));
        let past_end = NodeId::from(payloads.len());
        in_range
            && arena.at(past_end)
                == Err(GraphError::IndexOutOfRange {
                    id: past_end,
                    len: payloads.len(),
                })
    }

    fn prop_slots_stay_committed(ops: Vec<ArbitraryConnect>) -> bool {
        let mut arena: Arena<()> = Arena::new();
        for _ in 0..6 {
            arena.new_node(|_| ());
        }

        for op in ops {
            let src = arena.handle(NodeId::new(op.src)).unwrap();
            let dst = arena.handle(NodeId::new(op.dst)).unwrap();
            let before_src = arena.downstream_of(src.id()).unwrap().tag();
            let before_dst = arena.upstream_of(dst.id()).unwrap().tag();
            let before_len = arena.downstream_of(src.id()).unwrap().len();

            let conflict = before_src.is_some_and(|t| t != op.src_tag)
                || before_dst.is_some_and(|t| t != op.dst_tag);
            let res = arena.connect(&src, op.src_tag, &dst, op.dst_tag);
            let after_src = arena.adjacency_of(src.id(), Direction::Downstream).unwrap();

            let ok = if conflict {
                matches!(res, Err(GraphError::TagMismatch { .. }))
                    && after_src.tag() == before_src
                    && after_src.len() == before_len
            } else {
                res.is_ok()
                    && after_src.tag() == Some(op.src_tag)
                    && after_src.len() == before_len + 1
            };
            if !ok {
                return false;
            }
        }
        true
    }
}
