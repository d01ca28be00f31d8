//! Anchor selection and anchor-candidate enumeration.

use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;
use tracing::debug;

use crate::{AnchorTieBreak, Discriminator, GraphCapability, GraphHelper, MatchError};

/// Pick the pattern node to bind first.
///
/// Heuristic:
/// 1) Hide ignored nodes.
/// 2) Boundary = nodes with no predecessor or no successor.
/// 3) Breadth-first from the whole boundary over the undirected view; a node's
///    depth is one more than the deepest predecessor processed before it.
/// 4) Take a node of maximum depth, breaking ties per `policy`.
///
/// # Errors
/// [`MatchError::Mismatch`] if the pattern has no boundary node.
pub fn select_anchor<N>(
    pattern: &dyn GraphCapability<Node = N>,
    policy: AnchorTieBreak,
) -> Result<N, MatchError>
where
    N: Clone + Eq + Hash + Debug,
{
    let helper = GraphHelper::skipping_ignored(pattern);

    let mut boundary = Vec::new();
    for node in helper.nodes()? {
        if helper.upstream(&node)?.is_empty() || helper.downstream(&node)?.is_empty() {
            boundary.push(node);
        }
    }
    if boundary.is_empty() {
        return Err(MatchError::mismatch("pattern graph has no boundary nodes"));
    }

    // visit order is preserved by the map
    let mut depth: IndexMap<N, usize> = IndexMap::new();
    helper.bfs(boundary, |node| {
        let deepest = helper
            .upstream(node)?
            .iter()
            .filter_map(|pred| depth.get(pred).copied())
            .max()
            .unwrap_or(0);
        depth.insert(node.clone(), deepest + 1);
        Ok(())
    })?;

    let max_depth = depth.values().copied().max().unwrap_or(0);
    let mut deepest = depth
        .iter()
        .filter(|(_, d)| **d == max_depth)
        .map(|(node, _)| node);

    let first = deepest
        .next()
        .ok_or_else(|| MatchError::mismatch("anchor search visited no node"))?;
    let anchor = match policy {
        AnchorTieBreak::VisitOrder => first,
        AnchorTieBreak::PreferOp => {
            let mut chosen = None;
            for node in std::iter::once(first).chain(deepest) {
                if pattern.is_op(node)? {
                    chosen = Some(node);
                    break;
                }
            }
            chosen.unwrap_or(first)
        }
    };

    debug!("anchor {anchor:?} at depth {max_depth} ({policy:?})");
    Ok(anchor.clone())
}

/// Object nodes the anchor may be bound to, in object-graph order.
///
/// A node qualifies when it satisfies the anchor's constraint and, if given,
/// `discriminator(object_node, anchor)`.
///
/// # Errors
/// Propagates graph and discriminator failures.
pub fn anchor_candidates<P, O>(
    pattern: &dyn GraphCapability<Node = P>,
    object: &dyn GraphCapability<Node = O>,
    anchor: &P,
    discriminator: Option<&Discriminator<'_, O, P>>,
) -> Result<Vec<O>, MatchError>
where
    P: Clone + Eq + Hash + Debug,
    O: Clone + Eq + Hash + Debug,
{
    let wanted = pattern.constraint(anchor)?;
    let mut out = Vec::new();
    for node in object.nodes()? {
        if !object.satisfies(&node, &wanted)? {
            continue;
        }
        let admitted = match discriminator {
            Some(discriminator) => discriminator(&node, anchor)?,
            None => true,
        };
        if admitted {
            out.push(node);
        }
    }
    debug!("{} candidates for anchor {anchor:?} ({wanted})", out.len());
    Ok(out)
}
