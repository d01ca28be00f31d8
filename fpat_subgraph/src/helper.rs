//! Neighbour and traversal walkers shared by anchor search, seeding,
//! propagation and ordered output.

use std::collections::VecDeque;

use fpat_graph::Direction;
use indexmap::{IndexMap, IndexSet};

use crate::{GraphCapability, MatchError};

/// Walks a [`GraphCapability`], optionally treating ignored nodes as
/// transparent.
///
/// With `skip_ignored` set, the neighbours of a node are the nearest
/// non-ignored nodes reachable through chains of ignored ones, so a packed
/// placeholder wrapper disappears from the view.
pub struct GraphHelper<'g, N> {
    graph: &'g dyn GraphCapability<Node = N>,
    skip_ignored: bool,
}

impl<'g, N> GraphHelper<'g, N>
where
    N: Clone + Eq + std::hash::Hash + std::fmt::Debug,
{
    /// Walker over every node.
    pub fn new(graph: &'g dyn GraphCapability<Node = N>) -> Self {
        Self {
            graph,
            skip_ignored: false,
        }
    }

    /// Walker that sees through ignored nodes.
    pub fn skipping_ignored(graph: &'g dyn GraphCapability<Node = N>) -> Self {
        Self {
            graph,
            skip_ignored: true,
        }
    }

    /// Nodes visible to this walker, in the graph's order.
    ///
    /// # Errors
    /// Propagates graph failures.
    pub fn nodes(&self) -> Result<Vec<N>, MatchError> {
        let mut out = Vec::new();
        for node in self.graph.nodes()? {
            if !self.hidden(&node)? {
                out.push(node);
            }
        }
        Ok(out)
    }

    /// Direct predecessors of `node`, deduplicated, in visit order.
    ///
    /// # Errors
    /// Propagates graph failures.
    pub fn upstream(&self, node: &N) -> Result<IndexSet<N>, MatchError> {
        self.step(node, Direction::Upstream)
    }

    /// Direct successors of `node`, deduplicated, in visit order.
    ///
    /// # Errors
    /// Propagates graph failures.
    pub fn downstream(&self, node: &N) -> Result<IndexSet<N>, MatchError> {
        self.step(node, Direction::Downstream)
    }

    /// Predecessors then successors of `node`.
    ///
    /// # Errors
    /// Propagates graph failures.
    pub fn neighbors(&self, node: &N) -> Result<IndexSet<N>, MatchError> {
        let mut all = self.upstream(node)?;
        all.extend(self.downstream(node)?);
        Ok(all)
    }

    /// Neighbours of `node` in `direction`.
    ///
    /// # Errors
    /// Propagates graph failures.
    pub fn step(&self, node: &N, direction: Direction) -> Result<IndexSet<N>, MatchError> {
        let mut out = IndexSet::new();
        let mut seen = IndexSet::new();
        let mut pending = vec![node.clone()];
        seen.insert(node.clone());

        while let Some(current) = pending.pop() {
            for next in self.raw_step(&current, direction)? {
                if !seen.insert(next.clone()) {
                    continue;
                }
                if self.hidden(&next)? {
                    pending.push(next);
                } else {
                    out.insert(next);
                }
            }
        }
        Ok(out)
    }

    /// Breadth-first walk over the undirected view from every node of
    /// `starts`. `visit` sees each reachable node once, in visit order,
    /// starts first.
    ///
    /// # Errors
    /// The first error of `visit`, or a graph failure.
    pub fn bfs(
        &self,
        starts: impl IntoIterator<Item = N>,
        mut visit: impl FnMut(&N) -> Result<(), MatchError>,
    ) -> Result<(), MatchError> {
        let mut queue: VecDeque<N> = VecDeque::new();
        let mut seen: IndexSet<N> = IndexSet::new();
        for start in starts {
            if seen.insert(start.clone()) {
                queue.push_back(start);
            }
        }

        while let Some(node) = queue.pop_front() {
            visit(&node)?;
            for next in self.neighbors(&node)? {
                if seen.insert(next.clone()) {
                    queue.push_back(next);
                }
            }
        }
        Ok(())
    }

    /// Breadth-first visit order from `starts`.
    ///
    /// # Errors
    /// Propagates graph failures.
    pub fn bfs_order(&self, starts: impl IntoIterator<Item = N>) -> Result<Vec<N>, MatchError> {
        let mut order = Vec::new();
        self.bfs(starts, |node| {
            order.push(node.clone());
            Ok(())
        })?;
        Ok(order)
    }

    /// Every visible node, sources first (Kahn's algorithm; ties keep graph
    /// order).
    ///
    /// # Errors
    /// [`MatchError::Cyclic`] if some nodes lie on a cycle.
    pub fn topo_order(&self) -> Result<Vec<N>, MatchError> {
        let nodes = self.nodes()?;
        let mut in_degree: IndexMap<N, usize> = IndexMap::with_capacity(nodes.len());
        for node in &nodes {
            in_degree.insert(node.clone(), self.upstream(node)?.len());
        }

        let mut ready: VecDeque<N> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(node, _)| node.clone())
            .collect();
        let mut order = Vec::with_capacity(nodes.len());

        while let Some(node) = ready.pop_front() {
            for next in self.downstream(&node)? {
                if let Some(degree) = in_degree.get_mut(&next) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push_back(next);
                    }
                }
            }
            order.push(node);
        }

        if order.len() == nodes.len() {
            Ok(order)
        } else {
            Err(MatchError::Cyclic {
                remaining: nodes.len() - order.len(),
            })
        }
    }

    fn hidden(&self, node: &N) -> Result<bool, MatchError> {
        Ok(self.skip_ignored && self.graph.is_ignored(node)?)
    }

    fn raw_step(&self, node: &N, direction: Direction) -> Result<Vec<N>, MatchError> {
        let mut out = Vec::new();
        let mut push = |next: &N| -> Result<(), MatchError> {
            out.push(next.clone());
            Ok(())
        };
        match direction {
            Direction::Upstream => self.graph.visit_upstream(node, &mut push)?,
            Direction::Downstream => self.graph.visit_downstream(node, &mut push)?,
        }
        Ok(out)
    }
}
