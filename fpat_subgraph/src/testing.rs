//! Adjacency-list graph for unit tests.

use std::collections::HashSet;

use fpat_graph::{GraphError, NodeConstraint, NodeId};

use crate::capability::Visitor;
use crate::{GraphCapability, MatchError};

pub(crate) struct MockGraph {
    constraints: Vec<NodeConstraint>,
    edges: Vec<(usize, usize)>,
    ignored: HashSet<usize>,
}

impl MockGraph {
    pub(crate) fn new(constraints: Vec<NodeConstraint>, edges: Vec<(usize, usize)>) -> Self {
        Self {
            constraints,
            edges,
            ignored: HashSet::new(),
        }
    }

    pub(crate) fn with_ignored(mut self, ignored: impl IntoIterator<Item = usize>) -> Self {
        self.ignored.extend(ignored);
        self
    }

    fn check(&self, node: usize) -> Result<usize, MatchError> {
        if node < self.constraints.len() {
            Ok(node)
        } else {
            Err(GraphError::IndexOutOfRange {
                id: NodeId::from(node),
                len: self.constraints.len(),
            }
            .into())
        }
    }
}

impl GraphCapability for MockGraph {
    type Node = usize;

    fn nodes(&self) -> Result<Vec<usize>, MatchError> {
        Ok((0..self.constraints.len()).collect())
    }

    fn visit_upstream(&self, node: &usize, visitor: &mut Visitor<'_, usize>) -> Result<(), MatchError> {
        for (src, _) in self.edges.iter().filter(|(_, dst)| dst == node) {
            visitor(src)?;
        }
        Ok(())
    }

    fn visit_downstream(
        &self,
        node: &usize,
        visitor: &mut Visitor<'_, usize>,
    ) -> Result<(), MatchError> {
        for (_, dst) in self.edges.iter().filter(|(src, _)| src == node) {
            visitor(dst)?;
        }
        Ok(())
    }

    fn constraint(&self, node: &usize) -> Result<NodeConstraint, MatchError> {
        Ok(self.constraints[self.check(*node)?].clone())
    }

    fn is_ignored(&self, node: &usize) -> Result<bool, MatchError> {
        Ok(self.ignored.contains(node))
    }
}
