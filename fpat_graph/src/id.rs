use std::fmt;

/// Position of a node in its [`Arena`](crate::Arena).
///
/// Ids are handed out in creation order starting at zero and index the
/// arena's storage directly. They carry no arena identity; pair them with a
/// [`NodeHandle`](crate::NodeHandle) when that matters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(usize);

impl NodeId {
    /// Id of the node at `index`.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Storage index of the node.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl From<NodeId> for usize {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_n_prefix() {
        assert_eq!(NodeId::new(7).to_string(), "n7");
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn ids_past_u32_keep_their_index() {
        let big = u32::MAX as usize + 3;
        let id = NodeId::from(big);
        assert_eq!(usize::from(id), big);
        assert_ne!(id, NodeId::new(2));
    }

    #[test]
    fn ordering_follows_index() {
        assert!(NodeId::new(1) < NodeId::new(2));
    }
}
