//! Incremental pattern-to-object binding.
//!
//! A [`MatchContext`] holds, for every seeded pattern node, the ordered set of
//! object nodes not yet ruled out, plus a reverse map from object nodes to the
//! single pattern node they are uniquely bound to.
//!
//! Invariants, checked by [`MatchContext::is_consistent`]:
//! - an object node enters the reverse map only when its pattern node's set
//!   has exactly one element, and every singleton set is in the reverse map;
//! - the reverse map only grows;
//! - an object node uniquely bound to one pattern node is never admitted into
//!   another pattern node's set.

use std::fmt::Debug;
use std::hash::Hash;

use contracts::*;
use indexmap::{IndexMap, IndexSet};
use tracing::trace;

use crate::MatchError;

/// Bidirectional binding between pattern nodes and candidate object nodes.
///
/// Created fresh for each anchor candidate; the winning instance is handed to
/// the caller and never mutated again.
#[derive(Clone, Debug)]
pub struct MatchContext<P, O> {
    /// Pattern node -> object nodes still possible, in discovery order.
    candidates: IndexMap<P, IndexSet<O>>,
    /// Object node -> the pattern node it is uniquely bound to.
    bound: IndexMap<O, P>,
}

impl<P, O> Default for MatchContext<P, O> {
    fn default() -> Self {
        Self {
            candidates: IndexMap::new(),
            bound: IndexMap::new(),
        }
    }
}

impl<P, O> MatchContext<P, O>
where
    P: Clone + Eq + Hash + Debug,
    O: Clone + Eq + Hash + Debug,
{
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `ptn` has been initialized.
    pub fn has(&self, ptn: &P) -> bool {
        self.candidates.contains_key(ptn)
    }

    /// Candidate set of `ptn`.
    ///
    /// # Errors
    /// [`MatchError::Uninitialized`] if `ptn` was never initialized.
    pub fn candidates(&self, ptn: &P) -> Result<&IndexSet<O>, MatchError> {
        self.candidates
            .get(ptn)
            .ok_or_else(|| MatchError::uninitialized(ptn))
    }

    /// Pattern node `obj` is uniquely bound to, if any.
    pub fn matched_pattern_of(&self, obj: &O) -> Option<&P> {
        self.bound.get(obj)
    }

    /// The object node `ptn` is uniquely bound to, if its set is a singleton.
    pub fn bound_object(&self, ptn: &P) -> Option<&O> {
        self.candidates
            .get(ptn)
            .filter(|set| set.len() == 1)
            .and_then(|set| set.first())
    }

    /// First binding of `ptn`.
    ///
    /// # Errors
    /// - [`MatchError::AlreadyInitialized`] if `ptn` already has a set.
    /// - [`MatchError::Mismatch`] if `candidates` is empty.
    /// - [`MatchError::AlreadyBound`] if a candidate is uniquely bound to
    ///   another pattern node.
    #[debug_ensures(self.is_consistent())]
    pub fn init(&mut self, ptn: P, candidates: IndexSet<O>) -> Result<(), MatchError> {
        if self.has(&ptn) {
            return Err(MatchError::already_initialized(&ptn));
        }
        if candidates.is_empty() {
            return Err(MatchError::mismatch(format!(
                "no candidates for pattern node {ptn:?}"
            )));
        }
        if let Some((obj, owner)) = candidates
            .iter()
            .find_map(|obj| self.bound_elsewhere(obj, &ptn).map(|owner| (obj, owner)))
        {
            return Err(MatchError::already_bound(obj, owner, &ptn));
        }

        trace!("init {ptn:?} with {} candidates", candidates.len());
        self.commit(ptn, candidates);
        Ok(())
    }

    /// Narrows the set of `ptn` to its intersection with `candidates`, after
    /// dropping candidates uniquely bound to another pattern node.
    ///
    /// Returns whether the set shrank. On error the context is unchanged.
    ///
    /// # Errors
    /// - [`MatchError::Uninitialized`] if `ptn` has no set yet.
    /// - [`MatchError::Mismatch`] if nothing survives.
    #[debug_ensures(self.is_consistent())]
    #[debug_ensures(self.bound.len() >= old(self.bound.len()))]
    pub fn update(&mut self, ptn: &P, candidates: &IndexSet<O>) -> Result<bool, MatchError> {
        let Some(current) = self.candidates.get(ptn) else {
            return Err(MatchError::uninitialized(ptn));
        };

        let narrowed: IndexSet<O> = current
            .iter()
            .filter(|obj| candidates.contains(*obj) && self.bound_elsewhere(obj, ptn).is_none())
            .cloned()
            .collect();

        if narrowed.is_empty() {
            return Err(MatchError::mismatch(format!(
                "candidates of pattern node {ptn:?} became empty"
            )));
        }
        if narrowed.len() == current.len() {
            return Ok(false);
        }

        trace!("narrow {ptn:?}: {} -> {}", current.len(), narrowed.len());
        self.commit(ptn.clone(), narrowed);
        Ok(true)
    }

    /// Number of pattern nodes uniquely bound to an object node.
    pub fn resolved_count(&self) -> usize {
        self.bound.len()
    }

    /// Number of initialized pattern nodes.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether no pattern node has been initialized.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Initialized pattern nodes and their candidate sets, in init order.
    pub fn iter(&self) -> impl Iterator<Item = (&P, &IndexSet<O>)> {
        self.candidates.iter()
    }

    /// Whether the binding invariants hold.
    pub fn is_consistent(&self) -> bool {
        let reverse_matches_singletons = self.bound.iter().all(|(obj, ptn)| {
            self.candidates
                .get(ptn)
                .is_some_and(|set| set.len() == 1 && set.contains(obj))
        });
        let singletons = self.candidates.values().filter(|set| set.len() == 1).count();
        let no_empty_sets = self.candidates.values().all(|set| !set.is_empty());

        reverse_matches_singletons && singletons == self.bound.len() && no_empty_sets
    }

    /// Pattern node other than `ptn` that `obj` is uniquely bound to.
    fn bound_elsewhere(&self, obj: &O, ptn: &P) -> Option<&P> {
        self.bound.get(obj).filter(|owner| *owner != ptn)
    }

    fn commit(&mut self, ptn: P, set: IndexSet<O>) {
        if let Some(obj) = set.first().filter(|_| set.len() == 1) {
            self.bound.insert(obj.clone(), ptn.clone());
        }
        self.candidates.insert(ptn, set);
    }
}


#[cfg(test)]
mod property_tests {
    use quickcheck::{Arbitrary, Gen, quickcheck};

    use super::*;

    #[derive(Clone, Debug)]
    struct ArbitraryContextOp {
        pattern: u8,
        objects: IndexSet<u8>,
        is_update: bool,
    }

    impl Arbitrary for ArbitraryContextOp {
        fn arbitrary(g: &mut Gen) -> Self {
            let len = usize::arbitrary(g) % 4;
            Self {
                pattern: u8::arbitrary(g) % 6,
                objects: (0..len).map(|_| u8::arbitrary(g) % 8).collect(),
                is_update: bool::arbitrary(g),
            }
        }
    }

    fn apply(ctx: &mut MatchContext<u8, u8>, op: ArbitraryContextOp) {
        // errors are expected for random sequences; only the invariants matter
        let _ = if op.is_update {
            ctx.update(&op.pattern, &op.objects).map(|_| ())
        } else {
            ctx.init(op.pattern, op.objects)
        };
    }

    quickcheck! {
        fn prop_context_ops_maintain_consistency(ops: Vec<ArbitraryContextOp>) -> bool {
            let mut ctx = MatchContext::new();
            for op in ops {
                apply(&mut ctx, op);
                if !ctx.is_consistent() {
                    return false;
                }
            }
            true
        }

        fn prop_reverse_map_is_monotonic(ops: Vec<ArbitraryContextOp>) -> bool {
            let mut ctx = MatchContext::new();
            for op in ops {
                let before: Vec<(u8, u8)> = ctx.bound.iter().map(|(o, p)| (*o, *p)).collect();
                apply(&mut ctx, op);
                if before.iter().any(|(o, p)| ctx.matched_pattern_of(o) != Some(p)) {
                    return false;
                }
            }
            true
        }

        fn prop_bound_objects_are_exclusive(ops: Vec<ArbitraryContextOp>) -> bool {
            let mut ctx = MatchContext::new();
            for op in ops {
                apply(&mut ctx, op);
            }
            ctx.iter()
                .filter_map(|(p, _)| ctx.bound_object(p))
                .collect::<IndexSet<_>>()
                .len()
                == ctx.resolved_count()
        }
    }
}
