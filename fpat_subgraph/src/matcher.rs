//! Anchor-driven matching with constraint propagation.
//!
//! For every object node compatible with the anchor, a fresh
//! [`MatchContext`] is seeded outward from the anchor and then narrowed pass
//! by pass until nothing changes. The first attempt that survives is the
//! match. A [`MatchError::Mismatch`] only ends the current attempt; every
//! other error ends the call.

use std::fmt::Debug;
use std::hash::Hash;

use fpat_graph::{Direction, NodeConstraint};
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use tracing::{debug, info, trace};

use crate::anchor::{anchor_candidates, select_anchor};
use crate::{Config, GraphCapability, GraphHelper, MatchContext, MatchError};

/// Node-level compatibility test `(object_node, pattern_node)`, applied on
/// top of constraint satisfaction to every candidate of every pattern node.
/// An error aborts the search.
pub type Discriminator<'a, O, P> = dyn Fn(&O, &P) -> Result<bool, MatchError> + 'a;

/// Finds one embedding of a pattern graph into an object graph.
pub struct Matcher<'a, P, O> {
    pattern: &'a dyn GraphCapability<Node = P>,
    object: &'a dyn GraphCapability<Node = O>,
    discriminator: Option<Box<Discriminator<'a, O, P>>>,
    config: Config,
}

impl<'a, P, O> Matcher<'a, P, O>
where
    P: Clone + Eq + Hash + Debug,
    O: Clone + Eq + Hash + Debug,
{
    /// Matcher with the default [`Config`] and no discriminator.
    pub fn new(
        pattern: &'a dyn GraphCapability<Node = P>,
        object: &'a dyn GraphCapability<Node = O>,
    ) -> Self {
        Self {
            pattern,
            object,
            discriminator: None,
            config: Config::default(),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Add a domain-specific test every candidate must pass on top of
    /// constraint satisfaction: anchor candidates, seeded sets and
    /// propagated sets alike.
    #[must_use]
    pub fn with_discriminator(
        mut self,
        discriminator: impl Fn(&O, &P) -> Result<bool, MatchError> + 'a,
    ) -> Self {
        self.discriminator = Some(Box::new(discriminator));
        self
    }

    /// The active configuration.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the search.
    ///
    /// # Errors
    /// - [`MatchError::Mismatch`] if no anchor candidate yields a match.
    /// - Any other error raised by the graphs or the context, unchanged.
    pub fn find_match(&self) -> Result<MatchContext<P, O>, MatchError> {
        let anchor = select_anchor(self.pattern, self.config.anchor_tie_break)?;
        let plan = PatternPlan::build(self.pattern, anchor)?;
        let candidates = anchor_candidates(
            self.pattern,
            self.object,
            &plan.anchor,
            self.discriminator.as_deref(),
        )?;

        info!(
            "matching {} pattern nodes from anchor {:?} ({} candidates)",
            plan.order.len(),
            plan.anchor,
            candidates.len()
        );

        let total = candidates.len();
        for (attempt, candidate) in candidates.into_iter().enumerate() {
            debug!("attempt {}/{total}: {:?} -> {candidate:?}", attempt + 1, plan.anchor);
            match self.attempt(&plan, candidate) {
                Ok(ctx) => {
                    info!(
                        "matched on attempt {}: {}/{} pattern nodes resolved",
                        attempt + 1,
                        ctx.resolved_count(),
                        plan.order.len()
                    );
                    return Ok(ctx);
                }
                Err(err) if err.is_mismatch() => trace!("attempt {} rejected: {err}", attempt + 1),
                Err(err) => return Err(err),
            }
        }

        info!("no match after {total} anchor candidates");
        Err(MatchError::mismatch(format!(
            "no embedding found ({total} anchor candidates tried)"
        )))
    }

    fn attempt(&self, plan: &PatternPlan<P>, candidate: O) -> Result<MatchContext<P, O>, MatchError> {
        let mut ctx = MatchContext::new();
        ctx.init(plan.anchor.clone(), IndexSet::from([candidate]))?;
        self.seed(plan, &mut ctx)?;
        self.propagate(plan, &mut ctx)?;

        if self.config.verify_coverage && !is_fully_matched(self.pattern, &ctx)? {
            return Err(MatchError::mismatch("pattern not fully covered"));
        }
        Ok(ctx)
    }

    /// Initialize every pattern node reachable from the anchor, in BFS order.
    fn seed(&self, plan: &PatternPlan<P>, ctx: &mut MatchContext<P, O>) -> Result<(), MatchError> {
        for ptn in plan.order.iter().skip(1) {
            let mut sets = self.derive(plan, ctx, ptn)?.into_iter();
            let Some(first) = sets.next() else {
                return Err(MatchError::mismatch(format!(
                    "pattern node {ptn:?} has no seeded neighbour"
                )));
            };
            ctx.init(ptn.clone(), first)?;
            for set in sets {
                ctx.update(ptn, &set)?;
            }
        }
        Ok(())
    }

    /// Re-derive every set from its neighbours until a full pass narrows
    /// nothing.
    fn propagate(&self, plan: &PatternPlan<P>, ctx: &mut MatchContext<P, O>) -> Result<(), MatchError> {
        let ceiling = self.config.max_propagation_passes;
        for pass in 1..=ceiling {
            let mut updated = false;
            for ptn in &plan.order {
                for set in self.derive(plan, ctx, ptn)? {
                    updated |= ctx.update(ptn, &set)?;
                }
            }
            trace!("propagation pass {pass}: updated = {updated}");
            if !updated {
                return Ok(());
            }
        }
        Err(MatchError::NotConverged { passes: ceiling })
    }

    /// One candidate set per initialized pattern neighbour of `ptn`: the
    /// object neighbours of that neighbour's candidates, in the matching
    /// direction, that satisfy `ptn`, pass the discriminator and are not
    /// bound to another node.
    fn derive(
        &self,
        plan: &PatternPlan<P>,
        ctx: &MatchContext<P, O>,
        ptn: &P,
    ) -> Result<Vec<IndexSet<O>>, MatchError> {
        let wanted = plan.constraint(ptn)?;
        let object = GraphHelper::new(self.object);
        let mut sets = Vec::new();

        // a predecessor's candidates reach `ptn` downstream, and vice versa
        for direction in [Direction::Upstream, Direction::Downstream] {
            let neighbours = plan.neighbours(ptn, direction)?;
            for neighbour in neighbours.iter().filter(|q| ctx.has(q)) {
                let mut set = IndexSet::new();
                for obj in ctx.candidates(neighbour)? {
                    for next in object.step(obj, direction.reverse())? {
                        let free = ctx
                            .matched_pattern_of(&next)
                            .is_none_or(|owner| owner == ptn);
                        if free
                            && !set.contains(&next)
                            && self.object.satisfies(&next, wanted)?
                            && self.admits(&next, ptn)?
                        {
                            set.insert(next);
                        }
                    }
                }
                sets.push(set);
            }
        }
        Ok(sets)
    }

    fn admits(&self, obj: &O, ptn: &P) -> Result<bool, MatchError> {
        self.discriminator
            .as_ref()
            .map_or(Ok(true), |discriminator| discriminator(obj, ptn))
    }
}

/// Runs [`Matcher::find_match`] with the default configuration.
///
/// # Errors
/// See [`Matcher::find_match`].
pub fn find_match<P, O>(
    pattern: &dyn GraphCapability<Node = P>,
    object: &dyn GraphCapability<Node = O>,
) -> Result<MatchContext<P, O>, MatchError>
where
    P: Clone + Eq + Hash + Debug,
    O: Clone + Eq + Hash + Debug,
{
    Matcher::new(pattern, object).find_match()
}

/// Whether `ctx` binds every non-ignored pattern node to exactly one object
/// node, and the number of singleton sets agrees with
/// [`MatchContext::resolved_count`].
///
/// Ignored pattern nodes are still seeded and narrowed during the search but
/// are not required to resolve: a packed operand wrapper stands for every
/// slot of its op and keeps all of them as candidates.
///
/// # Errors
/// Propagates graph failures.
pub fn is_fully_matched<P, O>(
    pattern: &dyn GraphCapability<Node = P>,
    ctx: &MatchContext<P, O>,
) -> Result<bool, MatchError>
where
    P: Clone + Eq + Hash + Debug,
    O: Clone + Eq + Hash + Debug,
{
    let helper = GraphHelper::skipping_ignored(pattern);
    let unresolved = helper
        .nodes()?
        .into_iter()
        .filter(|ptn| ctx.bound_object(ptn).is_none())
        .collect_vec();
    if !unresolved.is_empty() {
        debug!(
            "not uniquely matched: {}",
            unresolved.iter().map(|ptn| format!("{ptn:?}")).join(", ")
        );
        return Ok(false);
    }
    let singletons = ctx.iter().filter(|(_, set)| set.len() == 1).count();
    Ok(singletons == ctx.resolved_count())
}

/// Pattern-side data shared by every attempt: traversal order from the
/// anchor, adjacency and constraints.
struct PatternPlan<P> {
    anchor: P,
    order: Vec<P>,
    upstream: IndexMap<P, IndexSet<P>>,
    downstream: IndexMap<P, IndexSet<P>>,
    constraints: IndexMap<P, NodeConstraint>,
}

impl<P> PatternPlan<P>
where
    P: Clone + Eq + Hash + Debug,
{
    fn build(pattern: &dyn GraphCapability<Node = P>, anchor: P) -> Result<Self, MatchError> {
        let helper = GraphHelper::new(pattern);
        let order = helper.bfs_order([anchor.clone()])?;

        let mut upstream = IndexMap::with_capacity(order.len());
        let mut downstream = IndexMap::with_capacity(order.len());
        let mut constraints = IndexMap::with_capacity(order.len());
        for ptn in &order {
            upstream.insert(ptn.clone(), helper.upstream(ptn)?);
            downstream.insert(ptn.clone(), helper.downstream(ptn)?);
            constraints.insert(ptn.clone(), pattern.constraint(ptn)?);
        }

        Ok(Self {
            anchor,
            order,
            upstream,
            downstream,
            constraints,
        })
    }

    fn neighbours(&self, ptn: &P, direction: Direction) -> Result<&IndexSet<P>, MatchError> {
        let map = match direction {
            Direction::Upstream => &self.upstream,
            Direction::Downstream => &self.downstream,
        };
        map.get(ptn).ok_or_else(|| MatchError::uninitialized(ptn))
    }

    fn constraint(&self, ptn: &P) -> Result<&NodeConstraint, MatchError> {
        self.constraints
            .get(ptn)
            .ok_or_else(|| MatchError::uninitialized(ptn))
    }
}
