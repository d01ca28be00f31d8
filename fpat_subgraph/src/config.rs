//! Configuration for the matcher.
//!
//! The defaults reproduce the plain algorithm: a generous propagation ceiling,
//! no post-hoc coverage check, and an anchor tie-break that prefers operators.
//!
//! ```
//! use fpat_subgraph::{AnchorTieBreak, Config};
//!
//! let cfg = Config::builder()
//!     .max_propagation_passes(64)
//!     .verify_coverage(true)
//!     .anchor_tie_break(AnchorTieBreak::VisitOrder)
//!     .build();
//! assert!(cfg.verify_coverage);
//! ```

/// Default ceiling on propagation passes per anchor candidate.
pub const DEFAULT_MAX_PROPAGATION_PASSES: usize = 10_000;

/// Matcher configuration.
///
/// - `max_propagation_passes`: passes allowed before propagation is declared
///   non-convergent. Acyclic patterns settle in a handful of passes; hitting
///   the ceiling yields [`MatchError::NotConverged`](crate::MatchError::NotConverged).
/// - `verify_coverage`: run [`is_fully_matched`](crate::is_fully_matched) on
///   every successful attempt and reject attempts leaving a non-ignored
///   pattern node unresolved.
/// - `anchor_tie_break`: how to pick among anchor nodes of equal depth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Propagation ceiling per anchor candidate.
    pub max_propagation_passes: usize,
    /// Whether to check full coverage before accepting an attempt.
    pub verify_coverage: bool,
    /// Tie-break among anchor nodes at maximum depth.
    pub anchor_tie_break: AnchorTieBreak,
}

impl Config {
    /// Start from the defaults.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_propagation_passes: DEFAULT_MAX_PROPAGATION_PASSES,
            verify_coverage: false,
            anchor_tie_break: AnchorTieBreak::PreferOp,
        }
    }
}

/// Builder for [`Config`].
#[derive(Clone, Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the propagation ceiling. Zero is raised to one.
    #[must_use]
    pub fn max_propagation_passes(mut self, passes: usize) -> Self {
        self.config.max_propagation_passes = passes.max(1);
        self
    }

    /// Enable or disable the coverage check on the success path.
    #[must_use]
    pub const fn verify_coverage(mut self, verify: bool) -> Self {
        self.config.verify_coverage = verify;
        self
    }

    /// Set the anchor tie-break policy.
    #[must_use]
    pub const fn anchor_tie_break(mut self, policy: AnchorTieBreak) -> Self {
        self.config.anchor_tie_break = policy;
        self
    }

    /// Finish.
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }
}

/// How anchor selection breaks ties among nodes at maximum depth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnchorTieBreak {
    /// Prefer operator nodes, then the earliest visited.
    #[default]
    PreferOp,
    /// The earliest visited node, whatever its kind.
    VisitOrder,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_starts_from_defaults() {
        assert_eq!(Config::builder().build(), Config::default());
    }

    #[test]
    fn zero_passes_is_clamped() {
        let cfg = Config::builder().max_propagation_passes(0).build();
        assert_eq!(cfg.max_propagation_passes, 1);
    }
}
