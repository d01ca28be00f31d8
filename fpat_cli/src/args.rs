use std::path::PathBuf;

use clap::Parser;
use fpat_subgraph::{AnchorTieBreak, Config, DEFAULT_MAX_PROPAGATION_PASSES};

/// Find a rewrite-rule pattern in a tensor program
#[derive(Parser, Debug)]
#[command(name = "fpat")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Program document (JSON)
    #[arg(long)]
    pub program: PathBuf,

    /// Pattern document (JSON)
    #[arg(long)]
    pub pattern: PathBuf,

    /// Give up after this many propagation passes per attempt
    #[arg(long = "max-passes", default_value_t = DEFAULT_MAX_PROPAGATION_PASSES)]
    pub max_passes: usize,

    /// Require every pattern node to be uniquely matched
    #[arg(long, default_value_t = false)]
    pub verify: bool,

    /// How to choose between equally deep anchor nodes
    #[arg(long, value_enum, default_value = "prefer-op")]
    pub tie_break: TieBreakArg,

    /// Match the pattern against itself before searching the program
    #[arg(long, default_value_t = false)]
    pub self_check: bool,
}

impl Args {
    /// Convert command-line arguments into matcher configuration
    pub fn to_config(&self) -> Config {
        Config::builder()
            .max_propagation_passes(self.max_passes)
            .verify_coverage(self.verify)
            .anchor_tie_break(self.tie_break.into())
            .build()
    }
}

/// Command-line argument wrapper for AnchorTieBreak
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum TieBreakArg {
    /// Operator nodes first, then earliest visited
    #[value(name = "prefer-op")]
    PreferOp,
    /// Earliest visited
    #[value(name = "visit-order")]
    VisitOrder,
}

impl From<TieBreakArg> for AnchorTieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::PreferOp => Self::PreferOp,
            TieBreakArg::VisitOrder => Self::VisitOrder,
        }
    }
}
