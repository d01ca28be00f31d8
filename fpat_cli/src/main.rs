//! `fpat` command-line tool
//!
//! Loads a program and a pattern from JSON, searches the program for one
//! embedding of the pattern and prints what each named pattern node matched,
//! in program order.

mod args;

use std::process::ExitCode;

use clap::Parser;
use fpat_ir::{IrError, PatternSpec, ProgramGraph, ProgramSpec};
use fpat_subgraph::GraphHelper;
use itertools::Itertools;
use tracing::info;

use args::Args;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(err) if err.is_mismatch() => {
            eprintln!("no match: {err}");
            ExitCode::from(1)
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

/// Runs the search and renders one line per named binding.
fn run(args: &Args) -> Result<Vec<String>, IrError> {
    let config = args.to_config();
    let program = ProgramSpec::from_path(&args.program)?.into_program()?;
    let pattern = PatternSpec::from_path(&args.pattern)?.build()?;

    if args.self_check {
        let ctx = pattern.check_self_match(config.clone())?;
        info!("pattern matches itself ({} nodes resolved)", ctx.resolved_count());
    }

    let graph = ProgramGraph::new(&program)?;
    info!(
        "searching {} values / {} ops for a {}-node pattern",
        program.values.len(),
        program.ops.len(),
        pattern.arena().len()
    );
    let ctx = pattern.find_in(&graph, config)?;

    let order = GraphHelper::new(&graph).topo_order()?;
    let bindings = pattern.bindings(&ctx);
    let lines = bindings
        .iter()
        .sorted_by_key(|(_, node)| order.iter().position(|n| n == *node))
        .map(|(name, node)| {
            graph
                .describe(node)
                .map(|desc| format!("{name} -> {desc}"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let unresolved = pattern
        .names()
        .keys()
        .filter(|name| bindings.get(name).is_err())
        .join(", ");
    if !unresolved.is_empty() {
        info!("not uniquely matched: {unresolved}");
    }
    Ok(lines)
}
