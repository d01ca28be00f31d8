#![allow(dead_code)]

use std::sync::Once;

use fpat_ir::{Pattern, PatternBuilder, Program, ProgramSpec};

static INIT: Once = Once::new();

/// Configures logging for the test runner.
pub fn setup_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn program(spec: &ProgramSpec) -> Program {
    spec.clone().into_program().unwrap()
}

/// `x -> op(name) -> out`
pub fn unary_pattern(op: &str) -> Pattern {
    let mut builder = PatternBuilder::new();
    builder
        .value("x")
        .unwrap()
        .op("op", op, &["x"], &["out"])
        .unwrap();
    builder.build()
}

/// `x -> relu -> t -> consumer(t, w) -> y`
pub fn relu_into(consumer: &str) -> Pattern {
    let mut builder = PatternBuilder::new();
    builder
        .value("x")
        .unwrap()
        .value("w")
        .unwrap()
        .op("act", "relu", &["x"], &["t"])
        .unwrap()
        .op("use", consumer, &["t", "w"], &["y"])
        .unwrap();
    builder.build()
}
