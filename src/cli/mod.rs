//! The `trellis` Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands. Every command reads the
//! standard schema or the operator registries; nothing here mutates a tree.

use std::process;

use clap::Parser;
use log::{debug, LevelFilter};
use miette::{IntoDiagnostic, Result};

use crate::cli::args::{CategoryArg, Command, FamilyFilter, TrellisArgs};
use crate::cli::output::Output;
use crate::codec::parse_operator;
use crate::errors::TrellisError;
use crate::operators::{BinaryOperator, Operator, OperatorCategory, UnaryOperator};
use crate::schema::standard;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = TrellisArgs::parse();
    init_logging(args.verbose);
    let mut out = Output::new(args.color);

    if let Err(report) = dispatch(args.command, &mut out) {
        eprintln!("{report:?}");
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

fn dispatch(command: Command, out: &mut Output) -> Result<()> {
    debug!("running {:?}", command);
    match command {
        Command::Kinds { family } => list_kinds(family, out),
        Command::Describe { kind, json } => describe(&kind, json, out),
        Command::Schema => {
            let schema = standard::schema()?;
            out.json(&*schema).into_diagnostic()
        }
        Command::Operators { category } => list_operators(category, out),
        Command::ParseOp { category, text } => parse_op(category, &text, out),
    }
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn list_kinds(family: Option<FamilyFilter>, out: &mut Output) -> Result<()> {
    let schema = standard::schema()?;
    for (_, spec) in schema.kinds() {
        if family.map_or(true, |f| f.matches(spec.family)) {
            out.kind_row(spec).into_diagnostic()?;
        }
    }
    Ok(())
}

fn describe(kind: &str, json: bool, out: &mut Output) -> Result<()> {
    let schema = standard::schema()?;
    let spec = schema
        .kind_by_name(kind)
        .ok_or_else(|| TrellisError::contract(kind, "*", "unknown node kind"))?;
    if json {
        out.json(spec).into_diagnostic()
    } else {
        out.describe(spec).into_diagnostic()
    }
}

fn list_operators(category: Option<CategoryArg>, out: &mut Output) -> Result<()> {
    let wanted = category.map(OperatorCategory::from);
    if wanted.map_or(true, |c| c == OperatorCategory::Binary) {
        print_registry::<BinaryOperator>(out)?;
    }
    if wanted.map_or(true, |c| c == OperatorCategory::Unary) {
        print_registry::<UnaryOperator>(out)?;
    }
    Ok(())
}

fn print_registry<O: Operator>(out: &mut Output) -> Result<()> {
    for op in O::all() {
        out.operator_row(&format!("{op:?}"), op.descriptor())
            .into_diagnostic()?;
    }
    Ok(())
}

fn parse_op(category: CategoryArg, text: &str, out: &mut Output) -> Result<()> {
    let decoded = match category {
        CategoryArg::Binary => describe_operator(parse_operator::<BinaryOperator>(Some(text))?),
        CategoryArg::Unary => describe_operator(parse_operator::<UnaryOperator>(Some(text))?),
    };
    out.line(&decoded).into_diagnostic()
}

fn describe_operator<O: Operator>(op: O) -> String {
    format!("{op:?} {}", op.symbol())
}
