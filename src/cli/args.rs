//! Defines the command-line arguments and subcommands for the `trellis` CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::operators::OperatorCategory;
use crate::schema::Family;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "trellis",
    version,
    about = "Inspect the node schema and operator registries of a C-family syntax tree."
)]
pub struct TrellisArgs {
    /// When to colour output.
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    pub color: ColorMode,

    /// Raise the log level; repeat for more detail.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List node kinds.
    Kinds {
        /// Only kinds of this family.
        #[arg(long, value_enum)]
        family: Option<FamilyFilter>,
    },
    /// Show the classified fields, checks and accessors of one kind.
    Describe {
        /// The node kind, e.g. `BinaryExpression`.
        #[arg(required = true)]
        kind: String,
        /// Print the kind as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the whole schema as JSON.
    Schema,
    /// List the operator registries.
    Operators {
        /// Only operators of this category.
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,
    },
    /// Decode an operator symbol through its raw-form codec.
    ParseOp {
        #[arg(value_enum)]
        category: CategoryArg,
        /// The operator text, e.g. `+=`.
        #[arg(allow_hyphen_values = true)]
        text: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FamilyFilter {
    Statement,
    Expression,
    /// Helper kinds that belong to neither family.
    None,
}

impl FamilyFilter {
    pub fn matches(self, family: Option<Family>) -> bool {
        match self {
            FamilyFilter::Statement => family == Some(Family::Statement),
            FamilyFilter::Expression => family == Some(Family::Expression),
            FamilyFilter::None => family.is_none(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    Binary,
    Unary,
}

impl From<CategoryArg> for OperatorCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Binary => OperatorCategory::Binary,
            CategoryArg::Unary => OperatorCategory::Unary,
        }
    }
}

#[cfg(test)]
mod args_tests {
    use super::*;

    #[test]
    fn test_parse_op_accepts_hyphenated_symbols() {
        let args = TrellisArgs::try_parse_from(["trellis", "parse-op", "binary", "-="]).unwrap();
        match args.command {
            Command::ParseOp { category, text } => {
                assert_eq!(category, CategoryArg::Binary);
                assert_eq!(text, "-=");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = TrellisArgs::try_parse_from(["trellis", "kinds", "-vv", "--color", "never"])
            .unwrap();
        assert_eq!(args.verbose, 2);
        assert_eq!(args.color, ColorMode::Never);
    }

    #[test]
    fn test_family_filter() {
        assert!(FamilyFilter::None.matches(None));
        assert!(!FamilyFilter::Statement.matches(Some(Family::Expression)));
    }
}
