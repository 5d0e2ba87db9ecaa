//! gocanon: Go syntax trees as canonical JSON documents.
//!
//! The pipeline is `syntax` (parse Go source into a syntax tree) →
//! `normalize` (rewrite the tree into canonical [`Node`]s) → `canonical`
//! (serialize). [`DumpPipeline`] drives all three for the command line.

pub use crate::canonical::{Kind, Node, Value};
pub use crate::config::{DumpConfig, FailureMode, OutputFormat};
pub use crate::engine::DumpPipeline;
pub use crate::errors::{DumpError, NormalizeError, SyntaxError};
pub use crate::normalize::Normalizer;
pub use crate::position::{Position, PositionTable};
pub use crate::syntax::parser::{parse_expr, parse_file, parse_stmt, ParsedSource};

pub mod canonical;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod normalize;
pub mod position;
pub mod syntax;
