//! gocanon command-line interface.
//!
//! Parses arguments into a [`DumpConfig`] and one run mode, hands both to the
//! [`DumpPipeline`], and turns the outcome into stdout output and an exit status.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};

use crate::config::DumpConfig;
use crate::engine::DumpPipeline;

// ============================================================================
// CLI ARGUMENTS - Command-line argument definitions
// ============================================================================

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "gocanon",
    about = "Dumps Go source as a canonical JSON syntax document.",
    disable_version_flag = true
)]
pub struct GocanonArgs {
    /// Print the build identifier and exit.
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// Abort with a panic on unreadable input or syntax errors instead of
    /// printing an error document.
    #[arg(long, global = true)]
    pub panic: bool,

    /// Print the parsed input tree in Rust debug form instead of JSON.
    #[arg(long = "builtin-dump", global = true)]
    pub builtin_dump: bool,

    /// Indent the JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Option<ArgsCommand>,
}

impl GocanonArgs {
    pub fn config(&self) -> DumpConfig {
        DumpConfig::from_flags(self.panic, self.builtin_dump, self.pretty)
    }
}

/// The three mutually exclusive run modes.
#[derive(Debug, Subcommand)]
pub enum ArgsCommand {
    /// Parse and dump a Go source file.
    File {
        /// The path to the Go file to dump.
        #[arg(required = true)]
        path: PathBuf,
    },
    /// Parse and dump a single expression.
    Expr {
        /// The expression text, e.g. `a + b`.
        #[arg(required = true)]
        text: String,
    },
    /// Parse and dump a statement snippet inside a placeholder function.
    Stmt {
        /// The statement text, e.g. `x := 1`.
        #[arg(required = true)]
        text: String,
    },
}

/// Build identifier reported by `--version`.
pub fn build_id() -> &'static str {
    option_env!("GOCANON_BUILD").unwrap_or(env!("CARGO_PKG_VERSION"))
}

// ============================================================================
// MAIN ENTRY POINT - Direct pipeline calls
// ============================================================================

/// The main entry point for the CLI.
pub fn run() -> ExitCode {
    let args = GocanonArgs::parse();

    if args.version {
        println!("gocanon {}", build_id());
        return ExitCode::SUCCESS;
    }

    let pipeline = DumpPipeline::new(args.config());
    let result = match &args.command {
        Some(ArgsCommand::File { path }) => pipeline.dump_file(path),
        Some(ArgsCommand::Expr { text }) => pipeline.dump_expr(text),
        Some(ArgsCommand::Stmt { text }) => pipeline.dump_stmt(text),
        None => {
            let _ = GocanonArgs::command().print_help();
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => pipeline.report(e),
    }
}
