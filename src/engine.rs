//! The dump pipeline: read, parse, normalize, render.
//!
//! Every run mode goes through [`DumpPipeline`]. Failures come back as a
//! [`DumpError`] and are turned into output and an exit status by
//! [`DumpPipeline::report`], the only place the configured failure mode is
//! consulted.

use std::fmt::Debug;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use tracing::debug;

use crate::canonical::Node;
use crate::config::{DumpConfig, OutputFormat};
use crate::errors::{print_error, DumpError};
use crate::normalize::{NormalizeResult, Normalizer};
use crate::syntax::parser::{self, ParsedSource};

/// Exit status for user-facing failures rendered as error documents.
pub const EXIT_USER_ERROR: u8 = 1;
/// Exit status for internal normalization and rendering failures.
pub const EXIT_INTERNAL_ERROR: u8 = 2;

// ============================================================================
// DUMP PIPELINE - Parse → Normalize → Render
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct DumpPipeline {
    pub config: DumpConfig,
}

impl DumpPipeline {
    pub fn new(config: DumpConfig) -> Self {
        Self { config }
    }

    // ========================================================================
    // RUN MODES
    // ========================================================================

    /// Dumps a Go source file from disk.
    pub fn dump_file(&self, path: &Path) -> Result<String, DumpError> {
        // Step 1: Read the file; an unreadable path is a user-facing error.
        let source = Self::read_file(path)?;

        // Step 2: Parse, normalize and render under the path as given.
        self.dump_source(&path.display().to_string(), &source)
    }

    /// Dumps Go source text held in memory, reported under `name`.
    pub fn dump_source(&self, name: &str, source: &str) -> Result<String, DumpError> {
        debug!(name, bytes = source.len(), "parsing file");
        let parsed = parser::parse_file(name, source)?;
        self.emit(&parsed, |normalizer, file| normalizer.file(file))
    }

    /// Dumps one free-standing expression.
    pub fn dump_expr(&self, text: &str) -> Result<String, DumpError> {
        debug!(bytes = text.len(), "parsing expression");
        let parsed = parser::parse_expr(text)?;
        self.emit(&parsed, |normalizer, expr| normalizer.as_expression(expr))
    }

    /// Dumps a statement snippet wrapped in the synthetic enclosing function.
    pub fn dump_stmt(&self, text: &str) -> Result<String, DumpError> {
        debug!(bytes = text.len(), "parsing statement");
        let parsed = parser::parse_stmt(text)?;
        self.emit(&parsed, |normalizer, file| normalizer.file(file))
    }

    pub fn read_file(path: &Path) -> Result<String, DumpError> {
        fs::read_to_string(path).map_err(|source| DumpError::Path {
            path: path.display().to_string(),
            source,
        })
    }

    // ========================================================================
    // OUTPUT
    // ========================================================================

    fn emit<T: Debug>(
        &self,
        parsed: &ParsedSource<T>,
        normalize: impl FnOnce(&Normalizer<'_>, &T) -> NormalizeResult<Node>,
    ) -> Result<String, DumpError> {
        if self.config.format == OutputFormat::Builtin {
            return Ok(format!("{:#?}", parsed.tree));
        }

        let normalizer = Normalizer::new(&parsed.positions);
        let document = normalize(&normalizer, &parsed.tree)?;
        debug!(kind = %document.kind(), "normalized");
        self.render(&document)
    }

    /// Serializes a canonical document as JSON.
    pub fn render(&self, document: &Node) -> Result<String, DumpError> {
        let text = if self.config.pretty {
            document.to_json_pretty()?
        } else {
            document.to_json()?
        };
        Ok(text)
    }

    // ========================================================================
    // FAILURE REPORTING
    // ========================================================================

    /// Applies the failure mode to an error and picks the exit status.
    ///
    /// User-facing errors become an error document on stdout. Internal
    /// errors are always fatal and go to stderr as a diagnostic. Under
    /// [`FailureMode::Panic`](crate::config::FailureMode::Panic) both abort.
    pub fn report(&self, error: DumpError) -> ExitCode {
        if self.config.panics() {
            panic!("{error}");
        }

        let Some(document) = error.error_document() else {
            debug!("internal failure");
            print_error(error);
            return ExitCode::from(EXIT_INTERNAL_ERROR);
        };

        match self.render(&document) {
            Ok(text) => {
                println!("{text}");
                ExitCode::from(EXIT_USER_ERROR)
            }
            Err(e) => {
                print_error(e);
                ExitCode::from(EXIT_INTERNAL_ERROR)
            }
        }
    }
}
