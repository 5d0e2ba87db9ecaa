//! gocanon error handling.
//!
//! Three layers, one per pipeline stage:
//!
//! - [`SyntaxError`]: the front end rejected the source text.
//! - [`NormalizeError`]: the syntax tree violated the normalizer's
//!   preconditions. Always fatal; never rendered as an error document.
//! - [`DumpError`]: anything the dump pipeline can fail with, including I/O.
//!
//! User-facing failures (path and syntax errors) can be turned into a
//! structured error document with [`DumpError::error_document`].

use std::fmt;
use std::io;

use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use thiserror::Error;

use crate::canonical::{Kind, Node};
use crate::position::Position;
use crate::syntax::Span;

// ============================================================================
// NORMALIZATION ERRORS
// ============================================================================

/// What the normalizer was doing when it met an unexpected node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeContext {
    Expression,
    Statement,
    Declaration,
    Type,
    DeclarationKeyword,
    Receiver,
}

impl NodeContext {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeContext::Expression => "expression",
            NodeContext::Statement => "statement",
            NodeContext::Declaration => "declaration",
            NodeContext::Type => "type",
            NodeContext::DeclarationKeyword => "declaration-group keyword",
            NodeContext::Receiver => "method receiver",
        }
    }
}

impl fmt::Display for NodeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Internal-consistency failures. The traversal stops at the first one.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("unrecognized {kind} node at {position} while processing a {context}")]
    #[diagnostic(
        code(gocanon::normalize::unrecognized_node),
        help("this node shape has no canonical form in this position")
    )]
    UnrecognizedNodeKind {
        kind: String,
        context: NodeContext,
        position: Position,
    },

    #[error("type declaration at {position} has {count} specifications; expected exactly one")]
    #[diagnostic(
        code(gocanon::normalize::malformed_spec_count),
        help("declare grouped types one `type` keyword at a time")
    )]
    MalformedSpecCount { count: usize, position: Position },

    #[error("invalid channel direction at {position}")]
    #[diagnostic(code(gocanon::normalize::invalid_channel_direction))]
    InvalidChannelDirection { position: Position },

    #[error("encountered a parser error marker while processing a {context} at {position}; bailing out")]
    #[diagnostic(code(gocanon::normalize::parser_error_marker))]
    ParserErrorMarker {
        context: NodeContext,
        position: Position,
    },
}

impl NormalizeError {
    pub fn unrecognized(kind: &str, context: NodeContext, position: Position) -> Self {
        NormalizeError::UnrecognizedNodeKind {
            kind: kind.to_string(),
            context,
            position,
        }
    }

    pub fn position(&self) -> &Position {
        match self {
            NormalizeError::UnrecognizedNodeKind { position, .. }
            | NormalizeError::MalformedSpecCount { position, .. }
            | NormalizeError::InvalidChannelDirection { position }
            | NormalizeError::ParserErrorMarker { position, .. } => position,
        }
    }
}

// ============================================================================
// SYNTAX ERRORS
// ============================================================================

/// The front end could not produce a syntax tree.
#[derive(Error, Diagnostic, Debug)]
#[error("{message}")]
#[diagnostic(code(gocanon::syntax))]
pub struct SyntaxError {
    pub message: String,
    /// Where the parser gave up, when it could tell.
    pub position: Option<Position>,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: Option<SourceSpan>,
}

impl SyntaxError {
    pub fn at(message: impl Into<String>, position: Position, src: NamedSource<String>, span: Span) -> Self {
        let message = message.into();
        Self {
            message: format!("{position}: {message}"),
            position: Some(position),
            src,
            span: Some(to_source_span(span)),
        }
    }

    pub fn positionless(message: impl Into<String>, src: NamedSource<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
            src,
            span: None,
        }
    }
}

pub fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::from(span.start..span.end.max(span.start))
}

// ============================================================================
// PIPELINE ERRORS
// ============================================================================

#[derive(Error, Diagnostic, Debug)]
pub enum DumpError {
    #[error("open {path}: {source}")]
    #[diagnostic(code(gocanon::path))]
    Path {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("failed to render document: {0}")]
    #[diagnostic(code(gocanon::render))]
    Render(#[from] serde_json::Error),
}

impl DumpError {
    /// Error-document category for user-facing failures; `None` for internal ones.
    pub fn category(&self) -> Option<&'static str> {
        match self {
            DumpError::Path { .. } => Some("path_error"),
            DumpError::Syntax(err) if err.position.is_some() => Some("syntax_error"),
            DumpError::Syntax(_) => Some("positionless_syntax_error"),
            DumpError::Normalize(_) | DumpError::Render(_) => None,
        }
    }

    /// Structured top-level error document, for user-facing failures only.
    pub fn error_document(&self) -> Option<Node> {
        let category = self.category()?;
        let position = match self {
            DumpError::Syntax(SyntaxError {
                position: Some(position),
                ..
            }) => position.clone(),
            DumpError::Syntax(_) => Position::invalid(),
            _ => Position::toplevel(),
        };
        Some(
            Node::typed(Kind::Error, category)
                .with("message", self.to_string())
                .at(position),
        )
    }

    pub fn is_user_facing(&self) -> bool {
        self.category().is_some()
    }
}

/// Prints an error with full miette diagnostics to stderr.
pub fn print_error(error: DumpError) {
    let report = Report::new(error);
    eprintln!("{report:?}");
}
