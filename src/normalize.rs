//! Normalization engine.
//!
//! Maps every node of the [`syntax`](crate::syntax) model onto its canonical
//! [`Node`] shape. The dispatch is one recursive, depth-first pass; each
//! component lives in its own file and extends [`Normalizer`]:
//!
//! - [`ident`]: reserved value literals (`true`, `false`, `iota`)
//! - [`types`]: expressions read as types, fields and field lists
//! - [`expr`]: value-position expressions
//! - [`call`]: `new`/`make`, conversions and ordinary calls
//! - [`stmt`]: statements and case/comm clauses
//! - [`decl`]: declaration groups, functions and methods
//! - [`file`]: the root `file` document
//!
//! A `Normalizer` holds nothing but a read-only position table, so any number
//! of traversals may run over the same table at once.

pub mod call;
pub mod decl;
pub mod expr;
pub mod file;
pub mod ident;
pub mod stmt;
pub mod types;

use crate::canonical::Node;
use crate::errors::NormalizeError;
use crate::position::{Position, PositionTable};
use crate::syntax::Span;

pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Stateless normalizer bound to one source's position table.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    positions: &'a PositionTable,
}

impl<'a> Normalizer<'a> {
    pub fn new(positions: &'a PositionTable) -> Self {
        Self { positions }
    }

    /// Resolved position of `span`; zeroed when the table has no data for it.
    pub fn position(&self, span: Span) -> Position {
        self.positions.resolve(span.start)
    }

    /// Attaches the position of `span` to `node`, if it has one.
    fn locate(&self, node: Node, span: Span) -> Node {
        let position = self.position(span);
        if position.is_valid() {
            node.at(position)
        } else {
            node
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Hand-built input trees shared by the normalizer tests.

    use crate::syntax::{BasicLit, CallExpr, Expr, Ident, LitKind, Span};

    pub fn ident(name: &str) -> Expr {
        Expr::Ident(Ident::new(name, Span::default()))
    }

    pub fn int(value: &str) -> Expr {
        Expr::BasicLit(BasicLit {
            kind: LitKind::Int,
            value: value.to_string(),
            span: Span::default(),
        })
    }

    pub fn boxed(expr: Expr) -> Box<Expr> {
        Box::new(expr)
    }

    pub fn call(fun: Expr, args: Vec<Expr>) -> CallExpr {
        CallExpr {
            fun: boxed(fun),
            args,
            ellipsis: None,
            span: Span::default(),
        }
    }

    pub fn selector(x: Expr, sel: &str) -> Expr {
        Expr::Selector {
            x: boxed(x),
            sel: Ident::new(sel, Span::default()),
            span: Span::default(),
        }
    }

    pub fn slice_of(elt: Expr) -> Expr {
        Expr::ArrayType {
            len: None,
            elt: boxed(elt),
            span: Span::default(),
        }
    }
}
