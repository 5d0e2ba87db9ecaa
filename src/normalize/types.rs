//! Reading expressions as types.
//!
//! [`Normalizer::as_type`] is an *attempt*: shapes that cannot be types yield
//! `Ok(None)` so callers can fall back to the expression reading.
//! [`Normalizer::require_type`] turns that miss into a fatal error.

use crate::canonical::{Kind, Node, Value};
use crate::errors::{NodeContext, NormalizeError};
use crate::syntax::{ChanDir, Expr, Field, FieldList, Span};

use super::{NormalizeResult, Normalizer};

impl Normalizer<'_> {
    pub fn as_type(&self, expr: &Expr) -> NormalizeResult<Option<Node>> {
        tracing::trace!(kind = expr.kind_name(), "reading as type");
        let ty = |variant: &'static str| Node::typed(Kind::Type, variant);

        let node = match expr {
            Expr::Paren { x, .. } => return self.as_type(x),

            Expr::Ident(ident) => ty("identifier").with("value", self.ident(ident)),

            Expr::Selector { x, sel, .. } => {
                let mut lhs = self.as_expression(x)?;
                if !is_bare_identifier(&lhs) {
                    return Ok(None);
                }
                ty("identifier")
                    .with("qualifier", lhs.take("value").unwrap_or(Value::Null))
                    .with("value", self.ident(sel))
            }

            Expr::ArrayType { len: None, elt, .. } => {
                ty("slice").with("element", self.require_type(elt)?)
            }
            Expr::ArrayType {
                len: Some(len),
                elt,
                ..
            } => ty("array")
                .with("element", self.require_type(elt)?)
                .with("length", self.as_expression(len)?),

            Expr::Star { x, .. } => ty("pointer").with("contained", self.require_type(x)?),

            Expr::InterfaceType {
                methods,
                incomplete,
                ..
            } => ty("interface")
                .with("incomplete", *incomplete)
                .with("methods", self.fields(Some(methods))?),

            Expr::MapType { key, value, .. } => ty("map")
                .with("key", self.require_type(key)?)
                .with("value", self.require_type(value)?),

            Expr::ChanType { dir, value, span } => ty("chan")
                .with("direction", self.chan_direction(*dir, *span)?)
                .with("value", self.require_type(value)?),

            Expr::StructType { fields, .. } => ty("struct").with("fields", self.fields(Some(fields))?),

            Expr::FuncType(func) => ty("function")
                .with("params", self.fields(Some(&func.params))?)
                .with("results", self.fields(func.results.as_ref())?),

            Expr::Ellipsis { elt, .. } => ty("ellipsis").with(
                "value",
                elt.as_deref().map(|e| self.require_type(e)).transpose()?,
            ),

            Expr::Bad { span } => {
                return Err(NormalizeError::ParserErrorMarker {
                    context: NodeContext::Type,
                    position: self.position(*span),
                })
            }

            Expr::BasicLit(_)
            | Expr::FuncLit { .. }
            | Expr::CompositeLit { .. }
            | Expr::Index { .. }
            | Expr::Slice { .. }
            | Expr::TypeAssert { .. }
            | Expr::Call(_)
            | Expr::Unary { .. }
            | Expr::Binary { .. }
            | Expr::KeyValue { .. } => return Ok(None),
        };

        Ok(Some(self.locate(node, expr.span())))
    }

    pub fn require_type(&self, expr: &Expr) -> NormalizeResult<Node> {
        self.as_type(expr)?.ok_or_else(|| {
            NormalizeError::unrecognized(
                expr.kind_name(),
                NodeContext::Type,
                self.position(expr.span()),
            )
        })
    }

    pub(crate) fn optional_type(&self, expr: Option<&Expr>) -> NormalizeResult<Option<Node>> {
        expr.map(|e| self.require_type(e)).transpose()
    }

    pub fn field(&self, field: &Field) -> NormalizeResult<Node> {
        let names: Vec<Node> = field.names.iter().map(|n| self.ident(n)).collect();
        let node = Node::new(Kind::Field)
            .with("names", names)
            .with("declared-type", self.require_type(&field.ty)?)
            .with("tag", field.tag.as_ref().map(|t| self.basic_lit(t)));
        Ok(self.locate(node, field.span))
    }

    /// A field list as an array, or null when the list is absent.
    pub fn fields(&self, list: Option<&FieldList>) -> NormalizeResult<Value> {
        let Some(list) = list else {
            return Ok(Value::Null);
        };
        let fields = list
            .list
            .iter()
            .map(|f| self.field(f))
            .collect::<NormalizeResult<Vec<_>>>()?;
        Ok(fields.into())
    }

    fn chan_direction(&self, dir: ChanDir, span: Span) -> NormalizeResult<&'static str> {
        match (dir.send, dir.recv) {
            (true, true) => Ok("both"),
            (true, false) => Ok("send"),
            (false, true) => Ok("recv"),
            (false, false) => Err(NormalizeError::InvalidChannelDirection {
                position: self.position(span),
            }),
        }
    }
}

/// An `expression`/`identifier` node with no qualifier yet.
pub(crate) fn is_bare_identifier(node: &Node) -> bool {
    node.is(Kind::Expression, "identifier") && node.get("qualifier").map_or(true, Value::is_null)
}
