//! Value-position expressions.

use crate::canonical::{Kind, Node};
use crate::errors::{NodeContext, NormalizeError};
use crate::syntax::{BasicLit, Expr};

use super::types::is_bare_identifier;
use super::{NormalizeResult, Normalizer};

impl Normalizer<'_> {
    pub fn as_expression(&self, expr: &Expr) -> NormalizeResult<Node> {
        tracing::trace!(kind = expr.kind_name(), "normalizing expression");
        let expression = |variant: &'static str| Node::typed(Kind::Expression, variant);

        let node = match expr {
            // Type shapes have no value reading.
            Expr::ArrayType { .. }
            | Expr::StructType { .. }
            | Expr::FuncType(_)
            | Expr::InterfaceType { .. }
            | Expr::MapType { .. }
            | Expr::ChanType { .. }
            | Expr::Ellipsis { .. } => return self.require_type(expr),

            Expr::Ident(ident) => {
                let value = self.ident(ident);
                if value.kind() == Kind::Literal {
                    return Ok(value);
                }
                expression("identifier").with("value", value)
            }

            Expr::BasicLit(lit) => return Ok(self.basic_lit(lit)),

            Expr::FuncLit { ty, body, .. } => Node::typed(Kind::Literal, "function")
                .with("params", self.fields(Some(&ty.params))?)
                .with("results", self.fields(ty.results.as_ref())?)
                .with("body", self.block(body)?),

            Expr::CompositeLit { ty, elts, .. } => Node::typed(Kind::Literal, "composite")
                .with("declared", self.optional_type(ty.as_deref())?)
                .with("values", self.expressions(elts)?),

            Expr::Paren { x, .. } => expression("paren").with("target", self.as_expression(x)?),

            // `a.b` with a bare identifier on the left reads as a qualified
            // name. Without import information `pkg.Name` and `value.Field`
            // are indistinguishable here.
            Expr::Selector { x, sel, .. } => {
                let mut lhs = self.as_expression(x)?;
                if is_bare_identifier(&lhs) {
                    expression("identifier")
                        .with("qualifier", lhs.take("value"))
                        .with("value", self.ident(sel))
                } else {
                    expression("selector")
                        .with("target", lhs)
                        .with("field", self.ident(sel))
                }
            }

            Expr::Index { x, index, .. } => expression("index")
                .with("target", self.as_expression(x)?)
                .with("index", self.as_expression(index)?),

            Expr::Slice {
                x,
                low,
                high,
                max,
                slice3,
                ..
            } => expression("slice")
                .with("target", self.as_expression(x)?)
                .with("low", self.optional_expression(low.as_deref())?)
                .with("high", self.optional_expression(high.as_deref())?)
                .with("max", self.optional_expression(max.as_deref())?)
                .with("three", *slice3),

            Expr::TypeAssert { x, ty, .. } => expression("type-assert")
                .with("target", self.as_expression(x)?)
                .with("asserted", self.optional_type(ty.as_deref())?),

            Expr::Call(call) => return self.call(call),

            Expr::Star { x, .. } => expression("star").with("target", self.as_expression(x)?),

            Expr::Unary { op, x, .. } => expression("unary")
                .with("operator", op.as_str())
                .with("target", self.as_expression(x)?),

            Expr::Binary { x, op, y, .. } => expression("binary")
                .with("left", self.as_expression(x)?)
                .with("operator", op.as_str())
                .with("right", self.as_expression(y)?),

            Expr::KeyValue { key, value, .. } => expression("key-value")
                .with("key", self.as_expression(key)?)
                .with("value", self.as_expression(value)?),

            Expr::Bad { span } => {
                return Err(NormalizeError::ParserErrorMarker {
                    context: NodeContext::Expression,
                    position: self.position(*span),
                })
            }
        };

        Ok(self.locate(node, expr.span()))
    }

    pub(crate) fn expressions(&self, exprs: &[Expr]) -> NormalizeResult<Vec<Node>> {
        exprs.iter().map(|e| self.as_expression(e)).collect()
    }

    pub(crate) fn optional_expression(&self, expr: Option<&Expr>) -> NormalizeResult<Option<Node>> {
        expr.map(|e| self.as_expression(e)).transpose()
    }

    /// The raw literal text is kept verbatim.
    pub fn basic_lit(&self, lit: &BasicLit) -> Node {
        let node = Node::typed(Kind::Literal, lit.kind.as_str()).with("value", lit.value.as_str());
        self.locate(node, lit.span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::Value;
    use crate::normalize::fixtures::{boxed, call, ident, int, selector};
    use crate::position::PositionTable;
    use crate::syntax::{LitKind, Span, Token};

    fn normalize(expr: &Expr) -> NormalizeResult<Node> {
        let table = PositionTable::empty();
        Normalizer::new(&table).as_expression(expr)
    }

    #[test]
    fn identifiers_wrap_their_ident() {
        let node = normalize(&ident("x")).unwrap();
        assert!(node.is(Kind::Expression, "identifier"));
        assert_eq!(node.node("value").map(Node::kind), Some(Kind::Ident));
        assert!(node.get("qualifier").is_none());
    }

    #[test]
    fn reserved_names_are_literals_in_value_position() {
        assert!(normalize(&ident("false")).unwrap().is(Kind::Literal, "BOOL"));
        assert!(normalize(&ident("iota")).unwrap().is(Kind::Literal, "IOTA"));
    }

    #[test]
    fn literal_text_is_verbatim() {
        let lit = Expr::BasicLit(BasicLit {
            kind: LitKind::Float,
            value: "1_000.50".into(),
            span: Span::default(),
        });
        let node = normalize(&lit).unwrap();
        assert!(node.is(Kind::Literal, "FLOAT"));
        assert_eq!(node.text("value"), Some("1_000.50"));
    }

    #[test]
    fn package_selector_is_a_qualified_identifier() {
        let node = normalize(&selector(ident("fmt"), "Println")).unwrap();
        assert!(node.is(Kind::Expression, "identifier"));
        assert_eq!(node.node("qualifier").and_then(|q| q.text("value")), Some("fmt"));
        assert_eq!(node.node("value").and_then(|v| v.text("value")), Some("Println"));
    }

    #[test]
    fn selector_on_a_call_result_stays_a_selector() {
        let base = Expr::Call(call(ident("f"), Vec::new()));
        let node = normalize(&selector(base, "Name")).unwrap();
        assert!(node.is(Kind::Expression, "selector"));
        assert!(node.node("target").unwrap().is(Kind::Expression, "call"));
        assert_eq!(node.node("field").and_then(|f| f.text("value")), Some("Name"));
    }

    #[test]
    fn chained_selectors_qualify_only_once() {
        let node = normalize(&selector(selector(ident("a"), "b"), "c")).unwrap();
        assert!(node.is(Kind::Expression, "selector"));
        assert!(node.node("target").unwrap().is(Kind::Expression, "identifier"));
    }

    #[test]
    fn operators_render_their_symbols() {
        let binary = Expr::Binary {
            x: boxed(int("1")),
            op: Token::Shl,
            y: boxed(int("2")),
            span: Span::default(),
        };
        let node = normalize(&binary).unwrap();
        assert!(node.is(Kind::Expression, "binary"));
        assert_eq!(node.text("operator"), Some("<<"));

        let unary = Expr::Unary {
            op: Token::Arrow,
            x: boxed(ident("ch")),
            span: Span::default(),
        };
        let node = normalize(&unary).unwrap();
        assert!(node.is(Kind::Expression, "unary"));
        assert_eq!(node.text("operator"), Some("<-"));
    }

    #[test]
    fn elided_composite_types_are_null() {
        let inner = Expr::CompositeLit {
            ty: None,
            elts: vec![int("1")],
            span: Span::default(),
        };
        let node = normalize(&inner).unwrap();
        assert!(node.is(Kind::Literal, "composite"));
        assert_eq!(node.get("declared"), Some(&Value::Null));
        assert_eq!(node.list("values").map(<[Value]>::len), Some(1));
    }

    #[test]
    fn three_index_slices_are_flagged() {
        let slice = Expr::Slice {
            x: boxed(ident("s")),
            low: None,
            high: Some(boxed(int("2"))),
            max: Some(boxed(int("3"))),
            slice3: true,
            span: Span::default(),
        };
        let node = normalize(&slice).unwrap();
        assert_eq!(node.flag("three"), Some(true));
        assert_eq!(node.get("low"), Some(&Value::Null));
    }

    #[test]
    fn type_shapes_read_as_types() {
        let map = Expr::MapType {
            key: boxed(ident("string")),
            value: boxed(ident("int")),
            span: Span::default(),
        };
        assert!(normalize(&map).unwrap().is(Kind::Type, "map"));
    }

    #[test]
    fn parser_error_markers_are_fatal() {
        let err = normalize(&Expr::Bad {
            span: Span::default(),
        })
        .unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::ParserErrorMarker {
                context: NodeContext::Expression,
                ..
            }
        ));
    }
}
