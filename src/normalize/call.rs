//! Call classification: built-in allocation, conversion, or ordinary call.

use crate::canonical::{Kind, Node};
use crate::syntax::{CallExpr, Expr};

use super::{NormalizeResult, Normalizer};

impl Normalizer<'_> {
    pub fn call(&self, call: &CallExpr) -> NormalizeResult<Node> {
        let node = self.classify_call(call)?;
        Ok(self.locate(node, call.span))
    }

    fn classify_call(&self, call: &CallExpr) -> NormalizeResult<Node> {
        let expression = |variant: &'static str| Node::typed(Kind::Expression, variant);

        if let Expr::Ident(callee) = call.fun.as_ref() {
            match (callee.name.as_str(), call.args.split_first()) {
                ("new", Some((ty, _))) => {
                    return Ok(expression("new").with("argument", self.require_type(ty)?));
                }
                ("make", Some((ty, rest))) => {
                    return Ok(expression("make")
                        .with("argument", self.require_type(ty)?)
                        .with("rest", self.expressions(rest)?));
                }
                _ => {}
            }
        }

        // Bare identifier callees stay calls even when they name a type.
        if let Some(target) = self.as_type(&call.fun)? {
            if !target.is(Kind::Type, "identifier") {
                tracing::trace!(to = ?target.variant(), "classified call as conversion");
                return Ok(expression("cast")
                    .with("target", self.optional_expression(call.args.first())?)
                    .with("coerced-to", target));
            }
        }

        Ok(expression("call")
            .with("function", self.as_expression(&call.fun)?)
            .with("arguments", self.expressions(&call.args)?)
            .with("ellipsis", call.ellipsis.is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::Value;
    use crate::errors::NormalizeError;
    use crate::normalize::fixtures::{boxed, call, ident, int, selector, slice_of};
    use crate::position::PositionTable;
    use crate::syntax::Span;

    fn classify(call: &CallExpr) -> NormalizeResult<Node> {
        let table = PositionTable::empty();
        Normalizer::new(&table).call(call)
    }

    #[test]
    fn new_takes_a_type() {
        let node = classify(&call(ident("new"), vec![ident("int")])).unwrap();
        assert!(node.is(Kind::Expression, "new"));
        assert!(node.node("argument").unwrap().is(Kind::Type, "identifier"));
        assert!(node.get("function").is_none());
    }

    #[test]
    fn make_takes_a_type_and_the_rest() {
        let node = classify(&call(ident("make"), vec![slice_of(ident("int")), int("0"), int("8")]))
            .unwrap();
        assert!(node.is(Kind::Expression, "make"));
        assert!(node.node("argument").unwrap().is(Kind::Type, "slice"));
        assert_eq!(node.list("rest").map(<[Value]>::len), Some(2));
    }

    #[test]
    fn new_without_arguments_is_an_ordinary_call() {
        let node = classify(&call(ident("new"), Vec::new())).unwrap();
        assert!(node.is(Kind::Expression, "call"));
    }

    #[test]
    fn composite_type_callees_are_conversions() {
        let node = classify(&call(slice_of(ident("byte")), vec![ident("s")])).unwrap();
        assert!(node.is(Kind::Expression, "cast"));
        assert!(node.node("coerced-to").unwrap().is(Kind::Type, "slice"));
        assert!(node.node("target").unwrap().is(Kind::Expression, "identifier"));
    }

    #[test]
    fn pointer_conversions_see_through_parens() {
        let callee = Expr::Paren {
            x: boxed(Expr::Star {
                x: boxed(ident("T")),
                span: Span::default(),
            }),
            span: Span::default(),
        };
        let node = classify(&call(callee, vec![ident("p")])).unwrap();
        assert!(node.is(Kind::Expression, "cast"));
        assert!(node.node("coerced-to").unwrap().is(Kind::Type, "pointer"));
    }

    #[test]
    fn identifier_callees_are_calls_even_for_type_names() {
        let node = classify(&call(ident("T"), vec![ident("x")])).unwrap();
        assert!(node.is(Kind::Expression, "call"));
        assert_eq!(node.flag("ellipsis"), Some(false));
    }

    #[test]
    fn qualified_callees_are_calls() {
        let node = classify(&call(selector(ident("fmt"), "Println"), vec![int("1")])).unwrap();
        assert!(node.is(Kind::Expression, "call"));
        let function = node.node("function").unwrap();
        assert!(function.is(Kind::Expression, "identifier"));
        assert!(function.node("qualifier").is_some());
    }

    #[test]
    fn spread_arguments_set_the_ellipsis_flag() {
        let mut spread = call(ident("append"), vec![ident("xs"), ident("ys")]);
        spread.ellipsis = Some(14);
        let node = classify(&spread).unwrap();
        assert_eq!(node.flag("ellipsis"), Some(true));
        assert_eq!(node.list("arguments").map(<[Value]>::len), Some(2));
    }

    #[test]
    fn new_of_a_value_is_fatal() {
        let err = classify(&call(ident("new"), vec![int("1")])).unwrap_err();
        assert!(matches!(err, NormalizeError::UnrecognizedNodeKind { .. }));
    }
}
