//! Property-based tests for literal and selector normalization.
//!
//! Numbers are formatted as Go literal text, pushed through the expression
//! path, and read back from the literal's `value` field.

use gocanon::{parse_expr, Kind, Node, Normalizer};
use proptest::prelude::*;

fn expr(source: &str) -> Node {
    let parsed = parse_expr(source).unwrap();
    Normalizer::new(&parsed.positions)
        .as_expression(&parsed.tree)
        .unwrap()
}

// -- Strategies --

fn identifier_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-zA-Z0-9_]{0,10}")
        .expect("valid regex")
        .prop_filter("not reserved", |s| !is_reserved(s))
}

/// Go keywords, the names that read as literals, and the allocation built-ins.
fn is_reserved(s: &str) -> bool {
    matches!(
        s,
        "break"
            | "case"
            | "chan"
            | "const"
            | "continue"
            | "default"
            | "defer"
            | "else"
            | "fallthrough"
            | "for"
            | "func"
            | "go"
            | "goto"
            | "if"
            | "import"
            | "interface"
            | "map"
            | "package"
            | "range"
            | "return"
            | "select"
            | "struct"
            | "switch"
            | "type"
            | "var"
            | "true"
            | "false"
            | "iota"
            | "new"
            | "make"
    )
}

// -- Properties --

proptest! {
    #[test]
    fn unsigned_integers_keep_their_exact_text(n in any::<u64>()) {
        let text = n.to_string();
        let node = expr(&text);
        prop_assert!(node.is(Kind::Literal, "INT"));
        prop_assert_eq!(node.text("value"), Some(text.as_str()));
    }

    #[test]
    fn non_negative_reals_round_trip(x in any::<f64>().prop_filter("finite", |x| x.is_finite())) {
        let text = format!("{:.6}", x.abs());
        let node = expr(&text);
        prop_assert!(node.is(Kind::Literal, "FLOAT"));
        let value = node.text("value").unwrap();
        let expected: f64 = text.parse().unwrap();
        prop_assert_eq!(value.parse::<f64>().unwrap(), expected);
    }

    #[test]
    fn bare_selectors_are_always_qualified(pkg in identifier_strategy(), name in identifier_strategy()) {
        let node = expr(&format!("{pkg}.{name}"));
        prop_assert!(node.is(Kind::Expression, "identifier"));
        prop_assert_eq!(node.node("qualifier").and_then(|q| q.text("value")), Some(pkg.as_str()));
    }

    #[test]
    fn call_result_selectors_are_never_qualified(fun in identifier_strategy(), name in identifier_strategy()) {
        let node = expr(&format!("{fun}().{name}"));
        prop_assert!(node.is(Kind::Expression, "selector"));
        prop_assert!(node.node("qualifier").is_none());
    }
}
