//! Identifier classification.
//!
//! `true`, `false` and `iota` are reclassified as literals by name alone. The
//! check is not scope-aware: a local variable that shadows one of these names
//! still comes out as a literal.

use crate::canonical::{Kind, Node};
use crate::syntax::Ident;

use super::Normalizer;

/// Literal `type` tag for a reserved value-like name, if `name` is one.
pub fn reserved_literal(name: &str) -> Option<&'static str> {
    match name {
        "true" | "false" => Some("BOOL"),
        "iota" => Some("IOTA"),
        _ => None,
    }
}

impl Normalizer<'_> {
    /// `literal` for reserved names, `ident` for everything else.
    pub fn ident(&self, ident: &Ident) -> Node {
        let node = match reserved_literal(&ident.name) {
            Some(tag) => Node::typed(Kind::Literal, tag).with("value", ident.name.as_str()),
            None => Node::new(Kind::Ident).with("value", ident.name.as_str()),
        };
        self.locate(node, ident.span)
    }

    pub(crate) fn optional_ident(&self, ident: Option<&Ident>) -> Option<Node> {
        ident.map(|i| self.ident(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::PositionTable;
    use crate::syntax::Span;

    fn classify(name: &str) -> Node {
        let table = PositionTable::new("x.go", name);
        Normalizer::new(&table).ident(&Ident::new(name, Span::new(0, name.len())))
    }

    #[test]
    fn booleans_are_literals() {
        for name in ["true", "false"] {
            let node = classify(name);
            assert!(node.is(Kind::Literal, "BOOL"));
            assert_eq!(node.text("value"), Some(name));
        }
    }

    #[test]
    fn iota_is_a_literal() {
        let node = classify("iota");
        assert!(node.is(Kind::Literal, "IOTA"));
        assert_eq!(node.text("value"), Some("iota"));
    }

    #[test]
    fn other_names_are_plain_identifiers() {
        let node = classify("truely");
        assert_eq!(node.kind(), Kind::Ident);
        assert_eq!(node.variant(), None);
        assert_eq!(node.text("value"), Some("truely"));
        assert_eq!(node.position().map(|p| p.line), Some(1));
    }
}
