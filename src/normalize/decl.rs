//! Declarations: import/const/var groups, type declarations, functions and methods.

use crate::canonical::{Kind, Node, Value};
use crate::errors::{NodeContext, NormalizeError};
use crate::syntax::{CommentGroup, Decl, FuncDecl, GenDecl, ImportSpec, Spec, Token, ValueSpec};

use super::{NormalizeResult, Normalizer};

impl Normalizer<'_> {
    pub fn declaration(&self, decl: &Decl) -> NormalizeResult<Node> {
        tracing::trace!(kind = decl.kind_name(), "normalizing declaration");
        match decl {
            Decl::Gen(decl) => self.gen_decl(decl),
            Decl::Func(func) => self.func_decl(func),
            Decl::Bad { span } => Err(NormalizeError::ParserErrorMarker {
                context: NodeContext::Declaration,
                position: self.position(*span),
            }),
        }
    }

    fn gen_decl(&self, decl: &GenDecl) -> NormalizeResult<Node> {
        let variant = match decl.tok {
            Token::Type => return self.type_decl(decl),
            Token::Import => "import",
            Token::Const => "const",
            Token::Var => "var",
            other => {
                return Err(NormalizeError::unrecognized(
                    other.as_str(),
                    NodeContext::DeclarationKeyword,
                    self.position(decl.span),
                ))
            }
        };

        let mut specs = Vec::with_capacity(decl.specs.len());
        for spec in &decl.specs {
            let node = match (decl.tok, spec) {
                (Token::Import, Spec::Import(import)) => self.import_spec(import),
                (Token::Const | Token::Var, Spec::Value(value)) => self.value_spec(variant, value)?,
                (_, other) => {
                    return Err(NormalizeError::unrecognized(
                        other.kind_name(),
                        NodeContext::Declaration,
                        self.position(other.span()),
                    ))
                }
            };
            specs.push(node);
        }

        let node = Node::typed(Kind::Decl, variant).with("specs", specs);
        Ok(self.locate(node, decl.span))
    }

    /// A `type` group must declare exactly one name.
    fn type_decl(&self, decl: &GenDecl) -> NormalizeResult<Node> {
        let spec = match decl.specs.as_slice() {
            [Spec::Type(spec)] => spec,
            [other] => {
                return Err(NormalizeError::unrecognized(
                    other.kind_name(),
                    NodeContext::Declaration,
                    self.position(other.span()),
                ))
            }
            specs => {
                return Err(NormalizeError::MalformedSpecCount {
                    count: specs.len(),
                    position: self.position(decl.span),
                })
            }
        };

        let node = Node::typed(Kind::Decl, "type-alias")
            .with("name", self.ident(&spec.name))
            .with("value", self.require_type(&spec.ty)?)
            .with("comments", comment_texts(spec.comment.as_ref()));
        Ok(self.locate(node, spec.span))
    }

    fn import_spec(&self, spec: &ImportSpec) -> Node {
        let node = Node::typed(Kind::Spec, "import")
            .with("doc", comment_texts(spec.doc.as_ref()))
            .with("comments", comment_texts(spec.comment.as_ref()))
            .with("name", self.optional_ident(spec.name.as_ref()))
            .with("path", spec.path.value.trim_matches('"'));
        self.locate(node, spec.span)
    }

    fn value_spec(&self, variant: &'static str, spec: &ValueSpec) -> NormalizeResult<Node> {
        let names: Vec<Node> = spec.names.iter().map(|n| self.ident(n)).collect();
        let declared = match &spec.ty {
            Some(ty) => self.as_type(ty)?,
            None => None,
        };
        let node = Node::typed(Kind::Spec, variant)
            .with("names", names)
            .with("declared-type", declared)
            .with("values", self.expressions(&spec.values)?)
            .with("comments", comment_texts(spec.comment.as_ref()));
        Ok(self.locate(node, spec.span))
    }

    fn func_decl(&self, func: &FuncDecl) -> NormalizeResult<Node> {
        let (variant, receiver) = match &func.recv {
            None => ("function", None),
            Some(recv) => match recv.list.as_slice() {
                [field] => ("method", Some(self.field(field)?)),
                _ => {
                    return Err(NormalizeError::unrecognized(
                        "FieldList",
                        NodeContext::Receiver,
                        self.position(recv.span),
                    ))
                }
            },
        };

        let mut node = Node::typed(Kind::Decl, variant)
            .with("name", self.ident(&func.name))
            .with("body", func.body.as_ref().map(|b| self.block(b)).transpose()?)
            .with("params", self.fields(Some(&func.ty.params))?)
            .with("results", self.fields(func.ty.results.as_ref())?)
            .with("comments", comment_texts(func.doc.as_ref()));
        if let Some(receiver) = receiver {
            node = node.with("receiver", receiver);
        }
        Ok(self.locate(node, func.span))
    }
}

/// Raw comment texts of a group; an absent group is an empty list.
pub fn comment_texts(group: Option<&CommentGroup>) -> Value {
    Value::Strings(group.map(CommentGroup::texts).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::fixtures::{ident, int};
    use crate::position::PositionTable;
    use crate::syntax::{
        BasicLit, BlockStmt, Comment, Expr, Field, FieldList, FuncType, Ident, LitKind, Span,
        TypeSpec,
    };

    fn normalize(decl: &Decl) -> NormalizeResult<Node> {
        let table = PositionTable::empty();
        Normalizer::new(&table).declaration(decl)
    }

    fn type_spec(name: &str) -> Spec {
        Spec::Type(TypeSpec {
            doc: None,
            name: Ident::new(name, Span::default()),
            assign: false,
            ty: ident("int"),
            comment: Some(CommentGroup {
                list: vec![Comment {
                    text: "// trailing".into(),
                    span: Span::default(),
                }],
            }),
            span: Span::default(),
        })
    }

    fn group(tok: Token, specs: Vec<Spec>) -> Decl {
        Decl::Gen(GenDecl {
            doc: None,
            tok,
            specs,
            span: Span::default(),
        })
    }

    #[test]
    fn single_type_spec_becomes_a_type_alias() {
        let node = normalize(&group(Token::Type, vec![type_spec("ID")])).unwrap();
        assert!(node.is(Kind::Decl, "type-alias"));
        assert_eq!(node.node("name").and_then(|n| n.text("value")), Some("ID"));
        assert!(node.node("value").unwrap().is(Kind::Type, "identifier"));
        assert_eq!(
            node.get("comments").and_then(Value::as_strings),
            Some(&["// trailing".to_string()][..])
        );
    }

    #[test]
    fn type_groups_need_exactly_one_spec() {
        for specs in [Vec::new(), vec![type_spec("A"), type_spec("B")]] {
            let expected = specs.len();
            match normalize(&group(Token::Type, specs)).unwrap_err() {
                NormalizeError::MalformedSpecCount { count, .. } => assert_eq!(count, expected),
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_group_keywords_are_fatal() {
        let err = normalize(&group(Token::Func, Vec::new())).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::UnrecognizedNodeKind {
                context: NodeContext::DeclarationKeyword,
                ..
            }
        ));
    }

    #[test]
    fn imports_unquote_their_path() {
        let import = Spec::Import(ImportSpec {
            doc: None,
            name: None,
            path: BasicLit {
                kind: LitKind::String,
                value: "\"net/http\"".into(),
                span: Span::default(),
            },
            comment: None,
            span: Span::default(),
        });
        let node = normalize(&group(Token::Import, vec![import])).unwrap();
        assert!(node.is(Kind::Decl, "import"));
        let spec = node.list("specs").unwrap()[0].as_node().unwrap();
        assert!(spec.is(Kind::Spec, "import"));
        assert_eq!(spec.text("path"), Some("net/http"));
        assert_eq!(spec.get("name"), Some(&Value::Null));
        assert_eq!(spec.get("doc").and_then(Value::as_strings).map(<[String]>::len), Some(0));
    }

    #[test]
    fn value_specs_attempt_their_declared_type() {
        let spec = Spec::Value(ValueSpec {
            doc: None,
            names: vec![Ident::new("a", Span::default()), Ident::new("b", Span::default())],
            ty: Some(ident("uint8")),
            values: vec![int("1"), ident("iota")],
            comment: None,
            span: Span::default(),
        });
        let node = normalize(&group(Token::Const, vec![spec])).unwrap();
        let spec = node.list("specs").unwrap()[0].as_node().unwrap();
        assert!(spec.is(Kind::Spec, "const"));
        assert_eq!(spec.list("names").map(<[Value]>::len), Some(2));
        assert!(spec.node("declared-type").unwrap().is(Kind::Type, "identifier"));
        let values = spec.list("values").unwrap();
        assert!(values[1].as_node().unwrap().is(Kind::Literal, "IOTA"));
    }

    #[test]
    fn mismatched_specs_are_fatal() {
        let err = normalize(&group(Token::Var, vec![type_spec("T")])).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::UnrecognizedNodeKind {
                context: NodeContext::Declaration,
                ..
            }
        ));
    }

    fn func(recv: Option<FieldList>, body: Option<BlockStmt>) -> Decl {
        Decl::Func(FuncDecl {
            doc: None,
            recv,
            name: Ident::new("Run", Span::default()),
            ty: FuncType {
                params: FieldList::default(),
                results: None,
                span: Span::default(),
            },
            body,
            span: Span::default(),
        })
    }

    #[test]
    fn functions_and_methods() {
        let node = normalize(&func(None, Some(BlockStmt::default()))).unwrap();
        assert!(node.is(Kind::Decl, "function"));
        assert!(node.get("receiver").is_none());
        assert_eq!(node.list("body").map(<[Value]>::len), Some(0));

        let recv = FieldList {
            list: vec![Field {
                names: vec![Ident::new("s", Span::default())],
                ty: Expr::Star {
                    x: Box::new(ident("Server")),
                    span: Span::default(),
                },
                tag: None,
                span: Span::default(),
            }],
            span: Span::default(),
        };
        let node = normalize(&func(Some(recv), None)).unwrap();
        assert!(node.is(Kind::Decl, "method"));
        let receiver = node.node("receiver").unwrap();
        assert!(receiver.node("declared-type").unwrap().is(Kind::Type, "pointer"));
        assert_eq!(node.get("body"), Some(&Value::Null));
    }

    #[test]
    fn empty_receiver_lists_are_fatal() {
        let err = normalize(&func(Some(FieldList::default()), None)).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::UnrecognizedNodeKind {
                context: NodeContext::Receiver,
                ..
            }
        ));
    }
}
