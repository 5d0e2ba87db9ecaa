//! The root `file` document.

use crate::canonical::{Kind, Node, Value};
use crate::syntax::{Decl, File};

use super::decl::comment_texts;
use super::{NormalizeResult, Normalizer};

impl Normalizer<'_> {
    /// Normalizes a whole file. The leading run of import groups is exposed
    /// again under `imports`; the file node itself carries no position.
    pub fn file(&self, file: &File) -> NormalizeResult<Node> {
        tracing::debug!(package = %file.name.name, decls = file.decls.len(), "normalizing file");

        let declarations = file
            .decls
            .iter()
            .map(|d| self.declaration(d))
            .collect::<NormalizeResult<Vec<_>>>()?;
        let imports = declarations[..leading_imports(&file.decls)].to_vec();

        let all_comments: Vec<Value> = file
            .comments
            .iter()
            .map(|group| comment_texts(Some(group)))
            .collect();

        Ok(Node::new(Kind::File)
            .with("name", self.ident(&file.name))
            .with("comments", comment_texts(file.doc.as_ref()))
            .with("all-comments", all_comments)
            .with("declarations", declarations)
            .with("imports", imports))
    }
}

/// Number of import groups before the first other declaration.
pub fn leading_imports(decls: &[Decl]) -> usize {
    decls.iter().take_while(|d| d.is_import()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::fixtures::ident;
    use crate::position::PositionTable;
    use crate::syntax::{
        BasicLit, Comment, CommentGroup, GenDecl, Ident, ImportSpec, LitKind, Span, Spec, Token,
        TypeSpec,
    };
    use pretty_assertions::assert_eq;

    fn import(path: &str) -> Decl {
        Decl::Gen(GenDecl {
            doc: None,
            tok: Token::Import,
            specs: vec![Spec::Import(ImportSpec {
                doc: None,
                name: None,
                path: BasicLit {
                    kind: LitKind::String,
                    value: format!("\"{path}\""),
                    span: Span::default(),
                },
                comment: None,
                span: Span::default(),
            })],
            span: Span::default(),
        })
    }

    fn type_decl(name: &str) -> Decl {
        Decl::Gen(GenDecl {
            doc: None,
            tok: Token::Type,
            specs: vec![Spec::Type(TypeSpec {
                doc: None,
                name: Ident::new(name, Span::default()),
                assign: false,
                ty: ident("int"),
                comment: None,
                span: Span::default(),
            })],
            span: Span::default(),
        })
    }

    fn file(decls: Vec<Decl>) -> File {
        File {
            doc: Some(CommentGroup {
                list: vec![Comment {
                    text: "// Package p.".into(),
                    span: Span::default(),
                }],
            }),
            name: Ident::new("p", Span::default()),
            decls,
            comments: Vec::new(),
            span: Span::default(),
        }
    }

    #[test]
    fn leading_imports_are_exposed_separately() {
        let source = file(vec![import("fmt"), import("os"), type_decl("T")]);
        let table = PositionTable::empty();
        let node = Normalizer::new(&table).file(&source).unwrap();

        assert_eq!(node.kind(), Kind::File);
        assert!(node.position().is_none());
        let declarations = node.list("declarations").unwrap();
        let imports = node.list("imports").unwrap();
        assert_eq!(declarations.len(), 3);
        assert_eq!(imports.len(), 2);
        assert_eq!(imports, &declarations[..2]);
        assert_eq!(
            node.get("comments").and_then(Value::as_strings),
            Some(&["// Package p.".to_string()][..])
        );
    }

    #[test]
    fn imports_after_other_declarations_are_not_leading() {
        let decls = vec![import("fmt"), type_decl("T"), import("os")];
        assert_eq!(leading_imports(&decls), 1);
        assert_eq!(leading_imports(&[]), 0);
    }
}
