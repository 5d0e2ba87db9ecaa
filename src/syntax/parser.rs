//! Go front end.
//!
//! Parses Go source with tree-sitter and lowers the concrete syntax tree into
//! the [`syntax`](crate::syntax) model. The lowering is purely syntactic and
//! follows Go's own tree conventions: `*x` becomes [`Expr::Star`], conversions
//! become calls with a type-shaped callee, `pkg.T` in type position becomes a
//! selector, and so on. Any `ERROR`/`MISSING` node aborts with a positioned
//! [`SyntaxError`].

use miette::NamedSource;
use tree_sitter::{Node as CstNode, Parser, Tree};

use crate::errors::SyntaxError;
use crate::position::PositionTable;

use super::comments::CommentIndex;
use super::{
    BasicLit, BlockStmt, CallExpr, ChanDir, Comment, Decl, Expr, Field, FieldList, File,
    FuncDecl, FuncType, GenDecl, Ident, ImportSpec, LitKind, Span, Spec, Stmt, Token, TypeSpec,
    ValueSpec,
};

/// Name of the position table built for expression snippets.
pub const EXPR_SOURCE_NAME: &str = "<expr>";
/// Name of the position table built for statement snippets.
pub const STMT_SOURCE_NAME: &str = "<stmt>";

const STMT_PREFIX: &str = "package p; func blah(foo int, bar float64) string { ";
const STMT_SUFFIX: &str = "\n}";
const TYPE_PREFIX: &str = "var _ ";

/// A lowered tree together with the table that resolves its spans.
#[derive(Debug)]
pub struct ParsedSource<T> {
    pub tree: T,
    pub positions: PositionTable,
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses a complete Go source file.
pub fn parse_file(name: &str, source: &str) -> Result<ParsedSource<File>, SyntaxError> {
    let positions = PositionTable::new(name, source);
    let file = {
        let tree = parse_tree(name, source)?;
        let root = tree.root_node();
        let lowerer = Lowerer::new(source, source, 0, name, &positions, root);
        lowerer.check(root)?;
        lowerer.file(root)?
    };
    tracing::debug!(file = name, decls = file.decls.len(), "lowered file");
    Ok(ParsedSource {
        tree: file,
        positions,
    })
}

/// Parses a statement snippet inside a synthetic enclosing function.
///
/// The whole synthetic file is returned so statement-only syntax can be
/// normalized with its surroundings intact.
pub fn parse_stmt(source: &str) -> Result<ParsedSource<File>, SyntaxError> {
    let wrapped = format!("{STMT_PREFIX}{source}{STMT_SUFFIX}");
    let positions = PositionTable::new(STMT_SOURCE_NAME, &wrapped);
    let file = {
        let tree = parse_tree(STMT_SOURCE_NAME, &wrapped)?;
        let root = tree.root_node();
        let lowerer = Lowerer::new(&wrapped, &wrapped, 0, STMT_SOURCE_NAME, &positions, root);
        lowerer.check(root)?;
        lowerer.file(root)?
    };
    Ok(ParsedSource {
        tree: file,
        positions,
    })
}

/// Parses a single free-standing expression. Bare types such as
/// `map[string]int` are accepted as well.
pub fn parse_expr(source: &str) -> Result<ParsedSource<Expr>, SyntaxError> {
    let positions = PositionTable::new(EXPR_SOURCE_NAME, source);
    let as_statement = format!("{source}\n");
    let expr = match lower_snippet(&as_statement, source, 0, &positions, Snippet::Expression) {
        Ok(expr) => expr,
        Err(err) => {
            tracing::trace!("expression parse failed, retrying as a type");
            let as_type = format!("{TYPE_PREFIX}{source}\n");
            lower_snippet(&as_type, source, TYPE_PREFIX.len(), &positions, Snippet::Type)
                .map_err(|_| err)?
        }
    };
    Ok(ParsedSource {
        tree: expr,
        positions,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Snippet {
    Expression,
    Type,
}

fn lower_snippet(
    cst: &str,
    text: &str,
    base: usize,
    positions: &PositionTable,
    snippet: Snippet,
) -> Result<Expr, SyntaxError> {
    let tree = parse_tree(EXPR_SOURCE_NAME, cst)?;
    let root = tree.root_node();
    let lowerer = Lowerer::new(cst, text, base, EXPR_SOURCE_NAME, positions, root);
    lowerer.check(root)?;

    match (snippet, named(root).as_slice()) {
        (Snippet::Expression, [stmt]) if stmt.kind() == "expression_statement" => {
            let inner = lowerer.first_named(*stmt)?;
            lowerer.expr(inner)
        }
        (Snippet::Type, [decl]) if decl.kind() == "var_declaration" => lowerer.bare_type(*decl),
        _ => Err(lowerer.error(root, "syntax error: expected a single expression")),
    }
}

fn parse_tree(name: &str, source: &str) -> Result<Tree, SyntaxError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| {
            SyntaxError::positionless(
                format!("failed to load Go grammar: {e}"),
                NamedSource::new(name, source.to_string()),
            )
        })?;
    parser.parse(source, None).ok_or_else(|| {
        SyntaxError::positionless(
            "parser produced no syntax tree",
            NamedSource::new(name, source.to_string()),
        )
    })
}

// ============================================================================
// LOWERING STATE
// ============================================================================

/// Lowers one concrete tree.
///
/// `cst` is the exact text the tree was parsed from; `text` is the text
/// positions and diagnostics refer to. They differ only by a synthetic prefix
/// of `base` bytes.
struct Lowerer<'a> {
    cst: &'a str,
    text: &'a str,
    base: usize,
    name: &'a str,
    table: &'a PositionTable,
    comments: CommentIndex<'a>,
}

impl<'a> Lowerer<'a> {
    fn new(
        cst: &'a str,
        text: &'a str,
        base: usize,
        name: &'a str,
        table: &'a PositionTable,
        root: CstNode<'_>,
    ) -> Self {
        let mut found = Vec::new();
        collect_comments(root, &mut found);
        let comments = found
            .into_iter()
            .map(|node| Comment {
                text: node.utf8_text(cst.as_bytes()).unwrap_or("").to_string(),
                span: clamp_span(node.start_byte(), node.end_byte(), base, text.len()),
            })
            .collect();
        Self {
            cst,
            text,
            base,
            name,
            table,
            comments: CommentIndex::build(text, comments, table),
        }
    }

    fn check(&self, root: CstNode<'_>) -> Result<(), SyntaxError> {
        match first_error(root) {
            None => Ok(()),
            Some(node) if node.is_missing() => Err(self.error(
                node,
                format!("syntax error: missing `{}`", node.kind()),
            )),
            Some(node) => Err(self.error(
                node,
                format!("syntax error: unexpected {}", self.describe(node)),
            )),
        }
    }

    // ========================================================================
    // FILES AND DECLARATIONS
    // ========================================================================

    fn file(self, root: CstNode<'_>) -> Result<File, SyntaxError> {
        let mut package: Option<(Ident, Span)> = None;
        let mut decls = Vec::new();

        for child in named(root) {
            match child.kind() {
                "package_clause" if package.is_none() && decls.is_empty() => {
                    let name = self.first_named(child)?;
                    package = Some((self.ident(name), self.span(child)));
                }
                "import_declaration" | "const_declaration" | "var_declaration"
                | "type_declaration"
                    if package.is_some() =>
                {
                    decls.push(Decl::Gen(self.gen_decl(child)?));
                }
                "function_declaration" | "method_declaration" if package.is_some() => {
                    decls.push(Decl::Func(self.func_decl(child)?));
                }
                _ if package.is_none() => {
                    return Err(self.error(child, "syntax error: package statement must be first"))
                }
                _ => {
                    return Err(self.error(
                        child,
                        "syntax error: non-declaration statement outside function body",
                    ))
                }
            }
        }

        let (name, clause) = package.ok_or_else(|| {
            self.error(root, "syntax error: package statement must be first")
        })?;
        let doc = self.comments.doc_for(clause.start, self.table);
        let span = self.span(root);
        Ok(File {
            doc,
            name,
            decls,
            comments: self.comments.into_groups(),
            span,
        })
    }

    fn gen_decl(&self, node: CstNode<'_>) -> Result<GenDecl, SyntaxError> {
        let tok = match node.kind() {
            "import_declaration" => Token::Import,
            "const_declaration" => Token::Const,
            "var_declaration" => Token::Var,
            "type_declaration" => Token::Type,
            _ => return Err(self.unsupported(node)),
        };
        let grouped = has_token(node, "(");

        let mut specs = Vec::new();
        for child in named(node) {
            match child.kind() {
                "import_spec_list" | "var_spec_list" => {
                    for spec in named(child) {
                        specs.push(self.spec(spec, true)?);
                    }
                }
                _ => specs.push(self.spec(child, grouped)?),
            }
        }

        Ok(GenDecl {
            doc: self.comments.doc_for(self.span(node).start, self.table),
            tok,
            specs,
            span: self.span(node),
        })
    }

    fn spec(&self, node: CstNode<'_>, grouped: bool) -> Result<Spec, SyntaxError> {
        let span = self.span(node);
        let doc = if grouped {
            self.comments.doc_for(span.start, self.table)
        } else {
            None
        };
        let comment = self.comments.line_comment_for(span.end, self.table);

        match node.kind() {
            "import_spec" => {
                let path = self.required_field(node, "path")?;
                Ok(Spec::Import(ImportSpec {
                    doc,
                    name: field(node, "name").map(|n| self.ident(n)),
                    path: self.lit(path, LitKind::String),
                    comment,
                    span,
                }))
            }
            "const_spec" | "var_spec" => {
                let names = fields(node, "name")
                    .into_iter()
                    .map(|n| self.ident(n))
                    .collect();
                Ok(Spec::Value(ValueSpec {
                    doc,
                    names,
                    ty: field(node, "type").map(|t| self.expr(t)).transpose()?,
                    values: match field(node, "value") {
                        Some(values) => self.expr_list(values)?,
                        None => Vec::new(),
                    },
                    comment,
                    span,
                }))
            }
            "type_spec" | "type_alias" => {
                if let Some(params) = field(node, "type_parameters") {
                    return Err(self.unsupported(params));
                }
                let name = self.required_field(node, "name")?;
                let ty = self.required_field(node, "type")?;
                Ok(Spec::Type(TypeSpec {
                    doc,
                    name: self.ident(name),
                    assign: node.kind() == "type_alias",
                    ty: self.expr(ty)?,
                    comment,
                    span,
                }))
            }
            _ => Err(self.unsupported(node)),
        }
    }

    fn func_decl(&self, node: CstNode<'_>) -> Result<FuncDecl, SyntaxError> {
        let recv = match field(node, "receiver") {
            Some(receiver) => {
                let list = self.params(receiver)?;
                match list.list.len() {
                    0 => return Err(self.error(receiver, "syntax error: method has no receiver")),
                    1 => Some(list),
                    _ => {
                        return Err(self.error(receiver, "syntax error: method has multiple receivers"))
                    }
                }
            }
            None => None,
        };
        let name = self.required_field(node, "name")?;
        let span = self.span(node);

        Ok(FuncDecl {
            doc: self.comments.doc_for(span.start, self.table),
            recv,
            name: self.ident(name),
            ty: self.signature(node)?,
            body: field(node, "body").map(|b| self.block(b)).transpose()?,
            span,
        })
    }

    // ========================================================================
    // SIGNATURES AND FIELDS
    // ========================================================================

    fn signature(&self, node: CstNode<'_>) -> Result<FuncType, SyntaxError> {
        if let Some(params) = field(node, "type_parameters") {
            return Err(self.unsupported(params));
        }
        let params = match field(node, "parameters") {
            Some(list) => self.params(list)?,
            None => FieldList::default(),
        };
        let results = field(node, "result").map(|r| self.results(r)).transpose()?;
        Ok(FuncType {
            params,
            results,
            span: self.span(node),
        })
    }

    fn params(&self, list: CstNode<'_>) -> Result<FieldList, SyntaxError> {
        let mut fields_out = Vec::new();
        for param in named(list) {
            let ty_node = self.required_field(param, "type")?;
            let ty = self.expr(ty_node)?;
            let (names, ty) = match param.kind() {
                "parameter_declaration" => (self.idents(fields(param, "name")), ty),
                "variadic_parameter_declaration" => {
                    let dots = token_span(param, "...").map_or(self.span(param), |s| self.span_of(s.start, s.end));
                    let ellipsis = Expr::Ellipsis {
                        span: dots.to(ty.span()),
                        elt: Some(Box::new(ty)),
                    };
                    (self.idents(fields(param, "name")), ellipsis)
                }
                _ => return Err(self.unsupported(param)),
            };
            fields_out.push(Field {
                names,
                ty,
                tag: None,
                span: self.span(param),
            });
        }
        Ok(FieldList {
            list: fields_out,
            span: self.span(list),
        })
    }

    fn results(&self, node: CstNode<'_>) -> Result<FieldList, SyntaxError> {
        if node.kind() == "parameter_list" {
            return self.params(node);
        }
        let span = self.span(node);
        Ok(FieldList {
            list: vec![Field {
                names: Vec::new(),
                ty: self.expr(node)?,
                tag: None,
                span,
            }],
            span,
        })
    }

    fn struct_fields(&self, node: CstNode<'_>) -> Result<FieldList, SyntaxError> {
        let list = named(node)
            .into_iter()
            .find(|c| c.kind() == "field_declaration_list")
            .unwrap_or(node);

        let mut out = Vec::new();
        for decl in named(list) {
            if decl.kind() != "field_declaration" {
                return Err(self.unsupported(decl));
            }
            let names = self.idents(fields(decl, "name"));
            let ty_node = self.required_field(decl, "type")?;
            let mut ty = self.expr(ty_node)?;
            if names.is_empty() {
                if let Some(star) = token_span(decl, "*") {
                    ty = Expr::Star {
                        span: self.span_of(star.start, ty_node.end_byte()),
                        x: Box::new(ty),
                    };
                }
            }
            out.push(Field {
                names,
                ty,
                tag: field(decl, "tag").map(|t| self.lit(t, LitKind::String)),
                span: self.span(decl),
            });
        }
        Ok(FieldList {
            list: out,
            span: self.span(list),
        })
    }

    fn interface_methods(&self, node: CstNode<'_>) -> Result<FieldList, SyntaxError> {
        let mut out = Vec::new();
        for elem in named(node) {
            let span = self.span(elem);
            match elem.kind() {
                "method_elem" | "method_spec" => {
                    let name = self.required_field(elem, "name")?;
                    out.push(Field {
                        names: vec![self.ident(name)],
                        ty: Expr::FuncType(self.signature(elem)?),
                        tag: None,
                        span,
                    });
                }
                "type_elem" | "constraint_elem" | "interface_type_name" => {
                    let parts = named(elem);
                    let [embedded] = parts.as_slice() else {
                        return Err(self.unsupported(elem));
                    };
                    out.push(Field {
                        names: Vec::new(),
                        ty: self.expr(*embedded)?,
                        tag: None,
                        span,
                    });
                }
                _ => out.push(Field {
                    names: Vec::new(),
                    ty: self.expr(elem)?,
                    tag: None,
                    span,
                }),
            }
        }
        Ok(FieldList {
            list: out,
            span: self.span(node),
        })
    }

    // ========================================================================
    // EXPRESSIONS AND TYPES
    // ========================================================================

    fn expr(&self, node: CstNode<'_>) -> Result<Expr, SyntaxError> {
        let span = self.span(node);
        tracing::trace!(kind = node.kind(), "lowering expression");

        let expr = match node.kind() {
            "identifier" | "type_identifier" | "field_identifier" | "package_identifier"
            | "blank_identifier" | "label_name" | "true" | "false" | "nil" | "iota" | "dot" => {
                Expr::Ident(self.ident(node))
            }

            "int_literal" => Expr::BasicLit(self.lit(node, LitKind::Int)),
            "float_literal" => Expr::BasicLit(self.lit(node, LitKind::Float)),
            "imaginary_literal" => Expr::BasicLit(self.lit(node, LitKind::Imag)),
            "rune_literal" => Expr::BasicLit(self.lit(node, LitKind::Char)),
            "interpreted_string_literal" | "raw_string_literal" => {
                Expr::BasicLit(self.lit(node, LitKind::String))
            }

            "parenthesized_expression" | "parenthesized_type" => Expr::Paren {
                x: self.boxed(self.first_named(node)?)?,
                span,
            },

            "unary_expression" => {
                let operand = self.boxed(self.required_field(node, "operand")?)?;
                match self.operator(node)? {
                    Token::Mul => Expr::Star { x: operand, span },
                    op => Expr::Unary {
                        op,
                        x: operand,
                        span,
                    },
                }
            }

            "binary_expression" => Expr::Binary {
                x: self.boxed(self.required_field(node, "left")?)?,
                op: self.operator(node)?,
                y: self.boxed(self.required_field(node, "right")?)?,
                span,
            },

            "selector_expression" => Expr::Selector {
                x: self.boxed(self.required_field(node, "operand")?)?,
                sel: self.ident(self.required_field(node, "field")?),
                span,
            },

            "qualified_type" => Expr::Selector {
                x: Box::new(Expr::Ident(self.ident(self.required_field(node, "package")?))),
                sel: self.ident(self.required_field(node, "name")?),
                span,
            },

            "index_expression" => {
                let indices = fields(node, "index");
                let [index] = indices.as_slice() else {
                    return Err(self.unsupported(node));
                };
                Expr::Index {
                    x: self.boxed(self.required_field(node, "operand")?)?,
                    index: self.boxed(*index)?,
                    span,
                }
            }

            "slice_expression" => {
                let max = self.optional(node, "capacity")?;
                Expr::Slice {
                    x: self.boxed(self.required_field(node, "operand")?)?,
                    low: self.optional(node, "start")?,
                    high: self.optional(node, "end")?,
                    slice3: max.is_some(),
                    max,
                    span,
                }
            }

            "type_assertion_expression" => Expr::TypeAssert {
                x: self.boxed(self.required_field(node, "operand")?)?,
                ty: Some(self.boxed(self.required_field(node, "type")?)?),
                span,
            },

            "call_expression" => Expr::Call(self.call(node)?),

            "type_conversion_expression" => Expr::Call(CallExpr {
                fun: self.boxed(self.required_field(node, "type")?)?,
                args: vec![self.expr(self.required_field(node, "operand")?)?],
                ellipsis: None,
                span,
            }),

            "composite_literal" => {
                let body = self.required_field(node, "body")?;
                Expr::CompositeLit {
                    ty: Some(self.boxed(self.required_field(node, "type")?)?),
                    elts: self.elements(body)?,
                    span,
                }
            }

            "literal_value" => Expr::CompositeLit {
                ty: None,
                elts: self.elements(node)?,
                span,
            },

            "literal_element" => return self.expr(self.first_named(node)?),

            "keyed_element" => {
                let parts = named(node);
                let (key, value) = match (field(node, "key"), field(node, "value"), parts.as_slice()) {
                    (Some(key), Some(value), _) => (key, value),
                    (_, _, [key, value]) => (*key, *value),
                    _ => return Err(self.unsupported(node)),
                };
                Expr::KeyValue {
                    key: self.boxed(key)?,
                    value: self.boxed(value)?,
                    span,
                }
            }

            "func_literal" => Expr::FuncLit {
                ty: self.signature(node)?,
                body: self.block(self.required_field(node, "body")?)?,
                span,
            },

            "pointer_type" => Expr::Star {
                x: self.boxed(self.first_named(node)?)?,
                span,
            },

            "array_type" => Expr::ArrayType {
                len: Some(self.boxed(self.required_field(node, "length")?)?),
                elt: self.boxed(self.required_field(node, "element")?)?,
                span,
            },

            "implicit_length_array_type" => {
                let dots = token_span(node, "...")
                    .map_or(span, |s| self.span_of(s.start, s.end));
                Expr::ArrayType {
                    len: Some(Box::new(Expr::Ellipsis {
                        elt: None,
                        span: dots,
                    })),
                    elt: self.boxed(self.required_field(node, "element")?)?,
                    span,
                }
            }

            "slice_type" => Expr::ArrayType {
                len: None,
                elt: self.boxed(self.required_field(node, "element")?)?,
                span,
            },

            "map_type" => Expr::MapType {
                key: self.boxed(self.required_field(node, "key")?)?,
                value: self.boxed(self.required_field(node, "value")?)?,
                span,
            },

            "channel_type" => Expr::ChanType {
                dir: channel_dir(node),
                value: self.boxed(self.required_field(node, "value")?)?,
                span,
            },

            "function_type" => Expr::FuncType(self.signature(node)?),

            "struct_type" => Expr::StructType {
                fields: self.struct_fields(node)?,
                incomplete: false,
                span,
            },

            "interface_type" => Expr::InterfaceType {
                methods: self.interface_methods(node)?,
                incomplete: false,
                span,
            },

            _ => return Err(self.unsupported(node)),
        };
        Ok(expr)
    }

    fn call(&self, node: CstNode<'_>) -> Result<CallExpr, SyntaxError> {
        if let Some(type_args) = field(node, "type_arguments") {
            return Err(self.unsupported(type_args));
        }
        let fun = self.boxed(self.required_field(node, "function")?)?;
        let arguments = self.required_field(node, "arguments")?;

        let mut args = Vec::new();
        let mut ellipsis = None;
        for arg in named(arguments) {
            if arg.kind() == "variadic_argument" {
                ellipsis = token_span(arg, "...").map(|s| self.span_of(s.start, s.end).start);
                args.push(self.expr(self.first_named(arg)?)?);
            } else {
                args.push(self.expr(arg)?);
            }
        }

        Ok(CallExpr {
            fun,
            args,
            ellipsis,
            span: self.span(node),
        })
    }

    fn elements(&self, body: CstNode<'_>) -> Result<Vec<Expr>, SyntaxError> {
        named(body).into_iter().map(|e| self.expr(e)).collect()
    }

    fn expr_list(&self, node: CstNode<'_>) -> Result<Vec<Expr>, SyntaxError> {
        if node.kind() != "expression_list" {
            return Ok(vec![self.expr(node)?]);
        }
        named(node).into_iter().map(|e| self.expr(e)).collect()
    }

    fn bare_type(&self, decl: CstNode<'_>) -> Result<Expr, SyntaxError> {
        let specs = named(decl);
        let [spec] = specs.as_slice() else {
            return Err(self.error(decl, "syntax error: expected a single expression"));
        };
        let names = fields(*spec, "name");
        let blank = names.len() == 1 && self.text_of(names[0]) == "_";
        match field(*spec, "type") {
            Some(ty) if blank && field(*spec, "value").is_none() => self.expr(ty),
            _ => Err(self.error(*spec, "syntax error: expected a single expression")),
        }
    }

    // ========================================================================
    // STATEMENTS
    // ========================================================================

    fn block(&self, node: CstNode<'_>) -> Result<BlockStmt, SyntaxError> {
        Ok(BlockStmt {
            list: self.stmt_list(named(node))?,
            span: self.span(node),
        })
    }

    fn stmt_list(&self, nodes: Vec<CstNode<'_>>) -> Result<Vec<Stmt>, SyntaxError> {
        let mut out = Vec::new();
        for node in nodes {
            if node.kind() == "statement_list" {
                out.extend(self.stmt_list(named(node))?);
            } else {
                out.push(self.stmt(node)?);
            }
        }
        Ok(out)
    }

    fn stmt(&self, node: CstNode<'_>) -> Result<Stmt, SyntaxError> {
        let span = self.span(node);
        tracing::trace!(kind = node.kind(), "lowering statement");

        let stmt = match node.kind() {
            "expression_statement" => Stmt::Expr {
                x: self.expr(self.first_named(node)?)?,
                span,
            },

            "send_statement" => Stmt::Send {
                chan: self.expr(self.required_field(node, "channel")?)?,
                value: self.expr(self.required_field(node, "value")?)?,
                span,
            },

            "inc_statement" | "dec_statement" => Stmt::IncDec {
                x: self.expr(self.first_named(node)?)?,
                tok: if node.kind() == "inc_statement" {
                    Token::Inc
                } else {
                    Token::Dec
                },
                span,
            },

            "assignment_statement" => Stmt::Assign {
                lhs: self.expr_list(self.required_field(node, "left")?)?,
                tok: self.operator(node)?,
                rhs: self.expr_list(self.required_field(node, "right")?)?,
                span,
            },

            "short_var_declaration" => Stmt::Assign {
                lhs: self.expr_list(self.required_field(node, "left")?)?,
                tok: Token::Define,
                rhs: self.expr_list(self.required_field(node, "right")?)?,
                span,
            },

            "return_statement" => Stmt::Return {
                results: match named(node).into_iter().next() {
                    Some(list) => self.expr_list(list)?,
                    None => Vec::new(),
                },
                span,
            },

            "go_statement" => Stmt::Go {
                call: self.call_operand(node, "go")?,
                span,
            },

            "defer_statement" => Stmt::Defer {
                call: self.call_operand(node, "defer")?,
                span,
            },

            "if_statement" => Stmt::If {
                init: self.optional_stmt(node, "initializer")?,
                cond: self.expr(self.required_field(node, "condition")?)?,
                body: self.block(self.required_field(node, "consequence")?)?,
                els: self.optional_stmt(node, "alternative")?,
                span,
            },

            "for_statement" => self.for_stmt(node)?,

            "expression_switch_statement" => Stmt::Switch {
                init: self.optional_stmt(node, "initializer")?,
                tag: field(node, "value").map(|v| self.expr(v)).transpose()?,
                body: self.clauses(node)?,
                span,
            },

            "type_switch_statement" => self.type_switch(node)?,

            "select_statement" => Stmt::Select {
                body: self.clauses(node)?,
                span,
            },

            "labeled_statement" => {
                let label = self.required_field(node, "label")?;
                let inner = named(node).into_iter().find(|c| c.id() != label.id());
                let stmt = match inner {
                    Some(inner) => self.stmt(inner)?,
                    None => Stmt::Empty {
                        span: Span::new(span.end, span.end),
                    },
                };
                Stmt::Labeled {
                    label: self.ident(label),
                    stmt: Box::new(stmt),
                    span,
                }
            }

            "break_statement" | "continue_statement" | "goto_statement" => Stmt::Branch {
                tok: match node.kind() {
                    "break_statement" => Token::Break,
                    "continue_statement" => Token::Continue,
                    _ => Token::Goto,
                },
                label: named(node).into_iter().next().map(|l| self.ident(l)),
                span,
            },

            "fallthrough_statement" => Stmt::Branch {
                tok: Token::Fallthrough,
                label: None,
                span,
            },

            "block" => Stmt::Block(self.block(node)?),

            "empty_statement" => Stmt::Empty { span },

            "const_declaration" | "var_declaration" | "type_declaration" => Stmt::Decl {
                decl: Decl::Gen(self.gen_decl(node)?),
                span,
            },

            _ => return Err(self.unsupported(node)),
        };
        Ok(stmt)
    }

    fn for_stmt(&self, node: CstNode<'_>) -> Result<Stmt, SyntaxError> {
        let span = self.span(node);
        let body = self.block(self.required_field(node, "body")?)?;
        let head = named(node).into_iter().find(|c| c.kind() != "block");

        let stmt = match head {
            Some(clause) if clause.kind() == "for_clause" => Stmt::For {
                init: self.optional_stmt(clause, "initializer")?,
                cond: field(clause, "condition").map(|c| self.expr(c)).transpose()?,
                post: self.optional_stmt(clause, "update")?,
                body,
                span,
            },
            Some(clause) if clause.kind() == "range_clause" => {
                let mut targets = match field(clause, "left") {
                    Some(left) => self.expr_list(left)?.into_iter(),
                    None => Vec::new().into_iter(),
                };
                let tok = if has_token(clause, ":=") {
                    Some(Token::Define)
                } else if has_token(clause, "=") {
                    Some(Token::Assign)
                } else {
                    None
                };
                Stmt::Range {
                    key: targets.next(),
                    value: targets.next(),
                    tok,
                    x: self.expr(self.required_field(clause, "right")?)?,
                    body,
                    span,
                }
            }
            Some(cond) => Stmt::For {
                init: None,
                cond: Some(self.expr(cond)?),
                post: None,
                body,
                span,
            },
            None => Stmt::For {
                init: None,
                cond: None,
                post: None,
                body,
                span,
            },
        };
        Ok(stmt)
    }

    fn type_switch(&self, node: CstNode<'_>) -> Result<Stmt, SyntaxError> {
        let value = self.required_field(node, "value")?;
        let close = children(node)
            .into_iter()
            .take_while(|c| c.kind() != "{")
            .filter(|c| c.kind() == ")")
            .last()
            .map_or(value.end_byte(), |c| c.end_byte());
        let guard = Expr::TypeAssert {
            x: self.boxed(value)?,
            ty: None,
            span: self.span_of(value.start_byte(), close),
        };

        let assign = match field(node, "alias") {
            Some(alias) => Stmt::Assign {
                lhs: self.expr_list(alias)?,
                tok: Token::Define,
                span: self.span_of(alias.start_byte(), close),
                rhs: vec![guard],
            },
            None => Stmt::Expr {
                span: guard.span(),
                x: guard,
            },
        };

        Ok(Stmt::TypeSwitch {
            init: self.optional_stmt(node, "initializer")?,
            assign: Box::new(assign),
            body: self.clauses(node)?,
            span: self.span(node),
        })
    }

    /// The `{ case ...: ... }` body of a switch, type switch or select.
    fn clauses(&self, node: CstNode<'_>) -> Result<BlockStmt, SyntaxError> {
        let open = token_span(node, "{").map_or(node.start_byte(), |s| s.start);
        let mut list = Vec::new();
        for clause in named(node) {
            let span = self.span(clause);
            let stmt = match clause.kind() {
                "expression_case" => Stmt::CaseClause {
                    list: self.expr_list(self.required_field(clause, "value")?)?,
                    body: self.clause_body(clause)?,
                    span,
                },
                "type_case" => Stmt::CaseClause {
                    list: fields(clause, "type")
                        .into_iter()
                        .map(|t| self.expr(t))
                        .collect::<Result<_, _>>()?,
                    body: self.clause_body(clause)?,
                    span,
                },
                "communication_case" => Stmt::CommClause {
                    comm: Some(Box::new(self.comm(self.required_field(clause, "communication")?)?)),
                    body: self.clause_body(clause)?,
                    span,
                },
                "default_case" if node.kind() == "select_statement" => Stmt::CommClause {
                    comm: None,
                    body: self.clause_body(clause)?,
                    span,
                },
                "default_case" => Stmt::CaseClause {
                    list: Vec::new(),
                    body: self.clause_body(clause)?,
                    span,
                },
                _ => continue,
            };
            list.push(stmt);
        }
        Ok(BlockStmt {
            list,
            span: self.span_of(open, node.end_byte()),
        })
    }

    /// Statements after the `:` of a case clause.
    fn clause_body(&self, clause: CstNode<'_>) -> Result<Vec<Stmt>, SyntaxError> {
        let body = children(clause)
            .into_iter()
            .skip_while(|c| c.is_named() || c.kind() != ":")
            .skip(1)
            .filter(|c| c.is_named() && c.kind() != "comment")
            .collect();
        self.stmt_list(body)
    }

    fn comm(&self, node: CstNode<'_>) -> Result<Stmt, SyntaxError> {
        if node.kind() != "receive_statement" {
            return self.stmt(node);
        }
        let span = self.span(node);
        let right = self.expr(self.required_field(node, "right")?)?;
        Ok(match field(node, "left") {
            Some(left) => Stmt::Assign {
                lhs: self.expr_list(left)?,
                tok: if has_token(node, ":=") {
                    Token::Define
                } else {
                    Token::Assign
                },
                rhs: vec![right],
                span,
            },
            None => Stmt::Expr { x: right, span },
        })
    }

    fn call_operand(&self, node: CstNode<'_>, keyword: &str) -> Result<CallExpr, SyntaxError> {
        let operand = self.first_named(node)?;
        let expr = self.expr(operand)?;
        match expr.unparen() {
            Expr::Call(call) => Ok(call.clone()),
            _ => Err(self.error(
                operand,
                format!("syntax error: expression in {keyword} must be function call"),
            )),
        }
    }

    fn optional_stmt(&self, node: CstNode<'_>, name: &str) -> Result<Option<Box<Stmt>>, SyntaxError> {
        field(node, name)
            .map(|s| self.stmt(s).map(Box::new))
            .transpose()
    }

    // ========================================================================
    // UTILITIES
    // ========================================================================

    fn span(&self, node: CstNode<'_>) -> Span {
        self.span_of(node.start_byte(), node.end_byte())
    }

    fn span_of(&self, start: usize, end: usize) -> Span {
        clamp_span(start, end, self.base, self.text.len())
    }

    fn text_of(&self, node: CstNode<'_>) -> &'a str {
        node.utf8_text(self.cst.as_bytes()).unwrap_or("")
    }

    fn ident(&self, node: CstNode<'_>) -> Ident {
        Ident::new(self.text_of(node), self.span(node))
    }

    fn idents(&self, nodes: Vec<CstNode<'_>>) -> Vec<Ident> {
        nodes.into_iter().map(|n| self.ident(n)).collect()
    }

    fn lit(&self, node: CstNode<'_>, kind: LitKind) -> BasicLit {
        BasicLit {
            kind,
            value: self.text_of(node).to_string(),
            span: self.span(node),
        }
    }

    fn boxed(&self, node: CstNode<'_>) -> Result<Box<Expr>, SyntaxError> {
        self.expr(node).map(Box::new)
    }

    fn optional(&self, node: CstNode<'_>, name: &str) -> Result<Option<Box<Expr>>, SyntaxError> {
        field(node, name).map(|n| self.boxed(n)).transpose()
    }

    fn operator(&self, node: CstNode<'_>) -> Result<Token, SyntaxError> {
        let op = self.required_field(node, "operator")?;
        Token::from_symbol(self.text_of(op)).ok_or_else(|| self.unsupported(op))
    }

    fn first_named<'t>(&self, node: CstNode<'t>) -> Result<CstNode<'t>, SyntaxError> {
        named(node)
            .into_iter()
            .next()
            .ok_or_else(|| self.error(node, format!("syntax error: incomplete {}", node.kind())))
    }

    fn required_field<'t>(&self, node: CstNode<'t>, name: &str) -> Result<CstNode<'t>, SyntaxError> {
        field(node, name).ok_or_else(|| {
            self.error(node, format!("syntax error: {} without {name}", node.kind()))
        })
    }

    fn describe(&self, node: CstNode<'_>) -> String {
        let snippet: String = self
            .text_of(node)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("")
            .chars()
            .take(24)
            .collect();
        if snippet.is_empty() {
            "newline".to_string()
        } else {
            format!("`{snippet}`")
        }
    }

    // ========================================================================
    // ERROR HANDLING
    // ========================================================================

    fn error(&self, node: CstNode<'_>, message: impl Into<String>) -> SyntaxError {
        let span = self.span(node);
        SyntaxError::at(
            message,
            self.table.resolve(span.start),
            NamedSource::new(self.name, self.text.to_string()),
            span,
        )
    }

    fn unsupported(&self, node: CstNode<'_>) -> SyntaxError {
        self.error(node, format!("unsupported syntax `{}`", node.kind()))
    }
}

// ============================================================================
// TREE HELPERS
// ============================================================================

fn children(node: CstNode<'_>) -> Vec<CstNode<'_>> {
    let mut cursor = node.walk();
    let children = node.children(&mut cursor).collect();
    children
}

/// Named children, without comments.
fn named(node: CstNode<'_>) -> Vec<CstNode<'_>> {
    let mut cursor = node.walk();
    let named = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect();
    named
}

fn field<'t>(node: CstNode<'t>, name: &str) -> Option<CstNode<'t>> {
    node.child_by_field_name(name)
}

/// Named children under field `name`. A field spanning a comma-separated
/// list also covers the separators, which are dropped here.
fn fields<'t>(node: CstNode<'t>, name: &str) -> Vec<CstNode<'t>> {
    let mut cursor = node.walk();
    let fields = node
        .children_by_field_name(name, &mut cursor)
        .filter(|c| c.is_named() && c.kind() != "comment")
        .collect();
    fields
}

/// Span in user-text coordinates of a CST byte range parsed behind a
/// `base`-byte synthetic prefix.
fn clamp_span(start: usize, end: usize, base: usize, len: usize) -> Span {
    let clamp = |offset: usize| offset.saturating_sub(base).min(len);
    Span::new(clamp(start), clamp(end))
}

fn has_token(node: CstNode<'_>, token: &str) -> bool {
    token_span(node, token).is_some()
}

/// Raw byte range of the first anonymous `token` child of `node`.
fn token_span(node: CstNode<'_>, token: &str) -> Option<Span> {
    children(node)
        .into_iter()
        .find(|c| !c.is_named() && c.kind() == token)
        .map(|c| Span::new(c.start_byte(), c.end_byte()))
}

fn channel_dir(node: CstNode<'_>) -> ChanDir {
    let tokens: Vec<&str> = children(node)
        .into_iter()
        .filter(|c| !c.is_named())
        .map(|c| c.kind())
        .collect();
    match tokens.as_slice() {
        ["<-", "chan", ..] => ChanDir::RECV,
        ["chan", "<-", ..] => ChanDir::SEND,
        _ => ChanDir::BOTH,
    }
}

fn collect_comments<'t>(node: CstNode<'t>, out: &mut Vec<CstNode<'t>>) {
    if node.kind() == "comment" {
        out.push(node);
        return;
    }
    for child in children(node) {
        collect_comments(child, out);
    }
}

fn first_error(node: CstNode<'_>) -> Option<CstNode<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    children(node).into_iter().find_map(first_error)
}
