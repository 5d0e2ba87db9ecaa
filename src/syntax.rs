//! Syntax module: the Go syntax tree consumed by the normalizer.
//!
//! The tree mirrors the shapes of a Go parser's node hierarchy closely enough
//! that the normalizer can dispatch on them one variant at a time. Nodes are
//! produced by [`parser`] from source text, or built directly by library
//! callers; either way they are immutable for the duration of a traversal.
//!
//! Type expressions share the [`Expr`] enum with value expressions: the same
//! syntactic shape can be read either way depending on where it occurs.

pub mod comments;
pub mod parser;
pub mod token;

pub use token::Token;

use std::fmt;

// ============================================================================
// SPANS AND LEAVES
// ============================================================================

/// Byte range of a node in the source its position table was built from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Lexical category of a basic literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

impl LitKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LitKind::Int => "INT",
            LitKind::Float => "FLOAT",
            LitKind::Imag => "IMAG",
            LitKind::Char => "CHAR",
            LitKind::String => "STRING",
        }
    }
}

impl fmt::Display for LitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A literal exactly as written; `value` keeps quotes, prefixes and exponents.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicLit {
    pub kind: LitKind,
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// Raw comment text including its `//` or `/* */` markers.
    pub text: String,
    pub span: Span,
}

/// Adjacent comments with no blank line or token between them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentGroup {
    pub list: Vec<Comment>,
}

impl CommentGroup {
    pub fn span(&self) -> Span {
        match (self.list.first(), self.list.last()) {
            (Some(first), Some(last)) => first.span.to(last.span),
            _ => Span::default(),
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.list.iter().map(|c| c.text.clone()).collect()
    }
}

// ============================================================================
// FIELDS AND SIGNATURES
// ============================================================================

/// A struct field, interface method, parameter, result, or receiver.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub names: Vec<Ident>,
    pub ty: Expr,
    pub tag: Option<BasicLit>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldList {
    pub list: Vec<Field>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncType {
    pub params: FieldList,
    pub results: Option<FieldList>,
    pub span: Span,
}

/// Channel direction bits. A well-formed tree always has at least one set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChanDir {
    pub send: bool,
    pub recv: bool,
}

impl ChanDir {
    pub const SEND: ChanDir = ChanDir {
        send: true,
        recv: false,
    };
    pub const RECV: ChanDir = ChanDir {
        send: false,
        recv: true,
    };
    pub const BOTH: ChanDir = ChanDir {
        send: true,
        recv: true,
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub fun: Box<Expr>,
    pub args: Vec<Expr>,
    /// Offset of a trailing `...` spread, if present.
    pub ellipsis: Option<usize>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockStmt {
    pub list: Vec<Stmt>,
    pub span: Span,
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A region the parser could not make sense of.
    Bad { span: Span },
    Ident(Ident),
    /// `...T` in a parameter list, or the `...` length of `[...]T`.
    Ellipsis {
        elt: Option<Box<Expr>>,
        span: Span,
    },
    BasicLit(BasicLit),
    FuncLit {
        ty: FuncType,
        body: BlockStmt,
        span: Span,
    },
    CompositeLit {
        /// `None` for elided element types such as the inner `{1, 2}` in `[][]int{{1, 2}}`.
        ty: Option<Box<Expr>>,
        elts: Vec<Expr>,
        span: Span,
    },
    Paren {
        x: Box<Expr>,
        span: Span,
    },
    Selector {
        x: Box<Expr>,
        sel: Ident,
        span: Span,
    },
    Index {
        x: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    Slice {
        x: Box<Expr>,
        low: Option<Box<Expr>>,
        high: Option<Box<Expr>>,
        max: Option<Box<Expr>>,
        slice3: bool,
        span: Span,
    },
    TypeAssert {
        x: Box<Expr>,
        /// `None` for the `x.(type)` guard of a type switch.
        ty: Option<Box<Expr>>,
        span: Span,
    },
    Call(CallExpr),
    /// Pointer dereference in value position, pointer type in type position.
    Star {
        x: Box<Expr>,
        span: Span,
    },
    Unary {
        op: Token,
        x: Box<Expr>,
        span: Span,
    },
    Binary {
        x: Box<Expr>,
        op: Token,
        y: Box<Expr>,
        span: Span,
    },
    KeyValue {
        key: Box<Expr>,
        value: Box<Expr>,
        span: Span,
    },
    ArrayType {
        /// `None` for slices.
        len: Option<Box<Expr>>,
        elt: Box<Expr>,
        span: Span,
    },
    StructType {
        fields: FieldList,
        incomplete: bool,
        span: Span,
    },
    FuncType(FuncType),
    InterfaceType {
        methods: FieldList,
        incomplete: bool,
        span: Span,
    },
    MapType {
        key: Box<Expr>,
        value: Box<Expr>,
        span: Span,
    },
    ChanType {
        dir: ChanDir,
        value: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Ident(ident) => ident.span,
            Expr::BasicLit(lit) => lit.span,
            Expr::Call(call) => call.span,
            Expr::FuncType(ty) => ty.span,
            Expr::Bad { span }
            | Expr::Ellipsis { span, .. }
            | Expr::FuncLit { span, .. }
            | Expr::CompositeLit { span, .. }
            | Expr::Paren { span, .. }
            | Expr::Selector { span, .. }
            | Expr::Index { span, .. }
            | Expr::Slice { span, .. }
            | Expr::TypeAssert { span, .. }
            | Expr::Star { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::KeyValue { span, .. }
            | Expr::ArrayType { span, .. }
            | Expr::StructType { span, .. }
            | Expr::InterfaceType { span, .. }
            | Expr::MapType { span, .. }
            | Expr::ChanType { span, .. } => *span,
        }
    }

    /// Node-kind name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Bad { .. } => "BadExpr",
            Expr::Ident(_) => "Ident",
            Expr::Ellipsis { .. } => "Ellipsis",
            Expr::BasicLit(_) => "BasicLit",
            Expr::FuncLit { .. } => "FuncLit",
            Expr::CompositeLit { .. } => "CompositeLit",
            Expr::Paren { .. } => "ParenExpr",
            Expr::Selector { .. } => "SelectorExpr",
            Expr::Index { .. } => "IndexExpr",
            Expr::Slice { .. } => "SliceExpr",
            Expr::TypeAssert { .. } => "TypeAssertExpr",
            Expr::Call(_) => "CallExpr",
            Expr::Star { .. } => "StarExpr",
            Expr::Unary { .. } => "UnaryExpr",
            Expr::Binary { .. } => "BinaryExpr",
            Expr::KeyValue { .. } => "KeyValueExpr",
            Expr::ArrayType { .. } => "ArrayType",
            Expr::StructType { .. } => "StructType",
            Expr::FuncType(_) => "FuncType",
            Expr::InterfaceType { .. } => "InterfaceType",
            Expr::MapType { .. } => "MapType",
            Expr::ChanType { .. } => "ChanType",
        }
    }

    /// Strips any number of enclosing parentheses.
    pub fn unparen(&self) -> &Expr {
        let mut expr = self;
        while let Expr::Paren { x, .. } = expr {
            expr = x;
        }
        expr
    }
}

// ============================================================================
// STATEMENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Bad {
        span: Span,
    },
    Decl {
        decl: Decl,
        span: Span,
    },
    Empty {
        span: Span,
    },
    Labeled {
        label: Ident,
        stmt: Box<Stmt>,
        span: Span,
    },
    Expr {
        x: Expr,
        span: Span,
    },
    Send {
        chan: Expr,
        value: Expr,
        span: Span,
    },
    IncDec {
        x: Expr,
        tok: Token,
        span: Span,
    },
    Assign {
        lhs: Vec<Expr>,
        tok: Token,
        rhs: Vec<Expr>,
        span: Span,
    },
    Go {
        call: CallExpr,
        span: Span,
    },
    Defer {
        call: CallExpr,
        span: Span,
    },
    Return {
        results: Vec<Expr>,
        span: Span,
    },
    Branch {
        tok: Token,
        label: Option<Ident>,
        span: Span,
    },
    Block(BlockStmt),
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        body: BlockStmt,
        els: Option<Box<Stmt>>,
        span: Span,
    },
    /// `case a, b:` or `default:` (empty list) of a switch.
    CaseClause {
        list: Vec<Expr>,
        body: Vec<Stmt>,
        span: Span,
    },
    Switch {
        init: Option<Box<Stmt>>,
        tag: Option<Expr>,
        body: BlockStmt,
        span: Span,
    },
    TypeSwitch {
        init: Option<Box<Stmt>>,
        /// `x := y.(type)` or `y.(type)`.
        assign: Box<Stmt>,
        body: BlockStmt,
        span: Span,
    },
    /// `case <-ch:` / `case v := <-ch:` / `case ch <- v:` or `default:` (no comm).
    CommClause {
        comm: Option<Box<Stmt>>,
        body: Vec<Stmt>,
        span: Span,
    },
    Select {
        body: BlockStmt,
        span: Span,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: BlockStmt,
        span: Span,
    },
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        /// `=` or `:=`; `None` for `for range x`.
        tok: Option<Token>,
        x: Expr,
        body: BlockStmt,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block(block) => block.span,
            Stmt::Bad { span }
            | Stmt::Decl { span, .. }
            | Stmt::Empty { span }
            | Stmt::Labeled { span, .. }
            | Stmt::Expr { span, .. }
            | Stmt::Send { span, .. }
            | Stmt::IncDec { span, .. }
            | Stmt::Assign { span, .. }
            | Stmt::Go { span, .. }
            | Stmt::Defer { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Branch { span, .. }
            | Stmt::If { span, .. }
            | Stmt::CaseClause { span, .. }
            | Stmt::Switch { span, .. }
            | Stmt::TypeSwitch { span, .. }
            | Stmt::CommClause { span, .. }
            | Stmt::Select { span, .. }
            | Stmt::For { span, .. }
            | Stmt::Range { span, .. } => *span,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Stmt::Bad { .. } => "BadStmt",
            Stmt::Decl { .. } => "DeclStmt",
            Stmt::Empty { .. } => "EmptyStmt",
            Stmt::Labeled { .. } => "LabeledStmt",
            Stmt::Expr { .. } => "ExprStmt",
            Stmt::Send { .. } => "SendStmt",
            Stmt::IncDec { .. } => "IncDecStmt",
            Stmt::Assign { .. } => "AssignStmt",
            Stmt::Go { .. } => "GoStmt",
            Stmt::Defer { .. } => "DeferStmt",
            Stmt::Return { .. } => "ReturnStmt",
            Stmt::Branch { .. } => "BranchStmt",
            Stmt::Block(_) => "BlockStmt",
            Stmt::If { .. } => "IfStmt",
            Stmt::CaseClause { .. } => "CaseClause",
            Stmt::Switch { .. } => "SwitchStmt",
            Stmt::TypeSwitch { .. } => "TypeSwitchStmt",
            Stmt::CommClause { .. } => "CommClause",
            Stmt::Select { .. } => "SelectStmt",
            Stmt::For { .. } => "ForStmt",
            Stmt::Range { .. } => "RangeStmt",
        }
    }
}

// ============================================================================
// DECLARATIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    pub doc: Option<CommentGroup>,
    /// Local alias, `.` or `_`.
    pub name: Option<Ident>,
    /// The quoted path literal.
    pub path: BasicLit,
    pub comment: Option<CommentGroup>,
    pub span: Span,
}

/// One `names [type] [= values]` line of a `const` or `var` group.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSpec {
    pub doc: Option<CommentGroup>,
    pub names: Vec<Ident>,
    pub ty: Option<Expr>,
    pub values: Vec<Expr>,
    pub comment: Option<CommentGroup>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub doc: Option<CommentGroup>,
    pub name: Ident,
    /// True for `type A = B`.
    pub assign: bool,
    pub ty: Expr,
    pub comment: Option<CommentGroup>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Spec {
    Import(ImportSpec),
    Value(ValueSpec),
    Type(TypeSpec),
}

impl Spec {
    pub fn span(&self) -> Span {
        match self {
            Spec::Import(spec) => spec.span,
            Spec::Value(spec) => spec.span,
            Spec::Type(spec) => spec.span,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Spec::Import(_) => "ImportSpec",
            Spec::Value(_) => "ValueSpec",
            Spec::Type(_) => "TypeSpec",
        }
    }
}

/// `import`, `const`, `type` or `var` followed by one spec or a parenthesized group.
#[derive(Debug, Clone, PartialEq)]
pub struct GenDecl {
    pub doc: Option<CommentGroup>,
    pub tok: Token,
    pub specs: Vec<Spec>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub doc: Option<CommentGroup>,
    pub recv: Option<FieldList>,
    pub name: Ident,
    pub ty: FuncType,
    /// `None` for external (assembly-backed) declarations.
    pub body: Option<BlockStmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Bad { span: Span },
    Gen(GenDecl),
    Func(FuncDecl),
}

impl Decl {
    pub fn span(&self) -> Span {
        match self {
            Decl::Bad { span } => *span,
            Decl::Gen(decl) => decl.span,
            Decl::Func(decl) => decl.span,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Decl::Bad { .. } => "BadDecl",
            Decl::Gen(_) => "GenDecl",
            Decl::Func(_) => "FuncDecl",
        }
    }

    pub fn is_import(&self) -> bool {
        matches!(self, Decl::Gen(GenDecl { tok: Token::Import, .. }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub doc: Option<CommentGroup>,
    pub name: Ident,
    pub decls: Vec<Decl>,
    /// Every comment group in the file, in source order.
    pub comments: Vec<CommentGroup>,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str, start: usize) -> Expr {
        Expr::Ident(Ident::new(name, Span::new(start, start + name.len())))
    }

    #[test]
    fn unparen_strips_nested_parentheses() {
        let inner = ident("x", 2);
        let wrapped = Expr::Paren {
            x: Box::new(Expr::Paren {
                x: Box::new(inner.clone()),
                span: Span::new(1, 4),
            }),
            span: Span::new(0, 5),
        };
        assert_eq!(wrapped.unparen(), &inner);
    }

    #[test]
    fn span_join_covers_both() {
        assert_eq!(Span::new(4, 6).to(Span::new(1, 3)), Span::new(1, 6));
    }

    #[test]
    fn import_detection_only_matches_import_groups() {
        let import = Decl::Gen(GenDecl {
            doc: None,
            tok: Token::Import,
            specs: vec![],
            span: Span::default(),
        });
        let var = Decl::Gen(GenDecl {
            doc: None,
            tok: Token::Var,
            specs: vec![],
            span: Span::default(),
        });
        assert!(import.is_import());
        assert!(!var.is_import());
        assert!(!Decl::Bad { span: Span::default() }.is_import());
    }

    #[test]
    fn kind_names_follow_node_shapes() {
        assert_eq!(ident("a", 0).kind_name(), "Ident");
        let map = Expr::MapType {
            key: Box::new(ident("string", 4)),
            value: Box::new(ident("int", 11)),
            span: Span::new(0, 14),
        };
        assert_eq!(map.kind_name(), "MapType");
        assert_eq!(map.span(), Span::new(0, 14));
    }
}
