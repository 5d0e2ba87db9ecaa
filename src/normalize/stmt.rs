//! Statements.

use crate::canonical::{Kind, Node};
use crate::errors::{NodeContext, NormalizeError};
use crate::syntax::{BlockStmt, Expr, Stmt, Token};

use super::{NormalizeResult, Normalizer};

impl Normalizer<'_> {
    pub fn statement(&self, stmt: &Stmt) -> NormalizeResult<Node> {
        tracing::trace!(kind = stmt.kind_name(), "normalizing statement");
        let statement = |variant: &'static str| Node::typed(Kind::Statement, variant);

        let node = match stmt {
            Stmt::Return { results, .. } => {
                statement("return").with("values", self.expressions(results)?)
            }

            Stmt::Assign { lhs, tok, rhs, span } => {
                let node = match tok {
                    Token::Assign => statement("assign"),
                    Token::Define => statement("define"),
                    op if op.is_compound_assign() => {
                        let symbol = op.as_str();
                        statement("assign-operator")
                            .with("operator", symbol.strip_suffix('=').unwrap_or(symbol))
                    }
                    op => {
                        return Err(NormalizeError::unrecognized(
                            &format!("AssignStmt({op})"),
                            NodeContext::Statement,
                            self.position(*span),
                        ))
                    }
                };
                node.with("left", self.expressions(lhs)?)
                    .with("right", self.expressions(rhs)?)
            }

            Stmt::Empty { .. } => statement("empty"),

            Stmt::Expr { x, .. } => statement("expression").with("value", self.as_expression(x)?),

            Stmt::Labeled { label, stmt, .. } => statement("labeled")
                .with("label", self.ident(label))
                .with("statement", self.statement(stmt)?),

            Stmt::Branch { tok, label, span } => match tok {
                Token::Break => statement("break"),
                Token::Continue => statement("continue"),
                Token::Goto => statement("goto"),
                Token::Fallthrough => return Ok(self.locate(statement("fallthrough"), *span)),
                other => {
                    return Err(NormalizeError::unrecognized(
                        &format!("BranchStmt({other})"),
                        NodeContext::Statement,
                        self.position(*span),
                    ))
                }
            }
            .with("label", self.optional_ident(label.as_ref())),

            Stmt::Range {
                key,
                value,
                tok,
                x,
                body,
                ..
            } => statement("range")
                .with("key", self.optional_expression(key.as_ref())?)
                .with("value", self.optional_expression(value.as_ref())?)
                .with("target", self.as_expression(x)?)
                .with("is-assign", *tok == Some(Token::Define))
                .with("body", self.block(body)?),

            Stmt::Decl { decl, .. } => statement("declaration").with("target", self.declaration(decl)?),

            Stmt::Defer { call, .. } => statement("defer").with("target", self.call(call)?),

            Stmt::Go { call, .. } => statement("go").with("target", self.call(call)?),

            Stmt::If {
                init,
                cond,
                body,
                els,
                ..
            } => statement("if")
                .with("init", self.optional_statement(init.as_deref())?)
                .with("condition", self.as_expression(cond)?)
                .with("body", self.block(body)?)
                .with("else", self.optional_statement(els.as_deref())?),

            Stmt::Block(block) => statement("block").with("body", self.block(block)?),

            Stmt::For {
                init,
                cond,
                post,
                body,
                ..
            } => statement("for")
                .with("init", self.optional_statement(init.as_deref())?)
                .with("condition", self.optional_expression(cond.as_ref())?)
                .with("post", self.optional_statement(post.as_deref())?)
                .with("body", self.block(body)?),

            Stmt::Send { chan, value, .. } => statement("send")
                .with("channel", self.as_expression(chan)?)
                .with("value", self.as_expression(value)?),

            Stmt::Select { body, .. } => statement("select").with("body", self.block(body)?),

            Stmt::IncDec { x, tok, .. } => statement("crement")
                .with("target", self.as_expression(x)?)
                .with("operation", tok.as_str()),

            Stmt::Switch {
                init, tag, body, ..
            } => statement("switch")
                .with("init", self.optional_statement(init.as_deref())?)
                .with("condition", self.optional_expression(tag.as_ref())?)
                .with("body", self.block(body)?),

            Stmt::TypeSwitch {
                init, assign, body, ..
            } => statement("type-switch")
                .with("init", self.optional_statement(init.as_deref())?)
                .with("assign", self.statement(assign)?)
                .with("body", self.type_switch_body(body)?),

            Stmt::CommClause { comm, body, .. } => statement("select-clause")
                .with("statement", self.optional_statement(comm.as_deref())?)
                .with("body", self.statements(body)?),

            Stmt::CaseClause { list, body, .. } => statement("case-clause")
                .with("expressions", self.expressions(list)?)
                .with("body", self.statements(body)?),

            Stmt::Bad { span } => {
                return Err(NormalizeError::ParserErrorMarker {
                    context: NodeContext::Statement,
                    position: self.position(*span),
                })
            }
        };

        Ok(self.locate(node, stmt.span()))
    }

    /// The statements of a block, in order.
    pub fn block(&self, block: &BlockStmt) -> NormalizeResult<Vec<Node>> {
        self.statements(&block.list)
    }

    pub(crate) fn statements(&self, stmts: &[Stmt]) -> NormalizeResult<Vec<Node>> {
        stmts.iter().map(|s| self.statement(s)).collect()
    }

    fn optional_statement(&self, stmt: Option<&Stmt>) -> NormalizeResult<Option<Node>> {
        stmt.map(|s| self.statement(s)).transpose()
    }

    /// Type-switch cases list types, not values; `nil` and other non-type
    /// entries keep their expression reading.
    fn type_switch_body(&self, body: &BlockStmt) -> NormalizeResult<Vec<Node>> {
        let mut clauses = Vec::with_capacity(body.list.len());
        for stmt in &body.list {
            let Stmt::CaseClause { list, body, span } = stmt else {
                clauses.push(self.statement(stmt)?);
                continue;
            };
            let cases = list
                .iter()
                .map(|e| self.case_type(e))
                .collect::<NormalizeResult<Vec<_>>>()?;
            let clause = Node::typed(Kind::Statement, "case-clause")
                .with("expressions", cases)
                .with("body", self.statements(body)?);
            clauses.push(self.locate(clause, *span));
        }
        Ok(clauses)
    }

    fn case_type(&self, expr: &Expr) -> NormalizeResult<Node> {
        if matches!(expr, Expr::Ident(ident) if ident.name == "nil") {
            return self.as_expression(expr);
        }
        match self.as_type(expr)? {
            Some(ty) => Ok(ty),
            None => self.as_expression(expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::Value;
    use crate::normalize::fixtures::{call, ident, int};
    use crate::position::PositionTable;
    use crate::syntax::{Ident, Span};

    fn normalize(stmt: &Stmt) -> NormalizeResult<Node> {
        let table = PositionTable::empty();
        Normalizer::new(&table).statement(stmt)
    }

    fn assign(tok: Token) -> Stmt {
        Stmt::Assign {
            lhs: vec![ident("x")],
            tok,
            rhs: vec![int("1")],
            span: Span::default(),
        }
    }

    fn block(list: Vec<Stmt>) -> BlockStmt {
        BlockStmt {
            list,
            span: Span::default(),
        }
    }

    #[test]
    fn assignment_kinds() {
        assert!(normalize(&assign(Token::Assign)).unwrap().is(Kind::Statement, "assign"));
        assert!(normalize(&assign(Token::Define)).unwrap().is(Kind::Statement, "define"));

        let node = normalize(&assign(Token::AndNotAssign)).unwrap();
        assert!(node.is(Kind::Statement, "assign-operator"));
        assert_eq!(node.text("operator"), Some("&^"));
        assert_eq!(node.list("left").map(<[Value]>::len), Some(1));
    }

    #[test]
    fn non_assignment_tokens_are_fatal() {
        let err = normalize(&assign(Token::Add)).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::UnrecognizedNodeKind {
                context: NodeContext::Statement,
                ..
            }
        ));
    }

    #[test]
    fn branch_labels_are_optional_and_absent_for_fallthrough() {
        let labelled = Stmt::Branch {
            tok: Token::Continue,
            label: Some(Ident::new("outer", Span::default())),
            span: Span::default(),
        };
        let node = normalize(&labelled).unwrap();
        assert!(node.is(Kind::Statement, "continue"));
        assert_eq!(node.node("label").and_then(|l| l.text("value")), Some("outer"));

        let bare = Stmt::Branch {
            tok: Token::Break,
            label: None,
            span: Span::default(),
        };
        assert_eq!(normalize(&bare).unwrap().get("label"), Some(&Value::Null));

        let fallthrough = Stmt::Branch {
            tok: Token::Fallthrough,
            label: None,
            span: Span::default(),
        };
        let node = normalize(&fallthrough).unwrap();
        assert!(node.is(Kind::Statement, "fallthrough"));
        assert!(node.get("label").is_none());
    }

    #[test]
    fn range_binding_flag() {
        let range = |tok| Stmt::Range {
            key: Some(ident("k")),
            value: None,
            tok,
            x: ident("m"),
            body: block(Vec::new()),
            span: Span::default(),
        };
        assert_eq!(normalize(&range(Some(Token::Define))).unwrap().flag("is-assign"), Some(true));
        assert_eq!(normalize(&range(Some(Token::Assign))).unwrap().flag("is-assign"), Some(false));
        assert_eq!(normalize(&range(None)).unwrap().flag("is-assign"), Some(false));
    }

    #[test]
    fn else_chains_nest() {
        let inner = Stmt::If {
            init: None,
            cond: ident("b"),
            body: block(Vec::new()),
            els: Some(Box::new(Stmt::Block(block(vec![Stmt::Empty {
                span: Span::default(),
            }])))),
            span: Span::default(),
        };
        let outer = Stmt::If {
            init: Some(Box::new(assign(Token::Define))),
            cond: ident("a"),
            body: block(Vec::new()),
            els: Some(Box::new(inner)),
            span: Span::default(),
        };
        let node = normalize(&outer).unwrap();
        assert!(node.node("init").unwrap().is(Kind::Statement, "define"));
        let els = node.node("else").unwrap();
        assert!(els.is(Kind::Statement, "if"));
        assert!(els.node("else").unwrap().is(Kind::Statement, "block"));
    }

    #[test]
    fn type_switch_cases_are_types_except_nil() {
        let switch = Stmt::TypeSwitch {
            init: None,
            assign: Box::new(Stmt::Expr {
                x: Expr::TypeAssert {
                    x: Box::new(ident("v")),
                    ty: None,
                    span: Span::default(),
                },
                span: Span::default(),
            }),
            body: block(vec![Stmt::CaseClause {
                list: vec![ident("int"), ident("nil")],
                body: Vec::new(),
                span: Span::default(),
            }]),
            span: Span::default(),
        };
        let node = normalize(&switch).unwrap();
        let guard = node.node("assign").and_then(|a| a.node("value")).unwrap();
        assert!(guard.is(Kind::Expression, "type-assert"));
        assert_eq!(guard.get("asserted"), Some(&Value::Null));

        let clause = node.list("body").unwrap()[0].as_node().unwrap();
        let cases = clause.list("expressions").unwrap();
        assert!(cases[0].as_node().unwrap().is(Kind::Type, "identifier"));
        assert!(cases[1].as_node().unwrap().is(Kind::Expression, "identifier"));
    }

    #[test]
    fn default_comm_clause_has_no_statement() {
        let select = Stmt::Select {
            body: block(vec![Stmt::CommClause {
                comm: None,
                body: vec![Stmt::Go {
                    call: call(ident("f"), Vec::new()),
                    span: Span::default(),
                }],
                span: Span::default(),
            }]),
            span: Span::default(),
        };
        let node = normalize(&select).unwrap();
        let clause = node.list("body").unwrap()[0].as_node().unwrap();
        assert!(clause.is(Kind::Statement, "select-clause"));
        assert_eq!(clause.get("statement"), Some(&Value::Null));
        let go = clause.list("body").unwrap()[0].as_node().unwrap();
        assert!(go.node("target").unwrap().is(Kind::Expression, "call"));
    }

    #[test]
    fn increments_keep_their_operator() {
        let inc = Stmt::IncDec {
            x: ident("i"),
            tok: Token::Dec,
            span: Span::default(),
        };
        assert_eq!(normalize(&inc).unwrap().text("operation"), Some("--"));
    }

    #[test]
    fn bad_statements_are_fatal() {
        let err = normalize(&Stmt::Bad {
            span: Span::default(),
        })
        .unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::ParserErrorMarker {
                context: NodeContext::Statement,
                ..
            }
        ));
    }
}
