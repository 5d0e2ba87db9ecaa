//! Operator and keyword tokens carried by the syntax tree.
//!
//! Only the tokens that survive into the tree are modelled: operators on
//! unary/binary expressions and assignments, increment/decrement, the branch
//! keywords, and the leading keyword of a declaration group.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    // Arithmetic and bitwise operators
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,

    // Compound assignment
    AddAssign,
    SubAssign,
    MulAssign,
    QuoAssign,
    RemAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
    AndNotAssign,

    // Logical, comparison, channel
    LAnd,
    LOr,
    Arrow,
    Inc,
    Dec,
    Eql,
    Lss,
    Gtr,
    Assign,
    Not,
    Neq,
    Leq,
    Geq,
    Define,
    Tilde,

    // Keywords
    Break,
    Continue,
    Goto,
    Fallthrough,
    Import,
    Const,
    Var,
    Type,
    Func,
}

const SYMBOLS: &[(Token, &str)] = &[
    (Token::Add, "+"),
    (Token::Sub, "-"),
    (Token::Mul, "*"),
    (Token::Quo, "/"),
    (Token::Rem, "%"),
    (Token::And, "&"),
    (Token::Or, "|"),
    (Token::Xor, "^"),
    (Token::Shl, "<<"),
    (Token::Shr, ">>"),
    (Token::AndNot, "&^"),
    (Token::AddAssign, "+="),
    (Token::SubAssign, "-="),
    (Token::MulAssign, "*="),
    (Token::QuoAssign, "/="),
    (Token::RemAssign, "%="),
    (Token::AndAssign, "&="),
    (Token::OrAssign, "|="),
    (Token::XorAssign, "^="),
    (Token::ShlAssign, "<<="),
    (Token::ShrAssign, ">>="),
    (Token::AndNotAssign, "&^="),
    (Token::LAnd, "&&"),
    (Token::LOr, "||"),
    (Token::Arrow, "<-"),
    (Token::Inc, "++"),
    (Token::Dec, "--"),
    (Token::Eql, "=="),
    (Token::Lss, "<"),
    (Token::Gtr, ">"),
    (Token::Assign, "="),
    (Token::Not, "!"),
    (Token::Neq, "!="),
    (Token::Leq, "<="),
    (Token::Geq, ">="),
    (Token::Define, ":="),
    (Token::Tilde, "~"),
    (Token::Break, "break"),
    (Token::Continue, "continue"),
    (Token::Goto, "goto"),
    (Token::Fallthrough, "fallthrough"),
    (Token::Import, "import"),
    (Token::Const, "const"),
    (Token::Var, "var"),
    (Token::Type, "type"),
    (Token::Func, "func"),
];

impl Token {
    /// The canonical textual symbol, e.g. `+=` or `break`.
    pub fn as_str(self) -> &'static str {
        SYMBOLS
            .iter()
            .find(|(token, _)| *token == self)
            .map(|(_, symbol)| *symbol)
            .unwrap_or("")
    }

    /// Looks up a token by its textual symbol.
    pub fn from_symbol(symbol: &str) -> Option<Token> {
        SYMBOLS
            .iter()
            .find(|(_, text)| *text == symbol)
            .map(|(token, _)| *token)
    }

    /// True for `=`-suffixed compound assignment operators (`+=`, `<<=`, ...).
    pub fn is_compound_assign(self) -> bool {
        matches!(
            self,
            Token::AddAssign
                | Token::SubAssign
                | Token::MulAssign
                | Token::QuoAssign
                | Token::RemAssign
                | Token::AndAssign
                | Token::OrAssign
                | Token::XorAssign
                | Token::ShlAssign
                | Token::ShrAssign
                | Token::AndNotAssign
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_token_has_a_symbol() {
        for (token, symbol) in SYMBOLS {
            assert_eq!(token.as_str(), *symbol);
            assert_eq!(Token::from_symbol(symbol), Some(*token));
        }
    }

    #[test]
    fn compound_assignment_detection() {
        assert!(Token::ShlAssign.is_compound_assign());
        assert!(Token::AndNotAssign.is_compound_assign());
        assert!(!Token::Assign.is_compound_assign());
        assert!(!Token::Define.is_compound_assign());
    }

    #[test]
    fn unknown_symbols_are_rejected() {
        assert_eq!(Token::from_symbol("=>"), None);
        assert_eq!(Token::from_symbol(""), None);
    }
}
