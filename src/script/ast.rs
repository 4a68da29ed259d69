//! Syntax tree produced by the error-tolerant statement parser.
//!
//! The tree is deliberately shallow: it only has to carry enough structure
//! for type interpretation, so malformed regions collapse into
//! [`Expr::Error`] instead of aborting the parse.

use crate::types::mask::TypeMask;

/// Binary operators, including the range operator `:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Range,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Exp,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
}

/// A call argument, optionally named (`f(x=1)`).
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub name: Option<String>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number { text: String, is_float: bool },
    /// Raw string literal text, quotes included
    String(String),
    Ident { name: String, start: usize },
    Unary { op: UnaryOp, operand: Box<Expr> },
    Binary { op: BinaryOp, lhs: Box<Expr>, rhs: Box<Expr> },
    Conditional { cond: Box<Expr>, then: Box<Expr>, otherwise: Box<Expr> },
    /// `callee(args)`; `start` is the offset of the callee's name token
    Call { callee: Box<Expr>, args: Vec<Arg>, start: usize },
    Member { target: Box<Expr>, name: String },
    Subset { target: Box<Expr>, index: Option<Box<Expr>> },
    Error,
}

impl Expr {
    /// The unquoted contents of a string literal, if this is one.
    pub fn string_value(&self) -> Option<String> {
        match self {
            Expr::String(raw) => Some(unquote(raw)),
            _ => None,
        }
    }

    /// Name of a simple identifier expression.
    pub fn ident_name(&self) -> Option<&str> {
        match self {
            Expr::Ident { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Strip the quotes of a string literal and resolve simple escapes.
pub fn unquote(raw: &str) -> String {
    let inner = if raw.len() >= 2 { &raw[1..raw.len() - 1] } else { "" };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// A parsed type specifier such as `integer$`, `Nif` or `object<Mutation>`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub mask: TypeMask,
    pub class_name: Option<String>,
    pub singleton: bool,
}

/// A parameter of a function or method prototype.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    pub ty: TypeSpec,
    pub optional: bool,
    /// Raw source text of the default value
    pub default: Option<String>,
}

/// A prototype: `(returns)name(params)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub name: String,
    pub returns: TypeSpec,
    pub params: Vec<ParamDecl>,
    /// Offset of the name token in the parsed text
    pub name_start: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Assign { target: Expr, value: Expr },
    Block(Vec<Stmt>),
    If { cond: Expr, then: Box<Stmt>, otherwise: Option<Box<Stmt>> },
    While { cond: Expr, body: Box<Stmt> },
    DoWhile { body: Box<Stmt>, cond: Expr },
    For { var: String, range: Expr, body: Box<Stmt> },
    Return(Option<Expr>),
    Next,
    Break,
    Function { proto: Prototype, body: Vec<Stmt> },
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote_escapes() {
        assert_eq!(unquote(r#""m1""#), "m1");
        assert_eq!(unquote(r#"'a\'b\n'"#), "a'b\n");
        assert_eq!(unquote("\""), "");
    }
}
