//! Error-tolerant recursive-descent parser for Eidos statements.
//!
//! The parser never fails on script text. Malformed regions become
//! [`Expr::Error`] nodes and parsing resynchronizes at the next `;` or brace,
//! which lets the type interpreter work on text that is still being typed.
//!
//! Prototypes (`(object<Subpopulation>$)addSubpop(is$ subpopID, ...)`) use a
//! strict entry point, [`parse_prototype`], shared by built-in signature
//! declarations and user `function` statements.

use tracing::trace;

use super::ast::{Arg, BinaryOp, Expr, ParamDecl, Prototype, Stmt, TypeSpec, UnaryOp};
use super::lexer::tokenize;
use super::token::{Token, TokenKind};
use crate::errors::PrototypeError;
use crate::types::mask::TypeMask;

/// Binary precedence levels, loosest first. The range operator binds
/// tighter than multiplication.
const BINARY_LEVELS: &[&[(TokenKind, BinaryOp)]] = &[
    &[(TokenKind::Or, BinaryOp::Or)],
    &[(TokenKind::And, BinaryOp::And)],
    &[(TokenKind::Eq, BinaryOp::Eq), (TokenKind::NotEq, BinaryOp::NotEq)],
    &[
        (TokenKind::Lt, BinaryOp::Lt),
        (TokenKind::LtEq, BinaryOp::LtEq),
        (TokenKind::Gt, BinaryOp::Gt),
        (TokenKind::GtEq, BinaryOp::GtEq),
    ],
    &[(TokenKind::Plus, BinaryOp::Add), (TokenKind::Minus, BinaryOp::Sub)],
    &[(TokenKind::Mult, BinaryOp::Mul), (TokenKind::Div, BinaryOp::Div), (TokenKind::Mod, BinaryOp::Mod)],
    &[(TokenKind::Colon, BinaryOp::Range)],
];

/// Parse a token stream into statements, tolerating errors.
pub fn parse_block(tokens: &[Token]) -> Vec<Stmt> {
    let mut parser = Parser::new(tokens);
    let stmts = parser.statements(false);
    trace!("parsed {} statements", stmts.len());
    stmts
}

/// Parse a prototype string such as `(void)print(* x, [logical$ error = F])`.
pub fn parse_prototype(text: &str) -> Result<Prototype, PrototypeError> {
    let tokens = tokenize(text);
    if let Some(bad) = tokens.iter().find(|t| t.kind == TokenKind::Bad) {
        return Err(PrototypeError::new(bad.start, format!("invalid token {:?}", bad.text)));
    }
    let mut parser = Parser::new(&tokens);
    let proto = parser.prototype()?;
    if let Some(extra) = parser.peek() {
        return Err(PrototypeError::new(extra.start, format!("unexpected {:?} after prototype", extra.text)));
    }
    Ok(proto)
}

/// Parse a parenthesized type specifier such as `(object<Mutation>$)`.
pub fn parse_type_spec(text: &str) -> Result<TypeSpec, PrototypeError> {
    let tokens = tokenize(text);
    let mut parser = Parser::new(&tokens);
    parser.expect(TokenKind::LParen, "'(' before type")?;
    let spec = parser.type_spec()?;
    parser.expect(TokenKind::RParen, "')' after type")?;
    match parser.peek() {
        Some(extra) => Err(PrototypeError::new(extra.start, format!("unexpected {:?} after type", extra.text))),
        None => Ok(spec),
    }
}

/// Cursor over the significant tokens of a stream.
pub struct Parser<'t> {
    tokens: Vec<&'t Token>,
    pos: usize,
    end_offset: usize,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        let end_offset = tokens.last().map(|t| t.end).unwrap_or(0);
        Self {
            tokens: tokens.iter().filter(|t| t.is_significant()).collect(),
            pos: 0,
            end_offset,
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn peek_kind_at(&self, ahead: usize) -> TokenKind {
        self.tokens.get(self.pos + ahead).map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn offset(&self) -> usize {
        self.peek().map(|t| t.start).unwrap_or(self.end_offset)
    }

    fn bump(&mut self) -> Option<&'t Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek_kind() == kind {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Skip to just past the next `;`, or up to the next brace.
    fn synchronize(&mut self) {
        loop {
            match self.peek_kind() {
                TokenKind::Eof | TokenKind::LBrace | TokenKind::RBrace => return,
                TokenKind::Semicolon => {
                    self.pos += 1;
                    return;
                }
                _ => self.pos += 1,
            }
        }
    }

    /// Statements up to the end of input, or up to a `}` when `nested`.
    pub fn statements(&mut self, nested: bool) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::RBrace if nested => break,
                TokenKind::RBrace => {
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }
            let before = self.pos;
            let stmt = self.statement();
            if self.pos == before {
                self.pos += 1;
            }
            if stmt != Stmt::Empty {
                stmts.push(stmt);
            }
        }
        stmts
    }

    fn statement(&mut self) -> Stmt {
        match self.peek_kind() {
            TokenKind::LBrace => {
                self.bump();
                let body = self.statements(true);
                self.eat(TokenKind::RBrace);
                Stmt::Block(body)
            }
            TokenKind::Semicolon => {
                self.bump();
                Stmt::Empty
            }
            TokenKind::If => {
                self.bump();
                let cond = self.paren_expr();
                let then = Box::new(self.statement());
                let otherwise = if self.eat(TokenKind::Else) {
                    Some(Box::new(self.statement()))
                } else {
                    None
                };
                Stmt::If { cond, then, otherwise }
            }
            TokenKind::Do => {
                self.bump();
                let body = Box::new(self.statement());
                let cond = if self.eat(TokenKind::While) { self.paren_expr() } else { Expr::Error };
                self.eat(TokenKind::Semicolon);
                Stmt::DoWhile { body, cond }
            }
            TokenKind::While => {
                self.bump();
                let cond = self.paren_expr();
                let body = Box::new(self.statement());
                Stmt::While { cond, body }
            }
            TokenKind::For => {
                self.bump();
                let parens = self.eat(TokenKind::LParen);
                let var = match self.peek() {
                    Some(t) if t.kind == TokenKind::Identifier => {
                        self.bump();
                        t.text.clone()
                    }
                    _ => String::new(),
                };
                self.eat(TokenKind::In);
                let range = self.expr();
                if parens {
                    self.eat(TokenKind::RParen);
                }
                let body = Box::new(self.statement());
                Stmt::For { var, range, body }
            }
            TokenKind::Next => {
                self.bump();
                self.eat(TokenKind::Semicolon);
                Stmt::Next
            }
            TokenKind::Break => {
                self.bump();
                self.eat(TokenKind::Semicolon);
                Stmt::Break
            }
            TokenKind::Return => {
                self.bump();
                let value = match self.peek_kind() {
                    TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof => None,
                    _ => Some(self.expr()),
                };
                if !self.eat(TokenKind::Semicolon) {
                    self.synchronize();
                }
                Stmt::Return(value)
            }
            TokenKind::Function => {
                self.bump();
                match self.prototype() {
                    Ok(proto) => {
                        let body = if self.eat(TokenKind::LBrace) {
                            let body = self.statements(true);
                            self.eat(TokenKind::RBrace);
                            body
                        } else {
                            Vec::new()
                        };
                        Stmt::Function { proto, body }
                    }
                    Err(err) => {
                        trace!("skipping function declaration: {}", err);
                        self.synchronize();
                        Stmt::Expr(Expr::Error)
                    }
                }
            }
            _ => {
                let target = self.expr();
                let stmt = if self.eat(TokenKind::Assign) {
                    Stmt::Assign { target, value: self.expr() }
                } else {
                    Stmt::Expr(target)
                };
                if !self.eat(TokenKind::Semicolon) {
                    self.synchronize();
                }
                stmt
            }
        }
    }

    fn paren_expr(&mut self) -> Expr {
        if self.eat(TokenKind::LParen) {
            let expr = self.expr();
            self.eat(TokenKind::RParen);
            expr
        } else {
            self.expr()
        }
    }

    pub fn expr(&mut self) -> Expr {
        let cond = self.binary(0);
        if !self.eat(TokenKind::Conditional) {
            return cond;
        }
        let then = self.binary(0);
        let otherwise = if self.eat(TokenKind::Else) { self.expr() } else { Expr::Error };
        Expr::Conditional {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    fn binary(&mut self, level: usize) -> Expr {
        let Some(ops) = BINARY_LEVELS.get(level) else {
            return self.unary();
        };
        let mut lhs = self.binary(level + 1);
        loop {
            let kind = self.peek_kind();
            let Some(&(_, op)) = ops.iter().find(|(k, _)| *k == kind) else {
                return lhs;
            };
            self.bump();
            let rhs = self.binary(level + 1);
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
    }

    fn unary(&mut self) -> Expr {
        let op = match self.peek_kind() {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Minus,
            TokenKind::Not => UnaryOp::Not,
            _ => return self.exponent(),
        };
        self.bump();
        Expr::Unary { op, operand: Box::new(self.unary()) }
    }

    fn exponent(&mut self) -> Expr {
        let base = self.postfix();
        if self.eat(TokenKind::Exp) {
            let power = self.unary();
            return Expr::Binary { op: BinaryOp::Exp, lhs: Box::new(base), rhs: Box::new(power) };
        }
        base
    }

    fn postfix(&mut self) -> Expr {
        let mut name_start = self.offset();
        let mut expr = self.primary();
        loop {
            match self.peek_kind() {
                TokenKind::LParen => {
                    self.bump();
                    let args = self.arguments();
                    expr = Expr::Call { callee: Box::new(expr), args, start: name_start };
                }
                TokenKind::LBracket => {
                    self.bump();
                    let index = match self.peek_kind() {
                        TokenKind::RBracket | TokenKind::Comma => None,
                        _ => Some(Box::new(self.expr())),
                    };
                    // Matrix subsets carry extra dimensions that do not change the type
                    while self.eat(TokenKind::Comma) {
                        if !matches!(self.peek_kind(), TokenKind::RBracket | TokenKind::Comma) {
                            self.expr();
                        }
                    }
                    self.eat(TokenKind::RBracket);
                    expr = Expr::Subset { target: Box::new(expr), index };
                }
                TokenKind::Dot => {
                    self.bump();
                    name_start = self.offset();
                    let name = match self.peek() {
                        Some(t) if t.kind == TokenKind::Identifier => {
                            self.bump();
                            t.text.clone()
                        }
                        _ => String::new(),
                    };
                    expr = Expr::Member { target: Box::new(expr), name };
                }
                _ => return expr,
            }
        }
    }

    fn arguments(&mut self) -> Vec<Arg> {
        let mut args = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::RParen => {
                    self.bump();
                    return args;
                }
                TokenKind::Eof | TokenKind::Semicolon | TokenKind::LBrace | TokenKind::RBrace => {
                    return args;
                }
                TokenKind::Comma => {
                    self.bump();
                    continue;
                }
                _ => {}
            }
            let before = self.pos;
            let name = if self.peek_kind() == TokenKind::Identifier
                && self.peek_kind_at(1) == TokenKind::Assign
            {
                let name = self.bump().map(|t| t.text.clone());
                self.bump();
                name
            } else {
                None
            };
            let value = self.expr();
            args.push(Arg { name, value });
            if self.pos == before {
                self.pos += 1;
            }
        }
    }

    fn primary(&mut self) -> Expr {
        let Some(token) = self.peek() else {
            return Expr::Error;
        };
        match token.kind {
            TokenKind::Number => {
                self.bump();
                let text = token.text.clone();
                let is_float = text.contains('.') || text.contains("e-") || text.contains("E-");
                Expr::Number { text, is_float }
            }
            TokenKind::String => {
                self.bump();
                Expr::String(token.text.clone())
            }
            TokenKind::Identifier => {
                self.bump();
                Expr::Ident { name: token.text.clone(), start: token.start }
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.expr();
                self.eat(TokenKind::RParen);
                inner
            }
            TokenKind::Semicolon
            | TokenKind::RBrace
            | TokenKind::LBrace
            | TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::Comma => Expr::Error,
            _ => {
                self.bump();
                Expr::Error
            }
        }
    }

    /// `(returns)name(params)`
    pub fn prototype(&mut self) -> Result<Prototype, PrototypeError> {
        self.expect(TokenKind::LParen, "'(' before return type")?;
        let returns = self.type_spec()?;
        self.expect(TokenKind::RParen, "')' after return type")?;
        let name_token = self.expect(TokenKind::Identifier, "function name")?;
        self.expect(TokenKind::LParen, "'(' before parameters")?;
        let params = self.parameters()?;
        self.expect(TokenKind::RParen, "')' after parameters")?;
        Ok(Prototype {
            name: name_token.text.clone(),
            returns,
            params,
            name_start: name_token.start,
        })
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<&'t Token, PrototypeError> {
        match self.peek() {
            Some(t) if t.kind == kind => {
                self.pos += 1;
                Ok(t)
            }
            _ => Err(PrototypeError::new(self.offset(), format!("expected {what}"))),
        }
    }

    fn type_spec(&mut self) -> Result<TypeSpec, PrototypeError> {
        let offset = self.offset();
        let mask = match self.bump() {
            Some(t) if t.kind == TokenKind::Mult => TypeMask::ANY,
            Some(t) if t.kind == TokenKind::Plus => TypeMask::ANY_BUT_NULL,
            Some(t) if t.kind == TokenKind::Identifier => match TypeMask::from_type_name(&t.text) {
                Some(mask) => mask,
                None => t.text.chars().try_fold(TypeMask::empty(), |acc, c| {
                    TypeMask::from_abbreviation(c)
                        .map(|m| acc | m)
                        .ok_or_else(|| PrototypeError::new(offset, format!("unknown type {:?}", t.text)))
                })?,
            },
            _ => return Err(PrototypeError::new(offset, "expected type specifier")),
        };

        let class_name = if self.peek_kind() == TokenKind::Lt {
            self.bump();
            let class = self.expect(TokenKind::Identifier, "class name")?;
            self.expect(TokenKind::Gt, "'>' after class name")?;
            if !mask.contains(TypeMask::OBJECT) {
                return Err(PrototypeError::new(class.start, "class given for a non-object type"));
            }
            Some(class.text.clone())
        } else {
            None
        };

        let singleton = self.eat(TokenKind::Singleton);
        Ok(TypeSpec { mask, class_name, singleton })
    }

    fn parameters(&mut self) -> Result<Vec<ParamDecl>, PrototypeError> {
        let mut params = Vec::new();
        if self.peek_kind() == TokenKind::RParen {
            return Ok(params);
        }
        if self.peek().is_some_and(|t| t.text == "void") && self.peek_kind_at(1) == TokenKind::RParen {
            self.bump();
            return Ok(params);
        }

        loop {
            let optional = self.eat(TokenKind::LBracket);
            let param = if self.peek_kind() == TokenKind::Dot {
                for _ in 0..3 {
                    self.expect(TokenKind::Dot, "'...'")?;
                }
                ParamDecl {
                    name: "...".to_string(),
                    ty: TypeSpec { mask: TypeMask::ANY, class_name: None, singleton: false },
                    optional: true,
                    default: None,
                }
            } else {
                let ty = self.type_spec()?;
                let name = self.expect(TokenKind::Identifier, "parameter name")?.text.clone();
                let default = if optional && self.eat(TokenKind::Assign) {
                    Some(self.default_value()?)
                } else {
                    None
                };
                ParamDecl { name, ty, optional, default }
            };
            if optional {
                self.expect(TokenKind::RBracket, "']' closing optional parameter")?;
            }
            params.push(param);
            if !self.eat(TokenKind::Comma) {
                return Ok(params);
            }
        }
    }

    /// Raw text of a default value, up to the closing `]` of its parameter.
    fn default_value(&mut self) -> Result<String, PrototypeError> {
        let mut depth = 0usize;
        let mut text = String::new();
        loop {
            match self.peek_kind() {
                TokenKind::RBracket | TokenKind::RParen if depth == 0 => break,
                TokenKind::LBracket | TokenKind::LParen => depth += 1,
                TokenKind::RBracket | TokenKind::RParen => depth -= 1,
                TokenKind::Eof => return Err(PrototypeError::new(self.offset(), "unterminated default value")),
                _ => {}
            }
            if let Some(t) = self.bump() {
                text.push_str(&t.text);
            }
        }
        if text.is_empty() {
            return Err(PrototypeError::new(self.offset(), "empty default value"));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Vec<Stmt> {
        parse_block(&tokenize(source))
    }

    #[test]
    fn test_assignment_and_call() {
        let stmts = parse("x = c(1, 2);");
        let [Stmt::Assign { target, value }] = stmts.as_slice() else {
            panic!("unexpected statements: {stmts:?}");
        };
        assert_eq!(target.ident_name(), Some("x"));
        let Expr::Call { callee, args, start } = value else {
            panic!("expected call, got {value:?}");
        };
        assert_eq!(callee.ident_name(), Some("c"));
        assert_eq!(args.len(), 2);
        assert_eq!(*start, 4);
    }

    #[test]
    fn test_range_binds_tighter_than_multiplication() {
        let stmts = parse("y = 2 * 1:3;");
        let [Stmt::Assign { value, .. }] = stmts.as_slice() else { panic!() };
        let Expr::Binary { op: BinaryOp::Mul, rhs, .. } = value else {
            panic!("expected multiplication at the root, got {value:?}");
        };
        assert!(matches!(**rhs, Expr::Binary { op: BinaryOp::Range, .. }));
    }

    #[test]
    fn test_named_arguments() {
        let stmts = parse("f(1, size=5);");
        let [Stmt::Expr(Expr::Call { args, .. })] = stmts.as_slice() else { panic!() };
        assert_eq!(args[1].name.as_deref(), Some("size"));
        assert_eq!(args[0].name, None);
    }

    #[test]
    fn test_control_flow() {
        let stmts = parse("for (i in 1:10) { if (i > 5) next; else x = i; } while (T) break;");
        assert_eq!(stmts.len(), 2);
        let Stmt::For { var, body, .. } = &stmts[0] else { panic!() };
        assert_eq!(var, "i");
        let Stmt::Block(inner) = body.as_ref() else { panic!() };
        assert!(matches!(inner[0], Stmt::If { otherwise: Some(_), .. }));
        assert!(matches!(stmts[1], Stmt::While { .. }));
    }

    #[test]
    fn test_member_chain_and_subset() {
        let stmts = parse("a = sim.subpopulations[0].individuals;");
        let [Stmt::Assign { value, .. }] = stmts.as_slice() else { panic!() };
        let Expr::Member { target, name } = value else { panic!() };
        assert_eq!(name, "individuals");
        assert!(matches!(**target, Expr::Subset { .. }));
    }

    #[test]
    fn test_recovers_from_garbage() {
        let stmts = parse("x = ) 3; y = 4;");
        assert_eq!(stmts.len(), 2);
        assert!(matches!(&stmts[1], Stmt::Assign { target, .. } if target.ident_name() == Some("y")));
    }

    #[test]
    fn test_incomplete_trailing_statement() {
        let stmts = parse("x = 1; if (x == 1) { y = sim.");
        assert_eq!(stmts.len(), 2);
        let Stmt::If { then, .. } = &stmts[1] else { panic!() };
        let Stmt::Block(body) = then.as_ref() else { panic!() };
        assert!(matches!(&body[0], Stmt::Assign { value: Expr::Member { name, .. }, .. } if name.is_empty()));
    }

    #[test]
    fn test_function_statement() {
        let stmts = parse("function (float)half(numeric x) { return x / 2; }");
        let [Stmt::Function { proto, body }] = stmts.as_slice() else { panic!() };
        assert_eq!(proto.name, "half");
        assert_eq!(proto.returns.mask, TypeMask::FLOAT);
        assert_eq!(proto.params[0].ty.mask, TypeMask::NUMERIC);
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn test_parse_builtin_prototype() {
        let proto = parse_prototype(
            "(object<Subpopulation>$)addSubpop(is$ subpopID, integer$ size, [float$ sexRatio = 0.5])",
        )
        .unwrap();
        assert_eq!(proto.name, "addSubpop");
        assert_eq!(proto.returns.class_name.as_deref(), Some("Subpopulation"));
        assert!(proto.returns.singleton);
        assert_eq!(proto.params.len(), 3);
        assert_eq!(proto.params[0].ty.mask, TypeMask::INT | TypeMask::STRING);
        assert!(proto.params[2].optional);
        assert_eq!(proto.params[2].default.as_deref(), Some("0.5"));
    }

    #[test]
    fn test_parse_variadic_and_void() {
        let proto = parse_prototype("(*)c(...)").unwrap();
        assert_eq!(proto.returns.mask, TypeMask::ANY);
        assert_eq!(proto.params[0].name, "...");

        let proto = parse_prototype("(void)initializeTreeSeq(void)").unwrap();
        assert!(proto.returns.mask.is_empty());
        assert!(proto.params.is_empty());
    }

    #[test]
    fn test_malformed_prototype() {
        assert!(parse_prototype("(integer$ size)").is_err());
        assert!(parse_prototype("(q)f()").is_err());
        assert!(parse_prototype("(integer<Mutation>)f()").is_err());
    }
}
