//! Module for generating random Eidos and SLiM scripts for property-based testing.
//!
//! `EidosScript` is a list of statements; `SlimScript` wraps statements in
//! callback and function blocks. Both print through a `Layout`, which decides
//! the whitespace between tokens: `Compact` uses as little as lexing allows,
//! `Scattered` puts a random run of spaces, tabs and line breaks between every
//! pair of tokens. Formatting the same script in either layout must give the
//! same result.
//!
//! Generation functions use a depth parameter to limit recursion.
//! Variable names all start with `v` so they never clash with keywords,
//! built-in constants or SLiM globals.

use quickcheck::{Arbitrary, Gen};

/// Maximum recursion depth for generation to prevent excessive tree depth.
const MAX_DEPTH: usize = 4;

/// Whitespace runs used by the scattered layout.
const GAPS: &[&str] = &[" ", "  ", "\t", "\n", "\n\n", " \n\t ", "\r\n"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mult,
    Div,
    Mod,
    Exp,
    Range,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
}

impl BinOp {
    fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mult => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Exp => "^",
            BinOp::Range => ":",
            BinOp::Eq => "==",
            BinOp::Neq => "!=",
            BinOp::Lt => "<",
            BinOp::Lte => "<=",
            BinOp::Gt => ">",
            BinOp::Gte => ">=",
            BinOp::And => "&",
            BinOp::Or => "|",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// A call argument, optionally given by name.
#[derive(Clone, Debug)]
pub struct Arg {
    pub name: Option<String>,
    pub value: EidosExpr,
}

#[derive(Clone, Debug)]
pub enum EidosExpr {
    Var(String),
    IntLit(u32),
    FloatLit(u32, u32),
    StringLit(String),
    Bool(bool),
    BinOp { op: BinOp, left: Box<EidosExpr>, right: Box<EidosExpr> },
    UnaryOp { op: UnaryOp, operand: Box<EidosExpr> },
    Call { name: String, args: Vec<Arg> },
    Property { receiver: Box<EidosExpr>, name: String },
    MethodCall { receiver: Box<EidosExpr>, name: String, args: Vec<Arg> },
    Subset { target: Box<EidosExpr>, index: Box<EidosExpr> },
    Parenthesized(Box<EidosExpr>),
}

#[derive(Clone, Debug)]
pub enum EidosStmt {
    Assign { target: String, value: EidosExpr },
    Expr(EidosExpr),
    Compound(Vec<EidosStmt>),
    If { condition: EidosExpr, consequence: Box<EidosStmt>, alternative: Option<Box<EidosStmt>> },
    For { var: String, range: EidosExpr, body: Box<EidosStmt> },
    While { condition: EidosExpr, body: Box<EidosStmt> },
    DoWhile { body: Box<EidosStmt>, condition: EidosExpr },
    Next,
    Break,
    Return(Option<EidosExpr>),
}

/// Whitespace placement when printing.
#[derive(Clone, Debug)]
pub enum Layout {
    Compact,
    Scattered(Vec<&'static str>),
}

/// A plain Eidos script.
#[derive(Clone, Debug)]
pub struct EidosScript {
    pub statements: Vec<EidosStmt>,
    pub layout: Layout,
}

#[derive(Clone, Debug)]
pub enum SlimBlock {
    Initialize(Vec<EidosStmt>),
    Callback { tick: u32, name: &'static str, body: Vec<EidosStmt> },
    Function { name: String, params: Vec<String>, body: Vec<EidosStmt> },
}

/// A SLiM script made of top-level blocks.
#[derive(Clone, Debug)]
pub struct SlimScript {
    pub blocks: Vec<SlimBlock>,
    pub layout: Layout,
}

/// Generates a random number in the range [min, max] inclusive.
fn gen_range(g: &mut Gen, min: u32, max: u32) -> u32 {
    min + (u32::arbitrary(g) % (max - min + 1))
}

fn pick<T: Copy>(g: &mut Gen, choices: &[T]) -> T {
    choices[gen_range(g, 0, choices.len() as u32 - 1) as usize]
}

/// Generates a variable name such as `vab3`.
pub fn gen_var_name(g: &mut Gen) -> String {
    let letters: Vec<char> = "abcdefghijklmnopqrstuvwxyz".chars().collect();
    let mut name = String::from("v");
    for _ in 0..gen_range(g, 0, 3) {
        name.push(pick(g, &letters));
    }
    if bool::arbitrary(g) {
        name.push_str(&gen_range(g, 0, 9).to_string());
    }
    name
}

fn gen_string_content(g: &mut Gen) -> String {
    let chars: Vec<char> = "abc xyz_019-é".chars().collect();
    (0..gen_range(g, 0, 6)).map(|_| pick(g, &chars)).collect()
}

fn gen_args(g: &mut Gen, depth: usize) -> Vec<Arg> {
    (0..gen_range(g, 0, 3))
        .map(|_| Arg {
            name: if gen_range(g, 0, 3) == 0 { Some(gen_var_name(g)) } else { None },
            value: gen_expr(g, depth),
        })
        .collect()
}

fn gen_literal(g: &mut Gen) -> EidosExpr {
    match gen_range(g, 0, 3) {
        0 => EidosExpr::IntLit(gen_range(g, 0, 1000)),
        1 => EidosExpr::FloatLit(gen_range(g, 0, 99), gen_range(g, 0, 99)),
        2 => EidosExpr::StringLit(gen_string_content(g)),
        _ => EidosExpr::Bool(bool::arbitrary(g)),
    }
}

/// A receiver for `.` access; never a bare number.
fn gen_receiver(g: &mut Gen, depth: usize) -> EidosExpr {
    match gen_range(g, 0, 3) {
        0 if depth > 0 => EidosExpr::Parenthesized(Box::new(gen_expr(g, depth - 1))),
        1 if depth > 0 => EidosExpr::Call { name: gen_var_name(g), args: gen_args(g, depth - 1) },
        _ => EidosExpr::Var(gen_var_name(g)),
    }
}

fn gen_expr(g: &mut Gen, depth: usize) -> EidosExpr {
    if depth == 0 {
        return if bool::arbitrary(g) { EidosExpr::Var(gen_var_name(g)) } else { gen_literal(g) };
    }
    const OPS: &[BinOp] = &[
        BinOp::Add,
        BinOp::Sub,
        BinOp::Mult,
        BinOp::Div,
        BinOp::Mod,
        BinOp::Exp,
        BinOp::Range,
        BinOp::Eq,
        BinOp::Neq,
        BinOp::Lt,
        BinOp::Lte,
        BinOp::Gt,
        BinOp::Gte,
        BinOp::And,
        BinOp::Or,
    ];
    match gen_range(g, 0, 8) {
        0 => EidosExpr::Var(gen_var_name(g)),
        1 => gen_literal(g),
        2 | 3 => EidosExpr::BinOp {
            op: pick(g, OPS),
            left: Box::new(gen_expr(g, depth - 1)),
            right: Box::new(gen_expr(g, depth - 1)),
        },
        4 => EidosExpr::UnaryOp {
            op: if bool::arbitrary(g) { UnaryOp::Neg } else { UnaryOp::Not },
            operand: Box::new(gen_expr(g, depth - 1)),
        },
        5 => EidosExpr::Call { name: gen_var_name(g), args: gen_args(g, depth - 1) },
        6 => {
            let receiver = Box::new(gen_receiver(g, depth - 1));
            let name = gen_var_name(g);
            if bool::arbitrary(g) {
                EidosExpr::Property { receiver, name }
            } else {
                EidosExpr::MethodCall { receiver, name, args: gen_args(g, depth - 1) }
            }
        }
        7 => EidosExpr::Subset {
            target: Box::new(gen_receiver(g, depth - 1)),
            index: Box::new(gen_expr(g, depth - 1)),
        },
        _ => EidosExpr::Parenthesized(Box::new(gen_expr(g, depth - 1))),
    }
}

fn gen_block(g: &mut Gen, depth: usize) -> Vec<EidosStmt> {
    (0..gen_range(g, 0, 3)).map(|_| gen_stmt(g, depth)).collect()
}

/// Generates a random statement with limited depth.
pub fn gen_stmt(g: &mut Gen, depth: usize) -> EidosStmt {
    let depth = depth.min(MAX_DEPTH);
    if depth == 0 {
        return EidosStmt::Assign { target: gen_var_name(g), value: gen_expr(g, 0) };
    }
    match gen_range(g, 0, 10) {
        0 | 1 => EidosStmt::Assign { target: gen_var_name(g), value: gen_expr(g, depth - 1) },
        2 => EidosStmt::Expr(EidosExpr::Call { name: gen_var_name(g), args: gen_args(g, depth - 1) }),
        3 => EidosStmt::Compound(gen_block(g, depth - 1)),
        4 => EidosStmt::If {
            condition: gen_expr(g, depth - 1),
            consequence: Box::new(gen_stmt(g, depth - 1)),
            alternative: if bool::arbitrary(g) { Some(Box::new(gen_stmt(g, depth - 1))) } else { None },
        },
        5 => EidosStmt::For {
            var: gen_var_name(g),
            range: gen_expr(g, depth - 1),
            body: Box::new(gen_stmt(g, depth - 1)),
        },
        6 => EidosStmt::While { condition: gen_expr(g, depth - 1), body: Box::new(gen_stmt(g, depth - 1)) },
        7 => EidosStmt::DoWhile { body: Box::new(gen_stmt(g, depth - 1)), condition: gen_expr(g, depth - 1) },
        8 => match gen_range(g, 0, 2) {
            0 => EidosStmt::Next,
            1 => EidosStmt::Break,
            _ => EidosStmt::Return(if bool::arbitrary(g) { Some(gen_expr(g, depth - 1)) } else { None }),
        },
        _ => EidosStmt::Compound(vec![gen_stmt(g, depth - 1)]),
    }
}

fn gen_layout(g: &mut Gen) -> Layout {
    if bool::arbitrary(g) {
        Layout::Compact
    } else {
        Layout::Scattered((0..gen_range(g, 1, 8)).map(|_| pick(g, GAPS)).collect())
    }
}

impl Arbitrary for EidosScript {
    fn arbitrary(g: &mut Gen) -> Self {
        let depth = g.size().min(MAX_DEPTH);
        let statements = (0..gen_range(g, 1, 5)).map(|_| gen_stmt(g, depth)).collect();
        EidosScript { statements, layout: gen_layout(g) }
    }
}

impl Arbitrary for SlimScript {
    fn arbitrary(g: &mut Gen) -> Self {
        const CALLBACKS: &[&str] = &["first", "early", "late"];
        let depth = g.size().min(MAX_DEPTH - 1);
        let mut blocks = Vec::new();
        if bool::arbitrary(g) {
            blocks.push(SlimBlock::Initialize(gen_block(g, depth)));
        }
        for _ in 0..gen_range(g, 1, 3) {
            let block = if gen_range(g, 0, 3) == 0 {
                SlimBlock::Function {
                    name: gen_var_name(g),
                    params: (0..gen_range(g, 0, 2)).map(|_| gen_var_name(g)).collect(),
                    body: gen_block(g, depth),
                }
            } else {
                SlimBlock::Callback { tick: gen_range(g, 1, 100), name: pick(g, CALLBACKS), body: gen_block(g, depth) }
            };
            blocks.push(block);
        }
        SlimScript { blocks, layout: gen_layout(g) }
    }
}

/// Collects the tokens of a script as strings.
#[derive(Default)]
struct TokenWriter {
    tokens: Vec<String>,
}

impl TokenWriter {
    fn push(&mut self, token: impl Into<String>) {
        self.tokens.push(token.into());
    }

    fn args(&mut self, args: &[Arg]) {
        self.push("(");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.push(",");
            }
            if let Some(name) = &arg.name {
                self.push(name.as_str());
                self.push("=");
            }
            self.expr(&arg.value);
        }
        self.push(")");
    }

    fn expr(&mut self, expr: &EidosExpr) {
        match expr {
            EidosExpr::Var(name) => self.push(name.as_str()),
            EidosExpr::IntLit(n) => self.push(n.to_string()),
            EidosExpr::FloatLit(whole, frac) => self.push(format!("{whole}.{frac}")),
            EidosExpr::StringLit(s) => self.push(format!("\"{s}\"")),
            EidosExpr::Bool(b) => self.push(if *b { "T" } else { "F" }),
            EidosExpr::BinOp { op, left, right } => {
                self.expr(left);
                self.push(op.symbol());
                self.expr(right);
            }
            EidosExpr::UnaryOp { op, operand } => {
                self.push(match op {
                    UnaryOp::Neg => "-",
                    UnaryOp::Not => "!",
                });
                self.expr(operand);
            }
            EidosExpr::Call { name, args } => {
                self.push(name.as_str());
                self.args(args);
            }
            EidosExpr::Property { receiver, name } => {
                self.expr(receiver);
                self.push(".");
                self.push(name.as_str());
            }
            EidosExpr::MethodCall { receiver, name, args } => {
                self.expr(receiver);
                self.push(".");
                self.push(name.as_str());
                self.args(args);
            }
            EidosExpr::Subset { target, index } => {
                self.expr(target);
                self.push("[");
                self.expr(index);
                self.push("]");
            }
            EidosExpr::Parenthesized(inner) => {
                self.push("(");
                self.expr(inner);
                self.push(")");
            }
        }
    }

    fn braced(&mut self, statements: &[EidosStmt]) {
        self.push("{");
        for statement in statements {
            self.stmt(statement);
        }
        self.push("}");
    }

    fn stmt(&mut self, stmt: &EidosStmt) {
        match stmt {
            EidosStmt::Assign { target, value } => {
                self.push(target.as_str());
                self.push("=");
                self.expr(value);
                self.push(";");
            }
            EidosStmt::Expr(expr) => {
                self.expr(expr);
                self.push(";");
            }
            EidosStmt::Compound(statements) => self.braced(statements),
            EidosStmt::If { condition, consequence, alternative } => {
                self.push("if");
                self.push("(");
                self.expr(condition);
                self.push(")");
                self.stmt(consequence);
                if let Some(alternative) = alternative {
                    self.push("else");
                    self.stmt(alternative);
                }
            }
            EidosStmt::For { var, range, body } => {
                self.push("for");
                self.push("(");
                self.push(var.as_str());
                self.push("in");
                self.expr(range);
                self.push(")");
                self.stmt(body);
            }
            EidosStmt::While { condition, body } => {
                self.push("while");
                self.push("(");
                self.expr(condition);
                self.push(")");
                self.stmt(body);
            }
            EidosStmt::DoWhile { body, condition } => {
                self.push("do");
                self.stmt(body);
                self.push("while");
                self.push("(");
                self.expr(condition);
                self.push(")");
                self.push(";");
            }
            EidosStmt::Next => {
                self.push("next");
                self.push(";");
            }
            EidosStmt::Break => {
                self.push("break");
                self.push(";");
            }
            EidosStmt::Return(value) => {
                self.push("return");
                if let Some(value) = value {
                    self.expr(value);
                }
                self.push(";");
            }
        }
    }

    fn block(&mut self, block: &SlimBlock) {
        match block {
            SlimBlock::Initialize(body) => {
                self.push("initialize");
                self.push("(");
                self.push(")");
                self.braced(body);
            }
            SlimBlock::Callback { tick, name, body } => {
                self.push(tick.to_string());
                self.push(*name);
                self.push("(");
                self.push(")");
                self.braced(body);
            }
            SlimBlock::Function { name, params, body } => {
                self.push("function");
                self.push("(");
                self.push("*");
                self.push(")");
                self.push(name.as_str());
                self.push("(");
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        self.push(",");
                    }
                    self.push("*");
                    self.push(param.as_str());
                }
                if params.is_empty() {
                    self.push("void");
                }
                self.push(")");
                self.braced(body);
            }
        }
    }

    /// Joins tokens, keeping a space wherever two tokens would otherwise merge.
    fn finish(self, layout: &Layout) -> String {
        let mut code = String::new();
        let mut gaps = match layout {
            Layout::Compact => Vec::new(),
            Layout::Scattered(gaps) => gaps.clone(),
        }
        .into_iter()
        .cycle();

        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                match gaps.next() {
                    Some(gap) => code.push_str(gap),
                    None if needs_space(&self.tokens[i - 1], token) => code.push(' '),
                    None => {}
                }
            }
            code.push_str(token);
        }
        code.push('\n');
        code
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn needs_space(previous: &str, next: &str) -> bool {
    let (Some(last), Some(first)) = (previous.chars().last(), next.chars().next()) else {
        return false;
    };
    (is_word_char(last) && (is_word_char(first) || first == '.' && previous.starts_with(|c: char| c.is_ascii_digit())))
        || (matches!(last, '<' | '>' | '=' | '!') && first == '=')
        || (last == '/' && matches!(first, '/' | '*'))
        || (last == '*' && first == '/')
        || (last == '.' && first.is_ascii_digit())
}

impl EidosScript {
    pub fn to_code(&self) -> String {
        let mut writer = TokenWriter::default();
        for statement in &self.statements {
            writer.stmt(statement);
        }
        writer.finish(&self.layout)
    }
}

impl SlimScript {
    pub fn to_code(&self) -> String {
        let mut writer = TokenWriter::default();
        for block in &self.blocks {
            writer.block(block);
        }
        writer.finish(&self.layout)
    }

    /// Variables assigned at any depth inside callback or function bodies.
    pub fn local_names(&self) -> Vec<String> {
        fn collect(statement: &EidosStmt, names: &mut Vec<String>) {
            match statement {
                EidosStmt::Assign { target, .. } => names.push(target.clone()),
                EidosStmt::For { var, body, .. } => {
                    names.push(var.clone());
                    collect(body, names);
                }
                EidosStmt::Compound(statements) => statements.iter().for_each(|s| collect(s, names)),
                EidosStmt::If { consequence, alternative, .. } => {
                    collect(consequence, names);
                    if let Some(alternative) = alternative {
                        collect(alternative, names);
                    }
                }
                EidosStmt::While { body, .. } | EidosStmt::DoWhile { body, .. } => collect(body, names),
                EidosStmt::Expr(_) | EidosStmt::Next | EidosStmt::Break | EidosStmt::Return(_) => {}
            }
        }

        let mut names = Vec::new();
        for block in &self.blocks {
            match block {
                SlimBlock::Initialize(body) | SlimBlock::Callback { body, .. } => {
                    body.iter().for_each(|s| collect(s, &mut names));
                }
                SlimBlock::Function { params, body, .. } => {
                    names.extend(params.iter().cloned());
                    body.iter().for_each(|s| collect(s, &mut names));
                }
            }
        }
        names.sort();
        names.dedup();
        names
    }
}
