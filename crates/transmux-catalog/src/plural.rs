//! Gettext `Plural-Forms` rules.
//!
//! A compiled catalog declares how many plural forms it carries and a C-like
//! expression over `n` that selects one of them:
//!
//! ```text
//! Plural-Forms: nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);
//! ```
//!
//! # Invariants
//!
//! 1. **Total evaluation**: every parsed expression evaluates for every `n`;
//!    division and modulo by zero yield `0` instead of trapping.
//! 2. **Bounded size**: nesting deeper than [`MAX_DEPTH`] or trees with more
//!    than [`MAX_NODES`] nodes are rejected, so hostile headers cannot
//!    exhaust the stack during parsing, evaluation, or drop.
//! 3. **C precedence**: `?:` < `||` < `&&` < `== !=` < `< <= > >=` < `+ -`
//!    < `* / %` < `!`.

use std::fmt;

use crate::error::CatalogError;

/// Maximum nesting depth accepted by the expression parser.
pub const MAX_DEPTH: usize = 64;

/// Maximum number of nodes in a parsed expression.
pub const MAX_NODES: usize = 512;

/// Parsed plural expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    N,
    Num(u64),
    Not(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl Expr {
    fn eval(&self, n: u64) -> u64 {
        match self {
            Self::N => n,
            Self::Num(v) => *v,
            Self::Not(e) => u64::from(e.eval(n) == 0),
            Self::Ternary(c, a, b) => {
                if c.eval(n) != 0 {
                    a.eval(n)
                } else {
                    b.eval(n)
                }
            }
            Self::Binary(op, l, r) => {
                let l = l.eval(n);
                // Short-circuit before touching the right operand.
                match op {
                    BinOp::Or if l != 0 => return 1,
                    BinOp::And if l == 0 => return 0,
                    _ => {}
                }
                let r = r.eval(n);
                match op {
                    BinOp::Or | BinOp::And => u64::from(r != 0),
                    BinOp::Eq => u64::from(l == r),
                    BinOp::Ne => u64::from(l != r),
                    BinOp::Lt => u64::from(l < r),
                    BinOp::Le => u64::from(l <= r),
                    BinOp::Gt => u64::from(l > r),
                    BinOp::Ge => u64::from(l >= r),
                    BinOp::Add => l.wrapping_add(r),
                    BinOp::Sub => l.wrapping_sub(r),
                    BinOp::Mul => l.wrapping_mul(r),
                    BinOp::Div => l.checked_div(r).unwrap_or(0),
                    BinOp::Rem => l.checked_rem(r).unwrap_or(0),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    N,
    Num(u64),
    Op(&'static str),
    LParen,
    RParen,
    Question,
    Colon,
}

fn tokenize(src: &str) -> Result<Vec<Token>, String> {
    const OPS: [&str; 17] = [
        "||", "&&", "==", "!=", "<=", ">=", "<", ">", "+", "-", "*", "/", "%", "!", "(", ")",
        "?",
    ];

    let mut tokens = Vec::new();
    let bytes = src.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if c == b'n' {
            tokens.push(Token::N);
            i += 1;
            continue;
        }
        if c == b':' {
            tokens.push(Token::Colon);
            i += 1;
            continue;
        }
        if c.is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let value = src[start..i]
                .parse::<u64>()
                .map_err(|_| format!("number out of range at offset {start}"))?;
            tokens.push(Token::Num(value));
            continue;
        }
        let rest = &src[i..];
        let Some(op) = OPS.iter().find(|op| rest.starts_with(**op)) else {
            return Err(format!("unexpected character at offset {i}"));
        };
        tokens.push(match *op {
            "(" => Token::LParen,
            ")" => Token::RParen,
            "?" => Token::Question,
            other => Token::Op(other),
        });
        i += op.len();
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    nodes: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.peek();
        self.pos += 1;
        t
    }

    fn expect(&mut self, want: Token) -> Result<(), String> {
        match self.bump() {
            Some(t) if t == want => Ok(()),
            Some(t) => Err(format!("expected {want:?}, found {t:?}")),
            None => Err(format!("expected {want:?}, found end of expression")),
        }
    }

    fn enter(&mut self) -> Result<(), String> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err("expression nested too deeply".into());
        }
        Ok(())
    }

    /// Account for one more node in the tree being built.
    fn node(&mut self, expr: Expr) -> Result<Expr, String> {
        self.nodes += 1;
        if self.nodes > MAX_NODES {
            return Err(format!("expression has more than {MAX_NODES} nodes"));
        }
        Ok(expr)
    }

    fn ternary(&mut self) -> Result<Expr, String> {
        self.enter()?;
        let cond = self.binary(0)?;
        let expr = if self.peek() == Some(Token::Question) {
            self.bump();
            let then = self.ternary()?;
            self.expect(Token::Colon)?;
            let otherwise = self.ternary()?;
            self.node(Expr::Ternary(
                Box::new(cond),
                Box::new(then),
                Box::new(otherwise),
            ))?
        } else {
            cond
        };
        self.depth -= 1;
        Ok(expr)
    }

    /// Precedence climbing over the binary operator levels.
    fn binary(&mut self, level: usize) -> Result<Expr, String> {
        const LEVELS: [&[(&str, BinOp)]; 6] = [
            &[("||", BinOp::Or)],
            &[("&&", BinOp::And)],
            &[("==", BinOp::Eq), ("!=", BinOp::Ne)],
            &[
                ("<", BinOp::Lt),
                ("<=", BinOp::Le),
                (">", BinOp::Gt),
                (">=", BinOp::Ge),
            ],
            &[("+", BinOp::Add), ("-", BinOp::Sub)],
            &[("*", BinOp::Mul), ("/", BinOp::Div), ("%", BinOp::Rem)],
        ];

        if level == LEVELS.len() {
            return self.unary();
        }
        let mut lhs = self.binary(level + 1)?;
        while let Some(Token::Op(sym)) = self.peek() {
            let Some(&(_, op)) = LEVELS[level].iter().find(|(s, _)| *s == sym) else {
                break;
            };
            self.bump();
            let rhs = self.binary(level + 1)?;
            lhs = self.node(Expr::Binary(op, Box::new(lhs), Box::new(rhs)))?;
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, String> {
        match self.bump() {
            Some(Token::Op("!")) => {
                self.enter()?;
                let inner = self.unary()?;
                self.depth -= 1;
                self.node(Expr::Not(Box::new(inner)))
            }
            Some(Token::N) => self.node(Expr::N),
            Some(Token::Num(v)) => self.node(Expr::Num(v)),
            Some(Token::LParen) => {
                let inner = self.ternary()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(t) => Err(format!("unexpected token {t:?}")),
            None => Err("unexpected end of expression".into()),
        }
    }
}

fn parse_expr(src: &str) -> Result<Expr, String> {
    let mut parser = Parser {
        tokens: tokenize(src)?,
        pos: 0,
        depth: 0,
        nodes: 0,
    };
    let expr = parser.ternary()?;
    if let Some(t) = parser.peek() {
        return Err(format!("trailing token {t:?}"));
    }
    Ok(expr)
}

/// Plural selection rule for one catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralRule {
    nplurals: usize,
    expr: Expr,
    source: String,
}

impl Default for PluralRule {
    fn default() -> Self {
        Self::germanic()
    }
}

impl PluralRule {
    /// `nplurals=2; plural=(n != 1)`, used when a catalog has no header.
    #[must_use]
    pub fn germanic() -> Self {
        Self {
            nplurals: 2,
            expr: Expr::Binary(BinOp::Ne, Box::new(Expr::N), Box::new(Expr::Num(1))),
            source: "n != 1".into(),
        }
    }

    /// Parse the value of a `Plural-Forms` header.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidPluralForms`] when `nplurals` or
    /// `plural` is missing or malformed.
    pub fn parse(header: &str) -> Result<Self, CatalogError> {
        let fail = |reason: String| CatalogError::InvalidPluralForms {
            expression: header.to_string(),
            reason,
        };

        let mut nplurals = None;
        let mut plural = None;
        for part in header.split(';') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            match key.trim() {
                "nplurals" => {
                    let count = value
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| fail(format!("bad nplurals '{}'", value.trim())))?;
                    if count == 0 {
                        return Err(fail("nplurals must be at least 1".into()));
                    }
                    nplurals = Some(count);
                }
                "plural" => plural = Some(value.trim().to_string()),
                _ => {}
            }
        }

        let nplurals = nplurals.ok_or_else(|| fail("missing nplurals".into()))?;
        let source = plural.ok_or_else(|| fail("missing plural expression".into()))?;
        let expr = parse_expr(&source).map_err(fail)?;
        Ok(Self {
            nplurals,
            expr,
            source,
        })
    }

    /// Number of plural forms declared by the rule.
    #[must_use]
    pub const fn nplurals(&self) -> usize {
        self.nplurals
    }

    /// The expression text, as written in the header.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.source
    }

    /// Index of the plural form to use for `n`.
    ///
    /// Not clamped to `nplurals`: callers treat an out-of-range index as a
    /// missing translation.
    #[must_use]
    pub fn index(&self, n: u64) -> usize {
        usize::try_from(self.expr.eval(n)).unwrap_or(usize::MAX)
    }
}

impl fmt::Display for PluralRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nplurals={}; plural={};", self.nplurals, self.source)
    }
}
