//! Algebraic expressions over GF(2) and their canonical form.
//!
//! Gate nodes carry a human-readable expression such as `(x0x1 + (x2+1))`.
//! Reuse keys compare expressions through [`canonicalize`], which parses
//! the text and rewrites it with sound GF(2) identities:
//!
//! - nested sums and products are flattened,
//! - operands are sorted (variables ascending by index),
//! - `a·a → a` and `a + a → 0`,
//! - `1·a → a`, `0·a → 0` and `a + 0 → a`,
//! - single-operand sums and products collapse to the operand.
//!
//! Distributivity is not applied, so two expressions with different normal
//! forms may still denote the same function. Equal normal forms always do.

use std::fmt::{Display, Formatter};

use crate::term::{parse_index, ParseError, SUM_SEPARATOR, VAR_MARKER};
use crate::types::Var;

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Expr {
    Zero,
    One,
    Var(Var),
    /// Conjunction of the operands.
    Product(Vec<Expr>),
    /// Exclusive or of the operands.
    Sum(Vec<Expr>),
}

impl Expr {
    /// Rewrites the expression into its normal form.
    pub fn normalize(self) -> Expr {
        match self {
            Expr::Zero | Expr::One | Expr::Var(_) => self,
            Expr::Product(items) => {
                let mut flat = Vec::with_capacity(items.len());
                for item in items {
                    match item.normalize() {
                        Expr::Zero => return Expr::Zero,
                        Expr::One => {}
                        Expr::Product(inner) => flat.extend(inner),
                        other => flat.push(other),
                    }
                }
                flat.sort();
                flat.dedup();
                match flat.len() {
                    0 => Expr::One,
                    1 => flat.pop().unwrap_or(Expr::One),
                    _ => Expr::Product(flat),
                }
            }
            Expr::Sum(items) => {
                let mut flat = Vec::with_capacity(items.len());
                for item in items {
                    match item.normalize() {
                        Expr::Zero => {}
                        Expr::Sum(inner) => flat.extend(inner),
                        other => flat.push(other),
                    }
                }
                flat.sort();
                let mut kept: Vec<Expr> = Vec::with_capacity(flat.len());
                for item in flat {
                    if kept.last() == Some(&item) {
                        kept.pop();
                    } else {
                        kept.push(item);
                    }
                }
                match kept.len() {
                    0 => Expr::Zero,
                    1 => kept.pop().unwrap_or(Expr::Zero),
                    _ => Expr::Sum(kept),
                }
            }
        }
    }

    fn fmt_factor(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Sum(_) => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Zero => write!(f, "0"),
            Expr::One => write!(f, "1"),
            Expr::Var(v) => write!(f, "{}", v),
            Expr::Product(items) => {
                for item in items {
                    item.fmt_factor(f)?;
                }
                Ok(())
            }
            Expr::Sum(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", SUM_SEPARATOR)?;
                    }
                    match item {
                        Expr::Product(_) => write!(f, "{}", item)?,
                        _ => item.fmt_factor(f)?,
                    }
                }
                Ok(())
            }
        }
    }
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.char_indices().filter(|(_, c)| !c.is_whitespace()).collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn sum(&mut self) -> Result<Expr, ParseError> {
        let mut items = vec![self.product()?];
        while let Some((_, SUM_SEPARATOR)) = self.peek() {
            self.pos += 1;
            items.push(self.product()?);
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            Expr::Sum(items)
        })
    }

    fn product(&mut self) -> Result<Expr, ParseError> {
        let mut items = Vec::new();
        while let Some((_, c)) = self.peek() {
            if c == SUM_SEPARATOR || c == ')' {
                break;
            }
            items.push(self.factor()?);
        }
        match items.len() {
            0 => Err(ParseError::EmptyFragment),
            1 => Ok(items.remove(0)),
            _ => Ok(Expr::Product(items)),
        }
    }

    fn digits(&mut self) -> String {
        let mut digits = String::new();
        while let Some((_, c)) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            self.pos += 1;
        }
        digits
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        let Some((pos, ch)) = self.peek() else {
            return Err(ParseError::EmptyFragment);
        };
        match ch {
            VAR_MARKER => {
                self.pos += 1;
                let digits = self.digits();
                if digits.is_empty() {
                    return Err(ParseError::MissingIndex { pos });
                }
                let var = parse_index(&digits).ok_or(ParseError::IndexOverflow { pos })?;
                Ok(Expr::Var(var))
            }
            '(' => {
                self.pos += 1;
                let inner = self.sum()?;
                match self.peek() {
                    Some((_, ')')) => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    Some((pos, ch)) => Err(ParseError::UnexpectedChar { ch, pos }),
                    None => Err(ParseError::UnexpectedChar { ch: '(', pos }),
                }
            }
            '0' | '1' => {
                self.pos += 1;
                Ok(if ch == '1' { Expr::One } else { Expr::Zero })
            }
            _ => Err(ParseError::UnexpectedChar { ch, pos }),
        }
    }
}

/// Parses an expression: variables `x<i>`, constants `1` and `0`,
/// juxtaposition for AND, `+` for XOR and parentheses. Whitespace is
/// ignored.
pub fn parse_expr(text: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(text);
    let expr = parser.sum()?;
    match parser.peek() {
        None => Ok(expr),
        Some((pos, ch)) => Err(ParseError::UnexpectedChar { ch, pos }),
    }
}

/// Returns the canonical rendering of an expression.
///
/// Text that does not parse canonicalizes to itself with whitespace
/// removed.
pub fn canonicalize(text: &str) -> String {
    match parse_expr(text) {
        Ok(expr) => expr.normalize().to_string(),
        Err(_) => text.chars().filter(|c| !c.is_whitespace()).collect(),
    }
}
