use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::types::Var;
use crate::varset::VarSet;

/// Marker that precedes every variable index in polynomial text.
pub const VAR_MARKER: char = 'x';

/// Separator between the monomials of a polynomial.
pub const SUM_SEPARATOR: char = '+';

/// Errors reported by the strict parsing surface.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("empty monomial fragment")]
    EmptyFragment,
    #[error("unexpected character {ch:?} at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("variable marker at position {pos} is not followed by an index")]
    MissingIndex { pos: usize },
    #[error("variable index at position {pos} is not below {}", Var::LIMIT)]
    IndexOverflow { pos: usize },
}

/// A monomial of one function: its source text and variable set.
///
/// The variable set is derived once, at parse time. Whether the term is
/// still available for matching is tracked by the owning
/// [`DegreeIndex`][crate::index::DegreeIndex].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Term {
    text: String,
    vars: VarSet,
}

impl Term {
    pub fn new(text: impl Into<String>, vars: VarSet) -> Self {
        Self { text: text.into(), vars }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn vars(&self) -> &VarSet {
        &self.vars
    }

    /// Number of distinct variables.
    pub fn degree(&self) -> usize {
        self.vars.len()
    }

    /// True for the literal constant `1`.
    pub fn is_constant(&self) -> bool {
        self.vars.is_empty() && self.text == "1"
    }

    /// True for a fragment that yielded no variables and is not the constant.
    pub fn is_malformed(&self) -> bool {
        self.vars.is_empty() && self.text != "1"
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.vars)
    }
}

/// Decimal variable index, or `None` if it is not below [`Var::LIMIT`].
pub(crate) fn parse_index(digits: &str) -> Option<Var> {
    digits.parse::<u32>().ok().filter(|&i| i < Var::LIMIT).map(Var::new)
}

/// Parses a monomial leniently.
///
/// Every variable marker followed by a decimal index contributes that
/// index; anything else is skipped. Whitespace is removed from the stored
/// text. A malformed fragment produces an empty variable set, which is
/// indistinguishable from the constant except through
/// [`Term::is_malformed`]. A fragment with an index at or above
/// [`Var::LIMIT`] is malformed as a whole.
pub fn parse_term(text: &str) -> Term {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let mut vars = VarSet::new();

    let bytes = cleaned.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] as char == VAR_MARKER {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end > start {
                match parse_index(&cleaned[start..end]) {
                    Some(var) => {
                        vars.insert(var);
                    }
                    None => return Term::new(cleaned, VarSet::new()),
                }
            }
            i = end.max(i + 1);
        } else {
            i += 1;
        }
    }

    Term::new(cleaned, vars)
}

impl FromStr for Term {
    type Err = ParseError;

    /// Parses a monomial strictly: either the literal `1` or a non-empty
    /// run of `x<index>` tokens, with whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<(usize, char)> = s.char_indices().filter(|(_, c)| !c.is_whitespace()).collect();
        if chars.is_empty() {
            return Err(ParseError::EmptyFragment);
        }
        let cleaned: String = chars.iter().map(|&(_, c)| c).collect();
        if cleaned == "1" {
            return Ok(Term::new(cleaned, VarSet::new()));
        }

        let mut vars = VarSet::new();
        let mut i = 0;
        while i < chars.len() {
            let (pos, ch) = chars[i];
            if ch != VAR_MARKER {
                return Err(ParseError::UnexpectedChar { ch, pos });
            }
            i += 1;
            let mut digits = String::new();
            while i < chars.len() && chars[i].1.is_ascii_digit() {
                digits.push(chars[i].1);
                i += 1;
            }
            if digits.is_empty() {
                return Err(ParseError::MissingIndex { pos });
            }
            let var = parse_index(&digits).ok_or(ParseError::IndexOverflow { pos })?;
            vars.insert(var);
        }

        Ok(Term::new(cleaned, vars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_term() {
        let t = parse_term(" x3 x1x2 ");
        assert_eq!(t.text(), "x3x1x2");
        assert_eq!(t.degree(), 3);
        assert_eq!(t.to_string(), "x1x2x3");
    }

    #[test]
    fn test_parse_term_duplicates() {
        let t = parse_term("x1x1x2");
        assert_eq!(t.degree(), 2);
    }

    #[test]
    fn test_parse_term_lenient() {
        let t = parse_term("x1y2");
        assert_eq!(t.to_string(), "x1");
        let bad = parse_term("abc");
        assert!(bad.vars().is_empty());
        assert!(bad.is_malformed());
        assert!(!bad.is_constant());
    }

    #[test]
    fn test_parse_constant() {
        let t = parse_term(" 1 ");
        assert!(t.is_constant());
        assert!(!t.is_malformed());
        assert_eq!(t.degree(), 0);
    }

    #[test]
    fn test_from_str() {
        let t: Term = "x10 x2".parse().unwrap();
        assert_eq!(t.to_string(), "x2x10");
        let one: Term = "1".parse().unwrap();
        assert!(one.is_constant());
    }

    #[test]
    fn test_from_str_errors() {
        assert_eq!("  ".parse::<Term>(), Err(ParseError::EmptyFragment));
        assert_eq!("x1y2".parse::<Term>(), Err(ParseError::UnexpectedChar { ch: 'y', pos: 2 }));
        assert_eq!("x1x".parse::<Term>(), Err(ParseError::MissingIndex { pos: 2 }));
        assert_eq!(
            "x99999999999".parse::<Term>(),
            Err(ParseError::IndexOverflow { pos: 0 })
        );
        assert_eq!("x1x65536".parse::<Term>(), Err(ParseError::IndexOverflow { pos: 2 }));
        assert!("x65535".parse::<Term>().is_ok());
    }

    #[test]
    fn test_parse_term_index_out_of_range() {
        let t = parse_term("x2147483648x1");
        assert!(t.is_malformed());
        assert!(t.vars().is_empty());
        assert!(parse_term("x4294967296").is_malformed());
        assert_eq!(parse_term("x65535").degree(), 1);
    }
}
