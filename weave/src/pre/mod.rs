//! Parser for parallel regular expressions (PREs).
//!
//! A PRE is a classical regex (symbols, concatenation, alternation (`|`) and
//! Kleene star (`*`)) extended with a shuffle operator `&` that interleaves
//! its operands while preserving each operand's own symbol order.

mod parse;

use crate::error::ParseError;
use std::rc::Rc;

/// The parse tree of a parallel regular expression.
///
/// `Concat`, `Union` and `Shuffle` are left-associative binary nodes (the
/// parser folds `a & b & c` into `Shuffle(Shuffle(a, b), c)`). `Empty` denotes
/// the empty word; it has no surface syntax of its own but arises from an
/// empty group `()`, which is otherwise indistinguishable in the grammar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Sym(Rc<str>),
    Empty,
    Concat(Box<Expr>, Box<Expr>),
    Union(Box<Expr>, Box<Expr>),
    Shuffle(Box<Expr>, Box<Expr>),
    Star(Box<Expr>),
}

/// Parses a parallel regular expression.
///
/// Grammar (lowest to highest precedence): `union := shuffle ('|' shuffle)*`,
/// `shuffle := concat ('&' concat)*`, `concat := star*`, `star := atom '*'?`,
/// `atom := SYMBOL | '[' IDENT ']' | '(' union ')'`. Leading and trailing
/// whitespace is ignored; whitespace between tokens is never significant.
pub fn parse(input: &str) -> Result<Expr, ParseError<'_>> {
    parse::full_expr(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_symbol() {
        assert_eq!(parse("A").unwrap(), Expr::Sym(Rc::from("A")));
    }

    #[test]
    fn concatenation_is_left_associative() {
        let expected = Expr::Concat(
            Box::new(Expr::Concat(
                Box::new(Expr::Sym(Rc::from("A"))),
                Box::new(Expr::Sym(Rc::from("B"))),
            )),
            Box::new(Expr::Sym(Rc::from("C"))),
        );
        assert_eq!(parse("A B C").unwrap(), expected);
        assert_eq!(parse("ABC").unwrap(), expected);
    }

    #[test]
    fn shuffle_binds_tighter_than_union() {
        let expected = Expr::Union(
            Box::new(Expr::Sym(Rc::from("A"))),
            Box::new(Expr::Shuffle(
                Box::new(Expr::Sym(Rc::from("B"))),
                Box::new(Expr::Sym(Rc::from("C"))),
            )),
        );
        assert_eq!(parse("A|B&C").unwrap(), expected);
    }

    #[test]
    fn bracketed_multichar_symbol() {
        assert_eq!(parse("[foo]").unwrap(), Expr::Sym(Rc::from("foo")));
    }

    #[test]
    fn star_applies_to_the_nearest_atom() {
        let expected = Expr::Concat(
            Box::new(Expr::Star(Box::new(Expr::Sym(Rc::from("A"))))),
            Box::new(Expr::Sym(Rc::from("B"))),
        );
        assert_eq!(parse("A*B").unwrap(), expected);
    }

    #[test]
    fn empty_group_parses_to_empty() {
        assert_eq!(parse("()").unwrap(), Expr::Empty);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert_eq!(parse("").unwrap_err(), ParseError::Empty);
        assert_eq!(parse("   ").unwrap_err(), ParseError::Empty);
    }

    #[test]
    fn unterminated_bracket_is_reported() {
        assert_eq!(parse("[abc").unwrap_err(), ParseError::UnterminatedBracket(0));
    }

    #[test]
    fn trailing_input_is_reported() {
        assert_eq!(parse("A)").unwrap_err(), ParseError::TrailingInput(")"));
    }

    #[test]
    fn unexpected_char_is_reported() {
        assert_eq!(parse("&A").unwrap_err(), ParseError::UnexpectedChar('&', 0));
    }
}
