use super::Expr;
use crate::error::ParseError;
use nom::branch::alt;
use nom::bytes::complete::take;
use nom::character::complete::{char, multispace0};
use nom::combinator::{map, opt, verify};
use nom::multi::{many1, separated_list1};
use nom::sequence::{delimited, preceded};
use nom::{IResult, Parser};

pub(crate) fn full_expr(input: &str) -> Result<Expr, ParseError<'_>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    match expr(trimmed) {
        Ok((rest, tree)) => {
            let rest = rest.trim_start();
            if rest.is_empty() {
                Ok(tree)
            } else {
                Err(ParseError::TrailingInput(rest))
            }
        }
        Err(e) => Err(translate_err(trimmed, e)),
    }
}

fn translate_err<'a>(searched: &'a str, err: nom::Err<nom::error::Error<&'a str>>) -> ParseError<'a> {
    match err {
        nom::Err::Failure(e) if e.input.starts_with('[') => {
            let pos = searched.len() - e.input.len();
            ParseError::UnterminatedBracket(pos)
        }
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let pos = searched.len() - e.input.len();
            match e.input.chars().next() {
                Some(c) => ParseError::UnexpectedChar(c, pos),
                None => ParseError::UnexpectedEof("expression"),
            }
        }
        nom::Err::Incomplete(_) => ParseError::UnexpectedEof("expression"),
    }
}

fn expr(input: &str) -> IResult<&str, Expr> {
    union(input)
}

fn union(input: &str) -> IResult<&str, Expr> {
    map(
        separated_list1(preceded(multispace0, char('|')), shuffle),
        |list| fold_left(list, Expr::Union),
    )(input)
}

fn shuffle(input: &str) -> IResult<&str, Expr> {
    map(
        separated_list1(preceded(multispace0, char('&')), concat),
        |list| fold_left(list, Expr::Shuffle),
    )(input)
}

fn concat(input: &str) -> IResult<&str, Expr> {
    map(many1(star), |list: Vec<Expr>| {
        list.into_iter()
            .reduce(|l, r| Expr::Concat(Box::new(l), Box::new(r)))
            .expect("many1 yields a non-empty list")
    })(input)
}

fn star(input: &str) -> IResult<&str, Expr> {
    map(atom.and(opt(preceded(multispace0, char('*')))), |(e, s)| {
        if s.is_some() {
            Expr::Star(Box::new(e))
        } else {
            e
        }
    })(input)
}

fn atom(input: &str) -> IResult<&str, Expr> {
    preceded(multispace0, alt((paren_expr, bracket_symbol, plain_symbol)))(input)
}

// `expr` alone can never produce `Expr::Empty` (every alternative bottoms out
// at `concat := star+`), so an empty group is recognized here explicitly,
// since it is the only surface syntax for the empty word.
fn paren_expr(input: &str) -> IResult<&str, Expr> {
    let (rest, _) = char('(')(input)?;
    let (rest, _) = multispace0(rest)?;
    if let Some(after) = rest.strip_prefix(')') {
        return Ok((after, Expr::Empty));
    }
    let (rest, tree) = expr(rest)?;
    let (rest, _) = preceded(multispace0, char(')'))(rest)?;
    Ok((rest, tree))
}

// Written by hand rather than via `is_not`/`delimited` so an unterminated
// bracket can be reported as such instead of as a generic unexpected-char.
fn bracket_symbol(input: &str) -> IResult<&str, Expr> {
    let (rest, _) = char('[')(input)?;
    match rest.find(']') {
        Some(0) => Err(nom::Err::Error(nom::error::Error::new(
            rest,
            nom::error::ErrorKind::Verify,
        ))),
        Some(idx) => {
            let (ident, after) = (&rest[..idx], &rest[idx + 1..]);
            Ok((after, Expr::Sym(std::rc::Rc::from(ident))))
        }
        None => Err(nom::Err::Failure(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Fail,
        ))),
    }
}

fn plain_symbol(input: &str) -> IResult<&str, Expr> {
    map(
        verify(take(1usize), |s: &str| {
            s.chars().next().is_some_and(|c| !is_metachar(c) && !c.is_whitespace())
        }),
        |s: &str| Expr::Sym(std::rc::Rc::from(s)),
    )(input)
}

fn is_metachar(c: char) -> bool {
    matches!(c, '|' | '&' | '*' | '(' | ')' | '[' | ']')
}

fn fold_left(mut list: Vec<Expr>, f: impl Fn(Box<Expr>, Box<Expr>) -> Expr) -> Expr {
    let first = list.remove(0);
    list.into_iter()
        .fold(first, |acc, item| f(Box::new(acc), Box::new(item)))
}
