//! Property tests for the quantified invariants of the pipeline: that the
//! compiled automaton's language matches a naive reference semantics for
//! concatenation, union and shuffle, and that trimming and minimization never
//! change the language they operate on.
//!
//! Generates structures directly via a `Strategy` (rather than generating
//! and re-parsing PRE text) and checks them against a small,
//! obviously-correct reference implementation.

use proptest::prelude::*;
use std::rc::Rc;
use weave::enumerate::Enumerator;
use weave::nfa;
use weave::pre::{self, Expr};

/// A direct, recursive, exponential-but-small reference semantics for the
/// PRE language, used only to check the compiled DFA against, never for
/// anything performance-sensitive.
fn language_contains(expr: &Expr, word: &[Rc<str>]) -> bool {
    match expr {
        Expr::Sym(s) => word.len() == 1 && &word[0] == s,
        Expr::Empty => word.is_empty(),
        Expr::Concat(l, r) => {
            (0..=word.len()).any(|i| language_contains(l, &word[..i]) && language_contains(r, &word[i..]))
        }
        Expr::Union(l, r) => language_contains(l, word) || language_contains(r, word),
        Expr::Star(e) => star_contains(e, word),
        Expr::Shuffle(l, r) => shuffle_contains(l, r, word),
    }
}

fn star_contains(e: &Expr, word: &[Rc<str>]) -> bool {
    if word.is_empty() {
        return true;
    }
    (1..=word.len()).any(|i| language_contains(e, &word[..i]) && star_contains(e, &word[i..]))
}

/// Tries every way of splitting `word` into two (order-preserving)
/// subsequences, checking if one is matched by `l` and the other by `r`,
/// the definition of shuffle.
fn shuffle_contains(l: &Expr, r: &Expr, word: &[Rc<str>]) -> bool {
    let n = word.len();
    (0u32..(1 << n)).any(|mask| {
        let mut left = Vec::new();
        let mut right = Vec::new();
        for (i, sym) in word.iter().enumerate() {
            if mask & (1 << i) != 0 {
                left.push(sym.clone());
            } else {
                right.push(sym.clone());
            }
        }
        language_contains(l, &left) && language_contains(r, &right)
    })
}

fn small_expr() -> impl Strategy<Value = Expr> {
    let leaf = ('A'..='D').prop_map(|c| Expr::Sym(Rc::from(c.to_string())));
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Expr::Concat(Box::new(l), Box::new(r))),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Expr::Union(Box::new(l), Box::new(r))),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Expr::Shuffle(Box::new(l), Box::new(r))),
        ]
    })
}

fn arbitrary_word() -> impl Strategy<Value = Vec<Rc<str>>> {
    prop::collection::vec(('A'..='D').prop_map(|c| Rc::from(c.to_string()) as Rc<str>), 0..6)
}

proptest! {
    /// Invariants 1-3: the compiled DFA's language matches the naive
    /// reference semantics for concatenation, union and shuffle alike.
    #[test]
    fn dfa_matches_naive_semantics(expr in small_expr(), word in arbitrary_word()) {
        let dfa = nfa::lower(&expr).unwrap().to_dfa();
        let word_refs: Vec<&str> = word.iter().map(|s| &**s).collect();
        prop_assert_eq!(dfa.accepts(&word_refs), language_contains(&expr, &word));
    }

    /// Invariant 7: trimming a DFA never changes which strings it accepts.
    #[test]
    fn trimming_preserves_language(expr in small_expr(), word in arbitrary_word()) {
        let dfa = nfa::lower(&expr).unwrap().to_dfa();
        let trimmed = dfa.trim();
        let word_refs: Vec<&str> = word.iter().map(|s| &**s).collect();
        prop_assert_eq!(dfa.accepts(&word_refs), trimmed.accepts(&word_refs));
    }

    /// Invariant 6: minimizing a (trimmed) DFA never changes its language.
    #[test]
    fn minimization_preserves_language(expr in small_expr(), word in arbitrary_word()) {
        let dfa = nfa::lower(&expr).unwrap().to_dfa().trim();
        let minimized = dfa.minimize();
        let word_refs: Vec<&str> = word.iter().map(|s| &**s).collect();
        prop_assert_eq!(dfa.accepts(&word_refs), minimized.accepts(&word_refs));
    }

    /// Invariant 8: shuffling n distinct single symbols together produces
    /// exactly n! plans.
    #[test]
    fn shuffle_chain_cardinality(n in 2usize..=5) {
        let symbols: Vec<String> = (0..n).map(|i| ((b'A' + i as u8) as char).to_string()).collect();
        let pre_str = symbols.join("&");
        let expr = pre::parse(&pre_str).unwrap();
        let dfa = nfa::lower(&expr).unwrap().to_dfa().trim();
        let count = Enumerator::new(Rc::new(dfa), false).count();
        let factorial: usize = (1..=n).product();
        prop_assert_eq!(count, factorial);
    }
}
