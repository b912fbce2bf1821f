//! Lazy enumeration of accepted strings ("plans") over a trimmed [`Dfa`].
//!
//! [`Enumerator`] is a pull iterator holding an explicit depth-first-search
//! stack; it is a distinct, mutable value kept apart from the immutable
//! [`Dfa`] it walks (per the design notes' stance on cyclic data and lazy
//! sequences), and it borrows the DFA through a shared [`Rc`] rather than a
//! lifetime-tied reference so it can be cached alongside the automaton inside
//! [`crate::driver::Compiled`] without becoming self-referential.

use crate::dfa::Dfa;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// One accepted string: a sequence of symbols interpreted, by the driver, as
/// an ordered sequence of actions to invoke.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    symbols: Vec<Rc<str>>,
}

impl Plan {
    pub fn symbols(&self) -> &[Rc<str>] {
        &self.symbols
    }
}

/// Renders as the symbols separated by single spaces, with a trailing space
/// after the last one, since the driver's plan parser splits on whitespace and
/// discards empty tokens, so the trailing space is harmless to consumers and
/// lets every symbol be followed uniformly by a separator.
impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.symbols {
            write!(f, "{s} ")?;
        }
        Ok(())
    }
}

struct Frame {
    state: usize,
    /// Index into the (already lexicographically sorted) alphabet of the
    /// next outgoing edge to try.
    next_edge: usize,
    /// Whether the accepting-state check has already fired for this frame.
    yielded: bool,
    /// The symbol that was consumed to reach this frame, `None` for the root.
    entered_via: Option<Rc<str>>,
}

/// A depth-first, pull-based enumerator over a [`Dfa`]'s accepted strings.
///
/// Transitions are visited in lexicographic order on symbol name (the
/// alphabet is already sorted that way by construction), so two enumerators
/// built from identical DFAs always produce identical plan sequences.
///
/// Without `allow_infinite`, the DFS refuses to step onto a state already on
/// its current path: a back-edge into an in-progress path is a dead end for
/// that path only, not a hard error. This yields exactly the (finite) set of
/// accepting *simple-path* strings for a cyclic DFA, resolving the open
/// question of §9 of the design notes for this crate. With `allow_infinite`,
/// states may be revisited freely and the enumerator may never exhaust.
pub struct Enumerator {
    dfa: Rc<Dfa>,
    allow_infinite: bool,
    stack: Vec<Frame>,
    on_path: HashSet<usize>,
    exhausted: bool,
}

impl Enumerator {
    pub fn new(dfa: Rc<Dfa>, allow_infinite: bool) -> Enumerator {
        let initial = dfa.initial_state_index();
        Enumerator {
            dfa,
            allow_infinite,
            stack: vec![Frame {
                state: initial,
                next_edge: 0,
                yielded: false,
                entered_via: None,
            }],
            on_path: HashSet::from([initial]),
            exhausted: false,
        }
    }

    fn current_plan(&self) -> Plan {
        let symbols = self
            .stack
            .iter()
            .skip(1)
            .filter_map(|frame| frame.entered_via.clone())
            .collect();
        Plan { symbols }
    }
}

impl Iterator for Enumerator {
    type Item = Plan;

    fn next(&mut self) -> Option<Plan> {
        if self.exhausted {
            return None;
        }
        loop {
            let top = self.stack.len().checked_sub(1)?;

            if !self.stack[top].yielded {
                self.stack[top].yielded = true;
                let state = self.stack[top].state;
                if self.dfa.states()[state].is_accepting() {
                    return Some(self.current_plan());
                }
            }

            let state = self.stack[top].state;
            let alphabet_len = self.dfa.alphabet().len();
            let mut descend: Option<(usize, usize)> = None;
            while self.stack[top].next_edge < alphabet_len {
                let sym_idx = self.stack[top].next_edge;
                self.stack[top].next_edge += 1;
                let target = self.dfa.states()[state].transitions()[sym_idx];
                if self.allow_infinite || !self.on_path.contains(&target) {
                    descend = Some((target, sym_idx));
                    break;
                }
            }

            if let Some((target, sym_idx)) = descend {
                let sym = self.dfa.alphabet()[sym_idx].clone();
                self.on_path.insert(target);
                self.stack.push(Frame {
                    state: target,
                    next_edge: 0,
                    yielded: false,
                    entered_via: Some(sym),
                });
                continue;
            }

            let popped = self.stack.pop().expect("top existed above");
            self.on_path.remove(&popped.state);
            if self.stack.is_empty() {
                self.exhausted = true;
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nfa;
    use crate::pre;

    fn plans(pre_str: &str) -> Vec<String> {
        let expr = pre::parse(pre_str).unwrap();
        let dfa = nfa::lower(&expr).unwrap().to_dfa().trim();
        Enumerator::new(Rc::new(dfa), false)
            .map(|p| p.to_string().trim_end().to_string())
            .collect()
    }

    #[test]
    fn fresh_enumerator_yields_first_plan_or_none() {
        let expr = pre::parse("A").unwrap();
        let dfa = nfa::lower(&expr).unwrap().to_dfa().trim();
        let mut e = Enumerator::new(Rc::new(dfa), false);
        assert_eq!(e.next().map(|p| p.to_string()), Some("A ".to_string()));
        assert_eq!(e.next(), None);
        // Exhausted enumerators keep returning nothing.
        assert_eq!(e.next(), None);
    }

    #[test]
    fn three_way_shuffle_yields_all_six_permutations() {
        let mut result = plans("A&B&C");
        result.sort();
        let mut expected = vec!["A B C", "A C B", "B A C", "B C A", "C A B", "C B A"]
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        expected.sort();
        assert_eq!(result, expected);
    }

    #[test]
    fn concatenation_only_yields_a_single_plan() {
        assert_eq!(plans("A B C"), vec!["A B C".to_string()]);
    }

    #[test]
    fn union_yields_one_plan_per_arm() {
        let mut result = plans("A|B|C");
        result.sort();
        assert_eq!(result, vec!["A".to_string(), "B".to_string(), "C".to_string()]);
    }

    #[test]
    fn nested_shuffle_preserves_arm_order_c_7_3() {
        let result = plans("s (A (a b) C & (D E F)) f");
        assert_eq!(result.len(), 35);
        for plan in &result {
            assert!(plan.starts_with("s "));
            assert!(plan.ends_with(" f"));
        }
    }

    #[test]
    fn determinism_across_independent_enumerators() {
        let expr = pre::parse("A&B&C&D").unwrap();
        let dfa = Rc::new(nfa::lower(&expr).unwrap().to_dfa().trim());
        let first: Vec<_> = Enumerator::new(dfa.clone(), false).collect();
        let second: Vec<_> = Enumerator::new(dfa, false).collect();
        assert_eq!(
            first.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
            second.iter().map(|p| p.to_string()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn cyclic_dfa_without_allow_infinite_terminates() {
        let expr = pre::parse("A*").unwrap();
        let dfa = Rc::new(nfa::lower(&expr).unwrap().to_dfa().trim());
        // Simple-path semantics: the self-loop is refused once its target is
        // already on the path, so only the empty word and "A" survive.
        let rendered: Vec<_> = Enumerator::new(dfa, false).map(|p| p.to_string()).collect();
        assert_eq!(rendered, vec!["".to_string(), "A ".to_string()]);
    }

    #[test]
    fn allow_infinite_yields_arbitrarily_many_repetitions() {
        let expr = pre::parse("A*").unwrap();
        let dfa = Rc::new(nfa::lower(&expr).unwrap().to_dfa().trim());
        let prefix: Vec<_> = Enumerator::new(dfa, true).take(5).collect();
        assert_eq!(prefix.len(), 5);
    }
}
