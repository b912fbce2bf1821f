//! ε-NFA lowering and determinization.
//!
//! [`lower`] turns a parse tree directly into an ε-NFA, bypassing the PFA's
//! λ-graph: `Concat`, `Union` and `Star` get the usual Thompson-style splice,
//! while `Shuffle` is lowered via an explicit (but reachability-reduced)
//! product construction over its two arms. [`Nfa::to_dfa`] then determinizes
//! the result by subset construction.

mod lower;

use crate::dfa::{Dfa, DfaState};
use crate::error::CompileError;
use crate::pre::Expr;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::rc::Rc;

/// A state that exceeds this, while building the ε-NFA, aborts the lowering
/// with [`CompileError::TooLarge`]. Advisory only: it exists to fail fast on
/// the super-polynomial blowup a deeply nested shuffle can trigger, not
/// because any particular count is unsafe.
pub(crate) const STATE_CEILING: usize = 1 << 16;

#[derive(Clone, Debug, Default)]
pub struct NfaState {
    pub accepting: bool,
    /// One entry per alphabet symbol, each holding the (possibly empty) set
    /// of states reachable on that symbol.
    pub transitions: Vec<Vec<usize>>,
    pub epsilon_transitions: Vec<usize>,
}

#[derive(Clone, Debug)]
pub struct Nfa {
    pub(crate) alphabet: Rc<[Rc<str>]>,
    pub(crate) states: Vec<NfaState>,
    pub(crate) initial_state: usize,
}

impl Nfa {
    pub fn alphabet(&self) -> &[Rc<str>] {
        &self.alphabet
    }

    pub fn states(&self) -> &[NfaState] {
        &self.states
    }

    /// The ε-closure of a set of states: every state reachable from it
    /// without consuming input.
    fn closure(&self, from: &BTreeSet<usize>) -> BTreeSet<usize> {
        let mut closure = from.clone();
        let mut stack: Vec<usize> = from.iter().copied().collect();
        while let Some(s) = stack.pop() {
            for &t in &self.states[s].epsilon_transitions {
                if closure.insert(t) {
                    stack.push(t);
                }
            }
        }
        closure
    }

    /// Determinizes by subset construction. The undefined transition case is
    /// materialized as an explicit non-accepting sink state with a self-loop
    /// on every symbol, built lazily only if some reachable subset ever
    /// needs it.
    pub fn to_dfa(&self) -> Dfa {
        let mut index_of: HashMap<BTreeSet<usize>, usize> = HashMap::new();
        let mut states: Vec<DfaState> = Vec::new();
        let mut queue: VecDeque<BTreeSet<usize>> = VecDeque::new();
        let mut sink: Option<usize> = None;

        let initial_set = self.closure(&BTreeSet::from([self.initial_state]));
        index_of.insert(initial_set.clone(), 0);
        states.push(DfaState {
            name: Rc::from("q0"),
            accepting: false,
            transitions: Vec::new(),
        });
        queue.push_back(initial_set);

        while let Some(set) = queue.pop_front() {
            let idx = index_of[&set];
            let accepting = set.iter().any(|&s| self.states[s].accepting);
            let mut transitions = Vec::with_capacity(self.alphabet.len());
            for a in 0..self.alphabet.len() {
                let mut moved = BTreeSet::new();
                for &s in &set {
                    moved.extend(self.states[s].transitions[a].iter().copied());
                }
                let target = if moved.is_empty() {
                    *sink.get_or_insert_with(|| {
                        let idx = states.len();
                        states.push(DfaState {
                            name: Rc::from("sink"),
                            accepting: false,
                            transitions: vec![idx; self.alphabet.len()],
                        });
                        idx
                    })
                } else {
                    let closed = self.closure(&moved);
                    *index_of.entry(closed.clone()).or_insert_with(|| {
                        let idx = states.len();
                        states.push(DfaState {
                            name: Rc::from(format!("q{idx}")),
                            accepting: false,
                            transitions: Vec::new(),
                        });
                        queue.push_back(closed);
                        idx
                    })
                };
                transitions.push(target);
            }
            states[idx].accepting = accepting;
            states[idx].transitions = transitions;
        }

        Dfa::from_parts(self.alphabet.clone(), states, 0)
    }
}

/// Lowers a parse tree into an ε-NFA.
pub fn lower(expr: &Expr) -> Result<Nfa, CompileError> {
    lower::lower(expr)
}
