//! Parallel Finite Automata: the fragment-based intermediate structure that
//! gives the shuffle operator its formal semantics.
//!
//! A PFA is an ε-NFA augmented with λ-pairs: two distinguished transitions
//! that must be thought of as firing together, one entering the left arm of
//! a shuffle and one leaving its right arm (or vice versa). `build` follows
//! the same recursive fragment construction the NFA lowering pass
//! ([`crate::nfa::lower`]) uses for everything except `Shuffle`, but here
//! `Shuffle` is represented faithfully with its fork/join λ-pair instead of
//! being expanded into a product. The PFA is never executed directly; it
//! exists so the shuffle encoding can be built and checked in isolation.

use crate::pre::Expr;
use std::rc::Rc;

/// One half of a λ-pair: a transition that is only meaningful together with
/// its `mate`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LambdaEdge {
    pub from: usize,
    pub to: usize,
    /// Index, into the owning [`Pfa`]'s `lambda_edges`, of the matching half.
    pub mate: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PfaState {
    pub accepting: bool,
    pub sym_transitions: Vec<(Rc<str>, usize)>,
    pub epsilon_transitions: Vec<usize>,
    /// Indices into the owning [`Pfa`]'s `lambda_edges` for λ-edges leaving
    /// this state.
    pub lambda_out: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pfa {
    pub states: Vec<PfaState>,
    pub lambda_edges: Vec<LambdaEdge>,
    pub initial_state: usize,
}

impl Pfa {
    /// Builds a PFA from a parse tree by recursive fragment construction.
    ///
    /// Every fragment built here has exactly one entry state and exactly one
    /// exit state, by induction over the five tree shapes: `Sym` and `Empty`
    /// are base cases with a single exit, and `Concat`/`Union`/`Shuffle`/
    /// `Star` all wire their operands' (singleton) exits into a single fresh
    /// or forwarded exit of their own.
    pub fn build(expr: &Expr) -> Pfa {
        let mut builder = Builder::default();
        let frag = builder.fragment(expr);
        builder.states[frag.exit].accepting = true;
        Pfa {
            states: builder.states,
            lambda_edges: builder.lambda_edges,
            initial_state: frag.entry,
        }
    }

    /// A λ-edge and its mate always point back at each other: pairing is an
    /// involution. Used by tests and by callers that want to sanity-check a
    /// hand-built or mutated PFA.
    pub fn lambda_pairing_is_consistent(&self) -> bool {
        self.lambda_edges
            .iter()
            .enumerate()
            .all(|(idx, edge)| self.lambda_edges[edge.mate].mate == idx)
    }
}

#[derive(Copy, Clone)]
struct Fragment {
    entry: usize,
    exit: usize,
}

#[derive(Default)]
struct Builder {
    states: Vec<PfaState>,
    lambda_edges: Vec<LambdaEdge>,
}

impl Builder {
    fn fresh(&mut self) -> usize {
        self.states.push(PfaState::default());
        self.states.len() - 1
    }

    fn add_epsilon(&mut self, from: usize, to: usize) {
        self.states[from].epsilon_transitions.push(to);
    }

    fn add_sym(&mut self, from: usize, sym: Rc<str>, to: usize) {
        self.states[from].sym_transitions.push((sym, to));
    }

    /// Registers two transitions as a λ-pair and records them on their
    /// source states.
    fn add_lambda_pair(&mut self, a: (usize, usize), b: (usize, usize)) {
        let a_idx = self.lambda_edges.len();
        let b_idx = a_idx + 1;
        self.lambda_edges.push(LambdaEdge {
            from: a.0,
            to: a.1,
            mate: b_idx,
        });
        self.lambda_edges.push(LambdaEdge {
            from: b.0,
            to: b.1,
            mate: a_idx,
        });
        self.states[a.0].lambda_out.push(a_idx);
        self.states[b.0].lambda_out.push(b_idx);
    }

    fn fragment(&mut self, expr: &Expr) -> Fragment {
        match expr {
            Expr::Sym(s) => {
                let a = self.fresh();
                let b = self.fresh();
                self.add_sym(a, s.clone(), b);
                Fragment { entry: a, exit: b }
            }
            Expr::Empty => {
                let a = self.fresh();
                Fragment { entry: a, exit: a }
            }
            Expr::Concat(l, r) => {
                let l = self.fragment(l);
                let r = self.fragment(r);
                self.add_epsilon(l.exit, r.entry);
                Fragment {
                    entry: l.entry,
                    exit: r.exit,
                }
            }
            Expr::Union(l, r) => {
                let l = self.fragment(l);
                let r = self.fragment(r);
                let entry = self.fresh();
                let exit = self.fresh();
                self.add_epsilon(entry, l.entry);
                self.add_epsilon(entry, r.entry);
                self.add_epsilon(l.exit, exit);
                self.add_epsilon(r.exit, exit);
                Fragment { entry, exit }
            }
            Expr::Star(e) => {
                let inner = self.fragment(e);
                let a = self.fresh();
                self.add_epsilon(a, inner.entry);
                self.add_epsilon(inner.exit, a);
                Fragment { entry: a, exit: a }
            }
            Expr::Shuffle(l, r) => {
                let l = self.fragment(l);
                let r = self.fragment(r);
                let entry = self.fresh();
                let exit = self.fresh();
                // Fork: entering the left arm is mated with leaving the right
                // arm, and vice versa, so the two "fire together" from the
                // formal semantics' point of view even though each is a
                // plain ε-move operationally.
                self.add_lambda_pair((entry, l.entry), (r.exit, exit));
                self.add_lambda_pair((entry, r.entry), (l.exit, exit));
                Fragment { entry, exit }
            }
        }
    }
}
