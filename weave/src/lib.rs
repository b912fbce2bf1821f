//!# weave
//!
//! `weave` compiles *parallel regular expressions* (classical regexes extended with a
//! shuffle operator `&`) into a deterministic finite automaton whose accepted strings
//! enumerate every sequentially consistent interleaving the expression admits.
//!
//! ## Usage
//!
//! ```rust
//! use weave::driver::{Compiled, Options};
//!
//! let mut compiled = Compiled::compile("A&B&C", Options::default()).unwrap();
//! let mut plans = Vec::new();
//! while let Some(plan) = compiled.next_plan().unwrap() {
//!     plans.push(plan.to_string());
//! }
//! assert_eq!(plans.len(), 6);
//! ```
//!
//! ## Pipeline
//!
//! A parallel regular expression is compiled through a fixed pipeline, each stage its
//! own module:
//!
//! * [`pre`] parses the expression text into an [`pre::Expr`] tree.
//! * [`pfa`] builds a Parallel Finite Automaton from the tree, encoding shuffle as
//!   λ-paired transitions. It is an independently testable artifact; the actual
//!   lowering below bypasses it (see [`nfa`]'s module docs).
//! * [`nfa`] lowers shuffle directly from the tree into a plain ε-NFA via a product
//!   construction, and determinizes it into a [`dfa::Dfa`].
//! * [`dfa`] minimizes ([`dfa::Dfa::minimize`]) and trims
//!   ([`dfa::Dfa::trim`]) the automaton.
//! * [`enumerate`] lazily walks a trimmed DFA and yields accepted strings ("plans")
//!   in deterministic order.
//! * [`driver`] ties the pipeline together behind a small, cached [`driver::Compiled`]
//!   value and dispatches plans to a host-supplied action callback.
//!
//! ## Cyclic automata
//!
//! `*` introduces cycles. Without `allow_infinite`, [`enumerate::Enumerator`] treats
//! a revisit of a state already on its current path as a dead end for that path only,
//! yielding the finite set of accepting simple-path strings; with `allow_infinite` it
//! may run forever, which is fine for a pull iterator that a caller only partially
//! drains. See `DESIGN.md` for the full resolution of this design choice.

pub mod dfa;
pub mod driver;
pub mod enumerate;
pub mod error;
pub mod nfa;
pub mod pfa;
pub mod pre;
