//! The driver: compiles a PRE once, caches its derived automata behind an
//! [`Rc`] so they can be shared read-only (per the concurrency model's
//! shared-resource policy), and feeds enumerated plans to a host-supplied
//! action dispatcher.
//!
//! The driver never interprets a symbol itself; it only routes `(namespace,
//! symbol, scope)` triples to whatever [`Dispatch`] implementation the host
//! provides, threading the returned scope forward.

use crate::dfa::Dfa;
use crate::enumerate::{Enumerator, Plan};
use crate::error::{CompileError, DispatchError, ParseError, RunError};
use crate::nfa;
use crate::pre::{self, Expr};
use std::rc::Rc;

/// Configuration recognized by [`Compiled::compile`] and mutable afterwards
/// through [`Compiled::set_options`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Apply Hopcroft minimization before trimming.
    pub minimize: bool,
    /// Discard any cached DFA and enumerator; the next access rebuilds from
    /// the expression tree. Consumed (reset back to `false`) the moment it is
    /// observed, exactly like a one-shot command rather than a sticky flag.
    pub reset: bool,
    /// Suppress the cyclic-DFA warning; enumeration semantics remain
    /// unspecified for a cyclic automaton regardless of this flag.
    pub allow_infinite: bool,
    /// Prefix passed verbatim to the dispatcher; the core never inspects it.
    pub namespace: String,
    /// Emit state-count diagnostics (via the `log` facade) on each build.
    pub verbose: bool,
}

impl Default for Options {
    /// Every toggle defaults to its least surprising, least invasive setting:
    /// no minimization (the design notes' wording for this default is
    /// ambiguous; see `DESIGN.md` for the resolution), no forced reset, the
    /// infinite-language warning active, an empty namespace, and no verbose
    /// diagnostics.
    fn default() -> Options {
        Options {
            minimize: false,
            reset: false,
            allow_infinite: false,
            namespace: String::new(),
            verbose: false,
        }
    }
}

/// A host-supplied action dispatcher: given a namespace, a symbol name and
/// the current scope, produces the next scope or an error that aborts the
/// in-progress plan.
///
/// Implemented generically for any `FnMut(&str, &str, S) -> Result<S, E>`
/// closure, so a host can hand the driver a plain closure around a
/// `HashMap<String, fn(S) -> S>` lookup (as the design notes suggest) without
/// the driver knowing anything about the registry's shape.
pub trait Dispatch<S> {
    type Error: std::error::Error + 'static;

    fn dispatch(&mut self, namespace: &str, name: &str, scope: S) -> Result<S, Self::Error>;
}

impl<S, F, E> Dispatch<S> for F
where
    F: FnMut(&str, &str, S) -> Result<S, E>,
    E: std::error::Error + 'static,
{
    type Error = E;

    fn dispatch(&mut self, namespace: &str, name: &str, scope: S) -> Result<S, E> {
        (self)(namespace, name, scope)
    }
}

/// A compiled parallel regular expression, with its derived automata cached
/// behind the current [`Options`].
///
/// The expression tree is built once, at [`Compiled::compile`] time, and
/// never changes; everything downstream of it (NFA, DFA, enumerator) is
/// derived lazily and cached until an option change invalidates it.
pub struct Compiled {
    expr: Expr,
    options: Options,
    /// The `(minimize, allow_infinite)` pair the cached DFA was built under,
    /// so a later option change can be detected without a full rebuild check.
    built_with: Option<(bool, bool)>,
    dfa: Option<Rc<Dfa>>,
    enumerator: Option<Enumerator>,
}

impl Compiled {
    /// Parses `pre` and returns a `Compiled` with nothing yet built; the
    /// first call to [`Compiled::dfa`] or [`Compiled::next_plan`] runs the
    /// rest of the pipeline.
    pub fn compile(pre: &str, options: Options) -> Result<Compiled, ParseError<'_>> {
        let expr = pre::parse(pre)?;
        Ok(Compiled {
            expr,
            options,
            built_with: None,
            dfa: None,
            enumerator: None,
        })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Replaces the options wholesale. A change to `minimize` or
    /// `allow_infinite` (or an explicit `options.reset`) invalidates the
    /// cached DFA and enumerator on the next access; see [`Compiled::dfa`].
    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }

    /// Builds, or returns the already-cached, trimmed DFA for the current
    /// options.
    ///
    /// Per the design notes' resolution of the cache-invalidation open
    /// question: any change in `minimize` or `allow_infinite` since the DFA
    /// was last built, or an explicit `options.reset`, is treated exactly
    /// like calling [`Compiled::reset`] first. `reset` is then cleared, since
    /// it is a one-shot command rather than a sticky setting.
    pub fn dfa(&mut self) -> Result<Rc<Dfa>, CompileError> {
        let wants = (self.options.minimize, self.options.allow_infinite);
        if self.options.reset || self.built_with != Some(wants) {
            self.dfa = None;
            self.enumerator = None;
            self.options.reset = false;
        }

        if let Some(dfa) = &self.dfa {
            return Ok(dfa.clone());
        }

        let nfa = nfa::lower(&self.expr)?;
        let dfa = nfa.to_dfa();
        let dfa = if self.options.minimize { dfa.minimize() } else { dfa };
        let dfa = dfa.trim();

        if self.options.verbose {
            log::debug!("weave: compiled DFA with {} states", dfa.states().len());
        }
        if dfa.has_cycle() && !self.options.allow_infinite {
            log::warn!(
                "weave: compiled DFA is cyclic; enumeration order and termination are \
                 unspecified without `allow_infinite`"
            );
        }

        let dfa = Rc::new(dfa);
        self.dfa = Some(dfa.clone());
        self.built_with = Some(wants);
        Ok(dfa)
    }

    /// Discards the cached enumerator so the next [`Compiled::next_plan`]
    /// restarts from the beginning. Does not discard the cached DFA itself;
    /// that invalidation is tied to option changes, per [`Compiled::dfa`].
    pub fn reset(&mut self) {
        self.enumerator = None;
    }

    /// Advances the enumerator, initializing it on the first call (or the
    /// first call since [`Compiled::reset`]). Returns `None` once the
    /// language has been fully enumerated (or immediately, for an empty
    /// language), which is never an error, per the design notes' treatment of
    /// `EmptyLanguage`.
    pub fn next_plan(&mut self) -> Result<Option<Plan>, CompileError> {
        if self.enumerator.is_none() {
            let dfa = self.dfa()?;
            let allow_infinite = self.options.allow_infinite;
            self.enumerator = Some(Enumerator::new(dfa, allow_infinite));
        }
        Ok(self.enumerator.as_mut().and_then(Iterator::next))
    }

    /// Consumes one plan from the current enumerator (initializing it if
    /// needed) and dispatches each of its symbols in order, threading `scope`
    /// through. If the enumerator has nothing left to give (including the
    /// empty-language case), `scope` is returned unchanged. Stops on, and
    /// surfaces, the first error the dispatcher raises.
    pub fn run_once<S, D: Dispatch<S>>(&mut self, scope: S, dispatch: &mut D) -> Result<S, RunError<D::Error>> {
        match self.next_plan()? {
            Some(plan) => self.dispatch_plan(&plan, scope, dispatch),
            None => Ok(scope),
        }
    }

    /// Like [`Compiled::run_once`], but never comes back empty-handed unless
    /// the language is genuinely empty: if the enumerator is already
    /// exhausted, it is transparently reset and restarted from the top before
    /// giving up. This is the resolution this crate gives to a genuine
    /// ambiguity between `run_once` and `run_any` in the original design;
    /// see `DESIGN.md`.
    pub fn run_any<S, D: Dispatch<S>>(&mut self, scope: S, dispatch: &mut D) -> Result<S, RunError<D::Error>> {
        let plan = match self.next_plan()? {
            Some(plan) => plan,
            None => {
                self.reset();
                match self.next_plan()? {
                    Some(plan) => plan,
                    None => return Ok(scope),
                }
            }
        };
        self.dispatch_plan(&plan, scope, dispatch)
    }

    fn dispatch_plan<S, D: Dispatch<S>>(
        &self,
        plan: &Plan,
        scope: S,
        dispatch: &mut D,
    ) -> Result<S, RunError<D::Error>> {
        let mut scope = scope;
        for sym in plan.symbols() {
            scope = dispatch
                .dispatch(&self.options.namespace, sym, scope)
                .map_err(|source| DispatchError {
                    name: sym.to_string(),
                    source,
                })?;
        }
        Ok(scope)
    }
}
