use super::{Nfa, NfaState, STATE_CEILING};
use crate::error::CompileError;
use crate::pre::Expr;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

struct Ctx {
    symbol_index: HashMap<Rc<str>, usize>,
    alphabet_len: usize,
}

pub(super) fn lower(expr: &Expr) -> Result<Nfa, CompileError> {
    let alphabet = collect_alphabet(expr);
    let symbol_index = alphabet
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, s)| (s, i))
        .collect();
    let ctx = Ctx {
        symbol_index,
        alphabet_len: alphabet.len(),
    };
    let (mut states, entry, exit) = fragment(expr, &ctx)?;
    states[exit].accepting = true;
    Ok(Nfa {
        alphabet: Rc::from(alphabet.into_boxed_slice()),
        states,
        initial_state: entry,
    })
}

fn collect_alphabet(expr: &Expr) -> Vec<Rc<str>> {
    fn walk(e: &Expr, set: &mut BTreeSet<Rc<str>>) {
        match e {
            Expr::Sym(s) => {
                set.insert(s.clone());
            }
            Expr::Empty => {}
            Expr::Concat(l, r) | Expr::Union(l, r) | Expr::Shuffle(l, r) => {
                walk(l, set);
                walk(r, set);
            }
            Expr::Star(e) => walk(e, set),
        }
    }
    let mut set = BTreeSet::new();
    walk(expr, &mut set);
    set.into_iter().collect()
}

fn check_ceiling(len: usize) -> Result<(), CompileError> {
    if len > STATE_CEILING {
        Err(CompileError::TooLarge(len))
    } else {
        Ok(())
    }
}

fn fresh(states: &mut Vec<NfaState>, ctx: &Ctx) -> Result<usize, CompileError> {
    states.push(NfaState {
        accepting: false,
        epsilon_transitions: Vec::new(),
        transitions: vec![Vec::new(); ctx.alphabet_len],
    });
    check_ceiling(states.len())?;
    Ok(states.len() - 1)
}

/// Shifts every transition target in `states` by `offset`, for splicing a
/// freshly built fragment into a larger, already-populated state vector.
fn shift(mut states: Vec<NfaState>, offset: usize) -> Vec<NfaState> {
    for s in &mut states {
        for t in &mut s.epsilon_transitions {
            *t += offset;
        }
        for group in &mut s.transitions {
            for t in group {
                *t += offset;
            }
        }
    }
    states
}

type Fragment = (Vec<NfaState>, usize, usize);

fn fragment(expr: &Expr, ctx: &Ctx) -> Result<Fragment, CompileError> {
    match expr {
        Expr::Sym(s) => {
            let mut states = Vec::new();
            let a = fresh(&mut states, ctx)?;
            let b = fresh(&mut states, ctx)?;
            let idx = ctx.symbol_index[s];
            states[a].transitions[idx].push(b);
            Ok((states, a, b))
        }
        Expr::Empty => {
            let mut states = Vec::new();
            let a = fresh(&mut states, ctx)?;
            Ok((states, a, a))
        }
        Expr::Concat(l, r) => {
            let (ls, le, lx) = fragment(l, ctx)?;
            let (rs, re, rx) = fragment(r, ctx)?;
            let offset = ls.len();
            let mut states = ls;
            states.extend(shift(rs, offset));
            states[lx].epsilon_transitions.push(re + offset);
            Ok((states, le, rx + offset))
        }
        Expr::Union(l, r) => {
            let (ls, le, lx) = fragment(l, ctx)?;
            let (rs, re, rx) = fragment(r, ctx)?;
            let offset = ls.len();
            let mut states = ls;
            states.extend(shift(rs, offset));
            let a = fresh(&mut states, ctx)?;
            let b = fresh(&mut states, ctx)?;
            states[a].epsilon_transitions.push(le);
            states[a].epsilon_transitions.push(re + offset);
            states[lx].epsilon_transitions.push(b);
            states[rx + offset].epsilon_transitions.push(b);
            Ok((states, a, b))
        }
        Expr::Star(e) => {
            let (es, ee, ex) = fragment(e, ctx)?;
            let mut states = es;
            let a = fresh(&mut states, ctx)?;
            states[a].epsilon_transitions.push(ee);
            states[ex].epsilon_transitions.push(a);
            Ok((states, a, a))
        }
        Expr::Shuffle(l, r) => shuffle_product(l, r, ctx),
    }
}

/// Builds the shuffle of two arms as a product NFA, restricted to the pairs
/// of states actually reachable from `(entry_l, entry_r)`. For every
/// transition `(p, a, q)` of one arm and every state `s` of the other, adds
/// `((p, s), a, (q, s))` (symmetrically for the other arm, and for ε as well
/// as ordinary symbols), so each arm advances independently while the other
/// stands still, which is exactly the interleaving a shuffle permits.
fn shuffle_product(l: &Expr, r: &Expr, ctx: &Ctx) -> Result<Fragment, CompileError> {
    let (ls, le, lx) = fragment(l, ctx)?;
    let (rs, re, rx) = fragment(r, ctx)?;

    let mut states: Vec<NfaState> = Vec::new();
    let mut index_of: HashMap<(usize, usize), usize> = HashMap::new();
    let mut stack = vec![(le, re)];
    index_of.insert((le, re), fresh(&mut states, ctx)?);

    while let Some((pl, pr)) = stack.pop() {
        let cur = index_of[&(pl, pr)];
        for a in 0..ctx.alphabet_len {
            for ql in ls[pl].transitions[a].clone() {
                let tgt = product_state(ql, pr, &mut states, &mut index_of, &mut stack, ctx)?;
                states[cur].transitions[a].push(tgt);
            }
            for qr in rs[pr].transitions[a].clone() {
                let tgt = product_state(pl, qr, &mut states, &mut index_of, &mut stack, ctx)?;
                states[cur].transitions[a].push(tgt);
            }
        }
        for ql in ls[pl].epsilon_transitions.clone() {
            let tgt = product_state(ql, pr, &mut states, &mut index_of, &mut stack, ctx)?;
            states[cur].epsilon_transitions.push(tgt);
        }
        for qr in rs[pr].epsilon_transitions.clone() {
            let tgt = product_state(pl, qr, &mut states, &mut index_of, &mut stack, ctx)?;
            states[cur].epsilon_transitions.push(tgt);
        }
    }

    let entry = index_of[&(le, re)];
    let exit = index_of[&(lx, rx)];
    Ok((states, entry, exit))
}

#[allow(clippy::too_many_arguments)]
fn product_state(
    pl: usize,
    pr: usize,
    states: &mut Vec<NfaState>,
    index_of: &mut HashMap<(usize, usize), usize>,
    stack: &mut Vec<(usize, usize)>,
    ctx: &Ctx,
) -> Result<usize, CompileError> {
    if let Some(&idx) = index_of.get(&(pl, pr)) {
        return Ok(idx);
    }
    let idx = fresh(states, ctx)?;
    index_of.insert((pl, pr), idx);
    stack.push((pl, pr));
    Ok(idx)
}
