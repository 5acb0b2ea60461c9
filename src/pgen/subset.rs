use std::collections::HashMap;
use std::fmt::Write;
use crate::error::{self, Result};
use crate::label::{LabelId, LabelList};
use super::bitset::BitSet;
use super::nfa::Nfa;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SubsetArc {
  pub(crate) label: LabelId,
  pub(crate) target: usize,
}

/// A DFA state under construction: the set of NFA states it stands for.
#[derive(Debug, Clone)]
pub(crate) struct SubsetState {
  pub(crate) members: BitSet,
  pub(crate) arcs: Vec<SubsetArc>,
  pub(crate) finish: bool,
  pub(crate) deleted: bool,
}

impl SubsetState {
  fn new(members: BitSet, nfa: &Nfa) -> Self {
    let finish = members.contains(nfa.finish);
    SubsetState {
      members,
      arcs: vec![],
      finish,
      deleted: false,
    }
  }
}

/// Adds `state` and everything reachable from it through epsilon arcs.
pub(crate) fn add_closure(
  set: &mut BitSet,
  nfa: &Nfa,
  state: usize,
) {
  let mut stack = vec![state];
  while let Some(state) = stack.pop() {
    if !set.insert(state) {
      continue;
    }
    for arc in &nfa.states[state].arcs {
      if arc.label == LabelId::EMPTY {
        stack.push(arc.target);
      }
    }
  }
}

/// Subset construction. The first state is the closure of the NFA's
/// start state.
pub(crate) fn make_subsets(nfa: &Nfa) -> Result<Vec<SubsetState>> {
  let nbits = nfa.states.len();
  let mut start = BitSet::new(nbits);
  add_closure(&mut start, nfa, nfa.start);

  let mut states = vec![];
  let mut lookup = HashMap::new();
  lookup.insert(start.clone(), 0);
  error::push(&mut states, SubsetState::new(start, nfa), "subset states")?;
  if states[0].finish {
    log::warn!("nonterminal '{}' may produce empty", nfa.name);
  }

  let mut istate = 0;
  while istate < states.len() {
    // label -> destination set, in discovery order
    let mut pending: Vec<(LabelId, BitSet)> = vec![];
    for ibit in states[istate].members.iter() {
      for arc in &nfa.states[ibit].arcs {
        if arc.label == LabelId::EMPTY {
          continue;
        }
        let slot = match pending.iter().position(|(l, _)| *l == arc.label) {
          Some(slot) => slot,
          None => {
            error::push(&mut pending, (arc.label, BitSet::new(nbits)),
              "subset arcs")?
          }
        };
        add_closure(&mut pending[slot].1, nfa, arc.target);
      }
    }

    for (label, members) in pending {
      let target = match lookup.get(&members) {
        Some(&target) => target,
        None => {
          let target = error::push(&mut states,
            SubsetState::new(members.clone(), nfa), "subset states")?;
          lookup.insert(members, target);
          target
        }
      };
      error::push(&mut states[istate].arcs, SubsetArc {
        label,
        target,
      }, "subset arcs")?;
    }
    istate += 1;
  }

  Ok(states)
}

pub(crate) fn dump(
  states: &[SubsetState],
  labels: &LabelList,
  msg: &str,
) -> String {
  let mut s = format!("Subset DFA {}\n", msg);
  for (i, state) in states.iter().enumerate() {
    if state.deleted {
      continue;
    }
    let _ = write!(s, " Subset {}", i);
    if state.finish {
      s.push_str(" (finish)");
    }
    let _ = writeln!(s, " {:?}", state.members);
    for arc in &state.arcs {
      let _ = writeln!(s, "  Arc to state {}, label {}",
        arc.target, labels.get(arc.label));
    }
  }
  s
}
