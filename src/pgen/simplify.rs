//! Merges subset states that are equivalent to an earlier one.
//!
//! This is not a minimal-DFA algorithm. Arcs are compared position by
//! position in the order subset construction discovered them, so two
//! equivalent states whose arcs were found in a different order are kept
//! apart. For an example of sub-optimal output, try `S: x a b+ | y a b+`.

use super::subset::SubsetState;

fn same_state(
  s1: &SubsetState,
  s2: &SubsetState,
) -> bool {
  s1.finish == s2.finish && s1.arcs == s2.arcs
}

fn rename_states(
  states: &mut [SubsetState],
  from: usize,
  to: usize,
) {
  log::debug!("rename state {} to {}", from, to);
  for state in states.iter_mut().filter(|s| !s.deleted) {
    for arc in state.arcs.iter_mut() {
      if arc.target == from {
        arc.target = to;
      }
    }
  }
}

/// Repeats passes until nothing merges. Returns the number of states
/// deleted.
pub(crate) fn simplify(states: &mut [SubsetState]) -> usize {
  let mut total = 0;
  for pass in 1.. {
    let mut changes = 0;
    for i in 1..states.len() {
      if states[i].deleted {
        continue;
      }
      let same = (0..i)
        .find(|&j| !states[j].deleted && same_state(&states[i], &states[j]));
      if let Some(j) = same {
        states[i].deleted = true;
        rename_states(states, i, j);
        changes += 1;
      }
    }
    log::info!("simplify pass {}: {} states merged", pass, changes);
    total += changes;
    if changes == 0 {
      break;
    }
  }
  total
}
