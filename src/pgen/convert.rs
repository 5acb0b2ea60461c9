use crate::error::{self, Result};
use crate::grammar::{Arc, Dfa, State};
use crate::label::LabelId;
use super::nfa::Nfa;
use super::subset::SubsetState;

/// Renumbers the surviving subset states densely and emits them as the
/// rule's parsing table. Accepting states get an `EMPTY` self-loop.
pub(crate) fn convert(
  nfa: &Nfa,
  subsets: &[SubsetState],
) -> Result<Dfa> {
  let mut rename = vec![None; subsets.len()];
  let mut states: Vec<State> = vec![];
  for (i, subset) in subsets.iter().enumerate() {
    if !subset.deleted {
      rename[i] = Some(error::push(&mut states, State::default(), "dfa states")?);
    }
  }

  for (i, subset) in subsets.iter().enumerate() {
    let from = match rename[i] {
      Some(from) => from,
      None => continue,
    };
    for arc in &subset.arcs {
      let target = rename[arc.target]
        .expect("arcs are redirected away from deleted states");
      error::push(&mut states[from].arcs, Arc {
        label: arc.label,
        target,
      }, "dfa arcs")?;
    }
    if subset.finish {
      error::push(&mut states[from].arcs, Arc {
        label: LabelId::EMPTY,
        target: from,
      }, "dfa arcs")?;
    }
  }

  Ok(Dfa {
    name: nfa.name.clone(),
    label: nfa.label,
    initial: 0,
    states,
    first: None,
  })
}
