use std::fmt::{self, Display, Formatter};
use serde::{Deserialize, Serialize};
use crate::label::{LabelId, LabelList};
use crate::pgen::bitset::BitSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DfaId(pub u32);

impl DfaId {
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc {
  pub label: LabelId,
  pub target: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
  pub arcs: Vec<Arc>,
}

/// Parsing table of one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dfa {
  pub name: String,
  /// The label naming this rule.
  pub label: LabelId,
  pub initial: usize,
  pub states: Vec<State>,
  pub first: Option<BitSet>,
}

impl Dfa {
  /// Accepting states carry an `EMPTY` self-loop.
  pub fn is_accepting(&self, state: usize) -> bool {
    self.states[state].arcs.iter()
      .any(|arc| arc.label == LabelId::EMPTY && arc.target == state)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grammar {
  pub start: DfaId,
  pub dfas: Vec<Dfa>,
  pub labels: LabelList,
}

impl Grammar {
  pub fn dfa(&self, id: DfaId) -> &Dfa {
    &self.dfas[id.index()]
  }

  pub fn find_dfa(&self, name: &str) -> Option<DfaId> {
    self.dfas.iter()
      .position(|d| d.name == name)
      .map(|i| DfaId(i as u32))
  }

  pub fn first_set(&self, id: DfaId) -> Option<&BitSet> {
    self.dfa(id).first.as_ref()
  }
}

impl Display for Grammar {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    for dfa in &self.dfas {
      writeln!(f, "dfa {} ({} states)", dfa.name, dfa.states.len())?;
      for (i, state) in dfa.states.iter().enumerate() {
        write!(f, "  {}{}:", if i == dfa.initial { '*' } else { ' ' }, i)?;
        for arc in &state.arcs {
          write!(f, " {} -> {};", self.labels.get(arc.label), arc.target)?;
        }
        writeln!(f)?;
      }
      if let Some(first) = &dfa.first {
        write!(f, "  first:")?;
        for bit in first.iter() {
          write!(f, " {}", self.labels.get(LabelId(bit as u32)))?;
        }
        writeln!(f)?;
      }
    }
    Ok(())
  }
}
