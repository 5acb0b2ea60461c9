use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use crate::error::{self, Result};
use crate::grammar::DfaId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelId(pub u32);

impl LabelId {
  /// The epsilon / accept label.
  pub const EMPTY: LabelId = LabelId(0);

  pub fn index(self) -> usize {
    self.0 as usize
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelKind {
  EndMarker,
  /// An identifier. Either a token category or, until labels are
  /// translated, a reference to a rule.
  Name,
  /// A quoted literal.
  String,
  Nonterminal(DfaId),
}

impl LabelKind {
  pub fn is_terminal(self) -> bool {
    !matches!(self, LabelKind::Nonterminal(_))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
  pub kind: LabelKind,
  pub text: Option<String>,
}

impl Display for Label {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match (self.kind, &self.text) {
      (LabelKind::String, Some(text)) => write!(f, "'{}'", text),
      (_, Some(text)) => f.write_str(text),
      (LabelKind::Nonterminal(id), None) => write!(f, "<{}>", id.0),
      (_, None) => f.write_str("?"),
    }
  }
}

type LabelKey = (LabelKind, Option<String>);

/// Deduplicated label table shared by every DFA of a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Label>", into = "Vec<Label>")]
pub struct LabelList {
  labels: Vec<Label>,
  index: HashMap<LabelKey, LabelId>,
}

impl LabelList {
  pub fn new() -> Self {
    let mut list = LabelList {
      labels: vec![],
      index: HashMap::new(),
    };
    list.labels.push(Label {
      kind: LabelKind::EndMarker,
      text: Some("EMPTY".to_owned()),
    });
    list.index.insert((LabelKind::EndMarker, Some("EMPTY".to_owned())),
      LabelId::EMPTY);
    list
  }

  /// Returns the index of `(kind, text)`, registering it on first use.
  pub fn add(
    &mut self,
    kind: LabelKind,
    text: Option<&str>,
  ) -> Result<LabelId> {
    let key = (kind, text.map(str::to_owned));
    if let Some(&id) = self.index.get(&key) {
      return Ok(id);
    }

    let id = LabelId(self.labels.len() as u32);
    error::push(&mut self.labels, Label {
      kind,
      text: key.1.clone(),
    }, "label list")?;
    self.index.insert(key, id);
    Ok(id)
  }

  pub fn find(
    &self,
    kind: LabelKind,
    text: Option<&str>,
  ) -> Option<LabelId> {
    self.index.get(&(kind, text.map(str::to_owned))).copied()
  }

  pub fn get(&self, id: LabelId) -> &Label {
    &self.labels[id.index()]
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (LabelId, &Label)> {
    self.labels.iter()
      .enumerate()
      .map(|(i, label)| (LabelId(i as u32), label))
  }

  /// Turns every `Name` label that spells a rule name into a reference to
  /// that rule. Indices are unchanged.
  pub(crate) fn translate(
    &mut self,
    rules: &IndexMap<String, DfaId>,
  ) {
    for (i, label) in self.labels.iter_mut().enumerate() {
      if label.kind != LabelKind::Name {
        continue;
      }
      let dfa = match label.text.as_deref().and_then(|text| rules.get(text)) {
        Some(&dfa) => dfa,
        None => continue,
      };

      let id = LabelId(i as u32);
      self.index.remove(&(label.kind, label.text.clone()));
      label.kind = LabelKind::Nonterminal(dfa);
      self.index.insert((label.kind, label.text.clone()), id);
      log::trace!("label {} is nonterminal {}", i, dfa.0);
    }
  }
}

impl Default for LabelList {
  fn default() -> Self {
    Self::new()
  }
}

impl From<Vec<Label>> for LabelList {
  fn from(labels: Vec<Label>) -> Self {
    let index = labels.iter()
      .enumerate()
      .map(|(i, label)| ((label.kind, label.text.clone()), LabelId(i as u32)))
      .collect();
    LabelList {
      labels,
      index,
    }
  }
}

impl From<LabelList> for Vec<Label> {
  fn from(list: LabelList) -> Self {
    list.labels
  }
}
