//! FIRST sets over the assembled tables. Only the arcs of each rule's
//! initial state are examined, so rules that may produce empty do not pass
//! their successors' terminals through; the `EMPTY` accept arc stands in
//! for them instead.

use crate::grammar::{DfaId, Grammar};
use crate::label::{LabelId, LabelKind};
use super::bitset::BitSet;

enum Slot {
  NotStarted,
  InProgress,
  Done(BitSet),
}

struct Calculator<'g> {
  grammar: &'g Grammar,
  slots: Vec<Slot>,
  /// rules below which left recursion was found
  left_recursive: Vec<DfaId>,
}

impl<'g> Calculator<'g> {
  fn new(grammar: &'g Grammar) -> Self {
    let slots = grammar.dfas.iter()
      .map(|dfa| match &dfa.first {
        Some(first) => Slot::Done(first.clone()),
        None => Slot::NotStarted,
      })
      .collect();
    Calculator {
      grammar,
      slots,
      left_recursive: vec![],
    }
  }

  fn calc(&mut self, id: DfaId) {
    let grammar = self.grammar;
    let dfa = grammar.dfa(id);
    log::debug!("calculate FIRST set for '{}'", dfa.name);

    match self.slots[id.index()] {
      Slot::InProgress => {
        log::warn!("left recursion for '{}'", dfa.name);
        return;
      }
      Slot::Done(_) => {
        log::warn!("re-calculating FIRST set for '{}'", dfa.name);
      }
      Slot::NotStarted => {}
    }
    self.slots[id.index()] = Slot::InProgress;

    let labels = &grammar.labels;
    let mut result = BitSet::new(labels.len());
    let mut seen: Vec<LabelId> = vec![];
    for arc in &dfa.states[dfa.initial].arcs {
      if seen.contains(&arc.label) {
        continue;
      }
      seen.push(arc.label);

      let other = match labels.get(arc.label).kind {
        LabelKind::Nonterminal(other) => other,
        _ => {
          result.insert(arc.label.index());
          continue;
        }
      };
      if matches!(self.slots[other.index()], Slot::InProgress) {
        log::warn!("left recursion below '{}'", dfa.name);
        self.left_recursive.push(id);
        continue;
      }
      if matches!(self.slots[other.index()], Slot::NotStarted) {
        self.calc(other);
      }
      if let Slot::Done(first) = &self.slots[other.index()] {
        result.union_with(first);
      }
    }

    if log::log_enabled!(log::Level::Debug) {
      let names = result.iter()
        .map(|bit| labels.get(LabelId(bit as u32)).to_string())
        .collect::<Vec<_>>();
      log::debug!("FIRST set for '{}': {{ {} }}", dfa.name, names.join(" "));
    }
    self.slots[id.index()] = Slot::Done(result);
  }

  fn finish(self) -> (Vec<Slot>, Vec<DfaId>) {
    (self.slots, self.left_recursive)
  }
}

fn store(
  grammar: &mut Grammar,
  slots: Vec<Slot>,
) {
  for (dfa, slot) in grammar.dfas.iter_mut().zip(slots) {
    if let Slot::Done(first) = slot {
      dfa.first = Some(first);
    }
  }
}

/// Computes every missing FIRST set. Returns the rules below which left
/// recursion was detected; their sets may be incomplete.
pub fn add_first_sets(grammar: &mut Grammar) -> Vec<DfaId> {
  log::info!("adding FIRST sets");
  let mut calc = Calculator::new(grammar);
  for i in 0..grammar.dfas.len() {
    if matches!(calc.slots[i], Slot::NotStarted) {
      calc.calc(DfaId(i as u32));
    }
  }
  let (slots, left_recursive) = calc.finish();
  store(grammar, slots);
  left_recursive
}

/// Computes the FIRST set of one rule, and of any rule it depends on that
/// has none yet.
pub fn calc_first_set(
  grammar: &mut Grammar,
  id: DfaId,
) -> Vec<DfaId> {
  let mut calc = Calculator::new(grammar);
  calc.calc(id);
  let (slots, left_recursive) = calc.finish();
  store(grammar, slots);
  left_recursive
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::compile_str;
  use pretty_assertions::assert_eq;

  fn first(grammar: &Grammar, rule: &str) -> Vec<String> {
    let id = grammar.find_dfa(rule).unwrap();
    grammar.first_set(id).unwrap()
      .iter()
      .map(|bit| grammar.labels.get(LabelId(bit as u32)).to_string())
      .collect()
  }

  fn cleared(src: &str) -> Grammar {
    let mut grammar = compile_str(src).unwrap();
    for dfa in grammar.dfas.iter_mut() {
      dfa.first = None;
    }
    grammar
  }

  #[test]
  fn alternatives() {
    let grammar = compile_str("a: 'x' | 'y' b\nb: 'z'\n").unwrap();

    assert_eq!(first(&grammar, "a"), vec!["'x'", "'y'"]);
    assert_eq!(first(&grammar, "b"), vec!["'z'"]);
  }

  #[test]
  fn through_nonterminal() {
    let grammar = compile_str("a: 'x' | b 'y'\nb: 'z'\n").unwrap();

    assert_eq!(first(&grammar, "a"), vec!["'x'", "'z'"]);
  }

  #[test]
  fn depends_on_later_rule() {
    let grammar = compile_str("a: b\nb: c | 'w'\nc: 'v' 'u'\n").unwrap();

    assert_eq!(first(&grammar, "a"), vec!["'w'", "'v'"]);
    assert_eq!(first(&grammar, "c"), vec!["'v'"]);
  }

  #[test]
  fn token_names_are_terminals() {
    let grammar = compile_str("a: NAME '=' NUMBER\n").unwrap();

    assert_eq!(first(&grammar, "a"), vec!["NAME"]);
  }

  #[test]
  fn direct_left_recursion() {
    let mut grammar = cleared("a: a 'x' | 'y'\n");

    let left = add_first_sets(&mut grammar);

    assert_eq!(left, vec![DfaId(0)]);
    assert_eq!(first(&grammar, "a"), vec!["'y'"]);
  }

  #[test]
  fn indirect_left_recursion() {
    let mut grammar = cleared("a: b 'x' | 'y'\nb: a 'z' | 'w'\n");

    let left = add_first_sets(&mut grammar);

    assert_eq!(left, vec![DfaId(1)]);
    // b sees a while a is still in progress
    assert_eq!(first(&grammar, "b"), vec!["'w'"]);
    assert_eq!(first(&grammar, "a"), vec!["'y'", "'w'"]);
  }

  #[test]
  fn empty_rule_includes_accept_label() {
    let grammar = compile_str("a: ['x']\n").unwrap();

    assert_eq!(first(&grammar, "a"), vec!["EMPTY", "'x'"]);
  }

  #[test]
  fn recalculation_matches() {
    let mut grammar = compile_str("a: b | 'y'\nb: 'z'\n").unwrap();
    let before = grammar.clone();

    let left = calc_first_set(&mut grammar, DfaId(0));

    assert!(left.is_empty());
    assert_eq!(grammar, before);
  }

  #[test]
  fn single_rule_pulls_dependencies() {
    let mut grammar = cleared("a: b | 'y'\nb: 'z'\nc: 'q'\n");

    calc_first_set(&mut grammar, DfaId(0));

    assert!(grammar.first_set(DfaId(1)).is_some());
    assert!(grammar.first_set(DfaId(2)).is_none());
    assert_eq!(first(&grammar, "a"), vec!["'y'", "'z'"]);
  }
}
