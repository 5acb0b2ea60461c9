//! Grammar description to parsing tables.
//!
//! Each rule is treated as a regular expression of its own: it becomes an
//! NFA, then a DFA by subset construction, which is then shrunk by merging
//! equivalent states and emitted as a table. Once every rule is compiled,
//! rule-name labels are resolved and FIRST sets are added.

use indexmap::IndexMap;
use crate::error::{self, Error, Result};
use crate::grammar::{Dfa, DfaId, Grammar};
use crate::label::LabelList;
use crate::meta::{Node, NodeKind};

pub mod bitset;
pub mod first;
mod nfa;
mod subset;
mod simplify;
mod convert;

use nfa::req;

/// Compiles rules one at a time. A rule that fails leaves no DFA behind,
/// so the caller may skip it and go on.
pub struct Compiler {
  labels: LabelList,
  dfas: Vec<Dfa>,
  names: IndexMap<String, DfaId>,
}

impl Compiler {
  pub fn new() -> Self {
    Compiler {
      labels: LabelList::new(),
      dfas: vec![],
      names: IndexMap::new(),
    }
  }

  pub fn compile_rule(&mut self, node: &Node) -> Result<DfaId> {
    let nfa = nfa::compile_rule(&mut self.labels, node)?;
    if log::log_enabled!(log::Level::Debug) {
      log::debug!("dump of NFA for '{}' ...\n{}",
        nfa.name, nfa.dump(&self.labels));
    }

    log::info!("making DFA for '{}' ...", nfa.name);
    let mut subsets = subset::make_subsets(&nfa)?;
    if log::log_enabled!(log::Level::Trace) {
      log::trace!("{}", subset::dump(&subsets, &self.labels, "before minimizing"));
    }
    simplify::simplify(&mut subsets);
    if log::log_enabled!(log::Level::Trace) {
      log::trace!("{}", subset::dump(&subsets, &self.labels, "after minimizing"));
    }

    let dfa = convert::convert(&nfa, &subsets)?;
    let id = DfaId(self.dfas.len() as u32);
    error::push(&mut self.dfas, dfa, "dfa list")?;
    if self.names.contains_key(&nfa.name) {
      log::warn!("duplicate rule '{}', references go to the first", nfa.name);
    } else {
      self.names.insert(nfa.name, id);
    }
    Ok(id)
  }

  /// Resolves rule-name labels and computes FIRST sets. The first rule
  /// compiled is the start symbol.
  pub fn finish(self) -> Result<Grammar> {
    if self.dfas.is_empty() {
      return Err(Error::NoRules);
    }

    let mut grammar = Grammar {
      start: DfaId(0),
      dfas: self.dfas,
      labels: self.labels,
    };
    grammar.labels.translate(&self.names);
    first::add_first_sets(&mut grammar);
    Ok(grammar)
  }
}

impl Default for Compiler {
  fn default() -> Self {
    Self::new()
  }
}

/// Compiles a whole `grammar` tree, stopping at the first malformed rule.
pub fn compile(tree: &Node) -> Result<Grammar> {
  log::info!("compiling parse tree into NFA grammar");
  req(tree, NodeKind::Grammar)?;
  let (end, rules) = match tree.children.split_last() {
    Some(split) => split,
    None => {
      return Err(Error::MissingChild {
        kind: NodeKind::Grammar,
        needed: 1,
        found: 0,
      });
    }
  };
  req(end, NodeKind::EndMarker)?;

  let mut compiler = Compiler::new();
  for rule in rules.iter().filter(|n| n.kind != NodeKind::Newline) {
    compiler.compile_rule(rule)?;
  }
  compiler.finish()
}
