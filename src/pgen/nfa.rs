use std::fmt::Write;
use crate::error::{self, Error, Result};
use crate::label::{LabelId, LabelKind, LabelList};
use crate::meta::{Node, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NfaArc {
  pub(crate) label: LabelId,
  pub(crate) target: usize,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct NfaState {
  pub(crate) arcs: Vec<NfaArc>,
}

#[derive(Debug, Clone)]
pub(crate) struct Nfa {
  pub(crate) name: String,
  pub(crate) label: LabelId,
  pub(crate) states: Vec<NfaState>,
  pub(crate) start: usize,
  pub(crate) finish: usize,
}

impl Nfa {
  pub(crate) fn new(
    name: impl Into<String>,
    label: LabelId,
  ) -> Self {
    Nfa {
      name: name.into(),
      label,
      states: vec![],
      start: 0,
      finish: 0,
    }
  }

  pub(crate) fn add_state(&mut self) -> Result<usize> {
    error::push(&mut self.states, NfaState::default(), "nfa states")
  }

  pub(crate) fn add_arc(
    &mut self,
    from: usize,
    to: usize,
    label: LabelId,
  ) -> Result<()> {
    error::push(&mut self.states[from].arcs, NfaArc {
      label,
      target: to,
    }, "nfa arcs")?;
    Ok(())
  }

  pub(crate) fn dump(&self, labels: &LabelList) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "NFA '{}' has {} states; start {}, finish {}",
      self.name, self.states.len(), self.start, self.finish);
    for (i, state) in self.states.iter().enumerate() {
      let _ = write!(s, "{}{:2}{}",
        if i == self.start { '*' } else { ' ' },
        i,
        if i == self.finish { '.' } else { ' ' });
      for (j, arc) in state.arcs.iter().enumerate() {
        if j > 0 {
          s.push_str("\n    ");
        }
        let _ = write!(s, "-> {:2}  {}", arc.target, labels.get(arc.label));
      }
      s.push('\n');
    }
    s
  }
}

pub(super) fn req(
  node: &Node,
  kind: NodeKind,
) -> Result<()> {
  if node.kind == kind {
    Ok(())
  } else {
    Err(Error::Malformed {
      expected: kind,
      found: node.kind,
    })
  }
}

fn req_children(
  node: &Node,
  needed: usize,
) -> Result<()> {
  if node.children.len() >= needed {
    Ok(())
  } else {
    Err(Error::MissingChild {
      kind: node.kind,
      needed,
      found: node.children.len(),
    })
  }
}

/// Translates `NAME ':' rhs NEWLINE` into an NFA, registering the rule's
/// name and every leaf token in `labels`.
pub(crate) fn compile_rule(
  labels: &mut LabelList,
  node: &Node,
) -> Result<Nfa> {
  req(node, NodeKind::Rule)?;
  req_children(node, 4)?;
  let name = &node.children[0];
  req(name, NodeKind::Name)?;
  req(&node.children[1], NodeKind::Colon)?;
  req(&node.children[3], NodeKind::Newline)?;

  let label = labels.add(LabelKind::Name, Some(name.text()))?;
  let mut builder = Builder {
    labels,
    nfa: Nfa::new(name.text(), label),
  };
  let (start, finish) = builder.rhs(&node.children[2])?;
  builder.nfa.start = start;
  builder.nfa.finish = finish;
  Ok(builder.nfa)
}

/// Each method returns the `(start, finish)` states of the fragment it
/// compiled.
pub(crate) struct Builder<'a> {
  pub(crate) labels: &'a mut LabelList,
  pub(crate) nfa: Nfa,
}

impl<'a> Builder<'a> {
  pub(crate) fn rhs(&mut self, node: &Node) -> Result<(usize, usize)> {
    req(node, NodeKind::Rhs)?;
    req_children(node, 1)?;
    let (a, b) = self.alt(&node.children[0])?;
    if node.children.len() == 1 {
      return Ok((a, b));
    }

    let start = self.nfa.add_state()?;
    let finish = self.nfa.add_state()?;
    self.nfa.add_arc(start, a, LabelId::EMPTY)?;
    self.nfa.add_arc(b, finish, LabelId::EMPTY)?;
    let mut children = node.children[1..].iter();
    while let Some(bar) = children.next() {
      req(bar, NodeKind::VBar)?;
      let alt = children.next().ok_or(Error::MissingChild {
        kind: NodeKind::Rhs,
        needed: node.children.len() + 1,
        found: node.children.len(),
      })?;
      let (a, b) = self.alt(alt)?;
      self.nfa.add_arc(start, a, LabelId::EMPTY)?;
      self.nfa.add_arc(b, finish, LabelId::EMPTY)?;
    }
    Ok((start, finish))
  }

  fn alt(&mut self, node: &Node) -> Result<(usize, usize)> {
    req(node, NodeKind::Alt)?;
    req_children(node, 1)?;
    let (start, mut finish) = self.item(&node.children[0])?;
    for item in &node.children[1..] {
      let (a, b) = self.item(item)?;
      self.nfa.add_arc(finish, a, LabelId::EMPTY)?;
      finish = b;
    }
    Ok((start, finish))
  }

  pub(crate) fn item(&mut self, node: &Node) -> Result<(usize, usize)> {
    req(node, NodeKind::Item)?;
    req_children(node, 1)?;
    let first = &node.children[0];

    if first.kind == NodeKind::LSqb {
      req_children(node, 3)?;
      req(&node.children[2], NodeKind::RSqb)?;
      let start = self.nfa.add_state()?;
      let finish = self.nfa.add_state()?;
      self.nfa.add_arc(start, finish, LabelId::EMPTY)?;
      let (a, b) = self.rhs(&node.children[1])?;
      self.nfa.add_arc(start, a, LabelId::EMPTY)?;
      self.nfa.add_arc(b, finish, LabelId::EMPTY)?;
      return Ok((start, finish));
    }

    let (start, finish) = self.atom(first)?;
    let suffix = match node.children.get(1) {
      Some(suffix) => suffix.kind,
      None => return Ok((start, finish)),
    };
    if suffix != NodeKind::Star && suffix != NodeKind::Plus {
      return Err(Error::Malformed {
        expected: NodeKind::Plus,
        found: suffix,
      });
    }
    self.nfa.add_arc(finish, start, LabelId::EMPTY)?;
    if suffix == NodeKind::Star {
      Ok((start, start))
    } else {
      Ok((start, finish))
    }
  }

  fn atom(&mut self, node: &Node) -> Result<(usize, usize)> {
    req(node, NodeKind::Atom)?;
    req_children(node, 1)?;
    let first = &node.children[0];

    let kind = match first.kind {
      NodeKind::LPar => {
        req_children(node, 3)?;
        req(&node.children[2], NodeKind::RPar)?;
        return self.rhs(&node.children[1]);
      }
      NodeKind::Name => LabelKind::Name,
      NodeKind::String => LabelKind::String,
      found => {
        return Err(Error::Malformed {
          expected: NodeKind::Name,
          found,
        });
      }
    };

    let start = self.nfa.add_state()?;
    let finish = self.nfa.add_state()?;
    let label = self.labels.add(kind, Some(first.text()))?;
    self.nfa.add_arc(start, finish, label)?;
    Ok((start, finish))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::meta::*;
  use crate::pgen::bitset::BitSet;
  use crate::pgen::subset::add_closure;
  use pretty_assertions::assert_eq;

  fn compile_item(node: &Node) -> (Nfa, (usize, usize)) {
    let mut labels = LabelList::new();
    let mut builder = Builder {
      labels: &mut labels,
      nfa: Nfa::new("a", LabelId::EMPTY),
    };
    let ends = builder.item(node).unwrap();
    (builder.nfa, ends)
  }

  fn single(items: Vec<Node>) -> Node {
    rule("a", rhs(vec![alt(items)]))
  }

  #[test]
  fn leaf_is_two_states() {
    let mut labels = LabelList::new();
    let nfa = compile_rule(&mut labels, &single(vec![item(string("x"))]))
      .unwrap();

    assert_eq!(nfa.states.len(), 2);
    assert_eq!((nfa.start, nfa.finish), (0, 1));
    let x = labels.find(LabelKind::String, Some("x")).unwrap();
    assert_eq!(nfa.states[0].arcs, vec![NfaArc { label: x, target: 1 }]);
    assert_eq!(nfa.label, labels.find(LabelKind::Name, Some("a")).unwrap());
  }

  #[test]
  fn star_shares_start_and_finish() {
    let (nfa, (start, finish)) = compile_item(&star(string("x")));

    assert_eq!(start, finish);
    assert!(nfa.states[1].arcs.contains(&NfaArc {
      label: LabelId::EMPTY,
      target: start,
    }));
  }

  #[test]
  fn plus_loops_back() {
    let (nfa, (start, finish)) = compile_item(&plus(string("x")));

    assert_ne!(start, finish);
    assert!(nfa.states[finish].arcs.contains(&NfaArc {
      label: LabelId::EMPTY,
      target: start,
    }));
  }

  #[test]
  fn optional_closure_reaches_finish() {
    let (nfa, (start, finish)) = compile_item(
      &optional(rhs(vec![alt(vec![item(string("x"))])])));

    let mut set = BitSet::new(nfa.states.len());
    add_closure(&mut set, &nfa, start);

    assert!(set.contains(finish));
  }

  #[test]
  fn alternatives_share_ends() {
    let mut labels = LabelList::new();
    let nfa = compile_rule(&mut labels, &rule("a", rhs(vec![
      alt(vec![item(string("x"))]),
      alt(vec![item(string("y"))]),
      alt(vec![item(string("z"))]),
    ]))).unwrap();

    assert_eq!(nfa.states.len(), 8);
    let targets = nfa.states[nfa.start].arcs.iter()
      .map(|arc| (arc.label, arc.target))
      .collect::<Vec<_>>();
    assert_eq!(targets, vec![
      (LabelId::EMPTY, 0),
      (LabelId::EMPTY, 4),
      (LabelId::EMPTY, 6),
    ]);
    for b in [1, 5, 7] {
      assert_eq!(nfa.states[b].arcs, vec![NfaArc {
        label: LabelId::EMPTY,
        target: nfa.finish,
      }]);
    }
  }

  #[test]
  fn concatenation_chains_items() {
    let mut labels = LabelList::new();
    let nfa = compile_rule(&mut labels,
      &single(vec![item(string("x")), item(name("y"))])).unwrap();

    assert_eq!((nfa.start, nfa.finish), (0, 3));
    assert_eq!(nfa.states[1].arcs, vec![NfaArc {
      label: LabelId::EMPTY,
      target: 2,
    }]);
  }

  #[test]
  fn group_passes_through() {
    let (nfa, ends) = compile_item(
      &item(group(rhs(vec![alt(vec![item(string("x"))])]))));

    assert_eq!(ends, (0, 1));
    assert_eq!(nfa.states.len(), 2);
  }

  #[test]
  fn wrong_node_kind() {
    let mut labels = LabelList::new();
    let tree = rule("a", alt(vec![item(string("x"))]));

    match compile_rule(&mut labels, &tree) {
      Err(Error::Malformed { expected, found }) => {
        assert_eq!((expected, found), (NodeKind::Rhs, NodeKind::Alt));
      }
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn too_few_children() {
    let mut labels = LabelList::new();
    let tree = Node::branch(NodeKind::Rule, vec![Node::leaf(NodeKind::Name)]);

    assert!(matches!(compile_rule(&mut labels, &tree),
      Err(Error::MissingChild { needed: 4, found: 1, .. })));
  }

  #[test]
  fn trailing_bar() {
    let mut labels = LabelList::new();
    let mut body = rhs(vec![alt(vec![item(string("x"))])]);
    body.children.push(Node::leaf(NodeKind::VBar));

    assert!(matches!(compile_rule(&mut labels, &rule("a", body)),
      Err(Error::MissingChild { kind: NodeKind::Rhs, .. })));
  }

  #[test]
  fn bad_suffix() {
    let mut node = item(string("x"));
    node.children.push(Node::leaf(NodeKind::Colon));
    let mut labels = LabelList::new();
    let mut builder = Builder {
      labels: &mut labels,
      nfa: Nfa::new("a", LabelId::EMPTY),
    };

    assert!(matches!(builder.item(&node),
      Err(Error::Malformed { found: NodeKind::Colon, .. })));
  }

  #[test]
  fn dump_marks_start_and_finish() {
    let mut labels = LabelList::new();
    let nfa = compile_rule(&mut labels, &single(vec![item(string("x"))]))
      .unwrap();

    assert_eq!(nfa.dump(&labels),
      "NFA 'a' has 2 states; start 0, finish 1\n* 0 ->  1  'x'\n  1.\n");
  }
}
