//! The parse tree of a grammar description.
//!
//! ```text
//! grammar := (rule | NEWLINE)* ENDMARKER
//! rule    := NAME ':' rhs NEWLINE
//! rhs     := alt ('|' alt)*
//! alt     := item+
//! item    := '[' rhs ']' | atom ['*' | '+']
//! atom    := '(' rhs ')' | NAME | STRING
//! ```
//!
//! Trees normally come from [`parse`], but the builder functions below make
//! the same shapes by hand.

use serde::{Deserialize, Serialize};

mod parse;

pub use parse::parse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
  Grammar,
  Rule,
  Rhs,
  Alt,
  Item,
  Atom,
  Name,
  String,
  Colon,
  VBar,
  LSqb,
  RSqb,
  LPar,
  RPar,
  Star,
  Plus,
  Newline,
  EndMarker,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
  pub kind: NodeKind,
  /// Identifier or literal contents, for `Name` and `String` leaves.
  pub text: Option<String>,
  pub children: Vec<Node>,
}

impl Node {
  pub fn leaf(kind: NodeKind) -> Node {
    Node {
      kind,
      text: None,
      children: vec![],
    }
  }

  pub fn branch(kind: NodeKind, children: Vec<Node>) -> Node {
    Node {
      kind,
      text: None,
      children,
    }
  }

  fn token(kind: NodeKind, text: impl Into<String>) -> Node {
    Node {
      kind,
      text: Some(text.into()),
      children: vec![],
    }
  }

  pub fn text(&self) -> &str {
    self.text.as_deref().unwrap_or("")
  }
}

pub fn grammar(
  rules: Vec<Node>,
) -> Node {
  let mut children = rules;
  children.push(Node::leaf(NodeKind::EndMarker));
  Node::branch(NodeKind::Grammar, children)
}

pub fn rule(
  lhs: impl Into<String>,
  rhs: Node,
) -> Node {
  Node::branch(NodeKind::Rule, vec![
    Node::token(NodeKind::Name, lhs),
    Node::leaf(NodeKind::Colon),
    rhs,
    Node::leaf(NodeKind::Newline),
  ])
}

pub fn rhs(
  alts: Vec<Node>,
) -> Node {
  let mut children = Vec::with_capacity(alts.len() * 2);
  for (i, alt) in alts.into_iter().enumerate() {
    if i > 0 {
      children.push(Node::leaf(NodeKind::VBar));
    }
    children.push(alt);
  }
  Node::branch(NodeKind::Rhs, children)
}

pub fn alt(
  items: Vec<Node>,
) -> Node {
  Node::branch(NodeKind::Alt, items)
}

/// `[ rhs ]`
pub fn optional(
  rhs: Node,
) -> Node {
  Node::branch(NodeKind::Item, vec![
    Node::leaf(NodeKind::LSqb),
    rhs,
    Node::leaf(NodeKind::RSqb),
  ])
}

pub fn item(
  atom: Node,
) -> Node {
  Node::branch(NodeKind::Item, vec![atom])
}

pub fn star(
  atom: Node,
) -> Node {
  Node::branch(NodeKind::Item, vec![atom, Node::leaf(NodeKind::Star)])
}

pub fn plus(
  atom: Node,
) -> Node {
  Node::branch(NodeKind::Item, vec![atom, Node::leaf(NodeKind::Plus)])
}

/// `( rhs )`
pub fn group(
  rhs: Node,
) -> Node {
  Node::branch(NodeKind::Atom, vec![
    Node::leaf(NodeKind::LPar),
    rhs,
    Node::leaf(NodeKind::RPar),
  ])
}

pub fn name(
  name: impl Into<String>,
) -> Node {
  Node::branch(NodeKind::Atom, vec![Node::token(NodeKind::Name, name)])
}

pub fn string(
  literal: impl Into<String>,
) -> Node {
  Node::branch(NodeKind::Atom, vec![Node::token(NodeKind::String, literal)])
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn rhs_separates_alts() {
    let tree = rhs(vec![
      alt(vec![item(string("x"))]),
      alt(vec![item(name("y"))]),
    ]);

    let kinds = tree.children.iter().map(|n| n.kind).collect::<Vec<_>>();
    assert_eq!(kinds, vec![NodeKind::Alt, NodeKind::VBar, NodeKind::Alt]);
  }

  #[test]
  fn grammar_ends_with_end_marker() {
    let tree = grammar(vec![rule("a", rhs(vec![alt(vec![item(name("b"))])]))]);

    assert_eq!(tree.children.last().map(|n| n.kind),
      Some(NodeKind::EndMarker));
    assert_eq!(tree.children[0].children[0].text(), "a");
  }
}
