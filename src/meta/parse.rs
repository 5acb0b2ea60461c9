use crate::error::{Error, Result};
use super::{Node, NodeKind};

struct Token {
  kind: NodeKind,
  text: Option<String>,
  line: usize,
  column: usize,
}

struct Lexer<'a> {
  chars: std::iter::Peekable<std::str::Chars<'a>>,
  line: usize,
  column: usize,
  /// Brackets still open; newlines inside them are insignificant.
  depth: usize,
}

impl<'a> Lexer<'a> {
  fn new(input: &'a str) -> Self {
    Lexer {
      chars: input.chars().peekable(),
      line: 1,
      column: 1,
      depth: 0,
    }
  }

  fn bump(&mut self) -> Option<char> {
    let c = self.chars.next()?;
    if c == '\n' {
      self.line += 1;
      self.column = 1;
    } else {
      self.column += 1;
    }
    Some(c)
  }

  fn error<T>(&self, message: impl Into<String>) -> Result<T> {
    Err(Error::Syntax {
      line: self.line,
      column: self.column,
      message: message.into(),
    })
  }

  fn tokenize(mut self) -> Result<Vec<Token>> {
    let mut tokens: Vec<Token> = vec![];

    loop {
      let (line, column) = (self.line, self.column);
      let c = match self.chars.peek() {
        Some(&c) => c,
        None => break,
      };

      let kind = match c {
        ' ' | '\t' | '\r' => {
          self.bump();
          continue;
        }
        '#' => {
          while let Some(&c) = self.chars.peek() {
            if c == '\n' {
              break;
            }
            self.bump();
          }
          continue;
        }
        '\n' => {
          self.bump();
          // blank lines and bracketed continuations produce nothing
          let after_rule = tokens.last()
            .map_or(false, |t| t.kind != NodeKind::Newline);
          if self.depth > 0 || !after_rule {
            continue;
          }
          NodeKind::Newline
        }
        '\'' | '"' => {
          self.bump();
          let mut text = String::new();
          loop {
            match self.bump() {
              Some(q) if q == c => break,
              Some('\n') | None => return self.error("unterminated string"),
              Some(ch) => text.push(ch),
            }
          }
          tokens.push(Token {
            kind: NodeKind::String,
            text: Some(text),
            line,
            column,
          });
          continue;
        }
        c if c.is_ascii_alphabetic() || c == '_' => {
          let mut text = String::new();
          while let Some(&c) = self.chars.peek() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
              break;
            }
            text.push(c);
            self.bump();
          }
          tokens.push(Token {
            kind: NodeKind::Name,
            text: Some(text),
            line,
            column,
          });
          continue;
        }
        _ => {
          let kind = match c {
            ':' => NodeKind::Colon,
            '|' => NodeKind::VBar,
            '[' => NodeKind::LSqb,
            ']' => NodeKind::RSqb,
            '(' => NodeKind::LPar,
            ')' => NodeKind::RPar,
            '*' => NodeKind::Star,
            '+' => NodeKind::Plus,
            c => return self.error(format!("unexpected character {:?}", c)),
          };
          match kind {
            NodeKind::LSqb | NodeKind::LPar => self.depth += 1,
            NodeKind::RSqb | NodeKind::RPar => {
              self.depth = self.depth.saturating_sub(1)
            }
            _ => {}
          }
          self.bump();
          kind
        }
      };

      tokens.push(Token {
        kind,
        text: None,
        line,
        column,
      });
    }

    if tokens.last().map_or(false, |t| t.kind != NodeKind::Newline) {
      tokens.push(Token {
        kind: NodeKind::Newline,
        text: None,
        line: self.line,
        column: self.column,
      });
    }
    tokens.push(Token {
      kind: NodeKind::EndMarker,
      text: None,
      line: self.line,
      column: self.column,
    });
    Ok(tokens)
  }
}

struct Reader {
  tokens: std::iter::Peekable<std::vec::IntoIter<Token>>,
}

impl Reader {
  fn peek(&mut self) -> NodeKind {
    self.tokens.peek().map_or(NodeKind::EndMarker, |t| t.kind)
  }

  fn expect(&mut self, kind: NodeKind) -> Result<Node> {
    match self.tokens.next() {
      Some(t) if t.kind == kind => Ok(Node {
        kind,
        text: t.text,
        children: vec![],
      }),
      Some(t) => Err(Error::Syntax {
        line: t.line,
        column: t.column,
        message: format!("expected {:?}, found {:?}", kind, t.kind),
      }),
      None => Err(Error::Syntax {
        line: 0,
        column: 0,
        message: format!("expected {:?}, found end of input", kind),
      }),
    }
  }

  fn grammar(&mut self) -> Result<Node> {
    let mut children = vec![];
    loop {
      match self.peek() {
        NodeKind::EndMarker => break,
        NodeKind::Newline => children.push(self.expect(NodeKind::Newline)?),
        _ => children.push(self.rule()?),
      }
    }
    children.push(self.expect(NodeKind::EndMarker)?);
    Ok(Node::branch(NodeKind::Grammar, children))
  }

  fn rule(&mut self) -> Result<Node> {
    let name = self.expect(NodeKind::Name)?;
    let colon = self.expect(NodeKind::Colon)?;
    let rhs = self.rhs()?;
    let newline = self.expect(NodeKind::Newline)?;
    Ok(Node::branch(NodeKind::Rule, vec![name, colon, rhs, newline]))
  }

  fn rhs(&mut self) -> Result<Node> {
    let mut children = vec![self.alt()?];
    while self.peek() == NodeKind::VBar {
      children.push(self.expect(NodeKind::VBar)?);
      children.push(self.alt()?);
    }
    Ok(Node::branch(NodeKind::Rhs, children))
  }

  fn alt(&mut self) -> Result<Node> {
    let mut children = vec![self.item()?];
    while matches!(self.peek(),
      NodeKind::LSqb | NodeKind::LPar | NodeKind::Name | NodeKind::String)
    {
      children.push(self.item()?);
    }
    Ok(Node::branch(NodeKind::Alt, children))
  }

  fn item(&mut self) -> Result<Node> {
    if self.peek() == NodeKind::LSqb {
      let open = self.expect(NodeKind::LSqb)?;
      let rhs = self.rhs()?;
      let close = self.expect(NodeKind::RSqb)?;
      return Ok(Node::branch(NodeKind::Item, vec![open, rhs, close]));
    }

    let mut children = vec![self.atom()?];
    match self.peek() {
      NodeKind::Star => children.push(self.expect(NodeKind::Star)?),
      NodeKind::Plus => children.push(self.expect(NodeKind::Plus)?),
      _ => {}
    }
    Ok(Node::branch(NodeKind::Item, children))
  }

  fn atom(&mut self) -> Result<Node> {
    let children = match self.peek() {
      NodeKind::LPar => {
        let open = self.expect(NodeKind::LPar)?;
        let rhs = self.rhs()?;
        let close = self.expect(NodeKind::RPar)?;
        vec![open, rhs, close]
      }
      NodeKind::String => vec![self.expect(NodeKind::String)?],
      _ => vec![self.expect(NodeKind::Name)?],
    };
    Ok(Node::branch(NodeKind::Atom, children))
  }
}

/// Reads grammar text into a tree of the shape described in [`crate::meta`].
pub fn parse(input: &str) -> Result<Node> {
  let tokens = Lexer::new(input).tokenize()?;
  Reader {
    tokens: tokens.into_iter().peekable(),
  }.grammar()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::meta::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn matches_builders() {
    let parsed = parse("a: 'x' | [b] c* (d e)+\n").unwrap();

    let built = grammar(vec![rule("a", rhs(vec![
      alt(vec![item(string("x"))]),
      alt(vec![
        optional(rhs(vec![alt(vec![item(name("b"))])])),
        star(name("c")),
        plus(group(rhs(vec![alt(vec![item(name("d")), item(name("e"))])]))),
      ]),
    ]))]);

    assert_eq!(parsed, built);
  }

  #[test]
  fn blank_lines_and_comments() {
    let tree = parse("# header\n\na: 'x'  # trailing\n\n\nb: a\n").unwrap();

    let kinds = tree.children.iter().map(|n| n.kind).collect::<Vec<_>>();
    assert_eq!(kinds, vec![NodeKind::Rule, NodeKind::Rule, NodeKind::EndMarker]);
  }

  #[test]
  fn continuation_inside_brackets() {
    let tree = parse("a: ('x'\n   | 'y')\n").unwrap();

    assert_eq!(tree.children.len(), 2);
  }

  #[test]
  fn missing_final_newline() {
    let tree = parse("a: \"x\"").unwrap();

    assert_eq!(tree.children[0].children[3].kind, NodeKind::Newline);
  }

  #[test]
  fn reports_position() {
    match parse("a: 'x'\nb 'y'\n") {
      Err(Error::Syntax { line, column, .. }) => {
        assert_eq!((line, column), (2, 3));
      }
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn unterminated_string() {
    assert!(matches!(parse("a: 'x\n"), Err(Error::Syntax { .. })));
  }
}
