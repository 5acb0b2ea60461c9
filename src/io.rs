//! Compiled tables on disk, as JSON.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use crate::error::Result;
use crate::grammar::Grammar;

pub fn write_grammar_json<W: Write>(
  writer: W,
  grammar: &Grammar,
) -> Result<()> {
  let mut w = BufWriter::new(writer);
  serde_json::to_writer(&mut w, grammar)?;
  w.flush()?;
  Ok(())
}

pub fn save_grammar_json(
  path: &Path,
  grammar: &Grammar,
) -> Result<()> {
  let f = File::create(path)?;
  write_grammar_json(f, grammar)
}

/// The label lookup index is rebuilt while loading.
pub fn load_grammar_json_bytes(data: &[u8]) -> Result<Grammar> {
  Ok(serde_json::from_slice(data)?)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::compile_str;
  use crate::grammar::DfaId;
  use crate::label::LabelKind;
  use crate::error::Error;
  use pretty_assertions::assert_eq;

  #[test]
  fn reload_keeps_tables_and_lookups() {
    let grammar = compile_str("a: 'x' | b\nb: NAME\n").unwrap();
    let mut data = vec![];
    write_grammar_json(&mut data, &grammar).unwrap();

    let loaded = load_grammar_json_bytes(&data).unwrap();

    assert_eq!(loaded, grammar);
    assert_eq!(
      loaded.labels.find(LabelKind::Nonterminal(DfaId(1)), Some("b")),
      grammar.labels.find(LabelKind::Nonterminal(DfaId(1)), Some("b")),
    );
    assert!(loaded.labels.find(LabelKind::Name, Some("NAME")).is_some());
  }

  #[test]
  fn rejects_garbage() {
    assert!(matches!(load_grammar_json_bytes(b"{\"start\": 0"), Err(Error::Json(_))));
  }
}
