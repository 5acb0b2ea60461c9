pub mod error;
pub mod grammar;
pub mod io;
pub mod label;
pub mod meta;
pub mod pgen;

pub use error::{Error, Result};
pub use grammar::{Arc, Dfa, DfaId, Grammar, State};
pub use label::{Label, LabelId, LabelKind, LabelList};
pub use pgen::bitset::BitSet;
pub use pgen::{compile, Compiler};

/// Reads a grammar description and compiles it into parsing tables.
pub fn compile_str(input: &str) -> Result<Grammar> {
  let tree = meta::parse(input)?;
  compile(&tree)
}
