use std::collections::TryReserveError;
use thiserror::Error;
use crate::meta::NodeKind;

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed grammar tree: expected {expected:?}, found {found:?}")]
  Malformed {
    expected: NodeKind,
    found: NodeKind,
  },
  #[error("malformed grammar tree: {kind:?} needs {needed} children, has {found}")]
  MissingChild {
    kind: NodeKind,
    needed: usize,
    found: usize,
  },
  #[error("out of memory growing {what}")]
  OutOfMemory {
    what: &'static str,
    #[source]
    source: TryReserveError,
  },
  #[error("{line}:{column}: {message}")]
  Syntax {
    line: usize,
    column: usize,
    message: String,
  },
  #[error("grammar has no rules")]
  NoRules,
  #[error(transparent)]
  Io(#[from] std::io::Error),
  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Appends `value` and returns its index, reporting allocation failure
/// instead of aborting.
pub(crate) fn push<T>(
  vec: &mut Vec<T>,
  value: T,
  what: &'static str,
) -> Result<usize> {
  vec.try_reserve(1)
    .map_err(|source| Error::OutOfMemory { what, source })?;
  vec.push(value);
  Ok(vec.len() - 1)
}
