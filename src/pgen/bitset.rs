use std::fmt::{self, Debug, Formatter};
use serde::{Deserialize, Serialize};

type Block = u64;

const BLOCK_BITS: usize = Block::BITS as usize;

/// Fixed-width bit vector. Two sets are only ever compared when they
/// were created with the same width.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitSet {
  blocks: Vec<Block>,
}

impl BitSet {
  pub fn new(num_bits: usize) -> Self {
    BitSet {
      blocks: vec![0; (num_bits + BLOCK_BITS - 1) / BLOCK_BITS],
    }
  }

  pub fn from_bit(num_bits: usize, bit: usize) -> Self {
    let mut set = Self::new(num_bits);
    set.insert(bit);
    set
  }

  pub fn clear(&mut self) {
    self.blocks.fill(0);
  }

  /// Sets `bit`. Returns whether it was previously unset.
  pub fn insert(&mut self, bit: usize) -> bool {
    let block = &mut self.blocks[bit / BLOCK_BITS];
    let mask: Block = 1 << (bit % BLOCK_BITS);
    let absent = *block & mask == 0;
    *block |= mask;
    absent
  }

  /// Returns whether any bit was added.
  pub fn union_with(&mut self, other: &BitSet) -> bool {
    let mut added = false;
    for (mine, &theirs) in self.blocks.iter_mut().zip(&other.blocks) {
      added |= theirs & !*mine != 0;
      *mine |= theirs;
    }
    added
  }

  pub fn iter(&self) -> Iter {
    Iter {
      blocks: &self.blocks,
      base: 0,
      current: self.blocks.first().copied().unwrap_or(0),
    }
  }

  pub fn contains(&self, bit: usize) -> bool {
    match self.blocks.get(bit / BLOCK_BITS) {
      Some(&block) => block & (1 << (bit % BLOCK_BITS)) != 0,
      None => false,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.blocks.iter().all(|&block| block == 0)
  }
}

/// Set bits in ascending order.
pub struct Iter<'a> {
  blocks: &'a [Block],
  /// first bit of the block in `current`
  base: usize,
  /// bits of the current block not yet yielded
  current: Block,
}

impl<'a> Iterator for Iter<'a> {
  type Item = usize;

  fn next(&mut self) -> Option<usize> {
    loop {
      if self.current != 0 {
        let offset = self.current.trailing_zeros() as usize;
        self.current &= self.current - 1;
        return Some(self.base + offset);
      }
      self.base += BLOCK_BITS;
      self.current = *self.blocks.get(self.base / BLOCK_BITS)?;
    }
  }
}

impl Debug for BitSet {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.debug_set().entries(self.iter()).finish()
  }
}
