use derive_more::Display;

/// A column index into the profile+query multiple alignment (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display("{_0}")]
pub struct AlnCol(pub usize);

/// A canonical, 1-based position in the profile's own (gap-free) coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display("{_0}")]
pub struct ProfilePos(pub usize);

/// A canonical, 1-based position in the query's own (gap-free) coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display("{_0}")]
pub struct QueryPos(pub usize);

impl AlnCol {
  #[inline]
  pub fn as_usize(self) -> usize {
    self.0
  }
}

impl ProfilePos {
  #[inline]
  pub fn as_usize(self) -> usize {
    self.0
  }
}

impl QueryPos {
  #[inline]
  pub fn as_usize(self) -> usize {
    self.0
  }
}

impl From<usize> for AlnCol {
  fn from(value: usize) -> Self {
    Self(value)
  }
}
