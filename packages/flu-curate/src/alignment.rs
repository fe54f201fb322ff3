use crate::error::CurationError;

/// A profile-plus-query multiple alignment.
///
/// By contract (see `io::fasta`), the last row is the query and every row
/// before it is a profile member. All rows share the same column count `L`.
#[derive(Debug, Clone)]
pub struct Alignment {
  rows: Vec<Vec<u8>>,
}

impl Alignment {
  /// Builds an alignment from FASTA-order rows (profile members first, query last).
  ///
  /// Fails with `AlignmentShapeError` if there are fewer than two rows or rows
  /// of unequal length.
  pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self, CurationError> {
    if rows.len() < 2 {
      return Err(CurationError::AlignmentShapeError(format!(
        "alignment has {} row(s), need at least 2 (one profile member, one query)",
        rows.len()
      )));
    }
    let len = rows[0].len();
    if rows.iter().any(|row| row.len() != len) {
      return Err(CurationError::AlignmentShapeError(
        "alignment rows have unequal length".to_owned(),
      ));
    }
    Ok(Self { rows })
  }

  #[inline]
  pub fn len_cols(&self) -> usize {
    self.rows[0].len()
  }

  #[inline]
  pub fn num_rows(&self) -> usize {
    self.rows.len()
  }

  /// The last row: the query, unconditionally.
  #[inline]
  pub fn query_row(&self) -> &[u8] {
    &self.rows[self.rows.len() - 1]
  }

  /// Every row except the last: the profile members.
  #[inline]
  pub fn profile_rows(&self) -> &[Vec<u8>] {
    &self.rows[..self.rows.len() - 1]
  }

  pub fn rows(&self) -> &[Vec<u8>] {
    &self.rows
  }
}
