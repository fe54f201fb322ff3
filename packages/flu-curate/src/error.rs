use std::fmt;

/// Errors that abort processing of a single query. Never fatal to the process:
/// the caller is expected to catch these per-query and move on to the next one.
#[derive(Debug)]
pub enum CurationError {
  /// The query FASTA could not be read, or contained no usable record.
  QueryReadError(String),
  /// A required reference file (boundary file, lookup table, profile directory) is missing.
  ReferenceMissing(String),
  /// No boundary row matches the classified strain.
  StrainNotFound(String),
  /// The external aligner exited non-zero or produced no output.
  AlignerFailure(String),
  /// Alignment rows have unequal length, or there are fewer than two rows.
  AlignmentShapeError(String),
}

impl fmt::Display for CurationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::QueryReadError(msg) => write!(f, "query read error: {msg}"),
      Self::ReferenceMissing(msg) => write!(f, "reference file missing: {msg}"),
      Self::StrainNotFound(msg) => write!(f, "strain not found: {msg}"),
      Self::AlignerFailure(msg) => write!(f, "aligner failure: {msg}"),
      Self::AlignmentShapeError(msg) => write!(f, "alignment shape error: {msg}"),
    }
  }
}

impl std::error::Error for CurationError {}
