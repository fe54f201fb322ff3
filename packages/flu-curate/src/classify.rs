use crate::error::CurationError;

/// Result of the external homology classifier (C2).
///
/// The original returns either a row of identifiers or a sentinel string;
/// here that becomes a tagged variant so callers never match on strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
  Known { profile_id: String, strain_id: String, identity: f64 },
  Unknown,
}

/// Parses a tab-separated `accession profile_id strain_id identity` table
/// into the `(accession, profile_id, strain_id, identity)` rows `TableClassifier` expects.
pub fn load_classification_table(content: &str) -> Result<Vec<(String, String, String, f64)>, CurationError> {
  let mut rows = Vec::new();
  for line in content.lines() {
    let line = line.trim();
    if line.is_empty() {
      continue;
    }
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 4 {
      continue;
    }
    let identity: f64 = fields[3]
      .parse()
      .map_err(|_| CurationError::ReferenceMissing(format!("bad identity value in classification table: {}", fields[3])))?;
    rows.push((fields[0].to_owned(), fields[1].to_owned(), fields[2].to_owned(), identity));
  }
  Ok(rows)
}

/// A classifier backed by a precomputed table, grounded on the CDC
/// mutations-of-interest lookup idiom: in production this would wrap a BLAST-
/// or k-mer-based search, but the table-driven shape is the same either way.
pub struct TableClassifier {
  entries: Vec<(String, String, String, f64)>,
}

impl TableClassifier {
  pub fn new(entries: Vec<(String, String, String, f64)>) -> Self {
    Self { entries }
  }

  /// Looks up a query by accession against a precomputed `(accession,
  /// profile_id, strain_id, identity)` table. Real homology search is out of
  /// scope; this implementation exists for integration tests and tooling that
  /// already has classification results in hand.
  pub fn classify_by_accession(&self, accession: &str) -> Classification {
    self
      .entries
      .iter()
      .find(|(acc, ..)| acc == accession)
      .map(|(_, profile_id, strain_id, identity)| Classification::Known {
        profile_id: profile_id.clone(),
        strain_id: strain_id.clone(),
        identity: *identity,
      })
      .unwrap_or(Classification::Unknown)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn known_accession_resolves() {
    let classifier = TableClassifier::new(vec![("ACC1".to_owned(), "H3N2_HA".to_owned(), "Human_HA_H3".to_owned(), 0.97)]);
    assert_eq!(
      classifier.classify_by_accession("ACC1"),
      Classification::Known { profile_id: "H3N2_HA".to_owned(), strain_id: "Human_HA_H3".to_owned(), identity: 0.97 }
    );
  }

  #[test]
  fn unknown_accession_yields_unknown() {
    let classifier = TableClassifier::new(vec![]);
    assert_eq!(classifier.classify_by_accession("ACC1"), Classification::Unknown);
  }
}
