use crate::error::CurationError;
use crate::region::ProfileBoundaries;
use std::collections::HashMap;

/// Parses a `|`-delimited boundary file and selects the first line whose
/// `strain_id` field matches, per §4.1.
///
/// Each line is `strain_id|START=n|CTS5=n|ATG=n|STOP=n|CTS3=n|END=n`; token
/// order after `strain_id` is irrelevant, all six are required.
pub fn load_boundaries(content: &str, strain_id: &str) -> Result<ProfileBoundaries, CurationError> {
  for line in content.lines() {
    let line = line.trim();
    if line.is_empty() {
      continue;
    }
    let mut fields = line.split('|');
    let Some(id) = fields.next() else { continue };
    if id != strain_id {
      continue;
    }

    let mut values: HashMap<&str, usize> = HashMap::new();
    for field in fields {
      if let Some((key, value)) = field.split_once('=') {
        if let Ok(n) = value.trim().parse::<usize>() {
          values.insert(key.trim(), n);
        }
      }
    }

    let get = |key: &str| -> Result<usize, CurationError> {
      values
        .get(key)
        .copied()
        .ok_or_else(|| CurationError::ReferenceMissing(format!("boundary row for '{strain_id}' missing field {key}")))
    };

    return ProfileBoundaries::new(get("START")?, get("CTS5")?, get("ATG")?, get("STOP")?, get("CTS3")?, get("END")?);
  }

  Err(CurationError::StrainNotFound(strain_id.to_owned()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  const SAMPLE: &str = "\
Human_HA_H3|START=1|CTS5=20|ATG=25|STOP=1000|CTS3=1010|END=1030
Human_HA_H1|END=900|START=1|CTS5=15|ATG=20|STOP=870|CTS3=880
";

  #[test]
  fn finds_matching_strain_regardless_of_field_order() {
    let boundaries = load_boundaries(SAMPLE, "Human_HA_H1").unwrap();
    assert_eq!(boundaries.atg, 20);
    assert_eq!(boundaries.end, 900);
  }

  #[test]
  fn missing_strain_is_an_error() {
    let err = load_boundaries(SAMPLE, "Unknown_Strain").unwrap_err();
    assert!(matches!(err, CurationError::StrainNotFound(_)));
  }
}
