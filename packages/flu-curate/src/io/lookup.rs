use crate::error::CurationError;
use crate::flags::FlagKind;
use csv::ReaderBuilder;

#[derive(Debug, Clone, PartialEq, Eq)]
struct WhitelistEntry {
  flag_label: String,
  start: usize,
  end: usize,
}

/// Per-profile accepted-variant whitelist (§3 "Lookup (whitelist) table").
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
  entries: Vec<WhitelistEntry>,
}

impl Whitelist {
  /// `accept(flag_label, start, end)` per §4.6: true iff some row with the
  /// same label fully contains `[start,end]`.
  pub fn accept(&self, kind: FlagKind, start: usize, end: usize) -> bool {
    let label = kind.to_string();
    self.entries.iter().any(|e| e.flag_label == label && e.start <= start && e.end >= end)
  }
}

fn parse_range(range: &str) -> Option<(usize, usize)> {
  if let Some((lo, hi)) = range.split_once("..") {
    Some((lo.trim().parse().ok()?, hi.trim().parse().ok()?))
  } else {
    let n = range.trim().parse().ok()?;
    Some((n, n))
  }
}

/// Parses the tab-separated lookup table and selects all rows for `profile_id`.
/// An empty result is legal (no whitelist), per §4.1.
pub fn load_whitelist(content: &str, profile_id: &str) -> Result<Whitelist, CurationError> {
  let mut reader = ReaderBuilder::new().delimiter(b'\t').has_headers(false).flexible(true).from_reader(content.as_bytes());

  let mut entries = Vec::new();
  for result in reader.records() {
    let record = result.map_err(|err| CurationError::ReferenceMissing(format!("malformed lookup table row: {err}")))?;
    let Some(row_profile) = record.get(0) else { continue };
    if row_profile != profile_id {
      continue;
    }
    let Some(flag_label) = record.get(1) else { continue };
    let Some(range) = record.get(2) else { continue };
    let Some((start, end)) = parse_range(range) else { continue };
    if start > end {
      continue;
    }
    entries.push(WhitelistEntry { flag_label: flag_label.to_owned(), start, end });
  }

  Ok(Whitelist { entries })
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  const SAMPLE: &str = "H3N2_HA\tCDS-del\t100..102\tcurator note\nH3N2_HA\t5'NCR-del\t5\tanother note\nH1N1_HA\tCDS-del\t1..2\tnote\n";

  #[test]
  fn selects_rows_for_matching_profile_only() {
    let wl = load_whitelist(SAMPLE, "H3N2_HA").unwrap();
    assert!(wl.accept(FlagKind::CdsDel, 100, 102));
    assert!(wl.accept(FlagKind::Ncr5Del, 5, 5));
    assert!(!wl.accept(FlagKind::CdsDel, 1, 2));
  }

  #[test]
  fn single_position_range_has_equal_start_end() {
    let wl = load_whitelist(SAMPLE, "H3N2_HA").unwrap();
    assert!(wl.accept(FlagKind::Ncr5Del, 5, 5));
    assert!(!wl.accept(FlagKind::Ncr5Del, 4, 5));
  }

  #[test]
  fn unmatched_profile_yields_empty_whitelist() {
    let wl = load_whitelist(SAMPLE, "Nonexistent").unwrap();
    assert!(!wl.accept(FlagKind::CdsDel, 1, 2));
  }
}
