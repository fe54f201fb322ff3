use crate::error::CurationError;
use regex::Regex;
use std::sync::OnceLock;

/// One FASTA record: defline (without the leading `>`) and raw sequence bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
  pub defline: String,
  pub seq: Vec<u8>,
}

/// Parses a FASTA string into records, preserving file order.
pub fn parse(content: &str) -> Vec<FastaRecord> {
  let mut records = Vec::new();
  let mut defline: Option<String> = None;
  let mut seq = Vec::new();

  for line in content.lines() {
    if let Some(rest) = line.strip_prefix('>') {
      if let Some(d) = defline.take() {
        records.push(FastaRecord { defline: d, seq: std::mem::take(&mut seq) });
      }
      defline = Some(rest.trim().to_owned());
    } else {
      seq.extend(line.trim().bytes());
    }
  }
  if let Some(d) = defline {
    records.push(FastaRecord { defline: d, seq });
  }
  records
}

/// Reads the first FASTA record from `content`, per §6 "first record used".
pub fn first_record(content: &str) -> Result<FastaRecord, CurationError> {
  parse(content)
    .into_iter()
    .next()
    .ok_or_else(|| CurationError::QueryReadError("FASTA contains no records".to_owned()))
}

fn token_splitter() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_-]+").unwrap())
}

/// Extracts the accession from a defline per §6: split the first token on
/// runs of non-alphanumerics (excluding `_` and `-`), take the first token
/// containing both letters and digits, else the second token.
pub fn extract_accession(defline: &str) -> Option<String> {
  let first_token = defline.split_whitespace().next()?;
  let parts: Vec<&str> = token_splitter().split(first_token).filter(|s| !s.is_empty()).collect();

  if let Some(hit) = parts
    .iter()
    .find(|p| p.chars().any(|c| c.is_ascii_alphabetic()) && p.chars().any(|c| c.is_ascii_digit()))
  {
    return Some((*hit).to_owned());
  }
  parts.get(1).map(|s| (*s).to_owned())
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn parses_multiple_records() {
    let content = ">seq1 desc\nACGT\nACGT\n>seq2\nTTTT\n";
    let records = parse(content);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].defline, "seq1 desc");
    assert_eq!(records[0].seq, b"ACGTACGT");
    assert_eq!(records[1].seq, b"TTTT");
  }

  #[test]
  fn first_record_errors_on_empty_input() {
    assert!(first_record("").is_err());
  }

  #[test]
  fn extracts_accession_from_alnum_token() {
    // `.` is a delimiter (it's not in the alphanumeric/`_`/`-` allowlist), so
    // the version suffix splits off from the accession's base token.
    assert_eq!(extract_accession("CY121680.1|Segment:4|A/..."), Some("CY121680".to_owned()));
  }

  #[test]
  fn falls_back_to_second_token_when_no_alnum_token() {
    // First token is purely alphabetic, no digits anywhere in it; split token 2 used instead.
    assert_eq!(extract_accession("gi|description|more"), Some("description".to_owned()));
  }
}
