use crate::error::CurationError;
use crate::flags::{Flag, FlagKind};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::BTreeMap;

const HEADER: [&str; 11] = [
  "PROFILE_NAME",
  "STATUS_THIS_MONTH",
  "LAST_UPDATED",
  "FLU_SUBTYPE",
  "AUTO_ALIGNMENT_ISSUE",
  "POS_PROFILE",
  "MUTATION_SUM",
  "ACCESSION_TOTAL",
  "CURRENT_MONTH_INCREASE",
  "PAST_MONTH_INCREASE",
  "ACCESSION_LIST",
];

/// One row of the Table 6 ledger (§6). External bookkeeping, not on the hot
/// path of curation itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
  pub profile_name: String,
  pub status_this_month: String,
  pub last_updated: NaiveDate,
  pub flu_subtype: String,
  pub auto_alignment_issue: String,
  pub pos_profile: String,
  pub mutation_sum: BTreeMap<String, usize>,
  pub accession_total: usize,
  pub current_month_increase: usize,
  pub past_month_increase: usize,
  pub accession_list: Vec<String>,
}

fn encode_mutation_sum(map: &BTreeMap<String, usize>) -> String {
  map.iter().map(|(variant, count)| format!("{variant}={count}")).collect::<Vec<_>>().join(";")
}

fn decode_mutation_sum(field: &str) -> BTreeMap<String, usize> {
  field
    .split(';')
    .filter(|s| !s.is_empty())
    .filter_map(|pair| {
      let (variant, count) = pair.split_once('=')?;
      Some((variant.to_owned(), count.parse().ok()?))
    })
    .collect()
}

fn encode_accession_list(accessions: &[String]) -> String {
  accessions.join(",")
}

fn decode_accession_list(field: &str) -> Vec<String> {
  field.split(',').filter(|s| !s.is_empty()).map(str::to_owned).collect()
}

/// Parses the tab-separated ledger file, skipping the header row.
pub fn load_ledger(content: &str) -> Result<Vec<LedgerRow>, CurationError> {
  let mut reader = ReaderBuilder::new().delimiter(b'\t').has_headers(true).from_reader(content.as_bytes());

  let mut rows = Vec::new();
  for result in reader.records() {
    let r = result.map_err(|err| CurationError::ReferenceMissing(format!("malformed ledger row: {err}")))?;
    let get = |i: usize| r.get(i).unwrap_or_default();
    let last_updated = NaiveDate::parse_from_str(get(2), "%Y-%m-%d")
      .map_err(|err| CurationError::ReferenceMissing(format!("bad LAST_UPDATED in ledger: {err}")))?;
    rows.push(LedgerRow {
      profile_name: get(0).to_owned(),
      status_this_month: get(1).to_owned(),
      last_updated,
      flu_subtype: get(3).to_owned(),
      auto_alignment_issue: get(4).to_owned(),
      pos_profile: get(5).to_owned(),
      mutation_sum: decode_mutation_sum(get(6)),
      accession_total: get(7).parse().unwrap_or(0),
      current_month_increase: get(8).parse().unwrap_or(0),
      past_month_increase: get(9).parse().unwrap_or(0),
      accession_list: decode_accession_list(get(10)),
    });
  }
  Ok(rows)
}

pub fn write_ledger(rows: &[LedgerRow]) -> Result<String, CurationError> {
  let mut writer = WriterBuilder::new().delimiter(b'\t').has_headers(false).from_writer(Vec::new());
  writer
    .write_record(HEADER)
    .map_err(|err| CurationError::ReferenceMissing(format!("failed to write ledger header: {err}")))?;
  for row in rows {
    writer
      .write_record([
        row.profile_name.as_str(),
        row.status_this_month.as_str(),
        &row.last_updated.format("%Y-%m-%d").to_string(),
        row.flu_subtype.as_str(),
        row.auto_alignment_issue.as_str(),
        row.pos_profile.as_str(),
        &encode_mutation_sum(&row.mutation_sum),
        &row.accession_total.to_string(),
        &row.current_month_increase.to_string(),
        &row.past_month_increase.to_string(),
        &encode_accession_list(&row.accession_list),
      ])
      .map_err(|err| CurationError::ReferenceMissing(format!("failed to write ledger row: {err}")))?;
  }
  let bytes = writer.into_inner().map_err(|err| CurationError::ReferenceMissing(err.to_string()))?;
  String::from_utf8(bytes).map_err(|err| CurationError::ReferenceMissing(err.to_string()))
}

/// Step 1 of §6: rolls every row whose `LAST_UPDATED` precedes `today`'s
/// calendar month over into `Unchanged`, shifting this month's increase into
/// last month's.
pub fn rollover(rows: &mut [LedgerRow], today: NaiveDate) {
  for row in rows {
    if row.status_this_month != "Unchanged"
      && (row.last_updated.year(), row.last_updated.month()) != (today.year(), today.month())
      && row.last_updated < today
    {
      row.status_this_month = "Unchanged".to_owned();
      row.past_month_increase = row.current_month_increase;
      row.current_month_increase = 0;
    }
  }
}

use chrono::Datelike;

fn match_key_excludes_pos(kind: FlagKind) -> bool {
  matches!(kind, FlagKind::Ncr5Ext | FlagKind::Ncr3Ext)
}

fn row_matches(row: &LedgerRow, profile_name: &str, flu_subtype: &str, kind: FlagKind, pos_profile: &str) -> bool {
  row.profile_name == profile_name
    && row.flu_subtype == flu_subtype
    && row.auto_alignment_issue == kind.to_string()
    && (match_key_excludes_pos(kind) || row.pos_profile == pos_profile)
}

/// Steps 2-4 of §6: applies one query's flags against the ledger, matching,
/// incrementing, or appending rows as needed. `rollover` must be called
/// first by the caller (typically once per ledger-update invocation).
pub fn apply_flags(
  rows: &mut Vec<LedgerRow>,
  today: NaiveDate,
  profile_name: &str,
  flu_subtype: &str,
  accession: &str,
  flags: &[Flag],
) {
  for flag in flags {
    let existing = rows.iter().position(|row| row_matches(row, profile_name, flu_subtype, flag.kind, &flag.profile_pos));

    match existing {
      Some(idx) => {
        let row = &mut rows[idx];
        if !row.accession_list.iter().any(|a| a == accession) {
          row.accession_list.push(accession.to_owned());
          row.accession_total += 1;
          row.current_month_increase += 1;
          row.last_updated = today;
          row.status_this_month = "Updated".to_owned();
          if matches!(flag.kind, FlagKind::Cts5Mut | FlagKind::Cts3Mut) {
            *row.mutation_sum.entry(flag.variant.clone()).or_insert(0) += 1;
          }
        }
      }
      None => {
        let mut mutation_sum = BTreeMap::new();
        if matches!(flag.kind, FlagKind::Cts5Mut | FlagKind::Cts3Mut) {
          mutation_sum.insert(flag.variant.clone(), 1);
        }
        rows.push(LedgerRow {
          profile_name: profile_name.to_owned(),
          status_this_month: "New".to_owned(),
          last_updated: today,
          flu_subtype: flu_subtype.to_owned(),
          auto_alignment_issue: flag.kind.to_string(),
          pos_profile: flag.profile_pos.clone(),
          mutation_sum,
          accession_total: 1,
          current_month_increase: 1,
          past_month_increase: 0,
          accession_list: vec![accession.to_owned()],
        });
      }
    }
  }
}

/// Step 5 of §6: sort by `(PROFILE_NAME asc, ACCESSION_TOTAL desc)`.
pub fn sort_rows(rows: &mut [LedgerRow]) {
  rows.sort_by(|a, b| a.profile_name.cmp(&b.profile_name).then(b.accession_total.cmp(&a.accession_total)));
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::flags::FlagKind;
  use pretty_assertions::assert_eq;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn rollover_moves_increase_and_marks_unchanged() {
    let mut rows = vec![LedgerRow {
      profile_name: "H3N2_HA".to_owned(),
      status_this_month: "New".to_owned(),
      last_updated: date(2026, 6, 15),
      flu_subtype: "H3N2".to_owned(),
      auto_alignment_issue: "CDS-del".to_owned(),
      pos_profile: "100..102".to_owned(),
      mutation_sum: BTreeMap::new(),
      accession_total: 3,
      current_month_increase: 3,
      past_month_increase: 0,
      accession_list: vec!["ACC1".to_owned()],
    }];
    rollover(&mut rows, date(2026, 7, 1));
    assert_eq!(rows[0].status_this_month, "Unchanged");
    assert_eq!(rows[0].past_month_increase, 3);
    assert_eq!(rows[0].current_month_increase, 0);
  }

  #[test]
  fn second_idle_month_does_not_re_roll_an_already_unchanged_row() {
    // A row already rolled over (status=Unchanged) in a prior call must not
    // roll again: re-running rollover a second idle month later would
    // otherwise copy the already-zeroed current_month_increase over
    // past_month_increase, silently erasing it.
    let mut rows = vec![LedgerRow {
      profile_name: "H3N2_HA".to_owned(),
      status_this_month: "Unchanged".to_owned(),
      last_updated: date(2026, 6, 15),
      flu_subtype: "H3N2".to_owned(),
      auto_alignment_issue: "CDS-del".to_owned(),
      pos_profile: "100..102".to_owned(),
      mutation_sum: BTreeMap::new(),
      accession_total: 3,
      current_month_increase: 0,
      past_month_increase: 3,
      accession_list: vec!["ACC1".to_owned()],
    }];
    rollover(&mut rows, date(2026, 8, 1));
    assert_eq!(rows[0].status_this_month, "Unchanged");
    assert_eq!(rows[0].past_month_increase, 3);
    assert_eq!(rows[0].current_month_increase, 0);
  }

  #[test]
  fn new_accession_increments_matched_row() {
    let mut rows = vec![LedgerRow {
      profile_name: "H3N2_HA".to_owned(),
      status_this_month: "Unchanged".to_owned(),
      last_updated: date(2026, 6, 1),
      flu_subtype: "H3N2".to_owned(),
      auto_alignment_issue: "CDS-del".to_owned(),
      pos_profile: "100..102".to_owned(),
      mutation_sum: BTreeMap::new(),
      accession_total: 1,
      current_month_increase: 0,
      past_month_increase: 1,
      accession_list: vec!["ACC1".to_owned()],
    }];
    let flag = Flag {
      kind: FlagKind::CdsDel,
      profile_pos: "100..102".to_owned(),
      query_pos: "50..51".to_owned(),
      variant: "del".to_owned(),
      length: 3,
    };
    apply_flags(&mut rows, date(2026, 7, 10), "H3N2_HA", "H3N2", "ACC2", &[flag]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].accession_total, 2);
    assert_eq!(rows[0].accession_list, vec!["ACC1".to_owned(), "ACC2".to_owned()]);
  }

  #[test]
  fn unmatched_flag_appends_new_row() {
    let mut rows = Vec::new();
    let flag = Flag {
      kind: FlagKind::Cts5Mut,
      profile_pos: "3".to_owned(),
      query_pos: "3".to_owned(),
      variant: "G".to_owned(),
      length: 1,
    };
    apply_flags(&mut rows, date(2026, 7, 10), "H3N2_HA", "H3N2", "ACC1", &[flag]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status_this_month, "New");
    assert_eq!(rows[0].mutation_sum.get("G"), Some(&1));
  }

  #[test]
  fn ext_flags_match_without_pos_profile() {
    let mut rows = vec![LedgerRow {
      profile_name: "H3N2_HA".to_owned(),
      status_this_month: "New".to_owned(),
      last_updated: date(2026, 6, 1),
      flu_subtype: "H3N2".to_owned(),
      auto_alignment_issue: "5'NCR-ext".to_owned(),
      pos_profile: "0..1".to_owned(),
      mutation_sum: BTreeMap::new(),
      accession_total: 1,
      current_month_increase: 0,
      past_month_increase: 1,
      accession_list: vec!["ACC1".to_owned()],
    }];
    let flag = Flag {
      kind: FlagKind::Ncr5Ext,
      profile_pos: "0..1".to_owned(),
      query_pos: "1..7".to_owned(),
      variant: "ACGTACG".to_owned(),
      length: 7,
    };
    apply_flags(&mut rows, date(2026, 7, 1), "H3N2_HA", "H3N2", "ACC2", &[flag]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].accession_total, 2);
  }

  #[test]
  fn sorts_by_profile_then_accession_total_desc() {
    let mut rows = vec![
      LedgerRow {
        profile_name: "H3N2_HA".to_owned(),
        status_this_month: "New".to_owned(),
        last_updated: date(2026, 7, 1),
        flu_subtype: "H3N2".to_owned(),
        auto_alignment_issue: "CDS-del".to_owned(),
        pos_profile: "1".to_owned(),
        mutation_sum: BTreeMap::new(),
        accession_total: 1,
        current_month_increase: 1,
        past_month_increase: 0,
        accession_list: vec![],
      },
      LedgerRow {
        profile_name: "H1N1_HA".to_owned(),
        status_this_month: "New".to_owned(),
        last_updated: date(2026, 7, 1),
        flu_subtype: "H1N1".to_owned(),
        auto_alignment_issue: "CDS-del".to_owned(),
        pos_profile: "1".to_owned(),
        mutation_sum: BTreeMap::new(),
        accession_total: 5,
        current_month_increase: 5,
        past_month_increase: 0,
        accession_list: vec![],
      },
    ];
    sort_rows(&mut rows);
    assert_eq!(rows[0].profile_name, "H1N1_HA");
    assert_eq!(rows[1].profile_name, "H3N2_HA");
  }
}
