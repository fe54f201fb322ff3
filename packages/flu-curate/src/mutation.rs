//! C6 (event grouper) and C8 (flag engine): turns column sets into the
//! deletion, insertion, and CTS-substitution flag lists of §4.4.

use crate::alignment::Alignment;
use crate::alphabet::to_upper_string;
use crate::coord::groups::group_consecutive;
use crate::coord::{AlnCol, ColumnSets};
use crate::error::CurationError;
use crate::flags::{Flag, FlagKind};
use crate::io::lookup::Whitelist;
use crate::region::{ProfileBoundaries, Region};

/// `full_run_len` is the whole maximal deletion run's length (before
/// splitting across straddled regions) — the frame test of §4.4 is taken
/// over the full run, not the region-restricted subrun.
fn deletion_kind(region: Region, full_run_len: usize) -> Option<FlagKind> {
  match region {
    Region::Cts5 => Some(FlagKind::Cts5Del),
    Region::Cts3 => Some(FlagKind::Cts3Del),
    Region::Ncr5 => Some(FlagKind::Ncr5Del),
    Region::Ncr3 => Some(FlagKind::Ncr3Del),
    Region::Cds => Some(if full_run_len % 3 == 0 { FlagKind::Cds3XDel } else { FlagKind::CdsDel }),
  }
}

/// Deletion events of §4.4: runs of `D \ A`, split across straddled regions,
/// with terminal-truncation suppression and whitelist filtering.
pub fn deletion_flags(alignment: &Alignment, column_sets: &ColumnSets, boundaries: &ProfileBoundaries, whitelist: &Whitelist) -> Vec<Flag> {
  let l = alignment.len_cols();
  let full_d_len = column_sets.d.len();

  let e_d: Vec<AlnCol> = column_sets.d.iter().copied().filter(|&c| !column_sets.is_accepted_gap(c)).collect();

  let mut flags = Vec::new();
  for run in group_consecutive(&e_d) {
    let profile_del: Vec<usize> = run
      .iter()
      .map(|&c| column_sets.col_to_prof(c).expect("deletion column has a canonical profile position").as_usize())
      .collect();
    let query_del: Vec<usize> = run.iter().map(|&c| column_sets.col_to_qry_preceding(c).as_usize()).collect();

    let lo = *profile_del.first().unwrap();
    let hi = *profile_del.last().unwrap();
    let full_run_len = profile_del.len();

    for (region, start, end) in boundaries.intersecting(lo, hi) {
      let indices: Vec<usize> = (0..profile_del.len()).filter(|&i| profile_del[i] >= start && profile_del[i] <= end).collect();
      if indices.is_empty() {
        continue;
      }

      let region_dels_p: Vec<usize> = indices.iter().map(|&i| profile_del[i]).collect();
      let region_dels_q: Vec<usize> = indices.iter().map(|&i| query_del[i]).collect();

      let first_q = region_dels_q[0];
      if first_q == 0 || first_q == l - full_d_len {
        continue;
      }

      let Some(kind) = deletion_kind(region, full_run_len) else { continue };

      let p_start = *region_dels_p.first().unwrap();
      let p_end = *region_dels_p.last().unwrap();

      if kind.is_whitelistable() && whitelist.accept(kind, p_start, p_end) {
        continue;
      }

      let profile_pos = if p_start == p_end { p_start.to_string() } else { format!("{p_start}..{p_end}") };
      let query_pos = format!("{first_q}..{}", first_q + 1);

      flags.push(Flag { kind, profile_pos, query_pos, variant: "del".to_owned(), length: region_dels_p.len() });
    }
  }
  flags
}

/// Insertion events of §4.4: runs over `I`, classified by their anchor
/// profile position. Never whitelist-filtered.
pub fn insertion_flags(alignment: &Alignment, column_sets: &ColumnSets, boundaries: &ProfileBoundaries) -> Vec<Flag> {
  let query = alignment.query_row();

  let mut flags = Vec::new();
  for run in group_consecutive(&column_sets.i) {
    let ins_bases = to_upper_string(&run.iter().map(|&c| query[c.as_usize()]).collect::<Vec<u8>>());
    let profile_anchor = column_sets.insertion_anchor_prof(run[0]);
    let query_ins: Vec<usize> = run
      .iter()
      .map(|&c| column_sets.col_to_qry(c).expect("insertion column is present in the query").as_usize())
      .collect();

    let run_len = run.len();
    let q_start = *query_ins.first().unwrap();
    let q_end = *query_ins.last().unwrap();
    let query_pos = if q_start == q_end { q_start.to_string() } else { format!("{q_start}..{q_end}") };

    if profile_anchor == 0 {
      flags.push(Flag { kind: FlagKind::Ncr5Ext, profile_pos: "0..1".to_owned(), query_pos, variant: ins_bases, length: run_len });
      continue;
    }
    if profile_anchor == boundaries.end {
      flags.push(Flag {
        kind: FlagKind::Ncr3Ext,
        profile_pos: format!("{}..", boundaries.end),
        query_pos,
        variant: ins_bases,
        length: run_len,
      });
      continue;
    }

    let Some(region) = boundaries.containing(profile_anchor, profile_anchor) else { continue };
    let kind = match region {
      Region::Cts5 => FlagKind::Cts5Ins,
      Region::Cts3 => FlagKind::Cts3Ins,
      Region::Ncr5 => FlagKind::Ncr5Ins,
      Region::Ncr3 => FlagKind::Ncr3Ins,
      Region::Cds => {
        if run_len % 3 == 0 {
          FlagKind::Cds3XIns
        } else {
          FlagKind::CdsIns
        }
      }
    };

    let profile_pos = format!("{profile_anchor}..{}", profile_anchor + 1);
    flags.push(Flag { kind, profile_pos, query_pos, variant: ins_bases, length: run_len });
  }
  flags
}

/// §9 open question: the CTS-coordinate adjustment assumes at most one
/// insertion run anchors strictly before the canonical profile start (anchor
/// `0`) — the single 5'-terminal extension case of §4.4 step 3. A second run
/// also anchored before the start would mean two disjoint stretches of
/// sequence both claim to precede position 1, which the adjustment's simple
/// sum can't represent; reject rather than silently sum through it.
fn validate_leading_insertion_anchors(anchors: &[usize], start: usize) -> Result<(), CurationError> {
  let leading = anchors.iter().filter(|&&a| a < start).count();
  if leading > 1 {
    return Err(CurationError::AlignmentShapeError(format!(
      "{leading} insertion runs anchor strictly before the canonical profile start ({start}); the CTS-coordinate adjustment is only valid with at most one"
    )));
  }
  Ok(())
}

/// Maps a canonical profile position to its alignment-column coordinate by
/// adding the length of every insertion run anchored strictly before it. Used
/// only to translate the CTS boundary endpoints ahead of substitution
/// scanning; applying the same rule to every endpoint (rather than only the
/// ones the original special-cased) keeps the arithmetic self-consistent even
/// for a 5' leading insertion run, whose anchor is 0 and so is always
/// included.
fn column_for_profile_pos(p: usize, insertion_runs: &[Vec<AlnCol>], column_sets: &ColumnSets) -> usize {
  let adjustment: usize = insertion_runs
    .iter()
    .filter(|run| column_sets.insertion_anchor_prof(run[0]) < p)
    .map(Vec::len)
    .sum();
  (p - 1) + adjustment
}

/// CTS-only substitution events of §4.4: strict all-profile-rows-differ
/// consensus mismatch, grouped into runs, with N-only runs suppressed.
pub fn substitution_flags(
  alignment: &Alignment,
  column_sets: &ColumnSets,
  boundaries: &ProfileBoundaries,
) -> Result<Vec<Flag>, CurationError> {
  let query = alignment.query_row();
  let profiles = alignment.profile_rows();
  let insertion_runs = group_consecutive(&column_sets.i);
  let last_col = alignment.len_cols().saturating_sub(1);

  let anchors: Vec<usize> = insertion_runs.iter().map(|run| column_sets.insertion_anchor_prof(run[0])).collect();
  validate_leading_insertion_anchors(&anchors, boundaries.start)?;

  let mut flags = Vec::new();
  for (region, kind) in [(Region::Cts5, FlagKind::Cts5Mut), (Region::Cts3, FlagKind::Cts3Mut)] {
    let (start, end) = boundaries.region_range(region);
    let aln_start = column_for_profile_pos(start, &insertion_runs, column_sets).min(last_col);
    let aln_end = column_for_profile_pos(end, &insertion_runs, column_sets).min(last_col);
    if aln_start > aln_end {
      continue;
    }

    let mut mismatch_cols = Vec::new();
    for col in aln_start..=aln_end {
      let c = AlnCol(col);
      if column_sets.is_insertion(c) || column_sets.is_query_deletion(c) {
        continue;
      }
      let q_base = query[col].to_ascii_uppercase();
      let all_differ = profiles.iter().all(|row| row[col].to_ascii_uppercase() != q_base);
      if all_differ {
        mismatch_cols.push(c);
      }
    }

    for run in group_consecutive(&mismatch_cols) {
      let variant = to_upper_string(&run.iter().map(|&c| query[c.as_usize()]).collect::<Vec<u8>>());
      if variant.bytes().all(|b| b == b'N') {
        continue;
      }

      let first = *run.first().unwrap();
      let last = *run.last().unwrap();
      let p_first = column_sets.col_to_prof(first).expect("substitution column outside any insertion").as_usize();
      let p_last = column_sets.col_to_prof(last).expect("substitution column outside any insertion").as_usize();
      let q_first = column_sets.col_to_qry(first).expect("substitution column present in the query").as_usize();
      let q_last = column_sets.col_to_qry(last).expect("substitution column present in the query").as_usize();

      let profile_pos = if p_first == p_last { p_first.to_string() } else { format!("{p_first}..{p_last}") };
      let query_pos = if q_first == q_last { q_first.to_string() } else { format!("{q_first}..{q_last}") };

      flags.push(Flag { kind, profile_pos, query_pos, variant, length: run.len() });
    }
  }
  Ok(flags)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::io::lookup::load_whitelist;
  use pretty_assertions::assert_eq;

  fn aln(rows: &[&str]) -> Alignment {
    Alignment::from_rows(rows.iter().map(|r| r.as_bytes().to_vec()).collect()).unwrap()
  }

  #[test]
  fn in_frame_cds_deletion_flags_as_3x() {
    // Canonical boundaries: CTS5 1..5, NCR5 6..9, CDS 10..30, NCR3 31..33, CTS3 34..40.
    // Query deletes 3 consecutive bases inside the CDS.
    let profile = "A".repeat(40);
    let query_seq = format!("{}{}{}", "A".repeat(15), "-".repeat(3), "A".repeat(22));
    let a = aln(&[&profile, &profile, &query_seq]);
    let cs = ColumnSets::build(&a);
    let boundaries = ProfileBoundaries::new(1, 5, 10, 30, 34, 40).unwrap();
    let whitelist = load_whitelist("", "P").unwrap();

    let flags = deletion_flags(&a, &cs, &boundaries, &whitelist);
    assert_eq!(flags.len(), 1);
    assert_eq!(flags[0].kind, FlagKind::Cds3XDel);
    assert_eq!(flags[0].profile_pos, "16..18");
    assert_eq!(flags[0].length, 3);
  }

  #[test]
  fn straddling_run_uses_full_run_length_for_frame_test_not_region_subrun() {
    // Canonical boundaries: CDS 10..30, NCR3 31..33, CTS3 34..40.
    // A 6-column deletion run spans profile positions 29..34: only 2 columns
    // (29,30) fall inside CDS, but the frame test must use the full 6-column
    // run (6%3==0, so CDS-3Xdel), not the 2-column CDS-only subrun (2%3!=0,
    // which would wrongly give CDS-del).
    let profile = "A".repeat(40);
    let query_seq = format!("{}{}{}", "A".repeat(28), "-".repeat(6), "A".repeat(6));
    let a = aln(&[&profile, &profile, &query_seq]);
    let cs = ColumnSets::build(&a);
    let boundaries = ProfileBoundaries::new(1, 5, 10, 30, 34, 40).unwrap();
    let whitelist = load_whitelist("", "P").unwrap();

    let flags = deletion_flags(&a, &cs, &boundaries, &whitelist);
    let cds_flag = flags.iter().find(|f| f.profile_pos == "29..30").expect("CDS-side subrun flag");
    assert_eq!(cds_flag.kind, FlagKind::Cds3XDel);
    assert_eq!(cds_flag.length, 2);
  }

  #[test]
  fn whitelisted_deletion_is_suppressed() {
    let profile = "A".repeat(40);
    let query_seq = format!("{}{}{}", "A".repeat(15), "-".repeat(2), "A".repeat(23));
    let a = aln(&[&profile, &profile, &query_seq]);
    let cs = ColumnSets::build(&a);
    let boundaries = ProfileBoundaries::new(1, 5, 10, 30, 34, 40).unwrap();
    let whitelist = load_whitelist("P\tCDS-del\t16..17\tnote\n", "P").unwrap();

    let flags = deletion_flags(&a, &cs, &boundaries, &whitelist);
    assert_eq!(flags, vec![]);
  }

  #[test]
  fn leading_insertion_flags_as_5ncr_ext() {
    let profile = format!("{}{}", "-".repeat(5), "A".repeat(40));
    let query_seq = format!("{}{}", "ACGTA", "A".repeat(40));
    let a = aln(&[&profile, &profile, &query_seq]);
    let cs = ColumnSets::build(&a);
    let boundaries = ProfileBoundaries::new(1, 5, 10, 30, 34, 40).unwrap();

    let flags = insertion_flags(&a, &cs, &boundaries);
    assert_eq!(flags.len(), 1);
    assert_eq!(flags[0].kind, FlagKind::Ncr5Ext);
    assert_eq!(flags[0].profile_pos, "0..1");
    assert_eq!(flags[0].query_pos, "1..5");
    assert_eq!(flags[0].variant, "ACGTA");
  }

  #[test]
  fn cts_substitution_detected_and_n_only_suppressed() {
    // 10-column profile: CTS5 = positions 1..3.
    let profile1 = "ACGTACGTAC";
    let profile2 = "ACGTACGTAC";
    let query_seq = "GCGTACGTAC"; // mismatch at column 0 (A->G)
    let a = aln(&[profile1, profile2, query_seq]);
    let cs = ColumnSets::build(&a);
    let boundaries = ProfileBoundaries::new(1, 3, 4, 6, 7, 10).unwrap();

    let flags = substitution_flags(&a, &cs, &boundaries).unwrap();
    assert_eq!(flags.len(), 1);
    assert_eq!(flags[0].kind, FlagKind::Cts5Mut);
    assert_eq!(flags[0].profile_pos, "1");
    assert_eq!(flags[0].variant, "G");
  }

  #[test]
  fn n_only_substitution_run_is_suppressed() {
    let profile1 = "ACGTACGTAC";
    let profile2 = "ACGTACGTAC";
    let query_seq = "NCGTACGTAC";
    let a = aln(&[profile1, profile2, query_seq]);
    let cs = ColumnSets::build(&a);
    let boundaries = ProfileBoundaries::new(1, 3, 4, 6, 7, 10).unwrap();

    let flags = substitution_flags(&a, &cs, &boundaries).unwrap();
    assert_eq!(flags, vec![]);
  }

  #[test]
  fn single_leading_insertion_anchor_passes_validation() {
    assert!(validate_leading_insertion_anchors(&[0, 4, 10], 1).is_ok());
  }

  #[test]
  fn two_insertion_runs_anchored_before_start_are_rejected() {
    let err = validate_leading_insertion_anchors(&[0, 0], 1).unwrap_err();
    assert!(matches!(err, CurationError::AlignmentShapeError(_)));
  }
}
