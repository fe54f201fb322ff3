use crate::error::CurationError;
use derive_more::Display;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The five genomic regions a boundary file tiles, in 5'->3' order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize, JsonSchema)]
pub enum Region {
  #[display("CTS5")]
  Cts5,
  #[display("NCR5")]
  Ncr5,
  #[display("CDS")]
  Cds,
  #[display("NCR3")]
  Ncr3,
  #[display("CTS3")]
  Cts3,
}

/// Canonical profile-coordinate region boundaries for one strain, derived
/// from the six raw boundary-file fields per §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileBoundaries {
  pub start: usize,
  pub cts5: usize,
  pub atg: usize,
  pub stop: usize,
  pub cts3: usize,
  pub end: usize,
}

impl ProfileBoundaries {
  /// Builds boundaries from the six raw fields, validating the invariants of §3:
  /// `START=1`, `CTS5<ATG<STOP<CTS3<END`, and that the five regions tile `[1,END]`.
  pub fn new(start: usize, cts5: usize, atg: usize, stop: usize, cts3: usize, end: usize) -> Result<Self, CurationError> {
    if start != 1 {
      return Err(CurationError::AlignmentShapeError(format!(
        "boundary invariant violated: START must be 1, got {start}"
      )));
    }
    if !(cts5 < atg && atg < stop && stop < cts3 && cts3 < end) {
      return Err(CurationError::AlignmentShapeError(format!(
        "boundary invariant violated: expected CTS5({cts5}) < ATG({atg}) < STOP({stop}) < CTS3({cts3}) < END({end})"
      )));
    }
    Ok(Self { start, cts5, atg, stop, cts3, end })
  }

  /// `[Start, End]`, 1-based inclusive, in canonical profile coordinates.
  pub fn region_range(&self, region: Region) -> (usize, usize) {
    match region {
      Region::Cts5 => (self.start, self.cts5),
      Region::Ncr5 => (self.cts5 + 1, self.atg - 1),
      Region::Cds => (self.atg, self.stop),
      Region::Ncr3 => (self.stop + 1, self.cts3 - 1),
      Region::Cts3 => (self.cts3, self.end),
    }
  }

  pub fn all_regions(&self) -> [(Region, usize, usize); 5] {
    [Region::Cts5, Region::Ncr5, Region::Cds, Region::Ncr3, Region::Cts3]
      .map(|r| {
        let (s, e) = self.region_range(r);
        (r, s, e)
      })
  }

  /// Every region whose `[Start,End]` intersects `[lo,hi]` (both canonical
  /// profile positions, 1-based inclusive), in region order.
  pub fn intersecting(&self, lo: usize, hi: usize) -> Vec<(Region, usize, usize)> {
    self
      .all_regions()
      .into_iter()
      .filter(|&(_, start, end)| start <= hi && end >= lo)
      .collect()
  }

  /// The single region containing `[lo,hi]`'s start, per §4.4 insertion
  /// classification ("the single region containing profile_ins[0]..profile_ins[k]").
  pub fn containing(&self, lo: usize, hi: usize) -> Option<Region> {
    self
      .all_regions()
      .into_iter()
      .find(|&(_, start, end)| start <= hi && end >= lo)
      .map(|(r, ..)| r)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn sample() -> ProfileBoundaries {
    ProfileBoundaries::new(1, 20, 25, 1000, 1010, 1030).unwrap()
  }

  #[test]
  fn rejects_bad_start() {
    assert!(ProfileBoundaries::new(2, 20, 25, 1000, 1010, 1030).is_err());
  }

  #[test]
  fn rejects_out_of_order_boundaries() {
    assert!(ProfileBoundaries::new(1, 30, 25, 1000, 1010, 1030).is_err());
  }

  #[test]
  fn tiles_exactly() {
    let b = sample();
    assert_eq!(b.region_range(Region::Cts5), (1, 20));
    assert_eq!(b.region_range(Region::Ncr5), (21, 24));
    assert_eq!(b.region_range(Region::Cds), (25, 1000));
    assert_eq!(b.region_range(Region::Ncr3), (1001, 1009));
    assert_eq!(b.region_range(Region::Cts3), (1010, 1030));
  }

  #[test]
  fn finds_intersecting_and_containing_regions() {
    let b = sample();
    assert_eq!(b.containing(25, 25), Some(Region::Cds));
    assert_eq!(b.containing(1, 1), Some(Region::Cts5));
    let straddle = b.intersecting(999, 1002);
    assert_eq!(straddle.iter().map(|(r, ..)| *r).collect::<Vec<_>>(), vec![Region::Cds, Region::Ncr3]);
  }
}
