use crate::coord::position::AlnCol;
use itertools::Itertools;

/// Collapses a sorted list of alignment columns into maximal runs of
/// consecutive integers, the same `index - value` grouping trick the
/// original implementation used via Python's `itertools.groupby`.
pub fn group_consecutive(cols: &[AlnCol]) -> Vec<Vec<AlnCol>> {
  cols
    .iter()
    .enumerate()
    .chunk_by(|(i, c)| c.as_usize() as isize - *i as isize)
    .into_iter()
    .map(|(_key, group)| group.map(|(_, c)| *c).collect())
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn groups_consecutive_runs() {
    let cols = [2, 3, 4, 9, 15, 16].map(AlnCol).to_vec();
    let groups = group_consecutive(&cols);
    assert_eq!(
      groups,
      vec![
        vec![AlnCol(2), AlnCol(3), AlnCol(4)],
        vec![AlnCol(9)],
        vec![AlnCol(15), AlnCol(16)],
      ]
    );
  }

  #[test]
  fn empty_input_yields_no_groups() {
    assert_eq!(group_consecutive(&[]), Vec::<Vec<AlnCol>>::new());
  }
}
