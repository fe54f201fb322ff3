use crate::alphabet::{is_n, is_regular_base};
use crate::flags::AmbiguityFlag;

const EXCESS_N_THRESHOLD: f64 = 0.005;
const EXCESS_AMBIG_THRESHOLD: f64 = 0.005;
const EXCESS_DIST_THRESHOLD: f64 = 0.80;

/// Computes the §4.2 ambiguity screen over an ungapped query sequence.
///
/// `identity` is the classifier's reported match identity (C2); pass `None`
/// when no classifier score applies (the `Excess-Dist` check is skipped).
pub fn screen(query: &[u8], identity: Option<f64>) -> Vec<AmbiguityFlag> {
  let len = query.len();
  let mut flags = Vec::new();
  if len == 0 {
    return flags;
  }

  let regular = query.iter().filter(|&&b| is_regular_base(b)).count();
  let indeterminate = query.iter().filter(|&&b| is_n(b)).count();
  let ambiguous = len - regular - indeterminate;

  if indeterminate as f64 / len as f64 > EXCESS_N_THRESHOLD {
    flags.push(AmbiguityFlag::ExcessN);
  }
  if ambiguous as f64 / len as f64 > EXCESS_AMBIG_THRESHOLD {
    flags.push(AmbiguityFlag::ExcessAmbig);
  }
  if let Some(identity) = identity {
    if identity < EXCESS_DIST_THRESHOLD {
      flags.push(AmbiguityFlag::ExcessDist);
    }
  }
  flags
}
