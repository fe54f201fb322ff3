//! C9: composes classification, ambiguity screening, alignment, coordinate
//! remapping, and flag emission into one per-query report, per §4.5.

use crate::align::{AlignerAdapter, ScratchFile};
use crate::alignment::Alignment;
use crate::alphabet::to_upper_string;
use crate::ambiguity;
use crate::classify::Classification;
use crate::coord::ColumnSets;
use crate::error::CurationError;
use crate::flags::{AmbiguityFlag, Flag, FlagReport, SummaryFlag};
use crate::io::lookup::Whitelist;
use crate::mutation::{deletion_flags, insertion_flags, substitution_flags};
use crate::region::ProfileBoundaries;
use log::info;
use schemars::JsonSchema;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Everything the facade needs to locate a classified strain's reference
/// material: its profile FASTA, boundary row, and whitelist.
pub struct ReferenceSet {
  pub profile_fasta: PathBuf,
  pub boundaries: ProfileBoundaries,
  pub whitelist: Whitelist,
}

/// Looks up the reference material for a classified `(profile_id, strain_id)`.
/// Kept as a trait so the facade doesn't hardcode a filesystem layout.
pub trait ReferenceLoader {
  fn load(&self, profile_id: &str, strain_id: &str) -> Result<ReferenceSet, CurationError>;
}

/// A `ReferenceLoader` over a directory tree: `profiles/{profile_id}.fasta`,
/// a shared `boundaries.txt`, and a shared `lookup.tsv`.
pub struct FilesystemReferenceLoader {
  pub reference_dir: PathBuf,
}

impl ReferenceLoader for FilesystemReferenceLoader {
  fn load(&self, profile_id: &str, strain_id: &str) -> Result<ReferenceSet, CurationError> {
    let profile_fasta = self.reference_dir.join("profiles").join(format!("{profile_id}.fasta"));
    if !profile_fasta.exists() {
      return Err(CurationError::ReferenceMissing(format!("profile FASTA not found: {profile_fasta:?}")));
    }

    let boundary_path = self.reference_dir.join("boundaries.txt");
    let boundary_content = std::fs::read_to_string(&boundary_path)
      .map_err(|err| CurationError::ReferenceMissing(format!("failed to read {boundary_path:?}: {err}")))?;
    let boundaries = crate::io::boundary::load_boundaries(&boundary_content, strain_id)?;

    let lookup_path = self.reference_dir.join("lookup.tsv");
    let lookup_content = std::fs::read_to_string(&lookup_path)
      .map_err(|err| CurationError::ReferenceMissing(format!("failed to read {lookup_path:?}: {err}")))?;
    let whitelist = crate::io::lookup::load_whitelist(&lookup_content, profile_id)?;

    Ok(ReferenceSet { profile_fasta, boundaries, whitelist })
  }
}

/// The full per-query curation result of §4.5.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CurationReport {
  pub profile_id: Option<String>,
  pub strain_id: Option<String>,
  pub ambiguity_flags: Vec<AmbiguityFlag>,
  pub mutation_flags: FlagReport,
  pub summary: SummaryFlag,
}

/// Runs the full pipeline for one query sequence against its classified
/// profile. `output_dir` is where the alignment is persisted per step 6 of
/// §4.5 when no insertions were found.
pub fn curate(
  query_accession: &str,
  query_seq: &[u8],
  classification: Classification,
  reference_loader: &dyn ReferenceLoader,
  aligner: &dyn AlignerAdapter,
  scratch_dir: &Path,
  output_dir: &Path,
) -> Result<CurationReport, CurationError> {
  // Step 1: classify.
  let (profile_id, strain_id, identity) = match classification {
    Classification::Unknown => {
      return Ok(CurationReport {
        profile_id: None,
        strain_id: None,
        ambiguity_flags: vec![AmbiguityFlag::ExcessDist],
        mutation_flags: FlagReport::Unknown,
        summary: SummaryFlag::AmbigSeq,
      });
    }
    Classification::Known { profile_id, strain_id, identity } => (profile_id, strain_id, identity),
  };

  // Step 2: load boundaries and whitelist.
  let reference = reference_loader.load(&profile_id, &strain_id)?;

  // Step 3: ambiguity screen.
  let ambiguity_flags = ambiguity::screen(query_seq, Some(identity));

  // Step 4: call aligner, load alignment.
  let query_fasta = ScratchFile::new(scratch_dir, &format!("{query_accession}_query"), "fasta")
    .map_err(|err| CurationError::AlignerFailure(err.to_string()))?;
  query_fasta
    .write_fasta(&[(query_accession.to_owned(), query_seq.to_vec())])
    .map_err(|err| CurationError::AlignerFailure(err.to_string()))?;

  let aln_out = ScratchFile::new(scratch_dir, &format!("{query_accession}_aln"), "fasta")
    .map_err(|err| CurationError::AlignerFailure(err.to_string()))?;
  aligner.align(&reference.profile_fasta, query_fasta.path(), aln_out.path())?;

  let aln_content = std::fs::read_to_string(aln_out.path())
    .map_err(|err| CurationError::AlignerFailure(format!("failed to read alignment output: {err}")))?;
  let records = crate::io::fasta::parse(&aln_content);
  if records.len() < 2 {
    return Err(CurationError::AlignmentShapeError(format!("alignment has {} record(s), need at least 2", records.len())));
  }
  let rows: Vec<Vec<u8>> = records.iter().map(|r| to_upper_string(&r.seq).into_bytes()).collect();
  let alignment = Alignment::from_rows(rows)?;

  // Step 5: build column sets, compute flags.
  let column_sets = ColumnSets::build(&alignment);
  let mut flags = Vec::new();
  flags.extend(deletion_flags(&alignment, &column_sets, &reference.boundaries, &reference.whitelist));
  let insertions = insertion_flags(&alignment, &column_sets, &reference.boundaries);
  flags.extend(insertions.clone());
  flags.extend(substitution_flags(&alignment, &column_sets, &reference.boundaries)?);

  // Step 6: persist the alignment only if no insertions were found.
  if insertions.is_empty() {
    let dest = output_dir.join(format!("{query_accession}.aln.fasta"));
    aln_out.persist_to(&dest).map_err(|err| CurationError::AlignerFailure(err.to_string()))?;
  } else {
    info!("discarding alignment for {query_accession}: {} insertion event(s) found", insertions.len());
  }

  // Step 7: summary flag precedence.
  let summary = summarize(&ambiguity_flags, &flags);

  let mutation_flags = if flags.is_empty() { FlagReport::Pass } else { FlagReport::Flags(flags) };

  Ok(CurationReport { profile_id: Some(profile_id), strain_id: Some(strain_id), ambiguity_flags, mutation_flags, summary })
}

fn summarize(ambiguity_flags: &[AmbiguityFlag], mutation_flags: &[Flag]) -> SummaryFlag {
  if !ambiguity_flags.is_empty() {
    return SummaryFlag::AmbigSeq;
  }
  if mutation_flags.iter().any(|f| f.kind.is_cds()) {
    return SummaryFlag::FlagCds;
  }
  if mutation_flags.iter().any(|f| f.kind.is_ncr_or_cts()) {
    return SummaryFlag::FlagNcr;
  }
  SummaryFlag::Pass
}
