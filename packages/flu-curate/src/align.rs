use crate::error::CurationError;
use log::warn;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

/// RAII guard around the aligner's temporary input/output files: created in
/// `new`, always removed on drop regardless of which exit path the caller
/// takes, satisfying the §5 resource-release requirement without depending
/// on a dedicated tempfile crate (not part of the teacher's dependency set).
pub struct ScratchFile {
  path: PathBuf,
}

impl ScratchFile {
  pub fn new(dir: &Path, stem: &str, suffix: &str) -> std::io::Result<Self> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{stem}.{suffix}"));
    Ok(Self { path })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn write_fasta(&self, records: &[(String, Vec<u8>)]) -> std::io::Result<()> {
    let mut file = File::create(&self.path)?;
    for (header, seq) in records {
      writeln!(file, ">{header}")?;
      file.write_all(seq)?;
      writeln!(file)?;
    }
    Ok(())
  }

  /// Releases the scratch file into the output directory instead of deleting
  /// it, consuming `self` so `Drop` cannot also try to remove the same path.
  pub fn persist_to(self, dest: &Path) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::rename(&self.path, dest).or_else(|_| std::fs::copy(&self.path, dest).map(|_| ()))?;
    std::mem::forget(self);
    Ok(())
  }
}

impl Drop for ScratchFile {
  fn drop(&mut self) {
    if self.path.exists() {
      if let Err(err) = std::fs::remove_file(&self.path) {
        warn!("failed to remove scratch file {:?}: {err}", self.path);
      }
    }
  }
}

/// Given profile FASTA + query FASTA, returns a profile-in-front multiple
/// alignment. External per §2 C3; only the interface is specified.
pub trait AlignerAdapter {
  fn align(&self, profile_fasta: &Path, query_fasta: &Path, out_fasta: &Path) -> Result<(), CurationError>;
}

/// Adapter that shells out to MUSCLE's `-profile` mode, the external aligner
/// named in the original pipeline.
pub struct MuscleAligner {
  pub binary: PathBuf,
}

impl Default for MuscleAligner {
  fn default() -> Self {
    Self { binary: PathBuf::from("muscle") }
  }
}

impl AlignerAdapter for MuscleAligner {
  fn align(&self, profile_fasta: &Path, query_fasta: &Path, out_fasta: &Path) -> Result<(), CurationError> {
    let output = Command::new(&self.binary)
      .arg("-profile")
      .arg("-in1")
      .arg(profile_fasta)
      .arg("-in2")
      .arg(query_fasta)
      .arg("-out")
      .arg(out_fasta)
      .output()
      .map_err(|err| CurationError::AlignerFailure(format!("failed to spawn aligner: {err}")))?;

    if !output.status.success() {
      return Err(CurationError::AlignerFailure(format!(
        "aligner exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
      )));
    }
    if !out_fasta.exists() {
      return Err(CurationError::AlignerFailure("aligner produced no output file".to_owned()));
    }
    Ok(())
  }
}
