use eyre::{eyre, Report, WrapErr};
use std::fs;
use std::path::{Path, PathBuf};

pub fn absolute_path(path: impl AsRef<Path>) -> Result<PathBuf, Report> {
  let path = path.as_ref();
  if path.is_absolute() {
    Ok(path.to_path_buf())
  } else {
    Ok(std::env::current_dir()?.join(path))
  }
}

pub fn ensure_dir(filepath: impl AsRef<Path>) -> Result<(), Report> {
  let filepath = filepath.as_ref();
  let parent_dir = filepath
    .parent()
    .ok_or_else(|| eyre!("unable to get parent path for {:#?}", filepath))?;
  let parent_path = absolute_path(parent_dir)?;
  fs::create_dir_all(&parent_path).wrap_err_with(|| format!("when creating directory '{parent_path:#?}'"))
}

/// Reads an entire file into a string, wrapping I/O errors with the path for context.
pub fn read_file_to_string(filepath: impl AsRef<Path>) -> Result<String, Report> {
  let filepath = filepath.as_ref();
  fs::read_to_string(filepath).wrap_err_with(|| format!("when reading file: {filepath:#?}"))
}
