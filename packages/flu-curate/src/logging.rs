use log::LevelFilter;

/// Installs the global logger at the given filter level.
///
/// Mirrors the teacher's `setup_logger`: a plain `env_logger` builder seeded
/// from a CLI-derived filter level rather than `RUST_LOG`, so verbosity is
/// driven by `--verbosity`/`--silent` instead of an environment variable.
pub fn setup_logger(filter_level: LevelFilter) {
  env_logger::Builder::new()
    .filter_level(filter_level)
    .format_timestamp_secs()
    .init();
}
