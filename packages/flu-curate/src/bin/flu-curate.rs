use eyre::{eyre, Report, WrapErr};
use flu_curate::align::MuscleAligner;
use flu_curate::cli::{self, Commands, FlagSelector};
use flu_curate::classify::{load_classification_table, TableClassifier};
use flu_curate::curation::{curate, FilesystemReferenceLoader};
use flu_curate::flags::FlagReport;
use flu_curate::io::fasta;
use flu_curate::io::fs::read_file_to_string;
use flu_curate::io::table6::{apply_flags, load_ledger, rollover, sort_rows, write_ledger};
use flu_curate::logging::setup_logger;
use log::{error, warn};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

fn main() -> Result<(), Report> {
  color_eyre::install()?;

  let args = cli::parse_args()?;
  setup_logger(cli::resolve_log_level(&args));

  if let Some(Commands::Completions { shell }) = args.command {
    cli::print_completions(shell);
    return Ok(());
  }

  let query_path = args.query.clone().ok_or_else(|| eyre!("--query is required"))?;
  let reference_dir = args.reference_dir.clone().ok_or_else(|| eyre!("--reference-dir is required"))?;
  let classifications_path = args.classifications.clone().ok_or_else(|| eyre!("--classifications is required"))?;

  let query_content = read_file_to_string(&query_path).wrap_err("when reading --query")?;
  let records = fasta::parse(&query_content);
  if records.is_empty() {
    return Err(eyre!("--query FASTA contains no records"));
  }

  let classification_content = read_file_to_string(&classifications_path).wrap_err("when reading --classifications")?;
  let classification_table =
    load_classification_table(&classification_content).map_err(|err| eyre!("invalid classification table: {err}"))?;
  let classifier = TableClassifier::new(classification_table);

  let reference_loader = FilesystemReferenceLoader { reference_dir };
  let aligner = MuscleAligner::default();
  let scratch_dir = args.output_dir.join(".flu-curate-scratch");

  let pool = ThreadPoolBuilder::new().num_threads(args.jobs).build().wrap_err("when building worker thread pool")?;

  let today = chrono::Local::now().date_naive();
  let mut ledger_rows = Vec::new();
  if let Some(table6_path) = &args.table6 {
    if table6_path.exists() {
      let content = read_file_to_string(table6_path).wrap_err("when reading --table6")?;
      ledger_rows = load_ledger(&content).map_err(|err| eyre!("invalid ledger: {err}"))?;
      rollover(&mut ledger_rows, today);
    }
  }

  let results: Vec<_> = pool.install(|| {
    records
      .par_iter()
      .map(|record| {
        let accession = fasta::extract_accession(&record.defline).unwrap_or_else(|| record.defline.clone());
        let classification = classifier.classify_by_accession(&accession);
        let result = curate(&accession, &record.seq, classification, &reference_loader, &aligner, &scratch_dir, &args.output_dir);
        (accession, result)
      })
      .collect()
  });

  let mut any_reported = false;
  for (accession, result) in &results {
    match result {
      Ok(report) => {
        any_reported = true;
        if args.output_json {
          match serde_json::to_string(report) {
            Ok(json) => println!("{json}"),
            Err(err) => error!("{accession}: failed to serialize report as JSON: {err}"),
          }
        } else {
          print_report(accession, report, args.flag);
        }
        if let (Some(profile_id), Some(strain_id), FlagReport::Flags(flags), true) =
          (&report.profile_id, &report.strain_id, &report.mutation_flags, args.table6.is_some())
        {
          apply_flags(&mut ledger_rows, today, profile_id, strain_id, accession, flags);
        }
      }
      Err(err) => {
        error!("{accession}: {err}");
      }
    }
  }

  if let Some(table6_path) = &args.table6 {
    sort_rows(&mut ledger_rows);
    let content = write_ledger(&ledger_rows).map_err(|err| eyre!("failed to serialize ledger: {err}"))?;
    std::fs::write(table6_path, content).wrap_err("when writing --table6")?;
  }

  if !any_reported && !results.is_empty() {
    warn!("every query in {query_path:?} failed; see errors above");
  }

  Ok(())
}

fn print_report(accession: &str, report: &flu_curate::curation::CurationReport, selector: Option<FlagSelector>) {
  println!("{accession}\tsummary={}", report.summary);

  match selector {
    Some(FlagSelector::Ambig) => {
      for flag in &report.ambiguity_flags {
        println!("{accession}\tambig\t{flag}");
      }
    }
    Some(FlagSelector::Mut | FlagSelector::Ins | FlagSelector::Del | FlagSelector::Sub) | None => {
      for flag in report.mutation_flags.flags() {
        let label = flag.kind.to_string();
        let keep = match selector {
          Some(FlagSelector::Ins) => label.ends_with("-ins") || label.ends_with("-ext"),
          Some(FlagSelector::Del) => label.ends_with("-del"),
          Some(FlagSelector::Sub) => label.ends_with("-mut"),
          _ => true,
        };
        if keep {
          println!(
            "{accession}\t{}\t{}\t{}\t{}\t{}",
            flag.kind, flag.profile_pos, flag.query_pos, flag.variant, flag.length
          );
        }
      }
    }
  }
}
