use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};

use crate::config::PipelineConfig;
use crate::metrics::QualityReport;
use crate::pipeline::Pipeline;
use crate::source::labels::{LabelCache, SkosVocabulary};
use crate::types::FieldName;
use crate::utils::SimpleTokenizer;

#[derive(Debug, Parser)]
#[command(
    name = "edu-corpus",
    disable_help_subcommand = true,
    about = "Build a bag-of-words classification corpus from a metadata dump",
    long_about = "Read a line-delimited JSON metadata dump, fix and filter records, encode the target fields, and prune until every quality threshold holds.",
    after_help = "Settings are resolved in order by explicit flag, then --config file, then built-in defaults."
)]
struct GenerateCli {
    #[arg(value_name = "DUMP", help = "Line-delimited JSON dump to read")]
    dump: PathBuf,
    #[arg(
        long = "target",
        value_name = "FIELD",
        help = "Target field to encode, repeat as needed (overrides the config file)"
    )]
    targets: Vec<FieldName>,
    #[arg(long, value_name = "PATH", help = "Optional JSON pipeline configuration")]
    config: Option<PathBuf>,
    #[arg(
        long,
        value_name = "PATH",
        help = "Optional path for the JSON serialization of the final corpus"
    )]
    output: Option<PathBuf>,
    #[arg(
        long = "max-records",
        value_parser = parse_positive_usize,
        help = "Stop reading after this many accepted records"
    )]
    max_records: Option<usize>,
    #[arg(
        long = "language",
        value_name = "CODE",
        help = "Accepted content language, repeat as needed (overrides the config file)"
    )]
    languages: Vec<String>,
    #[arg(
        long = "skos",
        value_name = "FIELD=PATH",
        value_parser = parse_skos_arg,
        help = "Local SKOS vocabulary used to label a target field, repeat as needed"
    )]
    skos: Vec<(FieldName, PathBuf)>,
    #[arg(
        long = "no-default-filters",
        help = "Skip the admissibility, visibility, and existing-text filters"
    )]
    no_default_filters: bool,
}

/// Run the corpus generator with command line arguments (without the program name).
pub fn run_generate<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) =
        parse_cli::<GenerateCli, _>(std::iter::once("edu-corpus".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if !cli.targets.is_empty() {
        config.target_fields = cli.targets.clone();
    }
    if !cli.languages.is_empty() {
        config.languages = cli.languages.clone();
    }
    if cli.max_records.is_some() {
        config.extraction.max_records = cli.max_records;
    }
    if cli.no_default_filters {
        config.use_default_filters = false;
    }

    let mut pipeline = Pipeline::new(config)?;
    for (field, path) in &cli.skos {
        let vocabulary = SkosVocabulary::from_json_file(path)?;
        pipeline = pipeline.with_label_resolver(field.clone(), vocabulary);
    }

    let mut cache = LabelCache::new();
    let corpus = pipeline.run_file(&cli.dump, &SimpleTokenizer::default(), &mut cache)?;

    let report = QualityReport::measure(&corpus, &pipeline.config().quality);
    print!("{report}");
    for (field, target) in corpus.corpus().target_data() {
        let in_test = target.in_test_set().iter().filter(|&&flag| flag).count();
        println!("  {field}: documents in test set={in_test}");
    }

    if let Some(path) = &cli.output {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &corpus)?;
        println!("corpus written to {}", path.display());
    }
    Ok(())
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("Could not parse '{raw}' as a positive integer"))?;
    if parsed == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_skos_arg(raw: &str) -> Result<(FieldName, PathBuf), String> {
    match raw.split_once('=') {
        Some((field, path)) if !field.trim().is_empty() && !path.trim().is_empty() => {
            Ok((field.trim().to_string(), PathBuf::from(path.trim())))
        }
        _ => Err(format!("--skos expects FIELD=PATH, got '{raw}'")),
    }
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skos_arg_splits_field_and_path() {
        let (field, path) = parse_skos_arg("properties.ccm:taxonid=vocab.json").unwrap();
        assert_eq!(field, "properties.ccm:taxonid");
        assert_eq!(path, PathBuf::from("vocab.json"));
        assert!(parse_skos_arg("no-separator").is_err());
        assert!(parse_skos_arg("=path").is_err());
    }

    #[test]
    fn positive_usize_rejects_zero() {
        assert_eq!(parse_positive_usize("3"), Ok(3));
        assert!(parse_positive_usize("0").is_err());
        assert!(parse_positive_usize("x").is_err());
    }

    #[test]
    fn cli_collects_repeated_targets() {
        let cli = GenerateCli::try_parse_from([
            "edu-corpus",
            "dump.jsonl",
            "--target",
            "a",
            "--target",
            "b",
            "--skos",
            "a=a.json",
        ])
        .unwrap();
        assert_eq!(cli.targets, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(cli.skos.len(), 1);
        assert!(!cli.no_default_filters);
    }

    #[test]
    fn help_is_not_an_error() {
        let parsed = parse_cli::<GenerateCli, _>(["edu-corpus", "--help"]).unwrap();
        assert!(parsed.is_none());
    }
}
