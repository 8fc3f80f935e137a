use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use cci_core::{DatasetTagger, RealizationRegistry, RunSummary, TagOptions};
use cci_ingest::{DatasetConfigs, SidecarAttributeSource};
use cci_report::{ReportPaths, write_reports};
use cci_vocab::Vocabulary;

use crate::cli::{DatasetArgs, FileArgs};

#[derive(Debug)]
pub struct RunResult {
    pub summary: RunSummary,
    pub outputs: Option<ReportPaths>,
    pub elapsed: Duration,
}

pub fn run_datasets(args: &DatasetArgs) -> Result<RunResult> {
    let started = Instant::now();

    let vocabulary =
        Vocabulary::from_json_file(&args.vocab).context("load vocabulary dump")?;
    let configs = load_configs(args.json_store.as_deref())?;
    // invalid configured defaults are fatal before any output file is opened
    configs
        .validate_defaults(&vocabulary)
        .context("validate dataset configs")?;

    let datasets = collect_datasets(args, &configs)?;
    if datasets.is_empty() {
        bail!("no datasets given; pass paths, --datasets-file, or --json-datasets");
    }

    let registry_path = args
        .registry
        .clone()
        .unwrap_or_else(|| args.output_dir.join("realizations.json"));
    let registry =
        RealizationRegistry::load_or_default(&registry_path).context("load registry")?;
    let options = TagOptions {
        max_file_count: usize::try_from(args.max_file_count).ok().filter(|n| *n > 0),
        checksums: !args.no_checksum,
    };

    let attributes = SidecarAttributeSource;
    let mut tagger = DatasetTagger::new(&vocabulary, &configs, &attributes, registry, options);
    let summary = tagger.process(&datasets);

    let outputs = if args.suppress_output {
        info!("output suppressed, nothing written");
        None
    } else {
        std::fs::create_dir_all(&args.output_dir).with_context(|| {
            format!("create output directory {}", args.output_dir.display())
        })?;
        let paths = write_reports(&args.output_dir, &summary).context("write run outputs")?;
        tagger
            .registry()
            .save(&registry_path)
            .context("save registry")?;
        Some(paths)
    };

    Ok(RunResult {
        summary,
        outputs,
        elapsed: started.elapsed(),
    })
}

pub fn run_file(args: &FileArgs) -> Result<()> {
    let vocabulary =
        Vocabulary::from_json_file(&args.vocab).context("load vocabulary dump")?;
    let configs = load_configs(args.json_store.as_deref())?;
    configs
        .validate_defaults(&vocabulary)
        .context("validate dataset configs")?;

    let registry = match &args.registry {
        Some(path) => RealizationRegistry::load_or_default(path).context("load registry")?,
        None => RealizationRegistry::new(),
    };
    let attributes = SidecarAttributeSource;
    let mut tagger = DatasetTagger::new(
        &vocabulary,
        &configs,
        &attributes,
        registry,
        TagOptions::default(),
    );
    let tagged = tagger
        .tag_file(&args.file)
        .with_context(|| format!("tag {}", args.file.display()))?;
    println!("{}", serde_json::to_string_pretty(&tagged)?);
    Ok(())
}

fn load_configs(json_store: Option<&std::path::Path>) -> Result<DatasetConfigs> {
    match json_store {
        Some(dir) => DatasetConfigs::load_dir(dir).context("load dataset configs"),
        None => Ok(DatasetConfigs::default()),
    }
}

/// Gather dataset paths from positional args, the datasets file, and the
/// config store.
fn collect_datasets(args: &DatasetArgs, configs: &DatasetConfigs) -> Result<Vec<String>> {
    let mut datasets: Vec<String> = args
        .datasets
        .iter()
        .map(|path| path.to_string_lossy().into_owned())
        .collect();

    if let Some(path) = &args.datasets_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read datasets file {}", path.display()))?;
        datasets.extend(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(String::from),
        );
    }

    if args.json_datasets {
        datasets.extend(configs.declared_datasets().map(String::from));
    }

    debug!(count = datasets.len(), "collected dataset paths");
    Ok(datasets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use std::path::Path;

    fn parse(argv: &[&str]) -> Cli {
        Cli::try_parse_from(argv).unwrap()
    }

    fn dataset_args(cli: Cli) -> DatasetArgs {
        match cli.command {
            crate::cli::Command::Datasets(args) => args,
            crate::cli::Command::File(_) => panic!("expected datasets command"),
        }
    }

    #[test]
    fn datasets_file_lines_are_collected() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("datasets.txt");
        std::fs::write(&list, "/ds/a\n\n# comment\n/ds/b\n").unwrap();

        let cli = parse(&[
            "cci-tag",
            "datasets",
            "/ds/c",
            "--datasets-file",
            list.to_str().unwrap(),
            "--vocab",
            "vocab.json",
        ]);
        let args = dataset_args(cli);
        let datasets = collect_datasets(&args, &DatasetConfigs::default()).unwrap();
        assert_eq!(datasets, ["/ds/c", "/ds/a", "/ds/b"]);
    }

    #[test]
    fn run_fails_fast_on_invalid_config_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let vocab_path = dir.path().join("vocab.json");
        let mut vocabulary = Vocabulary::new();
        vocabulary.add_pref(
            cci_model::FacetKind::TimeFrequency,
            "http://v/freq/day",
            "day",
        );
        vocabulary.to_json_file(&vocab_path).unwrap();

        let store = dir.path().join("store");
        std::fs::create_dir(&store).unwrap();
        std::fs::write(
            store.join("bad.json"),
            r#"{"datasets": ["/ds"], "defaults": {"time_frequency": "fortnight"}}"#,
        )
        .unwrap();

        let cli = parse(&[
            "cci-tag",
            "datasets",
            "/ds",
            "--vocab",
            vocab_path.to_str().unwrap(),
            "--json-store",
            store.to_str().unwrap(),
        ]);
        let error = run_datasets(&dataset_args(cli)).unwrap_err();
        assert!(error.to_string().contains("validate dataset configs"));
    }

    #[test]
    fn suppressed_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let vocab_path = dir.path().join("vocab.json");
        Vocabulary::new().to_json_file(&vocab_path).unwrap();
        let dataset = dir.path().join("ds");
        std::fs::create_dir(&dataset).unwrap();
        let output = dir.path().join("out");

        let cli = parse(&[
            "cci-tag",
            "datasets",
            dataset.to_str().unwrap(),
            "--vocab",
            vocab_path.to_str().unwrap(),
            "--suppress-output",
            "--output-dir",
            output.to_str().unwrap(),
        ]);
        let result = run_datasets(&dataset_args(cli)).unwrap();
        assert!(result.outputs.is_none());
        // empty dataset counts as a failure but writes nothing
        assert_eq!(result.summary.failures, 1);
        assert!(!Path::new(&output).exists());
    }
}
