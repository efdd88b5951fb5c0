//! Subcommand implementations

use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use docket_core::cluster::{eps_range, sweep_eps};
use docket_core::crosstab::CROSSTAB_FILE_SUFFIX;
use docket_core::pipeline::{obtain_matrix, prepare, prepare_outcomes, resolve, MatrixSource, Prepared};
use docket_core::similarity::{self, estimate_build_time, persist::MATRIX_FILE_SUFFIX, LogProgress};
use docket_core::{DocketConfig, RecordTable, SampleWeights};
use docket_io::{
    read_table, write_annotated, write_counts, write_crosstab, write_representatives, write_sweep,
    write_to_path, CsvOptions,
};

use crate::{RunArgs, SweepArgs};

type CommandResult = Result<(), Box<dyn Error>>;

fn load_table(config: &DocketConfig, input: &Path) -> Result<RecordTable, Box<dyn Error>> {
    let start = Instant::now();
    let options = CsvOptions::with_missing_markers(&config.normalization.missing_markers);
    let table = read_table(input, &options)?;
    tracing::info!("loaded input in {:.2}s", start.elapsed().as_secs_f64());
    Ok(table)
}

fn load_prepared(config: &DocketConfig, input: &Path) -> Result<Prepared, Box<dyn Error>> {
    let prepared = prepare(load_table(config, input)?, config)?;
    if prepared.anomaly_count() > 0 {
        tracing::warn!(
            "{} rows flagged as '{}'",
            prepared.anomaly_count(),
            config.anomalies.placeholder
        );
    }
    Ok(prepared)
}

fn timestamped(config: &DocketConfig, suffix: &str) -> PathBuf {
    config
        .output
        .timestamped_path(Local::now().naive_local(), suffix)
}

fn weights<'a>(prepared: &'a Prepared, unweighted: bool) -> SampleWeights<'a> {
    if unweighted {
        SampleWeights::Uniform
    } else {
        SampleWeights::Counts(&prepared.plaintiffs.counts)
    }
}

/// `docket outcomes`
pub fn outcomes(config: &DocketConfig, input: &Path, output: Option<&Path>) -> CommandResult {
    let (_, outcomes) = prepare_outcomes(load_table(config, input)?, config)?;

    match output {
        Some(path) => write_to_path(path, |out| write_counts(out, &outcomes.column, &outcomes.counts))?,
        None => write_counts(io::stdout().lock(), &outcomes.column, &outcomes.counts)?,
    }
    Ok(())
}

/// `docket matrix`
pub fn matrix(config: &DocketConfig, input: &Path, output: Option<&Path>) -> CommandResult {
    let prepared = load_prepared(config, input)?;
    let matrix = obtain_matrix(
        &prepared,
        &MatrixSource::Build,
        &config.similarity.scorer,
        &LogProgress,
    )?;

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| timestamped(config, MATRIX_FILE_SUFFIX));
    similarity::save(&matrix, &path)?;
    println!("{}", path.display());
    Ok(())
}

/// `docket run`
pub fn run(mut config: DocketConfig, args: &RunArgs) -> CommandResult {
    let started = Instant::now();
    if let Some(eps) = args.eps {
        config.clustering.eps = eps;
    }
    if let Some(min_samples) = args.min_samples {
        config.clustering.min_samples = min_samples;
    }
    if args.unweighted {
        config.clustering.weight_by_count = false;
    }
    config.validate()?;

    let prepared = load_prepared(&config, &args.input)?;

    let source = match (&args.matrix, args.build_matrix) {
        (Some(path), _) => Some(MatrixSource::Load(path.clone())),
        (None, true) => Some(MatrixSource::Build),
        (None, false) => None,
    };
    let matrix = source
        .map(|source| obtain_matrix(&prepared, &source, &config.similarity.scorer, &LogProgress))
        .transpose()?;
    if let (Some(matrix), Some(path)) = (&matrix, &args.save_matrix) {
        similarity::save(matrix, path)?;
    }

    let resolution = resolve(&prepared, matrix.as_ref(), &config.clustering)?;

    let crosstab_path = args
        .crosstab
        .clone()
        .unwrap_or_else(|| timestamped(&config, CROSSTAB_FILE_SUFFIX));
    write_to_path(&crosstab_path, |out| write_crosstab(out, &resolution.crosstab))?;

    if let Some(path) = &args.annotated {
        let rows = resolution.annotated(&prepared)?;
        write_to_path(path, |out| write_annotated(out, prepared.table.headers(), &rows))?;
    }
    if let Some(path) = &args.clusters {
        write_to_path(path, |out| {
            write_representatives(out, resolution.labeling.representatives())
        })?;
    }
    if let Some(path) = &args.summary {
        std::fs::write(path, serde_json::to_string_pretty(&resolution.summary)?)?;
    }

    let summary = &resolution.summary;
    println!(
        "{} rows ({} duplicates removed, {} flagged)",
        summary.rows, summary.duplicates_removed, summary.anomalies
    );
    println!(
        "{} distinct plaintiffs -> {} clusters, {} unclustered names",
        summary.distinct_plaintiffs, summary.clusters, summary.noise_names
    );
    println!(
        "{} of {} rows clustered; {} outcomes",
        summary.clustered_rows, summary.rows, summary.distinct_outcomes
    );
    println!("crosstab: {}", crosstab_path.display());
    tracing::info!("run finished in {:.2}s", started.elapsed().as_secs_f64());
    Ok(())
}

/// `docket sweep`
pub fn sweep(config: &DocketConfig, args: &SweepArgs) -> CommandResult {
    let prepared = load_prepared(config, &args.input)?;
    let matrix = obtain_matrix(
        &prepared,
        &MatrixSource::Load(args.matrix.clone()),
        &config.similarity.scorer,
        &LogProgress,
    )?;

    let grid = eps_range(args.min_eps, args.max_eps, args.step)?;
    let min_samples = args.min_samples.unwrap_or(config.clustering.min_samples);
    let unweighted = args.unweighted || !config.clustering.weight_by_count;
    let points = sweep_eps(
        &matrix,
        &grid,
        min_samples,
        weights(&prepared, unweighted),
        &prepared.placeholders,
    )?;

    match &args.output {
        Some(path) => write_to_path(path, |out| write_sweep(out, &points))?,
        None => write_sweep(io::stdout().lock(), &points)?,
    }
    Ok(())
}

/// `docket estimate`
pub fn estimate(config: &DocketConfig, input: &Path, sample: usize) -> CommandResult {
    let prepared = load_prepared(config, input)?;
    let names = prepared.plaintiffs.counts.names();
    let estimate = estimate_build_time(&names, &config.similarity.scorer, sample)?;

    println!(
        "{} distinct plaintiffs, {} rows timed in {:.3}s",
        estimate.names,
        estimate.sampled_rows,
        estimate.sample_elapsed.as_secs_f64()
    );
    println!(
        "{:.3}us per comparison, estimated full build {:.1}s",
        estimate.per_comparison.as_secs_f64() * 1e6,
        estimate.estimated_total.as_secs_f64()
    );
    Ok(())
}
