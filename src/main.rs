use std::path::{Path, PathBuf};

use clap::Parser;
use miette::{Context, IntoDiagnostic, Result};
use typeslate::convert::convert_project;
use typeslate::oracle::{Project, Snapshot};

mod config;

use self::config::{Command, ConvertArgs, Main};

fn main() -> Result<()> {
    let main = Main::parse();

    let default_level = if main.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match main.command {
        Command::Convert(args) => convert(&args),
    }
}

fn convert(args: &ConvertArgs) -> Result<()> {
    let files = collect_inputs(&args.inputs)?;

    let mut snapshots = Vec::new();
    for path in &files {
        let source = std::fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("Failed to read `{}`", path.display()))?;
        let snapshot = parse_snapshot(path, &source)
            .into_diagnostic()
            .with_context(|| format!("Failed to parse `{}`", path.display()))?;
        snapshots.push(snapshot);
    }

    let project = Project::from_snapshots(snapshots).into_diagnostic()?;
    let units: Vec<String> = project.units().map(|(name, _)| name.to_owned()).collect();

    println!("Converting {} units from {} snapshots...", units.len(), files.len());
    let conversion = convert_project(&project, &units);
    for error in &conversion.errors {
        tracing::warn!(%error, "skipping unit");
    }

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)
            .into_diagnostic()
            .with_context(|| format!("Failed to create directory `{}`", parent.display()))?;
    }
    let mut document = conversion.output;
    if !document.ends_with('\n') {
        document.push('\n');
    }
    std::fs::write(&args.output, document)
        .into_diagnostic()
        .with_context(|| format!("Failed to write `{}`", args.output.display()))?;
    println!("Wrote `{}`", args.output.display());

    if args.check {
        println!("Running `tsp compile`...");
        let status = std::process::Command::new("tsp")
            .arg("compile")
            .arg(&args.output)
            .arg("--no-emit")
            .status()
            .into_diagnostic()?;

        if !status.success() {
            miette::bail!("`tsp compile` exited with status {status}");
        }
    }

    Ok(())
}

/// Expands the input list: files pass through, directories are walked
/// for snapshot files in name order.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in walkdir::WalkDir::new(input).sort_by_file_name() {
                let entry = entry.into_diagnostic()?;
                if entry.file_type().is_file() && is_snapshot(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            miette::bail!("input `{}` does not exist", input.display());
        }
    }
    if files.is_empty() {
        miette::bail!("no snapshot files found");
    }
    Ok(files)
}

fn is_snapshot(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("json" | "yaml" | "yml")
    )
}

fn parse_snapshot(path: &Path, source: &str) -> Result<Snapshot, typeslate::error::SnapshotError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => Snapshot::from_yaml(source),
        _ => Snapshot::from_json(source),
    }
}
