//! hybridscan CLI module
//!
//! Command-line interface for training hybrid models, scanning data files
//! and profiling datasets.

use clap::{Parser, Subcommand};
use colored::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::PipelineSettings;
use crate::inference::{InferenceConfig, InferenceEngine};
use crate::preprocessing::{label_values, profile_dataset};
use crate::training::{ClassifierConfig, ClustererConfig, HybridTrainer, TrainingRequest};
use crate::utils::load_dataset;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn kv(key: &str, val: impl std::fmt::Display) {
    println!("  {:<16} {}", muted(key), val.to_string().white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "hybridscan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Hybrid KMeans + SVM training and threat scanning")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train a hybrid model on a labeled CSV dataset
    Train {
        /// Input data file (CSV)
        #[arg(short, long)]
        data: PathBuf,

        /// Label column (defaults to the last column)
        #[arg(short, long)]
        target: Option<String>,

        /// Model name; the artifact is saved as <name>_hybrid.bin
        #[arg(short, long, default_value = "model")]
        name: String,

        /// KMeans hyperparameters as a JSON object
        #[arg(long, default_value = "")]
        kmeans: String,

        /// SVM hyperparameters as a JSON object
        #[arg(long, default_value = "")]
        svm: String,

        /// Held-out fraction, between 0.1 and 0.5
        #[arg(long, default_value = "0.2")]
        test_size: f64,

        /// Random seed for the split and both stages
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Directory for model artifacts (overrides HYBRIDSCAN_ARTIFACTS_DIR)
        #[arg(long)]
        artifacts_dir: Option<PathBuf>,

        /// Write the training result as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Scan an unlabeled data file with a trained model
    Predict {
        /// Trained model artifact
        #[arg(short, long)]
        model: PathBuf,

        /// Input data file
        #[arg(short, long)]
        data: PathBuf,

        /// Label treated as a threat (overrides HYBRIDSCAN_POSITIVE_CLASS)
        #[arg(long)]
        positive_class: Option<String>,

        /// Write labels, probabilities and summary as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show dataset information
    Info {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,

        /// Label column (defaults to the last column)
        #[arg(short, long)]
        target: Option<String>,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

/// Parse and run the command line
pub fn run(cli: Cli, settings: PipelineSettings) -> anyhow::Result<()> {
    match cli.command {
        Commands::Train { data, target, name, kmeans, svm, test_size, seed, artifacts_dir, output } => {
            let settings = match artifacts_dir {
                Some(dir) => settings.with_artifacts_dir(dir),
                None => settings,
            };
            let mut request = TrainingRequest::new(data, name)
                .with_kmeans(ClustererConfig::from_json(&kmeans)?)
                .with_svm(ClassifierConfig::from_json(&svm)?)
                .with_test_size(test_size)
                .with_random_state(seed);
            if let Some(target) = target {
                request = request.with_target_column(target);
            }
            cmd_train(&settings, &request, output.as_deref())
        }
        Commands::Predict { model, data, positive_class, output } => {
            let settings = match positive_class {
                Some(class) => settings.with_positive_class(class),
                None => settings,
            };
            cmd_predict(&settings, &model, &data, output.as_deref())
        }
        Commands::Info { data, target } => cmd_info(&data, target.as_deref()),
    }
}

pub fn cmd_train(
    settings: &PipelineSettings,
    request: &TrainingRequest,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    section("Train");
    kv("Dataset", request.dataset_path.display());
    kv("Model", &request.model_name);
    kv("Clusters", request.kmeans.n_clusters);
    kv("Kernel", request.svm.kernel);
    println!();

    step_run("Training hybrid model");
    let start = Instant::now();
    let trainer = HybridTrainer::from_settings(settings);
    let result = trainer.train(request)?;
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    println!("  {:<16} {}", muted("Accuracy"), format!("{:.4}", result.accuracy).white().bold());
    kv("Artifact", result.model_path.display());
    println!();

    if let Some(path) = output {
        write_json(path, &result)?;
        kv("Result", path.display());
        println!();
    }
    Ok(())
}

pub fn cmd_predict(
    settings: &PipelineSettings,
    model_path: &Path,
    data_path: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    section("Predict");

    step_run("Scanning");
    let start = Instant::now();
    let config = InferenceConfig::from_settings(settings);
    let result = InferenceEngine::scan_file(config, model_path, data_path)?;
    step_done(&format!("{:?}", start.elapsed()));

    let summary = &result.summary;
    println!();
    kv("Items", summary.total_items_scanned);
    let flagged = summary.threats_detected_count.to_string();
    println!(
        "  {:<16} {}",
        muted("Threats"),
        if summary.is_overall_threat_detected { flagged.red().bold() } else { flagged.green() }
    );
    for sample in &summary.detailed_threat_info_sample {
        println!(
            "  {:<16} row {} {}",
            "",
            sample.item_index_in_file,
            dim(&format!("p={:.4}", sample.probability_of_threat))
        );
    }
    println!("  {}", dim(&summary.summary));
    println!();

    if let Some(path) = output {
        write_json(path, &result)?;
        kv("Result", path.display());
        println!();
    }
    Ok(())
}

pub fn cmd_info(data_path: &Path, target: Option<&str>) -> anyhow::Result<()> {
    section("Data Info");

    let df = load_dataset(data_path)?;

    kv("File", data_path.display());
    kv("Rows", df.height());
    kv("Columns", df.width());
    println!();

    println!("  {:<20} {:<12} {:>6} {:>8}", muted("Column"), muted("Type"), muted("Nulls"), muted("Unique"));
    println!("  {}", dim(&"─".repeat(50)));
    for col in df.get_columns() {
        println!(
            "  {:<20} {:<12} {:>6} {:>8}",
            col.name(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count(),
            col.n_unique().unwrap_or(0)
        );
    }

    let profile = profile_dataset(&df, target)?;
    println!();
    kv("Label", &profile.target_column);
    kv("Numerical", profile.partition.numerical_features.join(", "));
    kv("Categorical", profile.partition.categorical_features.join(", "));

    let label_column = df.column(&profile.target_column)?;
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for label in label_values(label_column)? {
        *counts.entry(label).or_default() += 1;
    }
    println!();
    for (label, count) in &counts {
        println!("  {:<16} {}", muted(&format!("class {}", label)), count);
    }
    println!();
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), value)?;
    Ok(())
}
