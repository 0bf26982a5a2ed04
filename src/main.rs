use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};

use taiga_io::read_dataset;
use taiga_rf::{ConfusionMatrix, RandomForestConfig};

#[derive(Parser)]
#[command(name = "taiga")]
#[command(about = "Random Forest classification over whitespace-delimited datasets")]
#[command(version)]
struct Cli {
    /// Directory containing the train/test data and label files
    data_dir: PathBuf,

    /// Number of trees in the Random Forest
    #[arg(long, default_value_t = 100)]
    n_trees: usize,

    /// Random feature candidates per split (defaults to round(sqrt(n_features)))
    #[arg(long)]
    feature_candidates: Option<usize>,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Training features file name within the data directory
    #[arg(long, default_value = "arcene_train.data")]
    train_data: String,

    /// Training labels file name within the data directory
    #[arg(long, default_value = "arcene_train.labels")]
    train_labels: String,

    /// Test features file name within the data directory
    #[arg(long, default_value = "arcene_valid.data")]
    test_data: String,

    /// Test labels file name within the data directory
    #[arg(long, default_value = "arcene_valid.labels")]
    test_labels: String,

    /// Enable verbose (debug-level) logging
    #[arg(long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long)]
    threads: Option<usize>,
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct EvaluateOutput {
    n_train: usize,
    n_test: usize,
    n_features: usize,
    n_trees: usize,
    feature_candidates: Option<usize>,
    seed: u64,
    accuracy: f64,
    n_correct: usize,
    misclassified: Vec<usize>,
    classes: Vec<i64>,
    confusion_matrix: Vec<Vec<usize>>,
    class_metrics: Vec<ClassMetricsOutput>,
}

#[derive(Serialize)]
struct ClassMetricsOutput {
    class: i64,
    precision: f64,
    recall: f64,
    f1: f64,
    support: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    // 1. Load training data
    let train = read_dataset(
        &cli.data_dir.join(&cli.train_data),
        &cli.data_dir.join(&cli.train_labels),
    )
    .context("failed to read training dataset")?;
    info!(
        n_samples = train.n_samples(),
        n_features = train.n_features(),
        "training dataset loaded"
    );

    // 2. Train the forest
    let config = RandomForestConfig::new(cli.n_trees)?
        .with_feature_candidates(cli.feature_candidates)
        .with_seed(cli.seed);
    let forest = config
        .fit(train.features(), train.labels())
        .context("training failed")?;
    info!(n_trees = forest.n_trees(), "forest trained");

    // 3. Load test data
    let test = read_dataset(
        &cli.data_dir.join(&cli.test_data),
        &cli.data_dir.join(&cli.test_labels),
    )
    .context("failed to read test dataset")?;
    info!(n_samples = test.n_samples(), "test dataset loaded");

    // 4. Predict and score
    let predictions = forest
        .predict_batch(test.features())
        .context("prediction failed")?;

    let mut misclassified = Vec::new();
    for (i, (&predicted, &actual)) in predictions.iter().zip(test.labels()).enumerate() {
        if predicted == actual {
            debug!(sample = i, label = actual, "correct");
        } else {
            debug!(sample = i, predicted, actual, "misclassified");
            misclassified.push(i);
        }
    }
    let n_correct = test.n_samples() - misclassified.len();

    let cm = ConfusionMatrix::from_labels(test.labels(), &predictions)
        .context("failed to build confusion matrix")?;
    info!(accuracy = cm.accuracy(), n_correct, "evaluation complete");

    // 5. Print summary
    let output = EvaluateOutput {
        n_train: train.n_samples(),
        n_test: test.n_samples(),
        n_features: train.n_features(),
        n_trees: cli.n_trees,
        feature_candidates: cli.feature_candidates,
        seed: cli.seed,
        accuracy: cm.accuracy(),
        n_correct,
        misclassified,
        classes: cm.classes().to_vec(),
        confusion_matrix: cm.as_rows().to_vec(),
        class_metrics: cm
            .class_metrics()
            .iter()
            .map(|m| ClassMetricsOutput {
                class: m.class,
                precision: m.precision,
                recall: m.recall,
                f1: m.f1,
                support: m.support,
            })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
