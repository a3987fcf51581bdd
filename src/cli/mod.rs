//! failsense CLI module
//!
//! Command-line interface for training, bulk scoring, and the interactive
//! prediction form.

use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::io::Write as _;
use std::path::PathBuf;
use std::time::Instant;

use crate::artifacts::ArtifactStore;
use crate::inference::{PredictEngine, PredictionLabel};
use crate::schema::{
    ProductType, RawRecord, AIR_TEMP_RANGE, PROCESS_TEMP_RANGE, SPEED_RANGE, TORQUE_RANGE,
    WEAR_RANGE,
};
use crate::training::{TrainEngine, TrainingConfig};
use crate::utils::DataLoader;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString {
    s.truecolor(100, 100, 100)
}
fn accent(s: &str) -> ColoredString {
    s.truecolor(120, 170, 255)
}
fn muted(s: &str) -> ColoredString {
    s.truecolor(140, 140, 140)
}
fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
    let _ = std::io::stdout().flush();
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "failsense")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Machine failure prediction from sensor telemetry")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the classifier on a CSV dataset and save artifacts
    Train {
        /// Training dataset (CSV)
        #[arg(short, long)]
        data: PathBuf,

        /// Artifact output directory
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,

        /// Decision threshold for evaluation
        #[arg(long, default_value = "0.7")]
        threshold: f64,

        /// Random seed for the split and the booster
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Number of boosting rounds
        #[arg(long, default_value = "100")]
        n_estimators: usize,
    },

    /// Score a CSV of new observations with saved artifacts
    Predict {
        /// Input data file (CSV)
        #[arg(short, long)]
        data: PathBuf,

        /// Artifact directory
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,

        /// Output predictions file (CSV); prints a summary when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Decision threshold override
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Show dataset information
    Info {
        /// Input data file (CSV)
        #[arg(short, long)]
        data: PathBuf,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(
    data_path: &PathBuf,
    artifacts_dir: &PathBuf,
    threshold: f64,
    seed: u64,
    n_estimators: usize,
) -> anyhow::Result<()> {
    section("Train");

    step_run("Loading data");
    let start = Instant::now();
    let df = DataLoader::new().load_and_clean(data_path)?;
    step_done(&format!(
        "{} rows × {} cols in {:?}",
        df.height(),
        df.width(),
        start.elapsed()
    ));

    let config = TrainingConfig::default()
        .with_threshold(threshold)
        .with_random_state(seed)
        .with_n_estimators(n_estimators);

    step_run("Training gradient boosting classifier");
    let start = Instant::now();
    let mut engine = TrainEngine::new(config);
    engine.fit(&df)?;
    step_done(&format!("{:?}", start.elapsed()));

    let metrics = engine.metrics().expect("metrics are set after fit").clone();

    println!();
    println!("  {:<16} {}", muted("Accuracy"), format!("{:.4}", metrics.accuracy).white().bold());
    println!("  {:<16} {}", muted("Precision"), format!("{:.4}", metrics.precision).white());
    println!("  {:<16} {}", muted("Recall"), format!("{:.4}", metrics.recall).white());
    println!("  {:<16} {}", muted("F1"), format!("{:.4}", metrics.f1_score).white());
    println!("  {:<16} {}", muted("AUC-ROC"), format!("{:.4}", metrics.auc_roc).white());
    println!("  {:<16} {}", muted("Threshold"), format!("{:.2}", metrics.threshold).white());
    println!("  {:<16} {}", muted("Time"), format!("{:.3}s", metrics.training_time_secs).white());
    println!();

    step_run(&format!("Saving artifacts → {}", artifacts_dir.display()));
    let store = ArtifactStore::new(artifacts_dir);
    store.save_training(&engine)?;
    step_done("model, scaler, feature columns");

    println!();
    Ok(())
}

pub fn cmd_predict(
    data_path: &PathBuf,
    artifacts_dir: &PathBuf,
    output: Option<&std::path::Path>,
    threshold: Option<f64>,
) -> anyhow::Result<()> {
    section("Predict");

    step_run("Loading artifacts");
    let store = ArtifactStore::new(artifacts_dir);
    let mut engine = PredictEngine::load(&store)?;
    if let Some(t) = threshold {
        engine = engine.with_threshold(t)?;
    }
    step_done(&format!("threshold {:.2}", engine.threshold()));

    step_run("Loading data");
    let df = DataLoader::new().load_and_clean(data_path)?;
    step_done(&format!("{} rows", df.height()));

    step_run("Scoring");
    let start = Instant::now();
    let results = engine.predict_frame(&df)?;
    step_done(&format!("{} rows in {:?}", results.len(), start.elapsed()));

    let failures = results
        .iter()
        .filter(|r| r.label == PredictionLabel::Failure)
        .count();

    println!();
    println!("  {:<20} {}", muted("Predicted failures"), failures.to_string().white().bold());
    println!("  {:<20} {}", muted("Predicted healthy"), (results.len() - failures).to_string().white());

    if let Some(out_path) = output {
        let labels: Vec<i32> = results
            .iter()
            .map(|r| if r.label == PredictionLabel::Failure { 1 } else { 0 })
            .collect();
        let probs: Vec<f64> = results.iter().map(|r| r.probability).collect();

        let mut scored = df.clone();
        scored.with_column(Column::new("Predicted failure".into(), labels))?;
        scored.with_column(Column::new("Failure probability".into(), probs))?;

        step_run(&format!("Writing → {}", out_path.display()));
        let mut file = std::fs::File::create(out_path)?;
        CsvWriter::new(&mut file).finish(&mut scored)?;
        step_done(&format!("{} rows", scored.height()));
    }

    println!();
    Ok(())
}

pub fn cmd_info(data_path: &PathBuf) -> anyhow::Result<()> {
    section("Data Info");

    let df = DataLoader::new().load_csv(data_path)?;

    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!();

    println!(
        "  {:<24} {:<12} {:>6} {:>8}",
        muted("Column"),
        muted("Type"),
        muted("Nulls"),
        muted("Unique")
    );
    println!("  {}", dim(&"─".repeat(54)));

    for col in df.get_columns() {
        println!(
            "  {:<24} {:<12} {:>6} {:>8}",
            col.name(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count(),
            col.n_unique().unwrap_or(0)
        );
    }

    println!();
    Ok(())
}

// ─── Interactive form ──────────────────────────────────────────────────────────

fn read_line() -> anyhow::Result<String> {
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Prompt for one numeric field until the value parses and falls in range.
/// Enter accepts the default.
fn prompt_f64(label: &str, (lo, hi): (f64, f64), default: f64) -> anyhow::Result<f64> {
    loop {
        print!(
            "  {} {} {} ",
            accent("?"),
            label.white(),
            dim(&format!("[{lo}–{hi}, default {default}]"))
        );
        std::io::stdout().flush()?;

        let input = read_line()?;
        if input.is_empty() {
            return Ok(default);
        }
        match input.parse::<f64>() {
            Ok(v) if v >= lo && v <= hi => return Ok(v),
            Ok(v) => println!("  {} {v} is outside [{lo}, {hi}]", dim("!")),
            Err(_) => println!("  {} not a number", dim("!")),
        }
    }
}

fn prompt_product_type() -> anyhow::Result<ProductType> {
    loop {
        print!(
            "  {} {} {} ",
            accent("?"),
            "Product type".white(),
            dim("[L/M/H, default L]")
        );
        std::io::stdout().flush()?;

        let input = read_line()?;
        if input.is_empty() {
            return Ok(ProductType::L);
        }
        match input.to_uppercase().parse::<ProductType>() {
            Ok(t) => return Ok(t),
            Err(_) => println!("  {} expected L, M, or H", dim("!")),
        }
    }
}

/// The interactive prediction form: the five sensor fields with range
/// validation, the product type, and a label + probability readout.
pub fn cmd_interactive(artifacts_dir: &PathBuf) -> anyhow::Result<()> {
    println!();
    println!("  {}", "failsense".white().bold());
    println!(
        "  {}",
        dim(&format!(
            "machine failure prediction · v{}",
            env!("CARGO_PKG_VERSION")
        ))
    );

    step_run("Loading artifacts");
    let store = ArtifactStore::new(artifacts_dir);
    let engine = PredictEngine::load(&store)?;
    step_done(&format!("threshold {:.2}", engine.threshold()));

    loop {
        section("Input Parameters");

        let record = RawRecord::new(
            prompt_f64("Air temperature [K]", AIR_TEMP_RANGE, 298.0)?,
            prompt_f64("Process temperature [K]", PROCESS_TEMP_RANGE, 308.6)?,
            prompt_f64("Rotational speed [rpm]", SPEED_RANGE, 1551.0)?,
            prompt_f64("Torque [Nm]", TORQUE_RANGE, 42.8)?,
            prompt_f64("Tool wear [min]", WEAR_RANGE, 0.0)?,
            prompt_product_type()?,
        );

        let result = engine.predict_one(&record)?;

        section("Prediction");
        let label = match result.label {
            PredictionLabel::Failure => result.label.as_str().red().bold(),
            PredictionLabel::NoFailure => result.label.as_str().green().bold(),
        };
        println!("  {:<22} {}", muted("Result"), label);
        println!(
            "  {:<22} {}",
            muted("Failure probability"),
            format!("{:.2}%", result.probability * 100.0).white().bold()
        );

        println!();
        print!("  {} score another? {} ", accent("?"), dim("[y/N]"));
        std::io::stdout().flush()?;
        if !read_line()?.eq_ignore_ascii_case("y") {
            println!();
            println!("  {}", dim("goodbye"));
            println!();
            break;
        }
    }

    Ok(())
}
