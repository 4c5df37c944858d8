//! crayon: analyze children's drawings from the command line.
//!
//! Runs the analysis pipeline on one or more drawings for a subject and
//! prints each report, optionally persisting it to a report directory.
//! Stored reports can be listed per subject or shown by id.
//!
//! Logs go to stderr; set `CRAYON_LOG` (e.g. `CRAYON_LOG=debug`) to
//! change the filter. Reports go to stdout.
//!
//! # Usage
//!
//! ```text
//! crayon analyze --subject <ID> [--store <DIR>] [--json] [OPTIONS] <IMAGE>...
//! crayon history --store <DIR> [--json] <SUBJECT>
//! crayon show --store <DIR> [--json] <ANALYSIS_ID>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use crayon_io::{
    AnalysisService, InMemoryReportStore, JsonDirReportStore, ReportStore, StoredReport,
};
use crayon_pipeline::{AnalysisConfig, AnalysisReport, Analyzer};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "CRAYON_LOG";

/// Psychological-signal analysis of children's drawings.
#[derive(Parser)]
#[command(name = "crayon", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze drawings and print their reports.
    Analyze(AnalyzeArgs),
    /// List a subject's stored reports, newest first.
    History {
        /// Subject (child) identifier.
        subject: String,
        #[command(flatten)]
        output: StoreArgs,
    },
    /// Show one stored report.
    Show {
        /// Analysis identifier printed by `analyze`.
        id: uuid::Uuid,
        #[command(flatten)]
        output: StoreArgs,
    },
}

#[derive(Args)]
struct StoreArgs {
    /// Report directory.
    #[arg(long)]
    store: PathBuf,

    /// Print JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Input drawings (PNG, JPEG, BMP, WebP).
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Subject (child) the drawings belong to.
    #[arg(long)]
    subject: String,

    /// Persist reports to this directory.
    #[arg(long)]
    store: Option<PathBuf>,

    /// Print JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    /// Gaussian sigma of the preprocessing noise reduction.
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_PREPROCESS_BLUR_SIGMA)]
    preprocess_blur_sigma: f32,

    /// Linear contrast gain.
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_CONTRAST_GAIN)]
    contrast_gain: f32,

    /// Gaussian sigma before edge detection.
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_EDGE_BLUR_SIGMA)]
    edge_blur_sigma: f32,

    /// Canny low threshold.
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_CANNY_LOW)]
    canny_low: f32,

    /// Canny high threshold.
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_CANNY_HIGH)]
    canny_high: f32,

    /// Contours at or below this area (square pixels) are dropped.
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_MIN_CONTOUR_AREA)]
    min_contour_area: f64,

    /// Color buckets at or below this percentage are dropped.
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_NOISE_FLOOR_PERCENT)]
    noise_floor_percent: f64,

    /// Polygon approximation tolerance as a fraction of the perimeter.
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_APPROX_EPSILON_RATIO)]
    approx_epsilon_ratio: f64,

    /// Off-center fraction before a shape counts as left/right/top/bottom.
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_POSITION_MARGIN)]
    position_margin: f64,

    /// Full analysis config as a JSON string.
    ///
    /// When provided, all other threshold flags are ignored. Missing
    /// fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,
}

/// Build an [`AnalysisConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual threshold flags are ignored.
fn config_from_cli(args: &AnalyzeArgs) -> Result<AnalysisConfig, String> {
    if let Some(ref json) = args.config_json {
        return serde_json::from_str(json)
            .map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(AnalysisConfig {
        preprocess_blur_sigma: args.preprocess_blur_sigma,
        contrast_gain: args.contrast_gain,
        edge_blur_sigma: args.edge_blur_sigma,
        canny_low: args.canny_low,
        canny_high: args.canny_high,
        min_contour_area: args.min_contour_area,
        noise_floor_percent: args.noise_floor_percent,
        approx_epsilon_ratio: args.approx_epsilon_ratio,
        position_margin: args.position_margin,
    })
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze(args) => analyze(&args),
        Command::History { subject, output } => match JsonDirReportStore::open(&output.store) {
            Ok(store) => match store.find_by_subject(&subject) {
                Ok(reports) => {
                    if reports.is_empty() {
                        eprintln!("No reports for subject {subject}");
                    }
                    print_all(&reports, output.json)
                }
                Err(e) => fail(&format!("Error reading reports: {e}")),
            },
            Err(e) => fail(&format!("Error opening store: {e}")),
        },
        Command::Show { id, output } => match JsonDirReportStore::open(&output.store) {
            Ok(store) => match store.find_by_id(id) {
                Ok(Some(stored)) => print_all(&[stored], output.json),
                Ok(None) => fail(&format!("No report with id {id}")),
                Err(e) => fail(&format!("Error reading report: {e}")),
            },
            Err(e) => fail(&format!("Error opening store: {e}")),
        },
    }
}

fn analyze(args: &AnalyzeArgs) -> ExitCode {
    let config = match config_from_cli(args) {
        Ok(c) => c,
        Err(msg) => return fail(&msg),
    };
    let analyzer = match Analyzer::new(config) {
        Ok(a) => a,
        Err(e) => return fail(&format!("Error: {e}")),
    };

    match &args.store {
        Some(dir) => match JsonDirReportStore::open(dir) {
            Ok(store) => analyze_all(&AnalysisService::new(analyzer, store), args, true),
            Err(e) => fail(&format!("Error opening store: {e}")),
        },
        None => analyze_all(
            &AnalysisService::new(analyzer, InMemoryReportStore::new()),
            args,
            false,
        ),
    }
}

/// Analyze every image, continuing past failures.
///
/// `persisted` is false when the store is discarded on exit; those
/// reports are printed without an id.
fn analyze_all<S: ReportStore>(
    service: &AnalysisService<S>,
    args: &AnalyzeArgs,
    persisted: bool,
) -> ExitCode {
    let mut failed = 0usize;
    for path in &args.images {
        match service.analyze_file(path, &args.subject, Utc::now()) {
            Ok(stored) => {
                if let Err(msg) = print_report(&stored, persisted, args.json) {
                    eprintln!("{msg}");
                    failed += 1;
                }
            }
            Err(e) => {
                eprintln!("Error analyzing {}: {e}", path.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        eprintln!("{failed} of {} drawings failed", args.images.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_all(reports: &[StoredReport], json: bool) -> ExitCode {
    for stored in reports {
        if let Err(msg) = print_report(stored, true, json) {
            return fail(&msg);
        }
    }
    ExitCode::SUCCESS
}

/// Print one report. Unpersisted reports are printed without their id.
fn print_report(stored: &StoredReport, persisted: bool, json: bool) -> Result<(), String> {
    if json {
        let text = if persisted {
            serde_json::to_string_pretty(stored)
        } else {
            serde_json::to_string_pretty(&stored.report)
        }
        .map_err(|e| format!("Error serializing report: {e}"))?;
        println!("{text}");
    } else {
        println!("{}", render(stored, persisted));
    }
    Ok(())
}

fn fail(msg: &str) -> ExitCode {
    eprintln!("{msg}");
    ExitCode::FAILURE
}

/// Human-readable rendering of a report.
fn render(stored: &StoredReport, persisted: bool) -> String {
    let r: &AnalysisReport = &stored.report;
    let mut out = String::new();

    // Writing to a String cannot fail.
    if persisted {
        let _ = writeln!(out, "Analysis {} (subject {})", stored.id, stored.subject_id);
    } else {
        let _ = writeln!(
            out,
            "Analysis for subject {} (not stored; pass --store to keep it)",
            stored.subject_id
        );
    }
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, "Taken:     {}", r.timestamp.to_rfc3339());
    let _ = writeln!(out, "Image:     {}x{}", r.dimensions.width, r.dimensions.height);
    let _ = writeln!(out, "Summary:   {}", r.summary);
    if !r.degraded.is_empty() {
        let stages: Vec<&str> = r.degraded.iter().map(|s| s.as_str()).collect();
        let _ = writeln!(out, "Degraded:  {}", stages.join(", "));
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Colors (dominant {}, intensity {:.2})",
        r.colors.dominant_color, r.colors.intensity
    );
    for bucket in &r.colors.buckets {
        let _ = writeln!(out, "  {:<10} {:>6.2}%", bucket.color.as_str(), bucket.percentage);
    }
    for line in &r.colors.interpretations {
        let _ = writeln!(out, "  - {line}");
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<12} {:>6} {:>10} {:>8} {:>6}",
        "Shape", "Count", "Avg size", "Position", "Conf"
    );
    for s in &r.shapes {
        let _ = writeln!(
            out,
            "{:<12} {:>6} {:>10.1} {:>8} {:>6.2}",
            s.kind.as_str(),
            s.count,
            s.average_size,
            s.position.as_str(),
            s.confidence
        );
    }

    if !r.symbols.is_empty() {
        let names: Vec<&str> = r.symbols.iter().map(|s| s.kind.as_str()).collect();
        let _ = writeln!(out, "Symbols:   {}", names.join(", "));
    }
    let _ = writeln!(
        out,
        "Layout:    balance {}, space {}, pressure {}",
        r.composition.balance, r.composition.space_usage, r.composition.pressure
    );
    for line in r
        .composition
        .indicators
        .iter()
        .chain(&r.psychological_indicators)
    {
        let _ = writeln!(out, "  - {line}");
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Emotions (dominant {}, state {})",
        r.emotions.dominant_emotion, r.emotions.state
    );
    for (emotion, score) in r.emotions.scores.iter() {
        let _ = writeln!(out, "  {:<10} {score:.2}", emotion.as_str());
    }

    let _ = writeln!(out);
    let attention = if r.risk.requires_attention { " (requires attention)" } else { "" };
    let _ = writeln!(out, "Risk:      {}{attention}", r.risk.level);
    for factor in &r.risk.risk_factors {
        let _ = writeln!(out, "  ! {factor}");
    }
    for rec in &r.risk.recommendations {
        let _ = writeln!(out, "  > {rec}");
    }

    out
}
