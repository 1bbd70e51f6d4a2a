use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "fem-sparse workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Benchmark the sequential and row-parallel builds side by side
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,
    },
}

/// Baseline name and the cargo feature it enables.
const VARIANTS: &[(&str, Option<&str>)] = &[("sequential", None), ("parallel", Some("parallel"))];

const BENCHES: &[&str] = &["assembly_benchmark", "multiply_benchmark"];

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench { quick, report_only } => {
            if !report_only {
                run_benchmarks(quick)?;
            }
            generate_report()?;
        }
    }

    Ok(())
}

fn run_benchmarks(quick: bool) -> Result<()> {
    println!("Running sequential vs parallel benchmarks...");

    for (baseline, feature) in VARIANTS {
        for bench in BENCHES {
            println!("\n>>> {bench} [{baseline}]");
            let start = Instant::now();

            let mut cmd = Command::new("cargo");
            cmd.env("CARGO_INCREMENTAL", "0");
            cmd.arg("bench").arg("--bench").arg(bench);
            if let Some(feature) = feature {
                cmd.arg("--features").arg(feature);
            }

            // Args for the test runner (Criterion) go after --
            cmd.arg("--");
            cmd.arg("--save-baseline").arg(baseline);

            if quick {
                cmd.arg("--measurement-time").arg("0.1");
                cmd.arg("--noplot");
                cmd.arg("--sample-size").arg("10");
            }

            let status = cmd
                .status()
                .with_context(|| format!("failed to run {bench} for {baseline}"))?;

            if status.success() {
                println!("Finished {bench} [{baseline}] in {:.2?}", start.elapsed());
            } else {
                eprintln!("Warning: {bench} failed for {baseline}");
            }
        }
    }

    Ok(())
}

/// Element throughput per workload, one slot per entry of `VARIANTS`.
type Throughputs = BTreeMap<String, [Option<f64>; 2]>;

fn generate_report() -> Result<()> {
    println!("\n>>> Generating Report...");

    let criterion_dir = Path::new("target/criterion");
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    let mut results = Throughputs::new();
    collect_results(criterion_dir, &mut results);

    let report_path = Path::new("benchmark_results/report.md");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(report_path)?;

    writeln!(file, "# Sequential vs Parallel Benchmark Report")?;
    writeln!(file)?;
    writeln!(file, "| Workload | sequential (elem/s) | parallel (elem/s) | speedup |")?;
    writeln!(file, "|---|---|---|---|")?;

    for (workload, [sequential, parallel]) in &results {
        let speedup = match (sequential, parallel) {
            (Some(s), Some(p)) if *s > 0.0 => format!("**{:.2}x**", p / s),
            _ => "-".to_string(),
        };
        writeln!(
            file,
            "| {workload} | {} | {} | {speedup} |",
            format_ops(*sequential),
            format_ops(*parallel),
        )?;
    }

    println!("Report written to {}", report_path.display());
    Ok(())
}

fn format_ops(ops: Option<f64>) -> String {
    match ops {
        Some(ops) if ops > 1_000_000.0 => format!("{:.2}M", ops / 1_000_000.0),
        Some(ops) if ops > 1_000.0 => format!("{:.2}K", ops / 1_000.0),
        Some(ops) => format!("{ops:.0}"),
        None => "N/A".to_string(),
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}

fn read_json(path: &Path) -> Option<serde_json::Value> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

fn collect_results(dir: &Path, results: &mut Throughputs) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_results(&path, results);
            continue;
        }
        if file_name(&path).as_deref() != Some("estimates.json") {
            continue;
        }

        // Layout: .../<workload>/<baseline>/estimates.json
        let Some(baseline_dir) = path.parent() else { continue };
        let Some(workload_dir) = baseline_dir.parent() else { continue };
        let (Some(baseline), Some(workload)) = (file_name(baseline_dir), file_name(workload_dir))
        else {
            continue;
        };
        let Some(variant) = VARIANTS.iter().position(|(name, _)| *name == baseline) else {
            continue;
        };

        // Element throughput, when the benchmark declared one.
        let elements = read_json(&workload_dir.join("benchmark.json"))
            .and_then(|json| json.get("throughput")?.get("Elements")?.as_f64());

        let Some(time_ns) = read_json(&path)
            .and_then(|json| json.get("mean")?.get("point_estimate")?.as_f64())
        else {
            continue;
        };
        if time_ns <= 0.0 {
            continue;
        }

        let metric = elements.unwrap_or(1.0) * 1e9 / time_ns;
        results.entry(workload).or_default()[variant] = Some(metric);
    }
}
