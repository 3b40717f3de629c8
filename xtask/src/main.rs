use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "slabgraph workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the benches with and without the `parallel` feature and compare them
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,
    },
}

/// A build configuration to benchmark: criterion baseline name and cargo feature flags.
struct Variant {
    baseline: &'static str,
    cargo_args: &'static [&'static str],
}

const VARIANTS: &[Variant] = &[
    Variant {
        baseline: "sequential",
        cargo_args: &["--no-default-features"],
    },
    Variant {
        baseline: "parallel",
        cargo_args: &[],
    },
];

const BENCHES: &[&str] = &["scan_benchmark", "csr_benchmark", "dynamic_graph_benchmark"];

type Results = BTreeMap<String, BTreeMap<String, f64>>;

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
    for variant in VARIANTS {
        println!("\n>>> Benchmarking {} build", variant.baseline);
        let start = Instant::now();

        for bench in BENCHES {
            let mut cmd = Command::new("cargo");
            cmd.env("CARGO_INCREMENTAL", "0");
            cmd.args(["bench", "--bench", bench]).args(variant.cargo_args);

            // Criterion arguments go after --
            cmd.arg("--");
            cmd.arg("--save-baseline").arg(variant.baseline);
            if quick {
                cmd.arg("--measurement-time").arg("0.1");
                cmd.arg("--noplot");
                cmd.arg("--sample-size").arg("10");
            }

            let status = cmd
                .status()
                .with_context(|| format!("failed to launch {bench} for {}", variant.baseline))?;
            if !status.success() {
                bail!("{bench} failed for the {} build", variant.baseline);
            }
        }

        println!("Finished {} in {:.2?}", variant.baseline, start.elapsed());
    }

    Ok(())
}

fn generate_report() -> Result<()> {
    println!("\n>>> Generating report...");
    let criterion_dir = Path::new("target/criterion");
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    let mut results = Results::new();
    collect_results(criterion_dir, &mut results)?;

    let report_path = Path::new("benchmark_results/report.md");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(report_path)
        .with_context(|| format!("creating {}", report_path.display()))?;

    writeln!(file, "# Parallel vs Sequential Benchmark Report")?;
    writeln!(file)?;
    write!(file, "| Workload |")?;
    for variant in VARIANTS {
        write!(file, " {} (ops/s) |", variant.baseline)?;
    }
    writeln!(file, " speedup |")?;
    write!(file, "|---|")?;
    for _ in VARIANTS {
        write!(file, "---|")?;
    }
    writeln!(file, "---|")?;

    for (workload, by_variant) in &results {
        write!(file, "| {workload} |")?;
        for variant in VARIANTS {
            match by_variant.get(variant.baseline) {
                Some(ops) => write!(file, " {} |", format_ops(*ops))?,
                None => write!(file, " N/A |")?,
            }
        }
        match (by_variant.get("sequential"), by_variant.get("parallel")) {
            (Some(seq), Some(par)) if *seq > 0.0 => writeln!(file, " **{:.2}x** |", par / seq)?,
            _ => writeln!(file, " - |")?,
        }
    }

    println!("Report written to {}", report_path.display());
    Ok(())
}

fn format_ops(ops: f64) -> String {
    if ops > 1_000_000.0 {
        format!("{:.2}M", ops / 1_000_000.0)
    } else if ops > 1_000.0 {
        format!("{:.2}K", ops / 1_000.0)
    } else {
        format!("{ops:.0}")
    }
}

/// Walks `.../<workload>/<baseline>/estimates.json` files and records ops/s.
fn collect_results(dir: &Path, results: &mut Results) -> Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return Ok(()),
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_results(&path, results)?;
            continue;
        }
        if path.file_name().and_then(|s| s.to_str()) != Some("estimates.json") {
            continue;
        }
        let Some(baseline_dir) = path.parent() else { continue };
        let Some(workload_dir) = baseline_dir.parent() else { continue };
        let (Some(baseline), Some(workload)) = (dir_name(baseline_dir), dir_name(workload_dir)) else {
            continue;
        };
        if !VARIANTS.iter().any(|v| v.baseline == baseline) {
            continue;
        }

        let mut elements = 1.0;
        let bench_json = workload_dir.join("benchmark.json");
        if let Ok(content) = fs::read_to_string(&bench_json) {
            let json: serde_json::Value = serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", bench_json.display()))?;
            if let Some(t) = json.get("throughput").and_then(|t| t.get("Elements")) {
                elements = t.as_f64().unwrap_or(1.0);
            }
        }

        let content = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let json: serde_json::Value =
            serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        let time_ns = json
            .get("mean")
            .and_then(|m| m.get("point_estimate"))
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(0.0);
        if time_ns > 0.0 {
            results
                .entry(workload)
                .or_default()
                .insert(baseline, elements * 1e9 / time_ns);
        }
    }
    Ok(())
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name().map(|s| s.to_string_lossy().into_owned())
}
