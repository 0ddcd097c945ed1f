use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use ghostcolor::graph::generators;
use ghostcolor::{color_cluster, ColoringConfig, ColoringStats};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "ghostcolor workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the coloring benchmarks with and without the `parallel` feature
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,
    },
    /// Color a generated grid over in-process ranks and print per-rank statistics
    Demo {
        /// Grid rows
        #[arg(long, default_value_t = 64)]
        rows: usize,

        /// Grid columns
        #[arg(long, default_value_t = 64)]
        cols: usize,

        /// Number of ranks
        #[arg(long, default_value_t = 4)]
        ranks: usize,

        /// Use a random graph with this many edges instead of a grid
        #[arg(long)]
        random_edges: Option<usize>,

        /// JSON configuration file (defaults apply otherwise)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the tie-break seed
        #[arg(long)]
        seed: Option<u64>,

        /// Write all ranks' statistics to this JSON file
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

/// Benchmark variants: (baseline name, cargo feature list).
const VARIANTS: &[(&str, &str)] = &[("serial", ""), ("parallel", "parallel")];

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench { quick, report_only } => {
            if !report_only {
                run_benchmarks(quick)?;
            }
            generate_report()?;
        }
        Commands::Demo {
            rows,
            cols,
            ranks,
            random_edges,
            config,
            seed,
            json,
        } => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("ghostcolor=info")),
                )
                .init();
            run_demo(rows, cols, ranks, random_edges, config.as_deref(), seed, json.as_deref())?;
        }
    }

    Ok(())
}

fn run_benchmarks(quick: bool) -> Result<()> {
    println!("Running coloring benchmarks...");

    for (baseline, features) in VARIANTS {
        println!("\n>>> Benchmarking variant: {baseline}");
        let start = Instant::now();

        let mut cmd = Command::new("cargo");
        cmd.env("CARGO_INCREMENTAL", "0");
        cmd.args(["bench", "--bench", "coloring_benchmark"]);
        if !features.is_empty() {
            cmd.args(["--features", features]);
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
            .with_context(|| format!("Failed to run bench for {baseline}"))?;

        if status.success() {
            println!("Finished {baseline} in {:.2?}", start.elapsed());
        } else {
            eprintln!("Warning: Benchmark failed for {baseline}");
        }
    }

    Ok(())
}

fn generate_report() -> Result<()> {
    println!("\n>>> Generating Report...");
    let mut results: HashMap<String, HashMap<String, f64>> = HashMap::new();

    let criterion_dir = Path::new("target/criterion");
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    collect_results(criterion_dir, criterion_dir, &mut results);

    let report_path = Path::new("benchmark_results/report.md");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }

    use std::io::Write;
    let mut file = fs::File::create(report_path)?;

    writeln!(file, "# Coloring Benchmark Report")?;
    writeln!(file)?;

    let mut workloads: Vec<_> = results.keys().collect();
    workloads.sort();

    write!(file, "| Workload |")?;
    for (name, _) in VARIANTS {
        write!(file, " {name} (vertices/s) | vs serial |")?;
    }
    writeln!(file)?;

    write!(file, "|---|")?;
    for _ in VARIANTS {
        write!(file, "---|---|")?;
    }
    writeln!(file)?;

    for workload in workloads {
        write!(file, "| {workload} |")?;
        let by_variant = &results[workload];
        let serial = by_variant.get("serial").copied().unwrap_or(0.0);

        for (name, _) in VARIANTS {
            match by_variant.get(*name) {
                Some(&rate) => {
                    let rel = if serial > 0.0 { rate / serial } else { 0.0 };
                    write!(file, " {} | **{rel:.2}x** |", format_rate(rate))?;
                }
                None => write!(file, " N/A | - |")?,
            }
        }
        writeln!(file)?;
    }

    println!("Report written to {}", report_path.display());
    Ok(())
}

fn format_rate(rate: f64) -> String {
    if rate > 1_000_000.0 {
        format!("{:.2}M", rate / 1_000_000.0)
    } else if rate > 1_000.0 {
        format!("{:.2}K", rate / 1_000.0)
    } else {
        format!("{rate:.0}")
    }
}

/// Walks `target/criterion/<benchmark id>/<baseline>/estimates.json`.
fn collect_results(root: &Path, dir: &Path, results: &mut HashMap<String, HashMap<String, f64>>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_results(root, &path, results);
            continue;
        }
        if path.file_name().and_then(|s| s.to_str()) != Some("estimates.json") {
            continue;
        }
        let Some(baseline_dir) = path.parent() else { continue };
        let Some(workload_dir) = baseline_dir.parent() else { continue };
        let Some(baseline) = dir_name(baseline_dir) else { continue };
        let Ok(workload) = workload_dir.strip_prefix(root) else { continue };
        let workload = workload.display().to_string();
        if !VARIANTS.iter().any(|(name, _)| *name == baseline) {
            continue;
        }

        let elements = read_json(&baseline_dir.join("benchmark.json"))
            .and_then(|json| json.get("throughput")?.get("Elements")?.as_f64())
            .unwrap_or(1.0);
        let time_ns = read_json(&path)
            .and_then(|json| json.get("mean")?.get("point_estimate")?.as_f64())
            .unwrap_or(0.0);
        if time_ns > 0.0 {
            results
                .entry(workload)
                .or_default()
                .insert(baseline, elements * 1e9 / time_ns);
        }
    }
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name()?.to_str().map(str::to_owned)
}

fn read_json(path: &Path) -> Option<serde_json::Value> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

#[derive(Serialize)]
struct DemoReport<'a> {
    vertices: usize,
    ranks: usize,
    config: &'a ColoringConfig,
    stats: Vec<&'a ColoringStats>,
}

fn run_demo(
    rows: usize,
    cols: usize,
    ranks: usize,
    random_edges: Option<usize>,
    config_path: Option<&Path>,
    seed: Option<u64>,
    json: Option<&Path>,
) -> Result<()> {
    anyhow::ensure!(ranks > 0, "at least one rank is required");

    let mut config = match config_path {
        Some(path) => ColoringConfig::from_path(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ColoringConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    config.verbose = true;
    config.validate = true;

    let adj = match random_edges {
        Some(edges) => generators::random(rows * cols, edges, config.seed),
        None => generators::grid(rows, cols),
    };
    println!(
        "Coloring {} vertices (max degree {}) over {ranks} ranks",
        adj.len(),
        generators::max_degree(&adj)
    );

    let (ownership, locals) = generators::partition_blocks(&adj, ranks);
    let start = Instant::now();
    let outcomes =
        color_cluster(&ownership, &locals, &config).context("Distributed coloring failed")?;
    let elapsed = start.elapsed();

    let rounds = outcomes.first().map_or(0, |o| o.stats.rounds);
    let colors = outcomes.first().map_or(0, |o| o.stats.num_colors);
    println!("Done in {elapsed:.2?}: {colors} colors after {rounds} recolor rounds");
    for outcome in &outcomes {
        let summary = outcome.summary();
        println!(
            "[rank {}] owned={} colors={} balance={:.3}",
            outcome.stats.rank,
            outcome.colors.len(),
            summary.num_colors,
            summary.balance_factor()
        );
    }

    if let Some(path) = json {
        let report = DemoReport {
            vertices: adj.len(),
            ranks,
            config: &config,
            stats: outcomes.iter().map(|o| &o.stats).collect(),
        };
        let content = serde_json::to_string_pretty(&report)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Statistics written to {}", path.display());
    }

    Ok(())
}
