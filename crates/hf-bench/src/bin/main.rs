//! Standalone benchmark runner.
//!
//! Usage: `hf-bench [output.json]`. Without an argument the report is written
//! to `benchmarks/baseline.json` under the workspace root.

use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

use hf_bench::{default_benchmarks, run_suite, BenchOptions};
use hf_core::timing;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    timing::enable_timing();

    let crate_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let repo_root = crate_path
        .parent()
        .and_then(|p| p.parent())
        .ok_or("Could not determine repo root")?
        .to_path_buf();
    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| repo_root.join("benchmarks").join("baseline.json"));

    let options = BenchOptions::default();
    let benchmarks = default_benchmarks();
    println!("Reservoir Benchmark Suite");
    println!("=========================\n");
    println!(
        "Running {} scenarios x {} solvers, {} runs each...\n",
        benchmarks.len(),
        options.solvers.len(),
        options.runs
    );

    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)?
        .as_secs();
    let suite = run_suite(&benchmarks, &options, format!("timestamp_{timestamp}"))?;

    for result in &suite.results {
        let agg = &result.aggregate;
        println!("{} [{}]", result.scenario_id, result.label());
        println!(
            "  Total time:  {:.4}s (median), min: {:.4}s, max: {:.4}s",
            agg.total_time_median_s, agg.total_time_min_s, agg.total_time_max_s
        );
        if let Some(solve) = agg.solve_time_median_s {
            println!("  Solve time:  {solve:.4}s (median)");
        }
        if let Some(rate) = agg.steps_per_second {
            println!("  Throughput:  {rate:.0} steps/s");
        }
    }
    print!("\nLast run counters\n{}", timing::solver_timing::summary());

    println!("\nBackend agreement");
    for c in &suite.comparisons {
        println!(
            "  {:<12} {} vs {}: max |dS| = {:e}",
            c.scenario_id, c.reference, c.fast, c.max_abs_difference
        );
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output, serde_json::to_string_pretty(&suite)?)?;
    println!("\nReport saved to: {}", output.display());

    Ok(())
}
