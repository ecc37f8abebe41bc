// Mood Arena Benchmark Runner v0.1.0 - invariant validation over synthetic markets
// Monte Carlo (N=30), seedable PRNG, per-frame audit trail
//
// Usage:
//   cargo run --release --bin bench                     # Run all scenarios (30 runs each)
//   cargo run --release --bin bench -- --runs 5         # Quick mode (5 runs each)
//   cargo run --release --bin bench -- FLASH_CRASH      # Filter by name
//   cargo run --release --bin bench -- --time-series    # Enable JSONL output
//   cargo run --release --bin bench -- --seed 42        # Custom base seed
//   cargo run --release --bin bench -- --verbose        # Engine logs to stderr

mod report;
mod scenarios;
mod monte_carlo;
mod market;
mod metrics;
mod time_series;

use report::*;
use scenarios::*;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    runs: usize,
    seed: u64,
    time_series: bool,
    verbose: bool,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        runs: 30,
        seed: 0,
        time_series: false,
        verbose: false,
        filter: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--runs" => {
                i += 1;
                if i < args.len() {
                    cli.runs = args[i].parse().unwrap_or(30);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            "--time-series" => {
                cli.time_series = true;
            }
            "--verbose" | "-v" => {
                cli.verbose = true;
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    let cli = parse_args();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let all_scenarios = scenarios();

    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios.iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower)
                          || s.label.to_lowercase().contains(&f_lower)
                          || s.category.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No scenarios match filter: {:?}", cli.filter);
        std::process::exit(1);
    }

    let ts_dir = if cli.time_series {
        let dir = std::path::Path::new("benchmark-results/time-series");
        Some(dir.to_path_buf())
    } else {
        None
    };

    println!("\n  Mood Arena Benchmark Runner v0.1.0");
    println!("  PRNG: ChaCha8Rng | Runs/scenario: {} | Base seed: {}", cli.runs, cli.seed);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!("  {:<36} {:>5} {:>9} {:>7} {:>8} {:>7} {:>7} {:>7}",
        "Scenario", "Pass%", "Hops/body", "Stun%", "MaxSpd", "Spread", "Concord", "Time");
    println!("  {}", "-".repeat(94));

    let suite_start = Instant::now();
    let mut mc_reports = Vec::new();

    for scenario in &to_run {
        let report = monte_carlo::run_monte_carlo(
            scenario,
            cli.runs,
            cli.seed,
            ts_dir.as_deref(),
        );

        let pass_pct = report.pass_rate * 100.0;
        let status = if report.pass_rate >= 1.0 { "PASS" } else { "FAIL" };

        println!("  {:<36} {:>4}% {:>9.1} {:>6.1}% {:>8.0} {:>7.1} {:>7.2} {:>5.0}ms  {}",
            report.label,
            pass_pct as u32,
            report.hops_per_body.mean,
            report.stunned_share.mean * 100.0,
            report.max_speed.max,
            report.radius_spread.mean,
            report.trend_concordance.mean,
            report.elapsed_ms.mean,
            status,
        );

        mc_reports.push(report);
    }

    let suite_elapsed = suite_start.elapsed();

    // ─── Summary ────────────────────────────────────────────────────────

    let invariants = InvariantSummary::from_reports(&mc_reports);
    let total = mc_reports.len();
    let passed = mc_reports.iter().filter(|r| r.pass_rate >= 1.0).count();
    let failed = total - passed;

    let mark = |ok: bool| if ok { "PASS" } else { "FAIL" };

    println!("  {}", "-".repeat(94));
    println!("  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s\n",
        total, passed, failed, suite_elapsed.as_secs_f64());

    println!("  Arena Invariants:");
    println!("    Radius within [r_min, r_max]: {}", mark(invariants.radius_bounds_hold));
    println!("    Speed <= v_max:               {}", mark(invariants.speed_cap_holds));
    println!("    Bodies inside arena:          {}", mark(invariants.containment_holds));
    println!("    All state finite:             {}", mark(invariants.all_finite));
    println!("    Setup errors:                 {}\n", invariants.setup_errors);

    // ─── Write JSON Report ──────────────────────────────────────────────

    let ts = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_millis();
    let timestamp = format!("{}", ts);

    let report = BenchReport {
        timestamp: timestamp.clone(),
        version: "0.1.0",
        prng: "ChaCha8Rng",
        n_runs_per_scenario: cli.runs,
        summary: Summary {
            total,
            passed,
            failed,
            pass_rate: passed as f64 / total as f64,
        },
        invariants,
        scenarios: mc_reports,
    };

    let dir = std::path::Path::new("benchmark-results");
    if !dir.exists() {
        std::fs::create_dir_all(dir).expect("Failed to create benchmark-results/");
    }
    let path = dir.join(format!("bench-{}.json", timestamp));
    let json = serde_json::to_string_pretty(&report).expect("Failed to serialize");
    std::fs::write(&path, &json).expect("Failed to write benchmark file");
    println!("  Results saved to: {}\n", path.display());

    if failed > 0 || !report.invariants.all_pass() {
        std::process::exit(1);
    }
}
