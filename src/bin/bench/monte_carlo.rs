// Monte Carlo Infrastructure - N runs per scenario with statistical aggregation
// Each scenario runs N times with seeds base..base+N, computing mean ± 95% CI

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use mood_engine::*;

use crate::report::*;
use crate::scenarios::Scenario;
use crate::market::MarketGenerator;
use crate::metrics::{radius_spread, trend_concordance, EventTracker, InvariantTracker};
use crate::time_series::TimeSeriesRecorder;

use std::time::Instant;

/// Run a single scenario iteration with a specific seed.
pub fn run_single(
    scenario: &Scenario,
    seed: u64,
    time_series_dir: Option<&std::path::Path>,
) -> BenchResult {
    let start = Instant::now();
    let config = scenario.config(seed);

    // Market and arena share the seed so a run replays exactly
    let mut generator = MarketGenerator::new(ChaCha8Rng::seed_from_u64(seed));
    let pairs = generator.generate(scenario);

    let mut sim = match MoodSimulation::from_pairs(config.clone(), &pairs) {
        Ok(sim) => sim,
        Err(e) => {
            tracing::warn!(scenario = scenario.name, seed, error = %e, "setup failed");
            return failed_result(scenario, seed, e.to_string());
        }
    };

    let mut invariants = InvariantTracker::new(&config);
    let mut events = EventTracker::new();
    let mut time_series = time_series_dir.map(|_| TimeSeriesRecorder::new());
    let mut last_data_time = 0.0;

    sim.run_to_end(|result| {
        invariants.record_frame(result);
        events.record(&result.events);
        if let Some(ts) = time_series.as_mut() {
            ts.record(result);
        }
        last_data_time = result.data_time_ms;
    });

    // Write time series if enabled
    if let (Some(ts), Some(dir)) = (&time_series, time_series_dir) {
        let path = dir.join(format!("seed-{}.jsonl", seed));
        if let Err(e) = ts.write_jsonl(&path) {
            eprintln!("  Warning: failed to write time series: {}", e);
        }
    }

    let elapsed = start.elapsed();
    let elapsed_secs = elapsed.as_secs_f64().max(0.001);

    let bodies = sim.bodies();
    let entities = bodies.len();
    let spread = radius_spread(&bodies);
    let concordance = trend_concordance(&bodies, sim.market(), last_data_time);
    let hops_per_body = events.hops as f64 / entities.max(1) as f64;
    let stunned_share = invariants.stunned_share();

    // Evaluate pass/fail
    let c = &scenario.criteria;
    let mut pass = true;
    if c.require_radius_bounds && invariants.radius_violations > 0 {
        pass = false;
    }
    if c.require_speed_cap && invariants.speed_violations > 0 {
        pass = false;
    }
    if c.require_containment && invariants.containment_violations > 0 {
        pass = false;
    }
    if c.require_finite && invariants.non_finite > 0 {
        pass = false;
    }
    if let Some(min) = c.min_hops_per_body {
        if hops_per_body < min {
            pass = false;
        }
    }
    if let Some(max) = c.max_stunned_share {
        if stunned_share > max {
            pass = false;
        }
    }
    if let Some(min) = c.min_radius_spread {
        if spread < min {
            pass = false;
        }
    }
    if let Some(max) = c.max_radius_spread {
        if spread > max {
            pass = false;
        }
    }

    BenchResult {
        scenario: scenario.label.to_string(),
        name: scenario.name.to_string(),
        category: scenario.category.to_string(),
        seed,
        pass,
        error: None,
        entities,
        samples: scenario.samples,
        frames: sim.frame(),
        compression: sim.timeline().compression(),
        hops: events.hops,
        hops_per_body,
        stuns: events.stuns,
        recoveries: events.recoveries,
        wall_clamps: events.wall_clamps,
        collisions: events.collisions,
        peak_impact: events.peak_impact,
        max_speed: invariants.max_speed,
        stunned_share,
        hopping_share: invariants.hopping_share(),
        radius_violations: invariants.radius_violations,
        speed_violations: invariants.speed_violations,
        containment_violations: invariants.containment_violations,
        non_finite: invariants.non_finite,
        final_radius_spread: spread,
        trend_concordance: concordance,
        elapsed_ms: elapsed.as_millis(),
        frames_per_sec: sim.frame() as f64 / elapsed_secs,
    }
}

fn failed_result(scenario: &Scenario, seed: u64, error: String) -> BenchResult {
    BenchResult {
        scenario: scenario.label.to_string(),
        name: scenario.name.to_string(),
        category: scenario.category.to_string(),
        seed,
        pass: false,
        error: Some(error),
        entities: scenario.entities.len(),
        samples: scenario.samples,
        frames: 0,
        compression: 0.0,
        hops: 0,
        hops_per_body: 0.0,
        stuns: 0,
        recoveries: 0,
        wall_clamps: 0,
        collisions: 0,
        peak_impact: 0.0,
        max_speed: 0.0,
        stunned_share: 0.0,
        hopping_share: 0.0,
        radius_violations: 0,
        speed_violations: 0,
        containment_violations: 0,
        non_finite: 0,
        final_radius_spread: 0.0,
        trend_concordance: 0.0,
        elapsed_ms: 0,
        frames_per_sec: 0.0,
    }
}

/// Run Monte Carlo: N runs of a scenario, aggregate stats.
pub fn run_monte_carlo(
    scenario: &Scenario,
    n_runs: usize,
    base_seed: u64,
    time_series_base: Option<&std::path::Path>,
) -> MonteCarloReport {
    let ts_dir = time_series_base.map(|base| base.join(scenario.name.to_lowercase()));

    let mut results = Vec::with_capacity(n_runs);
    for i in 0..n_runs {
        let seed = base_seed + i as u64;
        let result = run_single(scenario, seed, ts_dir.as_deref());
        results.push(result);
    }

    aggregate(scenario, results)
}

/// Aggregate individual runs into a MonteCarloReport.
fn aggregate(scenario: &Scenario, results: Vec<BenchResult>) -> MonteCarloReport {
    let n = results.len();
    let passed = results.iter().filter(|r| r.pass).count();
    let pass_rate = passed as f64 / n.max(1) as f64;

    let stat = |f: fn(&BenchResult) -> f64| {
        Stats::from_samples(&results.iter().map(f).collect::<Vec<_>>())
    };

    MonteCarloReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        n_runs: n,
        pass_rate,
        hops_per_body: stat(|r| r.hops_per_body),
        stunned_share: stat(|r| r.stunned_share),
        wall_clamps: stat(|r| r.wall_clamps as f64),
        collisions: stat(|r| r.collisions as f64),
        max_speed: stat(|r| r.max_speed),
        radius_spread: stat(|r| r.final_radius_spread),
        trend_concordance: stat(|r| r.trend_concordance),
        invariant_violations: stat(|r| {
            (r.radius_violations + r.speed_violations + r.containment_violations + r.non_finite) as f64
        }),
        elapsed_ms: stat(|r| r.elapsed_ms as f64),
        frames_per_sec: stat(|r| r.frames_per_sec),
        individual_runs: results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::scenarios;

    fn scenario(name: &str) -> Scenario {
        scenarios().into_iter().find(|s| s.name == name).unwrap()
    }

    #[test]
    fn test_flat_line_passes_without_spread() {
        let r = run_single(&scenario("FLAT_LINE"), 0, None);
        assert!(r.error.is_none());
        assert!(r.pass, "{:?}", r);
        assert!(r.final_radius_spread < 1e-6);
    }

    #[test]
    fn test_sparse_history_runs_to_end() {
        let s = scenario("SPARSE_HISTORY");
        let r = run_single(&s, 1, None);
        assert!(r.error.is_none());
        assert_eq!(r.frames, s.config(1).render.total_frames());
        assert_eq!(r.radius_violations + r.speed_violations + r.containment_violations, 0);
    }

    #[test]
    fn test_monte_carlo_aggregates_every_run() {
        let report = run_monte_carlo(&scenario("TINY_ARENA"), 2, 5, None);
        assert_eq!(report.n_runs, 2);
        assert_eq!(report.individual_runs.len(), 2);
        assert_eq!(report.individual_runs[1].seed, 6);
        assert_eq!(report.invariant_violations.max, 0.0);
    }
}
