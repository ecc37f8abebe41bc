// Benchmark Report Types
// Structured output for independent analysis of arena behavior

use serde::Serialize;

// ─── Statistics (per-metric Monte Carlo aggregation) ────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n: 0 };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let stderr = std_dev / (n as f64).sqrt();
        let z = 1.96; // 95% CI
        Self {
            mean,
            std_dev,
            ci_lower: mean - z * stderr,
            ci_upper: mean + z * stderr,
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct BenchResult {
    pub scenario: String,
    pub name: String,
    pub category: String,
    pub seed: u64,
    pub pass: bool,
    pub error: Option<String>,
    pub entities: usize,
    pub samples: usize,
    pub frames: u64,
    pub compression: f64,
    pub hops: u32,
    pub hops_per_body: f64,
    pub stuns: u32,
    pub recoveries: u32,
    pub wall_clamps: u32,
    pub collisions: u32,
    pub peak_impact: f64,
    pub max_speed: f64,
    pub stunned_share: f64,
    pub hopping_share: f64,
    pub radius_violations: u32,
    pub speed_violations: u32,
    pub containment_violations: u32,
    pub non_finite: u32,
    pub final_radius_spread: f64,
    pub trend_concordance: f64,
    pub elapsed_ms: u128,
    pub frames_per_sec: f64,
}

// ─── Monte Carlo Report (per-scenario aggregation) ──────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloReport {
    pub scenario_name: String,
    pub label: String,
    pub category: String,
    pub n_runs: usize,
    pub pass_rate: f64,
    pub hops_per_body: Stats,
    pub stunned_share: Stats,
    pub wall_clamps: Stats,
    pub collisions: Stats,
    pub max_speed: Stats,
    pub radius_spread: Stats,
    pub trend_concordance: Stats,
    pub invariant_violations: Stats,
    pub elapsed_ms: Stats,
    pub frames_per_sec: Stats,
    pub individual_runs: Vec<BenchResult>,
}

// ─── Invariant Summary ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct InvariantSummary {
    pub radius_bounds_hold: bool,
    pub speed_cap_holds: bool,
    pub containment_holds: bool,
    pub all_finite: bool,
    pub setup_errors: usize,
}

impl InvariantSummary {
    pub fn from_reports(reports: &[MonteCarloReport]) -> Self {
        let runs = || reports.iter().flat_map(|r| r.individual_runs.iter());
        Self {
            radius_bounds_hold: runs().all(|r| r.radius_violations == 0),
            speed_cap_holds: runs().all(|r| r.speed_violations == 0),
            containment_holds: runs().all(|r| r.containment_violations == 0),
            all_finite: runs().all(|r| r.non_finite == 0),
            setup_errors: runs().filter(|r| r.error.is_some()).count(),
        }
    }

    pub fn all_pass(&self) -> bool {
        self.radius_bounds_hold
            && self.speed_cap_holds
            && self.containment_holds
            && self.all_finite
            && self.setup_errors == 0
    }
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub n_runs_per_scenario: usize,
    pub summary: Summary,
    pub invariants: InvariantSummary,
    pub scenarios: Vec<MonteCarloReport>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_from_samples() {
        let s = Stats::from_samples(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.mean, 2.5);
        assert!((s.std_dev - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!(s.ci_lower < s.mean && s.ci_upper > s.mean);
        assert_eq!((s.min, s.max, s.n), (1.0, 4.0, 4));
    }

    #[test]
    fn test_stats_empty_and_single() {
        assert_eq!(Stats::from_samples(&[]).n, 0);
        let one = Stats::from_samples(&[7.0]);
        assert_eq!((one.mean, one.std_dev, one.ci_lower), (7.0, 0.0, 7.0));
    }
}
