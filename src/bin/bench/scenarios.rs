// Scenario Definitions - market regimes and arena stress cases
// Zero engine changes: all scenario logic lives in curve functions and config tweaks

use mood_engine::MoodConfig;

const MINUTE: i64 = 60_000;

const TICKERS: [&str; 12] = [
    "BTC", "ETH", "SOL", "BNB", "XRP", "ADA", "DOGE", "AVAX", "DOT", "LINK", "TRX", "ATOM",
];

// ─── Scenario Configuration ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EntitySpec {
    pub name: String,
    pub start_price: f64,
    /// Mean log return per sample.
    pub drift: f64,
    /// Std dev of the log return per sample.
    pub volatility: f64,
}

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub entities: Vec<EntitySpec>,
    pub samples: usize,
    pub interval_ms: i64,
    pub duration_secs: f64,
    pub window: usize,
    /// Extra log return added to every entity at `(sample, total)`.
    pub drift_curve: Option<fn(usize, usize) -> f64>,
    /// Volatility multiplier at `(sample, total)`.
    pub vol_curve: Option<fn(usize, usize) -> f64>,
    pub criteria: PassCriteria,
    /// Config overrides applied after the scenario defaults.
    pub tweak: Option<Box<dyn Fn(&mut MoodConfig) + Send + Sync>>,
}

impl Scenario {
    pub fn config(&self, seed: u64) -> MoodConfig {
        let mut config = MoodConfig::default();
        config.metric.window = self.window;
        config.render.duration_secs = self.duration_secs;
        config.seed = seed;
        if let Some(tweak) = &self.tweak {
            tweak(&mut config);
        }
        config
    }
}

pub struct PassCriteria {
    pub require_radius_bounds: bool,
    pub require_speed_cap: bool,
    pub require_containment: bool,
    pub require_finite: bool,
    pub min_hops_per_body: Option<f64>,
    pub max_stunned_share: Option<f64>,
    pub min_radius_spread: Option<f64>,
    pub max_radius_spread: Option<f64>,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            require_radius_bounds: true,
            require_speed_cap: true,
            require_containment: true,
            require_finite: true,
            min_hops_per_body: None,
            max_stunned_share: None,
            min_radius_spread: None,
            max_radius_spread: None,
        }
    }
}

// ─── Entity Builders ────────────────────────────────────────────────────────

fn ticker(i: usize) -> String {
    let base = TICKERS[i % TICKERS.len()];
    match i / TICKERS.len() {
        0 => base.to_string(),
        k => format!("{}{}", base, k),
    }
}

fn uniform(n: usize, drift: f64, volatility: f64) -> Vec<EntitySpec> {
    (0..n)
        .map(|i| EntitySpec {
            name: ticker(i),
            start_price: 10.0 * (1.0 + i as f64),
            drift,
            volatility,
        })
        .collect()
}

/// Drift spread evenly across `[-span, span]`.
fn spread(n: usize, span: f64, volatility: f64) -> Vec<EntitySpec> {
    (0..n)
        .map(|i| {
            let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.5 };
            EntitySpec {
                name: ticker(i),
                start_price: 100.0,
                drift: span * (2.0 * t - 1.0),
                volatility,
            }
        })
        .collect()
}

// ─── Curve Functions ────────────────────────────────────────────────────────

fn flash_crash_drift(sample: usize, total: usize) -> f64 {
    let p = sample as f64 / total.max(1) as f64;
    if (0.40..0.45).contains(&p) {
        -0.03
    } else if (0.45..0.60).contains(&p) {
        0.008
    } else {
        0.0
    }
}

fn storm_vol(sample: usize, total: usize) -> f64 {
    let p = sample as f64 / total.max(1) as f64;
    1.0 + 5.0 * (-((p - 0.5) / 0.12).powi(2)).exp()
}

fn boom_bust_drift(sample: usize, total: usize) -> f64 {
    let p = sample as f64 / total.max(1) as f64;
    0.004 * (p * std::f64::consts::TAU).sin()
}

// ─── Scenario List ──────────────────────────────────────────────────────────

pub fn scenarios() -> Vec<Scenario> {
    vec![
        // ─── Market Regimes ─────────────────────────────────────────────
        Scenario { name: "CALM_DRIFT", label: "Calm: 8 Assets, Low Vol", category: "regime",
            entities: spread(8, 0.0005, 0.001), samples: 1440, interval_ms: MINUTE,
            duration_secs: 30.0, window: 24, drift_curve: None, vol_curve: None,
            criteria: PassCriteria { min_hops_per_body: Some(5.0), max_stunned_share: Some(0.05), ..Default::default() },
            tweak: None },
        Scenario { name: "BULL_RUN", label: "Bull: Everything Up", category: "regime",
            entities: uniform(8, 0.002, 0.004), samples: 1440, interval_ms: MINUTE,
            duration_secs: 30.0, window: 24, drift_curve: None, vol_curve: None,
            criteria: PassCriteria { min_hops_per_body: Some(5.0), ..Default::default() },
            tweak: None },
        Scenario { name: "BEAR_MARKET", label: "Bear: Everything Down", category: "regime",
            entities: uniform(8, -0.002, 0.004), samples: 1440, interval_ms: MINUTE,
            duration_secs: 30.0, window: 24, drift_curve: None, vol_curve: None,
            criteria: PassCriteria { min_hops_per_body: Some(5.0), ..Default::default() },
            tweak: None },
        Scenario { name: "DIVERGENT_MOODS", label: "Divergent: Winners vs Losers", category: "regime",
            entities: spread(10, 0.004, 0.002), samples: 1440, interval_ms: MINUTE,
            duration_secs: 30.0, window: 24, drift_curve: None, vol_curve: None,
            criteria: PassCriteria { min_radius_spread: Some(20.0), ..Default::default() },
            tweak: None },
        Scenario { name: "BOOM_BUST", label: "Cycle: Boom then Bust", category: "regime",
            entities: uniform(6, 0.0, 0.003), samples: 2880, interval_ms: MINUTE,
            duration_secs: 30.0, window: 48, drift_curve: Some(boom_bust_drift), vol_curve: None,
            criteria: PassCriteria::default(),
            tweak: None },

        // ─── Shocks (2) ─────────────────────────────────────────────────
        Scenario { name: "FLASH_CRASH", label: "Shock: Flash Crash + Rebound", category: "shock",
            entities: uniform(8, 0.0002, 0.003), samples: 1440, interval_ms: MINUTE,
            duration_secs: 30.0, window: 24, drift_curve: Some(flash_crash_drift), vol_curve: None,
            criteria: PassCriteria::default(),
            tweak: None },
        Scenario { name: "VOL_STORM", label: "Shock: Volatility Storm", category: "shock",
            entities: spread(8, 0.001, 0.004), samples: 1440, interval_ms: MINUTE,
            duration_secs: 30.0, window: 24, drift_curve: None, vol_curve: Some(storm_vol),
            criteria: PassCriteria::default(),
            tweak: None },

        // ─── Degenerate Data (3) ────────────────────────────────────────
        Scenario { name: "FLAT_LINE", label: "Degenerate: Constant Prices", category: "degenerate",
            entities: uniform(5, 0.0, 0.0), samples: 600, interval_ms: MINUTE,
            duration_secs: 20.0, window: 24, drift_curve: None, vol_curve: None,
            criteria: PassCriteria { max_radius_spread: Some(1e-6), ..Default::default() },
            tweak: None },
        Scenario { name: "SPARSE_HISTORY", label: "Degenerate: 5 Samples, Window 24", category: "degenerate",
            entities: spread(4, 0.01, 0.01), samples: 5, interval_ms: 3_600_000,
            duration_secs: 20.0, window: 24, drift_curve: None, vol_curve: None,
            criteria: PassCriteria::default(),
            tweak: None },
        Scenario { name: "LONG_COMPRESSION", label: "Degenerate: 60 Days into 30s", category: "degenerate",
            entities: spread(6, 0.0002, 0.002), samples: 17_280, interval_ms: 5 * MINUTE,
            duration_secs: 30.0, window: 288, drift_curve: None, vol_curve: None,
            criteria: PassCriteria::default(),
            tweak: None },

        // ─── Arena Stress (3) ───────────────────────────────────────────
        Scenario { name: "CROWDED_ARENA", label: "Stress: 40 Bodies", category: "arena-stress",
            entities: spread(40, 0.003, 0.003), samples: 720, interval_ms: MINUTE,
            duration_secs: 30.0, window: 24, drift_curve: None, vol_curve: None,
            criteria: PassCriteria::default(),
            tweak: None },
        Scenario { name: "HAIR_TRIGGER_STUN", label: "Stress: Low Stun Threshold", category: "arena-stress",
            entities: spread(8, 0.002, 0.004), samples: 720, interval_ms: MINUTE,
            duration_secs: 30.0, window: 24, drift_curve: None, vol_curve: None,
            criteria: PassCriteria::default(),
            tweak: Some(Box::new(|c: &mut MoodConfig| {
                c.behavior.stun_enter_speed = 250.0;
                c.behavior.stun_recover_speed = 80.0;
                c.behavior.hop_force_per_area = 4000.0;
            })) },
        Scenario { name: "TINY_ARENA", label: "Stress: 12 Bodies in 400x400", category: "arena-stress",
            entities: spread(12, 0.003, 0.003), samples: 720, interval_ms: MINUTE,
            duration_secs: 30.0, window: 24, drift_curve: None, vol_curve: None,
            criteria: PassCriteria::default(),
            tweak: Some(Box::new(|c: &mut MoodConfig| {
                c.arena.width = 400.0;
                c.arena.height = 400.0;
                c.behavior.hop_force_per_area = 3000.0;
            })) },
    ]
}
