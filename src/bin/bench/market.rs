// Synthetic Market Generator - seedable geometric random walks
// Replaces live exchange quotes with log-normal price paths per scenario regime

use std::collections::BTreeMap;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::scenarios::{EntitySpec, Scenario};

/// Epoch for generated series: 2025-01-01T00:00:00Z.
const START_MS: i64 = 1_735_689_600_000;

pub struct MarketGenerator {
    rng: ChaCha8Rng,
}

impl MarketGenerator {
    pub fn new(rng: ChaCha8Rng) -> Self {
        Self { rng }
    }

    /// One `(timestamp_ms, price)` series per scenario entity.
    pub fn generate(&mut self, scenario: &Scenario) -> BTreeMap<String, Vec<(i64, f64)>> {
        scenario
            .entities
            .iter()
            .map(|spec| (spec.name.clone(), self.walk(spec, scenario)))
            .collect()
    }

    fn walk(&mut self, spec: &EntitySpec, scenario: &Scenario) -> Vec<(i64, f64)> {
        let total = scenario.samples;
        let mut price = spec.start_price;
        let mut out = Vec::with_capacity(total);

        for i in 0..total {
            if i > 0 {
                let shock = scenario.drift_curve.map_or(0.0, |f| f(i, total));
                let vol = spec.volatility * scenario.vol_curve.map_or(1.0, |f| f(i, total));
                let step = spec.drift + shock + vol * gaussian(&mut self.rng);
                price *= step.exp();
            }
            out.push((START_MS + i as i64 * scenario.interval_ms, price));
        }
        out
    }
}

/// Standard normal draw via Box-Muller.
fn gaussian(rng: &mut ChaCha8Rng) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
