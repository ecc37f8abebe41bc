// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Mood Arena Simulation Suite - Metric Engine

//! Windowed trend and volatility over a single entity's price history.
//!
//! For sample `i` the window is `max(0, i - W + 1) ..= i`. Near the start of
//! the history the window is shorter than `W`; those early values are a best
//! effort approximation and less reliable than later ones.

use crate::types::{DerivedSample, DerivedSeries, RawSeries};

// ─── MetricEngine ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct MetricEngine {
    window: usize,
}

impl MetricEngine {
    /// A window of 0 is treated as 1.
    pub fn new(window: usize) -> Self {
        Self { window: window.max(1) }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Derive one sample per raw sample, same order and length.
    pub fn derive(&self, raw: &RawSeries) -> DerivedSeries {
        let log_prices: Vec<f64> = raw.samples().iter().map(|s| s.price.ln()).collect();

        raw.samples()
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let start = (i + 1).saturating_sub(self.window);
                let window = &log_prices[start..=i];
                DerivedSample {
                    timestamp_ms: s.timestamp_ms,
                    trend: log_slope(window),
                    volatility: log_return_std(window),
                    price: s.price,
                }
            })
            .collect()
    }
}

// ─── Window Statistics ───────────────────────────────────────────────────────

/// OLS slope of `values` against their index. 0 with fewer than 2 points.
pub fn log_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let mean_x = (nf - 1.0) / 2.0;
    // Offsets from the first value keep a flat window at exactly zero.
    let origin = values[0];
    let mean_y = values.iter().map(|v| v - origin).sum::<f64>() / nf;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (y - origin - mean_y);
        sxx += dx * dx;
    }
    if sxx == 0.0 {
        return 0.0;
    }
    sxy / sxx
}

/// Sample standard deviation of first differences. 0 with fewer than 2
/// differences.
pub fn log_return_std(values: &[f64]) -> f64 {
    if values.len() < 3 {
        return 0.0;
    }
    let returns: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let count = returns.len();
    let mean = returns.iter().sum::<f64>() / count as f64;
    let denom = (count - 1).max(1) as f64;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / denom;
    variance.sqrt()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
