// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Mood Arena Simulation Suite - Cross-Entity Normalizer

//! Global percentile rescaling of trend and volatility.
//!
//! Trend maps onto `[-1, 1]` between its 5th and 95th percentile; volatility
//! maps onto `[0, 1]` between 0 and its 95th percentile. Bounds are computed
//! over every sample of every entity, so the normalizer needs the complete
//! set of derived series before it runs.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::DerivedSeries;

const TREND_LOW_PERCENTILE: f64 = 0.05;
const TREND_HIGH_PERCENTILE: f64 = 0.95;
const VOL_HIGH_PERCENTILE: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizationBounds {
    pub trend_low: f64,
    pub trend_high: f64,
    pub vol_high: f64,
}

impl NormalizationBounds {
    /// Compute bounds from every finite trend and volatility value.
    pub fn compute(series: &BTreeMap<String, DerivedSeries>) -> Self {
        let mut trends = Vec::new();
        let mut vols = Vec::new();
        for s in series.values() {
            for d in s {
                if d.trend.is_finite() {
                    trends.push(d.trend);
                }
                if d.volatility.is_finite() {
                    vols.push(d.volatility);
                }
            }
        }
        trends.sort_by(f64::total_cmp);
        vols.sort_by(f64::total_cmp);

        Self {
            trend_low: percentile(&trends, TREND_LOW_PERCENTILE),
            trend_high: percentile(&trends, TREND_HIGH_PERCENTILE),
            vol_high: percentile(&vols, VOL_HIGH_PERCENTILE).max(0.0),
        }
    }

    /// Clamp to `[trend_low, trend_high]` then map onto `[-1, 1]`.
    pub fn scale_trend(&self, trend: f64) -> f64 {
        let span = self.trend_high - self.trend_low;
        if !trend.is_finite() || !(span > 0.0) {
            return 0.0;
        }
        let clamped = trend.clamp(self.trend_low, self.trend_high);
        (2.0 * (clamped - self.trend_low) / span - 1.0).clamp(-1.0, 1.0)
    }

    /// Clamp to `[0, vol_high]` then map onto `[0, 1]`.
    pub fn scale_volatility(&self, volatility: f64) -> f64 {
        if !volatility.is_finite() || !(self.vol_high > 0.0) {
            return 0.0;
        }
        (volatility.clamp(0.0, self.vol_high) / self.vol_high).clamp(0.0, 1.0)
    }
}

// ─── Normalizer ──────────────────────────────────────────────────────────────

pub struct Normalizer;

impl Normalizer {
    /// Rescale trend and volatility of every sample in place and return the
    /// bounds that were applied.
    pub fn normalize(series: &mut BTreeMap<String, DerivedSeries>) -> NormalizationBounds {
        let bounds = NormalizationBounds::compute(series);
        for s in series.values_mut() {
            for d in s.iter_mut() {
                d.trend = bounds.scale_trend(d.trend);
                d.volatility = bounds.scale_volatility(d.volatility);
            }
        }
        tracing::debug!(
            trend_low = bounds.trend_low,
            trend_high = bounds.trend_high,
            vol_high = bounds.vol_high,
            entities = series.len(),
            "normalized derived series"
        );
        bounds
    }
}

// ─── Percentile ──────────────────────────────────────────────────────────────

/// Type 7 percentile (linear interpolation between order statistics) of an
/// ascending slice. `p` is a fraction in `[0, 1]`. Empty input yields 0.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let h = (n - 1) as f64 * p.clamp(0.0, 1.0);
            let lo = h.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            let frac = h - lo as f64;
            sorted[lo] + frac * (sorted[hi] - sorted[lo])
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DerivedSample;

    fn derived(values: &[(f64, f64)]) -> DerivedSeries {
        values
            .iter()
            .enumerate()
            .map(|(i, &(trend, volatility))| DerivedSample {
                timestamp_ms: i as i64,
                trend,
                volatility,
                price: 1.0,
            })
            .collect()
    }

    #[test]
    fn percentile_type7() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&v, 0.0), 1.0);
        assert_eq!(percentile(&v, 1.0), 5.0);
        assert_eq!(percentile(&v, 0.5), 3.0);
        // h = 4 * 0.95 = 3.8 -> 4 + 0.8
        assert!((percentile(&v, 0.95) - 4.8).abs() < 1e-12);
        assert_eq!(percentile(&[], 0.5), 0.0);
        assert_eq!(percentile(&[7.0], 0.05), 7.0);
    }

    #[test]
    fn outputs_stay_in_range() {
        let mut map = BTreeMap::new();
        map.insert("A".to_string(), derived(&[(-3.0, 0.0), (0.1, 0.5), (9.0, 12.0)]));
        map.insert("B".to_string(), derived(&[(0.2, 0.01), (0.3, 0.02), (-0.4, 0.9)]));
        Normalizer::normalize(&mut map);
        for d in map.values().flatten() {
            assert!((-1.0..=1.0).contains(&d.trend), "trend {}", d.trend);
            assert!((0.0..=1.0).contains(&d.volatility), "vol {}", d.volatility);
        }
    }

    #[test]
    fn identical_inputs_map_to_zero() {
        let mut map = BTreeMap::new();
        map.insert("A".to_string(), derived(&[(0.2, 0.0); 4]));
        map.insert("B".to_string(), derived(&[(0.2, 0.0); 4]));
        let bounds = Normalizer::normalize(&mut map);
        assert_eq!(bounds.trend_low, bounds.trend_high);
        assert_eq!(bounds.vol_high, 0.0);
        for d in map.values().flatten() {
            assert_eq!(d.trend, 0.0);
            assert_eq!(d.volatility, 0.0);
        }
    }

    #[test]
    fn flat_entity_below_rising_entity() {
        let mut map = BTreeMap::new();
        map.insert("FLAT".to_string(), derived(&[(0.0, 0.0); 3]));
        map.insert("UP".to_string(), derived(&[(0.0, 0.0), (0.09, 0.0), (0.09, 0.0)]));
        Normalizer::normalize(&mut map);
        assert!(map["FLAT"].iter().all(|d| d.trend <= 0.0));
        assert!(map["UP"][2].trend > 0.0);
    }

    #[test]
    fn non_finite_values_are_excluded_and_zeroed() {
        let mut map = BTreeMap::new();
        map.insert("A".to_string(), derived(&[(f64::NAN, f64::NAN), (0.1, 0.2), (0.3, 0.4)]));
        let bounds = Normalizer::normalize(&mut map);
        assert!(bounds.trend_low.is_finite() && bounds.vol_high.is_finite());
        assert_eq!(map["A"][0].trend, 0.0);
        assert_eq!(map["A"][0].volatility, 0.0);
    }

    #[test]
    fn rescaling_preserves_order() {
        let b = NormalizationBounds { trend_low: -0.5, trend_high: 0.5, vol_high: 2.0 };
        assert!(b.scale_trend(-0.1) < b.scale_trend(0.1));
        assert_eq!(b.scale_trend(-10.0), -1.0);
        assert_eq!(b.scale_trend(10.0), 1.0);
        assert_eq!(b.scale_trend(0.0), 0.0);
        assert_eq!(b.scale_volatility(1.0), 0.5);
        assert_eq!(b.scale_volatility(-1.0), 0.0);
        assert_eq!(b.scale_volatility(5.0), 1.0);
    }
}
