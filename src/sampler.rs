// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Mood Arena Simulation Suite - Temporal Sampler

use serde::{Deserialize, Serialize};

use crate::error::PreconditionError;
use crate::types::{DerivedSample, Signal};

// ─── TemporalSampler ─────────────────────────────────────────────────────────

/// Continuous-time view over a timestamp-sorted derived series.
///
/// Queries between two samples interpolate linearly; queries outside the
/// series clamp to the first or last sample.
#[derive(Debug, Clone, Copy)]
pub struct TemporalSampler<'a> {
    series: &'a [DerivedSample],
}

impl<'a> TemporalSampler<'a> {
    pub fn new(series: &'a [DerivedSample]) -> Result<Self, PreconditionError> {
        if series.is_empty() {
            return Err(PreconditionError::EmptySeries);
        }
        Ok(Self { series })
    }

    pub fn sample(&self, t_ms: f64) -> Signal {
        let s = self.series;
        let first = &s[0];
        let last = &s[s.len() - 1];
        if t_ms.is_nan() || t_ms <= first.timestamp_ms as f64 {
            return first.into();
        }
        if t_ms >= last.timestamp_ms as f64 {
            return last.into();
        }

        // Count of samples at or before t; at least 1 and below len here.
        let idx = s.partition_point(|d| d.timestamp_ms as f64 <= t_ms);
        let left = &s[idx - 1];
        let right = &s[idx];
        if t_ms == left.timestamp_ms as f64 {
            return left.into();
        }
        let span = (right.timestamp_ms - left.timestamp_ms) as f64;
        if span <= 0.0 {
            return right.into();
        }
        let frac = (t_ms - left.timestamp_ms as f64) / span;
        Signal {
            trend: lerp(left.trend, right.trend, frac),
            volatility: lerp(left.volatility, right.volatility, frac),
            price: lerp(left.price, right.price, frac),
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

// ─── Timeline ────────────────────────────────────────────────────────────────

/// Maps simulation seconds onto data time so an arbitrarily long history can
/// play back over a fixed rendered duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub start_ms: i64,
    pub end_ms: i64,
    pub duration_secs: f64,
}

impl Timeline {
    pub fn new(start_ms: i64, end_ms: i64, duration_secs: f64) -> Self {
        Self { start_ms, end_ms: end_ms.max(start_ms), duration_secs }
    }

    /// Data milliseconds per simulated second.
    pub fn compression(&self) -> f64 {
        if self.duration_secs <= 0.0 {
            return 0.0;
        }
        (self.end_ms - self.start_ms) as f64 / self.duration_secs
    }

    pub fn data_time_at(&self, sim_secs: f64) -> f64 {
        if self.duration_secs <= 0.0 {
            return self.end_ms as f64;
        }
        let progress = (sim_secs / self.duration_secs).clamp(0.0, 1.0);
        self.start_ms as f64 + (self.end_ms - self.start_ms) as f64 * progress
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ts: i64, trend: f64, volatility: f64, price: f64) -> DerivedSample {
        DerivedSample { timestamp_ms: ts, trend, volatility, price }
    }

    fn series() -> Vec<DerivedSample> {
        vec![
            sample(1_000, -0.5, 0.2, 10.0),
            sample(2_000, 0.5, 0.4, 20.0),
            sample(4_000, 1.0, 0.0, 30.0),
        ]
    }

    #[test]
    fn empty_series_is_precondition_error() {
        assert_eq!(TemporalSampler::new(&[]).unwrap_err(), PreconditionError::EmptySeries);
    }

    #[test]
    fn clamps_outside_range() {
        let s = series();
        let sampler = TemporalSampler::new(&s).unwrap();
        assert_eq!(sampler.sample(-5.0), Signal::from(&s[0]));
        assert_eq!(sampler.sample(999.9), Signal::from(&s[0]));
        assert_eq!(sampler.sample(4_000.1), Signal::from(&s[2]));
        assert_eq!(sampler.sample(1e12), Signal::from(&s[2]));
    }

    #[test]
    fn exact_timestamps_return_samples() {
        let s = series();
        let sampler = TemporalSampler::new(&s).unwrap();
        for d in &s {
            assert_eq!(sampler.sample(d.timestamp_ms as f64), Signal::from(d));
        }
    }

    #[test]
    fn interpolates_between_samples() {
        let s = series();
        let sampler = TemporalSampler::new(&s).unwrap();
        let mid = sampler.sample(1_500.0);
        assert!((mid.trend - 0.0).abs() < 1e-12);
        assert!((mid.volatility - 0.3).abs() < 1e-12);
        assert!((mid.price - 15.0).abs() < 1e-12);

        let quarter = sampler.sample(2_500.0);
        assert!((quarter.trend - 0.625).abs() < 1e-12);
        assert!((quarter.price - 22.5).abs() < 1e-12);
    }

    #[test]
    fn single_sample_series() {
        let s = vec![sample(10, 0.3, 0.1, 5.0)];
        let sampler = TemporalSampler::new(&s).unwrap();
        assert_eq!(sampler.sample(0.0), Signal::from(&s[0]));
        assert_eq!(sampler.sample(10.0), Signal::from(&s[0]));
        assert_eq!(sampler.sample(99.0), Signal::from(&s[0]));
    }

    #[test]
    fn timeline_compresses_history() {
        let tl = Timeline::new(0, 3_600_000, 30.0);
        assert_eq!(tl.data_time_at(0.0), 0.0);
        assert_eq!(tl.data_time_at(15.0), 1_800_000.0);
        assert_eq!(tl.data_time_at(30.0), 3_600_000.0);
        assert_eq!(tl.data_time_at(60.0), 3_600_000.0);
        assert_eq!(tl.data_time_at(-1.0), 0.0);
        assert_eq!(tl.compression(), 120_000.0);
    }
}
