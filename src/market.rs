// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Mood Arena Simulation Suite - Market (derived + normalized series)

//! A [`Market`] is the only holder of normalized series. Building one runs the
//! metric engine over every entity and then the normalizer exactly once, so
//! nothing can sample a series that has not been normalized.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::adapter;
use crate::error::{DataError, PreconditionError};
use crate::metrics::MetricEngine;
use crate::normalizer::{NormalizationBounds, Normalizer};
use crate::sampler::TemporalSampler;
use crate::types::{DerivedSample, DerivedSeries, RawSeries, Signal};

#[derive(Debug, Clone)]
pub struct Market {
    series: BTreeMap<String, DerivedSeries>,
    bounds: NormalizationBounds,
}

impl Market {
    pub fn build(raws: Vec<RawSeries>, window: usize) -> Result<Self, DataError> {
        if raws.is_empty() {
            return Err(DataError::NoEntities);
        }
        let engine = MetricEngine::new(window);
        let mut series = BTreeMap::new();
        for raw in &raws {
            if raw.is_empty() {
                return Err(DataError::EmptySeries { entity: raw.entity().to_string() });
            }
            if series.insert(raw.entity().to_string(), engine.derive(raw)).is_some() {
                return Err(DataError::DuplicateEntity { entity: raw.entity().to_string() });
            }
        }
        let bounds = Normalizer::normalize(&mut series);
        tracing::debug!(entities = series.len(), window, "market built");
        Ok(Self { series, bounds })
    }

    /// Validate `(timestamp_ms, price)` pairs per entity, then build.
    pub fn from_pairs(
        pairs: &BTreeMap<String, Vec<(i64, f64)>>,
        window: usize,
    ) -> Result<Self, DataError> {
        let raws = pairs
            .iter()
            .map(|(entity, p)| RawSeries::from_pairs(entity.clone(), p))
            .collect::<Result<Vec<_>, _>>()?;
        Self::build(raws, window)
    }

    /// Same as [`Market::from_pairs`] for exchange quotes priced in `Decimal`.
    pub fn from_quotes(
        quotes: &BTreeMap<String, Vec<(i64, Decimal)>>,
        window: usize,
    ) -> Result<Self, DataError> {
        let raws = quotes
            .iter()
            .map(|(entity, q)| adapter::series_from_quotes(entity.clone(), q))
            .collect::<Result<Vec<_>, _>>()?;
        Self::build(raws, window)
    }

    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Normalized series for chart overlays.
    pub fn series(&self, entity: &str) -> Option<&[DerivedSample]> {
        self.series.get(entity).map(Vec::as_slice)
    }

    pub fn bounds(&self) -> NormalizationBounds {
        self.bounds
    }

    pub fn sample(&self, entity: &str, t_ms: f64) -> Result<Signal, PreconditionError> {
        let series = self
            .series
            .get(entity)
            .ok_or_else(|| PreconditionError::UnknownEntity(entity.to_string()))?;
        Ok(TemporalSampler::new(series)?.sample(t_ms))
    }

    /// Earliest first timestamp and latest last timestamp across entities.
    pub fn time_span(&self) -> (i64, i64) {
        let start = self.series.values().filter_map(|s| s.first()).map(|d| d.timestamp_ms).min();
        let end = self.series.values().filter_map(|s| s.last()).map(|d| d.timestamp_ms).max();
        (start.unwrap_or(0), end.unwrap_or(0))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs() -> BTreeMap<String, Vec<(i64, f64)>> {
        let mut m = BTreeMap::new();
        m.insert("FLAT".to_string(), (0..10).map(|i| (i * 1000, 5.0)).collect());
        m.insert(
            "UP".to_string(),
            (0..10).map(|i| (i * 1000 + 500, 5.0 * 1.05_f64.powi(i as i32))).collect(),
        );
        m
    }

    #[test]
    fn builds_and_orders_entities() {
        let market = Market::from_pairs(&pairs(), 4).unwrap();
        assert_eq!(market.entities().collect::<Vec<_>>(), vec!["FLAT", "UP"]);
        assert_eq!(market.series("UP").unwrap().len(), 10);
        assert_eq!(market.time_span(), (0, 9_500));
    }

    #[test]
    fn normalized_values_are_bounded() {
        let market = Market::from_pairs(&pairs(), 4).unwrap();
        for e in ["FLAT", "UP"] {
            for d in market.series(e).unwrap() {
                assert!((-1.0..=1.0).contains(&d.trend));
                assert!((0.0..=1.0).contains(&d.volatility));
            }
        }
        let up = market.sample("UP", 9_500.0).unwrap();
        let flat = market.sample("FLAT", 9_000.0).unwrap();
        assert!(up.trend > 0.0);
        assert!(flat.trend <= 0.0);
    }

    #[test]
    fn unknown_entity_is_precondition_error() {
        let market = Market::from_pairs(&pairs(), 4).unwrap();
        assert_eq!(
            market.sample("DOGE", 0.0).unwrap_err(),
            PreconditionError::UnknownEntity("DOGE".to_string())
        );
    }

    #[test]
    fn rejects_empty_input_and_bad_series() {
        assert_eq!(Market::build(Vec::new(), 4).unwrap_err(), DataError::NoEntities);

        let mut bad = pairs();
        bad.insert("BAD".to_string(), vec![(0, 1.0), (0, 2.0)]);
        assert!(matches!(
            Market::from_pairs(&bad, 4).unwrap_err(),
            DataError::NonMonotonic { .. }
        ));
    }

    #[test]
    fn rejects_repeated_entity() {
        let first = RawSeries::from_pairs("BTC", &[(0, 100.0), (1_000, 101.0)]).unwrap();
        let second =
            RawSeries::from_pairs("BTC", &[(0, 50.0), (1_000, 51.0), (2_000, 52.0)]).unwrap();
        let eth = RawSeries::from_pairs("ETH", &[(0, 10.0), (1_000, 11.0)]).unwrap();
        assert_eq!(
            Market::build(vec![first, eth, second], 4).unwrap_err(),
            DataError::DuplicateEntity { entity: "BTC".to_string() }
        );
    }

    #[test]
    fn decimal_quotes_build_the_same_market() {
        let mut quotes = BTreeMap::new();
        for (entity, p) in pairs() {
            let q = p.iter().map(|&(t, v)| (t, adapter::to_decimal(v))).collect::<Vec<_>>();
            quotes.insert(entity, q);
        }
        let from_quotes = Market::from_quotes(&quotes, 4).unwrap();
        let from_pairs = Market::from_pairs(&pairs(), 4).unwrap();
        assert_eq!(from_quotes.entities().collect::<Vec<_>>(), vec!["FLAT", "UP"]);
        let a = from_quotes.sample("UP", 7_250.0).unwrap();
        let b = from_pairs.sample("UP", 7_250.0).unwrap();
        assert!((a.trend - b.trend).abs() < 1e-9);
        assert!((a.price - b.price).abs() < 1e-9);
    }
}
