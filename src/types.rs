// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Mood Arena Simulation Suite - Type Definitions

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

// ─── Raw Series ──────────────────────────────────────────────────────────────

/// One price observation as delivered by the data-fetch collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub timestamp_ms: i64,
    pub price: f64,
}

/// Validated, immutable price history for one entity.
///
/// Timestamps are strictly increasing and every price is finite and positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawSeries {
    entity: String,
    samples: Vec<RawSample>,
}

impl RawSeries {
    pub fn new(entity: impl Into<String>, samples: Vec<RawSample>) -> Result<Self, DataError> {
        let entity = entity.into();
        if samples.is_empty() {
            return Err(DataError::EmptySeries { entity });
        }
        for (index, s) in samples.iter().enumerate() {
            if !s.price.is_finite() {
                return Err(DataError::NonFinitePrice { entity, index });
            }
            if s.price <= 0.0 {
                return Err(DataError::NonPositivePrice { entity, index, price: s.price });
            }
            if index > 0 {
                let previous = samples[index - 1].timestamp_ms;
                if s.timestamp_ms <= previous {
                    return Err(DataError::NonMonotonic {
                        entity,
                        index,
                        previous,
                        current: s.timestamp_ms,
                    });
                }
            }
        }
        Ok(Self { entity, samples })
    }

    /// Build from `(timestamp_ms, price)` pairs.
    pub fn from_pairs(entity: impl Into<String>, pairs: &[(i64, f64)]) -> Result<Self, DataError> {
        let samples = pairs
            .iter()
            .map(|&(timestamp_ms, price)| RawSample { timestamp_ms, price })
            .collect();
        Self::new(entity, samples)
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn samples(&self) -> &[RawSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// ─── Derived Series ──────────────────────────────────────────────────────────

/// Per-sample derived metrics. `trend` and `volatility` are raw after the
/// metric engine and rescaled in place by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedSample {
    pub timestamp_ms: i64,
    pub trend: f64,
    pub volatility: f64,
    pub price: f64,
}

pub type DerivedSeries = Vec<DerivedSample>;

// ─── Signal ──────────────────────────────────────────────────────────────────

/// Interpolated metrics at an arbitrary query time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Signal {
    pub trend: f64,
    pub volatility: f64,
    pub price: f64,
}

impl Signal {
    /// Replace values that must never reach force calculations.
    /// Non-finite trend becomes 0; non-finite or negative volatility becomes 0.
    pub fn sanitized(self) -> Self {
        let trend = if self.trend.is_finite() { self.trend } else { 0.0 };
        let volatility = if self.volatility.is_finite() && self.volatility > 0.0 {
            self.volatility
        } else {
            0.0
        };
        Self { trend, volatility, price: self.price }
    }

    pub fn is_clean(&self) -> bool {
        self.trend.is_finite() && self.volatility.is_finite() && self.volatility >= 0.0
    }
}

impl From<&DerivedSample> for Signal {
    fn from(s: &DerivedSample) -> Self {
        Self { trend: s.trend, volatility: s.volatility, price: s.price }
    }
}

// ─── Hop Phase (renderer-facing view of the behavior state) ──────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HopPhase {
    Idle = 0,
    Hopping = 1,
    Stunned = 2,
}

// ─── BodySnapshot ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub id: u32,
    pub entity: String,
    pub position: DVec2,
    pub radius: f64,
    pub velocity: DVec2,
    pub phase: HopPhase,
    pub stability: f64,
}

// ─── ArenaEvent ──────────────────────────────────────────────────────────────

/// Discrete events for the audio layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArenaEvent {
    HopStarted { body: u32, magnitude: f64, angle: f64 },
    WallClamp { body: u32, impact_speed: f64 },
    Collision { a: u32, b: u32, impact_speed: f64 },
    Stunned { body: u32, speed: f64 },
    Recovered { body: u32 },
}

// ─── TickResult ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TickResult {
    pub frame: u64,
    pub sim_time: f64,
    pub data_time_ms: f64,
    pub bodies: Vec<BodySnapshot>,
    pub events: Vec<ArenaEvent>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
