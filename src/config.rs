// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Mood Arena Simulation Suite - Configuration

//! Tunable parameters for the metric pipeline, per-body behavior, the arena
//! and the render clock. Every section defaults independently so a partial
//! JSON document is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// MetricParams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricParams {
    /// Rolling window length in samples (not time).
    pub window: usize,
}

impl Default for MetricParams {
    fn default() -> Self {
        Self { window: 24 }
    }
}

// ---------------------------------------------------------------------------
// BehaviorParams
// ---------------------------------------------------------------------------

/// Per-body behavior tuning. Speeds are in arena units per second, forces in
/// arena units of mass times acceleration, intervals in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorParams {
    pub base_radius: f64,
    pub r_min: f64,
    pub r_max: f64,
    /// Radius gain per unit of normalized trend.
    pub k_trend: f64,
    /// Fraction of the radius gap closed each step.
    pub alpha_radius: f64,
    /// EMA factor for volatility; slower than `alpha_radius`.
    pub alpha_volatility: f64,
    pub stability_epsilon: f64,
    /// Symmetric clamp applied to trend / smoothed volatility.
    pub stability_ratio_limit: f64,
    pub stun_enter_speed: f64,
    pub stun_recover_speed: f64,
    pub hop_frames: u32,
    /// Hop force per unit of cross-sectional area.
    pub hop_force_per_area: f64,
    pub weak_multiplier: f64,
    pub strong_multiplier: f64,
    /// Countdown after a hop for the least stable body.
    pub interval_short_ms: f64,
    /// Countdown after a hop for the most stable body.
    pub interval_long_ms: f64,
}

impl Default for BehaviorParams {
    fn default() -> Self {
        Self {
            base_radius: 48.0,
            r_min: 22.0,
            r_max: 96.0,
            k_trend: 0.6,
            alpha_radius: 0.08,
            alpha_volatility: 0.03,
            stability_epsilon: 0.05,
            stability_ratio_limit: 4.0,
            stun_enter_speed: 900.0,
            stun_recover_speed: 260.0,
            hop_frames: 6,
            hop_force_per_area: 1500.0,
            weak_multiplier: 0.55,
            strong_multiplier: 1.6,
            interval_short_ms: 550.0,
            interval_long_ms: 2600.0,
        }
    }
}

impl BehaviorParams {
    /// Non-finite fields fall back to their defaults and inverted ranges are
    /// swapped, so controllers built from unvalidated params never panic on a
    /// range draw or a clamp.
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let finite = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        let ordered = |lo: f64, hi: f64| if lo <= hi { (lo, hi) } else { (hi, lo) };

        let (r_min, r_max) = ordered(finite(self.r_min, d.r_min), finite(self.r_max, d.r_max));
        let (interval_short_ms, interval_long_ms) = ordered(
            finite(self.interval_short_ms, d.interval_short_ms),
            finite(self.interval_long_ms, d.interval_long_ms),
        );
        let limit = finite(self.stability_ratio_limit, d.stability_ratio_limit);

        Self {
            base_radius: finite(self.base_radius, d.base_radius),
            r_min,
            r_max,
            k_trend: finite(self.k_trend, d.k_trend),
            alpha_radius: finite(self.alpha_radius, d.alpha_radius),
            alpha_volatility: finite(self.alpha_volatility, d.alpha_volatility),
            stability_epsilon: finite(self.stability_epsilon, d.stability_epsilon),
            stability_ratio_limit: if limit > 0.0 { limit } else { d.stability_ratio_limit },
            stun_enter_speed: finite(self.stun_enter_speed, d.stun_enter_speed),
            stun_recover_speed: finite(self.stun_recover_speed, d.stun_recover_speed),
            hop_frames: self.hop_frames,
            hop_force_per_area: finite(self.hop_force_per_area, d.hop_force_per_area),
            weak_multiplier: finite(self.weak_multiplier, d.weak_multiplier),
            strong_multiplier: finite(self.strong_multiplier, d.strong_multiplier),
            interval_short_ms,
            interval_long_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// ArenaParams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaParams {
    pub width: f64,
    pub height: f64,
    /// Hard velocity cap enforced after every step.
    pub v_max: f64,
    pub density: f64,
    pub restitution: f64,
    pub friction: f64,
}

impl Default for ArenaParams {
    fn default() -> Self {
        Self {
            width: 1080.0,
            height: 1920.0,
            v_max: 1400.0,
            density: 1.0,
            restitution: 0.82,
            friction: 0.08,
        }
    }
}

// ---------------------------------------------------------------------------
// RenderParams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParams {
    pub fps: u32,
    /// Rendered length; the whole data history is compressed into it.
    pub duration_secs: f64,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self { fps: 30, duration_secs: 30.0 }
    }
}

impl RenderParams {
    pub fn dt(&self) -> f64 {
        1.0 / self.fps as f64
    }

    pub fn total_frames(&self) -> u64 {
        (self.duration_secs * self.fps as f64).round() as u64
    }
}

// ---------------------------------------------------------------------------
// MoodConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MoodConfig {
    pub metric: MetricParams,
    pub behavior: BehaviorParams,
    pub arena: ArenaParams,
    pub render: RenderParams,
    pub seed: u64,
}

impl MoodConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.behavior;
        let a = &self.arena;

        if self.metric.window < 2 {
            return invalid("metric.window", format!("must be >= 2, got {}", self.metric.window));
        }
        if !(b.r_min > 0.0) {
            return invalid("behavior.r_min", format!("must be positive, got {}", b.r_min));
        }
        if b.r_min > b.r_max {
            return invalid("behavior.r_max", format!("{} is below r_min {}", b.r_max, b.r_min));
        }
        if b.base_radius < b.r_min || b.base_radius > b.r_max {
            return invalid(
                "behavior.base_radius",
                format!("{} outside [{}, {}]", b.base_radius, b.r_min, b.r_max),
            );
        }
        for (field, alpha) in [
            ("behavior.alpha_radius", b.alpha_radius),
            ("behavior.alpha_volatility", b.alpha_volatility),
        ] {
            if !(alpha > 0.0 && alpha <= 1.0) {
                return invalid(field, format!("must lie in (0, 1], got {}", alpha));
            }
        }
        if !(b.stability_epsilon > 0.0) {
            return invalid("behavior.stability_epsilon", "must be positive".to_string());
        }
        if !(b.stability_ratio_limit > 0.0) {
            return invalid("behavior.stability_ratio_limit", "must be positive".to_string());
        }
        if !(b.stun_recover_speed < b.stun_enter_speed) {
            return invalid(
                "behavior.stun_recover_speed",
                format!("{} must be below stun_enter_speed {}", b.stun_recover_speed, b.stun_enter_speed),
            );
        }
        if b.hop_frames == 0 {
            return invalid("behavior.hop_frames", "must be at least 1".to_string());
        }
        if b.interval_short_ms < 0.0 || b.interval_short_ms > b.interval_long_ms {
            return invalid(
                "behavior.interval_short_ms",
                format!("need 0 <= {} <= {}", b.interval_short_ms, b.interval_long_ms),
            );
        }
        if !(a.v_max > 0.0) {
            return invalid("arena.v_max", format!("must be positive, got {}", a.v_max));
        }
        if !(a.density > 0.0) {
            return invalid("arena.density", format!("must be positive, got {}", a.density));
        }
        if a.width < 2.0 * b.r_max || a.height < 2.0 * b.r_max {
            return invalid(
                "arena",
                format!("{}x{} cannot hold a body of radius {}", a.width, a.height, b.r_max),
            );
        }
        if self.render.fps == 0 {
            return invalid("render.fps", "must be at least 1".to_string());
        }
        if !(self.render.duration_secs > 0.0) {
            return invalid("render.duration_secs", "must be positive".to_string());
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid { field, reason })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
