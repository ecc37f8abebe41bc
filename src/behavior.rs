// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Mood Arena Simulation Suite - Behavior Controller

//! Per-body state machine turning sampled (trend, volatility) into size and
//! hop actuation.
//!
//! ```text
//!            timer <= 0                   frames exhausted
//!   Idle ─────────────────▶ Hopping ─────────────────────────▶ Idle
//!    ▲  ╲                      │
//!    │   ╲ speed > stun_enter  │ speed > stun_enter
//!    │    ▼                    ▼
//!    └──────────── Stunned ◀───┘
//!     speed < stun_recover
//! ```
//!
//! The stun check runs before hop logic and suppresses force while stunned.

use std::f64::consts::{PI, TAU};

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::BehaviorParams;
use crate::types::{HopPhase, Signal};

// ─── HopState ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HopState {
    /// Waiting for the countdown to expire.
    Idle { timer_ms: f64 },
    /// Applying a fixed force for the remaining steps.
    Hopping { frames_remaining: u32, force_magnitude: f64, angle: f64 },
    /// Knocked senseless; no force until speed decays.
    Stunned,
}

impl HopState {
    pub fn phase(&self) -> HopPhase {
        match self {
            Self::Idle { .. } => HopPhase::Idle,
            Self::Hopping { .. } => HopPhase::Hopping,
            Self::Stunned => HopPhase::Stunned,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BehaviorEvent {
    HopStarted { magnitude: f64, angle: f64 },
    Stunned { speed: f64 },
    Recovered,
}

/// What the world applies to the body this step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorOutput {
    pub radius: f64,
    pub force: Option<DVec2>,
    pub event: Option<BehaviorEvent>,
}

// ─── BehaviorController ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct BehaviorController {
    params: BehaviorParams,
    radius: f64,
    smoothed_volatility: f64,
    stability: f64,
    state: HopState,
}

impl BehaviorController {
    /// Start Idle with a countdown drawn uniformly from the interval range so
    /// bodies do not hop in lockstep. Params are sanitized first.
    pub fn new<R: Rng + ?Sized>(params: BehaviorParams, rng: &mut R) -> Self {
        let params = params.sanitized();
        let timer_ms = rng.gen_range(params.interval_short_ms..=params.interval_long_ms);
        let radius = params.base_radius.clamp(params.r_min, params.r_max);
        Self {
            params,
            radius,
            smoothed_volatility: 0.0,
            stability: 0.5,
            state: HopState::Idle { timer_ms },
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn smoothed_volatility(&self) -> f64 {
        self.smoothed_volatility
    }

    /// Last normalized stability in `[0, 1]`.
    pub fn stability(&self) -> f64 {
        self.stability
    }

    pub fn state(&self) -> HopState {
        self.state
    }

    pub fn phase(&self) -> HopPhase {
        self.state.phase()
    }

    /// Advance one step. `dt` is in seconds, `speed` is the body's current
    /// speed before this step's force is applied.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        signal: Signal,
        dt: f64,
        speed: f64,
        rng: &mut R,
    ) -> BehaviorOutput {
        if !signal.is_clean() {
            tracing::warn!(?signal, "sanitizing corrupt signal");
        }
        let signal = signal.sanitized();
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let speed = if speed.is_nan() { 0.0 } else { speed };

        self.update_radius(signal.trend);
        self.smoothed_volatility +=
            (signal.volatility - self.smoothed_volatility) * self.params.alpha_volatility;
        self.stability = self.normalized_stability(signal.trend);

        let (state, force, event) = self.advance(dt, speed, rng);
        self.state = state;

        BehaviorOutput { radius: self.radius, force, event }
    }

    fn update_radius(&mut self, trend: f64) {
        let p = &self.params;
        let target = (p.base_radius * (1.0 + p.k_trend * trend)).clamp(p.r_min, p.r_max);
        self.radius += (target - self.radius) * p.alpha_radius;
        self.radius = self.radius.clamp(p.r_min, p.r_max);
    }

    /// 1 = strong calm uptrend, 0 = weak or declining and erratic.
    fn normalized_stability(&self, trend: f64) -> f64 {
        let limit = self.params.stability_ratio_limit;
        let ratio = trend / (self.smoothed_volatility + self.params.stability_epsilon);
        if !ratio.is_finite() {
            return 0.5;
        }
        ((ratio.clamp(-limit, limit) + limit) / (2.0 * limit)).clamp(0.0, 1.0)
    }

    fn advance<R: Rng + ?Sized>(
        &self,
        dt: f64,
        speed: f64,
        rng: &mut R,
    ) -> (HopState, Option<DVec2>, Option<BehaviorEvent>) {
        let p = &self.params;
        match self.state {
            HopState::Stunned => {
                if speed < p.stun_recover_speed {
                    let timer_ms = self.next_interval();
                    (HopState::Idle { timer_ms }, None, Some(BehaviorEvent::Recovered))
                } else {
                    (HopState::Stunned, None, None)
                }
            }
            _ if speed > p.stun_enter_speed => {
                (HopState::Stunned, None, Some(BehaviorEvent::Stunned { speed }))
            }
            HopState::Idle { timer_ms } => {
                let timer_ms = timer_ms - dt * 1000.0;
                if timer_ms > 0.0 {
                    return (HopState::Idle { timer_ms }, None, None);
                }
                let angle = rng.gen_range(0.0..TAU);
                let force_magnitude = self.hop_force();
                let (state, force) = self.hop_frame(p.hop_frames, force_magnitude, angle);
                let event = BehaviorEvent::HopStarted { magnitude: force_magnitude, angle };
                (state, force, Some(event))
            }
            HopState::Hopping { frames_remaining, force_magnitude, angle } => {
                let (state, force) = self.hop_frame(frames_remaining, force_magnitude, angle);
                (state, force, None)
            }
        }
    }

    fn hop_frame(
        &self,
        frames_remaining: u32,
        force_magnitude: f64,
        angle: f64,
    ) -> (HopState, Option<DVec2>) {
        if frames_remaining == 0 {
            return (HopState::Idle { timer_ms: self.next_interval() }, None);
        }
        let force = DVec2::new(angle.cos(), angle.sin()) * force_magnitude;
        let frames_remaining = frames_remaining - 1;
        let state = if frames_remaining == 0 {
            HopState::Idle { timer_ms: self.next_interval() }
        } else {
            HopState::Hopping { frames_remaining, force_magnitude, angle }
        };
        (state, Some(force))
    }

    /// Force scales with cross-sectional area and the stability multiplier.
    fn hop_force(&self) -> f64 {
        let p = &self.params;
        let area = PI * self.radius * self.radius;
        p.hop_force_per_area * area * lerp(p.weak_multiplier, p.strong_multiplier, self.stability)
    }

    /// Nervous bodies hop again soon, calm ones wait.
    fn next_interval(&self) -> f64 {
        lerp(self.params.interval_short_ms, self.params.interval_long_ms, self.stability)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const DT: f64 = 1.0 / 30.0;

    fn calm(trend: f64) -> Signal {
        Signal { trend, volatility: 0.0, price: 1.0 }
    }

    fn controller(seed: u64) -> (BehaviorController, ChaCha8Rng) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let c = BehaviorController::new(BehaviorParams::default(), &mut rng);
        (c, rng)
    }

    /// Step at rest until the first hop starts.
    fn run_until_hop(c: &mut BehaviorController, rng: &mut ChaCha8Rng, trend: f64) -> BehaviorOutput {
        for _ in 0..1_000 {
            let out = c.step(calm(trend), DT, 0.0, rng);
            if matches!(out.event, Some(BehaviorEvent::HopStarted { .. })) {
                return out;
            }
        }
        panic!("no hop within 1000 steps");
    }

    #[test]
    fn initial_timer_within_interval_range() {
        let p = BehaviorParams::default();
        for seed in 0..50 {
            let (c, _) = controller(seed);
            match c.state() {
                HopState::Idle { timer_ms } => {
                    assert!(timer_ms >= p.interval_short_ms && timer_ms <= p.interval_long_ms);
                }
                other => panic!("expected Idle, got {:?}", other),
            }
        }
    }

    #[test]
    fn unvalidated_params_do_not_panic() {
        let p = BehaviorParams {
            interval_short_ms: f64::NAN,
            interval_long_ms: f64::INFINITY,
            r_min: 90.0,
            r_max: 30.0,
            stability_ratio_limit: f64::NAN,
            ..BehaviorParams::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut c = BehaviorController::new(p, &mut rng);
        let d = BehaviorParams::default();
        match c.state() {
            HopState::Idle { timer_ms } => {
                assert!(timer_ms >= d.interval_short_ms && timer_ms <= d.interval_long_ms);
            }
            other => panic!("expected Idle, got {:?}", other),
        }
        for _ in 0..200 {
            let out = c.step(calm(0.5), DT, 0.0, &mut rng);
            assert!(out.radius >= 30.0 && out.radius <= 90.0, "radius {}", out.radius);
        }
    }

    #[test]
    fn radius_stays_in_bounds_for_arbitrary_trends() {
        let p = BehaviorParams::default();
        let (mut c, mut rng) = controller(11);
        let mut input = ChaCha8Rng::seed_from_u64(99);
        let specials = [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1e9, -1e9];
        for i in 0..5_000 {
            let trend = if i % 97 == 0 {
                specials[(i / 97) % specials.len()]
            } else {
                input.gen_range(-50.0..50.0)
            };
            let out = c.step(Signal { trend, volatility: input.gen_range(0.0..1.0), price: 1.0 }, DT, 0.0, &mut rng);
            assert!(out.radius >= p.r_min && out.radius <= p.r_max, "radius {}", out.radius);
        }
    }

    #[test]
    fn radius_moves_gradually_toward_target() {
        let p = BehaviorParams::default();
        let (mut c, mut rng) = controller(1);
        let before = c.radius();
        let out = c.step(calm(1.0), DT, 0.0, &mut rng);
        let target = (p.base_radius * (1.0 + p.k_trend)).min(p.r_max);
        let expected = before + (target - before) * p.alpha_radius;
        assert!((out.radius - expected).abs() < 1e-9);
        assert!(out.radius < target);
    }

    #[test]
    fn volatility_is_smoothed() {
        let p = BehaviorParams::default();
        let (mut c, mut rng) = controller(2);
        c.step(Signal { trend: 0.0, volatility: 1.0, price: 1.0 }, DT, 0.0, &mut rng);
        assert!((c.smoothed_volatility() - p.alpha_volatility).abs() < 1e-12);
    }

    #[test]
    fn hop_applies_force_for_fixed_frames_then_idles() {
        let p = BehaviorParams::default();
        let (mut c, mut rng) = controller(3);
        let first = run_until_hop(&mut c, &mut rng, 0.0);
        assert!(first.force.is_some());

        let mut force_steps = 1;
        while c.phase() == HopPhase::Hopping {
            let out = c.step(calm(0.0), DT, 0.0, &mut rng);
            assert!(out.force.is_some());
            force_steps += 1;
        }
        assert_eq!(force_steps, p.hop_frames);
        assert!(matches!(c.state(), HopState::Idle { .. }));
        let idle = c.step(calm(0.0), DT, 0.0, &mut rng);
        assert!(idle.force.is_none());
    }

    #[test]
    fn hop_force_direction_is_constant_during_hop() {
        let (mut c, mut rng) = controller(4);
        let first = run_until_hop(&mut c, &mut rng, 0.2).force.unwrap();
        let next = c.step(calm(0.2), DT, 0.0, &mut rng).force.unwrap();
        assert!((first.normalize().dot(next.normalize()) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn stable_uptrend_hops_harder_and_waits_longer() {
        let p = BehaviorParams::default();
        let (mut up, mut rng_up) = controller(5);
        let (mut down, mut rng_down) = controller(5);
        let up_hop = run_until_hop(&mut up, &mut rng_up, 1.0);
        let down_hop = run_until_hop(&mut down, &mut rng_down, -1.0);

        let mag = |o: &BehaviorOutput| o.force.map(|f| f.length()).unwrap_or(0.0);
        let area_up = up.radius() * up.radius();
        let area_down = down.radius() * down.radius();
        assert!(mag(&up_hop) / area_up > mag(&down_hop) / area_down);

        while up.phase() == HopPhase::Hopping {
            up.step(calm(1.0), DT, 0.0, &mut rng_up);
        }
        while down.phase() == HopPhase::Hopping {
            down.step(calm(-1.0), DT, 0.0, &mut rng_down);
        }
        match (up.state(), down.state()) {
            (HopState::Idle { timer_ms: long }, HopState::Idle { timer_ms: short }) => {
                assert!((long - p.interval_long_ms).abs() < 1e-6, "long {}", long);
                assert!((short - p.interval_short_ms).abs() < 1e-6, "short {}", short);
            }
            other => panic!("expected both Idle, got {:?}", other),
        }
    }

    #[test]
    fn excessive_speed_stuns_and_suppresses_force() {
        let p = BehaviorParams::default();
        let (mut c, mut rng) = controller(6);
        run_until_hop(&mut c, &mut rng, 0.0);
        assert_eq!(c.phase(), HopPhase::Hopping);

        let out = c.step(calm(0.0), DT, p.stun_enter_speed + 1.0, &mut rng);
        assert_eq!(out.event, Some(BehaviorEvent::Stunned { speed: p.stun_enter_speed + 1.0 }));
        assert!(out.force.is_none());
        assert_eq!(c.phase(), HopPhase::Stunned);

        // Between thresholds: stays stunned, no force, no timer progress.
        for _ in 0..200 {
            let out = c.step(calm(0.0), DT, p.stun_recover_speed + 1.0, &mut rng);
            assert!(out.force.is_none());
            assert_eq!(c.phase(), HopPhase::Stunned);
        }

        let out = c.step(calm(0.0), DT, p.stun_recover_speed - 1.0, &mut rng);
        assert_eq!(out.event, Some(BehaviorEvent::Recovered));
        assert!(matches!(c.state(), HopState::Idle { .. }));
    }

    #[test]
    fn stun_takes_precedence_over_expired_timer() {
        let p = BehaviorParams::default();
        let (mut c, mut rng) = controller(7);
        // A huge dt would expire the timer, but speed wins.
        let out = c.step(calm(0.0), 100.0, p.stun_enter_speed * 2.0, &mut rng);
        assert!(out.force.is_none());
        assert_eq!(c.phase(), HopPhase::Stunned);
    }

    #[test]
    fn corrupt_signal_never_reaches_force() {
        let (mut c, mut rng) = controller(8);
        for _ in 0..2_000 {
            let out = c.step(Signal { trend: f64::NAN, volatility: f64::NAN, price: 1.0 }, DT, 0.0, &mut rng);
            if let Some(f) = out.force {
                assert!(f.x.is_finite() && f.y.is_finite());
            }
            assert!(out.radius.is_finite());
            assert!(c.smoothed_volatility().is_finite());
        }
    }

    #[test]
    fn same_seed_same_trajectory() {
        let (mut a, mut ra) = controller(42);
        let (mut b, mut rb) = controller(42);
        for i in 0..500 {
            let s = calm((i as f64 / 50.0).sin());
            assert_eq!(a.step(s, DT, 0.0, &mut ra), b.step(s, DT, 0.0, &mut rb));
        }
    }

    #[test]
    fn stability_normalization() {
        let (mut c, mut rng) = controller(9);
        c.step(calm(0.0), DT, 0.0, &mut rng);
        assert!((c.stability() - 0.5).abs() < 1e-12);
        c.step(calm(1.0), DT, 0.0, &mut rng);
        assert!((c.stability() - 1.0).abs() < 1e-12);
        c.step(calm(-1.0), DT, 0.0, &mut rng);
        assert!(c.stability().abs() < 1e-12);
    }
}
