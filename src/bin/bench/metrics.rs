// Invariant and Event Trackers
// Per-frame checks of the arena guarantees plus behavior statistics

use mood_engine::*;

const EPS: f64 = 1e-9;

// ─── Invariant Tracker ──────────────────────────────────────────────────────

/// Counts frames on which a body broke a hard guarantee.
pub struct InvariantTracker {
    r_min: f64,
    r_max: f64,
    v_max: f64,
    width: f64,
    height: f64,
    pub radius_violations: u32,
    pub speed_violations: u32,
    pub containment_violations: u32,
    pub non_finite: u32,
    pub max_speed: f64,
    body_frames: u64,
    stunned_frames: u64,
    hopping_frames: u64,
}

impl InvariantTracker {
    pub fn new(config: &MoodConfig) -> Self {
        Self {
            r_min: config.behavior.r_min,
            r_max: config.behavior.r_max,
            v_max: config.arena.v_max,
            width: config.arena.width,
            height: config.arena.height,
            radius_violations: 0,
            speed_violations: 0,
            containment_violations: 0,
            non_finite: 0,
            max_speed: 0.0,
            body_frames: 0,
            stunned_frames: 0,
            hopping_frames: 0,
        }
    }

    pub fn record_frame(&mut self, result: &TickResult) {
        for b in &result.bodies {
            self.body_frames += 1;
            match b.phase {
                HopPhase::Stunned => self.stunned_frames += 1,
                HopPhase::Hopping => self.hopping_frames += 1,
                HopPhase::Idle => {}
            }

            if !(b.position.is_finite() && b.velocity.is_finite() && b.radius.is_finite()) {
                self.non_finite += 1;
                continue;
            }
            if b.radius < self.r_min - EPS || b.radius > self.r_max + EPS {
                self.radius_violations += 1;
            }
            let speed = b.velocity.length();
            self.max_speed = self.max_speed.max(speed);
            if speed > self.v_max + EPS {
                self.speed_violations += 1;
            }
            let inside_x = b.position.x >= b.radius - EPS && b.position.x <= self.width - b.radius + EPS;
            let inside_y = b.position.y >= b.radius - EPS && b.position.y <= self.height - b.radius + EPS;
            if !(inside_x && inside_y) {
                self.containment_violations += 1;
            }
        }
    }

    pub fn stunned_share(&self) -> f64 {
        if self.body_frames == 0 {
            return 0.0;
        }
        self.stunned_frames as f64 / self.body_frames as f64
    }

    pub fn hopping_share(&self) -> f64 {
        if self.body_frames == 0 {
            return 0.0;
        }
        self.hopping_frames as f64 / self.body_frames as f64
    }
}

// ─── Event Tracker ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct EventTracker {
    pub hops: u32,
    pub stuns: u32,
    pub recoveries: u32,
    pub wall_clamps: u32,
    pub collisions: u32,
    pub peak_impact: f64,
}

impl EventTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, events: &[ArenaEvent]) {
        for e in events {
            match e {
                ArenaEvent::HopStarted { .. } => self.hops += 1,
                ArenaEvent::Stunned { .. } => self.stuns += 1,
                ArenaEvent::Recovered { .. } => self.recoveries += 1,
                ArenaEvent::WallClamp { impact_speed, .. } => {
                    self.wall_clamps += 1;
                    self.peak_impact = self.peak_impact.max(*impact_speed);
                }
                ArenaEvent::Collision { impact_speed, .. } => {
                    self.collisions += 1;
                    self.peak_impact = self.peak_impact.max(*impact_speed);
                }
            }
        }
    }
}

// ─── Mood Readout ───────────────────────────────────────────────────────────

/// Largest minus smallest radius.
pub fn radius_spread(bodies: &[BodySnapshot]) -> f64 {
    let min = bodies.iter().map(|b| b.radius).fold(f64::INFINITY, f64::min);
    let max = bodies.iter().map(|b| b.radius).fold(f64::NEG_INFINITY, f64::max);
    if bodies.is_empty() { 0.0 } else { max - min }
}

/// Share of body pairs whose radius ordering agrees with their trend ordering
/// at `t_ms`. Pairs with equal trend are skipped; 1.0 when none remain.
pub fn trend_concordance(bodies: &[BodySnapshot], market: &Market, t_ms: f64) -> f64 {
    let trends: Vec<f64> = bodies
        .iter()
        .map(|b| market.sample(&b.entity, t_ms).map_or(0.0, |s| s.trend))
        .collect();

    let mut agree = 0u32;
    let mut total = 0u32;
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let dt = trends[i] - trends[j];
            if dt.abs() < EPS {
                continue;
            }
            total += 1;
            if dt * (bodies[i].radius - bodies[j].radius) > 0.0 {
                agree += 1;
            }
        }
    }
    if total == 0 { 1.0 } else { agree as f64 / total as f64 }
}
