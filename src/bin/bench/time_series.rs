// Per-Frame JSONL Time Series Recorder
// Outputs one JSON line per frame for independent analysis

use serde::Serialize;
use mood_engine::{ArenaEvent, HopPhase, TickResult};
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub sim_time: f64,
    pub data_time_ms: f64,
    pub mean_radius: f64,
    pub min_radius: f64,
    pub max_radius: f64,
    pub mean_speed: f64,
    pub max_speed: f64,
    pub mean_stability: f64,
    pub hopping: u32,
    pub stunned: u32,
    pub hops: u32,
    pub collisions: u32,
    pub wall_clamps: u32,
}

impl FrameSnapshot {
    pub fn from_result(result: &TickResult) -> Self {
        let n = result.bodies.len().max(1) as f64;
        let speeds: Vec<f64> = result.bodies.iter().map(|b| b.velocity.length()).collect();
        let count_phase = |phase: HopPhase| {
            result.bodies.iter().filter(|b| b.phase == phase).count() as u32
        };
        let count_events = |pred: fn(&ArenaEvent) -> bool| {
            result.events.iter().filter(|e| pred(e)).count() as u32
        };

        Self {
            frame: result.frame,
            sim_time: result.sim_time,
            data_time_ms: result.data_time_ms,
            mean_radius: result.bodies.iter().map(|b| b.radius).sum::<f64>() / n,
            min_radius: result.bodies.iter().map(|b| b.radius).fold(f64::INFINITY, f64::min),
            max_radius: result.bodies.iter().map(|b| b.radius).fold(0.0, f64::max),
            mean_speed: speeds.iter().sum::<f64>() / n,
            max_speed: speeds.iter().cloned().fold(0.0, f64::max),
            mean_stability: result.bodies.iter().map(|b| b.stability).sum::<f64>() / n,
            hopping: count_phase(HopPhase::Hopping),
            stunned: count_phase(HopPhase::Stunned),
            hops: count_events(|e| matches!(e, ArenaEvent::HopStarted { .. })),
            collisions: count_events(|e| matches!(e, ArenaEvent::Collision { .. })),
            wall_clamps: count_events(|e| matches!(e, ArenaEvent::WallClamp { .. })),
        }
    }
}

/// Time series recorder that accumulates snapshots and writes JSONL
pub struct TimeSeriesRecorder {
    snapshots: Vec<FrameSnapshot>,
}

impl TimeSeriesRecorder {
    pub fn new() -> Self {
        Self { snapshots: Vec::new() }
    }

    pub fn record(&mut self, result: &TickResult) {
        self.snapshots.push(FrameSnapshot::from_result(result));
    }

    /// Write all snapshots to a JSONL file
    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        for snapshot in &self.snapshots {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }
}
