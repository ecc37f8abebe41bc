// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Mood Arena Simulation Suite - Simulation Core

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::config::MoodConfig;
use crate::error::SetupError;
use crate::market::Market;
use crate::physics::{PhysicsBackend, RapierBackend};
use crate::sampler::Timeline;
use crate::types::{BodySnapshot, Signal, TickResult};
use crate::world::PhysicsWorld;

// ─── MoodSimulation struct ───────────────────────────────────────────────────

/// Frame loop: map the frame onto data time, sample every entity, step the
/// world, report snapshots and events.
pub struct MoodSimulation<B: PhysicsBackend = RapierBackend> {
    config: MoodConfig,
    market: Market,
    world: PhysicsWorld<B>,
    timeline: Timeline,
    frame: u64,
}

impl MoodSimulation<RapierBackend> {
    pub fn new(config: MoodConfig, market: Market) -> Self {
        Self::with_backend(config, market, RapierBackend::new())
    }

    /// Validate the config, build the market from `(timestamp_ms, price)`
    /// pairs and spawn one body per entity.
    pub fn from_pairs(
        config: MoodConfig,
        pairs: &BTreeMap<String, Vec<(i64, f64)>>,
    ) -> Result<Self, SetupError> {
        config.validate()?;
        let market = Market::from_pairs(pairs, config.metric.window)?;
        Ok(Self::new(config, market))
    }

    /// [`MoodSimulation::from_pairs`] for `Decimal` exchange quotes.
    pub fn from_quotes(
        config: MoodConfig,
        quotes: &BTreeMap<String, Vec<(i64, Decimal)>>,
    ) -> Result<Self, SetupError> {
        config.validate()?;
        let market = Market::from_quotes(quotes, config.metric.window)?;
        Ok(Self::new(config, market))
    }
}

impl<B: PhysicsBackend> MoodSimulation<B> {
    pub fn with_backend(config: MoodConfig, market: Market, backend: B) -> Self {
        let world = build_world(&config, &market, backend);
        let (start_ms, end_ms) = market.time_span();
        let timeline = Timeline::new(start_ms, end_ms, config.render.duration_secs);

        tracing::info!(
            entities = market.len(),
            frames = config.render.total_frames(),
            compression = timeline.compression(),
            seed = config.seed,
            "mood simulation ready"
        );

        Self { config, market, world, timeline, frame: 0 }
    }

    // ─── Internal Logic (Testable, pure Rust) ────────────────────────────────

    pub fn tick_core(&mut self) -> TickResult {
        self.frame += 1;
        let dt = self.config.render.dt();
        let sim_time = self.frame as f64 * dt;
        let data_time_ms = self.timeline.data_time_at(sim_time);

        let market = &self.market;
        let events = self.world.step(dt, |entity| {
            market.sample(entity, data_time_ms).unwrap_or_else(|err| {
                tracing::warn!(%err, "no signal for body");
                Signal::default()
            })
        });

        if !events.is_empty() {
            tracing::trace!(frame = self.frame, events = events.len(), "frame events");
        }

        TickResult {
            frame: self.frame,
            sim_time,
            data_time_ms,
            bodies: self.world.snapshots(),
            events,
        }
    }

    /// Run N frames without collecting results.
    pub fn run_batch(&mut self, frames: u32) {
        for _ in 0..frames {
            self.tick_core();
        }
    }

    /// Play the remaining frames of the rendered duration, handing each
    /// result to `on_frame`.
    pub fn run_to_end<F>(&mut self, mut on_frame: F)
    where
        F: FnMut(&TickResult),
    {
        while !self.is_finished() {
            let result = self.tick_core();
            on_frame(&result);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.frame >= self.config.render.total_frames()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn config(&self) -> &MoodConfig {
        &self.config
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn timeline(&self) -> Timeline {
        self.timeline
    }

    pub fn world(&self) -> &PhysicsWorld<B> {
        &self.world
    }

    pub fn bodies(&self) -> Vec<BodySnapshot> {
        self.world.snapshots()
    }
}

impl<B: PhysicsBackend + Default> MoodSimulation<B> {
    /// Rebuild the world from the same config and market on a fresh backend.
    pub fn reset(&mut self) {
        self.world = build_world(&self.config, &self.market, B::default());
        self.frame = 0;
    }
}

fn build_world<B: PhysicsBackend>(config: &MoodConfig, market: &Market, backend: B) -> PhysicsWorld<B> {
    let mut world =
        PhysicsWorld::new(backend, config.arena.clone(), config.behavior.clone(), config.seed);
    world.spawn_bodies(market.entities());
    world
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ArenaEvent;

    fn pairs() -> BTreeMap<String, Vec<(i64, f64)>> {
        let hour = 3_600_000;
        let mut m = BTreeMap::new();
        m.insert("BTC".to_string(), (0..200).map(|i| (i * hour, 60_000.0 * 1.002_f64.powi(i as i32))).collect());
        m.insert("ETH".to_string(), (0..200).map(|i| (i * hour, 3_000.0 * 0.998_f64.powi(i as i32))).collect());
        m.insert(
            "SOL".to_string(),
            (0..200).map(|i| (i * hour, 150.0 * (1.0 + 0.05 * (i as f64 / 5.0).sin()))).collect(),
        );
        m
    }

    fn short_config(seed: u64) -> MoodConfig {
        let mut config = MoodConfig::default();
        config.render.duration_secs = 4.0;
        config.seed = seed;
        config
    }

    #[test]
    fn one_body_per_entity() {
        let sim = MoodSimulation::from_pairs(short_config(1), &pairs()).unwrap();
        let entities: Vec<String> = sim.bodies().into_iter().map(|b| b.entity).collect();
        assert_eq!(entities, vec!["BTC", "ETH", "SOL"]);
        assert_eq!(sim.frame(), 0);
    }

    #[test]
    fn timeline_covers_whole_history() {
        let mut sim = MoodSimulation::from_pairs(short_config(2), &pairs()).unwrap();
        let first = sim.tick_core();
        assert_eq!(first.frame, 1);
        assert!(first.data_time_ms > 0.0);

        let mut last = None;
        sim.run_to_end(|r| last = Some(r.data_time_ms));
        assert!(sim.is_finished());
        assert_eq!(sim.frame(), 120);
        let last = last.expect("frames after the first");
        assert!((last - 199.0 * 3_600_000.0).abs() < 1.0, "ended at {}", last);
    }

    #[test]
    fn rising_entity_outgrows_falling_one() {
        let mut sim = MoodSimulation::from_pairs(short_config(3), &pairs()).unwrap();
        sim.run_batch(120);
        let bodies = sim.bodies();
        assert!(bodies[0].radius > bodies[1].radius, "{} vs {}", bodies[0].radius, bodies[1].radius);
    }

    #[test]
    fn same_seed_same_events() {
        let mut a = MoodSimulation::from_pairs(short_config(4), &pairs()).unwrap();
        let mut b = MoodSimulation::from_pairs(short_config(4), &pairs()).unwrap();
        for _ in 0..90 {
            assert_eq!(a.tick_core().events, b.tick_core().events);
        }
    }

    #[test]
    fn reset_replays_identically() {
        let mut sim = MoodSimulation::from_pairs(short_config(5), &pairs()).unwrap();
        let before: Vec<Vec<ArenaEvent>> = (0..60).map(|_| sim.tick_core().events).collect();
        sim.reset();
        assert_eq!(sim.frame(), 0);
        let after: Vec<Vec<ArenaEvent>> = (0..60).map(|_| sim.tick_core().events).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = short_config(6);
        config.render.fps = 0;
        assert!(matches!(
            MoodSimulation::from_pairs(config, &pairs()),
            Err(SetupError::Config(_))
        ));
    }
}
