// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Mood Arena Simulation Suite

pub mod types;
pub mod error;
pub mod config;
pub mod metrics;
pub mod normalizer;
pub mod sampler;
pub mod market;
pub mod behavior;
pub mod physics;
pub mod world;
pub mod simulation;
pub mod adapter;

pub use types::*;
pub use error::{ConfigError, DataError, PreconditionError, SetupError};
pub use config::{ArenaParams, BehaviorParams, MetricParams, MoodConfig, RenderParams};
pub use market::Market;
pub use physics::{PhysicsBackend, RapierBackend};
pub use simulation::MoodSimulation;

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
pub struct MoodArena {
    sim: MoodSimulation,
}

impl MoodArena {
    /// `series_json` maps entity names to `[timestamp_ms, price]` quotes.
    /// Prices may be JSON numbers or decimal strings as exchanges send them.
    pub fn from_json(config_json: &str, series_json: &str) -> Result<Self, SetupError> {
        let config = MoodConfig::from_json(config_json)?;
        let quotes: BTreeMap<String, Vec<(i64, Decimal)>> =
            serde_json::from_str(series_json).map_err(SetupError::Series)?;
        let sim = MoodSimulation::from_quotes(config, &quotes)?;
        Ok(Self { sim })
    }

    pub fn simulation(&self) -> &MoodSimulation {
        &self.sim
    }
}

#[wasm_bindgen]
impl MoodArena {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, series_json: &str) -> Result<MoodArena, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let arena = Self::from_json(config_json, series_json)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        #[cfg(target_arch = "wasm32")]
        log(&format!(
            "mood arena: {} bodies, {} frames",
            arena.sim.market().len(),
            arena.sim.config().render.total_frames()
        ));

        Ok(arena)
    }

    pub fn tick(&mut self) -> JsValue {
        let result = self.sim.tick_core();
        serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
    }

    /// Run N frames without returning results (fast batch mode for benchmarking)
    pub fn run_batch(&mut self, frames: u32) {
        self.sim.run_batch(frames);
    }

    pub fn get_bodies(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.sim.bodies()).unwrap_or(JsValue::NULL)
    }

    /// Normalized series for chart overlays; null for an unknown entity.
    pub fn get_series(&self, entity: &str) -> JsValue {
        match self.sim.market().series(entity) {
            Some(series) => serde_wasm_bindgen::to_value(series).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    pub fn get_bounds(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.sim.market().bounds()).unwrap_or(JsValue::NULL)
    }

    pub fn frame(&self) -> u32 {
        self.sim.frame() as u32
    }

    pub fn total_frames(&self) -> u32 {
        self.sim.config().render.total_frames() as u32
    }

    pub fn is_finished(&self) -> bool {
        self.sim.is_finished()
    }

    /// Reset simulation to initial state
    pub fn reset(&mut self) {
        self.sim.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERIES: &str = r#"{
        "BTC": [[0, 100.0], [60000, 101.0], [120000, 102.5], [180000, 101.8]],
        "ETH": [[0, 50.0], [60000, 49.0], [120000, 48.5], [180000, 48.9]]
    }"#;

    #[test]
    fn builds_from_json() {
        let arena = MoodArena::from_json(r#"{"render": {"duration_secs": 2.0}}"#, SERIES).unwrap();
        assert_eq!(arena.total_frames(), 60);
        assert_eq!(arena.simulation().bodies().len(), 2);
    }

    #[test]
    fn string_prices_are_accepted() {
        let series = r#"{"BTC": [[0, "64250.50"], [60000, "64311.25"], [120000, 64190]]}"#;
        let arena = MoodArena::from_json("{}", series).unwrap();
        let sim = arena.simulation();
        assert_eq!(sim.market().series("BTC").map(<[_]>::len), Some(3));
        assert!((sim.market().sample("BTC", 60_000.0).unwrap().price - 64311.25).abs() < 1e-9);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let arena = MoodArena::from_json("{}", SERIES).unwrap();
        assert_eq!(arena.simulation().config().metric.window, 24);
    }

    #[test]
    fn malformed_series_is_reported() {
        let err = MoodArena::from_json("{}", r#"{"BTC": "nope"}"#).err().unwrap();
        assert!(matches!(err, SetupError::Series(_)));

        let err = MoodArena::from_json("{}", r#"{"BTC": [[0, -1.0]]}"#).err().unwrap();
        assert!(matches!(err, SetupError::Data(DataError::NonPositivePrice { .. })));

        let err = MoodArena::from_json("{}", "{}").err().unwrap();
        assert!(matches!(err, SetupError::Data(DataError::NoEntities)));
    }

    #[test]
    fn bad_config_is_reported() {
        let err = MoodArena::from_json(r#"{"metric": {"window": 1}}"#, SERIES).err().unwrap();
        assert!(matches!(err, SetupError::Config(ConfigError::Invalid { field: "metric.window", .. })));
    }

    #[test]
    fn batch_and_reset() {
        let mut arena = MoodArena::from_json(r#"{"render": {"duration_secs": 1.0}}"#, SERIES).unwrap();
        arena.run_batch(30);
        assert!(arena.is_finished());
        assert_eq!(arena.frame(), 30);
        arena.reset();
        assert_eq!(arena.frame(), 0);
        assert!(!arena.is_finished());
    }
}
