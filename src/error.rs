// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Mood Arena Simulation Suite - Error Types

/// Raw input rejected before it reaches the metric engine.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DataError {
    #[error("series for {entity} is empty")]
    EmptySeries { entity: String },

    #[error("series for {entity} is not strictly increasing at index {index}: {previous} -> {current}")]
    NonMonotonic { entity: String, index: usize, previous: i64, current: i64 },

    #[error("series for {entity} has non-positive price {price} at index {index}")]
    NonPositivePrice { entity: String, index: usize, price: f64 },

    #[error("series for {entity} has a non-finite price at index {index}")]
    NonFinitePrice { entity: String, index: usize },

    #[error("no entities supplied")]
    NoEntities,

    #[error("entity {entity} supplied more than once")]
    DuplicateEntity { entity: String },
}

/// Caller broke a sampling precondition. Not recoverable locally.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("temporal sampler queried on an empty series")]
    EmptySeries,

    #[error("unknown entity: {0}")]
    UnknownEntity(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Anything that can fail while assembling a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("series parse failed: {0}")]
    Series(#[source] serde_json::Error),
}
