//! Rigid-body engine seam.
//!
//! The world only supplies forces, target sizes and safety clamps; integration
//! and collision response belong to whatever implements [`PhysicsBackend`].

pub mod rapier;

pub use rapier::RapierBackend;

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Opaque body handle issued by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// `friction` drives both collider friction and linear damping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub position: DVec2,
    pub radius: f64,
    pub density: f64,
    pub restitution: f64,
    pub friction: f64,
}

/// Contact reported by a backend step, for impact sounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub a: BodyHandle,
    pub b: BodyHandle,
    /// Closing speed along the contact normal.
    pub impact_speed: f64,
}

pub trait PhysicsBackend {
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle;

    /// Static axis-aligned walls enclosing `min..max`.
    fn create_boundary(&mut self, min: DVec2, max: DVec2);

    /// Integrate `dt` seconds, resolve collisions, clear accumulated forces.
    fn step(&mut self, dt: f64) -> Vec<Contact>;

    /// Accumulate a force for the next step, applied at `point` (world space).
    fn apply_force(&mut self, body: BodyHandle, force: DVec2, point: DVec2);

    fn position(&self, body: BodyHandle) -> DVec2;
    fn velocity(&self, body: BodyHandle) -> DVec2;
    fn radius(&self, body: BodyHandle) -> f64;

    fn set_position(&mut self, body: BodyHandle, position: DVec2);
    fn set_velocity(&mut self, body: BodyHandle, velocity: DVec2);
    /// Rescale the body's collider; mass follows the new size.
    fn set_radius(&mut self, body: BodyHandle, radius: f64);
}
