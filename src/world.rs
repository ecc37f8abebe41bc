// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Mood Arena Simulation Suite - Physics World

//! Owns the bodies and the arena walls, feeds behavior outputs into the
//! physics backend, and enforces the post-step safety net: velocity capped
//! to `v_max`, positions clamped into the arena interior with the velocity
//! halved whenever a clamp was needed.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::behavior::{BehaviorController, BehaviorEvent};
use crate::config::{ArenaParams, BehaviorParams};
use crate::physics::{BodyDesc, BodyHandle, PhysicsBackend};
use crate::types::{ArenaEvent, BodySnapshot, Signal};

// ─── Body ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Body {
    pub id: u32,
    pub entity: String,
    pub handle: BodyHandle,
    pub controller: BehaviorController,
}

// ─── PhysicsWorld ────────────────────────────────────────────────────────────

pub struct PhysicsWorld<B: PhysicsBackend> {
    backend: B,
    bodies: Vec<Body>,
    arena: ArenaParams,
    behavior: BehaviorParams,
    rng: ChaCha8Rng,
}

impl<B: PhysicsBackend> PhysicsWorld<B> {
    pub fn new(mut backend: B, arena: ArenaParams, behavior: BehaviorParams, seed: u64) -> Self {
        backend.create_boundary(DVec2::ZERO, DVec2::new(arena.width, arena.height));
        Self {
            backend,
            bodies: Vec::new(),
            arena,
            behavior,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn add_body(&mut self, entity: impl Into<String>, position: DVec2) -> u32 {
        let controller = BehaviorController::new(self.behavior.clone(), &mut self.rng);
        let radius = controller.radius();
        let position = clamp_into(position, radius, self.arena.width, self.arena.height);
        let handle = self.backend.create_body(BodyDesc {
            position,
            radius,
            density: self.arena.density,
            restitution: self.arena.restitution,
            friction: self.arena.friction,
        });
        let id = self.bodies.len() as u32;
        self.bodies.push(Body { id, entity: entity.into(), handle, controller });
        id
    }

    /// Place one body per entity on a jittered grid shaped like the arena.
    pub fn spawn_bodies<'a, I>(&mut self, entities: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let entities: Vec<&str> = entities.into_iter().collect();
        let n = entities.len();
        if n == 0 {
            return;
        }
        let (w, h) = (self.arena.width, self.arena.height);
        let cols = ((n as f64 * w / h).sqrt().ceil() as usize).clamp(1, n);
        let rows = n.div_ceil(cols);
        let cell = DVec2::new(w / cols as f64, h / rows as f64);
        let slack = ((cell.min_element() * 0.5 - self.behavior.base_radius) * 0.5).max(0.0);

        for (i, entity) in entities.into_iter().enumerate() {
            let col = (i % cols) as f64;
            let row = (i / cols) as f64;
            let center = DVec2::new((col + 0.5) * cell.x, (row + 0.5) * cell.y);
            let jitter = if slack > 0.0 {
                DVec2::new(self.rng.gen_range(-slack..slack), self.rng.gen_range(-slack..slack))
            } else {
                DVec2::ZERO
            };
            self.add_body(entity, center + jitter);
        }
    }

    /// Advance one frame. `signal` returns the sampled metrics for an entity
    /// at the current data time.
    pub fn step<F>(&mut self, dt: f64, mut signal: F) -> Vec<ArenaEvent>
    where
        F: FnMut(&str) -> Signal,
    {
        let mut events = Vec::new();

        for body in &mut self.bodies {
            let speed = self.backend.velocity(body.handle).length();
            let out = body.controller.step(signal(body.entity.as_str()), dt, speed, &mut self.rng);

            self.backend.set_radius(body.handle, out.radius);
            if let Some(force) = out.force {
                let at = self.backend.position(body.handle);
                self.backend.apply_force(body.handle, force, at);
            }
            if let Some(event) = out.event {
                events.push(behavior_event(body.id, event));
            }
        }

        for contact in self.backend.step(dt) {
            if let (Some(a), Some(b)) = (self.body_id(contact.a), self.body_id(contact.b)) {
                events.push(ArenaEvent::Collision { a, b, impact_speed: contact.impact_speed });
            }
        }

        for body in &self.bodies {
            if let Some(event) = enforce_limits(&mut self.backend, &self.arena, body) {
                events.push(event);
            }
        }
        events
    }

    pub fn snapshots(&self) -> Vec<BodySnapshot> {
        self.bodies
            .iter()
            .map(|b| BodySnapshot {
                id: b.id,
                entity: b.entity.clone(),
                position: self.backend.position(b.handle),
                radius: self.backend.radius(b.handle),
                velocity: self.backend.velocity(b.handle),
                phase: b.controller.phase(),
                stability: b.controller.stability(),
            })
            .collect()
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn arena(&self) -> &ArenaParams {
        &self.arena
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn body_id(&self, handle: BodyHandle) -> Option<u32> {
        self.bodies.iter().find(|b| b.handle == handle).map(|b| b.id)
    }
}

// ─── Safety Net ──────────────────────────────────────────────────────────────

fn enforce_limits<B: PhysicsBackend>(
    backend: &mut B,
    arena: &ArenaParams,
    body: &Body,
) -> Option<ArenaEvent> {
    let mut velocity = backend.velocity(body.handle);
    if !velocity.is_finite() {
        velocity = DVec2::ZERO;
    }
    let speed = velocity.length();
    if speed > arena.v_max {
        velocity *= arena.v_max / speed;
    }

    let radius = backend.radius(body.handle);
    let position = backend.position(body.handle);
    let clamped = clamp_into(position, radius, arena.width, arena.height);

    let mut event = None;
    if clamped != position {
        backend.set_position(body.handle, clamped);
        event = Some(ArenaEvent::WallClamp { body: body.id, impact_speed: velocity.length() });
        velocity *= 0.5;
    }
    backend.set_velocity(body.handle, velocity);
    event
}

/// Keep a disc of `radius` inside `[0, width] x [0, height]`. NaN coordinates
/// collapse onto the lower bound.
fn clamp_into(p: DVec2, radius: f64, width: f64, height: f64) -> DVec2 {
    DVec2::new(
        p.x.max(radius).min((width - radius).max(radius)),
        p.y.max(radius).min((height - radius).max(radius)),
    )
}

fn behavior_event(body: u32, event: BehaviorEvent) -> ArenaEvent {
    match event {
        BehaviorEvent::HopStarted { magnitude, angle } => {
            tracing::trace!(body, magnitude, angle, "hop started");
            ArenaEvent::HopStarted { body, magnitude, angle }
        }
        BehaviorEvent::Stunned { speed } => {
            tracing::trace!(body, speed, "stunned");
            ArenaEvent::Stunned { body, speed }
        }
        BehaviorEvent::Recovered => ArenaEvent::Recovered { body },
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
