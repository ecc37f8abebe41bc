// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Mood Arena Simulation Suite - Rapier Backend

//! [`PhysicsBackend`] on `rapier2d-f64`.
//!
//! Bodies are dynamic balls with locked rotation and continuous collision
//! detection, so two discs closing at `v_max` meet instead of skipping past
//! each other within one frame. The arena is four fixed cuboids hugging the
//! rectangle. Mass follows collider density: `density * PI * r^2`.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use glam::DVec2;
use rapier2d_f64::na::{point, vector};
use rapier2d_f64::prelude::*;

use super::{BodyDesc, BodyHandle, Contact, PhysicsBackend};

/// Arena pixels per engine meter; scales solver tolerances to pixel space.
const LENGTH_UNIT: f64 = 100.0;
const WALL_THICKNESS: f64 = 200.0;

#[derive(Debug, Clone, Copy)]
struct Slot {
    body: RigidBodyHandle,
    collider: ColliderHandle,
    radius: f64,
}

pub struct RapierBackend {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    slots: Vec<Slot>,
    by_collider: HashMap<ColliderHandle, BodyHandle>,
}

impl RapierBackend {
    pub fn new() -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.length_unit = LENGTH_UNIT;
        integration_parameters.max_ccd_substeps = 4;

        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![0.0, 0.0],
            integration_parameters,
            island_manager: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            slots: Vec::new(),
            by_collider: HashMap::new(),
        }
    }

    pub fn body_count(&self) -> usize {
        self.slots.len()
    }

    pub fn mass(&self, body: BodyHandle) -> f64 {
        self.bodies[self.slots[body.0 as usize].body].mass()
    }

    fn slot(&self, body: BodyHandle) -> Slot {
        self.slots[body.0 as usize]
    }
}

impl Default for RapierBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsBackend for RapierBackend {
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let rb = RigidBodyBuilder::dynamic()
            .translation(to_na(desc.position))
            .linear_damping(desc.friction)
            .lock_rotations()
            .ccd_enabled(true)
            .can_sleep(false)
            .build();
        let rb = self.bodies.insert(rb);

        let collider = ColliderBuilder::ball(desc.radius)
            .density(desc.density)
            .restitution(desc.restitution)
            .friction(desc.friction)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider = self.colliders.insert_with_parent(collider, rb, &mut self.bodies);
        if let Some(body) = self.bodies.get_mut(rb) {
            body.recompute_mass_properties_from_colliders(&self.colliders);
        }

        let handle = BodyHandle(self.slots.len() as u32);
        self.slots.push(Slot { body: rb, collider, radius: desc.radius });
        self.by_collider.insert(collider, handle);
        handle
    }

    fn create_boundary(&mut self, min: DVec2, max: DVec2) {
        let wall = self.bodies.insert(RigidBodyBuilder::fixed().build());
        let center = (min + max) * 0.5;
        let half = (max - min) * 0.5 + DVec2::splat(WALL_THICKNESS);
        let t = WALL_THICKNESS * 0.5;

        let walls = [
            (DVec2::new(center.x, min.y - t), DVec2::new(half.x, t)),
            (DVec2::new(center.x, max.y + t), DVec2::new(half.x, t)),
            (DVec2::new(min.x - t, center.y), DVec2::new(t, half.y)),
            (DVec2::new(max.x + t, center.y), DVec2::new(t, half.y)),
        ];
        for (at, extent) in walls {
            // The body's own restitution decides how walls bounce it.
            let collider = ColliderBuilder::cuboid(extent.x, extent.y)
                .translation(to_na(at))
                .restitution(1.0)
                .restitution_combine_rule(CoefficientCombineRule::Min)
                .friction(0.0)
                .build();
            self.colliders.insert_with_parent(collider, wall, &mut self.bodies);
        }
    }

    fn step(&mut self, dt: f64) -> Vec<Contact> {
        if !(dt > 0.0) {
            return Vec::new();
        }
        self.integration_parameters.dt = dt;

        let log = ContactLog::default();
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &log,
        );

        // User forces persist in rapier until reset.
        for slot in &self.slots {
            if let Some(rb) = self.bodies.get_mut(slot.body) {
                rb.reset_forces(false);
            }
        }

        log.started
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_iter()
            .filter_map(|(c1, c2, impact_speed)| {
                let a = *self.by_collider.get(&c1)?;
                let b = *self.by_collider.get(&c2)?;
                let (a, b) = if a.0 <= b.0 { (a, b) } else { (b, a) };
                Some(Contact { a, b, impact_speed })
            })
            .collect()
    }

    fn apply_force(&mut self, body: BodyHandle, force: DVec2, at: DVec2) {
        let slot = self.slot(body);
        if let Some(rb) = self.bodies.get_mut(slot.body) {
            rb.add_force_at_point(to_na(force), point![at.x, at.y], true);
        }
    }

    fn position(&self, body: BodyHandle) -> DVec2 {
        to_glam(self.bodies[self.slot(body).body].translation())
    }

    fn velocity(&self, body: BodyHandle) -> DVec2 {
        to_glam(self.bodies[self.slot(body).body].linvel())
    }

    fn radius(&self, body: BodyHandle) -> f64 {
        self.slot(body).radius
    }

    fn set_position(&mut self, body: BodyHandle, position: DVec2) {
        let slot = self.slot(body);
        if let Some(rb) = self.bodies.get_mut(slot.body) {
            rb.set_translation(to_na(position), true);
        }
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: DVec2) {
        let slot = self.slot(body);
        if let Some(rb) = self.bodies.get_mut(slot.body) {
            rb.set_linvel(to_na(velocity), true);
        }
    }

    fn set_radius(&mut self, body: BodyHandle, radius: f64) {
        let slot = self.slot(body);
        if slot.radius == radius {
            return;
        }
        if let Some(collider) = self.colliders.get_mut(slot.collider) {
            collider.set_shape(SharedShape::ball(radius));
        }
        if let Some(rb) = self.bodies.get_mut(slot.body) {
            rb.recompute_mass_properties_from_colliders(&self.colliders);
        }
        self.slots[body.0 as usize].radius = radius;
    }
}

// ─── Contact events ──────────────────────────────────────────────────────────

/// Collects contact starts during a pipeline step. The closing speed is read
/// in the narrow phase, before the solver resolves the contact.
#[derive(Default)]
struct ContactLog {
    started: Mutex<Vec<(ColliderHandle, ColliderHandle, f64)>>,
}

impl EventHandler for ContactLog {
    fn handle_collision_event(
        &self,
        bodies: &RigidBodySet,
        colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if !event.started() {
            return;
        }
        let (c1, c2) = (event.collider1(), event.collider2());
        let impact_speed = closing_speed(bodies, colliders, c1, c2).unwrap_or(0.0);
        if let Ok(mut started) = self.started.lock() {
            started.push((c1, c2, impact_speed));
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

fn closing_speed(
    bodies: &RigidBodySet,
    colliders: &ColliderSet,
    c1: ColliderHandle,
    c2: ColliderHandle,
) -> Option<f64> {
    let a = bodies.get(colliders.get(c1)?.parent()?)?;
    let b = bodies.get(colliders.get(c2)?.parent()?)?;
    let normal = (b.translation() - a.translation()).try_normalize(1e-9)?;
    Some((a.linvel() - b.linvel()).dot(&normal).max(0.0))
}

fn to_na(v: DVec2) -> Vector<Real> {
    vector![v.x, v.y]
}

fn to_glam(v: &Vector<Real>) -> DVec2 {
    DVec2::new(v.x, v.y)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
