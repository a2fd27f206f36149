// ECS components for the ant vignette scene.
// Simulation state lives here; the steering and camera code only ever
// reads/writes through these.

use bevy_ecs::prelude::*;
use glam::Vec3;

/// Position + facing of an entity.
///
/// `heading` is a rotation about world Y in radians. The convention matches
/// the steering engine: an unrotated entity faces world +Z, so
/// `heading = atan2(v.x, v.z)` points it along its velocity.
#[derive(Component, Debug, Clone, Copy)]
pub struct Transform {
    pub position: Vec3,
    pub heading: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            heading: 0.0,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            heading: 0.0,
        }
    }
}

/// Linear velocity in world units per second. Ants keep `linear.y == 0`.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Velocity {
    pub linear: Vec3,
}

/// RGB color fed straight into the instance buffer.
#[derive(Component, Debug, Clone, Copy)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Marks an entity as a steered ant and carries its per-agent parameters.
///
/// `phase` is randomized once at spawn so the colony's wander sinusoids are
/// desynchronized; it never changes afterwards.
#[derive(Component, Debug, Clone, Copy)]
pub struct AntAgent {
    /// Top speed in world units/sec. The steering engine caps the actual
    /// velocity below this (see `steering::SPEED_HEADROOM`).
    pub speed: f32,
    /// Scale of the wander drift.
    pub wander_radius: f32,
    /// Wander phase offset, uniform in [0, 100).
    pub phase: f32,
}

/// Marks an entity as a sugar-cube target.
///
/// The cube bobs gently around `rest_y`; ants only ever read its position,
/// so the bob is plain host-scene animation, not part of the steering core.
#[derive(Component, Debug, Clone, Copy)]
pub struct SugarLure {
    pub rest_y: f32,
    pub bob_phase: f32,
}
