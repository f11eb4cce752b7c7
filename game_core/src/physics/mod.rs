//! Physics capability
//!
//! The simulation never talks to an engine directly. Everything it needs
//! from rigid-body physics goes through [`PhysicsWorld`], so the rapier
//! backend can be swapped for [`scripted::ScriptedPhysics`] in tests.

pub mod materials;
pub mod rapier;
pub mod scripted;

pub use materials::{ContactPair, MaterialId};
pub use rapier::RapierWorld;
pub use scripted::ScriptedPhysics;

use glam::{Quat, Vec3};

/// Handle to a body owned by a physics backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

/// Handle to a constraint owned by a physics backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Box { half: Vec3 },
    Sphere { radius: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Fixed,
    Kinematic,
    Dynamic,
}

/// Everything needed to create one body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub shape: Shape,
    pub kind: BodyKind,
    pub mass: f32,
    pub material: MaterialId,
    pub position: Vec3,
    pub rotation: Quat,
    /// Overlaps are reported but nothing is pushed
    pub sensor: bool,
    pub can_sleep: bool,
}

impl BodyDesc {
    fn new(shape: Shape, kind: BodyKind, position: Vec3) -> Self {
        Self {
            shape,
            kind,
            mass: 0.0,
            material: MaterialId::Default,
            position,
            rotation: Quat::IDENTITY,
            sensor: false,
            can_sleep: true,
        }
    }

    pub fn fixed_box(size: Vec3, position: Vec3) -> Self {
        Self::new(Shape::Box { half: size * 0.5 }, BodyKind::Fixed, position)
    }

    pub fn kinematic_box(size: Vec3, position: Vec3) -> Self {
        Self::new(Shape::Box { half: size * 0.5 }, BodyKind::Kinematic, position)
    }

    pub fn dynamic_box(size: Vec3, mass: f32, position: Vec3) -> Self {
        Self {
            mass,
            ..Self::new(Shape::Box { half: size * 0.5 }, BodyKind::Dynamic, position)
        }
    }

    pub fn dynamic_sphere(radius: f32, mass: f32, position: Vec3) -> Self {
        Self {
            mass,
            ..Self::new(Shape::Sphere { radius }, BodyKind::Dynamic, position)
        }
    }

    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = material;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn as_sensor(mut self) -> Self {
        self.sensor = true;
        self
    }

    pub fn never_sleep(mut self) -> Self {
        self.can_sleep = false;
        self
    }
}

/// Motorized hinge between two bodies. Anchors are in each body's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HingeDesc {
    pub axis: Vec3,
    pub anchor_a: Vec3,
    pub anchor_b: Vec3,
    pub limits: Option<[f32; 2]>,
    pub motor_speed: f32,
    pub max_force: f32,
    pub collide_connected: bool,
}

/// World-space pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl Velocity {
    pub fn is_zero(&self) -> bool {
        self.linear == Vec3::ZERO && self.angular == Vec3::ZERO
    }
}

/// The narrow set of engine operations the simulation relies on
pub trait PhysicsWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyId;

    /// Distance constraint between body centres with a mutable length
    fn create_rope(&mut self, a: BodyId, b: BodyId, length: f32) -> JointId;

    fn create_hinge(&mut self, a: BodyId, b: BodyId, desc: &HingeDesc) -> JointId;

    fn set_rope_length(&mut self, rope: JointId, length: f32);

    /// Target angular speed and the torque budget used to reach it
    fn set_hinge_motor(&mut self, hinge: JointId, speed: f32, max_force: f32);

    /// Kinematic target for the next step
    fn set_kinematic_translation(&mut self, body: BodyId, position: Vec3);

    fn pose(&self, body: BodyId) -> Option<Pose>;

    fn velocity(&self, body: BodyId) -> Option<Velocity>;

    /// Move a body to `position` keeping its orientation, with all velocity cleared
    fn teleport_at_rest(&mut self, body: BodyId, position: Vec3);

    /// Advance by exactly one internal step of `dt` seconds
    fn step(&mut self, dt: f32);
}
