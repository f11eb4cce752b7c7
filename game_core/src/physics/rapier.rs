//! rapier3d backend

use super::materials::{contact_for, MaterialId};
use super::{BodyDesc, BodyId, BodyKind, HingeDesc, JointId, PhysicsWorld, Pose, Shape, Velocity};
use crate::params::Params;
use glam::{Quat, Vec3};
use rapier3d::na;
use rapier3d::prelude::*;

/// Damping factor passed to the velocity motors
const MOTOR_FACTOR: Real = 1.0;

/// Applies the pairwise material table to every solver contact
struct MaterialHooks;

impl PhysicsHooks for MaterialHooks {
    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        let (Some(c1), Some(c2)) = (
            context.colliders.get(context.collider1),
            context.colliders.get(context.collider2),
        ) else {
            return;
        };
        let pair = contact_for(
            MaterialId::from_raw(c1.user_data),
            MaterialId::from_raw(c2.user_data),
        );
        for contact in context.solver_contacts.iter_mut() {
            contact.friction = pair.friction;
            contact.restitution = pair.restitution;
        }
    }
}

pub struct RapierWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    query_pipeline: QueryPipeline,
    hooks: MaterialHooks,
    handles: Vec<RigidBodyHandle>,
    joints: Vec<ImpulseJointHandle>,
}

impl RapierWorld {
    pub fn new() -> Self {
        Self {
            gravity: vector![0.0, Params::GRAVITY, 0.0],
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            hooks: MaterialHooks,
            handles: Vec::new(),
            joints: Vec::new(),
        }
    }

    pub fn body_count(&self) -> usize {
        self.handles.len()
    }

    fn handle(&self, body: BodyId) -> Option<RigidBodyHandle> {
        self.handles.get(body.0 as usize).copied()
    }

    fn joint(&self, joint: JointId) -> Option<ImpulseJointHandle> {
        self.joints.get(joint.0 as usize).copied()
    }

    fn push_joint(&mut self, handle: ImpulseJointHandle) -> JointId {
        self.joints.push(handle);
        JointId(self.joints.len() as u32 - 1)
    }

    fn joint_between(
        &mut self,
        a: BodyId,
        b: BodyId,
        data: impl Into<GenericJoint>,
    ) -> Option<ImpulseJointHandle> {
        let (ha, hb) = (self.handle(a)?, self.handle(b)?);
        Some(self.impulse_joints.insert(ha, hb, data, true))
    }
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new()
    }
}

fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn to_point(v: Vec3) -> Point<Real> {
    point![v.x, v.y, v.z]
}

fn to_isometry(position: Vec3, rotation: Quat) -> Isometry<Real> {
    let q = na::Quaternion::new(rotation.w, rotation.x, rotation.y, rotation.z);
    Isometry::from_parts(
        Translation::new(position.x, position.y, position.z),
        Rotation::from_quaternion(q),
    )
}

fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

impl PhysicsWorld for RapierWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyId {
        let builder = match desc.kind {
            BodyKind::Fixed => RigidBodyBuilder::fixed(),
            BodyKind::Kinematic => RigidBodyBuilder::kinematic_position_based(),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
        };
        let body = builder
            .position(to_isometry(desc.position, desc.rotation))
            .can_sleep(desc.can_sleep)
            .build();
        let handle = self.bodies.insert(body);

        let collider = match desc.shape {
            Shape::Box { half } => ColliderBuilder::cuboid(half.x, half.y, half.z),
            Shape::Sphere { radius } => ColliderBuilder::ball(radius),
        };
        let mut collider = collider
            .sensor(desc.sensor)
            .user_data(desc.material.raw())
            .active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS);
        if desc.kind == BodyKind::Dynamic && desc.mass > 0.0 {
            collider = collider.mass(desc.mass);
        }
        self.colliders
            .insert_with_parent(collider.build(), handle, &mut self.bodies);

        self.handles.push(handle);
        BodyId(self.handles.len() as u32 - 1)
    }

    fn create_rope(&mut self, a: BodyId, b: BodyId, length: f32) -> JointId {
        let rope = RopeJointBuilder::new(length)
            .local_anchor1(point![0.0, 0.0, 0.0])
            .local_anchor2(point![0.0, 0.0, 0.0]);
        match self.joint_between(a, b, rope) {
            Some(handle) => self.push_joint(handle),
            None => JointId(u32::MAX),
        }
    }

    fn create_hinge(&mut self, a: BodyId, b: BodyId, desc: &HingeDesc) -> JointId {
        let axis = UnitVector::new_normalize(to_vector(desc.axis));
        let mut hinge = RevoluteJointBuilder::new(axis)
            .local_anchor1(to_point(desc.anchor_a))
            .local_anchor2(to_point(desc.anchor_b))
            .motor_velocity(desc.motor_speed, MOTOR_FACTOR)
            .motor_max_force(desc.max_force)
            .contacts_enabled(desc.collide_connected);
        if let Some(limits) = desc.limits {
            hinge = hinge.limits(limits);
        }
        match self.joint_between(a, b, hinge) {
            Some(handle) => self.push_joint(handle),
            None => JointId(u32::MAX),
        }
    }

    fn set_rope_length(&mut self, rope: JointId, length: f32) {
        let Some(handle) = self.joint(rope) else {
            return;
        };
        if let Some(joint) = self.impulse_joints.get_mut(handle) {
            joint.data.set_limits(JointAxis::LinX, [0.0, length]);
        }
    }

    fn set_hinge_motor(&mut self, hinge: JointId, speed: f32, max_force: f32) {
        let Some(handle) = self.joint(hinge) else {
            return;
        };
        if let Some(joint) = self.impulse_joints.get_mut(handle) {
            joint
                .data
                .set_motor_velocity(JointAxis::AngX, speed, MOTOR_FACTOR);
            joint.data.set_motor_max_force(JointAxis::AngX, max_force);
        }
    }

    fn set_kinematic_translation(&mut self, body: BodyId, position: Vec3) {
        let Some(handle) = self.handle(body) else {
            return;
        };
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.set_next_kinematic_translation(to_vector(position));
        }
    }

    fn pose(&self, body: BodyId) -> Option<Pose> {
        let rb = self.bodies.get(self.handle(body)?)?;
        let q = rb.rotation().coords;
        Some(Pose {
            position: from_vector(rb.translation()),
            rotation: Quat::from_xyzw(q.x, q.y, q.z, q.w),
        })
    }

    fn velocity(&self, body: BodyId) -> Option<Velocity> {
        let rb = self.bodies.get(self.handle(body)?)?;
        Some(Velocity {
            linear: from_vector(rb.linvel()),
            angular: from_vector(rb.angvel()),
        })
    }

    fn teleport_at_rest(&mut self, body: BodyId, position: Vec3) {
        let Some(handle) = self.handle(body) else {
            return;
        };
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.set_translation(to_vector(position), true);
            if rb.is_kinematic() {
                rb.set_next_kinematic_translation(to_vector(position));
            }
            rb.set_linvel(Vector::zeros(), true);
            rb.set_angvel(Vector::zeros(), true);
        }
    }

    fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.query_pipeline),
            &self.hooks,
            &(),
        );
    }
}
