//! Deterministic stand-in for a real engine
//!
//! Bodies only move when told to: kinematic targets are applied on
//! `step`, and every rope hangs its second body straight below the first at
//! the current rope length. Commands are recorded so tests can assert on
//! exactly what the simulation asked for.

use super::{BodyDesc, BodyId, BodyKind, HingeDesc, JointId, PhysicsWorld, Pose, Velocity};
use glam::Vec3;

#[derive(Debug, Clone)]
pub struct ScriptedBody {
    pub desc: BodyDesc,
    pub pose: Pose,
    pub velocity: Velocity,
    target: Option<Vec3>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptedJoint {
    Rope {
        a: BodyId,
        b: BodyId,
        length: f32,
    },
    Hinge {
        a: BodyId,
        b: BodyId,
        desc: HingeDesc,
        speed: f32,
        max_force: f32,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedPhysics {
    pub bodies: Vec<ScriptedBody>,
    pub joints: Vec<ScriptedJoint>,
    pub steps: usize,
    pub stepped_time: f32,
    pub motor_commands: usize,
}

impl ScriptedPhysics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a body directly, as if the engine had moved it there
    pub fn set_position(&mut self, body: BodyId, position: Vec3) {
        if let Some(b) = self.bodies.get_mut(body.0 as usize) {
            b.pose.position = position;
        }
    }

    pub fn set_velocity(&mut self, body: BodyId, velocity: Velocity) {
        if let Some(b) = self.bodies.get_mut(body.0 as usize) {
            b.velocity = velocity;
        }
    }

    pub fn rope_length(&self, rope: JointId) -> Option<f32> {
        match self.joints.get(rope.0 as usize)? {
            ScriptedJoint::Rope { length, .. } => Some(*length),
            ScriptedJoint::Hinge { .. } => None,
        }
    }

    /// Last (speed, max_force) pair sent to a hinge
    pub fn hinge_motor(&self, hinge: JointId) -> Option<(f32, f32)> {
        match self.joints.get(hinge.0 as usize)? {
            ScriptedJoint::Hinge {
                speed, max_force, ..
            } => Some((*speed, *max_force)),
            ScriptedJoint::Rope { .. } => None,
        }
    }

    pub fn desc(&self, body: BodyId) -> Option<&BodyDesc> {
        self.bodies.get(body.0 as usize).map(|b| &b.desc)
    }

    fn hang_ropes(&mut self) {
        for joint in &self.joints {
            if let ScriptedJoint::Rope { a, b, length } = *joint {
                let Some(anchor) = self.bodies.get(a.0 as usize).map(|x| x.pose.position) else {
                    continue;
                };
                if let Some(hanging) = self.bodies.get_mut(b.0 as usize) {
                    hanging.pose.position = anchor - Vec3::Y * length;
                }
            }
        }
    }
}

impl PhysicsWorld for ScriptedPhysics {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyId {
        self.bodies.push(ScriptedBody {
            desc: *desc,
            pose: Pose {
                position: desc.position,
                rotation: desc.rotation,
            },
            velocity: Velocity::default(),
            target: None,
        });
        BodyId(self.bodies.len() as u32 - 1)
    }

    fn create_rope(&mut self, a: BodyId, b: BodyId, length: f32) -> JointId {
        self.joints.push(ScriptedJoint::Rope { a, b, length });
        JointId(self.joints.len() as u32 - 1)
    }

    fn create_hinge(&mut self, a: BodyId, b: BodyId, desc: &HingeDesc) -> JointId {
        self.joints.push(ScriptedJoint::Hinge {
            a,
            b,
            desc: *desc,
            speed: desc.motor_speed,
            max_force: desc.max_force,
        });
        JointId(self.joints.len() as u32 - 1)
    }

    fn set_rope_length(&mut self, rope: JointId, new_length: f32) {
        if let Some(ScriptedJoint::Rope { length, .. }) = self.joints.get_mut(rope.0 as usize) {
            *length = new_length;
        }
    }

    fn set_hinge_motor(&mut self, hinge: JointId, new_speed: f32, new_force: f32) {
        if let Some(ScriptedJoint::Hinge {
            speed, max_force, ..
        }) = self.joints.get_mut(hinge.0 as usize)
        {
            *speed = new_speed;
            *max_force = new_force;
            self.motor_commands += 1;
        }
    }

    fn set_kinematic_translation(&mut self, body: BodyId, position: Vec3) {
        if let Some(b) = self.bodies.get_mut(body.0 as usize) {
            if b.desc.kind == BodyKind::Kinematic {
                b.target = Some(position);
            }
        }
    }

    fn pose(&self, body: BodyId) -> Option<Pose> {
        self.bodies.get(body.0 as usize).map(|b| b.pose)
    }

    fn velocity(&self, body: BodyId) -> Option<Velocity> {
        self.bodies.get(body.0 as usize).map(|b| b.velocity)
    }

    fn teleport_at_rest(&mut self, body: BodyId, position: Vec3) {
        if let Some(b) = self.bodies.get_mut(body.0 as usize) {
            b.pose.position = position;
            b.velocity = Velocity::default();
            b.target = None;
        }
    }

    fn step(&mut self, dt: f32) {
        for body in &mut self.bodies {
            if let Some(target) = body.target.take() {
                body.pose.position = target;
            }
        }
        self.hang_ropes();
        self.steps += 1;
        self.stepped_time += dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rope_hangs_body_below_anchor() {
        let mut physics = ScriptedPhysics::new();
        let top = physics.create_body(&BodyDesc::kinematic_box(Vec3::ONE, Vec3::new(1.0, 4.0, 2.0)));
        let bottom = physics.create_body(&BodyDesc::dynamic_sphere(0.25, 0.3, Vec3::ZERO));
        let rope = physics.create_rope(top, bottom, 1.0);

        physics.set_rope_length(rope, 2.5);
        physics.step(1.0 / 60.0);

        assert_eq!(physics.pose(bottom).unwrap().position, Vec3::new(1.0, 1.5, 2.0));
        assert_eq!(physics.rope_length(rope), Some(2.5));
    }

    #[test]
    fn test_only_kinematic_bodies_follow_targets() {
        let mut physics = ScriptedPhysics::new();
        let fixed = physics.create_body(&BodyDesc::fixed_box(Vec3::ONE, Vec3::ZERO));
        physics.set_kinematic_translation(fixed, Vec3::X);
        physics.step(1.0 / 60.0);
        assert_eq!(physics.pose(fixed).unwrap().position, Vec3::ZERO);
    }
}
