use crate::physics::{BodyId, JointId, Shape};
use glam::{Mat4, Quat, Vec3};

/// Links an entity to its physics body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Body {
    pub id: BodyId,
}

/// Render layer: 0 is seen by every camera, 1 only by the minimap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layer {
    #[default]
    World,
    Minimap,
}

/// Read-only mirror of a body for the renderer, refreshed every frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visual {
    pub shape: Shape,
    pub color: u32,
    pub layer: Layer,
    pub position: Vec3,
    pub rotation: Quat,
    /// Dynamic bodies get a blob shadow
    pub casts_shadow: bool,
}

impl Visual {
    pub fn new(shape: Shape, color: u32) -> Self {
        Self {
            shape,
            color,
            layer: Layer::World,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            casts_shadow: false,
        }
    }

    pub fn with_shadow(mut self) -> Self {
        self.casts_shadow = true;
        self
    }

    /// Model matrix for a unit cube or unit-radius sphere mesh
    pub fn model_matrix(&self) -> Mat4 {
        let scale = match self.shape {
            Shape::Box { half } => half * 2.0,
            Shape::Sphere { radius } => Vec3::splat(radius),
        };
        Mat4::from_scale_rotation_translation(scale, self.rotation, self.position)
    }
}

/// Gantry carriage. `position` is the commanded kinematic pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Carriage {
    pub position: Vec3,
}

/// Hook hanging from the carriage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hook {
    pub rope: JointId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finger {
    pub index: usize,
    pub hinge: JointId,
}

impl Finger {
    /// Mounting angle around the hook axis
    pub fn angle(&self) -> f32 {
        self.index as f32 * std::f32::consts::TAU / crate::Params::FINGER_COUNT as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrizeKind {
    Plush,
    Case,
}

/// A prize in the tray
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub index: usize,
    pub kind: PrizeKind,
}

/// Marks the goal volume entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalSensor;

/// Static cabinet geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticProp {
    pub name: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finger_angles_are_spaced_evenly() {
        let angles: Vec<f32> = (0..3)
            .map(|index| {
                Finger {
                    index,
                    hinge: JointId(0),
                }
                .angle()
            })
            .collect();
        assert_eq!(angles[0], 0.0);
        assert!((angles[1] - 2.0 * std::f32::consts::PI / 3.0).abs() < 1e-6);
        assert!((angles[2] - 4.0 * std::f32::consts::PI / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_box_model_matrix_scales_by_full_size() {
        let mut visual = Visual::new(
            Shape::Box {
                half: Vec3::new(0.6, 0.15, 0.6),
            },
            0,
        );
        visual.position = Vec3::new(1.0, 4.3, 0.0);
        let corner = visual.model_matrix().transform_point3(Vec3::splat(0.5));
        assert!((corner - Vec3::new(1.6, 4.45, 0.6)).length() < 1e-5);
    }
}
