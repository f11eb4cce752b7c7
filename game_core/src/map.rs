use crate::params::Params;
use glam::{Vec2, Vec3};
use rand::Rng;

/// Axis-aligned box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb3 {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_half(center: Vec3, half: Vec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Strict interior test; points on a face are outside
    pub fn contains(&self, point: Vec3) -> bool {
        point.x > self.min.x
            && point.x < self.max.x
            && point.y > self.min.y
            && point.y < self.max.y
            && point.z > self.min.z
            && point.z < self.max.z
    }
}

/// Static box making up the cabinet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prop {
    pub name: &'static str,
    pub center: Vec3,
    pub size: Vec3,
    pub color: u32,
}

impl Prop {
    fn new(name: &'static str, center: [f32; 3], size: [f32; 3], color: u32) -> Self {
        Self {
            name,
            center: Vec3::from(center),
            size: Vec3::from(size),
            color,
        }
    }
}

/// Rectangle on the tray floor where prizes are dropped
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tray {
    pub half: f32,
}

impl Tray {
    /// Uniform point in the open square (-half, half)^2
    pub fn random_xz(&self, rng: &mut impl Rng) -> Vec2 {
        let x = (rng.gen::<f32>() - 0.5) * 2.0 * self.half;
        let z = (rng.gen::<f32>() - 0.5) * 2.0 * self.half;
        Vec2::new(x, z)
    }

    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        x.abs() <= self.half && z.abs() <= self.half
    }
}

/// Cabinet layout: static geometry, goal volume and prize tray
#[derive(Debug, Clone)]
pub struct CabinetMap {
    pub props: Vec<Prop>,
    pub goal: Aabb3,
    pub tray: Tray,
    /// Inner wall extent used by the minimap boundary
    pub boundary: f32,
}

pub const WALL_THICKNESS: f32 = 0.3;
pub const WALL_HEIGHT: f32 = 2.2;

const WALL_COLOR: u32 = 0x1b2631;
const RAIL_COLOR: u32 = 0x6c7a89;

impl CabinetMap {
    pub fn new() -> Self {
        let t = WALL_THICKNESS;
        let h = WALL_HEIGHT;
        let wall_y = h / 2.0 - 0.25;

        let props = vec![
            Prop::new("ground", [0.0, -0.25, 0.0], [12.0, 0.5, 12.0], 0x22313f),
            // Walls
            Prop::new("wall_back", [0.0, wall_y, -6.0 + t / 2.0], [12.0, h, t], WALL_COLOR),
            Prop::new("wall_front", [0.0, wall_y, 6.0 - t / 2.0], [12.0, h, t], WALL_COLOR),
            Prop::new("wall_left", [-6.0 + t / 2.0, wall_y, 0.0], [t, h, 12.0], WALL_COLOR),
            Prop::new("wall_right", [6.0 - t / 2.0, wall_y, 0.0], [t, h, 12.0], WALL_COLOR),
            // Chute opening on the +X side
            Prop::new("chute_left", [6.0 - t / 2.0, 0.25, -3.25], [t, 1.0, 3.5], WALL_COLOR),
            Prop::new("chute_right", [6.0 - t / 2.0, 0.25, 3.25], [t, 1.0, 3.5], WALL_COLOR),
            Prop::new("ramp", [5.0, 0.2, 0.0], [2.0, 0.2, 3.6], 0x2c3e50),
            // Gantry
            Prop::new("rail_back", [0.0, 4.5, -3.5], [12.0, 0.2, 0.2], RAIL_COLOR),
            Prop::new("rail_front", [0.0, 4.5, 3.5], [12.0, 0.2, 0.2], RAIL_COLOR),
            Prop::new("rail_cross", [0.0, 4.7, 0.0], [0.2, 0.2, 7.0], RAIL_COLOR),
        ];

        Self {
            props,
            goal: Aabb3::from_center_half(
                Vec3::from(Params::SENSOR_CENTER),
                Vec3::from(Params::SENSOR_HALF),
            ),
            tray: Tray {
                half: Params::TRAY_HALF,
            },
            boundary: 6.0 - t / 2.0,
        }
    }
}

impl Default for CabinetMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_goal_contains_is_strict() {
        let map = CabinetMap::new();
        assert!(map.goal.contains(Vec3::new(6.6, 0.75, 0.0)));
        assert!(!map.goal.contains(Vec3::new(6.35, 0.75, 0.0)), "Face is outside");
        assert!(!map.goal.contains(Vec3::new(6.6, 0.75, 1.8)), "Face is outside");
        assert!(map.goal.contains(Vec3::new(6.84, 1.49, -1.79)));
        assert!(!map.goal.contains(Vec3::new(5.0, 0.5, 0.0)));
    }

    #[test]
    fn test_goal_sits_beyond_right_wall() {
        let map = CabinetMap::new();
        let wall = map
            .props
            .iter()
            .find(|p| p.name == "wall_right")
            .expect("right wall exists");
        assert!(map.goal.min.x > wall.center.x, "Goal is outside the cabinet");
    }

    #[test]
    fn test_tray_samples_stay_inside() {
        let tray = CabinetMap::new().tray;
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let p = tray.random_xz(&mut rng);
            assert!(tray.contains_xz(p.x, p.y), "Sample {p:?} left the tray");
        }
    }

    #[test]
    fn test_boundary_matches_inner_wall() {
        let map = CabinetMap::new();
        assert!((map.boundary - 5.85).abs() < 1e-6);
    }
}
