//! Frame description for a renderer
//!
//! `plan_frame` turns the ECS mirror into a flat list of mesh instances,
//! line strips and render passes. A backend only uploads and draws what
//! the plan holds, so the whole scene layout can be tested without a GPU.

use crate::effects::{ParticleField, PARTICLE_COLOR, PARTICLE_RADIUS};
use crate::physics::Shape;
use crate::{CabinetMap, Carriage, Hook, Layer, Visual};
use glam::{Mat4, Quat, Vec3};
use hecs::World;
use proto::Settings;

pub const BACKGROUND: u32 = 0x0b0f14;
pub const ROPE_COLOR: u32 = 0xe6edf3;
pub const BOUNDARY_COLOR: u32 = 0x00d1ff;
pub const GOAL_ICON_COLOR: u32 = 0xffd166;
pub const GRID_CENTER_COLOR: u32 = 0x335566;
pub const GRID_COLOR: u32 = 0x223344;

/// Height of the minimap overlays above the floor
pub const OVERLAY_Y: f32 = 0.03;
pub const GOAL_ICON_SIZE: f32 = 0.9;
pub const GRID_SIZE: f32 = 12.0;
pub const GRID_DIVISIONS: u32 = 12;

pub const MINIMAP_MAX_WIDTH: u32 = 280;
pub const MINIMAP_MAX_HEIGHT: u32 = 180;
pub const MINIMAP_PERCENT: u32 = 22;
pub const MINIMAP_MARGIN: u32 = 8;

pub const AMBIENT_LIGHT: f32 = 0.4;
pub const SUN_INTENSITY: f32 = 0.9;
pub const SUN_POSITION: Vec3 = Vec3::new(5.0, 10.0, 7.0);

const SHADOW_ALPHA: f32 = 0.35;
const SHADOW_LIFT: f32 = 0.01;

// ============================================================================
// Cameras and viewports
// ============================================================================

/// Pixel rectangle, origin at the top-left of the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Top-right inset, or `None` when the canvas is too small to hold one
    pub fn minimap(width: u32, height: u32) -> Option<Self> {
        let w = MINIMAP_MAX_WIDTH.min(width * MINIMAP_PERCENT / 100);
        let h = MINIMAP_MAX_HEIGHT.min(height * MINIMAP_PERCENT / 100);
        if w == 0 || h == 0 || w + MINIMAP_MARGIN > width {
            return None;
        }
        Some(Self {
            x: width - w - MINIMAP_MARGIN,
            y: MINIMAP_MARGIN,
            width: w,
            height: h,
        })
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective { fov_y_deg: f32, near: f32, far: f32 },
    Orthographic { half_size: f32, near: f32, far: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub projection: Projection,
}

impl CameraRig {
    /// Perspective camera, either angled or straight down
    pub fn main(top_view: bool) -> Self {
        let eye = if top_view {
            Vec3::new(0.0, 16.0, 0.001)
        } else {
            Vec3::new(6.0, 6.0, 10.0)
        };
        Self {
            eye,
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection: Projection::Perspective {
                fov_y_deg: 60.0,
                near: 0.1,
                far: 200.0,
            },
        }
    }

    /// Overhead orthographic view that follows the carriage
    pub fn minimap(carriage: Vec3) -> Self {
        Self {
            eye: Vec3::new(carriage.x, 20.0, carriage.z + 0.001),
            target: Vec3::new(carriage.x, 0.0, carriage.z),
            up: Vec3::NEG_Z,
            projection: Projection::Orthographic {
                half_size: 10.0,
                near: 0.1,
                far: 100.0,
            },
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        match self.projection {
            Projection::Perspective { fov_y_deg, near, far } => {
                Mat4::perspective_rh(fov_y_deg.to_radians(), aspect, near, far)
            }
            Projection::Orthographic { half_size, near, far } => {
                let s = half_size;
                Mat4::orthographic_rh(-s * aspect, s * aspect, -s, s, near, far)
            }
        }
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }
}

// ============================================================================
// Drawables
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshKind {
    Cube,
    Sphere,
}

impl From<Shape> for MeshKind {
    fn from(shape: Shape) -> Self {
        match shape {
            Shape::Box { .. } => MeshKind::Cube,
            Shape::Sphere { .. } => MeshKind::Sphere,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshInstance {
    pub mesh: MeshKind,
    pub model: Mat4,
    /// Linear RGBA
    pub color: [f32; 4],
    pub layer: Layer,
}

/// Polyline in world space
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub points: Vec<Vec3>,
    /// Joins the last point back to the first
    pub closed: bool,
    pub color: [f32; 4],
    pub layer: Layer,
}

impl Line {
    /// Pairs of endpoints, ready for a line-list topology
    pub fn segments(&self) -> Vec<(Vec3, Vec3)> {
        let mut out: Vec<(Vec3, Vec3)> = self.points.windows(2).map(|w| (w[0], w[1])).collect();
        if self.closed && self.points.len() > 2 {
            if let (Some(&last), Some(&first)) = (self.points.last(), self.points.first()) {
                out.push((last, first));
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPass {
    pub label: &'static str,
    pub camera: CameraRig,
    pub viewport: Viewport,
    pub scissor: Option<Viewport>,
    /// Also draw minimap-only geometry
    pub minimap_layer: bool,
    pub clear: Option<[f32; 4]>,
}

impl RenderPass {
    pub fn sees(&self, layer: Layer) -> bool {
        match layer {
            Layer::World => true,
            Layer::Minimap => self.minimap_layer,
        }
    }

    pub fn view_proj(&self) -> Mat4 {
        self.camera.view_proj(self.viewport.aspect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FramePlan {
    pub passes: Vec<RenderPass>,
    pub meshes: Vec<MeshInstance>,
    pub lines: Vec<Line>,
}

impl FramePlan {
    pub fn visible_meshes<'a>(&'a self, pass: &'a RenderPass) -> impl Iterator<Item = &'a MeshInstance> {
        self.meshes.iter().filter(move |m| pass.sees(m.layer))
    }

    pub fn visible_lines<'a>(&'a self, pass: &'a RenderPass) -> impl Iterator<Item = &'a Line> {
        self.lines.iter().filter(move |l| pass.sees(l.layer))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SceneOptions {
    pub top_view: bool,
    pub settings: Settings,
}

/// Backend seam. The browser client implements it on wgpu.
pub trait Renderer {
    type Error;

    fn render(&mut self, plan: &FramePlan) -> Result<(), Self::Error>;
    fn resize(&mut self, width: u32, height: u32);
}

// ============================================================================
// Planning
// ============================================================================

/// Describe everything to draw this frame
pub fn plan_frame(
    world: &World,
    map: &CabinetMap,
    particles: &ParticleField,
    options: &SceneOptions,
    width: u32,
    height: u32,
) -> FramePlan {
    let mut plan = FramePlan::default();
    let settings = &options.settings;

    for (_, visual) in world.query::<&Visual>().iter() {
        plan.meshes.push(MeshInstance {
            mesh: visual.shape.into(),
            model: visual.model_matrix(),
            color: rgba(visual.color, 1.0),
            layer: visual.layer,
        });
        if settings.shadows && visual.casts_shadow {
            plan.meshes.push(blob_shadow(visual));
        }
    }

    if let Some(rope) = rope_line(world) {
        plan.lines.push(rope);
    }

    if settings.particles {
        for p in particles.iter() {
            let model = Mat4::from_scale_rotation_translation(
                Vec3::splat(PARTICLE_RADIUS),
                Quat::IDENTITY,
                p.position,
            );
            plan.meshes.push(MeshInstance {
                mesh: MeshKind::Sphere,
                model,
                color: rgba(PARTICLE_COLOR, p.opacity()),
                layer: Layer::World,
            });
        }
    }

    plan.lines.push(boundary_loop(map.boundary));
    plan.lines.push(goal_icon(map.goal.center()));
    if settings.mini_grid {
        plan.lines.extend(grid_lines());
    }

    let carriage = world
        .query::<&Carriage>()
        .iter()
        .map(|(_, c)| c.position)
        .next()
        .unwrap_or_default();

    plan.passes.push(RenderPass {
        label: "main",
        camera: CameraRig::main(options.top_view),
        viewport: Viewport::full(width, height),
        scissor: None,
        minimap_layer: false,
        clear: Some(rgba(BACKGROUND, 1.0)),
    });
    if let Some(inset) = Viewport::minimap(width, height) {
        plan.passes.push(RenderPass {
            label: "minimap",
            camera: CameraRig::minimap(carriage),
            viewport: inset,
            scissor: Some(inset),
            minimap_layer: true,
            clear: Some(rgba(BACKGROUND, 1.0)),
        });
    }

    plan
}

fn blob_shadow(visual: &Visual) -> MeshInstance {
    let radius = match visual.shape {
        Shape::Box { half } => half.x.max(half.z),
        Shape::Sphere { radius } => radius,
    };
    let model = Mat4::from_scale_rotation_translation(
        Vec3::new(radius, 0.001, radius),
        Quat::IDENTITY,
        Vec3::new(visual.position.x, SHADOW_LIFT, visual.position.z),
    );
    MeshInstance {
        mesh: MeshKind::Sphere,
        model,
        color: [0.0, 0.0, 0.0, SHADOW_ALPHA],
        layer: Layer::World,
    }
}

fn rope_line(world: &World) -> Option<Line> {
    let mut carriages = world.query::<(&Carriage, &Visual)>();
    let (_, (_, top)) = carriages.iter().next()?;
    let mut hooks = world.query::<(&Hook, &Visual)>();
    let (_, (_, bottom)) = hooks.iter().next()?;
    Some(Line {
        points: vec![top.position, bottom.position],
        closed: false,
        color: rgba(ROPE_COLOR, 1.0),
        layer: Layer::World,
    })
}

fn boundary_loop(extent: f32) -> Line {
    let y = OVERLAY_Y;
    Line {
        points: vec![
            Vec3::new(-extent, y, -extent),
            Vec3::new(extent, y, -extent),
            Vec3::new(extent, y, extent),
            Vec3::new(-extent, y, extent),
        ],
        closed: true,
        color: rgba(BOUNDARY_COLOR, 1.0),
        layer: Layer::Minimap,
    }
}

/// Arrow pointing away from the cabinet centre, placed over the goal
fn goal_icon(goal: Vec3) -> Line {
    let t = GOAL_ICON_SIZE;
    let place = Mat4::from_rotation_translation(
        Quat::from_rotation_y(goal.z.atan2(goal.x)),
        Vec3::new(goal.x, 0.0, goal.z),
    );
    let points = [
        Vec3::new(0.0, OVERLAY_Y, -t * 0.8),
        Vec3::new(t, OVERLAY_Y, 0.0),
        Vec3::new(0.0, OVERLAY_Y, t * 0.8),
    ]
    .into_iter()
    .map(|p| place.transform_point3(p))
    .collect();
    Line {
        points,
        closed: true,
        color: rgba(GOAL_ICON_COLOR, 1.0),
        layer: Layer::Minimap,
    }
}

/// Flat grid in the XZ plane, centre lines highlighted
fn grid_lines() -> Vec<Line> {
    let half = GRID_SIZE / 2.0;
    let step = GRID_SIZE / GRID_DIVISIONS as f32;
    let mut lines = Vec::new();
    for i in 0..=GRID_DIVISIONS {
        let k = -half + i as f32 * step;
        let color = if i == GRID_DIVISIONS / 2 {
            rgba(GRID_CENTER_COLOR, 1.0)
        } else {
            rgba(GRID_COLOR, 1.0)
        };
        for (a, b) in [
            (Vec3::new(k, OVERLAY_Y, -half), Vec3::new(k, OVERLAY_Y, half)),
            (Vec3::new(-half, OVERLAY_Y, k), Vec3::new(half, OVERLAY_Y, k)),
        ] {
            lines.push(Line {
                points: vec![a, b],
                closed: false,
                color,
                layer: Layer::Minimap,
            });
        }
    }
    lines
}

/// Hex sRGB colour to linear RGBA
pub fn rgba(hex: u32, alpha: f32) -> [f32; 4] {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0), alpha]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::ParticleField;
    use crate::physics::ScriptedPhysics;
    use crate::setup::spawn_cabinet;
    use crate::{Config, GameRng};
    use rand::SeedableRng;

    fn scene() -> (World, CabinetMap) {
        let mut world = World::new();
        let mut physics = ScriptedPhysics::new();
        let map = CabinetMap::new();
        let mut rng = GameRng::new(7);
        spawn_cabinet(&mut world, &mut physics, &map, &Config::new(), &mut rng);
        crate::systems::sync_visuals(&mut world, &physics);
        (world, map)
    }

    #[test]
    fn test_minimap_viewport_sits_top_right() {
        let inset = Viewport::minimap(1920, 1080).unwrap();
        assert_eq!((inset.width, inset.height), (280, 180));
        assert_eq!((inset.x, inset.y), (1920 - 280 - 8, 8));

        let small = Viewport::minimap(800, 600).unwrap();
        assert_eq!((small.width, small.height), (176, 132));
        assert!(Viewport::minimap(2, 2).is_none(), "Nothing fits");
    }

    #[test]
    fn test_minimap_camera_follows_carriage() {
        let rig = CameraRig::minimap(Vec3::new(2.0, 4.3, -1.0));
        assert_eq!(rig.eye, Vec3::new(2.0, 20.0, -0.999));
        assert_eq!(rig.target, Vec3::new(2.0, 0.0, -1.0));
        let clip = rig.view_proj(1.0) * Vec3::new(2.0, 0.0, -1.0).extend(1.0);
        assert!(clip.x.abs() < 1e-3 && clip.y.abs() < 1e-3, "Carriage is centred");
    }

    #[test]
    fn test_minimap_overlays_only_on_minimap_pass() {
        let (world, map) = scene();
        let options = SceneOptions {
            top_view: false,
            settings: Settings {
                mini_grid: true,
                ..Settings::default()
            },
        };
        let plan = plan_frame(&world, &map, &ParticleField::new(), &options, 1280, 720);
        assert_eq!(plan.passes.len(), 2);
        let main = plan.passes[0];
        let mini = plan.passes[1];

        let main_lines = plan.visible_lines(&main).count();
        let mini_lines = plan.visible_lines(&mini).count();
        assert_eq!(main_lines, 1, "Only the rope");
        assert_eq!(mini_lines, 1 + 2 + 26, "Rope, boundary, goal icon and grid");
    }

    #[test]
    fn test_boundary_and_goal_icon_geometry() {
        let boundary = boundary_loop(5.85);
        assert_eq!(boundary.segments().len(), 4);
        assert!(boundary.points.iter().all(|p| p.x.abs() == 5.85 && p.z.abs() == 5.85));

        let icon = goal_icon(Vec3::new(6.6, 0.75, 0.0));
        let tip = icon.points[1];
        assert!((tip - Vec3::new(7.5, OVERLAY_Y, 0.0)).length() < 1e-5, "Points outward along +X");
    }

    #[test]
    fn test_settings_gate_shadows_and_particles() {
        let (world, map) = scene();
        let mut particles = ParticleField::new();
        particles.burst(map.goal.center(), &mut rand::rngs::StdRng::seed_from_u64(3));

        let on = SceneOptions::default();
        let off = SceneOptions {
            top_view: true,
            settings: Settings {
                shadows: false,
                particles: false,
                mini_grid: false,
            },
        };
        let full = plan_frame(&world, &map, &particles, &on, 800, 600);
        let bare = plan_frame(&world, &map, &particles, &off, 800, 600);
        let shadows = world.query::<&Visual>().iter().filter(|(_, v)| v.casts_shadow).count();
        assert!(shadows > 0);
        assert_eq!(full.meshes.len(), bare.meshes.len() + shadows + 12);
        assert_eq!(bare.passes[0].camera.eye, Vec3::new(0.0, 16.0, 0.001));
    }

    #[test]
    fn test_rope_runs_from_carriage_to_hook() {
        let (world, map) = scene();
        let plan = plan_frame(&world, &map, &ParticleField::new(), &SceneOptions::default(), 800, 600);
        let rope = &plan.lines[0];
        assert_eq!(rope.points.len(), 2);
        assert!(rope.points[0].y > rope.points[1].y, "Hook hangs below");
    }

    #[test]
    fn test_rgba_linearises() {
        assert_eq!(rgba(0x000000, 1.0), [0.0, 0.0, 0.0, 1.0]);
        let white = rgba(0xffffff, 0.5);
        assert!((white[0] - 1.0).abs() < 1e-6 && white[3] == 0.5);
        let mid = rgba(0x808080, 1.0)[0];
        assert!(mid > 0.2 && mid < 0.23);
    }
}
