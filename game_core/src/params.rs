/// Tuning parameters for the claw machine
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Cabinet
    pub const GRAVITY: f32 = -9.82;
    pub const TRAY_HALF: f32 = 3.0; // items spawn in (-3, 3)^2
    pub const ITEM_COUNT: usize = 12;
    pub const RESPAWN_HEIGHT: f32 = 0.9;
    pub const RESET_HEIGHT: f32 = 0.8;

    // Carriage
    pub const CARRIAGE_SPEED: f32 = 2.5; // units per second
    pub const CARRIAGE_LIMIT: f32 = 5.2;
    pub const CARRIAGE_START: [f32; 3] = [0.0, 4.3, 0.0];
    pub const CARRIAGE_SIZE: [f32; 3] = [1.2, 0.3, 1.2];

    // Hook and rope
    pub const HOOK_START: [f32; 3] = [0.0, 3.3, 0.0];
    pub const HOOK_RADIUS: f32 = 0.25;
    pub const HOOK_MASS: f32 = 0.3;
    pub const ROPE_MIN: f32 = 0.4;
    pub const ROPE_MAX: f32 = 3.0;
    pub const ROPE_BASE: f32 = 1.0;
    pub const WINCH_RATE: f32 = 1.8; // units per second

    // Claw
    pub const FINGER_COUNT: usize = 3;
    pub const FINGER_RADIUS: f32 = 0.45; // distance from the hook axis
    pub const FINGER_DROP: f32 = 0.15; // below the hook centre
    pub const FINGER_HEIGHT: f32 = 0.6;
    pub const FINGER_THICKNESS: f32 = 0.12;
    pub const FINGER_MASS: f32 = 0.15;
    pub const HINGE_LIMITS: [f32; 2] = [-0.2, 1.0];
    pub const HINGE_INITIAL_FORCE: f32 = 8.0;
    pub const CLOSE_RATIO: f32 = 0.6; // of ROPE_MAX

    // Goal
    pub const SENSOR_CENTER: [f32; 3] = [6.6, 0.75, 0.0];
    pub const SENSOR_HALF: [f32; 3] = [0.25, 0.75, 1.8];

    // Scoring
    pub const COMBO_WINDOW_MS: f64 = 3000.0;
    pub const COMBO_TOAST: u32 = 3;
    pub const MILESTONES: [u32; 3] = [1, 5, 10];

    // Physics
    pub const FIXED_DT: f32 = 1.0 / 60.0;
    pub const MAX_DT: f32 = 1.0 / 30.0; // cap on the per-frame physics budget
    pub const MAX_SUBSTEPS: u32 = 3;
}
