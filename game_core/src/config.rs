use crate::params::Params;
use glam::Vec3;
use proto::Difficulty;

/// Per-difficulty timer and claw motor settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    pub timer_secs: f32,
    pub close_force: f32,
    pub open_force: f32,
    pub close_speed: f32, // rad/s, negative closes
    pub open_speed: f32,
}

impl DifficultyProfile {
    pub const fn of(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                timer_secs: 90.0,
                close_force: 14.0,
                open_force: 6.0,
                close_speed: -2.2,
                open_speed: 1.6,
            },
            Difficulty::Normal => Self {
                timer_secs: 60.0,
                close_force: 12.0,
                open_force: 6.0,
                close_speed: -2.0,
                open_speed: 1.8,
            },
            Difficulty::Hard => Self {
                timer_secs: 45.0,
                close_force: 10.0,
                open_force: 6.0,
                close_speed: -1.7,
                open_speed: 2.0,
            },
        }
    }
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub carriage_speed: f32,
    pub carriage_limit: f32,
    pub rope_min: f32,
    pub rope_max: f32,
    pub rope_base: f32,
    pub winch_rate: f32,
    pub close_ratio: f32,
    pub combo_window_ms: f64,
    pub fixed_dt: f32,
    pub max_dt: f32,
    pub max_substeps: u32,
    pub item_count: usize,
    pub tray_half: f32,
    pub difficulty: Difficulty,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            carriage_speed: Params::CARRIAGE_SPEED,
            carriage_limit: Params::CARRIAGE_LIMIT,
            rope_min: Params::ROPE_MIN,
            rope_max: Params::ROPE_MAX,
            rope_base: Params::ROPE_BASE,
            winch_rate: Params::WINCH_RATE,
            close_ratio: Params::CLOSE_RATIO,
            combo_window_ms: Params::COMBO_WINDOW_MS,
            fixed_dt: Params::FIXED_DT,
            max_dt: Params::MAX_DT,
            max_substeps: Params::MAX_SUBSTEPS,
            item_count: Params::ITEM_COUNT,
            tray_half: Params::TRAY_HALF,
            difficulty: Difficulty::Normal,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    pub fn profile(&self) -> DifficultyProfile {
        DifficultyProfile::of(self.difficulty)
    }

    /// Clamp a carriage position to the gantry in X and Z, keeping its height
    pub fn clamp_carriage(&self, pos: Vec3) -> Vec3 {
        let limit = self.carriage_limit;
        Vec3::new(pos.x.clamp(-limit, limit), pos.y, pos.z.clamp(-limit, limit))
    }

    pub fn clamp_rope(&self, length: f32) -> f32 {
        length.clamp(self.rope_min, self.rope_max)
    }

    /// Rope length beyond which a held grab closes the claw
    pub fn close_threshold(&self) -> f32 {
        self.rope_max * self.close_ratio
    }
}
