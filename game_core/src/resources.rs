use crate::params::Params;

/// Timing for one rendered frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    pub now_ms: f64,
    /// Uncapped wall-clock delta in seconds, used by the run timer
    pub real_dt: f32,
    /// Delta capped at `Params::MAX_DT`, used for motion and physics
    pub dt: f32,
}

impl FrameTime {
    pub fn new(now_ms: f64, real_dt: f32) -> Self {
        let real_dt = real_dt.max(0.0);
        Self {
            now_ms,
            real_dt,
            dt: real_dt.min(Params::MAX_DT),
        }
    }
}

/// Turns frame-callback timestamps into frame deltas
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first tick has a zero delta
    pub fn tick(&mut self, now_ms: f64) -> FrameTime {
        let real_dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        FrameTime::new(now_ms, real_dt)
    }
}

/// Fixed-step accumulator: whole sub-steps only, at most `max_substeps` per
/// frame, leftover time carried modulo the step size
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedStepper {
    accumulator: f32,
}

impl FixedStepper {
    const EPSILON: f32 = 1e-6;

    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many fixed steps to run for this frame
    pub fn advance(&mut self, dt: f32, fixed: f32, max_substeps: u32) -> u32 {
        self.accumulator += dt.max(0.0);
        let mut substeps = 0;
        while self.accumulator + Self::EPSILON >= fixed && substeps < max_substeps {
            self.accumulator -= fixed;
            substeps += 1;
        }
        self.accumulator = self.accumulator.max(0.0) % fixed;
        substeps
    }

    pub fn pending(&self) -> f32 {
        self.accumulator
    }
}

/// Run state shared by the loop and the session controls
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub score: u32,
    pub combo: u32,
    pub time_left: f32,
    pub coins: u32,
    /// A run is in progress (possibly paused)
    pub running: bool,
    pub over: bool,
    pub paused: bool,
    pub high_score: u32,
    pub last_score_ms: Option<f64>,
}

impl GameState {
    pub fn new(time_left: f32) -> Self {
        Self {
            score: 0,
            combo: 0,
            time_left,
            coins: 0,
            running: false,
            over: false,
            paused: false,
            high_score: 0,
            last_score_ms: None,
        }
    }

    /// Running, not paused and not over: the timer ticks and goals count
    pub fn is_live(&self) -> bool {
        self.running && !self.paused && !self.over
    }

    pub fn begin_run(&mut self, time_left: f32) {
        self.running = true;
        self.over = false;
        self.paused = false;
        self.time_left = time_left;
        self.score = 0;
        self.combo = 0;
        self.last_score_ms = None;
    }

    /// Count one goal at `now_ms`, returning the new combo
    pub fn register_score(&mut self, now_ms: f64, combo_window_ms: f64) -> u32 {
        self.combo = match self.last_score_ms {
            Some(last) if now_ms - last < combo_window_ms => self.combo + 1,
            _ => 1,
        };
        self.last_score_ms = Some(now_ms);
        self.score += 1;
        self.combo
    }

    /// Run the clock down; returns true on the frame the run ends
    pub fn tick_timer(&mut self, real_dt: f32) -> bool {
        if !self.is_live() {
            return false;
        }
        self.time_left -= real_dt;
        if self.time_left <= 0.0 {
            self.running = false;
            self.over = true;
            return true;
        }
        false
    }

    /// Seconds shown on the HUD
    pub fn display_time(&self) -> u32 {
        self.time_left.max(0.0).ceil() as u32
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(crate::DifficultyProfile::of(proto::Difficulty::Normal).timer_secs)
    }
}

/// On-screen hold buttons for touch play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldButton {
    Up,
    Left,
    Right,
    Grab,
}

/// Level-triggered controls, read once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: i8,
    pub right: i8,
    pub lower: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a key transition. Returns false for unmapped keys.
    pub fn apply_key(&mut self, key: &str, is_down: bool) -> bool {
        let v = i8::from(is_down);
        match key {
            "w" | "ArrowUp" => self.forward = v,
            "s" | "ArrowDown" => self.forward = -v,
            "d" | "ArrowRight" => self.right = v,
            "a" | "ArrowLeft" => self.right = -v,
            " " => self.lower = is_down,
            _ => return false,
        }
        true
    }

    pub fn hold(&mut self, button: HoldButton, pressed: bool) {
        let v = i8::from(pressed);
        match button {
            HoldButton::Up => self.forward = v,
            HoldButton::Left => self.right = -v,
            HoldButton::Right => self.right = v,
            HoldButton::Grab => self.lower = pressed,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClawPhase {
    #[default]
    Open,
    Closing,
}

impl ClawPhase {
    pub fn decide(lower: bool, rope_length: f32, threshold: f32) -> Self {
        if lower && rope_length > threshold {
            ClawPhase::Closing
        } else {
            ClawPhase::Open
        }
    }
}

/// Winch and claw state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClawController {
    pub rope_length: f32,
    pub phase: ClawPhase,
}

impl Default for ClawController {
    fn default() -> Self {
        Self {
            rope_length: Params::ROPE_BASE,
            phase: ClawPhase::Open,
        }
    }
}

/// Random number generator
pub struct GameRng(pub rand::rngs::StdRng);

impl GameRng {
    pub fn new(seed: u64) -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::seed_from_u64(seed))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}
