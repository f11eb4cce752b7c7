//! One cabinet and everything needed to play it
//!
//! `CraneSession` owns the ECS world, the physics backend and every
//! resource the loop touches. UI glue calls the control methods between
//! frames and `frame` once per display refresh.

use crate::physics::PhysicsWorld;
use crate::setup::{reset_machine, spawn_cabinet, Rig};
use crate::systems::sync_visuals;
use crate::*;
use hecs::World;
use proto::{Difficulty, ReplayBlob};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("insert a coin first")]
    NoCoins,
    #[error("a run is already in progress")]
    AlreadyRunning,
    #[error("no recorded actions to play")]
    EmptyReplay,
}

pub struct CraneSession<P: PhysicsWorld> {
    world: World,
    physics: P,
    map: CabinetMap,
    config: Config,
    rig: Rig,
    state: GameState,
    input: InputState,
    claw: ClawController,
    stepper: FixedStepper,
    clock: FrameClock,
    replay: ReplayLog,
    events: Events,
    rng: GameRng,
    /// Applied at the next start or playback
    selected: Difficulty,
}

impl<P: PhysicsWorld> CraneSession<P> {
    pub fn new(mut physics: P, config: Config, seed: u64) -> Self {
        let mut world = World::new();
        let map = CabinetMap::new();
        let mut rng = GameRng::new(seed);
        let rig = spawn_cabinet(&mut world, &mut physics, &map, &config, &mut rng);
        let mut claw = ClawController::default();
        claw.rope_length = config.rope_base;
        let state = GameState::new(config.profile().timer_secs);
        let selected = config.difficulty;

        let mut session = Self {
            world,
            physics,
            map,
            config,
            rig,
            state,
            input: InputState::new(),
            claw,
            stepper: FixedStepper::new(),
            clock: FrameClock::new(),
            replay: ReplayLog::new(),
            events: Events::new(),
            rng,
            selected,
        };
        sync_visuals(&mut session.world, &session.physics);
        session
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    pub fn map(&self) -> &CabinetMap {
        &self.map
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn rig(&self) -> &Rig {
        &self.rig
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn claw(&self) -> &ClawController {
        &self.claw
    }

    pub fn replay(&self) -> &ReplayLog {
        &self.replay
    }

    pub fn selected_difficulty(&self) -> Difficulty {
        self.selected
    }

    /// Commanded carriage position
    pub fn carriage_position(&self) -> glam::Vec3 {
        self.world
            .get::<&Carriage>(self.rig.carriage)
            .map(|c| c.position)
            .unwrap_or_default()
    }

    // ========================================================================
    // Session controls
    // ========================================================================

    pub fn insert_coin(&mut self) {
        self.state.coins += 1;
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.state.running {
            warn!("start ignored: run in progress");
            return Err(SessionError::AlreadyRunning);
        }
        if self.state.coins == 0 {
            warn!("start ignored: no coins");
            return Err(SessionError::NoCoins);
        }
        self.state.coins -= 1;
        self.begin_run();
        Ok(())
    }

    fn begin_run(&mut self) {
        self.config.difficulty = self.selected;
        let profile = self.config.profile();
        self.state.begin_run(profile.timer_secs);
        self.input.clear();
        debug!(difficulty = %self.config.difficulty, "run started");
        self.events.push(GameEvent::Started {
            difficulty: self.config.difficulty,
            time_left: self.state.time_left,
        });
    }

    /// No effect unless a run is in progress. Returns whether paused.
    pub fn toggle_pause(&mut self) -> bool {
        if self.state.running && !self.state.over {
            self.set_paused(!self.state.paused);
        }
        self.state.paused
    }

    /// Pause on focus loss; never resumes
    pub fn pause(&mut self) {
        if self.state.running && !self.state.over && !self.state.paused {
            self.set_paused(true);
        }
    }

    fn set_paused(&mut self, paused: bool) {
        self.state.paused = paused;
        if paused {
            self.input.clear();
        }
        debug!(paused, "pause toggled");
        self.events.push(GameEvent::Paused { paused });
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.selected = difficulty;
    }

    pub fn reset_machine(&mut self) {
        reset_machine(
            &mut self.world,
            &mut self.physics,
            &self.map,
            &self.rig,
            &mut self.claw,
            &self.config,
            &mut self.rng,
        );
        sync_visuals(&mut self.world, &self.physics);
    }

    pub fn set_high_score(&mut self, score: u32) {
        self.state.high_score = score;
    }

    pub fn reset_high_score(&mut self) {
        self.state.high_score = 0;
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Key transition from the keyboard. Ignored unless the run is live.
    pub fn key(&mut self, key: &str, is_down: bool, now_ms: f64) -> bool {
        if !self.state.is_live() {
            return false;
        }
        self.input.apply_key(key, is_down);
        self.replay.record(key, is_down, now_ms);
        true
    }

    /// Touch hold button. Ignored unless the run is live.
    pub fn hold(&mut self, button: HoldButton, pressed: bool) -> bool {
        if !self.state.is_live() {
            return false;
        }
        self.input.hold(button, pressed);
        true
    }

    // ========================================================================
    // Replay transport
    // ========================================================================

    pub fn toggle_record(&mut self, now_ms: f64) -> bool {
        let active = self.replay.toggle_record(now_ms);
        debug!(active, "recording toggled");
        self.events.push(GameEvent::Recording { active });
        active
    }

    /// Start playback from a fresh run, or stop it. Returns whether playing.
    pub fn toggle_play(&mut self, now_ms: f64) -> Result<bool, SessionError> {
        if self.replay.is_playing() {
            self.replay.stop_playback();
            self.input.clear();
            self.events.push(GameEvent::ReplayStopped);
            return Ok(false);
        }
        if let Err(err) = self.replay.start_playback(now_ms) {
            warn!("playback ignored: {err}");
            return Err(err);
        }
        self.begin_run();
        debug!(actions = self.replay.actions().len(), "replay started");
        self.events.push(GameEvent::ReplayStarted {
            actions: self.replay.actions().len(),
        });
        Ok(true)
    }

    pub fn set_replay_speed(&mut self, speed: f64) {
        self.replay.set_speed(speed);
    }

    pub fn replay_blob(&self, saved_at_ms: u64) -> Option<ReplayBlob> {
        self.replay.to_blob(self.state.score, self.selected, saved_at_ms)
    }

    pub fn load_replay(&mut self, blob: ReplayBlob) {
        self.replay.load(blob);
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Advance one frame at `now_ms` and return everything that happened
    /// since the previous frame
    pub fn frame(&mut self, now_ms: f64) -> Vec<GameEvent> {
        let time = self.clock.tick(now_ms);
        step(
            &mut self.world,
            &mut self.physics,
            &time,
            &self.map,
            &self.config,
            &mut self.state,
            &mut self.input,
            &mut self.claw,
            &mut self.stepper,
            &mut self.replay,
            &mut self.events,
            &mut self.rng,
        );
        self.events.drain()
    }
}
