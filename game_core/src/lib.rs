//! Claw machine simulation
//!
//! Pure game logic: the cabinet, the carriage/winch/claw loop, scoring and
//! replay. Physics sits behind [`physics::PhysicsWorld`]; nothing here
//! touches a browser or a GPU.

pub mod components;
pub mod config;
pub mod effects;
pub mod events;
pub mod map;
pub mod params;
pub mod physics;
pub mod render;
pub mod replay;
pub mod resources;
pub mod session;
pub mod setup;
pub mod systems;

pub use components::*;
pub use config::*;
pub use events::*;
pub use map::*;
pub use params::*;
pub use replay::ReplayLog;
pub use resources::*;
pub use session::{CraneSession, SessionError};
pub use setup::Rig;

pub use proto::Difficulty;

use hecs::World;
use physics::PhysicsWorld;
use systems::{check_goal, dispatch_replay, drive_claw, move_carriage, run_winch, sync_visuals, tick_timer};

/// Run one frame of the claw machine
#[allow(clippy::too_many_arguments)]
pub fn step<P: PhysicsWorld>(
    world: &mut World,
    physics: &mut P,
    time: &FrameTime,
    map: &CabinetMap,
    config: &Config,
    state: &mut GameState,
    input: &mut InputState,
    claw: &mut ClawController,
    stepper: &mut FixedStepper,
    replay: &mut ReplayLog,
    events: &mut Events,
    rng: &mut GameRng,
) {
    // 1. Recorded input lands before anything reads the controls
    dispatch_replay(replay, input, time.now_ms, events);

    // 2-4. Carriage, winch and claw only respond during a live run
    if state.is_live() {
        move_carriage(world, physics, input, time, config);
        run_winch(world, physics, claw, input, time, config);
        drive_claw(world, physics, claw, input, config, events);
    }

    // 5. Fixed sub-steps within the capped frame budget; the cabinet freezes outside a run
    if state.running && !state.paused {
        let substeps = stepper.advance(time.dt, config.fixed_dt, config.max_substeps);
        for _ in 0..substeps {
            physics.step(config.fixed_dt);
        }
    }

    // 6. Goal detection
    if state.is_live() {
        check_goal(world, physics, map, config, state, time.now_ms, events, rng);
    }

    // 7. Run timer on wall-clock time
    tick_timer(state, input, time, events);

    // 8. Mirror bodies into visuals
    sync_visuals(world, physics);
}
