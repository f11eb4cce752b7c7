//! Headless claw machine
//!
//! Replays a recorded session against the rapier cabinet on a virtual 60 Hz
//! clock and logs what happened. Without `--replay` it plays a short built-in
//! script.

use anyhow::{bail, Context, Result};
use clap::Parser;
use game_core::physics::{PhysicsWorld, RapierWorld};
use game_core::{Config, CraneSession, GameEvent};
use proto::{Difficulty, KeyAction, ReplayBlob};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const FRAME_MS: f64 = 1000.0 / 60.0;
/// Keep simulating after the last action so the final drop can land
const SETTLE_MS: f64 = 2000.0;

#[derive(Parser, Debug)]
#[command(name = "replay-runner", version, about = "Play a claw machine replay headlessly")]
struct Args {
    /// Replay JSON as saved by the browser client
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Playback speed multiplier
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Seed for prize placement
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Override the difficulty stored in the replay
    #[arg(long)]
    difficulty: Option<Difficulty>,

    /// Hard cap on simulated time
    #[arg(long, default_value_t = 120.0)]
    seconds: f64,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Summary {
    score: u32,
    frames: u64,
    finished: bool,
    game_over: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if !(args.speed.is_finite() && args.speed > 0.0) {
        bail!("speed must be a positive number, got {}", args.speed);
    }

    let blob = match &args.replay {
        Some(path) => load_blob(path)?,
        None => {
            info!("no replay given, playing the built-in script");
            demo_replay()
        }
    };
    let difficulty = args.difficulty.unwrap_or(blob.difficulty);
    info!(
        actions = blob.actions.len(),
        duration_ms = blob.duration_ms(),
        recorded_score = blob.score,
        %difficulty,
        "replay loaded"
    );

    let mut session = CraneSession::new(RapierWorld::new(), Config::with_difficulty(difficulty), args.seed);
    session.set_difficulty(difficulty);
    session.set_replay_speed(args.speed);
    session.load_replay(blob);

    let summary = run(&mut session, args.seconds * 1000.0)?;
    info!(
        score = summary.score,
        frames = summary.frames,
        finished = summary.finished,
        game_over = summary.game_over,
        "run complete"
    );
    if !summary.finished {
        warn!("time cap reached before the replay finished");
    }
    Ok(())
}

fn load_blob(path: &Path) -> Result<ReplayBlob> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let blob = ReplayBlob::from_json(&text).with_context(|| format!("parsing {}", path.display()))?;
    if blob.actions.is_empty() {
        bail!("{} holds no actions", path.display());
    }
    Ok(blob)
}

/// Drive the session until the replay ends and the cabinet settles, the run
/// ends, or `limit_ms` of simulated time passes
fn run<P: PhysicsWorld>(session: &mut CraneSession<P>, limit_ms: f64) -> Result<Summary> {
    let mut now = 0.0;
    session.frame(now);
    session.toggle_play(now)?;

    let mut summary = Summary {
        score: 0,
        frames: 0,
        finished: false,
        game_over: false,
    };
    let mut settle_until: Option<f64> = None;

    while now < limit_ms {
        now += FRAME_MS;
        summary.frames += 1;
        for event in session.frame(now) {
            log_event(&event);
            match event {
                GameEvent::ReplayFinished => {
                    summary.finished = true;
                    settle_until = Some(now + SETTLE_MS);
                }
                GameEvent::GameOver { .. } => summary.game_over = true,
                _ => {}
            }
        }
        if summary.game_over || settle_until.is_some_and(|until| now >= until) {
            break;
        }
    }

    summary.score = session.state().score;
    Ok(summary)
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::Scored { score, combo, item, .. } => info!(score, combo, item, "scored"),
        GameEvent::Combo { combo } => info!(combo, "combo"),
        GameEvent::Milestone { score } => info!(score, "milestone"),
        GameEvent::GameOver { score } => info!(score, "game over"),
        GameEvent::ReplayInput { key, is_down } => debug!(key = %key, is_down, "replayed key"),
        other => debug!(?other, "event"),
    }
}

/// Slide right, drop, lift and carry the catch towards the chute
fn demo_replay() -> ReplayBlob {
    let script: [(&str, bool, f64); 10] = [
        ("d", true, 200.0),
        ("d", false, 900.0),
        ("w", true, 1000.0),
        ("w", false, 1300.0),
        (" ", true, 1500.0),
        (" ", false, 3200.0),
        ("d", true, 3900.0),
        ("d", false, 5600.0),
        (" ", true, 5800.0),
        (" ", false, 6400.0),
    ];
    ReplayBlob {
        actions: script
            .iter()
            .map(|&(key, down, at)| KeyAction::new(key, down, at))
            .collect(),
        timestamp: 0,
        score: 0,
        difficulty: Difficulty::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::physics::ScriptedPhysics;

    #[test]
    fn test_demo_replay_runs_to_completion() {
        let mut session = CraneSession::new(ScriptedPhysics::new(), Config::new(), 3);
        session.load_replay(demo_replay());
        let summary = run(&mut session, 60_000.0).unwrap();
        assert!(summary.finished, "Replay reached its last action");
        assert!(!summary.game_over);
        let expected = ((6400.0 + SETTLE_MS) / FRAME_MS) as u64;
        assert!(summary.frames >= expected, "Settled after the last action");
    }

    #[test]
    fn test_time_cap_stops_early() {
        let mut session = CraneSession::new(ScriptedPhysics::new(), Config::new(), 3);
        session.load_replay(demo_replay());
        let summary = run(&mut session, 1000.0).unwrap();
        assert!(!summary.finished);
        assert!(summary.frames <= 61);
    }

    #[test]
    fn test_empty_replay_is_an_error() {
        let mut session = CraneSession::new(ScriptedPhysics::new(), Config::new(), 3);
        assert!(run(&mut session, 1000.0).is_err());
    }

    #[test]
    fn test_args_parse_difficulty() {
        let args = Args::try_parse_from(["replay-runner", "--difficulty", "hard", "--speed", "2"]).unwrap();
        assert_eq!(args.difficulty, Some(Difficulty::Hard));
        assert_eq!(args.speed, 2.0);
        assert!(args.replay.is_none());
    }
}
