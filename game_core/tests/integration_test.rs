use game_core::physics::{PhysicsWorld, RapierWorld, ScriptedPhysics};
use game_core::*;
use proptest::prelude::*;

const FRAME_MS: f64 = 16.0;

fn scripted_session() -> CraneSession<ScriptedPhysics> {
    CraneSession::new(ScriptedPhysics::new(), Config::new(), 42)
}

fn started(mut session: CraneSession<ScriptedPhysics>) -> CraneSession<ScriptedPhysics> {
    session.insert_coin();
    session.start().unwrap();
    session
}

/// Put prize `index` inside the goal volume
fn drop_in_goal(session: &mut CraneSession<ScriptedPhysics>, index: usize) {
    let entity = session.rig().items[index];
    let id = session.world().get::<&Body>(entity).unwrap().id;
    let centre = session.map().goal.center();
    session.physics_mut().set_position(id, centre);
}

fn scored(events: &[GameEvent]) -> Vec<(u32, u32)> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::Scored { score, combo, .. } => Some((*score, *combo)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_full_round_with_combo() {
    let mut s = scripted_session();
    s.insert_coin();
    assert_eq!(s.state().coins, 1);
    s.start().unwrap();
    assert_eq!(s.state().time_left, 60.0);
    assert_eq!(s.state().score, 0);

    let mut now = 0.0;
    let mut events = s.frame(now);
    assert!(events.iter().any(|e| matches!(e, GameEvent::Started { .. })));

    // Lower until the claw closes
    s.key(" ", true, now);
    let mut closed_at = None;
    for frame in 0..120 {
        now += FRAME_MS;
        events = s.frame(now);
        if events.contains(&GameEvent::ClawClosing) {
            closed_at = Some(frame);
            break;
        }
    }
    assert!(closed_at.is_some(), "Claw never closed");
    assert!(s.claw().rope_length > 1.8);
    assert_eq!(s.claw().phase, ClawPhase::Closing);

    drop_in_goal(&mut s, 0);
    now += 100.0;
    assert_eq!(scored(&s.frame(now)), vec![(1, 1)]);

    drop_in_goal(&mut s, 1);
    now += 500.0;
    assert_eq!(scored(&s.frame(now)), vec![(2, 2)]);

    drop_in_goal(&mut s, 2);
    now += 4000.0;
    assert_eq!(scored(&s.frame(now)), vec![(3, 1)], "Combo window lapsed");
    assert_eq!(s.state().score, 3);
    assert_eq!(s.state().high_score, 3);
}

#[test]
fn test_scored_prize_returns_to_tray() {
    let mut s = started(scripted_session());
    s.frame(0.0);
    drop_in_goal(&mut s, 4);
    let events = s.frame(FRAME_MS);
    assert_eq!(scored(&events).len(), 1);
    assert!(events.contains(&GameEvent::Milestone { score: 1 }));

    let entity = s.rig().items[4];
    let id = s.world().get::<&Body>(entity).unwrap().id;
    let pose = s.physics().pose(id).unwrap();
    assert_eq!(pose.position.y, Params::RESPAWN_HEIGHT);
    assert!(s.map().tray.contains_xz(pose.position.x, pose.position.z));
    assert!(s.physics().velocity(id).unwrap().is_zero());
}

#[test]
fn test_game_over_freezes_until_next_start() {
    let mut s = started(scripted_session());
    let mut now = 0.0;
    s.frame(now);
    let mut over = false;
    for _ in 0..700 {
        now += 100.0;
        if s.frame(now).iter().any(|e| matches!(e, GameEvent::GameOver { .. })) {
            over = true;
            break;
        }
    }
    assert!(over, "Timer never expired");
    assert!(s.state().over && !s.state().running);
    assert_eq!(s.state().display_time(), 0);

    let carriage = s.carriage_position();
    assert!(!s.key("d", true, now), "Keys are ignored after game over");
    drop_in_goal(&mut s, 0);
    for _ in 0..10 {
        now += FRAME_MS;
        s.frame(now);
    }
    assert_eq!(s.carriage_position(), carriage);
    assert_eq!(s.state().score, 0, "Goals do not count after game over");
    assert!(!s.toggle_pause(), "Nothing to pause");

    s.insert_coin();
    s.start().unwrap();
    assert!(s.state().is_live());
    assert_eq!(s.state().time_left, 60.0);
}

#[test]
fn test_replay_reproduces_input_trajectory() {
    let script: &[(u32, &str, bool)] = &[
        (3, "d", true),
        (10, "w", true),
        (18, "d", false),
        (25, " ", true),
        (40, "w", false),
        (52, " ", false),
        (60, "a", true),
        (75, "a", false),
    ];
    let frames = 90;

    let mut s = started(scripted_session());
    s.toggle_record(0.0);
    let mut live = Vec::new();
    for frame in 0..frames {
        let now = frame as f64 * FRAME_MS;
        for (_, key, down) in script.iter().filter(|(f, _, _)| *f == frame) {
            s.key(key, *down, now);
        }
        s.frame(now);
        live.push(*s.input());
    }
    s.toggle_record(frames as f64 * FRAME_MS);
    assert_eq!(s.replay().actions().len(), script.len());

    let start = 20_000.0;
    assert_eq!(s.toggle_play(start), Ok(true));
    let mut replayed = Vec::new();
    for frame in 0..frames {
        s.frame(start + frame as f64 * FRAME_MS);
        replayed.push(*s.input());
    }
    assert_eq!(replayed, live);
    assert!(!s.replay().is_playing(), "Playback ran to the end");
}

#[test]
fn test_saved_replay_survives_json() {
    let mut s = started(scripted_session());
    s.toggle_record(0.0);
    s.key("w", true, 50.0);
    s.key("w", false, 450.0);
    s.toggle_record(500.0);
    let blob = s.replay_blob(1_700_000_000_000).unwrap();

    let json = blob.to_json().unwrap();
    let restored = proto::ReplayBlob::from_json(&json).unwrap();
    let mut other = scripted_session();
    other.load_replay(restored);
    assert_eq!(other.replay().actions(), s.replay().actions());
    assert_eq!(other.toggle_play(0.0), Ok(true));
}

#[test]
fn test_rapier_cabinet_runs() {
    let mut s = CraneSession::new(RapierWorld::new(), Config::new(), 7);
    s.insert_coin();
    s.start().unwrap();
    let mut now = 0.0;
    s.frame(now);
    s.key("d", true, now);
    for _ in 0..90 {
        now += FRAME_MS;
        s.frame(now);
    }
    let carriage = s.carriage_position();
    assert!(carriage.x > 3.0, "Carriage moved right: {carriage:?}");
    assert!(carriage.x <= 5.2);

    let hook = s.physics().pose(s.rig().hook_body).unwrap().position;
    let rope = s.claw().rope_length;
    assert!(hook.y < carriage.y, "Hook hangs below the carriage");
    assert!(
        hook.distance(carriage) < rope + 0.5,
        "Rope holds the hook: {hook:?} vs {carriage:?}"
    );
    assert!(hook.is_finite());
}

// ============================================================================
// Properties
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Key(&'static str, bool),
    Frames(u8),
}

fn op_key() -> impl Strategy<Value = (&'static str, bool)> {
    (
        prop::sample::select(vec!["w", "a", "s", "d", " ", "ArrowUp", "ArrowLeft", "q"]),
        any::<bool>(),
    )
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        op_key().prop_map(|(k, down)| Op::Key(k, down)),
        (1u8..30).prop_map(Op::Frames),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn test_controls_stay_within_limits(ops in prop::collection::vec(op(), 1..40)) {
        let mut s = started(scripted_session());
        let config = s.config().clone();
        let mut now = 0.0;
        s.frame(now);
        for op in ops {
            match op {
                Op::Key(key, down) => {
                    s.key(key, down, now);
                }
                Op::Frames(n) => {
                    for _ in 0..n {
                        now += FRAME_MS;
                        s.frame(now);
                        let c = s.carriage_position();
                        prop_assert!(c.x.abs() <= config.carriage_limit + 1e-5);
                        prop_assert!(c.z.abs() <= config.carriage_limit + 1e-5);
                        prop_assert_eq!(c.y, 4.3);

                        let rope = s.claw().rope_length;
                        prop_assert!((config.rope_min..=config.rope_max).contains(&rope));

                        let expected = ClawPhase::decide(s.input().lower, rope, config.close_threshold());
                        prop_assert_eq!(s.claw().phase, expected);
                    }
                }
            }
        }
    }

    #[test]
    fn test_limits_hold_for_any_frame_gap(
        steps in prop::collection::vec((op_key(), prop_oneof![0.0f64..40.0, 40.0f64..5000.0]), 1..40)
    ) {
        let mut s = started(scripted_session());
        let config = s.config().clone();
        let mut now = 0.0;
        s.frame(now);
        for ((key, down), gap) in steps {
            s.key(key, down, now);
            now += gap;
            s.frame(now);
            let c = s.carriage_position();
            prop_assert!(c.x.abs() <= config.carriage_limit + 1e-5, "x {} after {}ms gap", c.x, gap);
            prop_assert!(c.z.abs() <= config.carriage_limit + 1e-5, "z {} after {}ms gap", c.z, gap);
            let rope = s.claw().rope_length;
            prop_assert!((config.rope_min..=config.rope_max).contains(&rope));
            prop_assert!(s.physics().pose(s.rig().hook_body).unwrap().position.is_finite());
        }
    }

    #[test]
    fn test_combo_counts_goals_inside_window(gaps in prop::collection::vec(0.0f64..6000.0, 1..20)) {
        let mut state = GameState::default();
        state.begin_run(60.0);
        let mut now = 1000.0;
        let mut last: Option<f64> = None;
        let mut expected = 0;
        for gap in gaps {
            now += gap;
            expected = match last {
                Some(prev) if now - prev < Params::COMBO_WINDOW_MS => expected + 1,
                _ => 1,
            };
            let combo = state.register_score(now, Params::COMBO_WINDOW_MS);
            prop_assert_eq!(combo, expected);
            last = Some(now);
        }
    }

    #[test]
    fn test_fixed_stepper_respects_budget(frames in prop::collection::vec(0.0f32..0.2, 1..60)) {
        let mut stepper = FixedStepper::new();
        for real_dt in frames {
            let time = FrameTime::new(0.0, real_dt);
            let n = stepper.advance(time.dt, Params::FIXED_DT, Params::MAX_SUBSTEPS);
            prop_assert!(n <= Params::MAX_SUBSTEPS);
            prop_assert!(stepper.pending() < Params::FIXED_DT);
        }
    }
}

#[test]
fn test_carriage_moves_in_input_direction() {
    let mut s = started(scripted_session());
    let mut now = 0.0;
    s.frame(now);
    s.key("w", true, now);
    s.key("d", true, now);
    for _ in 0..30 {
        now += FRAME_MS;
        s.frame(now);
    }
    let c = s.carriage_position();
    assert!(c.x > 0.0, "Right is +X");
    assert!(c.z < 0.0, "Forward is -Z");
    assert_eq!(c.x, -c.z);
}
