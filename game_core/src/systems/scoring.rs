use crate::physics::PhysicsWorld;
use crate::{Body, CabinetMap, Config, Events, GameEvent, GameRng, GameState, Item, Params};
use glam::Vec3;
use hecs::World;
use tracing::info;

/// Score every prize whose centre is inside the goal volume and drop it back
/// into the tray. All overlaps in one frame count.
#[allow(clippy::too_many_arguments)]
pub fn check_goal<P: PhysicsWorld>(
    world: &mut World,
    physics: &mut P,
    map: &CabinetMap,
    config: &Config,
    state: &mut GameState,
    now_ms: f64,
    events: &mut Events,
    rng: &mut GameRng,
) {
    for (_entity, (item, body)) in world.query_mut::<(&Item, &Body)>() {
        let Some(pose) = physics.pose(body.id) else {
            continue;
        };
        if !map.goal.contains(pose.position) {
            continue;
        }

        let combo = state.register_score(now_ms, config.combo_window_ms);
        let score = state.score;
        info!(score, combo, item = item.index, "prize scored");
        events.push(GameEvent::Scored {
            score,
            combo,
            item: item.index,
            at: map.goal.center(),
        });
        if combo >= Params::COMBO_TOAST {
            events.push(GameEvent::Combo { combo });
        }
        if Params::MILESTONES.contains(&score) {
            events.push(GameEvent::Milestone { score });
        }
        if score > state.high_score {
            state.high_score = score;
            events.push(GameEvent::HighScore { score });
        }

        let xz = map.tray.random_xz(&mut rng.0);
        physics.teleport_at_rest(body.id, Vec3::new(xz.x, Params::RESPAWN_HEIGHT, xz.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::PrizeKind;
    use crate::physics::{BodyDesc, BodyId, ScriptedPhysics, Velocity};

    fn setup_world() -> (World, ScriptedPhysics, CabinetMap, Config, GameState, Events, GameRng) {
        let mut world = World::new();
        let mut physics = ScriptedPhysics::new();
        for index in 0..3 {
            let id = physics.create_body(&BodyDesc::dynamic_sphere(0.3, 0.6, Vec3::new(0.0, 0.6, 0.0)));
            world.spawn((
                Item {
                    index,
                    kind: PrizeKind::Plush,
                },
                Body { id },
            ));
        }
        let mut state = GameState::default();
        state.begin_run(60.0);
        (
            world,
            physics,
            CabinetMap::new(),
            Config::new(),
            state,
            Events::new(),
            GameRng::new(12345),
        )
    }

    fn drop_in_goal(physics: &mut ScriptedPhysics, body: u32) {
        physics.set_position(BodyId(body), Vec3::new(6.6, 0.5, 0.3));
        physics.set_velocity(
            BodyId(body),
            Velocity {
                linear: Vec3::new(1.0, -2.0, 0.0),
                angular: Vec3::Y,
            },
        );
    }

    #[test]
    fn test_item_in_goal_scores_and_respawns() {
        let (mut world, mut physics, map, config, mut state, mut events, mut rng) = setup_world();
        drop_in_goal(&mut physics, 1);

        check_goal(&mut world, &mut physics, &map, &config, &mut state, 100.0, &mut events, &mut rng);

        assert_eq!(state.score, 1, "One prize scored");
        assert_eq!(state.combo, 1);
        let pos = physics.pose(BodyId(1)).unwrap().position;
        assert_eq!(pos.y, 0.9, "Respawned above the tray");
        assert!(map.tray.contains_xz(pos.x, pos.z));
        assert!(physics.velocity(BodyId(1)).unwrap().is_zero(), "Respawn is at rest");
        assert!(events.iter().any(|e| matches!(e, GameEvent::Scored { item: 1, .. })));
        assert!(events.iter().any(|e| *e == GameEvent::Milestone { score: 1 }));
    }

    #[test]
    fn test_simultaneous_overlaps_all_score() {
        let (mut world, mut physics, map, config, mut state, mut events, mut rng) = setup_world();
        drop_in_goal(&mut physics, 0);
        drop_in_goal(&mut physics, 2);

        check_goal(&mut world, &mut physics, &map, &config, &mut state, 100.0, &mut events, &mut rng);

        assert_eq!(state.score, 2);
        assert_eq!(state.combo, 2, "Second goal in the same tick chains the combo");
        assert_eq!(events.count(|e| matches!(e, GameEvent::Scored { .. })), 2);
    }

    #[test]
    fn test_no_score_outside_goal() {
        let (mut world, mut physics, map, config, mut state, mut events, mut rng) = setup_world();
        physics.set_position(BodyId(0), Vec3::new(6.35, 0.5, 0.0));

        check_goal(&mut world, &mut physics, &map, &config, &mut state, 100.0, &mut events, &mut rng);

        assert_eq!(state.score, 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_high_score_raised_once_exceeded() {
        let (mut world, mut physics, map, config, mut state, mut events, mut rng) = setup_world();
        state.high_score = 1;

        drop_in_goal(&mut physics, 0);
        check_goal(&mut world, &mut physics, &map, &config, &mut state, 0.0, &mut events, &mut rng);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::HighScore { .. })));

        drop_in_goal(&mut physics, 0);
        check_goal(&mut world, &mut physics, &map, &config, &mut state, 10.0, &mut events, &mut rng);
        assert_eq!(state.high_score, 2);
        assert!(events.iter().any(|e| *e == GameEvent::HighScore { score: 2 }));
    }

    #[test]
    fn test_combo_event_from_third_chain() {
        let (mut world, mut physics, map, config, mut state, mut events, mut rng) = setup_world();
        for (i, at) in [0.0, 1000.0, 2000.0].into_iter().enumerate() {
            drop_in_goal(&mut physics, i as u32);
            check_goal(&mut world, &mut physics, &map, &config, &mut state, at, &mut events, &mut rng);
        }
        assert_eq!(state.combo, 3);
        assert_eq!(events.count(|e| matches!(e, GameEvent::Combo { .. })), 1);
    }
}
