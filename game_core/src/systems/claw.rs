use crate::physics::PhysicsWorld;
use crate::{ClawController, ClawPhase, Config, Events, Finger, GameEvent, InputState};
use hecs::World;
use tracing::debug;

/// Pick OPEN or CLOSING and re-arm every finger motor from the difficulty profile
pub fn drive_claw<P: PhysicsWorld>(
    world: &mut World,
    physics: &mut P,
    claw: &mut ClawController,
    input: &InputState,
    config: &Config,
    events: &mut Events,
) {
    let phase = ClawPhase::decide(input.lower, claw.rope_length, config.close_threshold());
    if phase == ClawPhase::Closing && claw.phase == ClawPhase::Open {
        debug!(rope = claw.rope_length, "claw closing");
        events.push(GameEvent::ClawClosing);
    }
    claw.phase = phase;

    let profile = config.profile();
    let (speed, force) = match phase {
        ClawPhase::Closing => (profile.close_speed, profile.close_force),
        ClawPhase::Open => (profile.open_speed, profile.open_force),
    };
    for (_entity, finger) in world.query_mut::<&Finger>() {
        physics.set_hinge_motor(finger.hinge, speed, force);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BodyDesc, HingeDesc, JointId, ScriptedPhysics};
    use glam::Vec3;
    use proto::Difficulty;

    fn claw_world() -> (World, ScriptedPhysics, Vec<JointId>) {
        let mut world = World::new();
        let mut physics = ScriptedPhysics::new();
        let hook = physics.create_body(&BodyDesc::dynamic_sphere(0.25, 0.3, Vec3::ZERO));
        let hinges = (0..3)
            .map(|index| {
                let finger = physics.create_body(&BodyDesc::dynamic_box(Vec3::ONE, 0.15, Vec3::ZERO));
                let hinge = physics.create_hinge(
                    hook,
                    finger,
                    &HingeDesc {
                        axis: Vec3::Y,
                        anchor_a: Vec3::ZERO,
                        anchor_b: Vec3::ZERO,
                        limits: None,
                        motor_speed: 0.0,
                        max_force: 8.0,
                        collide_connected: false,
                    },
                );
                world.spawn((Finger { index, hinge },));
                hinge
            })
            .collect();
        (world, physics, hinges)
    }

    #[test]
    fn test_closing_uses_profile_and_cues_once() {
        let (mut world, mut physics, hinges) = claw_world();
        let config = Config::with_difficulty(Difficulty::Hard);
        let mut claw = ClawController {
            rope_length: 2.0,
            phase: ClawPhase::Open,
        };
        let input = InputState {
            lower: true,
            ..Default::default()
        };
        let mut events = Events::new();

        drive_claw(&mut world, &mut physics, &mut claw, &input, &config, &mut events);
        drive_claw(&mut world, &mut physics, &mut claw, &input, &config, &mut events);

        assert_eq!(claw.phase, ClawPhase::Closing);
        assert_eq!(events.count(|e| *e == GameEvent::ClawClosing), 1, "Cue only on the edge");
        for hinge in hinges {
            assert_eq!(physics.hinge_motor(hinge), Some((-1.7, 10.0)));
        }
        assert_eq!(physics.motor_commands, 6, "Motors re-armed every frame");
    }

    #[test]
    fn test_short_rope_keeps_claw_open() {
        let (mut world, mut physics, hinges) = claw_world();
        let config = Config::new();
        let mut claw = ClawController {
            rope_length: 1.2,
            phase: ClawPhase::Open,
        };
        let input = InputState {
            lower: true,
            ..Default::default()
        };
        let mut events = Events::new();

        drive_claw(&mut world, &mut physics, &mut claw, &input, &config, &mut events);

        assert_eq!(claw.phase, ClawPhase::Open);
        assert!(events.is_empty());
        assert_eq!(physics.hinge_motor(hinges[0]), Some((1.8, 6.0)));
    }

    #[test]
    fn test_release_reopens_without_cue() {
        let (mut world, mut physics, _hinges) = claw_world();
        let config = Config::new();
        let mut claw = ClawController {
            rope_length: 2.5,
            phase: ClawPhase::Closing,
        };
        let mut events = Events::new();

        drive_claw(&mut world, &mut physics, &mut claw, &InputState::new(), &config, &mut events);

        assert_eq!(claw.phase, ClawPhase::Open);
        assert!(events.is_empty());
    }
}
