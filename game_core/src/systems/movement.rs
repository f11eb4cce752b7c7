use crate::physics::PhysicsWorld;
use crate::{Body, Carriage, ClawController, Config, FrameTime, Hook, InputState};
use glam::Vec3;
use hecs::World;

/// Drive the carriage from the input axes and push it as a kinematic target
pub fn move_carriage<P: PhysicsWorld>(
    world: &mut World,
    physics: &mut P,
    input: &InputState,
    time: &FrameTime,
    config: &Config,
) {
    let velocity = Vec3::new(input.right as f32, 0.0, -(input.forward as f32)) * config.carriage_speed;
    for (_entity, (carriage, body)) in world.query_mut::<(&mut Carriage, &Body)>() {
        carriage.position = config.clamp_carriage(carriage.position + velocity * time.dt);
        physics.set_kinematic_translation(body.id, carriage.position);
    }
}

/// Pay the rope out while lowering, reel it in otherwise
pub fn run_winch<P: PhysicsWorld>(
    world: &mut World,
    physics: &mut P,
    claw: &mut ClawController,
    input: &InputState,
    time: &FrameTime,
    config: &Config,
) {
    let direction = if input.lower { 1.0 } else { -1.0 };
    claw.rope_length = config.clamp_rope(claw.rope_length + direction * config.winch_rate * time.dt);
    for (_entity, hook) in world.query_mut::<&Hook>() {
        physics.set_rope_length(hook.rope, claw.rope_length);
    }
}
