use crate::components::*;
use crate::map::CabinetMap;
use crate::params::Params;
use crate::physics::{BodyDesc, BodyId, HingeDesc, JointId, MaterialId, PhysicsWorld, Shape};
use crate::resources::{ClawController, GameRng};
use crate::Config;
use glam::{Quat, Vec3};
use hecs::{Entity, World};
use rand::Rng;

const CARRIAGE_COLOR: u32 = 0xaab0b6;
const HOOK_COLOR: u32 = 0xf1c40f;
const FINGER_COLOR: u32 = 0xbac3ce;
const PLUSH_COLOR: u32 = 0x7ed6df;
const CASE_COLOR: u32 = 0x9aa7b2;

/// Handles to the moving parts of the machine
#[derive(Debug, Clone)]
pub struct Rig {
    pub carriage: Entity,
    pub carriage_body: BodyId,
    pub hook: Entity,
    pub hook_body: BodyId,
    pub rope: JointId,
    pub fingers: Vec<Entity>,
    pub items: Vec<Entity>,
    pub sensor: Entity,
}

/// Build the whole cabinet in both the ECS world and the physics backend
pub fn spawn_cabinet<P: PhysicsWorld>(
    world: &mut World,
    physics: &mut P,
    map: &CabinetMap,
    config: &Config,
    rng: &mut GameRng,
) -> Rig {
    for prop in &map.props {
        let id = physics.create_body(&BodyDesc::fixed_box(prop.size, prop.center));
        let mut visual = Visual::new(Shape::Box { half: prop.size * 0.5 }, prop.color);
        visual.position = prop.center;
        world.spawn((StaticProp { name: prop.name }, Body { id }, visual));
    }

    let sensor_body = physics.create_body(
        &BodyDesc::kinematic_box(map.goal.half_extents() * 2.0, map.goal.center()).as_sensor(),
    );
    let sensor = world.spawn((GoalSensor, Body { id: sensor_body }));

    let carriage_pos = Vec3::from(Params::CARRIAGE_START);
    let carriage_size = Vec3::from(Params::CARRIAGE_SIZE);
    let carriage_body = physics.create_body(&BodyDesc::kinematic_box(carriage_size, carriage_pos));
    let carriage = world.spawn((
        Carriage {
            position: carriage_pos,
        },
        Body { id: carriage_body },
        Visual::new(Shape::Box { half: carriage_size * 0.5 }, CARRIAGE_COLOR),
    ));

    let hook_pos = Vec3::from(Params::HOOK_START);
    let hook_body = physics.create_body(
        &BodyDesc::dynamic_sphere(Params::HOOK_RADIUS, Params::HOOK_MASS, hook_pos).never_sleep(),
    );
    let rope = physics.create_rope(carriage_body, hook_body, config.rope_base);
    let hook = world.spawn((
        Hook { rope },
        Body { id: hook_body },
        Visual::new(Shape::Sphere { radius: Params::HOOK_RADIUS }, HOOK_COLOR).with_shadow(),
    ));

    let profile = config.profile();
    let fingers = (0..Params::FINGER_COUNT)
        .map(|index| {
            let angle = index as f32 * std::f32::consts::TAU / Params::FINGER_COUNT as f32;
            spawn_finger(world, physics, hook_body, hook_pos, index, angle, profile.open_speed)
        })
        .collect();

    let items = (0..config.item_count)
        .map(|index| spawn_item(world, physics, map, index, rng))
        .collect();

    Rig {
        carriage,
        carriage_body,
        hook,
        hook_body,
        rope,
        fingers,
        items,
        sensor,
    }
}

fn finger_size() -> Vec3 {
    let t = Params::FINGER_THICKNESS;
    Vec3::new(t, Params::FINGER_HEIGHT, t * 1.2)
}

/// Rest position of a finger around a hook at `hook_pos`
pub fn finger_seat(hook_pos: Vec3, angle: f32) -> Vec3 {
    Vec3::new(
        hook_pos.x + angle.cos() * Params::FINGER_RADIUS,
        hook_pos.y - Params::FINGER_DROP,
        hook_pos.z + angle.sin() * Params::FINGER_RADIUS,
    )
}

fn spawn_finger<P: PhysicsWorld>(
    world: &mut World,
    physics: &mut P,
    hook_body: BodyId,
    hook_pos: Vec3,
    index: usize,
    angle: f32,
    open_speed: f32,
) -> Entity {
    let size = finger_size();
    // Yawed to face the hook axis
    let rotation = Quat::from_rotation_y(angle + std::f32::consts::FRAC_PI_2);
    let body = physics.create_body(
        &BodyDesc::dynamic_box(size, Params::FINGER_MASS, finger_seat(hook_pos, angle))
            .with_material(MaterialId::Finger)
            .with_rotation(rotation)
            .never_sleep(),
    );

    let hinge = physics.create_hinge(
        hook_body,
        body,
        &HingeDesc {
            axis: Vec3::Y,
            anchor_a: Vec3::new(angle.cos() * 0.25, -0.05, angle.sin() * 0.25),
            anchor_b: Vec3::new(0.0, Params::FINGER_HEIGHT / 2.0 - 0.05, 0.0),
            limits: Some(Params::HINGE_LIMITS),
            motor_speed: open_speed,
            max_force: Params::HINGE_INITIAL_FORCE,
            collide_connected: false,
        },
    );

    world.spawn((
        Finger { index, hinge },
        Body { id: body },
        Visual::new(Shape::Box { half: size * 0.5 }, FINGER_COLOR).with_shadow(),
    ))
}

fn spawn_item<P: PhysicsWorld>(
    world: &mut World,
    physics: &mut P,
    map: &CabinetMap,
    index: usize,
    rng: &mut GameRng,
) -> Entity {
    let xz = map.tray.random_xz(&mut rng.0);
    let r = &mut rng.0;

    let (kind, desc) = if index % 2 == 0 {
        let radius = 0.28 + r.gen::<f32>() * 0.14;
        let mass = 0.5 + r.gen::<f32>() * 0.3;
        let desc = BodyDesc::dynamic_sphere(radius, mass, Vec3::new(xz.x, 0.6, xz.y))
            .with_material(MaterialId::Plush);
        (PrizeKind::Plush, desc)
    } else {
        let size = Vec3::new(
            0.7 + r.gen::<f32>() * 0.15,
            0.12 + r.gen::<f32>() * 0.04,
            0.38 + r.gen::<f32>() * 0.12,
        );
        let mass = 0.35 + r.gen::<f32>() * 0.25;
        let yaw = Quat::from_rotation_y(r.gen::<f32>() * std::f32::consts::TAU);
        let desc = BodyDesc::dynamic_box(size, mass, Vec3::new(xz.x, 0.7, xz.y))
            .with_material(MaterialId::Case)
            .with_rotation(yaw);
        (PrizeKind::Case, desc)
    };

    let id = physics.create_body(&desc);
    let color = match kind {
        PrizeKind::Plush => PLUSH_COLOR,
        PrizeKind::Case => CASE_COLOR,
    };
    world.spawn((
        Item { index, kind },
        Body { id },
        Visual::new(desc.shape, color).with_shadow(),
    ))
}

/// Put the rig back where it started and scatter the prizes over the tray
pub fn reset_machine<P: PhysicsWorld>(
    world: &mut World,
    physics: &mut P,
    map: &CabinetMap,
    rig: &Rig,
    claw: &mut ClawController,
    config: &Config,
    rng: &mut GameRng,
) {
    let carriage_pos = Vec3::from(Params::CARRIAGE_START);
    if let Ok(mut carriage) = world.get::<&mut Carriage>(rig.carriage) {
        carriage.position = carriage_pos;
    }
    physics.teleport_at_rest(rig.carriage_body, carriage_pos);

    let hook_pos = Vec3::from(Params::HOOK_START);
    physics.teleport_at_rest(rig.hook_body, hook_pos);
    for (_entity, (finger, body)) in world.query_mut::<(&Finger, &Body)>() {
        physics.teleport_at_rest(body.id, finger_seat(hook_pos, finger.angle()));
    }

    for (_entity, (_item, body)) in world.query_mut::<(&Item, &Body)>() {
        let xz = map.tray.random_xz(&mut rng.0);
        physics.teleport_at_rest(body.id, Vec3::new(xz.x, Params::RESET_HEIGHT, xz.y));
    }

    claw.rope_length = config.rope_base;
    claw.phase = Default::default();
    physics.set_rope_length(rig.rope, claw.rope_length);
}
