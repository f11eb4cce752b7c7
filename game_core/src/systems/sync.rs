use crate::physics::PhysicsWorld;
use crate::{Body, Visual};
use hecs::World;

/// Copy every body pose into its visual
pub fn sync_visuals<P: PhysicsWorld>(world: &mut World, physics: &P) {
    for (_entity, (body, visual)) in world.query_mut::<(&Body, &mut Visual)>() {
        if let Some(pose) = physics.pose(body.id) {
            visual.position = pose.position;
            visual.rotation = pose.rotation;
        }
    }
}
