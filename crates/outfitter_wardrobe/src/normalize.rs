//! Coordinate normalizer: re-roots imported meshes under a wrapper node
//! without moving them in world space.

use outfitter_scene::{NodeHandle, Scene};

/// Moves each mesh under `wrapper`, keeping its world pose.
///
/// Per mesh: capture the world pose, reset the local transform, attach to the
/// wrapper, then solve for the local transform against the wrapper's world
/// matrix. Meshes are processed in order, so a mesh nested under an earlier
/// one is flattened onto the wrapper as well.
pub fn normalize_into_wrapper(scene: &mut Scene, meshes: &[NodeHandle], wrapper: NodeHandle) {
    for &mesh in meshes {
        let Some((world_scale, world_rotation, world_position)) = scene.world_pose(mesh) else {
            log::warn!("Skipping stale mesh handle during normalization");
            continue;
        };

        scene.node(mesh).reset_transform();
        scene.attach(mesh, wrapper);

        let wrapper_world = scene.world_matrix(wrapper);
        let (wrapper_scale, wrapper_rotation, _) = wrapper_world.to_scale_rotation_translation();

        let local_position = wrapper_world.inverse().transform_point3(world_position);
        let local_rotation = (wrapper_rotation.inverse() * world_rotation).normalize();
        let local_scale = world_scale / wrapper_scale;

        scene
            .node(mesh)
            .set_position(local_position)
            .set_rotation(local_rotation)
            .set_scale(local_scale);
    }

    scene.update_subtree(wrapper);
}
