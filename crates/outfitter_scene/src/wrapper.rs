//! Chainable node operation wrapper.
//!
//! [`SceneNode`] borrows a [`Scene`] mutably and provides a fluent API for
//! transforming nodes without going through `get_node_mut()` each time.
//!
//! All methods silently no-op when the handle is stale.
//!
//! # Example
//!
//! ```rust,ignore
//! scene.node(wrapper)
//!     .set_position(Vec3::new(0.0, 0.2, 0.0))
//!     .set_scale(Vec3::splat(1.5))
//!     .set_visible(true);
//! ```
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::must_use_candidate)]
use glam::{Quat, Vec3};

use crate::NodeHandle;
use crate::scene::Scene;
use crate::transform::Transform;

/// Temporary mutable borrow of a scene node for chainable operations.
pub struct SceneNode<'a> {
    scene: &'a mut Scene,
    handle: NodeHandle,
}

impl<'a> SceneNode<'a> {
    #[inline]
    pub fn new(scene: &'a mut Scene, handle: NodeHandle) -> Self {
        Self { scene, handle }
    }

    #[inline]
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    fn with_transform(self, f: impl FnOnce(&mut Transform)) -> Self {
        if let Some(node) = self.scene.get_node_mut(self.handle) {
            f(&mut node.transform);
        }
        self
    }

    #[inline]
    pub fn set_position(self, position: Vec3) -> Self {
        self.with_transform(|t| t.position = position)
    }

    #[inline]
    pub fn set_rotation(self, rotation: Quat) -> Self {
        self.with_transform(|t| t.rotation = rotation)
    }

    /// Sets rotation from Euler angles (XYZ order, radians).
    #[inline]
    pub fn set_rotation_euler(self, euler: Vec3) -> Self {
        self.with_transform(|t| t.set_rotation_euler(euler.x, euler.y, euler.z))
    }

    #[inline]
    pub fn set_scale(self, scale: Vec3) -> Self {
        self.with_transform(|t| t.scale = scale)
    }

    /// Moves the node by `offset` in its parent's space.
    #[inline]
    pub fn translate(self, offset: Vec3) -> Self {
        self.with_transform(|t| t.position += offset)
    }

    /// Rotates about the node's own axes (post-multiplied).
    #[inline]
    pub fn rotate_local(self, rotation: Quat) -> Self {
        self.with_transform(|t| t.rotation = (t.rotation * rotation).normalize())
    }

    /// Resets position, rotation and scale to identity.
    #[inline]
    pub fn reset_transform(self) -> Self {
        self.with_transform(Transform::reset)
    }

    #[inline]
    pub fn set_visible(self, visible: bool) -> Self {
        if let Some(node) = self.scene.get_node_mut(self.handle) {
            node.visible = visible;
        }
        self
    }

    #[inline]
    pub fn set_name(self, name: &str) -> Self {
        self.scene.set_name(self.handle, name);
        self
    }
}
