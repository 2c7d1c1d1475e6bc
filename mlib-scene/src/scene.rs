//! The scene graph itself (spec 4.E): node storage, the name registry,
//! the six root buckets, deferred deletion, and the render-pass traversal.

use crate::error::SceneError;
use crate::handle::Handle;
use crate::node::{root_bucket_index, NodeKind, SceneNode};
use crate::observer::{AdvanceTimeRegistry, DestructionObserverRegistry};
use crate::pool::Pool;
use fxhash::FxHashMap;
use mlib_math::RigidTransform3;

pub struct Scene {
    pool: Pool<SceneNode>,
    names: FxHashMap<String, Handle<SceneNode>>,
    roots: [Vec<Handle<SceneNode>>; 6],
    pending_deletion: Vec<Handle<SceneNode>>,
    pub destruction_observers: DestructionObserverRegistry,
    pub advance_time: AdvanceTimeRegistry,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            pool: Pool::new(),
            names: Default::default(),
            roots: Default::default(),
            pending_deletion: Vec::new(),
            destruction_observers: DestructionObserverRegistry::new(),
            advance_time: AdvanceTimeRegistry::new(),
        }
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, handle: Handle<SceneNode>) -> Option<&SceneNode> {
        self.pool.get(handle)
    }

    pub fn node_mut(&mut self, handle: Handle<SceneNode>) -> Option<&mut SceneNode> {
        self.pool.get_mut(handle)
    }

    /// Places `node` into one of the six root buckets (spec 4.E "Add"). The
    /// name must be unique across the whole scene, not just its bucket.
    pub fn add_root_node(
        &mut self,
        node: SceneNode,
    ) -> Result<Handle<SceneNode>, SceneError<SceneNode>> {
        if self.names.contains_key(&node.name) {
            return Err(SceneError::DuplicateName { name: node.name });
        }
        let name = node.name.clone();
        let bucket = root_bucket_index(node.render_dynamics, node.aggregate_mode);
        let handle = self.pool.spawn(node);
        self.names.insert(name, handle);
        self.roots[bucket].push(handle);
        Ok(handle)
    }

    /// Reparents an existing node under `parent`; fails if the child
    /// already has a parent (spec 4.E invariant).
    pub fn add_child(
        &mut self,
        parent: Handle<SceneNode>,
        child: Handle<SceneNode>,
    ) -> Result<(), SceneError<SceneNode>> {
        if !self.pool.is_valid(parent) {
            return Err(SceneError::StaleHandle { handle: parent });
        }
        let had_parent = self
            .pool
            .get(child)
            .ok_or(SceneError::StaleHandle { handle: child })?
            .parent
            .is_some();
        if had_parent {
            return Err(SceneError::ChildAlreadyHasParent { child });
        }
        if let Some(bucket) = self.roots.iter_mut().find(|b| b.contains(&child)) {
            bucket.retain(|h| *h != child);
        }
        self.pool.get_mut(child).unwrap().parent = Some(parent);
        self.pool.get_mut(parent).unwrap().children.push(child);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Handle<SceneNode>> {
        self.names.get(name).copied()
    }

    /// Defers removal to the next safe point (spec 4.E "Lookup"); the node
    /// stays valid and findable until [`Self::flush_deferred_deletions`]
    /// runs.
    pub fn schedule_delete(&mut self, handle: Handle<SceneNode>) {
        if self.pool.is_valid(handle) {
            self.pending_deletion.push(handle);
        }
    }

    /// Runs every scheduled deletion, destroying each node's subtree
    /// bottom-up (spec 4.E invariant: "removing the last reference to a
    /// root while children remain causes recursive destruction
    /// bottom-up"), notifying destruction observers along the way.
    pub fn flush_deferred_deletions(&mut self) {
        let scheduled = std::mem::take(&mut self.pending_deletion);
        for handle in scheduled {
            self.destroy_subtree(handle);
        }
    }

    fn destroy_subtree(&mut self, handle: Handle<SceneNode>) {
        let Some(node) = self.pool.get(handle) else {
            return;
        };
        let children = node.children.clone();
        for child in children {
            self.destroy_subtree(child);
        }
        let Some(node) = self.pool.free(handle) else {
            return;
        };
        self.names.remove(&node.name);
        for bucket in &mut self.roots {
            bucket.retain(|h| *h != handle);
        }
        if let Some(parent) = node.parent {
            if let Some(parent_node) = self.pool.get_mut(parent) {
                parent_node.children.retain(|h| *h != handle);
            }
        }
        for index in node.destruction_observers.into_iter().rev() {
            if let Some(observer) = self.destruction_observers.get_mut(index) {
                observer.notify_destroyed(handle);
            }
        }
        if let Some(index) = node.advance_time_token {
            self.advance_time.unregister(index);
        }
    }

    /// Registers a destruction observer on `node`, returning its registry
    /// index for later unregistration.
    pub fn add_destruction_observer(
        &mut self,
        node: Handle<SceneNode>,
        observer: Box<dyn crate::observer::DestructionObserver>,
    ) {
        let index = self.destruction_observers.register(observer);
        if let Some(n) = self.pool.get_mut(node) {
            n.destruction_observers.push(index);
        }
    }

    /// Registers an advance-time observer on `node`; it is unregistered
    /// automatically when the node is destroyed.
    pub fn add_advance_time_observer(
        &mut self,
        node: Handle<SceneNode>,
        observer: Box<dyn crate::observer::AdvanceTime>,
    ) {
        let index = self.advance_time.register(observer);
        if let Some(n) = self.pool.get_mut(node) {
            n.advance_time_token = Some(index);
        }
    }

    /// Ticks every registered advance-time observer (spec 9 "AdvanceTime
    /// token").
    pub fn advance_time(&mut self, dt: f32) {
        for observer in self.advance_time.iter_mut() {
            observer.advance_time(dt);
        }
    }

    /// Propagates world-space poses top-down from roots, applying each
    /// node's `MovablePolicy` the way spec 9 describes ("the scene node
    /// queries the variant to decide how to apply a pose update").
    pub fn update_global_transforms(&mut self) {
        let root_handles: Vec<Handle<SceneNode>> =
            self.roots.iter().flatten().copied().collect();
        for root in root_handles {
            self.propagate_transform(root, RigidTransform3::default());
        }
    }

    fn propagate_transform(&mut self, handle: Handle<SceneNode>, parent_global: RigidTransform3) {
        let Some(node) = self.pool.get_mut(handle) else {
            return;
        };
        let global = match node.movable {
            crate::node::MovablePolicy::Absolute => node.local_transform,
            crate::node::MovablePolicy::Relative | crate::node::MovablePolicy::None => {
                parent_global.compose(&node.local_transform)
            }
        };
        node.global_transform = global;
        let children = node.children.clone();
        for child in children {
            self.propagate_transform(child, global);
        }
    }

    /// Depth-first render pass (spec 4.E "Traversal"): collects lights,
    /// blended draws, and direct draws. Aggregate/instance nodes are
    /// skipped here entirely - they feed (4.G)'s batching queues instead.
    pub fn render(&self) -> RenderOutputs {
        let mut outputs = RenderOutputs::default();
        let root_handles: Vec<Handle<SceneNode>> = self.roots.iter().flatten().copied().collect();
        for root in root_handles {
            self.collect_render(root, &mut outputs);
        }
        outputs
    }

    fn collect_render(&self, handle: Handle<SceneNode>, outputs: &mut RenderOutputs) {
        let Some(node) = self.pool.get(handle) else {
            return;
        };
        match node.kind {
            NodeKind::Light(_) => outputs.lights.push(handle),
            NodeKind::Mesh { blended: true } => outputs.blended.push(handle),
            NodeKind::Mesh { blended: false } => outputs.direct.push(handle),
            NodeKind::Camera | NodeKind::Empty | NodeKind::Aggregate => {}
        }
        for child in &node.children {
            self.collect_render(*child, outputs);
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct RenderOutputs {
    pub lights: Vec<Handle<SceneNode>>,
    pub blended: Vec<Handle<SceneNode>>,
    pub direct: Vec<Handle<SceneNode>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{LightKind, MovablePolicy, NodeKind};

    fn mesh(name: &str, blended: bool) -> SceneNode {
        SceneNode::new(name, NodeKind::Mesh { blended })
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut scene = Scene::new();
        scene.add_root_node(mesh("a", false)).unwrap();
        let err = scene.add_root_node(mesh("a", false));
        assert!(err.is_err());
    }

    #[test]
    fn lookup_after_deletion_fails_cleanly() {
        let mut scene = Scene::new();
        let h = scene.add_root_node(mesh("a", false)).unwrap();
        scene.schedule_delete(h);
        scene.flush_deferred_deletions();
        assert!(scene.node(h).is_none());
        assert!(scene.lookup("a").is_none());
    }

    #[test]
    fn deleting_root_destroys_children_bottom_up() {
        let mut scene = Scene::new();
        let root = scene.add_root_node(mesh("root", false)).unwrap();
        let child = scene.add_root_node(mesh("child", false)).unwrap();
        scene.add_child(root, child).unwrap();
        scene.schedule_delete(root);
        scene.flush_deferred_deletions();
        assert!(scene.node(root).is_none());
        assert!(scene.node(child).is_none());
    }

    #[test]
    fn destruction_observers_notify_in_reverse_insertion_order() {
        use crate::observer::DestructionObserver;
        use std::sync::{Arc, Mutex};

        struct Recorder {
            id: u32,
            order: Arc<Mutex<Vec<u32>>>,
        }
        impl DestructionObserver for Recorder {
            fn notify_destroyed(&mut self, _destroyed: Handle<SceneNode>) {
                self.order.lock().unwrap().push(self.id);
            }
        }

        let mut scene = Scene::new();
        let node = scene.add_root_node(mesh("a", false)).unwrap();
        let order = Arc::new(Mutex::new(Vec::new()));
        scene.add_destruction_observer(
            node,
            Box::new(Recorder { id: 1, order: order.clone() }),
        );
        scene.add_destruction_observer(
            node,
            Box::new(Recorder { id: 2, order: order.clone() }),
        );
        scene.add_destruction_observer(
            node,
            Box::new(Recorder { id: 3, order: order.clone() }),
        );
        scene.schedule_delete(node);
        scene.flush_deferred_deletions();
        assert_eq!(*order.lock().unwrap(), vec![3, 2, 1]);
    }

    #[test]
    fn reparenting_a_child_with_an_existing_parent_fails() {
        let mut scene = Scene::new();
        let a = scene.add_root_node(mesh("a", false)).unwrap();
        let b = scene.add_root_node(mesh("b", false)).unwrap();
        let c = scene.add_root_node(mesh("c", false)).unwrap();
        scene.add_child(a, c).unwrap();
        assert!(scene.add_child(b, c).is_err());
    }

    #[test]
    fn render_pass_splits_lights_and_blend_groups() {
        let mut scene = Scene::new();
        scene.add_root_node(mesh("opaque", false)).unwrap();
        scene.add_root_node(mesh("glass", true)).unwrap();
        scene
            .add_root_node(SceneNode::new("sun", NodeKind::Light(LightKind::Directional)))
            .unwrap();
        let outputs = scene.render();
        assert_eq!(outputs.direct.len(), 1);
        assert_eq!(outputs.blended.len(), 1);
        assert_eq!(outputs.lights.len(), 1);
    }

    #[test]
    fn absolute_movable_ignores_parent_transform() {
        use mlib_math::RigidTransform3;
        use nalgebra::{Matrix3, Vector3};
        let mut scene = Scene::new();
        let root = scene.add_root_node(mesh("root", false)).unwrap();
        scene.node_mut(root).unwrap().local_transform =
            RigidTransform3::new(Matrix3::identity(), Vector3::new(10.0, 0.0, 0.0)).unwrap();
        let child = scene.add_root_node(mesh("child", false)).unwrap();
        scene.node_mut(child).unwrap().movable = MovablePolicy::Absolute;
        scene.node_mut(child).unwrap().local_transform =
            RigidTransform3::new(Matrix3::identity(), Vector3::new(1.0, 0.0, 0.0)).unwrap();
        scene.add_child(root, child).unwrap();
        scene.update_global_transforms();
        let global = scene.node(child).unwrap().global_transform;
        assert!((global.translation() - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-6);
    }
}
