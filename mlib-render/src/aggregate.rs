//! Aggregate & instance batching (spec 4.G): large/small aggregate pools
//! are rebuilt off the render thread and swapped in atomically; a
//! foreground pass that finds no prepared instance yet falls back to a
//! blocking rebuild rather than skipping a frame.

use fxhash::FxHashMap;
use mlib_scene::Handle;
use mlib_scene::SceneNode;
use nalgebra::Vector3;
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaterialKey(pub String);

#[derive(Debug, Clone)]
pub struct AggregateContribution {
    pub node: Handle<SceneNode>,
    pub material: MaterialKey,
    pub view_z: f32,
}

/// One merged-by-material draw batch; aggregate mode is forced OFF on the
/// result so a batch's members never recurse back into this pipeline.
#[derive(Debug, Clone)]
pub struct AggregateInstance {
    pub material: MaterialKey,
    pub members: Vec<Handle<SceneNode>>,
}

/// Groups contributions by material key, preserving first-seen order of
/// materials. For the sorted-continuous pool, contributions are ordered
/// by descending view-z before grouping so each batch's members come out
/// back-to-front.
fn merge_by_material(
    mut contributions: Vec<AggregateContribution>,
    sort_by_view_z: bool,
) -> Vec<AggregateInstance> {
    if sort_by_view_z {
        contributions
            .sort_by(|a, b| b.view_z.partial_cmp(&a.view_z).unwrap_or(std::cmp::Ordering::Equal));
    }
    let mut order: Vec<MaterialKey> = Vec::new();
    let mut groups: FxHashMap<MaterialKey, Vec<Handle<SceneNode>>> = FxHashMap::default();
    for c in contributions {
        groups
            .entry(c.material.clone())
            .or_insert_with(|| {
                order.push(c.material.clone());
                Vec::new()
            })
            .push(c.node);
    }
    order
        .into_iter()
        .map(|material| {
            let members = groups.remove(&material).unwrap_or_default();
            AggregateInstance { material, members }
        })
        .collect()
}

/// One pool's (large or small-sorted) currently-published instance set,
/// swapped in atomically by a background rebuild worker.
#[derive(Default)]
pub struct AggregatePool {
    current: Mutex<Option<Vec<AggregateInstance>>>,
}

impl AggregatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs on the background worker: merges contributions and swaps them
    /// in under the mutex.
    pub fn rebuild(&self, contributions: Vec<AggregateContribution>, sort_by_view_z: bool) {
        let merged = merge_by_material(contributions, sort_by_view_z);
        *self.current.lock() = Some(merged);
    }

    /// The render thread's read path: if nothing has been published yet
    /// and this is a foreground pass, perform a blocking rebuild instead
    /// of skipping the frame.
    pub fn query_or_blocking_rebuild(
        &self,
        is_foreground: bool,
        contributions: impl FnOnce() -> Vec<AggregateContribution>,
        sort_by_view_z: bool,
    ) -> Option<Vec<AggregateInstance>> {
        if let Some(instances) = self.current.lock().as_ref() {
            return Some(instances.clone());
        }
        if !is_foreground {
            return None;
        }
        self.rebuild(contributions(), sort_by_view_z);
        self.current.lock().clone()
    }
}

/// Aperiodic scheduling policy for the large aggregate/instance-once pool:
/// rebuild once per scene load, or again once the camera has drifted
/// beyond `camera_offset_threshold` from where it was last rebuilt at.
pub struct LargeAggregateScheduler {
    camera_offset_threshold: f32,
    last_rebuild_camera: Option<Vector3<f32>>,
}

impl LargeAggregateScheduler {
    pub fn new(camera_offset_threshold: f32) -> Self {
        Self {
            camera_offset_threshold,
            last_rebuild_camera: None,
        }
    }

    pub fn needs_rebuild(&self, camera_position: Vector3<f32>) -> bool {
        match self.last_rebuild_camera {
            None => true,
            Some(last) => (camera_position - last).norm() > self.camera_offset_threshold,
        }
    }

    pub fn mark_rebuilt(&mut self, camera_position: Vector3<f32>) {
        self.last_rebuild_camera = Some(camera_position);
    }
}

/// Periodic scheduling policy for the small sorted-continuous pool:
/// rebuild once `small_aggregate_update_interval` seconds have elapsed.
pub struct SmallAggregateScheduler {
    interval: f32,
    elapsed: f32,
}

impl SmallAggregateScheduler {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            elapsed: 0.0,
        }
    }

    /// Advances the clock and reports whether a rebuild is due, resetting
    /// the clock when it fires.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.interval {
            self.elapsed = 0.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlib_scene::{NodeKind, Scene};

    fn contribution(scene: &mut Scene, name: &str, material: &str, view_z: f32) -> AggregateContribution {
        let node = scene
            .add_root_node(SceneNode::new(name, NodeKind::Mesh { blended: false }))
            .unwrap();
        AggregateContribution {
            node,
            material: MaterialKey(material.to_string()),
            view_z,
        }
    }

    #[test]
    fn contributions_sharing_a_material_key_are_merged() {
        let mut scene = Scene::new();
        let a = contribution(&mut scene, "a", "rock", 1.0);
        let b = contribution(&mut scene, "b", "rock", 2.0);
        let instances = merge_by_material(vec![a, b], false);
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].members.len(), 2);
    }

    #[test]
    fn sorted_pool_orders_members_back_to_front() {
        let mut scene = Scene::new();
        let near = contribution(&mut scene, "near", "glass", 1.0);
        let far = contribution(&mut scene, "far", "glass", 9.0);
        let instances = merge_by_material(vec![near, far], true);
        assert_eq!(instances[0].members[0], scene.lookup("far").unwrap());
        assert_eq!(instances[0].members[1], scene.lookup("near").unwrap());
    }

    #[test]
    fn background_pass_returns_none_when_nothing_published_yet() {
        let pool = AggregatePool::new();
        let result = pool.query_or_blocking_rebuild(false, Vec::new, false);
        assert!(result.is_none());
    }

    #[test]
    fn foreground_pass_triggers_a_blocking_rebuild_when_empty() {
        let mut scene = Scene::new();
        let a = contribution(&mut scene, "a", "rock", 1.0);
        let pool = AggregatePool::new();
        let result = pool.query_or_blocking_rebuild(true, || vec![a], false);
        assert_eq!(result.unwrap().len(), 1);
    }

    #[test]
    fn large_scheduler_rebuilds_once_then_waits_for_drift() {
        let mut scheduler = LargeAggregateScheduler::new(10.0);
        let origin = Vector3::new(0.0, 0.0, 0.0);
        assert!(scheduler.needs_rebuild(origin));
        scheduler.mark_rebuilt(origin);
        assert!(!scheduler.needs_rebuild(Vector3::new(1.0, 0.0, 0.0)));
        assert!(scheduler.needs_rebuild(Vector3::new(20.0, 0.0, 0.0)));
    }

    #[test]
    fn small_scheduler_fires_after_interval_elapses() {
        let mut scheduler = SmallAggregateScheduler::new(1.0);
        assert!(!scheduler.tick(0.5));
        assert!(scheduler.tick(0.6));
        assert!(!scheduler.tick(0.1));
    }
}
