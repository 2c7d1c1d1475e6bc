//! Scene node shape (spec 4.E / 9): a node carries its local/global pose,
//! one of three movable policies, the indices of its destruction/advance
//! time observers (not strong references, to break the cycles a node /
//! rigid body / observer graph would otherwise form), and the
//! rendering-dynamics x aggregate-mode tag that selects its root bucket.

use crate::handle::Handle;
use mlib_math::RigidTransform3;

/// How a node's pose is kept in sync with an external driver (typically a
/// rigid body): re-expressed from the source's multiple-inheritance
/// "movable" roles as a tagged variant (spec 9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovablePolicy {
    /// The driver writes the node's pose directly in world space.
    Absolute,
    /// The driver writes a pose relative to the node's parent.
    Relative,
    /// The node's pose is only ever changed by direct scene-graph edits.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderDynamics {
    Dynamic,
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateMode {
    Off,
    Once,
    SortedContinuously,
}

/// The 2x3 = 6 root buckets from spec 4.E "`add_root_node` places a node
/// into one of six root buckets chosen by rendering-dynamics x
/// aggregate-mode".
pub fn root_bucket_index(dynamics: RenderDynamics, aggregate: AggregateMode) -> usize {
    let d = match dynamics {
        RenderDynamics::Dynamic => 0,
        RenderDynamics::Static => 1,
    };
    let a = match aggregate {
        AggregateMode::Off => 0,
        AggregateMode::Once => 1,
        AggregateMode::SortedContinuously => 2,
    };
    d * 3 + a
}

pub const ROOT_BUCKET_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Point,
    Directional,
    Spot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Empty,
    Mesh { blended: bool },
    Light(LightKind),
    Camera,
    /// Aggregate/instance nodes feed per-frame batching queues rather than
    /// emitting draws themselves (spec 4.E).
    Aggregate,
}

pub struct SceneNode {
    pub name: String,
    pub parent: Option<Handle<SceneNode>>,
    pub children: Vec<Handle<SceneNode>>,
    pub movable: MovablePolicy,
    pub local_transform: RigidTransform3,
    pub global_transform: RigidTransform3,
    pub kind: NodeKind,
    pub render_dynamics: RenderDynamics,
    pub aggregate_mode: AggregateMode,
    pub(crate) destruction_observers: Vec<usize>,
    pub(crate) advance_time_token: Option<usize>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            movable: MovablePolicy::None,
            local_transform: RigidTransform3::default(),
            global_transform: RigidTransform3::default(),
            kind,
            render_dynamics: RenderDynamics::Dynamic,
            aggregate_mode: AggregateMode::Off,
            destruction_observers: Vec::new(),
            advance_time_token: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
