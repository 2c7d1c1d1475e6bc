//! Hierarchical scene graph for the mlib engine (spec Component E/J):
//! generation-checked node handles, the name registry, destruction and
//! advance-time observer tokens, and the resource registry nodes
//! instantiate renderables from.

pub mod error;
pub mod handle;
pub mod node;
pub mod observer;
pub mod pool;
pub mod resource;
pub mod scene;

pub use error::SceneError;
pub use handle::Handle;
pub use node::{
    root_bucket_index, AggregateMode, LightKind, MovablePolicy, NodeKind, RenderDynamics,
    SceneNode, ROOT_BUCKET_COUNT,
};
pub use observer::{AdvanceTime, DestructionObserver};
pub use resource::{GeoMapping, Resource, ResourceRegistry};
pub use scene::{RenderOutputs, Scene};
