//! Renderer core (spec 4.F/4.G): shader-program caching, vertex-array
//! layout, draw-distance trimming, shadow lightmap targets, blended-pass
//! ordering, and aggregate/instance batching pools.

mod aggregate;
mod blended;
mod draw_distance;
mod error;
mod lightmap;
mod shader_cache;
mod vertex_array;

pub use aggregate::{
    AggregateContribution, AggregateInstance, AggregatePool, LargeAggregateScheduler,
    MaterialKey, SmallAggregateScheduler,
};
pub use blended::{sort_blended, BlendedItem};
pub use draw_distance::DrawDistanceWindow;
pub use error::RenderError;
pub use lightmap::{LightmapConfig, LightmapResources, LightmapTarget};
pub use shader_cache::{
    BlendMode, BlendModeKey, CompiledProgram, LightBins, OrderedF32, RenderProgramIdentifier,
    ShaderCache,
};
pub use vertex_array::{Vertex, VertexArray, VertexFeatures, MAX_BONES_PER_VERTEX};
