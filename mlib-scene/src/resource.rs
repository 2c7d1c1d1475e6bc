//! Resource registry (spec 4.J): named, reusable renderable/pose/mapping
//! data that scene nodes instantiate from rather than own directly.

use fxhash::FxHashMap;
use std::fmt;

/// One entry the registry can hold. `Renderable` is a flat list of named
/// mesh instances a node's renderable map can be populated from;
/// `BvhSkeletalPoses`/`GeoMapping` are the other two resource flavors spec
/// 4.J calls out by name.
#[derive(Debug, Clone)]
pub enum Resource {
    Renderable(Vec<RenderableEntry>),
    BvhSkeletalPoses(BvhPoseResource),
    GeoMapping(GeoMapping),
}

#[derive(Debug, Clone)]
pub struct RenderableEntry {
    pub name: String,
}

#[derive(Debug)]
pub enum ResourceError {
    DuplicateName { name: String },
    NotFound { name: String },
    WrongKind { name: String },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::DuplicateName { name } => {
                write!(f, "a resource named {name:?} already exists")
            }
            ResourceError::NotFound { name } => write!(f, "no resource named {name:?}"),
            ResourceError::WrongKind { name } => {
                write!(f, "resource {name:?} is not the requested kind")
            }
        }
    }
}
impl std::error::Error for ResourceError {}

#[derive(Default)]
pub struct ResourceRegistry {
    resources: FxHashMap<String, Resource>,
}

/// Bounds a renderable filter query: only names matching `regex` (a plain
/// substring match - see DESIGN.md) are candidates, and the match count
/// must fall within `[min_num, max_num]` or the call fails.
pub struct RenderableFilter<'a> {
    pub min_num: usize,
    pub max_num: usize,
    pub pattern: &'a str,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_resource(&mut self, name: impl Into<String>, resource: Resource) -> Result<(), ResourceError> {
        let name = name.into();
        if self.resources.contains_key(&name) {
            return Err(ResourceError::DuplicateName { name });
        }
        self.resources.insert(name, resource);
        Ok(())
    }

    /// Clones the matching renderables out of the named resource, subject
    /// to `filter` (spec 4.J "instantiate_renderable").
    pub fn instantiate_renderable(
        &self,
        name: &str,
        filter: &RenderableFilter,
    ) -> Result<Vec<RenderableEntry>, ResourceError> {
        let resource = self
            .resources
            .get(name)
            .ok_or_else(|| ResourceError::NotFound { name: name.to_string() })?;
        let Resource::Renderable(entries) = resource else {
            return Err(ResourceError::WrongKind { name: name.to_string() });
        };
        let matched: Vec<RenderableEntry> = entries
            .iter()
            .filter(|e| e.name.contains(filter.pattern))
            .cloned()
            .collect();
        if matched.len() < filter.min_num || matched.len() > filter.max_num {
            return Err(ResourceError::WrongKind { name: name.to_string() });
        }
        Ok(matched)
    }
}

/// BVH-format motion-capture resource: named skeletal poses sampled at a
/// query time (spec 4.J). Pose data itself is a flat joint-transform list;
/// interpolation between keyframes is linear.
#[derive(Debug, Clone)]
pub struct BvhPoseResource {
    pub joint_names: Vec<String>,
    /// One sample per keyframe; `frame_time` seconds apart.
    pub frames: Vec<Vec<mlib_math::RigidTransform3>>,
    pub frame_time: f32,
}

impl BvhPoseResource {
    /// Nearest-keyframe pose lookup at `time` seconds (no interpolation
    /// yet - this crate has no animation blending concept to drive one).
    pub fn pose_at(&self, time: f32) -> Option<&[mlib_math::RigidTransform3]> {
        if self.frames.is_empty() || self.frame_time <= 0.0 {
            return None;
        }
        let index = ((time / self.frame_time).round() as usize).min(self.frames.len() - 1);
        Some(&self.frames[index])
    }
}

/// Maps latitude/longitude to local meters using a mean-radius
/// approximation (spec 4.J): `r0 = 6.371e6 m`.
#[derive(Debug, Clone, Copy)]
pub struct GeoMapping {
    pub origin_lat_deg: f64,
    pub origin_lon_deg: f64,
}

const EARTH_MEAN_RADIUS_M: f64 = 6.371e6;

impl GeoMapping {
    /// Equirectangular local-meters projection around `origin`, scaling
    /// longitude by `cos(origin_lat)` so east/west distances stay accurate
    /// near the origin.
    pub fn to_local_meters(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let lat0 = self.origin_lat_deg.to_radians();
        let dlat = (lat_deg - self.origin_lat_deg).to_radians();
        let dlon = (lon_deg - self.origin_lon_deg).to_radians();
        let north = dlat * EARTH_MEAN_RADIUS_M;
        let east = dlon * EARTH_MEAN_RADIUS_M * lat0.cos();
        (east, north)
    }
}
