//! Per-mesh vertex array layout (spec 4.F "Vertex arrays"): attributes are
//! enabled a la carte, the stride is derived from what's enabled, and up to
//! 4 bone influences are normalized per vertex.

use crate::error::RenderError;
use nalgebra::{Vector2, Vector3, Vector4};

pub const MAX_BONES_PER_VERTEX: usize = 4;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VertexFeatures: u32 {
        const NORMAL          = 1 << 0;
        const TANGENT         = 1 << 1;
        const INSTANCE_OFFSET = 1 << 2;
        const BONES           = 1 << 3;
    }
}

/// Byte size of each optional attribute, used to derive a vertex's stride
/// from its enabled [`VertexFeatures`].
fn feature_size(features: VertexFeatures) -> usize {
    let mut size = std::mem::size_of::<Vector3<f32>>() // position
        + std::mem::size_of::<Vector4<f32>>() // color
        + std::mem::size_of::<Vector2<f32>>(); // uv
    if features.contains(VertexFeatures::NORMAL) {
        size += std::mem::size_of::<Vector3<f32>>();
    }
    if features.contains(VertexFeatures::TANGENT) {
        size += std::mem::size_of::<Vector3<f32>>();
    }
    if features.contains(VertexFeatures::INSTANCE_OFFSET) {
        size += std::mem::size_of::<Vector3<f32>>();
    }
    if features.contains(VertexFeatures::BONES) {
        size += MAX_BONES_PER_VERTEX * (std::mem::size_of::<u32>() + std::mem::size_of::<f32>());
    }
    size
}

#[derive(Debug, Clone)]
pub struct Vertex {
    pub position: Vector3<f32>,
    pub color: Vector4<f32>,
    pub uv: Vector2<f32>,
    pub normal: Option<Vector3<f32>>,
    pub tangent: Option<Vector3<f32>>,
    pub instance_offset: Option<Vector3<f32>>,
    pub bone_ids: Option<[u32; MAX_BONES_PER_VERTEX]>,
    pub bone_weights: Option<[f32; MAX_BONES_PER_VERTEX]>,
}

/// A lazily built, attribute-packed vertex buffer for one mesh.
#[derive(Debug, Clone)]
pub struct VertexArray {
    pub features: VertexFeatures,
    pub stride: usize,
    pub vertices: Vec<Vertex>,
}

/// Sorts a vertex's bone weights descending and renormalizes them to sum to
/// 1, validating each id against `skeleton_size` (spec 4.F).
fn normalize_bone_weights(
    ids: &mut [u32; MAX_BONES_PER_VERTEX],
    weights: &mut [f32; MAX_BONES_PER_VERTEX],
    skeleton_size: u32,
) -> Result<(), RenderError> {
    let mut pairs: Vec<(u32, f32)> = ids.iter().copied().zip(weights.iter().copied()).collect();
    pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let sum: f32 = pairs.iter().map(|(_, w)| *w).sum();
    if sum < 1e-3 {
        return Err(RenderError::TooFewBoneWeights {
            sum: format!("{sum}"),
        });
    }
    for (i, (id, w)) in pairs.into_iter().enumerate() {
        if id >= skeleton_size {
            return Err(RenderError::MissingResource {
                name: format!("bone index {id} >= skeleton size {skeleton_size}"),
            });
        }
        ids[i] = id;
        weights[i] = w / sum;
    }
    Ok(())
}

impl VertexArray {
    /// Builds the array, validating and renormalizing every vertex's bone
    /// weights (if present) against `skeleton_size`.
    pub fn build(
        features: VertexFeatures,
        mut vertices: Vec<Vertex>,
        skeleton_size: u32,
    ) -> Result<Self, RenderError> {
        if features.contains(VertexFeatures::BONES) {
            for v in &mut vertices {
                if let (Some(ids), Some(weights)) = (v.bone_ids.as_mut(), v.bone_weights.as_mut())
                {
                    normalize_bone_weights(ids, weights, skeleton_size)?;
                }
            }
        }
        Ok(Self {
            features,
            stride: feature_size(features),
            vertices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_vertex() -> Vertex {
        Vertex {
            position: Vector3::zeros(),
            color: Vector4::new(1.0, 1.0, 1.0, 1.0),
            uv: Vector2::zeros(),
            normal: None,
            tangent: None,
            instance_offset: None,
            bone_ids: None,
            bone_weights: None,
        }
    }

    #[test]
    fn stride_grows_with_enabled_features() {
        let minimal = feature_size(VertexFeatures::empty());
        let with_normal = feature_size(VertexFeatures::NORMAL);
        assert!(with_normal > minimal);
    }

    #[test]
    fn bone_weights_are_sorted_and_renormalized() {
        let mut v = base_vertex();
        v.bone_ids = Some([2, 0, 1, 3]);
        v.bone_weights = Some([0.1, 0.6, 0.3, 0.0]);
        let array = VertexArray::build(VertexFeatures::BONES, vec![v], 10).unwrap();
        let weights = array.vertices[0].bone_weights.unwrap();
        assert!(weights[0] > weights[1]);
        assert!((weights.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn degenerate_bone_weights_are_rejected() {
        let mut v = base_vertex();
        v.bone_ids = Some([0, 1, 2, 3]);
        v.bone_weights = Some([0.0, 0.0, 0.0, 0.0]);
        assert!(VertexArray::build(VertexFeatures::BONES, vec![v], 10).is_err());
    }

    #[test]
    fn out_of_range_bone_index_is_rejected() {
        let mut v = base_vertex();
        v.bone_ids = Some([0, 1, 2, 99]);
        v.bone_weights = Some([0.4, 0.3, 0.2, 0.1]);
        assert!(VertexArray::build(VertexFeatures::BONES, vec![v], 10).is_err());
    }
}
