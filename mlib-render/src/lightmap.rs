//! Shadow lightmap pass (spec 4.F): rendered to an off-screen target sized
//! by config, with the camera substituted by the light's pose and color
//! cleared to white so an unoccluded texel reads as fully lit.

use fxhash::FxHashMap;
use mlib_math::RigidTransform3;
use nalgebra::Matrix4;

#[derive(Debug, Clone, Copy)]
pub struct LightmapConfig {
    pub width: u32,
    pub height: u32,
    pub capture_depth: bool,
}

/// The off-screen framebuffer a lightmap pass writes into; `color`/`depth`
/// are CPU-visible placeholders for the GL textures the render thread
/// actually owns (this crate models the bookkeeping, not the GL calls).
#[derive(Debug, Clone)]
pub struct LightmapTarget {
    pub width: u32,
    pub height: u32,
    pub color: Vec<[f32; 4]>,
    pub depth: Option<Vec<f32>>,
    pub view_projection: Matrix4<f32>,
}

impl LightmapTarget {
    pub fn new(config: LightmapConfig, light_pose: &RigidTransform3, projection: Matrix4<f32>) -> Self {
        let pixel_count = (config.width * config.height) as usize;
        Self {
            width: config.width,
            height: config.height,
            color: vec![[1.0, 1.0, 1.0, 1.0]; pixel_count], // cleared to white
            depth: config.capture_depth.then(|| vec![1.0; pixel_count]),
            view_projection: projection * light_pose.inverse().affine(),
        }
    }
}

/// The `lightmap_color<i>`/`lightmap_depth<i>` rendering-resources slots
/// written by each light's pass, with the view-projection matrix fragment
/// shaders need to sample them (spec 4.F).
#[derive(Default)]
pub struct LightmapResources {
    targets: FxHashMap<u32, LightmapTarget>,
}

impl LightmapResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, light_index: u32, target: LightmapTarget) {
        self.targets.insert(light_index, target);
    }

    pub fn color_key(light_index: u32) -> String {
        format!("lightmap_color{light_index}")
    }

    pub fn depth_key(light_index: u32) -> String {
        format!("lightmap_depth{light_index}")
    }

    pub fn get(&self, light_index: u32) -> Option<&LightmapTarget> {
        self.targets.get(&light_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix3, Vector3};

    #[test]
    fn target_clears_color_to_white() {
        let pose = RigidTransform3::new(Matrix3::identity(), Vector3::new(0.0, 5.0, 0.0)).unwrap();
        let target = LightmapTarget::new(
            LightmapConfig {
                width: 4,
                height: 4,
                capture_depth: true,
            },
            &pose,
            Matrix4::identity(),
        );
        assert!(target.color.iter().all(|c| *c == [1.0, 1.0, 1.0, 1.0]));
        assert!(target.depth.is_some());
    }

    #[test]
    fn resources_key_by_light_index() {
        let mut resources = LightmapResources::new();
        let pose = RigidTransform3::default();
        resources.publish(
            2,
            LightmapTarget::new(
                LightmapConfig {
                    width: 1,
                    height: 1,
                    capture_depth: false,
                },
                &pose,
                Matrix4::identity(),
            ),
        );
        assert!(resources.get(2).is_some());
        assert!(resources.get(0).is_none());
        assert_eq!(LightmapResources::color_key(2), "lightmap_color2");
    }
}
