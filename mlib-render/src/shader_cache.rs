//! Shader-program cache keyed by feature set (spec 4.F): on a cache miss,
//! shader text is generated from the key and "compiled" (this crate models
//! the generation/caching side; the actual GL compile call lives with the
//! GL bindings the render thread owns).

use fxhash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Off,
    Continuous,
    Binary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightBins {
    pub ambient: u8,
    pub diffuse: u8,
    pub specular: u8,
}

/// The full feature-set key a shader program is compiled for (spec 4.F):
/// hashing/equality over every field means two meshes needing the exact
/// same permutation share one compiled program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderProgramIdentifier {
    pub occluder_type: u32,
    pub light_count: u32,
    pub blend_mode: BlendModeKey,
    pub num_color_textures: u8,
    pub num_normal_textures: u8,
    pub has_lightmap_color: bool,
    pub has_lightmap_depth: bool,
    pub has_dirtmap: bool,
    pub has_instances: bool,
    pub has_lookat: bool,
    pub reorient_normals: bool,
    pub calculate_lightmap: bool,
    pub light_bins: LightBins,
    pub orthographic: bool,
    pub dirtmap_offset: OrderedF32,
    pub dirtmap_discreteness: OrderedF32,
}

/// `f32` isn't `Hash`/`Eq`, but the dirtmap tuning knobs are stable,
/// quantized config values in practice, so a bit-pattern wrapper is enough
/// to key the cache on them.
#[derive(Debug, Clone, Copy)]
pub struct OrderedF32(pub f32);
impl PartialEq for OrderedF32 {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}
impl Eq for OrderedF32 {}
impl std::hash::Hash for OrderedF32 {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendModeKey {
    Off,
    Continuous,
    Binary,
}

impl From<BlendMode> for BlendModeKey {
    fn from(m: BlendMode) -> Self {
        match m {
            BlendMode::Off => BlendModeKey::Off,
            BlendMode::Continuous => BlendModeKey::Continuous,
            BlendMode::Binary => BlendModeKey::Binary,
        }
    }
}

/// A generated-and-compiled program: opaque GL handle plus the source it
/// was generated from (kept around for `ShaderCompileError` reporting).
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    pub handle: u32,
    pub source: String,
}

/// Generates GLSL-shaped source text from a feature-set key. This is a
/// deterministic text template, not a real compiler frontend - good enough
/// to key/cache against and to hand to a GL-backed compile step.
fn generate_source(id: &RenderProgramIdentifier) -> String {
    format!(
        "#version 330 core\n// occluder={} lights={} blend={:?} color_tex={} normal_tex={} lightmap_color={} lightmap_depth={} dirtmap={} instances={} lookat={} reorient={} calc_lightmap={} ortho={}\n",
        id.occluder_type,
        id.light_count,
        id.blend_mode,
        id.num_color_textures,
        id.num_normal_textures,
        id.has_lightmap_color,
        id.has_lightmap_depth,
        id.has_dirtmap,
        id.has_instances,
        id.has_lookat,
        id.reorient_normals,
        id.calculate_lightmap,
        id.orthographic,
    )
}

/// Caches compiled programs by [`RenderProgramIdentifier`]; a miss
/// generates source via `compile` (injected so tests/headless runs don't
/// need a real GL context) and stores the result.
pub struct ShaderCache {
    programs: FxHashMap<RenderProgramIdentifier, CompiledProgram>,
    next_handle: u32,
}

impl Default for ShaderCache {
    fn default() -> Self {
        Self {
            programs: Default::default(),
            next_handle: 1,
        }
    }
}

impl ShaderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `compile` receives the generated source and returns `Ok(())` or the
    /// GL compile-log's first line on failure (spec 7 `ShaderCompileError`).
    pub fn get_or_compile(
        &mut self,
        id: RenderProgramIdentifier,
        compile: impl FnOnce(&str) -> Result<(), String>,
    ) -> Result<&CompiledProgram, crate::error::RenderError> {
        if !self.programs.contains_key(&id) {
            let source = generate_source(&id);
            if let Err(first_log_line) = compile(&source) {
                return Err(crate::error::RenderError::ShaderCompile {
                    source,
                    first_log_line,
                });
            }
            let handle = self.next_handle;
            self.next_handle += 1;
            self.programs.insert(id.clone(), CompiledProgram { handle, source });
        }
        Ok(self.programs.get(&id).unwrap())
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_id(light_count: u32) -> RenderProgramIdentifier {
        RenderProgramIdentifier {
            occluder_type: 0,
            light_count,
            blend_mode: BlendModeKey::Off,
            num_color_textures: 1,
            num_normal_textures: 0,
            has_lightmap_color: false,
            has_lightmap_depth: false,
            has_dirtmap: false,
            has_instances: false,
            has_lookat: false,
            reorient_normals: false,
            calculate_lightmap: false,
            light_bins: LightBins {
                ambient: 1,
                diffuse: 1,
                specular: 1,
            },
            orthographic: false,
            dirtmap_offset: OrderedF32(0.0),
            dirtmap_discreteness: OrderedF32(0.0),
        }
    }

    #[test]
    fn cache_hit_reuses_the_same_handle() {
        let mut cache = ShaderCache::new();
        let a = cache.get_or_compile(sample_id(1), |_| Ok(())).unwrap().handle;
        let b = cache.get_or_compile(sample_id(1), |_| panic!("should not recompile")).unwrap().handle;
        assert_eq!(a, b);
    }

    #[test]
    fn different_light_counts_get_distinct_programs() {
        let mut cache = ShaderCache::new();
        let a = cache.get_or_compile(sample_id(1), |_| Ok(())).unwrap().handle;
        let b = cache.get_or_compile(sample_id(2), |_| Ok(())).unwrap().handle;
        assert_ne!(a, b);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn compile_failure_surfaces_as_render_error() {
        let mut cache = ShaderCache::new();
        let err = cache
            .get_or_compile(sample_id(3), |_| Err("ERROR: 0:1: syntax error".to_string()))
            .unwrap_err();
        assert!(matches!(err, crate::error::RenderError::ShaderCompile { .. }));
        assert!(cache.is_empty());
    }
}
