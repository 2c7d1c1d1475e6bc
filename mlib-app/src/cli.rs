//! Command-line argument definitions for the two entry points (spec 6).

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BlendModeArg {
    Off,
    Continuous,
    Binary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AggregateModeArg {
    Off,
    Once,
    Sorted,
}

#[derive(Debug, Parser)]
#[command(name = "render_obj_file")]
pub struct RenderObjArgs {
    #[arg(required = true)]
    pub files: Vec<String>,
    #[arg(long, default_value_t = 1.0)]
    pub scale: f32,
    #[arg(long, default_value_t = 640)]
    pub width: u32,
    #[arg(long, default_value_t = 480)]
    pub height: u32,
    #[arg(long, default_value = "out.ppm")]
    pub output: String,
    #[arg(long, value_enum, default_value_t = BlendModeArg::Off)]
    pub blend_mode: BlendModeArg,
    #[arg(long, value_enum, default_value_t = AggregateModeArg::Off)]
    pub aggregate_mode: AggregateModeArg,
    #[arg(long, default_value_t = false)]
    pub apply_static_lighting: bool,
    #[arg(long, default_value_t = false)]
    pub no_shadows: bool,
    #[arg(long, default_value_t = false)]
    pub no_light: bool,
    #[arg(long, default_value_t = 0.2)]
    pub light_ambience: f32,
    #[arg(long, default_value_t = 0.7)]
    pub light_diffusivity: f32,
    #[arg(long, default_value_t = 0.3)]
    pub light_specularity: f32,
    #[arg(long, default_value_t = false)]
    pub no_cull_faces: bool,
    #[arg(long, default_value_t = false)]
    pub wire_frame: bool,
    #[arg(long, default_value_t = 1.0 / 60.0)]
    pub render_dt: f32,
    #[arg(long, default_value_t = 0)]
    pub min_num: usize,
    #[arg(long, default_value = "")]
    pub regex: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PhysicsTypeArg {
    Version1,
    TrackingSprings,
    Builtin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResolveCollisionTypeArg {
    Penalty,
    SequentialPulses,
}

#[derive(Debug, Parser)]
#[command(name = "render_scene_file")]
pub struct RenderSceneArgs {
    pub scene_file: String,
    #[arg(long, default_value_t = 1.0 / 60.0)]
    pub physics_dt: f32,
    #[arg(long, default_value_t = 1.0 / 60.0)]
    pub render_dt: f32,
    #[arg(long, default_value_t = 20)]
    pub oversampling: usize,
    #[arg(long, value_enum, default_value_t = PhysicsTypeArg::Version1)]
    pub physics_type: PhysicsTypeArg,
    #[arg(long, value_enum, default_value_t = ResolveCollisionTypeArg::Penalty)]
    pub resolve_collision_type: ResolveCollisionTypeArg,
    #[arg(long, default_value_t = 200.0)]
    pub bvh_max_size: f32,
    #[arg(long, default_value_t = 200.0)]
    pub static_radius: f32,
    #[arg(long, default_value_t = false)]
    pub no_bvh: bool,
    #[arg(long, default_value_t = false)]
    pub single_threaded: bool,
    #[arg(long, default_value_t = false)]
    pub no_physics: bool,
    #[arg(long, default_value_t = 640)]
    pub width: u32,
    #[arg(long, default_value_t = 480)]
    pub height: u32,
    #[arg(long, default_value = "out.ppm")]
    pub output: String,
}
