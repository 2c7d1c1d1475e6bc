//! `render_obj_file`: loads one or more OBJ files (merging them), applies a
//! uniform scale, filters materials through the resource registry's
//! `min_num`/`regex` gate, rasterizes, and writes a PPM (spec 6).

use clap::Parser;
use mlib_app::cli::RenderObjArgs;
use mlib_app::obj::{self, Mesh};
use mlib_app::ppm;
use mlib_app::raster::{self, RasterConfig};
use mlib_app::AppError;
use mlib_scene::resource::{RenderableEntry, RenderableFilter, Resource, ResourceRegistry};
use std::collections::HashMap;
use std::path::Path;

fn load_mtl_texts(obj_path: &Path, obj_text: &str) -> Result<HashMap<String, String>, AppError> {
    let mut texts = HashMap::new();
    let dir = obj_path.parent().unwrap_or_else(|| Path::new("."));
    for line in obj_text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("mtllib ") {
            let filename = rest.trim();
            let path = dir.join(filename);
            if let Ok(text) = std::fs::read_to_string(&path) {
                texts.insert(filename.to_string(), text);
            }
        }
    }
    Ok(texts)
}

fn load_merged_mesh(files: &[String]) -> Result<Mesh, AppError> {
    let mut merged = Mesh::default();
    for file in files {
        let path = Path::new(file);
        let text = std::fs::read_to_string(path)?;
        let mtl_texts = load_mtl_texts(path, &text)?;
        let mesh = obj::parse_obj(&text, &mtl_texts)?;
        obj::merge_mesh(&mut merged, mesh);
    }
    Ok(merged)
}

/// Registers every material name as a `Renderable` resource and applies
/// `--min_num`/`--regex` through [`ResourceRegistry::instantiate_renderable`]
/// (spec 4.J), purely to gate how many materials a render is allowed to
/// proceed with - the actual pixels still come from every face regardless
/// of which materials matched.
fn check_renderable_filter(mesh: &Mesh, min_num: usize, pattern: &str) -> Result<(), AppError> {
    let mut registry = ResourceRegistry::new();
    let entries: Vec<RenderableEntry> = mesh
        .materials
        .iter()
        .map(|m| RenderableEntry { name: m.name.clone() })
        .collect();
    registry.add_resource("materials", Resource::Renderable(entries))?;
    registry.instantiate_renderable(
        "materials",
        &RenderableFilter {
            min_num,
            max_num: usize::MAX,
            pattern,
        },
    )?;
    Ok(())
}

fn run() -> Result<(), AppError> {
    let args = RenderObjArgs::parse();
    mlib_app::init_logging();

    let mut mesh = load_merged_mesh(&args.files)?;
    for p in &mut mesh.positions {
        *p *= args.scale;
    }

    if args.min_num > 0 || !args.regex.is_empty() {
        check_renderable_filter(&mesh, args.min_num, &args.regex)?;
    }

    log::info!(
        "loaded {} vertices, {} faces from {} file(s) (blend_mode={:?}, aggregate_mode={:?})",
        mesh.positions.len(),
        mesh.faces.len(),
        args.files.len(),
        args.blend_mode,
        args.aggregate_mode,
    );

    let aspect = args.width as f32 / args.height.max(1) as f32;
    let view_projection = raster::fit_camera(&mesh, aspect);
    let config = RasterConfig {
        width: args.width,
        height: args.height,
        light_ambience: args.light_ambience,
        light_diffusivity: args.light_diffusivity,
        light_specularity: args.light_specularity,
        no_light: args.no_light,
        wire_frame: args.wire_frame,
        background: [20, 20, 20],
    };
    let image = raster::rasterize(&mesh, view_projection, &config);

    if args.output.ends_with(".bgr") {
        std::fs::write(&args.output, ppm::save_bgr24(&image))?;
    } else {
        std::fs::write(&args.output, ppm::save_ppm(&image))?;
    }
    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("render_obj_file: {error}");
        std::process::exit(1);
    }
}
