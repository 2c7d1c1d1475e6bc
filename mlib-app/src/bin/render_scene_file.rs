//! `render_scene_file`: loads a `.scn` manifest, builds a physics engine and
//! scene graph from it, runs the simulation (threaded or single-threaded,
//! or skipped entirely under `--no_physics`), and rasterizes the final
//! frame to a PPM (spec 6).

use clap::Parser;
use mlib_app::cli::RenderSceneArgs;
use mlib_app::config;
use mlib_app::input::Focuses;
use mlib_app::obj::{self, Mesh};
use mlib_app::physics_loop::{self, PhysicsLoopHandle};
use mlib_app::ppm;
use mlib_app::raster::{self, RasterConfig};
use mlib_app::scene_build;
use mlib_app::scn;
use mlib_app::AppError;
use mlib_physics::PhysicsEngine;
use mlib_scene::{Handle, NodeKind, Scene, SceneNode};
use nalgebra::Vector3;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;

struct LoadedBody {
    handle: Handle<SceneNode>,
    mesh: Mesh,
}

fn load_obj(path: &str) -> Result<Mesh, AppError> {
    let dir = std::path::Path::new(path).parent().unwrap_or_else(|| std::path::Path::new("."));
    let text = std::fs::read_to_string(path)?;
    let mut mtl_texts = std::collections::HashMap::new();
    for line in text.lines() {
        if let Some(rest) = line.trim().strip_prefix("mtllib ") {
            let filename = rest.trim();
            if let Ok(mtl_text) = std::fs::read_to_string(dir.join(filename)) {
                mtl_texts.insert(filename.to_string(), mtl_text);
            }
        }
    }
    obj::parse_obj(&text, &mtl_texts)
}

/// Copies each body's current physics pose into its scene node's local
/// transform; the generic hook `spawn_physics_loop` expects for gameplay
/// pose/node bookkeeping (see physics_loop's doc comment).
fn sync_poses(engine: &PhysicsEngine, scene: &mut Scene, bodies: &[(usize, Handle<SceneNode>)]) {
    for (index, handle) in bodies {
        if let Some(node) = scene.node_mut(*handle) {
            node.local_transform = engine.body(*index).pose();
        }
    }
}

fn render_final_frame(
    static_mesh: Option<&Mesh>,
    scene: &Scene,
    bodies: &[LoadedBody],
    args: &RenderSceneArgs,
) -> Result<(), AppError> {
    let mut merged = Mesh::default();
    if let Some(static_mesh) = static_mesh {
        obj::merge_mesh(&mut merged, static_mesh.clone());
    }
    for body in bodies {
        let pose = scene
            .node(body.handle)
            .map(|n| n.global_transform)
            .unwrap_or_default();
        let posed = scene_build::pose_mesh(&body.mesh, &pose);
        obj::merge_mesh(&mut merged, posed);
    }

    let aspect = args.width as f32 / args.height.max(1) as f32;
    let view_projection = raster::fit_camera(&merged, aspect);
    let config = RasterConfig {
        width: args.width,
        height: args.height,
        light_ambience: 0.2,
        light_diffusivity: 0.7,
        light_specularity: 0.2,
        no_light: false,
        wire_frame: false,
        background: [10, 10, 30],
    };
    let image = raster::rasterize(&merged, view_projection, &config);
    std::fs::write(&args.output, ppm::save_ppm(&image))?;
    Ok(())
}

fn run() -> Result<(), AppError> {
    let args = RenderSceneArgs::parse();
    mlib_app::init_logging();

    let physics_config = config::physics_config_from_args(&args)?;
    let scene_text = std::fs::read_to_string(&args.scene_file)?;
    let description = scn::parse_scn(&scene_text)?;

    let mut engine = PhysicsEngine::new(physics_config);
    let mut scene = Scene::new();
    let mut bodies = Vec::new();
    let mut body_indices = Vec::new();

    let static_mesh = match &description.static_obj_file {
        Some(path) => {
            let mesh = load_obj(path)?;
            engine.set_static_geometry(scene_build::static_triangles(&mesh));
            Some(mesh)
        }
        None => None,
    };

    for (i, body_desc) in description.bodies.iter().enumerate() {
        let mesh = load_obj(&body_desc.obj_file)?;
        let position = Vector3::new(body_desc.position[0], body_desc.position[1], body_desc.position[2]);
        let velocity = Vector3::new(body_desc.velocity[0], body_desc.velocity[1], body_desc.velocity[2]);
        let (rigid_body, geometry) =
            scene_build::body_from_mesh(i as u64, &mesh, body_desc.mass, position, velocity)?;
        let physics_index = engine.add_body(rigid_body, geometry);

        let mut node = SceneNode::new(body_desc.name.clone(), NodeKind::Mesh { blended: false });
        node.movable = mlib_scene::MovablePolicy::Absolute;
        let handle = scene.add_root_node(node)?;
        body_indices.push((physics_index, handle));
        bodies.push(LoadedBody { handle, mesh });
    }

    sync_poses(&engine, &mut scene, &body_indices);
    scene.update_global_transforms();

    let total_ticks = (description.duration_seconds / args.physics_dt.max(1e-6)).round().max(0.0) as usize;

    if args.no_physics {
        log::info!("--no_physics set, skipping simulation entirely");
    } else if args.single_threaded {
        for _ in 0..total_ticks {
            physics_loop::run_one_tick(&mut engine, &mut scene, args.physics_dt)?;
            sync_poses(&engine, &mut scene, &body_indices);
        }
        scene.update_global_transforms();
    } else {
        let engine = Arc::new(Mutex::new(engine));
        let scene_lock = Arc::new(RwLock::new(scene));
        let focuses = Arc::new(Mutex::new(Focuses::new()));
        let pose_bodies = body_indices.clone();
        let handle: PhysicsLoopHandle = physics_loop::spawn_physics_loop(
            engine.clone(),
            scene_lock.clone(),
            focuses,
            args.physics_dt,
            0.5,
            true,
            move |engine, scene| {
                sync_poses(engine, scene, &pose_bodies);
                scene.update_global_transforms();
            },
        );
        std::thread::sleep(Duration::from_secs_f32(description.duration_seconds));
        handle.shutdown();

        let recovered_scene = Arc::try_unwrap(scene_lock)
            .unwrap_or_else(|_| panic!("physics thread's scene handle outlived shutdown()"))
            .into_inner();
        return render_final_frame(static_mesh.as_ref(), &recovered_scene, &bodies, &args);
    }

    render_final_frame(static_mesh.as_ref(), &scene, &bodies, &args)
}

fn main() {
    if let Err(error) = run() {
        eprintln!("render_scene_file: {error}");
        std::process::exit(1);
    }
}
