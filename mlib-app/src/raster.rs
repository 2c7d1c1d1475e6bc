//! A minimal software rasterizer standing in for the GL pipeline the spec
//! treats as an external collaborator ("the OpenGL shader text generation"
//! is out of scope - see spec 1). `render_obj_file`/`render_scene_file`
//! still need to produce an actual image for their `--output` flag, so
//! this module does flat Lambertian shading with a z-buffer, entirely on
//! the CPU, and leaves real GL rendering to whatever owns the window.

use crate::obj::Mesh;
use crate::ppm::Image;
use nalgebra::{Matrix4, Vector3, Vector4};

#[derive(Debug, Clone, Copy)]
pub struct RasterConfig {
    pub width: u32,
    pub height: u32,
    pub light_ambience: f32,
    pub light_diffusivity: f32,
    pub light_specularity: f32,
    pub no_light: bool,
    pub wire_frame: bool,
    pub background: [u8; 3],
}

fn look_at(eye: Vector3<f32>, target: Vector3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
    let f = (target - eye).normalize();
    let s = f.cross(&up).normalize();
    let u = s.cross(&f);
    Matrix4::new(
        s.x, s.y, s.z, -s.dot(&eye),
        u.x, u.y, u.z, -u.dot(&eye),
        -f.x, -f.y, -f.z, f.dot(&eye),
        0.0, 0.0, 0.0, 1.0,
    )
}

fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Matrix4<f32> {
    let mut m = Matrix4::zeros();
    m[(0, 0)] = 2.0 / (right - left);
    m[(1, 1)] = 2.0 / (top - bottom);
    m[(2, 2)] = -2.0 / (far - near);
    m[(0, 3)] = -(right + left) / (right - left);
    m[(1, 3)] = -(top + bottom) / (top - bottom);
    m[(2, 3)] = -(far + near) / (far - near);
    m[(3, 3)] = 1.0;
    m
}

/// Frames `mesh`'s bounding box with an orthographic camera looking along
/// -Z, since a full perspective camera rig is scene/gameplay territory
/// this crate doesn't otherwise model.
pub fn fit_camera(mesh: &Mesh, aspect: f32) -> Matrix4<f32> {
    if mesh.positions.is_empty() {
        return Matrix4::identity();
    }
    let mut min = mesh.positions[0];
    let mut max = mesh.positions[0];
    for p in &mesh.positions {
        min = min.inf(p);
        max = max.sup(p);
    }
    let center = (min + max) * 0.5;
    let half_extent = (max - min).amax().max(1e-3) * 0.75 + 1e-3;
    let eye = center + Vector3::new(0.0, 0.0, half_extent * 4.0);
    let view = look_at(eye, center, Vector3::new(0.0, 1.0, 0.0));
    let half_w = half_extent * aspect.max(1.0);
    let half_h = half_extent * (1.0 / aspect).max(1.0);
    let proj = orthographic(-half_w, half_w, -half_h, half_h, 0.01, half_extent * 10.0);
    proj * view
}

fn project(view_projection: &Matrix4<f32>, p: Vector3<f32>, width: u32, height: u32) -> (f32, f32, f32) {
    let clip = view_projection * Vector4::new(p.x, p.y, p.z, 1.0);
    let ndc = Vector3::new(clip.x, clip.y, clip.z) / clip.w;
    let x = (ndc.x * 0.5 + 0.5) * width as f32;
    let y = (1.0 - (ndc.y * 0.5 + 0.5)) * height as f32;
    (x, y, ndc.z)
}

fn edge(a: (f32, f32), b: (f32, f32), p: (f32, f32)) -> f32 {
    (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
}

fn draw_line(image: &mut Image, a: (f32, f32), b: (f32, f32), color: [u8; 3]) {
    let steps = (a.0 - b.0).abs().max((a.1 - b.1).abs()).ceil().max(1.0) as i32;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = a.0 + (b.0 - a.0) * t;
        let y = a.1 + (b.1 - a.1) * t;
        if x >= 0.0 && y >= 0.0 {
            image.set(x as u32, y as u32, color);
        }
    }
}

/// Flat-shades and rasterizes every face of `mesh` into a new [`Image`].
pub fn rasterize(mesh: &Mesh, view_projection: Matrix4<f32>, config: &RasterConfig) -> Image {
    let mut image = Image::new(config.width, config.height);
    for pixel in &mut image.pixels {
        *pixel = config.background;
    }
    let mut depth = vec![f32::INFINITY; (config.width * config.height) as usize];
    let light_dir = Vector3::new(0.4, 1.0, 0.3).normalize();

    for face in &mesh.faces {
        let world = [
            mesh.positions[face.vertices[0].position as usize],
            mesh.positions[face.vertices[1].position as usize],
            mesh.positions[face.vertices[2].position as usize],
        ];
        let normal = (world[1] - world[0])
            .cross(&(world[2] - world[0]))
            .try_normalize(1e-6)
            .unwrap_or_else(|| Vector3::new(0.0, 0.0, 1.0));
        let material_color = face
            .material
            .and_then(|i| mesh.materials.get(i))
            .map(|m| m.diffuse)
            .unwrap_or_else(|| Vector3::new(0.8, 0.8, 0.8));
        let shaded = if config.no_light {
            material_color
        } else {
            let n_dot_l = normal.dot(&light_dir).max(0.0);
            let intensity = config.light_ambience
                + config.light_diffusivity * n_dot_l
                + config.light_specularity * n_dot_l.powi(8);
            material_color * intensity
        };
        let color = [
            (shaded.x.clamp(0.0, 1.0) * 255.0) as u8,
            (shaded.y.clamp(0.0, 1.0) * 255.0) as u8,
            (shaded.z.clamp(0.0, 1.0) * 255.0) as u8,
        ];

        let screen = world.map(|p| project(&view_projection, p, config.width, config.height));

        if config.wire_frame {
            draw_line(&mut image, (screen[0].0, screen[0].1), (screen[1].0, screen[1].1), color);
            draw_line(&mut image, (screen[1].0, screen[1].1), (screen[2].0, screen[2].1), color);
            draw_line(&mut image, (screen[2].0, screen[2].1), (screen[0].0, screen[0].1), color);
            continue;
        }

        let min_x = screen.iter().map(|s| s.0).fold(f32::INFINITY, f32::min).max(0.0) as u32;
        let max_x = (screen.iter().map(|s| s.0).fold(f32::NEG_INFINITY, f32::max).ceil() as i64)
            .clamp(0, config.width as i64 - 1) as u32;
        let min_y = screen.iter().map(|s| s.1).fold(f32::INFINITY, f32::min).max(0.0) as u32;
        let max_y = (screen.iter().map(|s| s.1).fold(f32::NEG_INFINITY, f32::max).ceil() as i64)
            .clamp(0, config.height as i64 - 1) as u32;
        if min_x > max_x || min_y > max_y {
            continue;
        }

        let a = (screen[0].0, screen[0].1);
        let b = (screen[1].0, screen[1].1);
        let c = (screen[2].0, screen[2].1);
        let area = edge(a, b, c);
        if area.abs() < 1e-6 {
            continue;
        }

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(b, c, p) / area;
                let w1 = edge(c, a, p) / area;
                let w2 = edge(a, b, p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let z = w0 * screen[0].2 + w1 * screen[1].2 + w2 * screen[2].2;
                let idx = (y * config.width + x) as usize;
                if z < depth[idx] {
                    depth[idx] = z;
                    image.set(x, y, color);
                }
            }
        }
    }
    image
}
