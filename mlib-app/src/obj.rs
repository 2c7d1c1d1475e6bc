//! OBJ + MTL loading (spec 6 "File formats consumed", treated as an
//! external interface with a stated shape): vertex lines `v`/`vn`/`vt`,
//! triangle or quad `f` faces (quads fan-triangulated), `mtllib`/`usemtl`,
//! `#` comments. `object`/`group`/`smoothing` directives are accepted and
//! ignored, matching the spec's explicit "ignored" note.

use crate::error::AppError;
use nalgebra::{Vector2, Vector3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceVertex {
    pub position: u32,
    pub normal: Option<u32>,
    pub uv: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Face {
    pub vertices: [FaceVertex; 3],
    pub material: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub diffuse: Vector3<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub positions: Vec<Vector3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub uvs: Vec<Vector2<f32>>,
    pub faces: Vec<Face>,
    pub materials: Vec<Material>,
}

/// Parses `mtl_text` into a flat material list (`newmtl name` / `Kd r g b`).
pub fn parse_mtl(mtl_text: &str) -> Result<Vec<Material>, AppError> {
    let mut materials = Vec::new();
    for (line_no, raw) in mtl_text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("newmtl") => {
                let name = tokens.next().ok_or_else(|| parse_err("mtl", line_no, raw))?;
                materials.push(Material {
                    name: name.to_string(),
                    diffuse: Vector3::new(0.8, 0.8, 0.8),
                });
            }
            Some("Kd") => {
                let current = materials
                    .last_mut()
                    .ok_or_else(|| parse_err("mtl", line_no, raw))?;
                current.diffuse = parse_vec3(tokens, "mtl", line_no, raw)?;
            }
            _ => {}
        }
    }
    Ok(materials)
}

fn parse_err(file: &str, line_no: usize, text: &str) -> AppError {
    AppError::Parse {
        file: file.to_string(),
        line: line_no + 1,
        text: text.to_string(),
    }
}

fn parse_vec3<'a>(
    mut tokens: impl Iterator<Item = &'a str>,
    file: &str,
    line_no: usize,
    text: &str,
) -> Result<Vector3<f32>, AppError> {
    let mut parse_next = || {
        tokens
            .next()
            .and_then(|t| t.parse::<f32>().ok())
            .ok_or_else(|| parse_err(file, line_no, text))
    };
    Ok(Vector3::new(parse_next()?, parse_next()?, parse_next()?))
}

/// Parses `obj_text`; `mtl_texts` maps a `mtllib` filename to its already-
/// loaded contents, since file resolution itself is the caller's concern.
pub fn parse_obj(
    obj_text: &str,
    mtl_texts: &std::collections::HashMap<String, String>,
) -> Result<Mesh, AppError> {
    let mut mesh = Mesh::default();
    let mut material_index: std::collections::HashMap<String, usize> =
        std::collections::HashMap::new();
    let mut current_material: Option<usize> = None;

    for (line_no, raw) in obj_text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => mesh.positions.push(parse_vec3(tokens, "obj", line_no, raw)?),
            Some("vn") => mesh.normals.push(parse_vec3(tokens, "obj", line_no, raw)?),
            Some("vt") => {
                let mut parse_next = || {
                    tokens
                        .next()
                        .and_then(|t| t.parse::<f32>().ok())
                        .ok_or_else(|| parse_err("obj", line_no, raw))
                };
                mesh.uvs.push(Vector2::new(parse_next()?, parse_next()?));
            }
            Some("mtllib") => {
                let filename = tokens.next().ok_or_else(|| parse_err("obj", line_no, raw))?;
                if let Some(text) = mtl_texts.get(filename) {
                    for material in parse_mtl(text)? {
                        material_index.insert(material.name.clone(), mesh.materials.len());
                        mesh.materials.push(material);
                    }
                }
            }
            Some("usemtl") => {
                let name = tokens.next().ok_or_else(|| parse_err("obj", line_no, raw))?;
                current_material = material_index.get(name).copied();
            }
            Some("f") => {
                let verts: Vec<FaceVertex> = tokens
                    .map(|t| parse_face_vertex(t, "obj", line_no, raw))
                    .collect::<Result<_, _>>()?;
                if verts.len() < 3 {
                    return Err(parse_err("obj", line_no, raw));
                }
                for i in 1..verts.len() - 1 {
                    mesh.faces.push(Face {
                        vertices: [verts[0], verts[i], verts[i + 1]],
                        material: current_material,
                    });
                }
            }
            Some("o") | Some("g") | Some("s") => {}
            _ => {}
        }
    }
    Ok(mesh)
}

fn parse_face_vertex(
    token: &str,
    file: &str,
    line_no: usize,
    text: &str,
) -> Result<FaceVertex, AppError> {
    let mut parts = token.split('/');
    let position: u32 = parts
        .next()
        .and_then(|p| p.parse::<u32>().ok())
        .ok_or_else(|| parse_err(file, line_no, text))?;
    let uv = parts.next().and_then(|p| p.parse::<u32>().ok());
    let normal = parts.next().and_then(|p| p.parse::<u32>().ok());
    Ok(FaceVertex {
        position: position - 1,
        normal: normal.map(|n| n - 1),
        uv: uv.map(|n| n - 1),
    })
}

/// Appends `src` onto `dst`, offsetting every index so faces keep pointing
/// at the right vertex/normal/uv/material after the concatenation (spec 6
/// `render_obj_file <files...>` takes more than one input file).
pub fn merge_mesh(dst: &mut Mesh, src: Mesh) {
    let position_offset = dst.positions.len() as u32;
    let normal_offset = dst.normals.len() as u32;
    let uv_offset = dst.uvs.len() as u32;
    let material_offset = dst.materials.len();
    dst.positions.extend(src.positions);
    dst.normals.extend(src.normals);
    dst.uvs.extend(src.uvs);
    dst.materials.extend(src.materials);
    for face in src.faces {
        let vertices = face.vertices.map(|v| FaceVertex {
            position: v.position + position_offset,
            normal: v.normal.map(|n| n + normal_offset),
            uv: v.uv.map(|u| u + uv_offset),
        });
        dst.faces.push(Face {
            vertices,
            material: face.material.map(|m| m + material_offset),
        });
    }
}

/// Writes `mesh` back out as OBJ text (1-based indices, no MTL emitted),
/// the inverse of [`parse_obj`] for the round-trip property in spec 8.
pub fn write_obj(mesh: &Mesh) -> String {
    let mut out = String::new();
    for p in &mesh.positions {
        out.push_str(&format!("v {} {} {}\n", p.x, p.y, p.z));
    }
    for n in &mesh.normals {
        out.push_str(&format!("vn {} {} {}\n", n.x, n.y, n.z));
    }
    for uv in &mesh.uvs {
        out.push_str(&format!("vt {} {}\n", uv.x, uv.y));
    }
    for face in &mesh.faces {
        out.push('f');
        for v in &face.vertices {
            out.push(' ');
            out.push_str(&(v.position + 1).to_string());
            if v.uv.is_some() || v.normal.is_some() {
                out.push('/');
                if let Some(uv) = v.uv {
                    out.push_str(&(uv + 1).to_string());
                }
                if let Some(normal) = v.normal {
                    out.push('/');
                    out.push_str(&(normal + 1).to_string());
                }
            }
        }
        out.push('\n');
    }
    out
}
