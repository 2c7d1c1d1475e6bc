//! `.scn` scene-description files (spec 6 `render_scene_file <scene.scn>`):
//! a JSON manifest of the static geometry and rigid bodies to instantiate,
//! the human-authored counterpart to the teacher's own binary visitor
//! scene format (see SPEC_FULL.md section 1 on why JSON here).

use crate::error::AppError;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct BodyDescription {
    pub name: String,
    pub obj_file: String,
    pub mass: f32,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default)]
    pub velocity: [f32; 3],
}

fn default_duration_seconds() -> f32 {
    2.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub static_obj_file: Option<String>,
    #[serde(default)]
    pub bodies: Vec<BodyDescription>,
    #[serde(default = "default_duration_seconds")]
    pub duration_seconds: f32,
}

pub fn parse_scn(text: &str) -> Result<SceneDescription, AppError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_scene_fills_in_defaults() {
        let scene = parse_scn(r#"{"bodies":[{"name":"a","obj_file":"a.obj","mass":1.0}]}"#).unwrap();
        assert_eq!(scene.bodies.len(), 1);
        assert_eq!(scene.bodies[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(scene.duration_seconds, 2.0);
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(parse_scn("not json").is_err());
    }

    #[test]
    fn explicit_fields_are_preserved() {
        let scene = parse_scn(
            r#"{"static_obj_file":"ground.obj","duration_seconds":5.0,
               "bodies":[{"name":"box","obj_file":"box.obj","mass":3.0,
               "position":[0.0,5.0,0.0],"velocity":[1.0,0.0,0.0]}]}"#,
        )
        .unwrap();
        assert_eq!(scene.static_obj_file.as_deref(), Some("ground.obj"));
        assert_eq!(scene.duration_seconds, 5.0);
        assert_eq!(scene.bodies[0].velocity, [1.0, 0.0, 0.0]);
    }
}
