//! Top-level error taxonomy (spec 7): composes every crate-owned error type
//! plus the entries this crate owns itself (`CommandLineArgumentError`,
//! `ParseError`, `EdgeException`, `ConfigError`), via `From` impls the way
//! `fyrox-impl`'s scene loader composes `VisitError`/`ResourceLoadError`
//! into one `SceneLoadingError`.

use std::fmt;

#[derive(Debug)]
pub enum AppError {
    CommandLineArgument { message: String },
    /// A malformed line in an OBJ/MTL/BVH file; carries the offending text.
    Parse { file: String, line: usize, text: String },
    /// Duplicate mesh edge encountered while building contour data, per
    /// spec 7 `EdgeException`.
    Edge { a: u32, b: u32 },
    Config { message: String },
    Math(mlib_math::DomainError),
    Geometry(mlib_geometry::GeometryError),
    Physics(mlib_physics::PhysicsError),
    Scene(mlib_scene::SceneError<mlib_scene::SceneNode>),
    Render(mlib_render::RenderError),
    Resource(mlib_scene::resource::ResourceError),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::CommandLineArgument { message } => write!(f, "{message}"),
            AppError::Parse { file, line, text } => {
                write!(f, "{file}:{line}: malformed line: {text:?}")
            }
            AppError::Edge { a, b } => write!(f, "duplicate or inconsistent edge ({a}, {b})"),
            AppError::Config { message } => write!(f, "{message}"),
            AppError::Math(e) => write!(f, "{e}"),
            AppError::Geometry(e) => write!(f, "{e}"),
            AppError::Physics(e) => write!(f, "{e}"),
            AppError::Scene(e) => write!(f, "{e}"),
            AppError::Render(e) => write!(f, "{e}"),
            AppError::Resource(e) => write!(f, "{e}"),
            AppError::Io(e) => write!(f, "{e}"),
            AppError::Json(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<mlib_math::DomainError> for AppError {
    fn from(e: mlib_math::DomainError) -> Self {
        AppError::Math(e)
    }
}
impl From<mlib_geometry::GeometryError> for AppError {
    fn from(e: mlib_geometry::GeometryError) -> Self {
        AppError::Geometry(e)
    }
}
impl From<mlib_physics::PhysicsError> for AppError {
    fn from(e: mlib_physics::PhysicsError) -> Self {
        AppError::Physics(e)
    }
}
impl From<mlib_scene::SceneError<mlib_scene::SceneNode>> for AppError {
    fn from(e: mlib_scene::SceneError<mlib_scene::SceneNode>) -> Self {
        AppError::Scene(e)
    }
}
impl From<mlib_render::RenderError> for AppError {
    fn from(e: mlib_render::RenderError) -> Self {
        AppError::Render(e)
    }
}
impl From<mlib_scene::resource::ResourceError> for AppError {
    fn from(e: mlib_scene::resource::ResourceError) -> Self {
        AppError::Resource(e)
    }
}
impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e)
    }
}
impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Json(e)
    }
}
