//! Renderer error taxonomy entries this crate owns (spec 7
//! `ShaderCompileError`/`ConfigError`).

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// GL returned a non-zero compile status; carries the generated source
    /// and the first log line, per spec 7.
    ShaderCompile {
        source: String,
        first_log_line: String,
    },
    MissingResource { name: String },
    TooFewBoneWeights { sum: String },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::ShaderCompile { first_log_line, .. } => {
                write!(f, "shader compile failed: {first_log_line}")
            }
            RenderError::MissingResource { name } => write!(f, "missing resource {name:?}"),
            RenderError::TooFewBoneWeights { sum } => {
                write!(f, "bone weight sum too small: {sum}")
            }
        }
    }
}

impl std::error::Error for RenderError {}
