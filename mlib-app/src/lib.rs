//! CLI binaries, the dedicated physics thread, input/focus arbitration,
//! and the file-format/config glue the two entry points need (spec
//! Components H/I plus section 6 "External Interfaces").

pub mod cli;
pub mod config;
pub mod error;
pub mod focus_state;
pub mod input;
pub mod obj;
pub mod physics_loop;
pub mod ppm;
pub mod raster;
pub mod scene_build;
pub mod scn;
pub mod substitute;

pub use error::AppError;

/// Initializes the `env_logger` subscriber the way both binaries do at
/// startup; libraries only ever depend on the `log` facade (DESIGN.md).
pub fn init_logging() {
    let _ = env_logger::try_init();
}
