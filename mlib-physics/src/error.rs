//! Error taxonomy entries owned by this crate (spec 7): `DomainError` for
//! integrator-level invariant violations, which is the only category the
//! physics loop treats as terminate-the-thread rather than
//! log-and-drop-the-contact.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// NaN appeared in a rigid body's pose after integration. Per spec 4.C
    /// "Failure semantics", this is always a hard abort - it means an
    /// upstream bug fed the integrator bad data, not a recoverable collision
    /// edge case.
    NonFinitePose { body: u64 },
    /// Overlap resolution produced an inconsistent result (e.g. SAT reported
    /// negative overlap for a pair the broad phase already classified as
    /// colliding).
    OverlapInconsistency { detail: &'static str },
    Geometry(mlib_geometry::GeometryError),
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicsError::NonFinitePose { body } => {
                write!(f, "non-finite pose after integration for body {body}")
            }
            PhysicsError::OverlapInconsistency { detail } => {
                write!(f, "overlap resolution inconsistency: {detail}")
            }
            PhysicsError::Geometry(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PhysicsError {}

impl From<mlib_geometry::GeometryError> for PhysicsError {
    fn from(e: mlib_geometry::GeometryError) -> Self {
        PhysicsError::Geometry(e)
    }
}
