//! Scene-graph error taxonomy (spec 7 `ConfigError` entries this crate
//! owns: duplicate node name, node scheduled-for-deletion lookup from a
//! non-deleter thread is represented by [`SceneError::StaleHandle`] here
//! since this crate has no thread concept of its own).

use crate::handle::Handle;
use std::fmt;

#[derive(Debug)]
pub enum SceneError<T> {
    DuplicateName { name: String },
    ChildAlreadyHasParent { child: Handle<T> },
    StaleHandle { handle: Handle<T> },
    RemovingLastRootReference { handle: Handle<T> },
}

impl<T> fmt::Display for SceneError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::DuplicateName { name } => {
                write!(f, "a node named {name:?} already exists")
            }
            SceneError::ChildAlreadyHasParent { child } => {
                write!(f, "{child:?} already has a parent")
            }
            SceneError::StaleHandle { handle } => {
                write!(f, "{handle:?} no longer refers to a live node")
            }
            SceneError::RemovingLastRootReference { handle } => {
                write!(f, "removing the last reference to root {handle:?} with children still attached")
            }
        }
    }
}

impl<T: fmt::Debug> std::error::Error for SceneError<T> {}
