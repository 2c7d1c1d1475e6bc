//! Persistent UI focus state (spec 6): a JSON object mapping submenu id to
//! last-selected item id, loaded once at startup and saved only when a
//! selection actually changes.

use crate::error::AppError;
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FocusState {
    selections: FxHashMap<String, String>,
    #[serde(skip)]
    dirty: bool,
}

impl FocusState {
    /// A missing file is not an error - the first run has no prior state.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn selection(&self, submenu: &str) -> Option<&str> {
        self.selections.get(submenu).map(String::as_str)
    }

    pub fn set_selection(&mut self, submenu: impl Into<String>, selection: impl Into<String>) {
        let submenu = submenu.into();
        let selection = selection.into();
        if self.selections.get(&submenu) != Some(&selection) {
            self.selections.insert(submenu, selection);
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn save_if_dirty(&mut self, path: &Path) -> Result<(), AppError> {
        if !self.dirty {
            return Ok(());
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_a_missing_file_yields_empty_state() {
        let state = FocusState::load(Path::new("/nonexistent/focus.json")).unwrap();
        assert!(state.selection("MAIN").is_none());
    }

    #[test]
    fn setting_the_same_selection_twice_does_not_redirty() {
        let mut state = FocusState::default();
        state.set_selection("MAIN", "new_game");
        assert!(state.is_dirty());
        state.save_if_dirty(Path::new("/dev/null")).ok();
        state.set_selection("MAIN", "new_game");
        assert!(!state.is_dirty());
    }

    #[test]
    fn save_then_load_round_trips_through_disk() {
        let mut state = FocusState::default();
        state.set_selection("SETTINGS", "controls");
        let path = std::env::temp_dir().join(format!("mlib-focus-{:p}.json", &state));
        state.save_if_dirty(&path).unwrap();
        let reloaded = FocusState::load(&path).unwrap();
        assert_eq!(reloaded.selection("SETTINGS"), Some("controls"));
        std::fs::remove_file(&path).ok();
    }
}
