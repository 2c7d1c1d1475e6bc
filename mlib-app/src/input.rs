//! Input sampling and focus arbitration (spec 4.I): `ButtonStates` samples
//! keyboard/gamepad/tap state each frame, `ButtonPress` turns that into
//! edge-triggered combinations, and `Focuses` is the LIFO stack of UI
//! layers that decides who consumes input and whether physics is paused.

use crate::error::AppError;
use fxhash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Key(u32),
    GamepadButton(u32),
    TapButton(u32),
    /// An analog axis crossing `threshold` (in milli-units, so the source
    /// itself is hashable); positive thresholds trigger on `>=`, negative
    /// on `<=`.
    AnalogAxis { axis: u32, threshold_milli: i32 },
}

/// Per-frame sampled state for every input device this engine reads.
#[derive(Default)]
pub struct ButtonStates {
    keys: FxHashSet<u32>,
    gamepad_buttons: FxHashSet<u32>,
    tap_buttons: FxHashSet<u32>,
    analog_axes: FxHashMap<u32, f32>,
}

impl ButtonStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key(&mut self, key: u32, down: bool) {
        set_membership(&mut self.keys, key, down);
    }

    pub fn set_gamepad_button(&mut self, button: u32, down: bool) {
        set_membership(&mut self.gamepad_buttons, button, down);
    }

    pub fn set_tap_button(&mut self, button: u32, down: bool) {
        set_membership(&mut self.tap_buttons, button, down);
    }

    pub fn set_axis(&mut self, axis: u32, value: f32) {
        self.analog_axes.insert(axis, value);
    }

    pub fn is_down(&self, source: InputSource) -> bool {
        match source {
            InputSource::Key(k) => self.keys.contains(&k),
            InputSource::GamepadButton(b) => self.gamepad_buttons.contains(&b),
            InputSource::TapButton(b) => self.tap_buttons.contains(&b),
            InputSource::AnalogAxis { axis, threshold_milli } => {
                let value = self.analog_axes.get(&axis).copied().unwrap_or(0.0);
                let threshold = threshold_milli as f32 / 1000.0;
                if threshold >= 0.0 {
                    value >= threshold
                } else {
                    value <= threshold
                }
            }
        }
    }
}

fn set_membership(set: &mut FxHashSet<u32>, value: u32, present: bool) {
    if present {
        set.insert(value);
    } else {
        set.remove(&value);
    }
}

/// A combination unions several input sources: any one of them being down
/// counts as the combination being down (spec 4.I).
#[derive(Debug, Clone)]
pub struct Combination(pub Vec<InputSource>);

impl Combination {
    pub fn of(sources: impl IntoIterator<Item = InputSource>) -> Self {
        Self(sources.into_iter().collect())
    }

    fn is_down(&self, states: &ButtonStates) -> bool {
        self.0.iter().any(|s| states.is_down(*s))
    }
}

/// Turns level-triggered [`ButtonStates`] samples into edge-triggered
/// "just pressed" queries by remembering which sources were down on the
/// previous call.
#[derive(Default)]
pub struct ButtonPress {
    previously_down: FxHashSet<InputSource>,
}

impl ButtonPress {
    pub fn new() -> Self {
        Self::default()
    }

    /// True exactly on the frame `combination`'s union transitions from
    /// not-down to down.
    pub fn keys_pressed(&mut self, states: &ButtonStates, combination: &Combination) -> bool {
        let was_down = combination.0.iter().any(|s| self.previously_down.contains(s));
        for source in &combination.0 {
            set_membership_generic(&mut self.previously_down, *source, states.is_down(*source));
        }
        combination.is_down(states) && !was_down
    }
}

fn set_membership_generic(set: &mut FxHashSet<InputSource>, value: InputSource, present: bool) {
    if present {
        set.insert(value);
    } else {
        set.remove(&value);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuPage {
    Main,
    NewGame,
    Settings,
    Controls,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Base,
    Scene,
    Menu(MenuPage),
    CountdownPending,
    CountdownCounting,
    GameOverWin,
    GameOverLose,
}

/// LIFO stack of UI layers (spec 4.I): `BASE -> SCENE -> MENU(...) ->
/// COUNTDOWN_{PENDING,COUNTING} -> GAME_OVER_*`. `BASE` is never popped.
pub struct Focuses {
    stack: Vec<Focus>,
}

impl Focuses {
    pub fn new() -> Self {
        Self {
            stack: vec![Focus::Base],
        }
    }

    pub fn current(&self) -> Focus {
        *self.stack.last().expect("BASE is never popped")
    }

    pub fn push(&mut self, focus: Focus) {
        self.stack.push(focus);
    }

    pub fn pop(&mut self) -> Result<Focus, AppError> {
        if self.stack.len() <= 1 {
            return Err(AppError::Config {
                message: "cannot pop the BASE focus".to_string(),
            });
        }
        Ok(self.stack.pop().expect("checked len above"))
    }

    /// A `MENU` focus on top of the stack freezes physics (spec 4.I
    /// "Pushing MENU over SCENE freezes physics via pause-resume").
    pub fn is_physics_paused(&self) -> bool {
        matches!(self.current(), Focus::Menu(_))
    }

    /// Escape/Start handling: opens `MENU` from `SCENE`/countdown focuses,
    /// or pops one `MENU` level.
    pub fn toggle_menu(&mut self) -> Result<(), AppError> {
        match self.current() {
            Focus::Menu(_) => {
                self.pop()?;
                Ok(())
            }
            Focus::Scene | Focus::CountdownPending | Focus::CountdownCounting => {
                self.push(Focus::Menu(MenuPage::Main));
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl Default for Focuses {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_press_is_edge_triggered() {
        let mut states = ButtonStates::new();
        let mut press = ButtonPress::new();
        let combo = Combination::of([InputSource::Key(32)]);
        assert!(!press.keys_pressed(&states, &combo));
        states.set_key(32, true);
        assert!(press.keys_pressed(&states, &combo));
        assert!(!press.keys_pressed(&states, &combo));
    }

    #[test]
    fn combination_unions_distinct_sources() {
        let mut states = ButtonStates::new();
        states.set_gamepad_button(0, true);
        let combo = Combination::of([InputSource::Key(32), InputSource::GamepadButton(0)]);
        assert!(combo.is_down(&states));
    }

    #[test]
    fn analog_axis_threshold_direction_is_respected() {
        let mut states = ButtonStates::new();
        states.set_axis(1, -0.9);
        assert!(states.is_down(InputSource::AnalogAxis {
            axis: 1,
            threshold_milli: -500
        }));
        assert!(!states.is_down(InputSource::AnalogAxis {
            axis: 1,
            threshold_milli: 500
        }));
    }

    #[test]
    fn menu_over_scene_pauses_physics_until_popped() {
        let mut focuses = Focuses::new();
        focuses.push(Focus::Scene);
        assert!(!focuses.is_physics_paused());
        focuses.toggle_menu().unwrap();
        assert!(focuses.is_physics_paused());
        focuses.toggle_menu().unwrap();
        assert!(!focuses.is_physics_paused());
    }

    #[test]
    fn popping_base_is_forbidden() {
        let mut focuses = Focuses::new();
        assert!(focuses.pop().is_err());
    }
}
