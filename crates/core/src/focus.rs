//! Focus tracking and keyboard routing.

use serde::{Deserialize, Serialize};

use crate::Direction;

/// Keys the carousel reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Enter,
    Escape,
    ArrowLeft,
    ArrowRight,
    Other,
}

/// Where keyboard focus currently is, as far as the carousel is concerned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FocusState {
    #[default]
    Unfocused,
    /// The wrapper itself has focus; arrow keys navigate.
    WrapperFocused,
    /// A control inside the item at `index` has focus.
    ItemFocused { index: usize },
}

/// What a key press asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    /// Move focus to the first text input inside the carousel.
    FocusFirstControl,
    /// Return focus to the wrapper.
    FocusWrapper,
    Jump(Direction),
}

impl FocusState {
    /// Route a key press according to the current focus.
    ///
    /// Arrow keys only navigate while the wrapper itself is focused; once focus
    /// is on an inner control they belong to that control.
    pub fn on_key(&self, key: Key) -> KeyAction {
        match (self, key) {
            (FocusState::WrapperFocused, Key::Enter) => KeyAction::FocusFirstControl,
            (FocusState::WrapperFocused, Key::ArrowLeft) => KeyAction::Jump(Direction::Left),
            (FocusState::WrapperFocused, Key::ArrowRight) => KeyAction::Jump(Direction::Right),
            (FocusState::WrapperFocused | FocusState::ItemFocused { .. }, Key::Escape) => {
                KeyAction::FocusWrapper
            }
            _ => KeyAction::None,
        }
    }

    pub fn wrapper_focused(&mut self) {
        *self = FocusState::WrapperFocused;
    }

    pub fn wrapper_blurred(&mut self) {
        if *self == FocusState::WrapperFocused {
            *self = FocusState::Unfocused;
        }
    }

    pub fn item_focused(&mut self, index: usize) {
        *self = FocusState::ItemFocused { index };
    }

    pub fn item_blurred(&mut self, index: usize) {
        if *self == (FocusState::ItemFocused { index }) {
            *self = FocusState::Unfocused;
        }
    }

    pub fn focused_item(&self) -> Option<usize> {
        match self {
            FocusState::ItemFocused { index } => Some(*index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unfocused_ignores_keys() {
        let state = FocusState::Unfocused;
        for key in [Key::Enter, Key::Escape, Key::ArrowLeft, Key::ArrowRight, Key::Other] {
            assert_eq!(state.on_key(key), KeyAction::None);
        }
    }

    #[test]
    fn test_wrapper_focused_routes_keys() {
        let state = FocusState::WrapperFocused;
        assert_eq!(state.on_key(Key::Enter), KeyAction::FocusFirstControl);
        assert_eq!(state.on_key(Key::Escape), KeyAction::FocusWrapper);
        assert_eq!(state.on_key(Key::ArrowLeft), KeyAction::Jump(Direction::Left));
        assert_eq!(state.on_key(Key::ArrowRight), KeyAction::Jump(Direction::Right));
        assert_eq!(state.on_key(Key::Other), KeyAction::None);
    }

    #[test]
    fn test_item_focused_only_escapes() {
        let state = FocusState::ItemFocused { index: 2 };
        assert_eq!(state.on_key(Key::Escape), KeyAction::FocusWrapper);
        assert_eq!(state.on_key(Key::Enter), KeyAction::None);
        assert_eq!(state.on_key(Key::ArrowLeft), KeyAction::None);
        assert_eq!(state.on_key(Key::ArrowRight), KeyAction::None);
    }

    #[test]
    fn test_transitions() {
        let mut state = FocusState::default();
        assert_eq!(state, FocusState::Unfocused);

        state.wrapper_focused();
        assert_eq!(state, FocusState::WrapperFocused);

        state.item_focused(3);
        assert_eq!(state.focused_item(), Some(3));

        // A late wrapper blur must not clobber item focus
        state.wrapper_blurred();
        assert_eq!(state, FocusState::ItemFocused { index: 3 });

        // Blur of a different item is stale
        state.item_blurred(1);
        assert_eq!(state, FocusState::ItemFocused { index: 3 });

        state.item_blurred(3);
        assert_eq!(state, FocusState::Unfocused);

        state.wrapper_focused();
        state.wrapper_blurred();
        assert_eq!(state, FocusState::Unfocused);
    }

    #[test]
    fn test_focus_state_serialization() {
        let json = serde_json::to_string(&FocusState::ItemFocused { index: 5 }).unwrap();
        assert_eq!(json, r#"{"state":"item_focused","index":5}"#);
        let parsed: FocusState = serde_json::from_str(r#"{"state":"wrapper_focused"}"#).unwrap();
        assert_eq!(parsed, FocusState::WrapperFocused);
    }
}
