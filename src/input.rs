//! Per-tick pointer input and click disambiguation.
//!
//! The Bevy adapter samples the mouse once per frame into an [`InputSample`];
//! [`ClickState::classify`] turns that into a single [`InputAction`] with a
//! fixed precedence:
//!
//! 1. a right-button press always wins and short-circuits every other check;
//! 2. a left press within `window` seconds of the last recorded left press is a
//!    double-click; the click timer is reset to `0.0` and the press is consumed;
//! 3. any other left press records its timestamp and starts a drag;
//! 4. a held (not newly pressed) left button continues an existing drag.
//!
//! Timestamps are `f64` seconds so the window keeps millisecond resolution
//! however long the app has been running.

use bevy::prelude::*;

/// Pointer state for one frame, already converted to world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSample {
    /// Seconds since app start.
    pub time: f64,
    /// Pointer position in world space; `None` when the cursor is off-window.
    pub pointer: Option<Vec2>,
    /// Left button went down this frame.
    pub left_pressed: bool,
    /// Left button is down (including the frame it was pressed).
    pub left_held: bool,
    /// Right button went down this frame.
    pub right_pressed: bool,
}

/// What a single input tick asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    RightClick,
    DoubleLeftClick,
    DragStart,
    DragContinue,
    NoAction,
}

/// Remembers the last left press for double-click detection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClickState {
    /// Timestamp (s) of the last recorded left press; `0.0` after a double-click.
    pub last_click: f64,
}

impl ClickState {
    pub fn classify(&mut self, sample: &InputSample, window: f32, dragging: bool) -> InputAction {
        if sample.right_pressed {
            return InputAction::RightClick;
        }

        if sample.left_pressed {
            if sample.time - self.last_click < f64::from(window) {
                self.last_click = 0.0;
                return InputAction::DoubleLeftClick;
            }
            self.last_click = sample.time;
            return InputAction::DragStart;
        }

        if sample.left_held && dragging {
            InputAction::DragContinue
        } else {
            InputAction::NoAction
        }
    }
}
