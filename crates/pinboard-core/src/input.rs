//! Device-agnostic pointer and keyboard events.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Pointer identifier used for capture; mice report a single constant id.
pub type PointerId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
        meta: false,
    };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// A pointer press, move or release in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub pointer_id: PointerId,
    pub position: Point,
    pub button: PointerButton,
    pub modifiers: Modifiers,
    /// Host timestamp in milliseconds, used for double-click detection.
    pub time_ms: u64,
}

impl PointerEvent {
    pub fn new(position: Point) -> Self {
        Self {
            pointer_id: 0,
            position,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
            time_ms: 0,
        }
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_pointer(mut self, pointer_id: PointerId) -> Self {
        self.pointer_id = pointer_id;
        self
    }

    pub fn at_time(mut self, time_ms: u64) -> Self {
        self.time_ms = time_ms;
        self
    }
}

/// Wheel or trackpad scroll in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    pub position: Point,
    pub delta: Vec2,
    pub modifiers: Modifiers,
}

/// Keys the engine reacts to directly; everything else belongs to the host's shortcut layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Space,
    Escape,
    Delete,
    Backspace,
    Enter,
    Other(String),
}

/// Detects double-clicks from successive primary presses.
#[derive(Debug, Clone, Default)]
pub struct ClickTracker {
    last: Option<(u64, Point)>,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a press and report whether it completes a double-click.
    ///
    /// A detected double-click resets the tracker so a third press starts over.
    pub fn register(&mut self, time_ms: u64, position: Point, max_ms: u64, max_distance: f64) -> bool {
        if let Some((last_time, last_pos)) = self.last {
            let elapsed = time_ms.saturating_sub(last_time);
            if elapsed <= max_ms && position.distance(last_pos) <= max_distance {
                self.last = None;
                return true;
            }
        }
        self.last = Some((time_ms, position));
        false
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
