//! Pointer events forwarded by the host screen.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
}

impl PointerEvent {
    /// Pointer position carried by the event.
    pub fn position(&self) -> Point {
        match *self {
            Self::Down { position, .. } | Self::Up { position, .. } | Self::Move { position } => {
                position
            }
        }
    }

    /// Button carried by the event, if any.
    pub fn button(&self) -> Option<MouseButton> {
        match *self {
            Self::Down { button, .. } | Self::Up { button, .. } => Some(button),
            Self::Move { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accessors() {
        let down = PointerEvent::Down {
            position: Point::new(1.0, 2.0),
            button: MouseButton::Left,
        };
        assert_eq!(down.position(), Point::new(1.0, 2.0));
        assert_eq!(down.button(), Some(MouseButton::Left));

        let moved = PointerEvent::Move { position: Point::ZERO };
        assert_eq!(moved.button(), None);
    }

    #[test]
    fn test_event_serde() {
        let raw = r#"{"Up":{"position":{"x":3.0,"y":4.0},"button":"Right"}}"#;
        let event: PointerEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(
            event,
            PointerEvent::Up {
                position: Point::new(3.0, 4.0),
                button: MouseButton::Right
            }
        );
    }
}
