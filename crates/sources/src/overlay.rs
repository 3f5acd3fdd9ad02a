//! The draggable camera preview overlay.
//!
//! A small screen-space rectangle showing the camera feed while recording.
//! Purely presentational: it carries no recording semantics, and position
//! math is kept in pure functions so any rendering layer can drive it from
//! pointer events.
//!
//! All coordinates are viewport pixels with `(0, 0)` at the top-left.

use crate::source::TrackInfo;

/// Viewport dimensions the overlay is confined to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

/// Widget dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// A point in viewport space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Default widget size, matching the camera request aspect.
pub const DEFAULT_SIZE: Size = Size {
    width: 180.0,
    height: 120.0,
};

/// Default margin from the viewport edges for the initial placement.
pub const DEFAULT_MARGIN: f64 = 20.0;

/// Clamp a desired widget position so the widget stays fully inside the
/// viewport. A widget larger than the viewport pins to the top-left.
pub fn clamp_position(position: Position, size: Size, bounds: Bounds) -> Position {
    let max_x = (bounds.width - size.width).max(0.0);
    let max_y = (bounds.height - size.height).max(0.0);
    Position {
        x: position.x.clamp(0.0, max_x),
        y: position.y.clamp(0.0, max_y),
    }
}

/// Offset of the pointer from the widget origin while a drag is active.
#[derive(Debug, Clone, Copy)]
struct DragGrab {
    dx: f64,
    dy: f64,
}

/// The on-screen draggable camera preview.
///
/// Created by the source acquirer when a camera source exists; destroyed
/// with the session regardless of how the session ends.
#[derive(Debug)]
pub struct OverlayWidget {
    camera_track: TrackInfo,
    position: Position,
    size: Size,
    bounds: Bounds,
    grab: Option<DragGrab>,
}

impl OverlayWidget {
    /// Create the overlay anchored at the bottom-left of the viewport with
    /// the default margin.
    pub fn new(camera_track: TrackInfo, bounds: Bounds) -> Self {
        let initial = Position {
            x: DEFAULT_MARGIN,
            y: bounds.height - DEFAULT_SIZE.height - DEFAULT_MARGIN,
        };
        Self {
            camera_track,
            position: clamp_position(initial, DEFAULT_SIZE, bounds),
            size: DEFAULT_SIZE,
            bounds,
            grab: None,
        }
    }

    /// The camera track rendered inside the widget.
    pub fn camera_track(&self) -> &TrackInfo {
        &self.camera_track
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    /// Whether a viewport point falls inside the widget rectangle.
    pub fn contains(&self, at: Position) -> bool {
        at.x >= self.position.x
            && at.x <= self.position.x + self.size.width
            && at.y >= self.position.y
            && at.y <= self.position.y + self.size.height
    }

    /// Pointer pressed. Begins a drag when the point is on the widget;
    /// returns whether a drag started.
    pub fn pointer_down(&mut self, at: Position) -> bool {
        if !self.contains(at) {
            return false;
        }
        self.grab = Some(DragGrab {
            dx: at.x - self.position.x,
            dy: at.y - self.position.y,
        });
        true
    }

    /// Pointer moved. While dragging, the widget follows the pointer with
    /// the original grab offset, clamped to the viewport.
    pub fn pointer_move(&mut self, at: Position) {
        let Some(grab) = self.grab else {
            return;
        };
        let desired = Position {
            x: at.x - grab.dx,
            y: at.y - grab.dy,
        };
        self.position = clamp_position(desired, self.size, self.bounds);
    }

    /// Pointer released. Ends the drag.
    pub fn pointer_up(&mut self) {
        self.grab = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SourceRole, TrackKind};
    use proptest::prelude::*;

    fn camera_track() -> TrackInfo {
        TrackInfo {
            id: "camera:video".to_string(),
            kind: TrackKind::Video,
            role: SourceRole::Camera,
        }
    }

    fn bounds() -> Bounds {
        Bounds {
            width: 1280.0,
            height: 720.0,
        }
    }

    #[test]
    fn initial_placement_is_bottom_left() {
        let widget = OverlayWidget::new(camera_track(), bounds());
        let pos = widget.position();
        assert_eq!(pos.x, DEFAULT_MARGIN);
        assert_eq!(pos.y, 720.0 - DEFAULT_SIZE.height - DEFAULT_MARGIN);
    }

    #[test]
    fn drag_preserves_grab_offset() {
        let mut widget = OverlayWidget::new(camera_track(), bounds());
        let origin = widget.position();

        // Grab 10px into the widget and move the pointer by (100, -50).
        let grab_at = Position {
            x: origin.x + 10.0,
            y: origin.y + 10.0,
        };
        assert!(widget.pointer_down(grab_at));
        widget.pointer_move(Position {
            x: grab_at.x + 100.0,
            y: grab_at.y - 50.0,
        });
        widget.pointer_up();

        let moved = widget.position();
        assert_eq!(moved.x, origin.x + 100.0);
        assert_eq!(moved.y, origin.y - 50.0);
        assert!(!widget.is_dragging());
    }

    #[test]
    fn drag_cannot_leave_viewport() {
        let mut widget = OverlayWidget::new(camera_track(), bounds());
        let origin = widget.position();

        assert!(widget.pointer_down(origin));
        widget.pointer_move(Position {
            x: 100_000.0,
            y: 100_000.0,
        });

        let pos = widget.position();
        assert_eq!(pos.x, 1280.0 - DEFAULT_SIZE.width);
        assert_eq!(pos.y, 720.0 - DEFAULT_SIZE.height);
    }

    #[test]
    fn pointer_down_outside_widget_does_not_drag() {
        let mut widget = OverlayWidget::new(camera_track(), bounds());
        let before = widget.position();

        assert!(!widget.pointer_down(Position { x: 900.0, y: 10.0 }));
        widget.pointer_move(Position { x: 950.0, y: 60.0 });

        assert_eq!(widget.position(), before);
    }

    #[test]
    fn moves_without_active_drag_are_ignored() {
        let mut widget = OverlayWidget::new(camera_track(), bounds());
        let before = widget.position();
        widget.pointer_move(Position { x: 600.0, y: 300.0 });
        assert_eq!(widget.position(), before);
    }

    proptest! {
        #[test]
        fn clamped_position_stays_in_bounds(
            px in -5000.0f64..5000.0,
            py in -5000.0f64..5000.0,
            bw in 200.0f64..4000.0,
            bh in 200.0f64..4000.0,
        ) {
            let clamped = clamp_position(
                Position { x: px, y: py },
                DEFAULT_SIZE,
                Bounds { width: bw, height: bh },
            );
            prop_assert!(clamped.x >= 0.0);
            prop_assert!(clamped.y >= 0.0);
            prop_assert!(clamped.x + DEFAULT_SIZE.width <= bw);
            prop_assert!(clamped.y + DEFAULT_SIZE.height <= bh);
        }

        #[test]
        fn clamping_is_idempotent(
            px in -5000.0f64..5000.0,
            py in -5000.0f64..5000.0,
        ) {
            let b = Bounds { width: 1920.0, height: 1080.0 };
            let once = clamp_position(Position { x: px, y: py }, DEFAULT_SIZE, b);
            let twice = clamp_position(once, DEFAULT_SIZE, b);
            prop_assert_eq!(once, twice);
        }
    }
}
