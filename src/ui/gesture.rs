//! Pointer drag tracking for the viewer image: panning while zoomed,
//! swipe recognition while not.

/// Distance in logical pixels a swipe must cover along its dominant axis.
pub const SWIPE_THRESHOLD: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A recognized swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// Rightward drag.
    Prev,
    /// Leftward drag.
    Next,
    /// Vertical drag either way.
    Dismiss,
}

/// Tracks one pointer drag. The start point is stored relative to the
/// offset at pointer-down, so `offset_at` yields the new absolute offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragTracker {
    dragging: bool,
    start_x: f64,
    start_y: f64,
}

impl DragTracker {
    pub fn begin(&mut self, x: f64, y: f64, offset_x: f64, offset_y: f64) {
        self.dragging = true;
        self.start_x = x - offset_x;
        self.start_y = y - offset_y;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn end(&mut self) {
        self.dragging = false;
    }

    pub fn offset_at(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.start_x, y - self.start_y)
    }
}

/// Zeroes the minor axis of an unzoomed drag. Ties count as vertical.
pub fn lock_axis(dx: f64, dy: f64) -> (f64, f64, Axis) {
    if dx.abs() > dy.abs() {
        (dx, 0.0, Axis::Horizontal)
    } else {
        (0.0, dy, Axis::Vertical)
    }
}

pub fn classify_swipe(dx: f64, dy: f64) -> Option<Swipe> {
    if dx.abs() > dy.abs() {
        if dx > SWIPE_THRESHOLD {
            Some(Swipe::Prev)
        } else if dx < -SWIPE_THRESHOLD {
            Some(Swipe::Next)
        } else {
            None
        }
    } else if dy.abs() > SWIPE_THRESHOLD {
        Some(Swipe::Dismiss)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_continues_from_previous_pan() {
        let mut drag = DragTracker::default();
        drag.begin(100.0, 100.0, 20.0, -10.0);
        assert!(drag.is_dragging());
        assert_eq!(drag.offset_at(110.0, 95.0), (30.0, -15.0));
        drag.end();
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_dominant_axis_wins() {
        assert_eq!(lock_axis(12.0, 5.0), (12.0, 0.0, Axis::Horizontal));
        assert_eq!(lock_axis(-3.0, 8.0), (0.0, 8.0, Axis::Vertical));
        assert_eq!(lock_axis(4.0, -4.0).2, Axis::Vertical);
    }

    #[test]
    fn test_swipe_threshold() {
        assert_eq!(classify_swipe(30.0, 0.0), None);
        assert_eq!(classify_swipe(31.0, 0.0), Some(Swipe::Prev));
        assert_eq!(classify_swipe(-31.0, 0.0), Some(Swipe::Next));
        assert_eq!(classify_swipe(0.0, -45.0), Some(Swipe::Dismiss));
        assert_eq!(classify_swipe(0.0, 20.0), None);
    }
}
