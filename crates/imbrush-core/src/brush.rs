//! Drag gesture state machine
//!
//! Tracks one in-progress bin drag. A gesture that starts inside the
//! attribute's committed selection translates the whole window (width
//! preserved, clamped to the rendered bins); a gesture that starts outside
//! redraws the window between the start bin and the pointer. A gesture
//! that starts inside and never moves is a click-to-clear.
//!
//! The gesture travels as an explicit value from `on_drag_start` through
//! to `on_drag_end` - there is no shared "currently dragging" state.

use serde::{Deserialize, Serialize};

/// State of one in-progress drag over an attribute's bins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DragGesture {
    attribute: String,
    start_bin: usize,
    num_bins: usize,
    /// Committed window at drag start, if the attribute had one
    committed: Option<(usize, usize)>,
    /// Whether the drag started inside the committed window
    translating: bool,
    moved: bool,
}

impl DragGesture {
    /// Begin a gesture at `start_bin` over `num_bins` rendered bins.
    ///
    /// `committed` is the attribute's existing committed selection, if
    /// any; starting inside it switches the gesture to translate mode.
    pub fn begin(
        attribute: impl Into<String>,
        start_bin: usize,
        num_bins: usize,
        committed: Option<(usize, usize)>,
    ) -> Self {
        let translating = committed
            .map(|(first, last)| first <= start_bin && start_bin <= last)
            .unwrap_or(false);
        Self {
            attribute: attribute.into(),
            start_bin,
            num_bins,
            committed,
            translating,
            moved: false,
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn start_bin(&self) -> usize {
        self.start_bin
    }

    /// Window selected by a pointer move to `current_bin`.
    ///
    /// Translate mode shifts the committed window by the pointer delta,
    /// clamped so the window never exits `[0, num_bins - 1]`; redraw mode
    /// spans from the start bin to the pointer.
    pub fn window_for(&mut self, current_bin: usize) -> (usize, usize) {
        self.moved = true;

        if self.translating {
            let (first, last) = self.committed.unwrap_or((self.start_bin, self.start_bin));
            let mut delta = current_bin as isize - self.start_bin as isize;
            if first as isize + delta < 0 {
                delta = -(first as isize);
            } else if last as isize + delta >= self.num_bins as isize {
                delta = self.num_bins as isize - 1 - last as isize;
            }
            (
                (first as isize + delta) as usize,
                (last as isize + delta) as usize,
            )
        } else {
            (
                self.start_bin.min(current_bin),
                self.start_bin.max(current_bin),
            )
        }
    }

    /// Whether any move event occurred since the gesture began
    pub fn has_moved(&self) -> bool {
        self.moved
    }

    /// A gesture that started inside the committed selection and never
    /// moved clears the selection instead of committing it.
    pub fn ended_as_click(&self) -> bool {
        self.translating && !self.moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redraw_spans_start_to_pointer() {
        let mut gesture = DragGesture::begin("degree", 4, 10, None);
        assert_eq!(gesture.window_for(7), (4, 7));
        assert_eq!(gesture.window_for(1), (1, 4));
        assert!(gesture.has_moved());
    }

    #[test]
    fn test_redraw_outside_existing_selection() {
        let mut gesture = DragGesture::begin("degree", 8, 10, Some((3, 5)));
        assert_eq!(gesture.window_for(6), (6, 8));
    }

    #[test]
    fn test_translate_preserves_width() {
        let mut gesture = DragGesture::begin("degree", 4, 10, Some((3, 5)));
        assert_eq!(gesture.window_for(6), (5, 7));
        assert_eq!(gesture.window_for(2), (1, 3));
    }

    #[test]
    fn test_translate_clamps_at_upper_edge() {
        // Delta 4 would push [3,5] to [7,9]; anything further clamps.
        let mut gesture = DragGesture::begin("degree", 4, 10, Some((3, 5)));
        assert_eq!(gesture.window_for(8), (7, 9));
        assert_eq!(gesture.window_for(9), (7, 9));
    }

    #[test]
    fn test_translate_clamps_at_lower_edge() {
        let mut gesture = DragGesture::begin("degree", 4, 10, Some((3, 5)));
        assert_eq!(gesture.window_for(0), (0, 2));
    }

    #[test]
    fn test_click_inside_selection_clears() {
        let gesture = DragGesture::begin("degree", 4, 10, Some((3, 5)));
        assert!(gesture.ended_as_click());
    }

    #[test]
    fn test_moved_gesture_is_not_a_click() {
        let mut gesture = DragGesture::begin("degree", 4, 10, Some((3, 5)));
        gesture.window_for(6);
        assert!(!gesture.ended_as_click());
    }

    #[test]
    fn test_click_outside_selection_is_not_a_clear() {
        let gesture = DragGesture::begin("degree", 8, 10, Some((3, 5)));
        assert!(!gesture.ended_as_click());
    }
}
