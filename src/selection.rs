//! Rubber-band selection of the next viewport.
//!
//! A viewer drags a rectangle across the current image; only when the
//! drag is released does a new viewport exist.  The renderer never
//! sees anything but that committed viewport.
//!
//! ```text
//! Idle --press--> Dragging --release--> Committed
//!   ^                |                      |
//!   +-----cancel-----+                    press
//!                                            v
//!                                         Dragging
//! ```

use crate::planes::Viewport;
use num::Complex;

/// Where a selection stands.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Selection {
    /// Nothing in progress.
    Idle,
    /// A rectangle is being dragged out from `anchor` to `cursor`.
    Dragging {
        /// Where the drag started
        anchor: Complex<f64>,
        /// Where the pointer is now
        cursor: Complex<f64>,
    },
    /// The last drag produced this viewport.
    Committed(Viewport),
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Idle
    }
}

impl Selection {
    /// Start a new rectangle.  Any earlier commit is superseded.
    pub fn press(&mut self, point: Complex<f64>) {
        *self = Selection::Dragging {
            anchor: point,
            cursor: point,
        };
    }

    /// Move the free corner.  Ignored unless a drag is in progress.
    pub fn drag(&mut self, point: Complex<f64>) {
        if let Selection::Dragging { ref mut cursor, .. } = *self {
            *cursor = point;
        }
    }

    /// Finish the drag.  The two corners are sorted into a viewport
    /// and committed.  A rectangle with no area commits nothing and
    /// leaves the selection idle.  Returns the new viewport, if any.
    pub fn release(&mut self, point: Complex<f64>) -> Option<Viewport> {
        let anchor = match *self {
            Selection::Dragging { anchor, .. } => anchor,
            _ => return None,
        };
        let (xmin, xmax) = ordered(anchor.re, point.re);
        let (ymin, ymax) = ordered(anchor.im, point.im);
        match Viewport::new(xmin, xmax, ymin, ymax) {
            Ok(viewport) => {
                *self = Selection::Committed(viewport);
                Some(viewport)
            }
            Err(_) => {
                *self = Selection::Idle;
                None
            }
        }
    }

    /// Abandon the drag.
    pub fn cancel(&mut self) {
        *self = Selection::Idle;
    }

    /// The rectangle currently being dragged, corners unsorted, for
    /// drawing an overlay.
    pub fn outline(&self) -> Option<(Complex<f64>, Complex<f64>)> {
        match *self {
            Selection::Dragging { anchor, cursor } => Some((anchor, cursor)),
            _ => None,
        }
    }

    /// The committed viewport, if the last drag produced one.
    pub fn committed(&self) -> Option<Viewport> {
        match *self {
            Selection::Committed(viewport) => Some(viewport),
            _ => None,
        }
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_commits_a_sorted_viewport() {
        let mut selection = Selection::default();
        selection.press(Complex::new(0.5, 1.0));
        selection.drag(Complex::new(0.0, 0.0));
        assert_eq!(
            selection.outline(),
            Some((Complex::new(0.5, 1.0), Complex::new(0.0, 0.0)))
        );
        let committed = selection.release(Complex::new(-1.0, -0.5));
        let expected = Viewport::new(-1.0, 0.5, -0.5, 1.0).unwrap();
        assert_eq!(committed, Some(expected));
        assert_eq!(selection, Selection::Committed(expected));
        assert_eq!(selection.committed(), Some(expected));
    }

    #[test]
    fn nothing_commits_mid_drag() {
        let mut selection = Selection::Idle;
        selection.press(Complex::new(0.0, 0.0));
        selection.drag(Complex::new(1.0, 1.0));
        assert_eq!(selection.committed(), None);
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut selection = Selection::Idle;
        assert_eq!(selection.release(Complex::new(1.0, 1.0)), None);
        assert_eq!(selection, Selection::Idle);
        selection.drag(Complex::new(1.0, 1.0));
        assert_eq!(selection, Selection::Idle);
    }

    #[test]
    fn degenerate_rectangles_go_back_to_idle() {
        let mut selection = Selection::Idle;
        selection.press(Complex::new(0.3, 0.3));
        assert_eq!(selection.release(Complex::new(0.3, 0.9)), None);
        assert_eq!(selection, Selection::Idle);
    }

    #[test]
    fn press_supersedes_a_commit_and_cancel_abandons() {
        let mut selection = Selection::Idle;
        selection.press(Complex::new(0.0, 0.0));
        selection.release(Complex::new(1.0, 1.0));
        selection.press(Complex::new(2.0, 2.0));
        assert_eq!(selection.committed(), None);
        selection.cancel();
        assert_eq!(selection, Selection::Idle);
    }
}
