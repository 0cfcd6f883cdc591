//! Reveal state machine.
//!
//! Geometry and transitions are kept apart: [`RevealState::clip_region`]
//! is a pure query, and [`RevealState::advance`] is the explicit step the
//! widget runs after the draw that consumed the region. Running the step
//! after the draw means the frame that paints a line's last slice is the
//! same frame that moves the sweep to the next line.
//!
//! ```text
//!   Idle ──set_text──► Revealing ──last line done──► Complete
//!                        │  ▲                          │
//!                        └──┘ tick / next line          └─► (set_text)
//! ```

use crate::geometry::{ClipRegion, Rect};

/// Coarse phase of the reveal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No text has been set.
    Idle,
    /// Some line is still being swept.
    Revealing,
    /// Every line is visible.
    Complete,
}

/// Outcome of the post-draw step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The sweep has not reached the right edge.
    None,
    /// A line finished; `next` is the line now being swept.
    NextLine { next: usize },
    /// The last line finished; the reveal is complete.
    Completed,
    /// The sweep reached the edge while already complete.
    Settled,
}

impl Transition {
    /// Whether this transition ends the animation.
    pub fn stops_animation(&self) -> bool {
        matches!(self, Transition::Completed | Transition::Settled)
    }
}

/// Line metrics plus the current sweep position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RevealState {
    line_count: usize,
    line_height: f32,
    current_line: usize,
    clip_x: f32,
}

impl RevealState {
    /// Fresh state for a text of `line_count` lines, `total_height` tall.
    pub fn new(line_count: usize, total_height: f32) -> Self {
        Self {
            line_count,
            line_height: line_height_for(line_count, total_height),
            current_line: 0,
            clip_x: 0.0,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn current_line(&self) -> usize {
        self.current_line
    }

    pub fn clip_x(&self) -> f32 {
        self.clip_x
    }

    pub fn is_complete(&self) -> bool {
        self.current_line == self.line_count
    }

    /// Replace line metrics after a re-layout, keeping progress.
    ///
    /// A complete reveal stays complete even when the text now wraps onto
    /// more lines.
    pub fn relayout(&mut self, line_count: usize, total_height: f32) {
        let was_complete = self.line_count > 0 && self.is_complete();
        self.line_count = line_count;
        self.line_height = line_height_for(line_count, total_height);
        self.current_line = if was_complete {
            line_count
        } else {
            self.current_line.min(line_count)
        };
    }

    /// Move the sweep edge right by `distance` pixels.
    pub fn sweep(&mut self, distance: f32) {
        self.clip_x = (self.clip_x + distance).max(0.0);
    }

    /// Clamp the sweep edge to the widget width.
    pub fn clamp_sweep(&mut self, width: f32) {
        if self.clip_x >= width {
            self.clip_x = width.max(0.0);
        }
    }

    /// Visible region for the current frame.
    ///
    /// When complete, the whole of `bounds`. Otherwise the rows above the
    /// current line at full width, plus the current line up to the sweep
    /// edge.
    pub fn clip_region(&self, bounds: Rect) -> ClipRegion {
        if self.is_complete() {
            return ClipRegion::full(bounds);
        }

        let line_top = bounds.y + self.current_line as f32 * self.line_height;
        let sweep_right = bounds.x + self.clip_x.min(bounds.width);

        let mut region = ClipRegion::empty();
        region.push(Rect::from_ltrb(bounds.x, bounds.y, bounds.right(), line_top));
        region.push(Rect::from_ltrb(
            bounds.x,
            line_top,
            sweep_right,
            line_top + self.line_height,
        ));
        region
    }

    /// Post-draw step: finish the current line once the sweep edge has
    /// reached `width`.
    pub fn advance(&mut self, width: f32) -> Transition {
        if self.clip_x < width {
            return Transition::None;
        }
        if self.is_complete() {
            return Transition::Settled;
        }

        self.current_line += 1;
        self.clip_x = 0.0;
        if self.is_complete() {
            Transition::Completed
        } else {
            Transition::NextLine {
                next: self.current_line,
            }
        }
    }
}

fn line_height_for(line_count: usize, total_height: f32) -> f32 {
    if line_count == 0 {
        0.0
    } else {
        total_height / line_count as f32
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 360.0,
        height: 60.0,
    };

    #[test]
    fn test_new_state_starts_at_origin() {
        let state = RevealState::new(3, 60.0);
        assert_eq!(state.current_line(), 0);
        assert_eq!(state.clip_x(), 0.0);
        assert_eq!(state.line_height(), 20.0);
        assert!(!state.is_complete());
    }

    #[test]
    fn test_zero_lines_is_complete() {
        let state = RevealState::new(0, 0.0);
        assert_eq!(state.line_height(), 0.0);
        assert!(state.is_complete());
    }

    #[test]
    fn test_first_line_region_is_partial_row() {
        let mut state = RevealState::new(3, 60.0);
        state.sweep(72.0);
        let region = state.clip_region(BOUNDS);
        // Nothing above line 0, so only the partial row remains.
        assert_eq!(region.rects(), &[Rect::new(0.0, 0.0, 72.0, 20.0)]);
    }

    #[test]
    fn test_region_includes_completed_rows() {
        let mut state = RevealState::new(3, 60.0);
        state.sweep(360.0);
        state.advance(360.0);
        state.sweep(36.0);

        let region = state.clip_region(BOUNDS);
        assert_eq!(
            region.rects(),
            &[
                Rect::new(0.0, 0.0, 360.0, 20.0),
                Rect::new(0.0, 20.0, 36.0, 20.0),
            ]
        );
    }

    #[test]
    fn test_region_is_pure() {
        let mut state = RevealState::new(2, 40.0);
        state.sweep(360.0);
        let before = state.clone();
        let _ = state.clip_region(BOUNDS);
        let _ = state.clip_region(BOUNDS);
        assert_eq!(state, before);
    }

    #[test]
    fn test_complete_region_is_full_bounds() {
        let mut state = RevealState::new(1, 20.0);
        state.sweep(400.0);
        state.clamp_sweep(360.0);
        assert_eq!(state.advance(360.0), Transition::Completed);
        assert_eq!(state.clip_region(BOUNDS), ClipRegion::full(BOUNDS));
    }

    #[test]
    fn test_advance_below_width_is_noop() {
        let mut state = RevealState::new(2, 40.0);
        state.sweep(359.0);
        assert_eq!(state.advance(360.0), Transition::None);
        assert_eq!(state.current_line(), 0);
        assert_eq!(state.clip_x(), 359.0);
    }

    #[test]
    fn test_advance_moves_to_next_line() {
        let mut state = RevealState::new(2, 40.0);
        state.sweep(360.0);
        assert_eq!(state.advance(360.0), Transition::NextLine { next: 1 });
        assert_eq!(state.clip_x(), 0.0);
        assert_eq!(state.current_line(), 1);
    }

    #[test]
    fn test_advance_when_already_complete_settles() {
        let mut state = RevealState::new(1, 20.0);
        state.sweep(360.0);
        assert_eq!(state.advance(360.0), Transition::Completed);
        state.sweep(360.0);
        let transition = state.advance(360.0);
        assert_eq!(transition, Transition::Settled);
        assert!(transition.stops_animation());
        assert_eq!(state.current_line(), 1);
    }

    #[test]
    fn test_clamp_sweep() {
        let mut state = RevealState::new(1, 20.0);
        state.sweep(400.0);
        state.clamp_sweep(360.0);
        assert_eq!(state.clip_x(), 360.0);
        state.clamp_sweep(500.0);
        assert_eq!(state.clip_x(), 360.0);
    }

    #[test]
    fn test_relayout_clamps_current_line() {
        let mut state = RevealState::new(4, 80.0);
        for _ in 0..3 {
            state.sweep(360.0);
            state.advance(360.0);
        }
        assert_eq!(state.current_line(), 3);

        state.relayout(2, 50.0);
        assert_eq!(state.current_line(), 2);
        assert_eq!(state.line_height(), 25.0);
        assert!(state.is_complete());
    }

    #[test]
    fn test_relayout_keeps_complete_when_lines_grow() {
        let mut state = RevealState::new(2, 40.0);
        for _ in 0..2 {
            state.sweep(360.0);
            state.advance(360.0);
        }
        assert!(state.is_complete());

        state.relayout(4, 80.0);
        assert_eq!(state.current_line(), 4);
        assert!(state.is_complete());
        assert_eq!(
            state.clip_region(Rect::new(0.0, 0.0, 180.0, 80.0)),
            ClipRegion::full(Rect::new(0.0, 0.0, 180.0, 80.0))
        );
    }

    #[test]
    fn test_relayout_mid_reveal_keeps_line() {
        let mut state = RevealState::new(2, 40.0);
        state.sweep(360.0);
        state.advance(360.0);
        state.relayout(4, 80.0);
        assert_eq!(state.current_line(), 1);
        assert!(!state.is_complete());
    }

    #[test]
    fn test_bounds_offset_respected() {
        let mut state = RevealState::new(2, 40.0);
        state.sweep(10.0);
        let bounds = Rect::new(5.0, 7.0, 100.0, 40.0);
        let region = state.clip_region(bounds);
        assert_eq!(region.rects(), &[Rect::new(5.0, 7.0, 10.0, 20.0)]);
    }
}
