//! Window-backed view host: turns widget invalidation into winit redraw
//! requests.

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use fadein_core::ViewHost;
use log::trace;
use winit::window::Window;

/// Forwards repaint requests to the window and remembers layout requests
/// until the next frame picks them up.
#[derive(Default)]
pub struct WindowHost {
    window: RefCell<Option<Arc<Window>>>,
    redraw_pending: Cell<bool>,
    layout_pending: Cell<bool>,
}

impl WindowHost {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window: RefCell::new(Some(window)),
            ..Default::default()
        }
    }

    /// Stop forwarding to the window (it is about to close).
    pub fn release_window(&self) {
        self.window.borrow_mut().take();
    }

    /// Whether a repaint was requested since the last call; clears the flag.
    pub fn take_redraw(&self) -> bool {
        self.redraw_pending.replace(false)
    }

    /// Whether a re-measure was requested since the last call; clears the flag.
    pub fn take_layout_request(&self) -> bool {
        self.layout_pending.replace(false)
    }
}

impl ViewHost for WindowHost {
    fn invalidate(&self) {
        self.redraw_pending.set(true);
        if let Some(window) = self.window.borrow().as_ref() {
            window.request_redraw();
        }
    }

    fn request_layout(&self) {
        trace!("layout requested");
        self.layout_pending.set(true);
        self.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidate_without_window_sets_flag() {
        let host = WindowHost::default();
        host.invalidate();
        assert!(host.take_redraw());
        assert!(!host.take_redraw());
    }

    #[test]
    fn test_request_layout_also_redraws() {
        let host = WindowHost::default();
        host.request_layout();
        assert!(host.take_layout_request());
        assert!(host.take_redraw());
        assert!(!host.take_layout_request());
    }

    #[test]
    fn test_release_window_is_idempotent() {
        let host = WindowHost::default();
        host.release_window();
        host.release_window();
        host.invalidate();
        assert!(host.take_redraw());
    }
}
