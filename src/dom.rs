//! DOM Helpers
//!
//! Small wrappers around the browser globals shared across components.

pub fn window() -> web_sys::Window {
    web_sys::window().expect("window should exist in the browser")
}

pub fn document() -> web_sys::Document {
    window().document().expect("document should exist in the browser")
}

/// Blocking alert used for backend and auth errors.
pub fn alert(message: &str) {
    let _ = window().alert_with_message(message);
}
