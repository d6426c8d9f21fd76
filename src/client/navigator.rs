//! Full-page navigation.

use tracing;

/// Performs a full-page navigation that replaces the current history entry.
pub trait Navigator {
    fn replace(&self, path: &str);
}

/// Navigates through `window.location`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserNavigator;

#[cfg(target_arch = "wasm32")]
impl Navigator for BrowserNavigator {
    fn replace(&self, path: &str) {
        let Some(window) = web_sys::window() else {
            tracing::error!("No window available to redirect to {}", path);
            return;
        };
        if let Err(e) = window.location().replace(path) {
            tracing::error!("Failed to redirect to {}: {:?}", path, e);
        }
    }
}

/// Non-WASM stub: there is no page to navigate.
#[cfg(not(target_arch = "wasm32"))]
impl Navigator for BrowserNavigator {
    fn replace(&self, path: &str) {
        tracing::warn!("Redirect to {} not supported in non-WASM builds", path);
    }
}
