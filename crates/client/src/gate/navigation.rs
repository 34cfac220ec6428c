//! The seam between the core and whatever renders routes.

/// Performs client-side navigation.
///
/// The interceptor and [`crate::Store::navigate`] call this; the view layer
/// decides what a navigation means.
pub trait Navigator: Send + Sync {
    /// Move to `path`.
    fn navigate(&self, path: &str);
}

/// A navigator for headless use: it only records the redirect in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(to = path, "Navigate");
    }
}
