//! Konfigurasi subsystem marshaling
//!
//! Dibaca sekali saat startup, immutable setelahnya.

/// Batas default kedalaman nesting argument
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Nama app default untuk global id
pub const DEFAULT_APP: &str = "hermes";

/// Konfigurasi `Arguments`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentsConfig {
    /// Kedalaman nesting maksimum (sequence/mapping/custom payload)
    pub max_depth: usize,
    /// Nama app untuk locator default
    pub app: String,
}

impl Default for ArgumentsConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            app: DEFAULT_APP.to_string(),
        }
    }
}

impl ArgumentsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_app(mut self, app: impl Into<String>) -> Self {
        self.app = app.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ArgumentsConfig::default();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.app, DEFAULT_APP);
    }

    #[test]
    fn test_builder() {
        let config = ArgumentsConfig::new().with_max_depth(8).with_app("billing");
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.app, "billing");
    }
}
