//! Lens settings.

use serde::Deserialize;

use crate::history::DEFAULT_HISTORY_CAPACITY;

/// Settings applied when a lens is created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LensConfig {
    /// Captures retained in history before the oldest is evicted.
    pub history_capacity: usize,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl LensConfig {
    /// Override the history capacity.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacity() {
        assert_eq!(LensConfig::default().history_capacity, 100);
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: LensConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LensConfig::default());

        let config: LensConfig = serde_json::from_str(r#"{"history_capacity": 5}"#).unwrap();
        assert_eq!(config.history_capacity, 5);
    }
}
