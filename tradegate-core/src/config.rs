//! Engine configuration: the defaults stamped onto outbound requests.

use serde::{Deserialize, Serialize};

/// Defaults applied to Deal and Pending requests when the caller does not
/// override them per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum slippage in points.
    pub deviation: i64,
    /// Expert/robot tag attached to every request.
    pub magic: i64,
    /// Order comment.
    pub comment: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deviation: 20,
            magic: 0,
            comment: "via tradegate".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML; missing keys take their defaults.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn with_deviation(mut self, deviation: i64) -> Self {
        self.deviation = deviation;
        self
    }

    pub fn with_magic(mut self, magic: i64) -> Self {
        self.magic = magic;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}
