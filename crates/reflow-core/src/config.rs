//! Engine configuration.
//!
//! Everything layout would otherwise read from global preferences is
//! carried in a [`LayoutConfig`] handed to the engine. Hosts can load it
//! from JSON; missing keys take their defaults.

use serde::Deserialize;

use crate::geom::LayoutCoord;

/// Layout preferences and compatibility switches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Quirks mode. Default (UA stylesheet) margins at the top of table
    /// cells are ignored.
    pub quirks_mode: bool,
    /// Maximum width of start-aligned lines. Centered and end-aligned
    /// lines are limited to the same width and shifted accordingly.
    pub paragraph_width_limit: Option<LayoutCoord>,
    /// When paragraph width limiting is active, a line beside a float
    /// that would be narrower than this is moved below the float instead.
    pub min_limited_line_width: LayoutCoord,
    /// Hard cap on passes per reflow. The first pass, one shrink-to-fit
    /// correction pass and one spare.
    pub max_passes: usize,
    /// Width of a preserved tab, in spaces.
    pub tab_size: u8,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            quirks_mode: false,
            paragraph_width_limit: None,
            min_limited_line_width: 80,
            max_passes: 3,
            tab_size: 8,
        }
    }
}

impl LayoutConfig {
    /// Parse a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or names an unknown key.
    pub fn from_json(json: &str) -> Result<Self, crate::LayoutError> {
        serde_json::from_str(json).map_err(|e| crate::LayoutError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_take_defaults() {
        let config = LayoutConfig::from_json(r#"{ "quirks_mode": true }"#).unwrap();
        assert!(config.quirks_mode);
        assert_eq!(config.max_passes, 3);
        assert_eq!(config.min_limited_line_width, 80);
        assert_eq!(config.paragraph_width_limit, None);
    }

    #[test]
    fn test_paragraph_width_limit_from_json() {
        let config = LayoutConfig::from_json(r#"{ "paragraph_width_limit": 640 }"#).unwrap();
        assert_eq!(config.paragraph_width_limit, Some(640));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = LayoutConfig::from_json(r#"{ "quirks": true }"#).unwrap_err();
        assert!(matches!(err, crate::LayoutError::Config(_)));
    }
}
