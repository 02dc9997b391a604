//! Restyler configuration.

use crate::error::StructureError;
use crate::types::{PageHeadingStyle, PanelHeadingStyle};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// Longest delay accepted for any timing setting.
pub const MAX_DELAY_MS: u64 = 60_000;

/// Settings for an [`AsYouType`](crate::AsYouType) session.
///
/// ```toml
/// debounce_ms = 20
/// scroll_capture_delay_ms = 50
/// min_autocomplete_len = 2
/// dialog_indent = "  "
/// page_heading_style = "page-and-numerals"
/// panel_heading_style = "panel-and-numerals"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestyleConfig {
    /// Window used to coalesce text and selection changes.
    #[serde(deserialize_with = "bounded_delay")]
    pub debounce_ms: u64,
    /// Delay before page scroll offsets are captured.
    #[serde(deserialize_with = "bounded_delay")]
    pub scroll_capture_delay_ms: u64,
    /// Shortest in-progress word that shows name suggestions.
    pub min_autocomplete_len: usize,
    /// Indent inserted after Enter on a character heading; empty disables it.
    pub dialog_indent: String,
    /// Style used when rendering page headings in the outline.
    pub page_heading_style: PageHeadingStyle,
    /// Style used when rendering panel headings in the outline.
    pub panel_heading_style: PanelHeadingStyle,
}

impl Default for RestyleConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 20,
            scroll_capture_delay_ms: 50,
            min_autocomplete_len: 2,
            dialog_indent: "  ".to_string(),
            page_heading_style: PageHeadingStyle::default(),
            panel_heading_style: PanelHeadingStyle::default(),
        }
    }
}

impl RestyleConfig {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, StructureError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Debounce window.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Scroll capture delay.
    pub fn scroll_capture_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_capture_delay_ms)
    }
}

fn bounded_delay<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let ms = u64::deserialize(deserializer)?;
    if ms > MAX_DELAY_MS {
        return Err(serde::de::Error::custom(format!(
            "delay of {ms}ms exceeds the {MAX_DELAY_MS}ms limit"
        )));
    }
    Ok(ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_toml_gives_defaults() {
        assert_eq!(RestyleConfig::from_toml_str("").unwrap(), RestyleConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = RestyleConfig::from_toml_str(
            "debounce_ms = 40\npage_heading_style = \"longhand\"\npanel_heading_style = \"numeral-and-dot\"\n",
        )
        .unwrap();
        assert_eq!(config.debounce(), Duration::from_millis(40));
        assert_eq!(config.page_heading_style, PageHeadingStyle::Longhand);
        assert_eq!(config.panel_heading_style, PanelHeadingStyle::NumeralAndDot);
        assert_eq!(config.min_autocomplete_len, 2);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let err = RestyleConfig::from_toml_str("debounce_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, StructureError::Config(_)));
    }

    #[test]
    fn test_oversized_delays_are_rejected() {
        for toml in [
            "debounce_ms = 18446744073709551615",
            "scroll_capture_delay_ms = 60001",
        ] {
            let err = RestyleConfig::from_toml_str(toml).unwrap_err();
            assert!(matches!(err, StructureError::Config(_)), "{toml}");
        }
        let config = RestyleConfig::from_toml_str("debounce_ms = 60000").unwrap();
        assert_eq!(config.debounce(), Duration::from_millis(MAX_DELAY_MS));
    }
}
