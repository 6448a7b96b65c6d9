//! Presets, builder-style setters and file loading for `ConversionOptions`

use anyhow::{Context, Result};
use std::path::Path;

use super::types::{ConversionOptions, NormalizationMode, TsvDetection};

impl ConversionOptions {
    /// Create a new `ConversionOptions` with all heuristics enabled
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain Markdown mode: strips images, video, audio and iframes
    #[must_use]
    pub fn plain() -> Self {
        Self {
            strip_media: true,
            ..Self::default()
        }
    }

    /// Disable all optional processing
    ///
    /// Tables are rendered as data tables, text is not reinterpreted, and no
    /// Markdown cleanup runs. Useful for already-clean HTML.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            heuristic_table_unwrap: false,
            relaxed_mixed_text: false,
            post_process: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_normalization(mut self, mode: NormalizationMode) -> Self {
        self.normalization = mode;
        self
    }

    #[must_use]
    pub fn with_large_document_threshold(mut self, bytes: usize) -> Self {
        self.large_document_threshold = bytes;
        self
    }

    #[must_use]
    pub fn with_class_bold_heuristics(mut self, enabled: bool) -> Self {
        self.class_bold_heuristics = enabled;
        self
    }

    #[must_use]
    pub fn with_strip_media(mut self, enabled: bool) -> Self {
        self.strip_media = enabled;
        self
    }

    #[must_use]
    pub fn with_tsv_detection(mut self, detection: TsvDetection) -> Self {
        self.tsv_detection = detection;
        self
    }

    #[must_use]
    pub fn with_plain_text_fallback(mut self, enabled: bool) -> Self {
        self.plain_text_fallback = enabled;
        self
    }

    /// Whether an input of `len` bytes should take the lightweight path
    #[must_use]
    pub fn use_lightweight_path(&self, len: usize) -> bool {
        match self.normalization {
            NormalizationMode::Tree => false,
            NormalizationMode::Lightweight => true,
            NormalizationMode::Auto => len > self.large_document_threshold,
        }
    }

    /// Load options from a JSON file; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Parse options from a JSON string; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid JSON for this schema.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("Invalid conversion options JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_LARGE_DOCUMENT_THRESHOLD;

    #[test]
    fn test_auto_mode_switches_at_threshold() {
        let options = ConversionOptions::default();
        assert!(!options.use_lightweight_path(DEFAULT_LARGE_DOCUMENT_THRESHOLD));
        assert!(options.use_lightweight_path(DEFAULT_LARGE_DOCUMENT_THRESHOLD + 1));
    }

    #[test]
    fn test_forced_modes_ignore_size() {
        let tree = ConversionOptions::default().with_normalization(NormalizationMode::Tree);
        assert!(!tree.use_lightweight_path(usize::MAX));

        let light = ConversionOptions::default().with_normalization(NormalizationMode::Lightweight);
        assert!(light.use_lightweight_path(0));
    }

    #[test]
    fn test_partial_json_keeps_defaults() -> Result<()> {
        let options = ConversionOptions::from_json_str(
            r#"{ "strip_media": true, "thresholds": { "section_header_colspan": 6 } }"#,
        )?;
        assert!(options.strip_media);
        assert_eq!(options.thresholds.section_header_colspan, 6);
        assert_eq!(options.thresholds.section_header_min_len, 30);
        assert!(options.heuristic_table_unwrap);
        Ok(())
    }

    #[test]
    fn test_enum_fields_use_snake_case() -> Result<()> {
        let options = ConversionOptions::from_json_str(
            r#"{ "normalization": "lightweight", "tsv_detection": "consecutive" }"#,
        )?;
        assert_eq!(options.normalization, NormalizationMode::Lightweight);
        assert_eq!(options.tsv_detection, TsvDetection::Consecutive);
        Ok(())
    }

    #[test]
    fn test_from_json_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("clipmark.json");
        std::fs::write(&path, r#"{ "plain_text_fallback": true }"#)?;
        let options = ConversionOptions::from_json_file(&path)?;
        assert!(options.plain_text_fallback);
        Ok(())
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(ConversionOptions::from_json_str("{ not json").is_err());
    }
}
