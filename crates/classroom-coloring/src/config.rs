//! Coloring engine configuration

use crate::region::Color;
use serde::{Deserialize, Serialize};

/// Configuration for [`ColoringCanvas`](crate::ColoringCanvas)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColoringConfig {
    /// Stroke colors reserved for line art
    pub outline_strokes: Vec<String>,
    /// Stroke widths above this mark a region as line art
    pub outline_width_threshold: f32,
    /// Export file stem used when the activity has no usable title
    pub default_file_name: String,
}

impl ColoringConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With reserved outline stroke colors
    #[must_use]
    pub fn with_outline_strokes<I, S>(mut self, strokes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outline_strokes = strokes.into_iter().map(Into::into).collect();
        self
    }

    /// With outline stroke-width threshold
    #[inline]
    #[must_use]
    pub fn with_outline_width_threshold(mut self, threshold: f32) -> Self {
        self.outline_width_threshold = threshold;
        self
    }

    /// With default export file stem
    #[inline]
    #[must_use]
    pub fn with_default_file_name(mut self, name: impl Into<String>) -> Self {
        self.default_file_name = name.into();
        self
    }

    /// Outline heuristic over a shape's resolved stroke
    #[must_use]
    pub fn is_outline(&self, stroke: Option<&Color>, stroke_width: Option<f32>) -> bool {
        let reserved_stroke = stroke.is_some_and(|stroke| {
            self.outline_strokes
                .iter()
                .any(|reserved| Color::new(reserved) == *stroke)
        });
        let wide_stroke = stroke_width.is_some_and(|w| w > self.outline_width_threshold);
        reserved_stroke || wide_stroke
    }
}

impl Default for ColoringConfig {
    fn default() -> Self {
        Self {
            outline_strokes: vec![
                "#000000".to_string(),
                "#000".to_string(),
                "black".to_string(),
            ],
            outline_width_threshold: 2.0,
            default_file_name: "coloring".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_stroke_marks_outline() {
        let config = ColoringConfig::new();
        assert!(config.is_outline(Some(&Color::new("#000")), None));
        assert!(config.is_outline(Some(&Color::new("BLACK")), Some(0.5)));
        assert!(!config.is_outline(Some(&Color::new("orange")), Some(1.0)));
        assert!(!config.is_outline(None, None));
    }

    #[test]
    fn wide_stroke_marks_outline() {
        let config = ColoringConfig::new().with_outline_width_threshold(1.5);
        assert!(config.is_outline(None, Some(2.0)));
        assert!(!config.is_outline(None, Some(1.5)));
    }

    #[test]
    fn custom_strokes_replace_defaults() {
        let config = ColoringConfig::new().with_outline_strokes(["#333333"]);
        assert!(config.is_outline(Some(&Color::new("#333333")), None));
        assert!(!config.is_outline(Some(&Color::new("black")), None));
    }
}
