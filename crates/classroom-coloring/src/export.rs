//! Exported images and file naming

use crate::error::ExportError;
use std::path::{Path, PathBuf};

/// A standalone SVG document ready to be offered as a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    /// Suggested file name, always ending in `.svg`
    pub file_name: String,
    /// Serialized document
    pub document: String,
}

impl ExportedImage {
    /// MIME type of the document
    pub const MIME_TYPE: &'static str = "image/svg+xml";

    /// Write the document into `dir` under its file name
    ///
    /// # Errors
    /// `ExportError::Io` when the file cannot be written.
    pub async fn save_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, self.document.as_bytes())
            .await
            .map_err(|source| ExportError::Io {
                path: path.clone(),
                source,
            })?;
        tracing::info!(path = %path.display(), bytes = self.document.len(), "saved coloring");
        Ok(path)
    }
}

/// File name for an activity title, falling back to `default_stem`
#[must_use]
pub fn file_name_for(title: Option<&str>, default_stem: &str) -> String {
    let stem: String = title
        .unwrap_or_default()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");

    if stem.is_empty() {
        format!("{default_stem}.svg")
    } else {
        format!("{stem}.svg")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_from_title() {
        assert_eq!(file_name_for(Some("Happy Farm"), "coloring"), "Happy_Farm.svg");
        assert_eq!(file_name_for(Some("  Sea / Life? "), "coloring"), "Sea_Life.svg");
    }

    #[test]
    fn falls_back_when_untitled() {
        assert_eq!(file_name_for(None, "coloring"), "coloring.svg");
        assert_eq!(file_name_for(Some(" ?! "), "coloring"), "coloring.svg");
    }

    #[tokio::test]
    async fn saves_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let image = ExportedImage {
            file_name: "farm.svg".to_string(),
            document: "<svg/>".to_string(),
        };

        let path = image.save_to(dir.path()).await.unwrap();
        assert_eq!(path, dir.path().join("farm.svg"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<svg/>");
    }
}
