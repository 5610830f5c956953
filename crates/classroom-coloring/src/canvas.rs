//! Coloring canvas: paint, undo, redo, reset and export
//!
//! The canvas owns the indexed region collection and its history. Every
//! operation is synchronous and none of them fail: unknown regions, outline
//! regions and same-color paints are reported as no-ops.

use crate::config::ColoringConfig;
use crate::document::SvgDocument;
use crate::error::{ExportError, LoadError};
use crate::export::{file_name_for, ExportedImage};
use crate::history::{History, HistoryEntry};
use crate::region::{Color, Region, RegionId, Regions};
use std::path::Path;
use std::sync::Arc;

/// Result of a paint request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaintOutcome {
    /// The fill changed and an entry was recorded
    Applied {
        /// Fill before the paint
        previous: Color,
    },
    /// The region already shows the requested color
    Unchanged,
    /// The region is line art
    Outline,
    /// No such region
    UnknownRegion,
}

impl PaintOutcome {
    /// Whether the canvas changed
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// One open coloring workspace
#[derive(Debug, Clone)]
pub struct ColoringCanvas {
    config: ColoringConfig,
    title: Option<String>,
    document: SvgDocument,
    pristine: Regions,
    regions: Regions,
    history: History,
}

impl ColoringCanvas {
    /// Load an image from SVG source
    ///
    /// # Errors
    /// See [`SvgDocument::parse`].
    pub fn load(source: impl Into<Arc<str>>, config: ColoringConfig) -> Result<Self, LoadError> {
        let (document, regions) = SvgDocument::parse(source, &config)?;
        Ok(Self {
            config,
            title: None,
            document,
            pristine: regions.clone(),
            regions,
            history: History::new(),
        })
    }

    /// Load an image from disk
    ///
    /// # Errors
    /// `LoadError::Io` when the file cannot be read, otherwise see
    /// [`load`](Self::load).
    pub async fn open(path: &Path, config: ColoringConfig) -> Result<Self, LoadError> {
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::load(source, config)
    }

    /// With the activity title used for export naming
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Activity title
    #[inline]
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Paint `region` with `color`
    pub fn paint(&mut self, region: RegionId, color: impl Into<Color>) -> PaintOutcome {
        let color = color.into();
        let Some(target) = self.regions.get(region) else {
            tracing::trace!(%region, "paint on unknown region ignored");
            return PaintOutcome::UnknownRegion;
        };
        if target.is_outline {
            tracing::trace!(%region, "paint on outline ignored");
            return PaintOutcome::Outline;
        }
        if target.current_color == color {
            return PaintOutcome::Unchanged;
        }

        let previous = self
            .regions
            .set_color(region, color.clone())
            .unwrap_or_else(Color::none);
        tracing::debug!(%region, from = %previous, to = %color, "paint");

        self.history.record(HistoryEntry {
            region,
            old_color: previous.clone(),
            new_color: color,
        });
        PaintOutcome::Applied { previous }
    }

    /// Paint the shape whose `id` attribute is `element_id`
    pub fn paint_element(&mut self, element_id: &str, color: impl Into<Color>) -> PaintOutcome {
        match self.region_by_element_id(element_id) {
            Some(region) => self.paint(region, color),
            None => PaintOutcome::UnknownRegion,
        }
    }

    /// Revert the latest paint; `false` when there was nothing to undo
    pub fn undo(&mut self) -> bool {
        match self.history.undo(&mut self.regions) {
            Some(entry) => {
                tracing::debug!(region = %entry.region, to = %entry.old_color, "undo");
                true
            }
            None => false,
        }
    }

    /// Re-apply the latest undone paint; `false` when there was nothing to redo
    pub fn redo(&mut self) -> bool {
        match self.history.redo(&mut self.regions) {
            Some(entry) => {
                tracing::debug!(region = %entry.region, to = %entry.new_color, "redo");
                true
            }
            None => false,
        }
    }

    /// Restore the original image and forget all history
    ///
    /// Only proceeds when `confirm` returns `true`.
    pub fn reset(&mut self, confirm: impl FnOnce() -> bool) -> bool {
        if !confirm() {
            return false;
        }
        self.history.clear();
        self.regions = self.pristine.clone();
        tracing::info!(regions = self.regions.len(), "canvas reset");
        true
    }

    /// Current image as SVG markup
    ///
    /// # Errors
    /// See [`SvgDocument::render`].
    pub fn render(&self) -> Result<String, ExportError> {
        self.document.render(&self.regions)
    }

    /// Serialize the current image for download
    ///
    /// # Errors
    /// See [`SvgDocument::render`].
    pub fn export(&self) -> Result<ExportedImage, ExportError> {
        Ok(ExportedImage {
            file_name: file_name_for(self.title.as_deref(), &self.config.default_file_name),
            document: self.render()?,
        })
    }

    /// Region by handle
    #[inline]
    #[must_use]
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id)
    }

    /// Region whose element carries `element_id`
    #[must_use]
    pub fn region_by_element_id(&self, element_id: &str) -> Option<RegionId> {
        self.regions
            .iter()
            .find(|r| r.element_id.as_deref() == Some(element_id))
            .map(|r| r.id)
    }

    /// Current fill of a region
    #[must_use]
    pub fn color_of(&self, id: RegionId) -> Option<&Color> {
        self.regions.get(id).map(|r| &r.current_color)
    }

    /// All regions in document order
    #[inline]
    #[must_use]
    pub fn regions(&self) -> &Regions {
        &self.regions
    }

    /// Regions that accept paint
    pub fn paintable(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter().filter(|r| !r.is_outline)
    }

    /// Paint history
    #[inline]
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Whether undo would do anything
    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether redo would do anything
    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}
