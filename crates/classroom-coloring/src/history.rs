//! Undo/redo history for paint actions

use crate::region::{Color, RegionId, Regions};
use serde::{Deserialize, Serialize};

/// One completed paint action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Painted region
    pub region: RegionId,
    /// Fill before the action
    pub old_color: Color,
    /// Fill after the action
    pub new_color: Color,
}

/// Undo and redo stacks of one canvas
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
}

impl History {
    /// Create empty history
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new action; the redo stack no longer applies
    pub fn record(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);
        self.redo_stack.clear();
    }

    /// Revert the latest action on `regions`
    pub fn undo(&mut self, regions: &mut Regions) -> Option<&HistoryEntry> {
        let entry = self.undo_stack.pop()?;
        regions.set_color(entry.region, entry.old_color.clone());
        self.redo_stack.push(entry);
        self.redo_stack.last()
    }

    /// Re-apply the latest undone action on `regions`
    pub fn redo(&mut self, regions: &mut Regions) -> Option<&HistoryEntry> {
        let entry = self.redo_stack.pop()?;
        regions.set_color(entry.region, entry.new_color.clone());
        self.undo_stack.push(entry);
        self.undo_stack.last()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Whether undo would do anything
    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether redo would do anything
    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo stack depth
    #[inline]
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Redo stack depth
    #[inline]
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Undo stack, oldest first
    #[inline]
    #[must_use]
    pub fn undo_entries(&self) -> &[HistoryEntry] {
        &self.undo_stack
    }
}
