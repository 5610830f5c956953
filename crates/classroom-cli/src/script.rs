//! Paint scripts
//!
//! One step per line:
//!
//! ```text
//! # comment
//! paint 0 #ff0000
//! paint roof green
//! undo
//! redo
//! reset
//! ```
//!
//! A numeric target is a region index; anything else is an element id.

use classroom_coloring::{ColoringCanvas, PaintOutcome, RegionId};

/// Script parse error
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Region(RegionId),
    Element(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Paint { target: Target, color: String },
    Undo,
    Redo,
    Reset,
}

/// What a script run did to the canvas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub painted: usize,
    pub skipped: usize,
    pub undone: usize,
    pub redone: usize,
    pub resets: usize,
}

pub fn parse(text: &str) -> Result<Vec<Step>, ScriptError> {
    let mut steps = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let error = |message: &str| ScriptError {
            line: index + 1,
            message: message.to_string(),
        };

        let mut words = line.split_whitespace();
        let step = match words.next() {
            Some("paint") => {
                let target = words.next().ok_or_else(|| error("paint needs a target"))?;
                let color = words.next().ok_or_else(|| error("paint needs a color"))?;
                let target = match target.parse::<usize>() {
                    Ok(index) => Target::Region(RegionId(index)),
                    Err(_) => Target::Element(target.to_string()),
                };
                Step::Paint {
                    target,
                    color: color.to_string(),
                }
            }
            Some("undo") => Step::Undo,
            Some("redo") => Step::Redo,
            Some("reset") => Step::Reset,
            Some(other) => return Err(error(&format!("unknown step '{other}'"))),
            None => continue,
        };

        if words.next().is_some() {
            return Err(error("trailing words"));
        }
        steps.push(step);
    }
    Ok(steps)
}

/// Apply `steps`; resets only go through when `confirm_reset` is set
pub fn run(canvas: &mut ColoringCanvas, steps: &[Step], confirm_reset: bool) -> Summary {
    let mut summary = Summary::default();
    for step in steps {
        match step {
            Step::Paint { target, color } => {
                let outcome = match target {
                    Target::Region(id) => canvas.paint(*id, color.as_str()),
                    Target::Element(element) => canvas.paint_element(element, color.as_str()),
                };
                if let PaintOutcome::Applied { .. } = outcome {
                    summary.painted += 1;
                } else {
                    tracing::info!(?target, ?outcome, "paint skipped");
                    summary.skipped += 1;
                }
            }
            Step::Undo => summary.undone += usize::from(canvas.undo()),
            Step::Redo => summary.redone += usize::from(canvas.redo()),
            Step::Reset => {
                if canvas.reset(|| confirm_reset) {
                    summary.resets += 1;
                } else {
                    tracing::warn!("reset requested without confirmation, ignored");
                }
            }
        }
    }
    summary
}
