//! Label table loading.
//!
//! A label table maps the model's output class indexes to human-readable
//! names. It is loaded once from a newline-delimited text file (line *i*
//! names class *i*), shared read-only, and never mutated during scoring.

use crate::core::{ScoreError, ScoreResult};
use std::path::Path;
use std::sync::Arc;

/// An ordered, immutable table of class labels.
#[derive(Debug, Clone)]
pub struct LabelTable {
    labels: Vec<Arc<str>>,
}

impl LabelTable {
    /// Loads a label table from a newline-delimited text file.
    ///
    /// Lines are trimmed of trailing whitespace; interior empty lines are
    /// preserved so indexes stay aligned with the model output.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreError::InvalidInput`] if the file cannot be read or
    /// contains no labels. A missing label file is fatal: the pipeline
    /// refuses to start without one.
    pub fn from_file(path: &Path) -> ScoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScoreError::invalid_input(format!(
                "failed to read label file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let table = Self::from_lines(content.lines().map(str::trim_end));
        if table.is_empty() {
            return Err(ScoreError::invalid_input(format!(
                "label file '{}' contains no labels",
                path.display()
            )));
        }
        Ok(table)
    }

    /// Builds a label table from an iterator of label names.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            labels: lines.into_iter().map(|s| Arc::from(s.as_ref())).collect(),
        }
    }

    /// Returns the label for the given class index.
    pub fn get(&self, index: usize) -> Option<&Arc<str>> {
        self.labels.get(index)
    }

    /// Number of labels in the table.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if the table holds no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterates over the labels in class-index order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<str>> {
        self.labels.iter()
    }
}
