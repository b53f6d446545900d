//! Reporting collaborators for scored outcomes.
//!
//! Output formatting lives here, outside the pipeline, so the pipeline
//! itself stays free of display side effects and fully testable.

use crate::pipeline::ItemOutcome;
use std::io::Write;
use tracing::{info, warn};

/// Renders a batch of scoring outcomes.
pub trait Reporter {
    /// Reports every outcome of a scored batch, in order.
    fn report(&mut self, outcomes: &[ItemOutcome]);
}

/// Reporter that logs outcomes through `tracing`.
///
/// Predictions log at info level with the confidence as a percentage;
/// per-item failures log at warn level. A summary line closes the batch.
#[derive(Debug, Default)]
pub struct TracingReporter;

impl TracingReporter {
    /// Creates a tracing reporter.
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for TracingReporter {
    fn report(&mut self, outcomes: &[ItemOutcome]) {
        let mut failures = 0usize;
        for outcome in outcomes {
            match &outcome.result {
                Ok(prediction) => {
                    info!(
                        image = %prediction.image_path.display(),
                        truth = prediction.true_label.as_deref().unwrap_or("-"),
                        predicted = %prediction.label,
                        confidence = %format_args!("{:.1}%", prediction.confidence * 100.0),
                        "prediction"
                    );
                }
                Err(e) => {
                    failures += 1;
                    warn!(
                        image = %outcome.record.path.display(),
                        error = %e,
                        "image skipped"
                    );
                }
            }
        }
        info!(
            total = outcomes.len(),
            scored = outcomes.len() - failures,
            failures,
            "batch report"
        );
    }
}

/// Reporter that writes one JSON object per outcome to a writer.
pub struct JsonLinesReporter<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesReporter<W> {
    /// Creates a reporter writing JSON lines to the given writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the reporter and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Reporter for JsonLinesReporter<W> {
    fn report(&mut self, outcomes: &[ItemOutcome]) {
        for outcome in outcomes {
            let value = match &outcome.result {
                Ok(p) => serde_json::json!({
                    "imagePath": p.image_path.display().to_string(),
                    "trueLabel": p.true_label,
                    "predictedLabel": &*p.label,
                    "classId": p.class_id,
                    "confidence": p.confidence,
                }),
                Err(e) => serde_json::json!({
                    "imagePath": outcome.record.path.display().to_string(),
                    "trueLabel": outcome.record.true_label,
                    "error": e.to_string(),
                }),
            };
            if writeln!(self.writer, "{value}").is_err() {
                warn!("failed to write report line");
                return;
            }
        }
    }
}
