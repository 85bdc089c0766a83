//! Result type for a finished conversion.

use crate::pipeline::write::WriteOutcome;
use serde::Serialize;

/// What a successful [`crate::convert::convert_file`] produced.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutput {
    /// Store path of the PDF that was converted.
    pub source_path: String,
    /// Store path of the Markdown file, the source with `.pdf` → `.md`.
    pub output_path: String,
    /// The Markdown exactly as written.
    pub markdown: String,
    pub outcome: WriteOutcome,
    /// Size of the uploaded PDF.
    pub uploaded_bytes: usize,
    /// Wall-clock time from start to write, in milliseconds.
    pub duration_ms: u64,
}
