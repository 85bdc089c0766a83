//! Output: place the Markdown next to the source PDF.
//!
//! The target path is derived from the source path alone, so re-running a
//! conversion always lands on the same file and overwrites it. The write is
//! not transactional with the network calls: if the process dies between
//! generation and this step the result is lost.

use crate::error::Pdf2MdError;
use crate::host::FileStore;
use serde::Serialize;
use tracing::info;

/// Whether the output file was new or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteOutcome {
    Created,
    Overwritten,
}

/// Sibling Markdown path for a PDF: `a/b/report.PDF` → `a/b/report.md`.
///
/// Only a trailing `.pdf` (any case) is replaced. A path without that
/// suffix gets `.md` appended so the output never aliases the input.
pub fn output_path(source: &str) -> String {
    if crate::pipeline::input::is_convertible(source) {
        format!("{}.md", &source[..source.len() - 4])
    } else {
        format!("{source}.md")
    }
}

/// Create `path` with `content`, or overwrite it if it already exists.
pub async fn write_output<S: FileStore + ?Sized>(
    store: &S,
    path: &str,
    content: &str,
) -> Result<WriteOutcome, Pdf2MdError> {
    let to_err = |source: std::io::Error| Pdf2MdError::OutputWriteFailed {
        path: path.to_string(),
        source,
    };

    let outcome = if store.exists(path).await {
        store.modify(path, content).await.map_err(to_err)?;
        WriteOutcome::Overwritten
    } else {
        store.create(path, content).await.map_err(to_err)?;
        WriteOutcome::Created
    };

    info!("Markdown {:?} at {} ({} bytes)", outcome, path, content.len());
    Ok(outcome)
}
