//! Source resolution: read the PDF bytes through the host file store.
//!
//! The document is read in full; the upload stage sends it as a single
//! chunk. We check the `%PDF` magic bytes but only log a warning when they
//! are missing. The remote service is the judge of what it can read.

use crate::error::Pdf2MdError;
use crate::host::FileStore;
use tracing::{debug, warn};

/// MIME type declared for every upload.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// The PDF being converted, as read from the file store.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Logical store path, e.g. `papers/report.pdf`.
    pub path: String,
    /// Final path component, used as the upload display name.
    pub name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    /// Wrap bytes that did not come from a file store.
    pub fn from_bytes(path: impl Into<String>, bytes: Vec<u8>) -> Self {
        let path = path.into();
        let name = file_name(&path).to_string();
        Self {
            path,
            name,
            mime_type: PDF_MIME_TYPE,
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Whether `path` names a file the converter accepts (trailing `.pdf`, any case).
pub fn is_convertible(path: &str) -> bool {
    path.len() >= 4
        && path.is_char_boundary(path.len() - 4)
        && path[path.len() - 4..].eq_ignore_ascii_case(".pdf")
}

/// Last `/`- or `\`-separated component of a logical path.
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Read the source document from the store.
pub async fn read_source<S: FileStore + ?Sized>(
    store: &S,
    path: &str,
) -> Result<SourceDocument, Pdf2MdError> {
    let bytes = store.read_binary(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Pdf2MdError::FileNotFound {
                path: path.to_string(),
            }
        } else {
            Pdf2MdError::ReadFailed {
                path: path.to_string(),
                source: e,
            }
        }
    })?;

    let doc = SourceDocument::from_bytes(path, bytes);
    if doc.is_empty() {
        warn!("'{}' is empty", path);
    } else if !doc.bytes.starts_with(b"%PDF") {
        warn!("'{}' does not start with %PDF magic bytes", path);
    }
    debug!("Read {} bytes from {}", doc.len(), path);

    Ok(doc)
}
