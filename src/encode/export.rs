//! Delivery of encoded bytes: files, base64, data URIs and response bodies.

use crate::error::{Error, Result};
use crate::format::Format;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;
use tracing::debug;

/// Framework-agnostic HTTP response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub body: Vec<u8>,
    pub content_type: &'static str,
    pub content_length: usize,
}

impl Response {
    pub fn new(body: Vec<u8>, format: Format) -> Self {
        Self {
            content_length: body.len(),
            content_type: format.mime_type(),
            body,
        }
    }
}

/// Write `bytes` to `path`, creating missing parent directories.
pub fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    let write_error = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(path, bytes).map_err(write_error)?;
    debug!(path = %path.display(), size = bytes.len(), "wrote output");
    Ok(())
}

pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// `data:<mime>;base64,<payload>`
pub fn data_uri(bytes: &[u8], format: Format) -> String {
    format!("data:{};base64,{}", format.mime_type(), to_base64(bytes))
}
