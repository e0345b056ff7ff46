//! Document Encoder: buffers a resume document and encodes it as base64.

use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use bytes::Bytes;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

/// MIME type declared for every attached document.
pub const DOCUMENT_MIME_TYPE: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("failed to read document '{filename}': {source}")]
    Read {
        filename: String,
        #[source]
        source: std::io::Error,
    },
}

/// Where the document bytes come from.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// Already in memory, e.g. a multipart upload.
    Bytes(Bytes),
    /// A file on local disk, read when the document is encoded.
    Path(PathBuf),
}

/// A binary document plus the filename it was declared with.
#[derive(Debug, Clone)]
pub struct Document {
    pub filename: String,
    pub source: DocumentSource,
}

impl Document {
    pub fn from_bytes(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            source: DocumentSource::Bytes(bytes.into()),
        }
    }

    /// Uses the file name component of `path` as the declared filename.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        Self {
            filename,
            source: DocumentSource::Path(path),
        }
    }
}

/// A fully buffered, base64-encoded document ready to embed in a request body.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedDocument {
    pub filename: String,
    pub base64: String,
}

impl EncodedDocument {
    /// `data:<mime>;base64,<payload>` form used by the wire contract.
    pub fn data_uri(&self) -> String {
        format!("data:{DOCUMENT_MIME_TYPE};base64,{}", self.base64)
    }
}

/// Reads `reader` to completion and returns the standard base64 encoding.
pub async fn encode<R>(mut reader: R) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    Ok(B64.encode(&buf))
}

/// Encodes a document, reading it from disk first when needed.
pub async fn encode_document(document: &Document) -> Result<EncodedDocument, EncodingError> {
    let read_err = |source| EncodingError::Read {
        filename: document.filename.clone(),
        source,
    };

    let base64 = match &document.source {
        DocumentSource::Bytes(bytes) => encode(bytes.as_ref()).await.map_err(read_err)?,
        DocumentSource::Path(path) => {
            let file = tokio::fs::File::open(path).await.map_err(read_err)?;
            encode(file).await.map_err(read_err)?
        }
    };

    Ok(EncodedDocument {
        filename: document.filename.clone(),
        base64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_encode_in_memory_bytes() {
        let doc = Document::from_bytes("cv.pdf", &b"%PDF-1.4"[..]);
        let encoded = encode_document(&doc).await.unwrap();
        assert_eq!(encoded.filename, "cv.pdf");
        assert_eq!(encoded.base64, "JVBERi0xLjQ=");
    }

    #[tokio::test]
    async fn test_encode_reads_file_to_completion() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        let contents = vec![0xABu8; 64 * 1024 + 3];
        file.write_all(&contents).unwrap();

        let doc = Document::from_path(file.path());
        let encoded = encode_document(&doc).await.unwrap();

        assert!(encoded.filename.ends_with(".pdf"));
        assert_eq!(B64.decode(&encoded.base64).unwrap(), contents);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_encoding_error() {
        let dir = tempfile::tempdir().unwrap();
        let doc = Document::from_path(dir.path().join("missing.pdf"));
        let err = encode_document(&doc).await.unwrap_err();
        assert!(err.to_string().contains("missing.pdf"));
    }

    #[test]
    fn test_data_uri_declares_pdf() {
        let encoded = EncodedDocument {
            filename: "cv.pdf".to_string(),
            base64: "QUJD".to_string(),
        };
        assert_eq!(encoded.data_uri(), "data:application/pdf;base64,QUJD");
    }
}
