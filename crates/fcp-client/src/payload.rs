//! Payload sources for inserts
//!
//! Each insert attempt loads the payload afresh. Memory buffers and file
//! paths can be loaded any number of times and always yield the same bytes;
//! a stream can be loaded once.

use bytes::Bytes;
use parking_lot::Mutex;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{ClientError, Result};

type BoxedReader = Box<dyn Read + Send>;

pub enum PayloadSource {
    /// In-memory buffer
    Memory(Bytes),
    /// File reopened for every attempt
    File(PathBuf),
    /// Single-use reader
    Stream(Mutex<Option<BoxedReader>>),
}

impl PayloadSource {
    pub fn stream(reader: impl Read + Send + 'static) -> Self {
        Self::Stream(Mutex::new(Some(Box::new(reader))))
    }

    /// Whether every load yields the same bytes
    pub fn is_replayable(&self) -> bool {
        matches!(self, Self::Memory(_) | Self::File(_))
    }

    /// Read the whole payload for one attempt.
    ///
    /// Failures to read are reported as [`ClientError::BadInput`].
    pub async fn load(&self) -> Result<Bytes> {
        match self {
            Self::Memory(data) => Ok(data.clone()),
            Self::File(path) => tokio::fs::read(path)
                .await
                .map(Bytes::from)
                .map_err(|e| ClientError::BadInput {
                    reason: format!("cannot read {}", path.display()),
                    source: Some(e),
                }),
            Self::Stream(reader) => {
                let mut reader = reader
                    .lock()
                    .take()
                    .ok_or_else(|| ClientError::bad_input("stream payload already consumed"))?;
                tokio::task::spawn_blocking(move || {
                    let mut buffer = Vec::new();
                    reader.read_to_end(&mut buffer).map(|_| Bytes::from(buffer))
                })
                .await
                .map_err(|e| ClientError::bad_input(format!("stream reader failed: {e}")))?
                .map_err(|e| ClientError::BadInput {
                    reason: "cannot read stream payload".to_string(),
                    source: Some(e),
                })
            }
        }
    }
}

impl fmt::Debug for PayloadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory(data) => f.debug_tuple("Memory").field(&data.len()).finish(),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Stream(_) => f.write_str("Stream"),
        }
    }
}

impl From<Bytes> for PayloadSource {
    fn from(data: Bytes) -> Self {
        Self::Memory(data)
    }
}

impl From<Vec<u8>> for PayloadSource {
    fn from(data: Vec<u8>) -> Self {
        Self::Memory(Bytes::from(data))
    }
}

impl From<&'static [u8]> for PayloadSource {
    fn from(data: &'static [u8]) -> Self {
        Self::Memory(Bytes::from_static(data))
    }
}

impl From<String> for PayloadSource {
    fn from(data: String) -> Self {
        Self::Memory(Bytes::from(data))
    }
}

impl From<PathBuf> for PayloadSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<&Path> for PayloadSource {
    fn from(path: &Path) -> Self {
        Self::File(path.to_path_buf())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[tokio::test]
    async fn test_memory_payload_replays() {
        let payload = PayloadSource::from(b"hello".to_vec());
        assert!(payload.is_replayable());
        let first = payload.load().await.expect("load");
        let second = payload.load().await.expect("load");
        assert_eq!(first, second);
        assert_eq!(&first[..], b"hello");
    }

    #[tokio::test]
    async fn test_file_payload_is_reopened() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"on disk").expect("write");
        let payload = PayloadSource::from(file.path());

        assert_eq!(&payload.load().await.expect("load")[..], b"on disk");
        assert_eq!(&payload.load().await.expect("load")[..], b"on disk");
    }

    #[tokio::test]
    async fn test_missing_file_is_bad_input() {
        let dir = tempfile::tempdir().expect("temp dir");
        let payload = PayloadSource::from(dir.path().join("absent.bin"));
        let err = payload.load().await.expect_err("missing file");
        assert!(matches!(err, ClientError::BadInput { source: Some(_), .. }));
    }

    #[tokio::test]
    async fn test_stream_payload_loads_once() {
        let payload = PayloadSource::stream(Cursor::new(b"once".to_vec()));
        assert!(!payload.is_replayable());
        assert_eq!(&payload.load().await.expect("load")[..], b"once");
        assert!(matches!(
            payload.load().await,
            Err(ClientError::BadInput { .. })
        ));
    }
}
