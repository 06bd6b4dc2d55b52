//! Storage reader: fetches the full text of an object from the configured bucket.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::{Client, StatusCode, Url};
use std::path::{Component, Path, PathBuf};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid object name: {0}")]
    InvalidObjectName(String),

    #[error("Storage API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Bucket this reader is bound to.
    fn bucket(&self) -> &str;

    /// Read the whole object as text. Errors are final; nothing is retried.
    async fn read_text(&self, filename: &str) -> Result<String, StorageError>;
}

/// Drain a chunk stream in order and decode the concatenated bytes.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
async fn collect_text<S, B, E>(
    stream: S,
    map_err: impl Fn(E) -> StorageError,
) -> Result<String, StorageError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    futures::pin_mut!(stream);

    let mut buffer = Vec::new();
    let mut chunks = 0usize;
    while let Some(chunk) = stream.next().await {
        buffer.extend_from_slice(chunk.map_err(&map_err)?.as_ref());
        chunks += 1;
    }

    tracing::debug!(chunks, bytes = buffer.len(), "Storage stream completed");

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Google Cloud Storage reader using the JSON API media download.
pub struct GcsStorage {
    client: Client,
    api_base: String,
    bucket: String,
    access_token: Option<String>,
}

impl GcsStorage {
    pub fn new(
        api_base: impl Into<String>,
        bucket: impl Into<String>,
        access_token: Option<String>,
    ) -> Result<Self, StorageError> {
        let client = Client::builder()
            .build()
            .map_err(|e| StorageError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.into(),
            bucket: bucket.into(),
            access_token,
        })
    }

    /// `{base}/storage/v1/b/{bucket}/o/{object}?alt=media`, with the object
    /// name encoded as a single path segment.
    fn object_url(&self, filename: &str) -> Result<Url, StorageError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| StorageError::Api(format!("Invalid storage endpoint: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| StorageError::Api("Storage endpoint cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(["storage", "v1", "b", self.bucket.as_str(), "o", filename]);
        url.query_pairs_mut().append_pair("alt", "media");

        Ok(url)
    }
}

#[async_trait]
impl Storage for GcsStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn read_text(&self, filename: &str) -> Result<String, StorageError> {
        let url = self.object_url(filename)?;

        tracing::debug!(bucket = %self.bucket, filename = %filename, "Reading object from GCS");

        let mut request = self.client.get(url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => {
                return Err(StorageError::NotFound(format!(
                    "gs://{}/{}",
                    self.bucket, filename
                )))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(StorageError::PermissionDenied(format!(
                    "gs://{}/{}",
                    self.bucket, filename
                )))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                return Err(StorageError::Api(format!(
                    "GCS returned {}: {}",
                    status, body
                )));
            }
        }

        collect_text(response.bytes_stream(), |e| {
            StorageError::Network(e.to_string())
        })
        .await
    }
}

/// Reads objects from `{base_path}/{bucket}/{filename}` on local disk.
pub struct LocalStorage {
    base_path: PathBuf,
    bucket: String,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            bucket: bucket.into(),
        }
    }

    fn object_path(&self, filename: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(filename);
        let is_plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

        if filename.is_empty() || !is_plain {
            return Err(StorageError::InvalidObjectName(filename.to_string()));
        }

        Ok(self.base_path.join(&self.bucket).join(relative))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn read_text(&self, filename: &str) -> Result<String, StorageError> {
        let path = self.object_path(filename)?;

        // Errors name the object, never the on-disk location.
        let object = format!("{}/{}", self.bucket, filename);
        let file = File::open(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(object),
            std::io::ErrorKind::PermissionDenied => StorageError::PermissionDenied(object),
            _ => StorageError::Io(e),
        })?;

        collect_text(ReaderStream::new(file), StorageError::Io).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collect_text_keeps_chunk_order() {
        let chunks: Vec<Result<&[u8], std::io::Error>> =
            vec![Ok(&b"The quick "[..]), Ok(&b"brown "[..]), Ok(&b"fox"[..])];

        let text = collect_text(futures::stream::iter(chunks), StorageError::Io)
            .await
            .unwrap();

        assert_eq!(text, "The quick brown fox");
    }

    #[tokio::test]
    async fn collect_text_fails_on_mid_stream_error() {
        let chunks: Vec<Result<&[u8], std::io::Error>> = vec![
            Ok(&b"partial"[..]),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
            Ok(&b"never read"[..]),
        ];

        let result = collect_text(futures::stream::iter(chunks), StorageError::Io).await;

        assert!(matches!(result, Err(StorageError::Io(_))));
    }

    #[tokio::test]
    async fn collect_text_joins_split_multibyte_characters() {
        let word = "café".as_bytes();
        let chunks: Vec<Result<&[u8], std::io::Error>> = vec![Ok(&word[..4]), Ok(&word[4..])];

        let text = collect_text(futures::stream::iter(chunks), StorageError::Io)
            .await
            .unwrap();

        assert_eq!(text, "café");
    }

    #[test]
    fn gcs_object_url_encodes_object_name() {
        let storage =
            GcsStorage::new("https://storage.googleapis.com", "demo.appspot.com", None).unwrap();

        let url = storage.object_url("articles/my file.txt").unwrap();

        assert_eq!(
            url.as_str(),
            "https://storage.googleapis.com/storage/v1/b/demo.appspot.com/o/articles%2Fmy%20file.txt?alt=media"
        );
    }

    #[test]
    fn local_storage_rejects_parent_traversal() {
        let storage = LocalStorage::new("storage", "bucket");

        assert!(matches!(
            storage.object_path("../secrets.txt"),
            Err(StorageError::InvalidObjectName(_))
        ));
        assert!(matches!(
            storage.object_path("/etc/passwd"),
            Err(StorageError::InvalidObjectName(_))
        ));
        assert_eq!(
            storage.object_path("notes/a.txt").unwrap(),
            PathBuf::from("storage/bucket/notes/a.txt")
        );
    }
}
