//! Fetcher loading resources over HTTP(S) or from local files.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, trace};

use crate::domain::entities::MediaType;
use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::ports::{FetchOptions, FetchedResource, ResourceFetcher};

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("{}/{}", crate::NAME, crate::VERSION),
        }
    }
}

/// [`ResourceFetcher`] backed by a shared [`reqwest::Client`].
///
/// `file:` locators are read from the local filesystem, with the content
/// type inferred from the file extension.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    config: FetcherConfig,
}

impl HttpFetcher {
    /// Creates a new fetcher with the given configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: FetcherConfig) -> CacheResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| CacheError::io(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Creates a fetcher with default configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn with_defaults() -> CacheResult<Self> {
        Self::new(FetcherConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Downloads resource bytes from a URL.
    async fn download(&self, url: &Url, options: &FetchOptions) -> CacheResult<FetchedResource> {
        let mut request = self.client.get(url.clone());
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CacheError::fetch(url.as_str(), format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(CacheError::fetch(
                url.as_str(),
                format!(
                    "HTTP {}: {}",
                    response.status().as_u16(),
                    response.status().canonical_reason().unwrap_or("Unknown")
                ),
            ));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let data = response
            .bytes()
            .await
            .map_err(|e| CacheError::fetch(url.as_str(), format!("Failed to read body: {e}")))?;

        debug!(url = %url, size = data.len(), content_type = ?content_type, "Downloaded resource");
        Ok(FetchedResource { data, content_type })
    }

    /// Reads a local file addressed by a `file:` URL.
    async fn read_local(url: &Url) -> CacheResult<FetchedResource> {
        let path = url
            .to_file_path()
            .map_err(|()| CacheError::fetch(url.as_str(), "Not a local file path"))?;

        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| CacheError::fetch(url.as_str(), format!("Failed to read file: {e}")))?;

        let content_type = infer_content_type(&path);
        trace!(path = %path.display(), size = data.len(), "Read local resource");
        Ok(FetchedResource {
            data: data.into(),
            content_type,
        })
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, options: &FetchOptions) -> CacheResult<FetchedResource> {
        match url.scheme() {
            "http" | "https" => self.download(url, options).await,
            "file" => Self::read_local(url).await,
            other => Err(CacheError::fetch(
                url.as_str(),
                format!("Unsupported scheme: {other}"),
            )),
        }
    }
}

fn infer_content_type(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(MediaType::from_extension)
        .map(|media| media.mime_type().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves a single canned HTTP response and returns the request head.
    async fn serve_once(response: &'static str) -> (Url, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&buf[..n]).into_owned()
        });
        let url = Url::parse(&format!("http://{addr}/photo.png")).unwrap();
        (url, handle)
    }

    #[tokio::test]
    async fn test_download_reports_content_type() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: 3\r\nConnection: close\r\n\r\nabc",
        )
        .await;
        let fetcher = HttpFetcher::with_defaults().unwrap();
        let options = FetchOptions {
            headers: vec![("X-Test".to_string(), "yes".to_string())],
            timeout: Some(Duration::from_secs(5)),
        };

        let fetched = fetcher.fetch(&url, &options).await.unwrap();

        assert_eq!(fetched.data.as_ref(), b"abc");
        assert_eq!(fetched.content_type.as_deref(), Some("image/png"));
        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(request.contains("x-test: yes"));
        assert!(request.contains("user-agent: mediacache/"));
    }

    #[tokio::test]
    async fn test_download_non_success_status() {
        let (url, _server) = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let fetcher = HttpFetcher::with_defaults().unwrap();

        let err = fetcher
            .fetch(&url, &FetchOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err, CacheError::fetch(url.as_str(), "HTTP 404: Not Found"));
    }

    #[tokio::test]
    async fn test_reads_local_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cat.JPG");
        std::fs::write(&path, b"jpeg bytes").unwrap();
        let url = Url::from_file_path(&path).unwrap();

        let fetched = HttpFetcher::with_defaults()
            .unwrap()
            .fetch(&url, &FetchOptions::default())
            .await
            .unwrap();

        assert_eq!(fetched.data.as_ref(), b"jpeg bytes");
        assert_eq!(fetched.content_type.as_deref(), Some("image/jpeg"));
    }

    #[tokio::test]
    async fn test_missing_local_file_fails() {
        let temp = TempDir::new().unwrap();
        let url = Url::from_file_path(temp.path().join("absent.png")).unwrap();

        let err = HttpFetcher::with_defaults()
            .unwrap()
            .fetch(&url, &FetchOptions::default())
            .await
            .unwrap_err();

        assert!(err.is_fetch_error());
    }

    #[tokio::test]
    async fn test_unsupported_scheme() {
        let url = Url::parse("ftp://example.com/a.png").unwrap();
        let err = HttpFetcher::with_defaults()
            .unwrap()
            .fetch(&url, &FetchOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, CacheError::FetchFailed { .. }));
    }

    #[test]
    fn test_infer_content_type() {
        assert_eq!(
            infer_content_type(Path::new("clip.webm")).as_deref(),
            Some("video/webm")
        );
        assert_eq!(infer_content_type(Path::new("notes.txt")), None);
        assert_eq!(infer_content_type(Path::new("noext")), None);
    }
}
