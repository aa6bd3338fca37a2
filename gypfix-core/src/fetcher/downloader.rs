//! Streaming release downloader with progress callbacks.
//!
//! The body is streamed with reqwest straight to disk. The caller supplies a
//! progress callback; rate limiting is the callback's business (see
//! `progress::ProgressReporter`).

use futures::StreamExt;
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::error::FetchError;

// ============================================================================
// Download Progress
// ============================================================================

/// Progress information during a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Bytes downloaded so far.
    pub bytes_downloaded: u64,
    /// Total bytes expected (if known from Content-Length header).
    pub total_bytes: Option<u64>,
}

impl DownloadProgress {
    fn new(bytes_downloaded: u64, total_bytes: Option<u64>) -> Self {
        Self {
            bytes_downloaded,
            total_bytes,
        }
    }
}

// ============================================================================
// Download Function
// ============================================================================

/// Downloads a file from a URL with streaming and progress reporting.
///
/// # Arguments
///
/// * `url` - The URL to download from.
/// * `dest` - The destination file path.
/// * `expected_sha256` - Optional SHA256 hash to verify (lowercase hex string).
/// * `progress_cb` - A callback invoked after every received chunk.
///
/// # Returns
///
/// The total number of bytes downloaded.
///
/// # Errors
///
/// Returns an error if:
/// - The network request fails.
/// - The server returns a non-success status code.
/// - The file cannot be created or written.
/// - The SHA256 checksum does not match (if provided).
pub async fn download_file<F>(
    url: &str,
    dest: &Path,
    expected_sha256: Option<&str>,
    progress_cb: F,
) -> Result<u64, FetchError>
where
    F: FnMut(DownloadProgress),
{
    download_with_client(&reqwest::Client::new(), url, dest, expected_sha256, progress_cb).await
}

/// Same as [`download_file`], using a caller-provided HTTP client.
pub async fn download_with_client<F>(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    expected_sha256: Option<&str>,
    mut progress_cb: F,
) -> Result<u64, FetchError>
where
    F: FnMut(DownloadProgress),
{
    info!("Downloading {} to {}", url, dest.display());

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            status: status.as_u16(),
            reason: status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
        });
    }

    let total_bytes = response.content_length();
    debug!("Content-Length: {:?}", total_bytes);

    let mut file = File::create(dest).await?;

    let mut stream = response.bytes_stream();
    let mut bytes_downloaded: u64 = 0;
    let mut hasher = Sha256::new();

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result?;

        hasher.update(&chunk);
        file.write_all(&chunk).await?;

        bytes_downloaded += chunk.len() as u64;
        progress_cb(DownloadProgress::new(bytes_downloaded, total_bytes));
    }

    file.flush().await?;

    if let Some(expected) = expected_sha256 {
        let actual = format_sha256_hex(&hasher.finalize());
        if actual != expected.to_lowercase() {
            let _ = tokio::fs::remove_file(dest).await;
            return Err(FetchError::ChecksumMismatch {
                expected: expected.to_string(),
                actual,
            });
        }
        debug!("SHA256 verified: {}", actual);
    }

    info!(
        "Download complete: {} bytes written to {}",
        bytes_downloaded,
        dest.display()
    );

    Ok(bytes_downloaded)
}

/// Formats a SHA256 hash as lowercase hex.
fn format_sha256_hex(hash: &[u8]) -> String {
    hash.iter().map(|b| format!("{:02x}", b)).collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_server::local_client;

    #[test]
    fn test_format_sha256_hex() {
        let empty_hash = Sha256::digest(b"");
        assert_eq!(
            format_sha256_hex(&empty_hash),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[tokio::test]
    async fn test_download_writes_file_and_reports_progress() {
        let body: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        let url = test_server::serve_once("200 OK", body.clone(), "archive.tar.gz").await;

        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("nested").join("archive.tar.gz");

        let mut seen = Vec::new();
        let bytes = download_with_client(&local_client(), &url, &dest, None, |p| seen.push(p))
            .await
            .unwrap();

        assert_eq!(bytes, body.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), body);
        let last = seen.last().unwrap();
        assert_eq!(last.bytes_downloaded, body.len() as u64);
        assert_eq!(last.total_bytes, Some(body.len() as u64));
        assert!(seen
            .windows(2)
            .all(|w| w[0].bytes_downloaded <= w[1].bytes_downloaded));
    }

    #[tokio::test]
    async fn test_download_verifies_checksum() {
        let body = b"release bytes".to_vec();
        let expected = format_sha256_hex(&Sha256::digest(&body));
        let url = test_server::serve_once("200 OK", body, "ok.zip").await;

        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("ok.zip");
        download_with_client(&local_client(), &url, &dest, Some(&expected.to_uppercase()), |_| {})
            .await
            .unwrap();
        assert!(dest.exists());
    }

    #[tokio::test]
    async fn test_download_checksum_mismatch_removes_file() {
        let url = test_server::serve_once("200 OK", b"tampered".to_vec(), "bad.zip").await;

        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("bad.zip");
        let err = download_with_client(&local_client(), &url, &dest, Some("00"), |_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::ChecksumMismatch { .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_download_http_error_is_fatal() {
        let url = test_server::serve_once("404 Not Found", Vec::new(), "missing.zip").await;

        let temp_dir = TempDir::new().unwrap();
        let err = download_with_client(
            &local_client(),
            &url,
            &temp_dir.path().join("missing.zip"),
            None,
            |_| {},
        )
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::HttpStatus { status: 404, .. }));
    }
}
