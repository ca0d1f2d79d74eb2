//! Byte sources for the `report` command: local files or HTTP(S) URLs.

mod basic;

pub use basic::BasicClient;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Request, Response};
use tracing::debug;

/// Anything that can execute a download request for a score sheet.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

/// Returns true when `source` should be downloaded rather than read from disk.
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Downloads `url`, failing on non-success status codes.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// Loads score data from a local file path or fetches it over HTTP.
#[tracing::instrument(skip(source), fields(source = %source))]
pub async fn read_source(source: &str) -> Result<Vec<u8>> {
    let bytes = if is_url(source) {
        let client = BasicClient::new().context("failed to build HTTP client")?;
        fetch_bytes(&client, source)
            .await
            .with_context(|| format!("failed to download {source}"))?
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("failed to read {source}"))?
    };
    debug!(bytes = bytes.len(), "Source loaded");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/students.csv"));
        assert!(is_url("http://localhost:8000/students.xlsx"));
        assert!(!is_url("students.csv"));
        assert!(!is_url("./http/students.csv"));
    }

    #[tokio::test]
    async fn test_read_source_missing_file() {
        let err = read_source("definitely/not/here/students.csv").await.unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[tokio::test]
    async fn test_read_source_local_file() {
        let path = std::env::temp_dir().join("score_rater_test_source.csv");
        std::fs::write(&path, "Name,Math,Science,English\n").unwrap();

        let bytes = read_source(path.to_str().unwrap()).await.unwrap();
        assert!(bytes.starts_with(b"Name,"));

        std::fs::remove_file(&path).unwrap();
    }
}
