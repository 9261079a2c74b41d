//! HTTP client for the activity backend.
//!
//! Wraps the backend's REST API: the activities endpoint for summary and
//! detail fetches, and the server registry endpoint for add/remove.

use std::time::Duration;

use indexmap::IndexMap;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;

use crate::data::record::{decode_snapshot, flatten_recent, ActivityRecord, ActivitySnapshot};

/// Errors from talking to the activity backend.
///
/// None of these are fatal: a failed refresh is logged and surfaced in
/// the status line, and the next countdown fire retries naturally.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured backend URL is not valid.
    #[error("invalid backend URL: {0}")]
    BadUrl(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("request timed out")]
    Timeout,

    /// The backend answered with a non-success status.
    #[error("backend returned status {0}")]
    Status(StatusCode),

    /// Failed to parse response.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

/// Client for the activity backend's REST API.
#[derive(Debug, Clone)]
pub struct ActivityClient {
    client: Client,
    base: String,
}

impl ActivityClient {
    /// Create a client for the given base URL (e.g.
    /// `http://localhost:8080`). The URL is validated up front; the
    /// timeout applies to every request.
    pub fn new(base: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base = base.trim_end_matches('/').to_string();
        Url::parse(&base).map_err(|e| ClientError::BadUrl(e.to_string()))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Ok(Self { client, base })
    }

    /// The backend base URL, for display.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Fetch activity samples for the chart and server list, capped at
    /// `max_data_points` per series, optionally filtered to one server.
    pub async fn fetch_activities(
        &self,
        max_data_points: u32,
        server: Option<&str>,
    ) -> Result<ActivitySnapshot, ClientError> {
        let url = self.activities_url(
            &[("maxDataPoints", max_data_points.to_string())],
            server,
        )?;
        let entries = self.get_json(url).await?;
        Ok(decode_snapshot(entries))
    }

    /// Fetch recent samples for the activity table, newest first,
    /// row-limited, optionally filtered to one server.
    pub async fn fetch_recent(
        &self,
        limit: u32,
        server: Option<&str>,
    ) -> Result<Vec<ActivityRecord>, ClientError> {
        let url = self.activities_url(&[("limit", limit.to_string())], server)?;
        let entries = self.get_json(url).await?;
        Ok(flatten_recent(decode_snapshot(entries)))
    }

    /// Register a server with the backend. The body is the raw id.
    pub async fn add_server(&self, server: &str) -> Result<(), ClientError> {
        let url = self.server_url()?;
        let response = self.client.post(url).body(server.to_string()).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }
        Ok(())
    }

    /// Remove a server from the backend registry.
    pub async fn remove_server(&self, server: &str) -> Result<(), ClientError> {
        let url = self.server_url()?;
        let response = self.client.delete(url).body(server.to_string()).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }
        Ok(())
    }

    fn activities_url(
        &self,
        params: &[(&str, String)],
        server: Option<&str>,
    ) -> Result<Url, ClientError> {
        let mut url = Url::parse(&format!("{}/rest/activities", self.base))
            .map_err(|e| ClientError::BadUrl(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
            if let Some(server) = server {
                pairs.append_pair("server", server);
            }
        }
        Ok(url)
    }

    fn server_url(&self) -> Result<Url, ClientError> {
        Url::parse(&format!("{}/rest/server", self.base))
            .map_err(|e| ClientError::BadUrl(e.to_string()))
    }

    /// Fetch JSON as an insertion-ordered map so backend document order
    /// (first-seen server order) survives into the snapshot.
    async fn get_json(&self, url: Url) -> Result<IndexMap<String, Value>, ClientError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }
        let entries = response.json().await.map_err(|e| ClientError::Parse(e.to_string()))?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ActivityClient {
        ActivityClient::new("http://localhost:8080", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_url() {
        let err = ActivityClient::new("not a url", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, ClientError::BadUrl(_)));
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let client =
            ActivityClient::new("http://localhost:8080/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base(), "http://localhost:8080");
    }

    #[test]
    fn test_activities_url_unfiltered() {
        let url = client()
            .activities_url(&[("maxDataPoints", "30".to_string())], None)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/rest/activities?maxDataPoints=30"
        );
    }

    #[test]
    fn test_activities_url_encodes_server_filter() {
        let url = client()
            .activities_url(&[("limit", "200".to_string())], Some("play.example.net:25565"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/rest/activities?limit=200&server=play.example.net%3A25565"
        );
    }

    #[test]
    fn test_server_url() {
        let url = client().server_url().unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/rest/server");
    }
}
