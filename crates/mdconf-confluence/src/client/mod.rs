//! Confluence REST API client.
//!
//! Sync HTTP client for the Confluence Cloud v2 REST API with HTTP Basic
//! authentication. Attachment and label writes go through the v1
//! (`rest/api`) endpoints the v2 API does not cover.

mod attachments;
mod labels;
mod pages;
mod properties;

use std::cell::OnceCell;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;
use ureq::Agent;

use crate::error::ConfluenceError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Confluence REST API client, scoped to one space.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    auth_header: String,
    space_key: String,
    space_id: OnceCell<String>,
}

impl ConfluenceClient {
    /// Create a client with Basic authentication.
    #[must_use]
    pub fn new(base_url: &str, username: &str, api_key: &str, space_key: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        let credentials = STANDARD.encode(format!("{username}:{api_key}"));

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth_header: format!("Basic {credentials}"),
            space_key: space_key.to_owned(),
            space_id: OnceCell::new(),
        }
    }

    /// The API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The configured space key.
    pub fn space_key(&self) -> &str {
        &self.space_key
    }

    fn v2_url(&self, path: &str) -> String {
        format!("{}/api/v2{path}", self.base_url)
    }

    fn v1_url(&self, path: &str) -> String {
        format!("{}/rest/api{path}", self.base_url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ConfluenceError> {
        let response = self
            .agent
            .get(url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;
        Self::check_json(response)
    }

    fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<T, ConfluenceError> {
        let bytes = serde_json::to_vec(payload)?;
        let response = self
            .agent
            .post(url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&bytes[..])?;
        Self::check_json(response)
    }

    fn put_json<T: DeserializeOwned>(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<T, ConfluenceError> {
        let bytes = serde_json::to_vec(payload)?;
        let response = self
            .agent
            .put(url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&bytes[..])?;
        Self::check_json(response)
    }

    /// Read a JSON body, mapping error statuses to `HttpResponse`.
    fn check_json<T: DeserializeOwned>(
        response: ureq::http::Response<ureq::Body>,
    ) -> Result<T, ConfluenceError> {
        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ConfluenceError::HttpResponse {
                status,
                body: error_body,
            });
        }

        Ok(body.read_json()?)
    }

    /// Check a response status, discarding the body.
    fn check_status(response: ureq::http::Response<ureq::Body>) -> Result<(), ConfluenceError> {
        let status = response.status().as_u16();
        if status >= 400 {
            let error_body = response
                .into_body()
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ConfluenceError::HttpResponse {
                status,
                body: error_body,
            });
        }
        Ok(())
    }
}
