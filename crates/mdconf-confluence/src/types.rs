//! Confluence v2 API types.
//!
//! The v2 API carries numeric ids as JSON strings; they stay strings here
//! and are only interpolated into URLs and payloads.

use serde::Deserialize;

/// Confluence space.
#[derive(Debug, Clone, Deserialize)]
pub struct Space {
    /// Space ID.
    pub id: String,
    /// Space home page ID.
    #[serde(rename = "homepageId", default)]
    pub homepage_id: Option<String>,
}

/// Spaces API response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SpacesResponse {
    pub results: Vec<Space>,
}

/// Page lookup result.
#[derive(Debug, Clone, Deserialize)]
pub struct PageInfo {
    /// Page ID.
    pub id: String,
    /// Owning space ID.
    #[serde(rename = "spaceId", default)]
    pub space_id: Option<String>,
    /// Version information.
    pub version: Version,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

impl PageInfo {
    /// Web UI URL for the page, joined onto the API base URL.
    #[must_use]
    pub fn web_url(&self, base_url: &str) -> String {
        match self.links.as_ref().and_then(|links| links.webui.as_deref()) {
            Some(webui) => format!("{base_url}{webui}"),
            None => format!("{base_url}/pages/{}", self.id),
        }
    }
}

/// Page version.
#[derive(Debug, Clone, Deserialize)]
pub struct Version {
    /// Version number.
    pub number: u32,
}

/// Hypermedia links.
#[derive(Debug, Clone, Deserialize)]
pub struct Links {
    /// Web UI link.
    #[serde(default)]
    pub webui: Option<String>,
}

/// Pages API response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PagesResponse {
    pub results: Vec<PageInfo>,
}

/// Confluence attachment.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    /// Attachment ID.
    pub id: String,
    /// Attachment title/filename.
    #[serde(default)]
    pub title: String,
}

/// Attachments API response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AttachmentsResponse {
    pub results: Vec<Attachment>,
}

/// Page content property.
#[derive(Debug, Clone, Deserialize)]
pub struct PageProperty {
    /// Property ID.
    pub id: String,
    /// Property key.
    pub key: String,
    /// Property value.
    pub value: serde_json::Value,
    /// Property version.
    pub version: Version,
}

/// Properties API response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PropertiesResponse {
    pub results: Vec<PageProperty>,
}

/// Page label.
#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    /// Label name.
    pub name: String,
    /// Label prefix, usually `global`.
    #[serde(default)]
    pub prefix: Option<String>,
}

/// Labels API response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LabelsResponse {
    pub results: Vec<Label>,
}
