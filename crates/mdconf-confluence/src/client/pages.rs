//! Page operations.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::json;
use tracing::{debug, info};

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{PageInfo, PagesResponse, SpacesResponse};

impl ConfluenceClient {
    /// Numeric id of the configured space, cached after the first lookup.
    pub fn space_id(&self) -> Result<String, ConfluenceError> {
        if let Some(id) = self.space_id.get() {
            return Ok(id.clone());
        }

        let url = self.v2_url(&format!("/spaces?keys={}", self.space_key));
        let response: SpacesResponse = self.get_json(&url)?;

        let space = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ConfluenceError::SpaceNotFound {
                key: self.space_key.clone(),
            })?;

        debug!(space_id = %space.id, key = %self.space_key, "resolved space");
        let _ = self.space_id.set(space.id.clone());
        Ok(space.id)
    }

    /// Look up a page by title within the space.
    ///
    /// An absent page is `Ok(None)`; only transport and server errors fail.
    pub fn find_page(&self, title: &str) -> Result<Option<PageInfo>, ConfluenceError> {
        let space_id = self.space_id()?;
        let encoded = utf8_percent_encode(title, NON_ALPHANUMERIC);
        let url = self.v2_url(&format!("/spaces/{space_id}/pages?title={encoded}"));

        info!(%title, "retrieving page information");

        let response: PagesResponse = self.get_json(&url)?;
        Ok(response.results.into_iter().next())
    }

    /// Create a new page in the space.
    pub fn create_page(
        &self,
        title: &str,
        body: &str,
        parent_id: Option<&str>,
    ) -> Result<PageInfo, ConfluenceError> {
        let space_id = self.space_id()?;
        let url = self.v2_url("/pages");

        let mut payload = json!({
            "title": title,
            "spaceId": space_id,
            "status": "current",
            "body": {"value": body, "representation": "storage"},
        });
        if let Some(parent) = parent_id {
            payload["parentId"] = json!(parent);
        }

        info!(%title, "creating page");

        let page: PageInfo = self.post_json(&url, &payload)?;
        info!(page_id = %page.id, "page created");
        Ok(page)
    }

    /// Update an existing page (auto-increments the version).
    pub fn update_page(
        &self,
        page: &PageInfo,
        title: &str,
        body: &str,
        parent_id: Option<&str>,
    ) -> Result<PageInfo, ConfluenceError> {
        let url = self.v2_url(&format!("/pages/{}", page.id));
        let next_version = page.version.number + 1;

        let mut payload = json!({
            "id": page.id,
            "type": "page",
            "title": title,
            "spaceId": self.space_id()?,
            "status": "current",
            "body": {"value": body, "representation": "storage"},
            "version": {"number": next_version, "minorEdit": true},
        });
        if let Some(parent) = parent_id {
            payload["parentId"] = json!(parent);
        }

        info!(page_id = %page.id, version = next_version, "updating page");

        self.put_json(&url, &payload)
    }

    /// Delete a page.
    pub fn delete_page(&self, page_id: &str) -> Result<(), ConfluenceError> {
        let url = self.v2_url(&format!("/pages/{page_id}"));

        info!(%page_id, "deleting page");

        let response = self
            .agent
            .delete(&url)
            .header("Authorization", &self.auth_header)
            .call()?;
        Self::check_status(response)
    }
}
