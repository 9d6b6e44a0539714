//! Page content property operations.
//!
//! Properties drive editor behavior: the `editor` property pins a page to
//! the legacy (`v1`) or new (`v2`) editor.

use serde_json::json;
use tracing::{debug, info};

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{PageProperty, PropertiesResponse};

impl ConfluenceClient {
    /// All content properties of a page.
    pub fn get_page_properties(&self, page_id: &str) -> Result<Vec<PageProperty>, ConfluenceError> {
        let url = self.v2_url(&format!("/pages/{page_id}/properties"));
        let response: PropertiesResponse = self.get_json(&url)?;
        Ok(response.results)
    }

    /// Set a content property, creating or updating as needed.
    ///
    /// Returns `false` when the property already holds the value and no
    /// request was made.
    pub fn set_page_property(
        &self,
        page_id: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<bool, ConfluenceError> {
        let existing = self
            .get_page_properties(page_id)?
            .into_iter()
            .find(|prop| prop.key == key);

        match existing {
            Some(prop) if prop.value == *value => {
                debug!(%key, "property already up to date");
                Ok(false)
            }
            Some(prop) => {
                let url = self.v2_url(&format!("/pages/{page_id}/properties/{}", prop.id));
                let payload = json!({
                    "page-id": page_id,
                    "property-id": prop.id,
                    "key": key,
                    "value": value,
                    "version": {"number": prop.version.number + 1, "minorEdit": true},
                });
                info!(%key, %value, %page_id, "updating page property");
                let _: serde_json::Value = self.put_json(&url, &payload)?;
                Ok(true)
            }
            None => {
                let url = self.v2_url(&format!("/pages/{page_id}/properties"));
                let payload = json!({
                    "page-id": page_id,
                    "key": key,
                    "value": value,
                    "version": {"number": 1, "minorEdit": true},
                });
                info!(%key, %value, %page_id, "adding page property");
                let _: serde_json::Value = self.post_json(&url, &payload)?;
                Ok(true)
            }
        }
    }
}
