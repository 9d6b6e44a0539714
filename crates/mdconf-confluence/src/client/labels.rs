//! Page label operations.

use serde_json::json;
use tracing::info;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{Label, LabelsResponse};

impl ConfluenceClient {
    /// Labels currently on a page.
    pub fn get_labels(&self, page_id: &str) -> Result<Vec<Label>, ConfluenceError> {
        let url = self.v2_url(&format!("/pages/{page_id}/labels"));
        let response: LabelsResponse = self.get_json(&url)?;
        Ok(response.results)
    }

    /// Add a single label. Label writes only exist in the v1 API.
    pub fn add_label(&self, page_id: &str, name: &str) -> Result<(), ConfluenceError> {
        let url = self.v1_url(&format!("/content/{page_id}/label"));
        let payload = json!({"prefix": "global", "name": name});
        let bytes = serde_json::to_vec(&payload)?;

        info!(label = %name, %page_id, "adding label");

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .send(&bytes[..])?;
        Self::check_status(response)
    }

    /// Add every label not already present on the page.
    pub fn update_labels(&self, page_id: &str, labels: &[String]) -> Result<(), ConfluenceError> {
        let existing = self.get_labels(page_id)?;

        for label in labels {
            if !existing.iter().any(|l| l.name == *label) {
                self.add_label(page_id, label)?;
            }
        }
        Ok(())
    }
}
