//! Attachment operations.

use std::path::Path;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use rand::RngExt as _;
use tracing::info;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{Attachment, AttachmentsResponse};
use crate::urls::attachment_download_path;

impl ConfluenceClient {
    /// Upload or update an attachment (upsert by filename).
    ///
    /// Returns the download path local image references are rewritten to.
    pub fn upload_attachment(
        &self,
        page_id: &str,
        path: &Path,
        comment: &str,
    ) -> Result<String, ConfluenceError> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let data = std::fs::read(path)?;

        let existing = self.find_attachment(page_id, &filename)?;
        let url = if let Some(ref att) = existing {
            info!(%filename, attachment_id = %att.id, "updating existing attachment");
            self.v1_url(&format!(
                "/content/{page_id}/child/attachment/{}/data",
                att.id
            ))
        } else {
            info!(%filename, %page_id, "uploading new attachment");
            self.v1_url(&format!("/content/{page_id}/child/attachment"))
        };

        let boundary = format!("----MdconfFormBoundary{:016x}", rand::rng().random::<u64>());
        let body = multipart_body(&boundary, &filename, &data, content_type_for(path), comment);

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .header("X-Atlassian-Token", "nocheck")
            .header("Accept", "application/json")
            .send(&body[..])?;
        Self::check_status(response)?;

        Ok(attachment_download_path(&self.base_url, page_id, &filename))
    }

    /// Find an attachment on a page by filename.
    pub fn find_attachment(
        &self,
        page_id: &str,
        filename: &str,
    ) -> Result<Option<Attachment>, ConfluenceError> {
        let encoded = utf8_percent_encode(filename, NON_ALPHANUMERIC);
        let url = self.v2_url(&format!("/pages/{page_id}/attachments?filename={encoded}"));
        let response: AttachmentsResponse = self.get_json(&url)?;
        Ok(response.results.into_iter().next())
    }
}

fn multipart_body(
    boundary: &str,
    filename: &str,
    data: &[u8],
    content_type: &str,
    comment: &str,
) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 512);

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");

    if !comment.is_empty() {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"comment\"\r\n\r\n");
        body.extend_from_slice(comment.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        Some("txt" | "md") => "text/plain",
        Some("json") => "application/json",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}
