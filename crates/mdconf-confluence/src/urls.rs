//! URL construction helpers.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters unsafe in a URL path segment, encoded in attachment filenames.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Build the Confluence API base URL from an organisation name.
///
/// A name containing a dot is treated as a fully qualified host; anything
/// else expands to the Atlassian cloud wiki domain.
#[must_use]
pub fn api_url_from_org(org_name: &str, use_ssl: bool) -> String {
    let scheme = if use_ssl { "https" } else { "http" };
    if org_name.contains('.') {
        format!("{scheme}://{org_name}")
    } else {
        format!("{scheme}://{org_name}.atlassian.net/wiki")
    }
}

/// Download path for a page attachment.
///
/// Cloud instances serve downloads under `/wiki`; the prefix is carried
/// only when the API URL itself ends in `/wiki`.
#[must_use]
pub(crate) fn attachment_download_path(base_url: &str, page_id: &str, filename: &str) -> String {
    let encoded = utf8_percent_encode(filename, PATH_SEGMENT);
    if base_url.ends_with("/wiki") {
        format!("/wiki/download/attachments/{page_id}/{encoded}")
    } else {
        format!("/download/attachments/{page_id}/{encoded}")
    }
}
