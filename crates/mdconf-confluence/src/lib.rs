//! Confluence REST API client and page publisher.
//!
//! Talks to the Confluence Cloud v2 REST API with HTTP Basic authentication
//! and wires the markdown renderer and the storage-format transformation
//! pipeline into a publish flow: ensure the page exists, convert with a live
//! attachment resolver, update the body, then sync properties, labels and
//! explicit attachments.

mod client;
mod error;
mod publisher;
mod types;
mod urls;

pub use client::ConfluenceClient;
pub use error::ConfluenceError;
pub use publisher::{PublishError, PublishOptions, Publisher, simulate};
pub use types::{Attachment, Label, PageInfo, PageProperty, Space};
pub use urls::api_url_from_org;
