//! Publish flow wiring renderer, pipeline and client together.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use mdconf_renderer::{MarkdownRenderer, RenderedPage};
use mdconf_transform::{
    AttachmentError, AttachmentResolver, Document, EditorVersion, Pipeline, PipelineInput,
    PipelineOptions, SourceFormat, TransformError,
};

use crate::client::ConfluenceClient;
use crate::error::ConfluenceError;

/// Body used when a page has to exist before its content is ready.
///
/// Attachment uploads and link rewriting need a page id, so an absent page
/// is first created with this stub and then updated with the real body.
const STUB_BODY: &str = "<p></p>";

/// Error from the publish flow.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// No explicit title and no level-1 heading to derive one from.
    #[error("page title missing; pass a title or start the document with a level-1 heading")]
    MissingTitle,

    /// The configured ancestor page does not exist in the space.
    #[error("parent page not found: {title}")]
    AncestorNotFound { title: String },

    /// Markdown file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Confluence(#[from] ConfluenceError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Settings for one publish run.
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    /// Explicit page title; derived from the first H1 when absent.
    pub title: Option<String>,
    /// Title of the parent page to file the page under.
    pub ancestor: Option<String>,
    pub source_format: SourceFormat,
    pub editor: EditorVersion,
    pub strip_emojis: bool,
    pub prepend_contents: bool,
    /// Labels to ensure on the page.
    pub labels: Vec<String>,
    /// Content properties to set, as key/value pairs.
    pub properties: Vec<(String, String)>,
    /// Extra files to attach, relative to the markdown file.
    pub attachments: Vec<PathBuf>,
}

/// Result of a successful publish.
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    /// Id of the created or updated page.
    pub page_id: String,
    /// Web UI URL of the page.
    pub url: String,
}

/// Publishes one markdown document to a Confluence page.
pub struct Publisher {
    client: ConfluenceClient,
    options: PublishOptions,
}

impl Publisher {
    #[must_use]
    pub fn new(client: ConfluenceClient, options: PublishOptions) -> Self {
        Self { client, options }
    }

    /// Convert and upload the document, creating the page if needed.
    pub fn publish(&self, markdown_file: &Path) -> Result<PublishOutcome, PublishError> {
        let markdown = std::fs::read_to_string(markdown_file)?;
        let rendered = render(&markdown, self.options.title.is_none());
        let title = self.title(&rendered)?;
        let parent_id = self.parent_page_id()?;

        let page = match self.client.find_page(&title)? {
            Some(page) => page,
            None => {
                info!(%title, "page does not exist, creating");
                self.client
                    .create_page(&title, STUB_BODY, parent_id.as_deref())?
            }
        };
        let page_url = page.web_url(self.client.base_url());

        let source_dir = markdown_file.parent().unwrap_or(Path::new(".")).to_owned();
        let mut resolver = PageAttachmentResolver {
            client: &self.client,
            page_id: page.id.clone(),
            page_url: page_url.clone(),
            source_dir: source_dir.clone(),
        };

        let document = Pipeline::new(self.pipeline_options()).run(
            PipelineInput {
                html: &rendered.html,
                markdown: &markdown,
                title: rendered.title.as_deref(),
                headings: &rendered.headings,
            },
            &mut resolver,
        )?;

        let updated = self
            .client
            .update_page(&page, &title, &document.body, parent_id.as_deref())?;

        self.sync_editor_property(&updated.id)?;

        for (key, value) in &self.options.properties {
            self.client
                .set_page_property(&updated.id, key, &serde_json::Value::String(value.clone()))?;
        }

        if !self.options.labels.is_empty() {
            self.client.update_labels(&updated.id, &self.options.labels)?;
        }

        for attachment in &self.options.attachments {
            self.client
                .upload_attachment(&updated.id, &source_dir.join(attachment), "")?;
        }

        info!(page_id = %updated.id, url = %page_url, "publish complete");

        Ok(PublishOutcome {
            page_id: updated.id,
            url: page_url,
        })
    }

    /// Delete the page matching the document's title.
    ///
    /// Returns `false` when no such page exists.
    pub fn delete(&self, markdown_file: &Path) -> Result<bool, PublishError> {
        let markdown = std::fs::read_to_string(markdown_file)?;
        let rendered = render(&markdown, self.options.title.is_none());
        let title = self.title(&rendered)?;

        match self.client.find_page(&title)? {
            Some(page) => {
                self.client.delete_page(&page.id)?;
                Ok(true)
            }
            None => {
                warn!(%title, "page not found, nothing to delete");
                Ok(false)
            }
        }
    }

    fn title(&self, rendered: &RenderedPage) -> Result<String, PublishError> {
        self.options
            .title
            .clone()
            .or_else(|| rendered.title.clone())
            .ok_or(PublishError::MissingTitle)
    }

    fn parent_page_id(&self) -> Result<Option<String>, PublishError> {
        let Some(ancestor) = self.options.ancestor.as_deref() else {
            return Ok(None);
        };
        let page = self
            .client
            .find_page(ancestor)?
            .ok_or_else(|| PublishError::AncestorNotFound {
                title: ancestor.to_owned(),
            })?;
        Ok(Some(page.id))
    }

    fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            source_format: self.options.source_format,
            editor: self.options.editor,
            strip_emojis: self.options.strip_emojis,
            prepend_contents: self.options.prepend_contents,
        }
    }

    /// Pin the page's `editor` property to the requested version.
    fn sync_editor_property(&self, page_id: &str) -> Result<(), PublishError> {
        let value = match self.options.editor {
            EditorVersion::V1 => "v1",
            EditorVersion::V2 => "v2",
        };
        self.client
            .set_page_property(page_id, "editor", &serde_json::Value::String(value.to_owned()))?;
        Ok(())
    }
}

/// Convert a document without any network traffic.
///
/// Local image references are kept as written and anchor links resolve
/// against an empty page URL; everything else matches a real publish.
pub fn simulate(markdown: &str, options: &PublishOptions) -> Result<Document, PublishError> {
    let rendered = render(markdown, options.title.is_none());
    if options.title.is_none() && rendered.title.is_none() {
        return Err(PublishError::MissingTitle);
    }

    let pipeline = Pipeline::new(PipelineOptions {
        source_format: options.source_format,
        editor: options.editor,
        strip_emojis: options.strip_emojis,
        prepend_contents: options.prepend_contents,
    });

    let mut document = pipeline.run(
        PipelineInput {
            html: &rendered.html,
            markdown,
            title: rendered.title.as_deref(),
            headings: &rendered.headings,
        },
        &mut OfflineResolver,
    )?;

    if let Some(title) = &options.title {
        document.title = Some(title.clone());
    }
    Ok(document)
}

fn render(markdown: &str, extract_title: bool) -> RenderedPage {
    let renderer = if extract_title {
        MarkdownRenderer::new().with_title_extraction()
    } else {
        MarkdownRenderer::new()
    };
    renderer.render(markdown)
}

/// Live resolver that uploads local images to the bound page.
struct PageAttachmentResolver<'a> {
    client: &'a ConfluenceClient,
    page_id: String,
    page_url: String,
    source_dir: PathBuf,
}

impl AttachmentResolver for PageAttachmentResolver<'_> {
    fn page_base_url(&self) -> &str {
        &self.page_url
    }

    fn resolve_attachment(&mut self, path: &str) -> Result<String, AttachmentError> {
        let file = self.source_dir.join(path);
        if !file.is_file() {
            return Err(AttachmentError::Missing {
                path: path.to_owned(),
            });
        }
        self.client
            .upload_attachment(&self.page_id, &file, "")
            .map_err(|source| AttachmentError::Upload(Box::new(source)))
    }
}

/// Resolver for simulate mode: no uploads, references kept as written.
struct OfflineResolver;

impl AttachmentResolver for OfflineResolver {
    fn page_base_url(&self) -> &str {
        ""
    }

    fn resolve_attachment(&mut self, path: &str) -> Result<String, AttachmentError> {
        Ok(path.to_owned())
    }
}
