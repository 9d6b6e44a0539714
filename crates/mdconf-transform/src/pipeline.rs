//! Pass ordering and document state threading.

use tracing::debug;

use crate::anchors::{AnchorIndex, Heading, SourceFormat};
use crate::code::convert_code_blocks;
use crate::comments::convert_comments;
use crate::emoji::strip_emojis;
use crate::error::TransformError;
use crate::footnotes::convert_footnotes;
use crate::links::{AttachmentResolver, EditorVersion, rewrite_links};
use crate::panels::convert_panels;
use crate::toc::{prepend_contents, replace_markers};

/// Converted page in Confluence storage format.
#[derive(Debug, Clone)]
pub struct Document {
    /// Page title, when the renderer extracted one.
    pub title: Option<String>,
    /// Storage-format XHTML body.
    pub body: String,
}

/// Renderer output handed to the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PipelineInput<'a> {
    /// Generic HTML fragment from the markdown renderer.
    pub html: &'a str,
    /// Raw markdown source, consulted by the TOC pass for markers the
    /// renderer consumed.
    pub markdown: &'a str,
    /// Title extracted by the renderer, if any.
    pub title: Option<&'a str>,
    /// Document headings in source order.
    pub headings: &'a [Heading],
}

/// Conversion switches, one value per document.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub source_format: SourceFormat,
    pub editor: EditorVersion,
    /// Remove emoji code points from the whole document.
    pub strip_emojis: bool,
    /// Prepend a fully parameterized contents macro.
    pub prepend_contents: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            source_format: SourceFormat::Default,
            editor: EditorVersion::V2,
            strip_emojis: false,
            prepend_contents: false,
        }
    }
}

/// Runs the transformation passes in their fixed order.
///
/// Each pass takes the previous pass's output and returns a new string;
/// the anchor index is built once up front and shared read-only by the
/// passes that need it.
#[derive(Debug, Clone)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    #[must_use]
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    /// Convert one rendered document into storage format.
    ///
    /// # Errors
    ///
    /// Returns an error when a local image reference cannot be resolved to
    /// an attachment URL. Unresolvable anchors and unknown code languages
    /// are not errors.
    pub fn run(
        &self,
        input: PipelineInput<'_>,
        resolver: &mut dyn AttachmentResolver,
    ) -> Result<Document, TransformError> {
        let anchors = AnchorIndex::build(input.headings.to_vec());
        debug!(headings = anchors.len(), "anchor index built");

        let mut body = replace_markers(input.html, input.markdown, self.options.editor);
        body = convert_panels(&body);
        body = convert_comments(&body);
        body = convert_code_blocks(&body);
        if self.options.strip_emojis {
            body = strip_emojis(&body);
        }
        if self.options.prepend_contents {
            body = prepend_contents(&body, &anchors);
        }
        body = convert_footnotes(&body);
        body = rewrite_links(
            &body,
            &anchors,
            self.options.source_format,
            self.options.editor,
            resolver,
        )?;

        Ok(Document {
            title: input.title.map(ToOwned::to_owned),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::links::AttachmentError;

    struct NullResolver;

    impl AttachmentResolver for NullResolver {
        fn page_base_url(&self) -> &str {
            "https://example.atlassian.net/wiki/spaces/DOC/pages/7/Guide"
        }

        fn resolve_attachment(&mut self, path: &str) -> Result<String, AttachmentError> {
            Ok(format!("/download/attachments/7/{path}"))
        }
    }

    fn heading(level: u8, text: &str, index: usize) -> Heading {
        Heading {
            level,
            text: text.to_owned(),
            index,
        }
    }

    fn run(html: &str, markdown: &str, headings: &[Heading], options: PipelineOptions) -> Document {
        Pipeline::new(options)
            .run(
                PipelineInput {
                    html,
                    markdown,
                    title: Some("Guide"),
                    headings,
                },
                &mut NullResolver,
            )
            .unwrap()
    }

    #[test]
    fn test_full_document_conversion() {
        let headings = [heading(1, "Setup", 0)];
        let html = "<p>[TOC]</p>\
                    <h1>Setup</h1>\
                    <blockquote><p>Warning: mind the gap</p></blockquote>\
                    <!-- internal note -->\
                    <pre><code class=\"language-sh\">make install</code></pre>\
                    <p><a href=\"#setup\">back to setup</a></p>";
        let doc = run(html, "", &headings, PipelineOptions::default());

        assert_eq!(doc.title.as_deref(), Some("Guide"));
        assert!(doc.body.contains("ac:name=\"toc-zone\""));
        assert!(doc.body.contains("ac:name=\"warning\""));
        assert!(doc.body.contains("<ac:rich-text-body><p>mind the gap</p></ac:rich-text-body>"));
        assert!(doc.body.contains("<ac:placeholder> internal note </ac:placeholder>"));
        assert!(doc.body.contains("<ac:parameter ac:name=\"language\">sh</ac:parameter>"));
        assert!(doc.body.contains("#setup\" title=\"back to setup\""));
    }

    #[test]
    fn test_conversion_is_idempotent() {
        let headings = [heading(1, "Only", 0)];
        let html = "<p>[TOC]</p><h1>Only</h1>";
        let once = run(html, "[TOC]\n\n# Only", &headings, PipelineOptions::default());
        let twice = run(&once.body, "", &headings, PipelineOptions::default());
        assert_eq!(once.body, twice.body);
    }

    #[test]
    fn test_emoji_option_strips() {
        let doc = run(
            "<p>Hello \u{1F600} World</p>",
            "",
            &[],
            PipelineOptions {
                strip_emojis: true,
                ..PipelineOptions::default()
            },
        );
        assert_eq!(doc.body, "<p>Hello  World</p>");
    }

    #[test]
    fn test_emoji_kept_by_default() {
        let doc = run("<p>Hello \u{1F600}</p>", "", &[], PipelineOptions::default());
        assert_eq!(doc.body, "<p>Hello \u{1F600}</p>");
    }

    #[test]
    fn test_contents_option_prepends() {
        let doc = run(
            "<h1>A</h1>",
            "# A",
            &[heading(1, "A", 0)],
            PipelineOptions {
                prepend_contents: true,
                ..PipelineOptions::default()
            },
        );
        assert!(doc.body.starts_with("<ac:structured-macro ac:name=\"toc\""));
        assert!(doc.body.contains("rm-contents"));
    }

    #[test]
    fn test_doctoc_consumed_before_comment_pass() {
        let html = "<!-- START doctoc -->\
                    <ul><li>old toc</li></ul>\
                    <!-- END doctoc -->\
                    <h1>A</h1>";
        let doc = run(html, "", &[heading(1, "A", 0)], PipelineOptions::default());
        // The doctoc pair becomes a TOC macro, not a pair of placeholders.
        assert!(doc.body.contains("ac:name=\"toc-zone\""));
        assert!(!doc.body.contains("ac:placeholder"));
    }

    #[test]
    fn test_v1_editor_link_markup() {
        let doc = run(
            "<h1>Setup</h1><p><a href=\"#setup\">go</a></p>",
            "",
            &[heading(1, "Setup", 0)],
            PipelineOptions {
                editor: EditorVersion::V1,
                ..PipelineOptions::default()
            },
        );
        assert!(doc.body.contains("<ac:link ac:anchor=\"setup\">"));
        assert!(doc.body.contains("<![CDATA[go]]>"));
    }

    #[test]
    fn test_code_inside_panel_converted() {
        // The panel pass runs before the code pass and keeps its body
        // verbatim, so a fenced block inside a blockquote still converts.
        let html = "<blockquote><p>Note: run this</p>\
                    <pre><code class=\"language-sh\">ls</code></pre></blockquote>";
        let doc = run(html, "", &[], PipelineOptions::default());
        assert!(doc.body.contains("ac:name=\"note\""));
        assert!(doc.body.contains("<ac:parameter ac:name=\"language\">sh</ac:parameter>"));
    }

    #[test]
    fn test_anchor_markup_in_code_sample_not_rewritten() {
        // An HTML sample inside a fenced block stays sample text even when
        // its fragment matches a real heading.
        let html = "<h1>Setup</h1>\
                    <pre><code class=\"language-html\">\
                    &lt;a href=\"#setup\"&gt;x&lt;/a&gt;</code></pre>\
                    <p><a href=\"#setup\">go</a></p>";
        let doc = run(html, "", &[heading(1, "Setup", 0)], PipelineOptions::default());
        assert!(doc.body.contains("<![CDATA[<a href=\"#setup\">x</a>]]>"));
        assert!(doc.body.contains("#setup\" title=\"go\">go</a>"));
    }

    #[test]
    fn test_title_absent_passes_through() {
        let doc = Pipeline::new(PipelineOptions::default())
            .run(
                PipelineInput {
                    html: "<p>x</p>",
                    markdown: "x",
                    title: None,
                    headings: &[],
                },
                &mut NullResolver,
            )
            .unwrap();
        assert_eq!(doc.title, None);
        assert_eq!(doc.body, "<p>x</p>");
    }
}
