//! Confluence storage format transformation pipeline.
//!
//! Takes the HTML fragment produced by a generic markdown renderer and
//! rewrites it into Confluence storage-format XHTML through an ordered
//! sequence of passes:
//!
//! 1. Table-of-contents marker replacement (`[TOC]`, doctoc comments)
//! 2. Panel conversion (tilde markers, GitHub alerts, keyword blockquotes)
//! 3. HTML comments to hidden placeholders
//! 4. Fenced code blocks to Confluence code macros
//! 5. Optional emoji stripping
//! 6. Optional full table-of-contents prepend
//! 7. Footnote normalization
//! 8. Anchor link and attachment reference rewriting
//!
//! The pass order is fixed: marker replacement must see doctoc comments
//! before they become placeholders, and link rewriting consumes the anchor
//! index built from the document's headings before any pass runs.
//!
//! # Example
//!
//! ```ignore
//! use mdconf_transform::{Pipeline, PipelineInput, PipelineOptions};
//!
//! let pipeline = Pipeline::new(PipelineOptions::default());
//! let document = pipeline.run(input, &mut resolver)?;
//! ```

mod anchors;
mod code;
mod comments;
mod emoji;
mod error;
mod footnotes;
mod links;
mod panels;
mod pipeline;
mod toc;

pub use anchors::{AnchorIndex, Heading, SourceFormat, slugify};
pub use error::TransformError;
pub use links::{AttachmentError, AttachmentResolver, EditorVersion};
pub use pipeline::{Document, Pipeline, PipelineInput, PipelineOptions};
