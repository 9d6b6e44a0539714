//! Transformation pipeline errors.

use crate::links::AttachmentError;

/// Fatal pipeline error.
///
/// Non-fatal conditions (unresolvable anchors, malformed panel syntax,
/// unknown code languages) are absorbed by the passes themselves; only
/// failures that would publish a broken page abort the conversion.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TransformError {
    /// An attachment reference could not be resolved during link rewriting.
    #[error("link rewriting failed for image '{path}'")]
    AttachmentResolution {
        /// Local image path as written in the document.
        path: String,
        #[source]
        source: AttachmentError,
    },
}
