/// Per-image extraction errors.
/// Use code-style identifiers for all error variants for i18n compatibility.
///
/// None of these abort a batch: each one ends up as a failure outcome at the
/// index of the image that produced it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("extraction.backend_unavailable")]
    BackendUnavailable,
    #[error("extraction.malformed_response")]
    MalformedResponse,
    #[error("extraction.no_result_returned")]
    NoResultReturned,
    #[error("extraction.cancelled")]
    Cancelled,
    #[error("extraction.unit_panicked")]
    UnitPanicked,
    #[error("extraction.empty_image")]
    EmptyImage,
    #[error("extraction.unsupported_content_type")]
    UnsupportedContentType,
}

/// Batch preconditions, checked before any extraction is launched.
///
/// Problems with a single image are never batch errors; they become a
/// failure outcome at that image's index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    #[error("batch.too_many_images")]
    TooManyImages { count: usize, max: usize },
}
