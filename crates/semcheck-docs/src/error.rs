#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("bad document source {location:?}: {reason}")]
    BadSource { location: String, reason: String },

    #[error("unknown document type for {location}")]
    UnknownDocumentType { location: String },

    #[error("no parser for {kind} document {location}")]
    NoDocumentParser { location: String, kind: String },

    #[error("local file has no extension: {location}")]
    LocalFileNoExtension { location: String },

    #[error("anchor {anchor:?} not supported on unstructured document")]
    AnchorNotSupportedOnUnstructuredDocument { anchor: String },

    /// Local read error, or remote network/timeout error or non-2xx status.
    #[error("failed to fetch {location}: {reason}")]
    FetchFailed {
        location: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("response body for {location} exceeds {limit} bytes")]
    BodyTooLarge { location: String, limit: usize },

    #[error("failed to parse {location}: {reason}")]
    ParseFailed { location: String, reason: String },

    #[error("collection of {location} cancelled")]
    Cancelled { location: String },
}

pub type Result<T> = std::result::Result<T, DocumentError>;
