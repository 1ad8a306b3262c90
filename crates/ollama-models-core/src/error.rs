#[derive(Debug, thiserror::Error)]
pub enum OmError {
    /// A size tag with no recognized numeric+unit form. Soft: the caller
    /// drops the offending size from numeric consideration.
    #[error("malformed size tag: {0:?}")]
    MalformedSize(String),

    /// A pull-count string with an unrecognized suffix. Soft: the record
    /// is excluded from popularity-based predicates only.
    #[error("malformed pull count: {0:?}")]
    MalformedPopularity(String),

    /// An update-filter expression matching neither the relative nor the
    /// absolute grammar. Fatal: the whole query is rejected.
    #[error("malformed date expression: {0:?} (expected since:/after:/before: with '<n> <unit> ago' or YYYY-MM-DD)")]
    MalformedDateExpression(String),

    /// A timestamp that is not in canonical `YYYY-MM-DD HH:MM:SS` form.
    #[error("malformed timestamp: {0:?}")]
    MalformedTimestamp(String),

    #[error("no models directory: neither {system} nor {user} exists — run `ollama-models update` first")]
    NoModelsDir { system: String, user: String },

    #[error("no model files found in {dir} — run `ollama-models update` first")]
    NoRecords { dir: String },

    #[cfg(feature = "network")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, OmError>;
