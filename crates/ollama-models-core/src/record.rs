use serde::{Deserialize, Serialize};

/// One model's catalog metadata, as extracted from the library page and
/// persisted as `<model>.json`. Immutable once loaded; `model` is the
/// unique key within a record set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRecord {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_desc: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Size tags (`1b`, `7b`, `70b`) in catalog presentation order,
    /// preserved in output.
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Raw popularity string (`1.2M`, `843`), normalized on demand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_count: Option<String>,
    /// Canonical `YYYY-MM-DD HH:MM:SS` timestamp when the raw catalog
    /// timestamp could be parsed, the raw value verbatim otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    /// Display-only provenance: the relative time shown on the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_relative: Option<String>,
    /// Display-only provenance: the raw timestamp from the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_count: Option<String>,
}

impl ModelRecord {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            title: None,
            short_desc: None,
            capabilities: Vec::new(),
            sizes: Vec::new(),
            pull_count: None,
            updated: None,
            updated_relative: None,
            updated_raw: None,
            tag_count: None,
        }
    }

    /// Case-insensitive capability presence test.
    pub fn has_capability(&self, tag: &str) -> bool {
        self.capabilities
            .iter()
            .any(|c| c.eq_ignore_ascii_case(tag))
    }
}
