use serde::{Deserialize, Serialize};

/// One timed caption. Ephemeral: produced by the parser, folded into the
/// search index during indexing, not persisted as its own entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    pub start_ms: i64,
    pub end_ms: i64,
    pub text: String,
}

/// An embedded subtitle stream as reported by the media tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleStream {
    pub index: usize,
    pub codec: String,
    pub language: Option<String>,
    pub title: Option<String>,
}
