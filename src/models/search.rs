use serde::{Deserialize, Serialize};

/// One ranked subtitle hit, normalized at the search-index boundary into a
/// fixed shape with a single optional score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub video_id: String,
    pub start_ms: i64,
    pub end_ms: i64,
    pub subtitle_text: String,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TimeRange {
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub video_id: Option<String>,
    pub limit: usize,
    pub offset: usize,
    pub time_range: Option<TimeRange>,
}

impl SearchOptions {
    pub fn best_match(video_id: Option<String>) -> Self {
        Self {
            video_id,
            limit: 1,
            offset: 0,
            time_range: None,
        }
    }
}
