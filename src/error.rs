#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Video not found: {0}")]
    NotFound(String),

    #[error("Video id already exists: {0}")]
    DuplicateId(String),

    #[error("Invalid time range: end {end_ms}ms is before start {start_ms}ms")]
    InvalidRange { start_ms: i64, end_ms: i64 },

    #[error("Invalid subtitle stream index: {index}. Available streams: 0-{max}")]
    InvalidStreamIndex { index: usize, max: usize },

    #[error("No embedded subtitles found. Please provide a subtitle file.")]
    NoSubtitlesAvailable,

    #[error("External tool failed: {0}")]
    ExternalTool(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
