use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameFormat {
    Jpg,
    Webp,
}

impl std::fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jpg => write!(f, "jpg"),
            Self::Webp => write!(f, "webp"),
        }
    }
}

impl std::str::FromStr for FrameFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jpg" => Ok(Self::Jpg),
            "webp" => Ok(Self::Webp),
            _ => Err(format!("unknown frame format: {s} (expected jpg or webp)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubtitleSource {
    Embedded,
    External,
}

impl std::fmt::Display for SubtitleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Embedded => write!(f, "embedded"),
            Self::External => write!(f, "external"),
        }
    }
}

impl std::str::FromStr for SubtitleSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "embedded" => Ok(Self::Embedded),
            "external" => Ok(Self::External),
            _ => Err(format!("unknown subtitle source: {s}")),
        }
    }
}

/// Persisted settings and results for one indexed video. Processing settings
/// are immutable once written; an update replaces the whole row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    pub path: String,
    pub filename: String,
    pub duration_ms: i64,
    pub created_at: String,
    pub updated_at: String,

    // Processing settings
    pub frame_interval: f64,
    pub frame_format: FrameFormat,
    pub frame_quality: i64,
    pub frame_height: Option<i64>,
    pub subtitle_source: SubtitleSource,
    pub subtitle_stream: Option<i64>,
    pub subtitle_path: Option<String>,

    // Results
    pub output_directory: String,
    pub total_frames: i64,
    pub total_subtitles: i64,
    pub disk_space_used: i64,
}
