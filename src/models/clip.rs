use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One frame file and how long it stays on screen in the rendered clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipFrame {
    pub file_path: PathBuf,
    pub display_duration_seconds: f64,
}

/// Resolved input for clip generation: every frame covering the matched time
/// range, each shown for the record's frame interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipDescriptor {
    pub video_id: String,
    pub start_timestamp: String,
    pub end_timestamp: String,
    pub frames: Vec<ClipFrame>,
}
