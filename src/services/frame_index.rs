//! The arithmetic here is the single source of truth for the frame grid.
//! Extraction writes `frame_k` starting at `(k - 1) * frame_interval`
//! seconds; lookups must map timestamps back with the same formula or frame
//! references drift.

use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::models::video::VideoRecord;

/// 1-based frame number covering `timestamp_ms`. Frame 1 covers
/// `[0, interval)`, frame 2 covers `[interval, 2 * interval)`, and so on.
/// No upper bound is applied; callers resolving to a file must treat numbers
/// past `total_frames` as a miss.
pub fn frame_number(video: &VideoRecord, timestamp_ms: i64) -> i64 {
    let interval_ms = video.frame_interval * 1000.0;
    (timestamp_ms as f64 / interval_ms).floor() as i64 + 1
}

pub fn frame_path(video: &VideoRecord, frame_number: i64) -> PathBuf {
    Path::new(&video.output_directory).join(format!(
        "frame_{}.{}",
        frame_number, video.frame_format
    ))
}

/// Every frame path covering `[start_ms, end_ms]`, inclusive on both ends and
/// strictly increasing by frame number. Never empty: `start_ms == end_ms`
/// yields one path. A reversed range is rejected outright.
pub fn frames_in_range(
    video: &VideoRecord,
    start_ms: i64,
    end_ms: i64,
) -> Result<Vec<PathBuf>, AppError> {
    if end_ms < start_ms {
        return Err(AppError::InvalidRange { start_ms, end_ms });
    }

    let start_frame = frame_number(video, start_ms);
    let end_frame = frame_number(video, end_ms);

    Ok((start_frame..=end_frame)
        .map(|n| frame_path(video, n))
        .collect())
}
