use std::path::PathBuf;

use rusqlite::Connection;

use crate::data::{repository, search_index};
use crate::error::AppError;
use crate::models::clip::{ClipDescriptor, ClipFrame};
use crate::models::search::{SearchHit, SearchOptions};
use crate::timecode::format_timestamp;

/// Everything the caller needs to display a search hit and hand it to clip
/// generation.
#[derive(Debug, Clone)]
pub struct MatchReport {
    pub hit: SearchHit,
    /// Display name of the owning video; `None` when the metadata record has
    /// gone missing, in which case the raw id is all there is to show.
    pub video_name: Option<String>,
    pub frames: Vec<PathBuf>,
    pub frame_directory: Option<PathBuf>,
    pub frame_files: Vec<String>,
    pub clip: ClipDescriptor,
}

/// Turns a free-text query into frame references and a clip descriptor.
/// Zero hits is a normal outcome, not an error. A hit whose metadata record
/// has been deleted still reports the hit itself; frame resolution is then
/// skipped rather than failed.
pub fn find_best_match(
    conn: &Connection,
    query: &str,
    video_id: Option<&str>,
) -> Result<Option<MatchReport>, AppError> {
    let hits = search_index::search(
        conn,
        query,
        &SearchOptions::best_match(video_id.map(str::to_string)),
    )?;

    let Some(hit) = hits.into_iter().next() else {
        tracing::debug!(query, "no search hits");
        return Ok(None);
    };

    let video = repository::get_video(conn, &hit.video_id)?;
    let (video_name, frames, frame_interval) = match &video {
        Some(v) => (
            Some(v.filename.clone()),
            crate::services::frame_index::frames_in_range(v, hit.start_ms, hit.end_ms)?,
            v.frame_interval,
        ),
        None => {
            tracing::warn!(video_id = %hit.video_id, "search hit references a missing video record");
            (None, Vec::new(), 0.0)
        }
    };

    let frame_directory = frames.first().and_then(|f| f.parent()).map(PathBuf::from);
    let frame_files = frames
        .iter()
        .filter_map(|f| f.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .collect();

    let clip = ClipDescriptor {
        video_id: hit.video_id.clone(),
        start_timestamp: format_timestamp(hit.start_ms),
        end_timestamp: format_timestamp(hit.end_ms),
        frames: frames
            .iter()
            .map(|path| ClipFrame {
                file_path: path.clone(),
                display_duration_seconds: frame_interval,
            })
            .collect(),
    };

    Ok(Some(MatchReport {
        hit,
        video_name,
        frames,
        frame_directory,
        frame_files,
        clip,
    }))
}
