use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::data::{repository, search_index};
use crate::error::AppError;
use crate::models::subtitle::SubtitleEntry;
use crate::models::video::{FrameFormat, SubtitleSource, VideoRecord};
use crate::services::media_tool::{FrameOptions, MediaTool};
use crate::services::subtitle_service;

const PREVIEW_ENTRIES: usize = 3;

#[derive(Debug, Clone)]
pub struct IndexRequest {
    pub video_path: PathBuf,
    pub subtitle_path: Option<PathBuf>,
    pub stream_index: usize,
    pub interval_seconds: f64,
    pub height: Option<i64>,
    pub quality: i64,
    pub format: FrameFormat,
}

#[derive(Debug, Clone)]
pub struct IndexReport {
    pub video_id: String,
    pub duration_ms: i64,
    pub total_frames: i64,
    pub total_subtitles: usize,
    pub disk_space_used: i64,
    pub output_directory: PathBuf,
    /// Set when search population failed partway. The metadata record and
    /// frames are kept; the search index is incomplete until re-indexed.
    pub search_warning: Option<String>,
}

fn validate(request: &IndexRequest) -> Result<(), AppError> {
    if request.interval_seconds <= 0.0 {
        return Err(AppError::InvalidArgument(format!(
            "frame interval must be positive, got {}",
            request.interval_seconds
        )));
    }
    if !(1..=31).contains(&request.quality) {
        return Err(AppError::InvalidArgument(format!(
            "quality must be within 1-31, got {}",
            request.quality
        )));
    }
    Ok(())
}

fn acquire_subtitles(
    tool: &dyn MediaTool,
    request: &IndexRequest,
) -> Result<Vec<SubtitleEntry>, AppError> {
    if let Some(subtitle_path) = &request.subtitle_path {
        tracing::info!(path = %subtitle_path.display(), "using external subtitle file");
        return subtitle_service::parse_subtitle_file(subtitle_path);
    }

    tracing::info!("checking for embedded subtitles");
    let streams = tool.list_subtitle_streams(&request.video_path)?;
    if streams.is_empty() {
        return Err(AppError::NoSubtitlesAvailable);
    }

    for stream in &streams {
        tracing::info!(
            index = stream.index,
            codec = %stream.codec,
            language = stream.language.as_deref().unwrap_or("unknown"),
            title = stream.title.as_deref().unwrap_or(""),
            "found subtitle stream"
        );
    }

    if request.stream_index >= streams.len() {
        return Err(AppError::InvalidStreamIndex {
            index: request.stream_index,
            max: streams.len() - 1,
        });
    }

    tracing::info!(stream = request.stream_index, "extracting subtitle stream");
    let raw = tool.extract_embedded_subtitles(&request.video_path, request.stream_index)?;
    subtitle_service::parse_embedded(&raw)
}

fn derive_filename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Runs the full indexing pipeline for one video: acquire subtitles, measure
/// duration, extract frames, persist the metadata record, populate the search
/// index. Stages run in order; validation and subtitle failures happen before
/// anything is written. A frame-extraction failure may leave partial frame
/// files on disk for the operator to clean up, and a search-population
/// failure leaves the already-persisted record in place and is reported as a
/// warning on the returned report instead of an error.
pub fn index_video(
    conn: &Connection,
    tool: &dyn MediaTool,
    request: &IndexRequest,
) -> Result<IndexReport, AppError> {
    validate(request)?;
    tracing::info!(video = %request.video_path.display(), "indexing video");

    // AcquireSubtitles
    let entries = acquire_subtitles(tool, request)?;

    // PreviewSubtitles
    for entry in entries.iter().take(PREVIEW_ENTRIES) {
        tracing::info!(
            start_ms = entry.start_ms,
            end_ms = entry.end_ms,
            text = %entry.text,
            "subtitle preview"
        );
    }
    tracing::info!(total = entries.len(), "parsed subtitles");

    // MeasureDuration
    let duration_ms = (tool.probe_duration(&request.video_path)? * 1000.0).round() as i64;

    // ExtractFrames
    tracing::info!(
        interval = request.interval_seconds,
        format = %request.format,
        "extracting frames"
    );
    let extraction = tool
        .extract_frames(
            &request.video_path,
            &FrameOptions {
                interval_seconds: request.interval_seconds,
                height: request.height,
                quality: request.quality,
                format: request.format,
            },
        )
        .inspect_err(|e| {
            tracing::error!(
                video = %request.video_path.display(),
                error = %e,
                "frame extraction failed; partial frame files may remain on disk"
            );
        })?;

    // PersistRecord
    let now = chrono::Utc::now().to_rfc3339();
    let video = VideoRecord {
        id: uuid::Uuid::new_v4().to_string(),
        path: request.video_path.to_string_lossy().to_string(),
        filename: derive_filename(&request.video_path),
        duration_ms,
        created_at: now.clone(),
        updated_at: now,
        frame_interval: request.interval_seconds,
        frame_format: request.format,
        frame_quality: request.quality,
        frame_height: request.height,
        subtitle_source: if request.subtitle_path.is_some() {
            SubtitleSource::External
        } else {
            SubtitleSource::Embedded
        },
        subtitle_stream: if request.subtitle_path.is_some() {
            None
        } else {
            Some(request.stream_index as i64)
        },
        subtitle_path: request
            .subtitle_path
            .as_ref()
            .map(|p| p.to_string_lossy().to_string()),
        output_directory: extraction.output_directory.to_string_lossy().to_string(),
        total_frames: extraction.total_frames,
        total_subtitles: entries.len() as i64,
        disk_space_used: extraction.disk_space_used,
    };
    repository::add_video(conn, &video)?;

    // PopulateSearch
    let mut search_warning = None;
    for (position, entry) in entries.iter().enumerate() {
        if let Err(e) =
            search_index::index_subtitle(conn, &video.id, entry.start_ms, entry.end_ms, &entry.text)
        {
            let warning = format!(
                "search population stopped after {position} of {} entries: {e}",
                entries.len()
            );
            tracing::warn!(video_id = %video.id, "{warning}");
            search_warning = Some(warning);
            break;
        }
    }

    // Done
    tracing::info!(
        video_id = %video.id,
        duration_ms,
        frames = extraction.total_frames,
        bytes = extraction.disk_space_used,
        "indexing complete"
    );

    Ok(IndexReport {
        video_id: video.id,
        duration_ms,
        total_frames: extraction.total_frames,
        total_subtitles: entries.len(),
        disk_space_used: extraction.disk_space_used,
        output_directory: extraction.output_directory,
        search_warning,
    })
}
