use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::data::repository;
use crate::error::AppError;
use crate::models::clip::{ClipDescriptor, ClipFrame};
use crate::services::frame_index;
use crate::services::media_tool::MediaTool;
use crate::timecode::parse_timestamp;

#[derive(Debug, Clone)]
pub struct ClipReport {
    pub output_path: PathBuf,
    pub duration_ms: i64,
    pub frame_count: usize,
    pub frame_interval: f64,
}

/// Concat-demuxer input: each frame held on screen for its display duration.
fn frame_list_content(descriptor: &ClipDescriptor) -> String {
    descriptor
        .frames
        .iter()
        .map(|frame| {
            format!(
                "file '{}'\nduration {}",
                frame.file_path.display(),
                frame.display_duration_seconds
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the frames covering `[start, end]` (timestamps as `HH:MM:SS.mmm`)
/// into a looping GIF next to the frames. The written frame-list file is
/// deliberately left in place afterwards so the render can be inspected or
/// re-run by hand.
pub fn create_clip(
    conn: &Connection,
    tool: &dyn MediaTool,
    video_id: &str,
    start: &str,
    end: &str,
    loop_playback: bool,
) -> Result<ClipReport, AppError> {
    let video = repository::get_video(conn, video_id)?
        .ok_or_else(|| AppError::NotFound(video_id.to_string()))?;

    let start_ms = parse_timestamp(start)?;
    let end_ms = parse_timestamp(end)?;

    let frames = frame_index::frames_in_range(&video, start_ms, end_ms)?;

    let descriptor = ClipDescriptor {
        video_id: video_id.to_string(),
        start_timestamp: start.to_string(),
        end_timestamp: end.to_string(),
        frames: frames
            .iter()
            .map(|path| ClipFrame {
                file_path: path.clone(),
                display_duration_seconds: video.frame_interval,
            })
            .collect(),
    };

    let output_directory = Path::new(&video.output_directory);
    let frame_list_path = output_directory.join("frames.txt");
    std::fs::write(&frame_list_path, frame_list_content(&descriptor))?;

    let output_path = output_directory.join(format!("{start}-{end}.gif"));
    tracing::info!(
        video_id,
        frames = frames.len(),
        output = %output_path.display(),
        "rendering clip"
    );
    tool.render_clip(&frame_list_path, &output_path, loop_playback)?;

    Ok(ClipReport {
        output_path,
        duration_ms: end_ms - start_ms,
        frame_count: frames.len(),
        frame_interval: video.frame_interval,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::migrations::run_migrations;
    use crate::models::subtitle::SubtitleStream;
    use crate::models::video::{FrameFormat, SubtitleSource, VideoRecord};
    use crate::services::media_tool::{FrameExtraction, FrameOptions};
    use std::cell::RefCell;

    struct RecordingTool {
        rendered: RefCell<Vec<(PathBuf, PathBuf, bool)>>,
    }

    impl RecordingTool {
        fn new() -> Self {
            Self {
                rendered: RefCell::new(Vec::new()),
            }
        }
    }

    impl MediaTool for RecordingTool {
        fn probe_duration(&self, _video: &Path) -> Result<f64, AppError> {
            unreachable!("clip generation never probes")
        }

        fn list_subtitle_streams(&self, _video: &Path) -> Result<Vec<SubtitleStream>, AppError> {
            unreachable!()
        }

        fn extract_embedded_subtitles(
            &self,
            _video: &Path,
            _stream_index: usize,
        ) -> Result<String, AppError> {
            unreachable!()
        }

        fn extract_frames(
            &self,
            _video: &Path,
            _options: &FrameOptions,
        ) -> Result<FrameExtraction, AppError> {
            unreachable!()
        }

        fn render_clip(
            &self,
            frame_list: &Path,
            output: &Path,
            loop_playback: bool,
        ) -> Result<(), AppError> {
            self.rendered.borrow_mut().push((
                frame_list.to_path_buf(),
                output.to_path_buf(),
                loop_playback,
            ));
            Ok(())
        }
    }

    fn setup(output_directory: &Path) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let video = VideoRecord {
            id: "v1".to_string(),
            path: "/media/show.mkv".to_string(),
            filename: "show.mkv".to_string(),
            duration_ms: 60_000,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
            frame_interval: 0.5,
            frame_format: FrameFormat::Jpg,
            frame_quality: 5,
            frame_height: None,
            subtitle_source: SubtitleSource::Embedded,
            subtitle_stream: Some(0),
            subtitle_path: None,
            output_directory: output_directory.to_string_lossy().to_string(),
            total_frames: 120,
            total_subtitles: 10,
            disk_space_used: 0,
        };
        repository::add_video(&conn, &video).unwrap();
        conn
    }

    #[test]
    fn test_create_clip_writes_frame_list_and_renders() {
        let dir = tempfile::tempdir().unwrap();
        let conn = setup(dir.path());
        let tool = RecordingTool::new();

        let report = create_clip(
            &conn,
            &tool,
            "v1",
            "00:00:01.000",
            "00:00:02.500",
            true,
        )
        .unwrap();

        assert_eq!(report.frame_count, 4);
        assert_eq!(report.duration_ms, 1500);
        assert_eq!(report.frame_interval, 0.5);
        assert_eq!(
            report.output_path,
            dir.path().join("00:00:01.000-00:00:02.500.gif")
        );

        let rendered = tool.rendered.borrow();
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].0, dir.path().join("frames.txt"));
        assert!(rendered[0].2);

        // The frame list survives rendering and covers frames 3..6.
        let list = std::fs::read_to_string(dir.path().join("frames.txt")).unwrap();
        assert!(list.contains("frame_3.jpg"));
        assert!(list.contains("frame_6.jpg"));
        assert!(!list.contains("frame_7.jpg"));
        assert_eq!(list.matches("duration 0.5").count(), 4);
    }

    #[test]
    fn test_create_clip_unknown_video() {
        let dir = tempfile::tempdir().unwrap();
        let conn = setup(dir.path());
        let tool = RecordingTool::new();

        let err = create_clip(&conn, &tool, "nope", "00:00:00.000", "00:00:01.000", true)
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(tool.rendered.borrow().is_empty());
    }

    #[test]
    fn test_create_clip_reversed_range() {
        let dir = tempfile::tempdir().unwrap();
        let conn = setup(dir.path());
        let tool = RecordingTool::new();

        let err = create_clip(&conn, &tool, "v1", "00:00:02.000", "00:00:01.000", true)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRange { .. }));
        assert!(tool.rendered.borrow().is_empty());
        assert!(!dir.path().join("frames.txt").exists());
    }

    #[test]
    fn test_create_clip_bad_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let conn = setup(dir.path());
        let tool = RecordingTool::new();

        let err =
            create_clip(&conn, &tool, "v1", "one second", "00:00:02.000", true).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }
}
