use std::path::PathBuf;

use rusqlite::{params, Connection, Row};

use crate::error::AppError;
use crate::models::video::VideoRecord;
use crate::services::frame_index;

const VIDEO_COLUMNS: &str = "id, path, filename, duration_ms, created_at, updated_at, \
     frame_interval, frame_format, frame_quality, frame_height, \
     subtitle_source, subtitle_stream, subtitle_path, \
     output_directory, total_frames, total_subtitles, disk_space_used";

fn video_from_row(row: &Row) -> Result<VideoRecord, rusqlite::Error> {
    let format: String = row.get(7)?;
    let source: String = row.get(10)?;

    Ok(VideoRecord {
        id: row.get(0)?,
        path: row.get(1)?,
        filename: row.get(2)?,
        duration_ms: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        frame_interval: row.get(6)?,
        frame_format: format.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, e.into())
        })?,
        frame_quality: row.get(8)?,
        frame_height: row.get(9)?,
        subtitle_source: source.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(10, rusqlite::types::Type::Text, e.into())
        })?,
        subtitle_stream: row.get(11)?,
        subtitle_path: row.get(12)?,
        output_directory: row.get(13)?,
        total_frames: row.get(14)?,
        total_subtitles: row.get(15)?,
        disk_space_used: row.get(16)?,
    })
}

pub fn add_video(conn: &Connection, video: &VideoRecord) -> Result<(), AppError> {
    let result = conn.execute(
        "INSERT INTO videos (
            id, path, filename, duration_ms, created_at, updated_at,
            frame_interval, frame_format, frame_quality, frame_height,
            subtitle_source, subtitle_stream, subtitle_path,
            output_directory, total_frames, total_subtitles, disk_space_used
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            video.id,
            video.path,
            video.filename,
            video.duration_ms,
            video.created_at,
            video.updated_at,
            video.frame_interval,
            video.frame_format.to_string(),
            video.frame_quality,
            video.frame_height,
            video.subtitle_source.to_string(),
            video.subtitle_stream,
            video.subtitle_path,
            video.output_directory,
            video.total_frames,
            video.total_subtitles,
            video.disk_space_used,
        ],
    );

    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(AppError::DuplicateId(video.id.clone()))
        }
        Err(e) => Err(e.into()),
    }
}

pub fn get_video(conn: &Connection, id: &str) -> Result<Option<VideoRecord>, AppError> {
    let video = conn
        .prepare(&format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = ?1"))?
        .query_row(params![id], video_from_row)
        .optional()?;

    Ok(video)
}

/// Full replace by id. The row must already exist.
pub fn update_video(conn: &Connection, video: &VideoRecord) -> Result<(), AppError> {
    let count = conn.execute(
        "UPDATE videos SET
            path = ?2,
            filename = ?3,
            duration_ms = ?4,
            created_at = ?5,
            updated_at = ?6,
            frame_interval = ?7,
            frame_format = ?8,
            frame_quality = ?9,
            frame_height = ?10,
            subtitle_source = ?11,
            subtitle_stream = ?12,
            subtitle_path = ?13,
            output_directory = ?14,
            total_frames = ?15,
            total_subtitles = ?16,
            disk_space_used = ?17
         WHERE id = ?1",
        params![
            video.id,
            video.path,
            video.filename,
            video.duration_ms,
            video.created_at,
            video.updated_at,
            video.frame_interval,
            video.frame_format.to_string(),
            video.frame_quality,
            video.frame_height,
            video.subtitle_source.to_string(),
            video.subtitle_stream,
            video.subtitle_path,
            video.output_directory,
            video.total_frames,
            video.total_subtitles,
            video.disk_space_used,
        ],
    )?;

    if count == 0 {
        return Err(AppError::NotFound(video.id.clone()));
    }
    Ok(())
}

/// Removes only the metadata row. Frames on disk and search documents are
/// left for the operator; deleting an unknown id is not an error.
pub fn delete_video(conn: &Connection, id: &str) -> Result<(), AppError> {
    conn.execute("DELETE FROM videos WHERE id = ?1", params![id])?;
    Ok(())
}

pub fn list_videos(conn: &Connection) -> Result<Vec<VideoRecord>, AppError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {VIDEO_COLUMNS} FROM videos ORDER BY created_at DESC"
    ))?;

    let videos = stmt
        .query_map([], video_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(videos)
}

pub fn get_frame_path(conn: &Connection, id: &str, timestamp_ms: i64) -> Result<PathBuf, AppError> {
    let video = get_video(conn, id)?.ok_or_else(|| AppError::NotFound(id.to_string()))?;
    let number = frame_index::frame_number(&video, timestamp_ms);
    Ok(frame_index::frame_path(&video, number))
}

/// Frame numbers past `total_frames` are returned untruncated when the range
/// extends beyond the indexed duration; trailing paths may not exist on disk.
pub fn get_frames_in_range(
    conn: &Connection,
    id: &str,
    start_ms: i64,
    end_ms: i64,
) -> Result<Vec<PathBuf>, AppError> {
    let video = get_video(conn, id)?.ok_or_else(|| AppError::NotFound(id.to_string()))?;
    frame_index::frames_in_range(&video, start_ms, end_ms)
}

// Needed for rusqlite optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::migrations::run_migrations;
    use crate::models::video::{FrameFormat, SubtitleSource};

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn sample_video(id: &str) -> VideoRecord {
        VideoRecord {
            id: id.to_string(),
            path: "/media/episode_01.mkv".to_string(),
            filename: "episode_01.mkv".to_string(),
            duration_ms: 1_320_000,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
            frame_interval: 0.5,
            frame_format: FrameFormat::Jpg,
            frame_quality: 5,
            frame_height: Some(480),
            subtitle_source: SubtitleSource::Embedded,
            subtitle_stream: Some(0),
            subtitle_path: None,
            output_directory: "/tmp/output/episode_01".to_string(),
            total_frames: 20,
            total_subtitles: 42,
            disk_space_used: 1_048_576,
        }
    }

    #[test]
    fn test_video_crud() {
        let conn = setup_db();
        let video = sample_video("v1");

        add_video(&conn, &video).unwrap();

        let fetched = get_video(&conn, "v1").unwrap().unwrap();
        assert_eq!(fetched.id, video.id);
        assert_eq!(fetched.filename, video.filename);
        assert_eq!(fetched.duration_ms, video.duration_ms);
        assert_eq!(fetched.frame_interval, video.frame_interval);
        assert_eq!(fetched.frame_format, video.frame_format);
        assert_eq!(fetched.frame_height, video.frame_height);
        assert_eq!(fetched.subtitle_source, video.subtitle_source);
        assert_eq!(fetched.subtitle_path, None);
        assert_eq!(fetched.output_directory, video.output_directory);
        assert_eq!(fetched.total_frames, video.total_frames);
        assert_eq!(fetched.disk_space_used, video.disk_space_used);

        delete_video(&conn, "v1").unwrap();
        assert!(get_video(&conn, "v1").unwrap().is_none());
    }

    #[test]
    fn test_add_video_duplicate_id() {
        let conn = setup_db();
        add_video(&conn, &sample_video("v1")).unwrap();

        let err = add_video(&conn, &sample_video("v1")).unwrap_err();
        assert!(matches!(err, AppError::DuplicateId(id) if id == "v1"));
    }

    #[test]
    fn test_update_video_replaces_full_record() {
        let conn = setup_db();
        let mut video = sample_video("v1");
        add_video(&conn, &video).unwrap();

        video.total_frames = 99;
        video.frame_format = FrameFormat::Webp;
        video.updated_at = "2025-01-02T00:00:00Z".to_string();
        update_video(&conn, &video).unwrap();

        let fetched = get_video(&conn, "v1").unwrap().unwrap();
        assert_eq!(fetched.total_frames, 99);
        assert_eq!(fetched.frame_format, FrameFormat::Webp);
        assert_eq!(fetched.updated_at, "2025-01-02T00:00:00Z");
    }

    #[test]
    fn test_update_video_not_found() {
        let conn = setup_db();
        let err = update_video(&conn, &sample_video("missing")).unwrap_err();
        assert!(matches!(err, AppError::NotFound(id) if id == "missing"));
    }

    #[test]
    fn test_delete_video_idempotent() {
        let conn = setup_db();
        delete_video(&conn, "never-existed").unwrap();
    }

    #[test]
    fn test_list_videos_most_recent_first() {
        let conn = setup_db();

        let mut older = sample_video("older");
        older.created_at = "2025-01-01T00:00:00Z".to_string();
        let mut newer = sample_video("newer");
        newer.created_at = "2025-06-01T00:00:00Z".to_string();

        add_video(&conn, &older).unwrap();
        add_video(&conn, &newer).unwrap();

        let videos = list_videos(&conn).unwrap();
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].id, "newer");
        assert_eq!(videos[1].id, "older");
    }

    #[test]
    fn test_get_frame_path_round_trip() {
        let conn = setup_db();
        add_video(&conn, &sample_video("v1")).unwrap();

        let first = get_frame_path(&conn, "v1", 1250).unwrap();
        let second = get_frame_path(&conn, "v1", 1250).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, PathBuf::from("/tmp/output/episode_01/frame_3.jpg"));
    }

    #[test]
    fn test_get_frame_path_unknown_id() {
        let conn = setup_db();
        let err = get_frame_path(&conn, "nope", 0).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_get_frames_in_range_half_second_interval() {
        // interval 0.5s: 1000ms -> frame 3, 2500ms -> frame 6
        let conn = setup_db();
        add_video(&conn, &sample_video("v1")).unwrap();

        let frames = get_frames_in_range(&conn, "v1", 1000, 2500).unwrap();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0], PathBuf::from("/tmp/output/episode_01/frame_3.jpg"));
        assert_eq!(frames[3], PathBuf::from("/tmp/output/episode_01/frame_6.jpg"));
    }

    #[test]
    fn test_get_frames_in_range_unknown_id_is_not_empty() {
        let conn = setup_db();
        let err = get_frames_in_range(&conn, "nope", 0, 1000).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_get_frames_in_range_invalid_range() {
        let conn = setup_db();
        add_video(&conn, &sample_video("v1")).unwrap();

        let err = get_frames_in_range(&conn, "v1", 2000, 1000).unwrap_err();
        assert!(matches!(err, AppError::InvalidRange { .. }));
    }
}
