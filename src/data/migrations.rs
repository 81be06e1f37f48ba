use rusqlite::Connection;

use crate::error::AppError;

const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS videos (
    id TEXT PRIMARY KEY,
    path TEXT NOT NULL,
    filename TEXT NOT NULL,
    duration_ms INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    -- Processing settings
    frame_interval REAL NOT NULL,
    frame_format TEXT NOT NULL,
    frame_quality INTEGER NOT NULL,
    frame_height INTEGER,
    subtitle_source TEXT NOT NULL,
    subtitle_stream INTEGER,
    subtitle_path TEXT,

    -- Results
    output_directory TEXT NOT NULL,
    total_frames INTEGER NOT NULL,
    total_subtitles INTEGER NOT NULL,
    disk_space_used INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_videos_created ON videos(created_at DESC);

CREATE TABLE IF NOT EXISTS subtitles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    video_id TEXT NOT NULL,
    start_time INTEGER NOT NULL,
    end_time INTEGER NOT NULL,
    text TEXT NOT NULL,
    UNIQUE(video_id, start_time)
);

CREATE INDEX IF NOT EXISTS idx_subtitles_video ON subtitles(video_id, start_time);

CREATE VIRTUAL TABLE IF NOT EXISTS subtitles_fts USING fts5(
    text,
    content='subtitles',
    content_rowid='id'
);

CREATE TRIGGER IF NOT EXISTS subtitles_ai AFTER INSERT ON subtitles BEGIN
    INSERT INTO subtitles_fts(rowid, text) VALUES (new.id, new.text);
END;

CREATE TRIGGER IF NOT EXISTS subtitles_ad AFTER DELETE ON subtitles BEGIN
    INSERT INTO subtitles_fts(subtitles_fts, rowid, text) VALUES ('delete', old.id, old.text);
END;

CREATE TRIGGER IF NOT EXISTS subtitles_au AFTER UPDATE ON subtitles BEGIN
    INSERT INTO subtitles_fts(subtitles_fts, rowid, text) VALUES ('delete', old.id, old.text);
    INSERT INTO subtitles_fts(rowid, text) VALUES (new.id, new.text);
END;
";

pub fn run_migrations(conn: &Connection) -> Result<(), AppError> {
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    conn.execute_batch(SCHEMA_V1)?;
    Ok(())
}
