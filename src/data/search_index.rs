use rusqlite::types::ToSql;
use rusqlite::Connection;

use crate::error::AppError;
use crate::models::search::{SearchHit, SearchOptions};

const DEFAULT_LIMIT: usize = 20;

/// Upserts one search document keyed by `(video_id, start_time)`. The FTS
/// index is kept in sync by the triggers installed at migration time.
pub fn index_subtitle(
    conn: &Connection,
    video_id: &str,
    start_ms: i64,
    end_ms: i64,
    text: &str,
) -> Result<(), AppError> {
    conn.execute(
        "INSERT INTO subtitles (video_id, start_time, end_time, text)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(video_id, start_time)
         DO UPDATE SET end_time = excluded.end_time, text = excluded.text",
        rusqlite::params![video_id, start_ms, end_ms, text],
    )?;
    Ok(())
}

/// Quotes every whitespace-separated token so user input is matched as plain
/// words instead of FTS5 query syntax.
fn fts_query(raw: &str) -> String {
    raw.split_whitespace()
        .map(|token| format!("\"{}\"", token.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ranked full-text search over subtitle text, optionally restricted to one
/// video and/or a time window. Relevance ties keep the engine's native order.
pub fn search(
    conn: &Connection,
    query: &str,
    options: &SearchOptions,
) -> Result<Vec<SearchHit>, AppError> {
    let match_expr = fts_query(query);
    if match_expr.is_empty() {
        return Ok(Vec::new());
    }

    let mut sql = String::from(
        "SELECT s.video_id, s.start_time, s.end_time, s.text, bm25(subtitles_fts) AS rank
         FROM subtitles_fts
         JOIN subtitles s ON s.id = subtitles_fts.rowid
         WHERE subtitles_fts MATCH ?1",
    );
    let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(match_expr)];

    if let Some(video_id) = &options.video_id {
        params.push(Box::new(video_id.clone()));
        sql.push_str(&format!(" AND s.video_id = ?{}", params.len()));
    }
    if let Some(range) = &options.time_range {
        if let Some(start) = range.start_ms {
            params.push(Box::new(start));
            sql.push_str(&format!(" AND s.start_time >= ?{}", params.len()));
        }
        if let Some(end) = range.end_ms {
            params.push(Box::new(end));
            sql.push_str(&format!(" AND s.end_time <= ?{}", params.len()));
        }
    }

    let limit = if options.limit == 0 {
        DEFAULT_LIMIT
    } else {
        options.limit
    };
    params.push(Box::new(limit as i64));
    sql.push_str(&format!(" ORDER BY rank LIMIT ?{}", params.len()));
    params.push(Box::new(options.offset as i64));
    sql.push_str(&format!(" OFFSET ?{}", params.len()));

    let mut stmt = conn.prepare(&sql)?;
    let hits = stmt
        .query_map(
            rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())),
            |row| {
                // bm25 ranks lower-is-better; negate so a higher score wins.
                let rank: f64 = row.get(4)?;
                Ok(SearchHit {
                    video_id: row.get(0)?,
                    start_ms: row.get(1)?,
                    end_ms: row.get(2)?,
                    subtitle_text: row.get(3)?,
                    score: Some(-rank),
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(hits)
}
