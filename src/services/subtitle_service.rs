use std::path::Path;

use crate::error::AppError;
use crate::models::subtitle::SubtitleEntry;

/// Parses `HH:MM:SS,mmm` (SRT comma notation) into milliseconds.
fn srt_time_to_ms(time: &str) -> Option<i64> {
    let mut parts = time.trim().split(':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let (seconds, millis) = parts.next()?.split_once(',')?;
    let seconds: i64 = seconds.parse().ok()?;
    let millis: i64 = millis.parse().ok()?;

    Some(hours * 3_600_000 + minutes * 60_000 + seconds * 1000 + millis)
}

fn parse_timing_line(line: &str) -> Option<(i64, i64)> {
    let (start, end) = line.split_once("-->")?;
    Some((srt_time_to_ms(start)?, srt_time_to_ms(end)?))
}

/// Parses SRT content into timed entries, in file order. Malformed blocks
/// are skipped rather than failing the whole file.
pub fn parse_srt(content: &str) -> Vec<SubtitleEntry> {
    let normalized = content.replace("\r\n", "\n");
    let mut entries = Vec::new();

    for block in normalized.trim().split("\n\n") {
        let lines: Vec<&str> = block.lines().collect();
        if lines.len() < 3 {
            continue;
        }

        // lines[0] is the sequence number, lines[1] the timing line.
        let Some((start_ms, end_ms)) = parse_timing_line(lines[1]) else {
            continue;
        };

        let text = lines[2..].join("\n").trim().to_string();
        entries.push(SubtitleEntry {
            start_ms,
            end_ms,
            text,
        });
    }

    entries
}

/// Reads and parses an external subtitle file. A non-empty file that yields
/// zero entries is reported as a parse failure instead of indexing nothing.
pub fn parse_subtitle_file(path: &Path) -> Result<Vec<SubtitleEntry>, AppError> {
    let content = std::fs::read_to_string(path)?;
    let entries = parse_srt(&content);

    if entries.is_empty() && !content.trim().is_empty() {
        return Err(AppError::Parse(format!(
            "no subtitle entries found in {}",
            path.display()
        )));
    }

    Ok(entries)
}

/// Parses subtitles extracted from an embedded stream.
pub fn parse_embedded(raw: &str) -> Result<Vec<SubtitleEntry>, AppError> {
    let entries = parse_srt(raw);

    if entries.is_empty() && !raw.trim().is_empty() {
        return Err(AppError::Parse(
            "no subtitle entries found in extracted stream".to_string(),
        ));
    }

    Ok(entries)
}
