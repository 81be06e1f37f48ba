use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use clap::{Parser, Subcommand};

use frameseek::data::{migrations, repository};
use frameseek::models::video::FrameFormat;
use frameseek::services::clip_service;
use frameseek::services::indexing_service::{self, IndexRequest};
use frameseek::services::media_tool::FfmpegTool;
use frameseek::services::retrieval_service;
use frameseek::timecode::format_timestamp;

#[derive(Parser)]
#[command(name = "frameseek", version, about = "Subtitle-searchable video frame indexer")]
struct Cli {
    /// Path to the metadata database (defaults to the per-user data dir)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a video file with its subtitles
    Index {
        /// Path to the video file
        video: PathBuf,
        /// Path to an external subtitle file (optional)
        subtitles: Option<PathBuf>,
        /// Subtitle stream index to use
        #[arg(short, long, default_value_t = 0)]
        stream: usize,
        /// Scale frame height maintaining aspect ratio
        #[arg(short = 'r', long)]
        resolution: Option<i64>,
        /// Quality level (1-31, lower is better)
        #[arg(short, long, default_value_t = 5)]
        quality: i64,
        /// Output format (jpg or webp)
        #[arg(short, long, default_value = "jpg", value_parser = FrameFormat::from_str)]
        format: FrameFormat,
        /// Interval between frames in seconds
        #[arg(short, long, default_value_t = 0.1)]
        interval: f64,
    },
    /// Search indexed subtitle content
    Search {
        /// Search query
        query: String,
        /// Filter by video ID
        #[arg(short, long)]
        video: Option<String>,
    },
    /// Create a GIF from indexed frames
    Clip {
        /// ID of the indexed video
        video_id: String,
        /// Start time (HH:MM:SS.mmm)
        start: String,
        /// End time (HH:MM:SS.mmm)
        end: String,
        /// Disable looping
        #[arg(long)]
        no_loop: bool,
    },
    /// List indexed videos
    List,
    /// Delete a video's metadata record
    Delete {
        /// ID of the indexed video
        video_id: String,
    },
}

fn default_db_path() -> anyhow::Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "frameseek")
        .context("failed to resolve a data directory")?;
    std::fs::create_dir_all(dirs.data_dir())?;
    Ok(dirs.data_dir().join("frameseek.db"))
}

fn open_db(path: &PathBuf) -> anyhow::Result<rusqlite::Connection> {
    let conn = rusqlite::Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "frameseek=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db_path = match cli.db {
        Some(path) => path,
        None => default_db_path()?,
    };
    let conn = open_db(&db_path)?;
    let tool = FfmpegTool::new(std::env::current_dir()?.join("output"));

    match cli.command {
        Commands::Index {
            video,
            subtitles,
            stream,
            resolution,
            quality,
            format,
            interval,
        } => {
            let request = IndexRequest {
                video_path: video,
                subtitle_path: subtitles,
                stream_index: stream,
                interval_seconds: interval,
                height: resolution,
                quality,
                format,
            };
            let report = indexing_service::index_video(&conn, &tool, &request)?;

            println!("Indexing complete!");
            println!("Video ID: {}", report.video_id);
            println!(
                "Duration: {:.2} minutes",
                report.duration_ms as f64 / 60_000.0
            );
            println!("Frames extracted: {}", report.total_frames);
            println!("Subtitles indexed: {}", report.total_subtitles);
            println!(
                "Disk space used: {:.2} MB",
                report.disk_space_used as f64 / 1024.0 / 1024.0
            );
            println!("Output directory: {}", report.output_directory.display());
            if let Some(warning) = report.search_warning {
                println!("Warning: {warning}");
            }
        }

        Commands::Search { query, video } => {
            match retrieval_service::find_best_match(&conn, &query, video.as_deref())? {
                None => println!("No matches found"),
                Some(report) => {
                    println!("\nBest Match:");
                    println!("===========");
                    if let Some(score) = report.hit.score {
                        println!("Match Score: {score:.2}");
                    }
                    println!(
                        "Video: {}",
                        report.video_name.as_deref().unwrap_or(&report.hit.video_id)
                    );
                    println!(
                        "Time Range: {} -> {}",
                        format_timestamp(report.hit.start_ms),
                        format_timestamp(report.hit.end_ms)
                    );
                    println!("Text: \"{}\"", report.hit.subtitle_text);

                    if let Some(directory) = &report.frame_directory {
                        println!("Frame Directory: {}", directory.display());
                        println!("Frame Files: {}", report.frame_files.join(", "));

                        println!("\nTo create a GIF of this scene, run:");
                        println!("--------------------------------");
                        println!(
                            "frameseek clip \"{}\" \"{}\" \"{}\"",
                            report.hit.video_id,
                            report.clip.start_timestamp,
                            report.clip.end_timestamp
                        );
                    }
                }
            }
        }

        Commands::Clip {
            video_id,
            start,
            end,
            no_loop,
        } => {
            let report =
                clip_service::create_clip(&conn, &tool, &video_id, &start, &end, !no_loop)?;

            println!("Clip created successfully:");
            println!("Output: {}", report.output_path.display());
            println!("Duration: {:.2}s", report.duration_ms as f64 / 1000.0);
            println!("Frames: {}", report.frame_count);
            println!("Frame Interval: {}s", report.frame_interval);
        }

        Commands::List => {
            let videos = repository::list_videos(&conn)?;
            if videos.is_empty() {
                println!("No indexed videos");
            }
            for video in videos {
                println!(
                    "{}  {}  {:.2} min  {} frames  indexed {}",
                    video.id,
                    video.filename,
                    video.duration_ms as f64 / 60_000.0,
                    video.total_frames,
                    video.created_at
                );
            }
        }

        Commands::Delete { video_id } => {
            repository::delete_video(&conn, &video_id)?;
            println!("Deleted metadata record: {video_id}");
            println!("Note: extracted frames and search entries are left in place.");
        }
    }

    Ok(())
}
