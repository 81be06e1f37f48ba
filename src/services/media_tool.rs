use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use crate::error::AppError;
use crate::models::subtitle::SubtitleStream;
use crate::models::video::FrameFormat;

#[derive(Debug, Clone)]
pub struct FrameOptions {
    pub interval_seconds: f64,
    pub height: Option<i64>,
    pub quality: i64,
    pub format: FrameFormat,
}

#[derive(Debug, Clone)]
pub struct FrameExtraction {
    pub output_directory: PathBuf,
    pub total_frames: i64,
    pub disk_space_used: i64,
}

/// Boundary to the media toolchain. Injected into the pipelines so tests can
/// substitute a fake; the real implementation shells out to ffmpeg/ffprobe.
pub trait MediaTool {
    fn probe_duration(&self, video: &Path) -> Result<f64, AppError>;
    fn list_subtitle_streams(&self, video: &Path) -> Result<Vec<SubtitleStream>, AppError>;
    fn extract_embedded_subtitles(
        &self,
        video: &Path,
        stream_index: usize,
    ) -> Result<String, AppError>;
    fn extract_frames(
        &self,
        video: &Path,
        options: &FrameOptions,
    ) -> Result<FrameExtraction, AppError>;
    fn render_clip(
        &self,
        frame_list: &Path,
        output: &Path,
        loop_playback: bool,
    ) -> Result<(), AppError>;
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct ProbeFormatOutput {
    format: ProbeFormat,
}

#[derive(Deserialize)]
struct ProbeStreamTags {
    language: Option<String>,
    title: Option<String>,
}

#[derive(Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    tags: Option<ProbeStreamTags>,
}

#[derive(Deserialize)]
struct ProbeStreamsOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

/// ffmpeg/ffprobe found on PATH. Frame output directories are created under
/// `output_root`, one per video, named after the source file.
pub struct FfmpegTool {
    output_root: PathBuf,
}

impl FfmpegTool {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    fn run(mut command: Command, what: &str) -> Result<Vec<u8>, AppError> {
        let output = command
            .output()
            .map_err(|e| AppError::ExternalTool(format!("{what}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::ExternalTool(format!(
                "{what}: {}",
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }

    fn path_arg(path: &Path) -> Result<&str, AppError> {
        path.to_str()
            .ok_or_else(|| AppError::ExternalTool(format!("non-UTF8 path: {}", path.display())))
    }
}

impl MediaTool for FfmpegTool {
    fn probe_duration(&self, video: &Path) -> Result<f64, AppError> {
        let mut command = Command::new("ffprobe");
        command.args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            Self::path_arg(video)?,
        ]);

        let stdout = Self::run(command, "ffprobe duration")?;
        let parsed: ProbeFormatOutput = serde_json::from_slice(&stdout)?;

        parsed
            .format
            .duration
            .and_then(|d| d.parse::<f64>().ok())
            .ok_or_else(|| {
                AppError::ExternalTool(format!(
                    "ffprobe reported no duration for {}",
                    video.display()
                ))
            })
    }

    fn list_subtitle_streams(&self, video: &Path) -> Result<Vec<SubtitleStream>, AppError> {
        let mut command = Command::new("ffprobe");
        command.args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_streams",
            Self::path_arg(video)?,
        ]);

        let stdout = Self::run(command, "ffprobe streams")?;
        let parsed: ProbeStreamsOutput = serde_json::from_slice(&stdout)?;

        // Index within the subtitle streams only, matching ffmpeg's 0:s:N
        // selector used for extraction.
        Ok(parsed
            .streams
            .into_iter()
            .filter(|s| s.codec_type.as_deref() == Some("subtitle"))
            .enumerate()
            .map(|(index, s)| SubtitleStream {
                index,
                codec: s.codec_name.unwrap_or_else(|| "unknown".to_string()),
                language: s.tags.as_ref().and_then(|t| t.language.clone()),
                title: s.tags.as_ref().and_then(|t| t.title.clone()),
            })
            .collect())
    }

    fn extract_embedded_subtitles(
        &self,
        video: &Path,
        stream_index: usize,
    ) -> Result<String, AppError> {
        let map = format!("0:s:{stream_index}");
        let mut command = Command::new("ffmpeg");
        command.args([
            "-v",
            "quiet",
            "-i",
            Self::path_arg(video)?,
            "-map",
            map.as_str(),
            "-f",
            "srt",
            "pipe:1",
        ]);

        let stdout = Self::run(command, "ffmpeg subtitle extraction")?;
        String::from_utf8(stdout).map_err(|e| {
            AppError::ExternalTool(format!("ffmpeg produced non-UTF8 subtitles: {e}"))
        })
    }

    fn extract_frames(
        &self,
        video: &Path,
        options: &FrameOptions,
    ) -> Result<FrameExtraction, AppError> {
        let stem = video
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "video".to_string());
        let output_dir = self.output_root.join(stem);
        std::fs::create_dir_all(&output_dir)?;

        let mut filters = format!("fps={}", 1.0 / options.interval_seconds);
        if let Some(height) = options.height {
            filters.push_str(&format!(",scale=-1:{height}"));
        }

        let mut command = Command::new("ffmpeg");
        command.args(["-v", "quiet", "-i", Self::path_arg(video)?, "-vf", filters.as_str()]);

        match options.format {
            FrameFormat::Jpg => {
                let qscale = options.quality.to_string();
                command.args(["-qscale:v", qscale.as_str(), "-pix_fmt", "yuvj420p"]);
            }
            FrameFormat::Webp => {
                // Map the 1-31 qscale (lower is better) onto webp's 1-100
                // quality scale (higher is better).
                let quality = format!("{:.0}", ((31 - options.quality) as f64 * 3.3).clamp(1.0, 100.0));
                command.args(["-quality", quality.as_str(), "-compression_level", "6"]);
            }
        }

        let pattern = output_dir.join(format!("frame_%d.{}", options.format));
        command.arg(Self::path_arg(&pattern)?);

        Self::run(command, "ffmpeg frame extraction")?;

        // Stats come from reading the directory back rather than trusting
        // ffmpeg to report them.
        let extension = format!(".{}", options.format);
        let mut total_frames = 0_i64;
        let mut disk_space_used = 0_i64;
        for entry in std::fs::read_dir(&output_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with("frame_") && name.ends_with(&extension) {
                total_frames += 1;
                disk_space_used += entry.metadata()?.len() as i64;
            }
        }

        Ok(FrameExtraction {
            output_directory: output_dir,
            total_frames,
            disk_space_used,
        })
    }

    fn render_clip(
        &self,
        frame_list: &Path,
        output: &Path,
        loop_playback: bool,
    ) -> Result<(), AppError> {
        let mut command = Command::new("ffmpeg");
        command.args([
            "-v",
            "quiet",
            "-y",
            "-safe",
            "0",
            "-f",
            "concat",
            "-i",
            Self::path_arg(frame_list)?,
            "-vf",
            "split[s0][s1];[s0]palettegen[p];[s1][p]paletteuse",
        ]);
        if !loop_playback {
            command.args(["-loop", "-1"]);
        }
        command.arg(Self::path_arg(output)?);

        Self::run(command, "ffmpeg clip rendering")?;
        Ok(())
    }
}
