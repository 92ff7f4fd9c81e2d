//! ffmpeg argument lists for the two encoding passes.
//!
//! The first pass cuts the clip window out of the background video, crops it
//! to 9:16, burns the subtitles in and drops every non-video stream. The
//! second pass copies that silent video and attaches the narration.

use std::path::Path;

use super::window::ClipWindow;
use crate::config::EncodingConfig;

/// Crop rectangle in source pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

impl CropRect {
    fn filter(&self) -> String {
        format!("crop={}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}

/// Full-height 9:16 crop centered horizontally.
///
/// The width is rounded down to an even number for yuv420 encoders and never
/// exceeds the source width.
pub fn portrait_crop(source_width: u32, source_height: u32) -> CropRect {
    let ideal = (u64::from(source_height) * 9 / 16) as u32;
    let width = (ideal.min(source_width) & !1).max(2u32.min(source_width));
    CropRect {
        width,
        height: source_height,
        x: (source_width - width) / 2,
        y: 0,
    }
}

pub struct ClipPass<'a> {
    pub source: &'a Path,
    pub window: ClipWindow,
    pub crop: CropRect,
    pub subtitles: &'a Path,
    pub style: &'a str,
    pub encoding: &'a EncodingConfig,
    pub output: &'a Path,
}

pub fn clip_args(pass: &ClipPass<'_>) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-ss".to_string(),
        format_time(pass.window.start),
        "-t".to_string(),
        format_time(pass.window.duration),
        "-i".to_string(),
        pass.source.to_string_lossy().into_owned(),
        "-vf".to_string(),
        format!(
            "{crop},subtitles=filename='{path}':force_style='{style}'",
            crop = pass.crop.filter(),
            path = escape_ffmpeg_path(pass.subtitles),
            style = escape_filter_value(pass.style),
        ),
        "-an".to_string(),
        "-sn".to_string(),
        "-dn".to_string(),
        "-map_metadata".to_string(),
        "-1".to_string(),
        "-map_chapters".to_string(),
        "-1".to_string(),
        "-c:v".to_string(),
        pass.encoding.video_codec.clone(),
    ];

    if let Some(bitrate) = &pass.encoding.video_bitrate {
        args.push("-b:v".to_string());
        args.push(bitrate.clone());
    }
    if let Some(preset) = &pass.encoding.preset {
        args.push("-preset".to_string());
        args.push(preset.clone());
    }
    if let Some(crf) = pass.encoding.crf {
        args.push("-crf".to_string());
        args.push(crf.to_string());
    }

    args.push(pass.output.to_string_lossy().into_owned());
    args
}

/// Copy the video stream of `video` and replace its audio with `audio`.
pub fn mux_args(video: &Path, audio: &Path, encoding: &EncodingConfig, output: &Path) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-i".to_string(),
        video.to_string_lossy().into_owned(),
        "-i".to_string(),
        audio.to_string_lossy().into_owned(),
        "-map".to_string(),
        "0:v:0".to_string(),
        "-map".to_string(),
        "1:a:0".to_string(),
        "-c:v".to_string(),
        "copy".to_string(),
        "-c:a".to_string(),
        encoding.audio_codec.clone(),
    ];

    if let Some(bitrate) = &encoding.audio_bitrate {
        args.push("-b:a".to_string());
        args.push(bitrate.clone());
    }

    args.extend(
        ["-map_metadata", "-1", "-movflags", "+faststart"]
            .iter()
            .map(|s| s.to_string()),
    );
    args.push(output.to_string_lossy().into_owned());
    args
}

fn format_time(value: f64) -> String {
    format!("{value:.6}")
}

/// Escape a path for use inside a quoted ffmpeg filter option.
fn escape_ffmpeg_path(path: &Path) -> String {
    escape_filter_value(&path.to_string_lossy())
}

fn escape_filter_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\'', "'\\''")
        .replace(':', "\\:")
}
