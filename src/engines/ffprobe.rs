use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{MediaProber, locate_tool};
use crate::media::probe::{ProbeReport, StreamInfo};

/// Reads stream information with `ffprobe -show_streams -show_format`
#[derive(Debug, Default, Clone, Copy)]
pub struct FfprobeProber;

impl MediaProber for FfprobeProber {
    fn probe(&self, path: &Path) -> Result<ProbeReport> {
        let program = locate_tool("ffprobe")?;
        let output = Command::new(program)
            .args([
                "-v",
                "error",
                "-show_streams",
                "-show_format",
                "-of",
                "json",
            ])
            .arg(path)
            .output()
            .with_context(|| format!("Failed to run ffprobe for {}", path.display()))?;

        if !output.status.success() {
            anyhow::bail!(
                "ffprobe failed for {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = String::from_utf8(output.stdout)
            .with_context(|| format!("ffprobe returned non-UTF8 output for {}", path.display()))?;
        parse_ffprobe_json(&stdout)
            .with_context(|| format!("Failed to parse ffprobe output for {}", path.display()))
    }
}

#[derive(Debug, Deserialize)]
struct RawProbe {
    #[serde(default)]
    streams: Vec<RawStream>,
    format: Option<RawFormat>,
}

#[derive(Debug, Deserialize)]
struct RawStream {
    #[serde(default)]
    codec_type: String,
    duration: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    duration: Option<String>,
}

pub fn parse_ffprobe_json(json: &str) -> Result<ProbeReport> {
    let raw: RawProbe = serde_json::from_str(json)?;

    let streams = raw
        .streams
        .into_iter()
        .map(|stream| StreamInfo {
            codec_type: stream.codec_type,
            duration: parse_seconds(stream.duration.as_deref()),
            width: stream.width,
            height: stream.height,
        })
        .collect();

    Ok(ProbeReport {
        streams,
        format_duration: raw
            .format
            .and_then(|format| parse_seconds(format.duration.as_deref())),
    })
}

/// ffprobe reports durations as decimal strings, or `N/A` when unknown.
fn parse_seconds(value: Option<&str>) -> Option<f64> {
    value?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::probe::StreamKind;

    const SAMPLE: &str = r#"{
        "streams": [
            {
                "index": 0,
                "codec_name": "h264",
                "codec_type": "video",
                "width": 1920,
                "height": 1080,
                "duration": "63.063000"
            },
            {
                "index": 1,
                "codec_name": "aac",
                "codec_type": "audio",
                "sample_rate": "48000",
                "duration": "N/A"
            }
        ],
        "format": {
            "filename": "bg.mkv",
            "duration": "63.100000"
        }
    }"#;

    #[test]
    fn streams_and_format_are_read() {
        let report = parse_ffprobe_json(SAMPLE).unwrap();

        let video = report.first_stream(StreamKind::Video).unwrap();
        assert_eq!(video.duration, Some(63.063));
        assert_eq!(video.width, Some(1920));
        assert_eq!(video.height, Some(1080));

        let audio = report.first_stream(StreamKind::Audio).unwrap();
        assert_eq!(audio.duration, None);
        assert_eq!(report.format_duration, Some(63.1));
    }

    #[test]
    fn empty_output_has_no_streams() {
        let report = parse_ffprobe_json("{}").unwrap();
        assert!(report.streams.is_empty());
        assert_eq!(report.format_duration, None);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_ffprobe_json("not json").is_err());
    }
}
