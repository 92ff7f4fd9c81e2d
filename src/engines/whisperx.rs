use std::ffi::OsString;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use duct::cmd;
use serde::Deserialize;

use super::{Transcript, Transcriber, locate_tool};
use crate::config::TranscriptionConfig;
use crate::subtitles::TranscriptSegment;
use crate::ui::prelude::{Level, emit};

/// Speech recognition with WhisperX, run through `uvx`
#[derive(Debug, Clone)]
pub struct WhisperXTranscriber {
    config: TranscriptionConfig,
}

impl WhisperXTranscriber {
    pub fn new(config: TranscriptionConfig) -> Self {
        Self { config }
    }

    fn args(&self, audio: &Path, output_dir: &Path, language: Option<&str>) -> Vec<OsString> {
        let mut args = vec![
            OsString::from("--python"),
            OsString::from("3.10"),
            OsString::from("whisperx"),
            audio.as_os_str().to_os_string(),
            OsString::from("--output_format"),
            OsString::from("json"),
            OsString::from("--output_dir"),
            output_dir.as_os_str().to_os_string(),
            OsString::from("--model"),
            OsString::from(&self.config.model),
            OsString::from("--compute_type"),
            OsString::from(&self.config.compute_type),
            OsString::from("--device"),
            OsString::from(&self.config.device),
        ];

        if let Some(language) = language.filter(|lang| !lang.trim().is_empty()) {
            args.push(OsString::from("--language"));
            args.push(OsString::from(language));
        }

        args
    }
}

impl Transcriber for WhisperXTranscriber {
    fn transcribe(&self, audio: &Path, language: Option<&str>) -> Result<Transcript> {
        let uvx = locate_tool("uvx")?;
        let output_dir = tempfile::Builder::new()
            .prefix("reelgen-whisperx")
            .tempdir()
            .context("Failed to create WhisperX output directory")?;

        emit(
            Level::Debug,
            "reel.transcribe.command",
            &format!("Running WhisperX on {}", audio.display()),
            None,
        );

        let result = cmd(uvx, self.args(audio, output_dir.path(), language))
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .with_context(|| format!("Failed to run WhisperX for {}", audio.display()))?;

        if !result.status.success() {
            bail!(
                "WhisperX exited with status {:?}: {}",
                result.status.code(),
                last_lines(&String::from_utf8_lossy(&result.stderr), 5)
            );
        }

        let stem = audio
            .file_stem()
            .with_context(|| format!("{} has no file name", audio.display()))?;
        let json_path = output_dir
            .path()
            .join(format!("{}.json", stem.to_string_lossy()));
        let contents = fs::read_to_string(&json_path).with_context(|| {
            format!(
                "WhisperX did not produce the expected transcript at {}",
                json_path.display()
            )
        })?;

        parse_whisperx_json(&contents)
            .with_context(|| format!("Failed to parse WhisperX output {}", json_path.display()))
    }
}

#[derive(Debug, Deserialize)]
struct RawTranscript {
    #[serde(default)]
    segments: Vec<TranscriptSegment>,
    #[serde(default)]
    language: Option<String>,
}

pub fn parse_whisperx_json(json: &str) -> Result<Transcript> {
    let raw: RawTranscript = serde_json::from_str(json)?;

    for segment in &raw.segments {
        if !(segment.start.is_finite() && segment.end.is_finite()) || segment.end < segment.start {
            bail!(
                "segment '{}' has invalid timing {}..{}",
                segment.text.trim(),
                segment.start,
                segment.end
            );
        }
    }

    Ok(Transcript {
        segments: raw.segments,
        language: raw.language.unwrap_or_default(),
    })
}

fn last_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
    let skip = lines.len().saturating_sub(count);
    lines[skip..].join("\n")
}
