//! Collaborators the pipeline drives: speech synthesis, transcription, media
//! probing, encoding and script generation.
//!
//! Each concern is a narrow trait so the orchestrator can be exercised with
//! in-process fakes. The shipped implementations shell out to external tools
//! or call a remote API and report failures as `anyhow` errors; the
//! orchestrator tags them with the stage that produced them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::media::probe::ProbeReport;
use crate::subtitles::TranscriptSegment;

pub mod ffmpeg;
pub mod ffprobe;
pub mod gemini;
pub mod speech;
pub mod whisperx;

pub use ffmpeg::{FfmpegRunOptions, FfmpegRunner, SystemFfmpegRunner};
pub use ffprobe::FfprobeProber;
pub use gemini::GeminiScriptGenerator;
pub use speech::GttsSynthesizer;
pub use whisperx::WhisperXTranscriber;

pub trait SpeechSynthesizer {
    /// Speak `text` into an audio file at `output`.
    fn synthesize(&self, text: &str, language: &str, voice: &str, output: &Path) -> Result<()>;
}

/// Transcription output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub segments: Vec<TranscriptSegment>,
    /// Language reported by the engine, empty when it did not say
    pub language: String,
}

pub trait Transcriber {
    fn transcribe(&self, audio: &Path, language: Option<&str>) -> Result<Transcript>;
}

pub trait MediaProber {
    fn probe(&self, path: &Path) -> Result<ProbeReport>;
}

pub trait ScriptGenerator {
    /// Turn a short user prompt into narration text.
    fn generate(&self, user_input: &str) -> Result<String>;
}

/// Resolve an executable on `PATH`.
pub fn locate_tool(name: &str) -> Result<PathBuf> {
    which::which(name).with_context(|| format!("{name} not found on PATH"))
}
