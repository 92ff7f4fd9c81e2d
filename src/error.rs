use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::media::probe::StreamKind;

/// External engine operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStage {
    ScriptGeneration,
    Synthesis,
    Transcription,
    Probe,
    Encode,
    Mux,
}

impl fmt::Display for EngineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineStage::ScriptGeneration => "script generation",
            EngineStage::Synthesis => "speech synthesis",
            EngineStage::Transcription => "transcription",
            EngineStage::Probe => "media probe",
            EngineStage::Encode => "clip encoding",
            EngineStage::Mux => "audio mux",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ReelError {
    #[error("No source video found in {}", .dir.display())]
    NoSourceVideoAvailable { dir: PathBuf },

    #[error("{}", stream_not_found_message(.kind, .path))]
    StreamNotFound { kind: StreamKind, path: PathBuf },

    #[error(
        "Source video is too short: {source_duration:.3}s available, narration needs {target_duration:.3}s"
    )]
    InsufficientDuration {
        source_duration: f64,
        target_duration: f64,
    },

    #[error("{stage} failed: {message}")]
    ExternalEngineFailure { stage: EngineStage, message: String },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

fn stream_not_found_message(kind: &StreamKind, path: &std::path::Path) -> String {
    match kind {
        StreamKind::Audio => format!("No audio stream produced in {}", path.display()),
        StreamKind::Video => format!(
            "Source {} has no usable video stream",
            path.display()
        ),
    }
}

impl ReelError {
    pub fn engine(stage: EngineStage, err: anyhow::Error) -> Self {
        ReelError::ExternalEngineFailure {
            stage,
            message: format!("{err:#}"),
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ReelError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        ReelError::ConfigurationError(message.into())
    }
}

pub type ReelResult<T> = std::result::Result<T, ReelError>;

/// Tags adapter failures with the engine operation that produced them
pub trait EngineResultExt<T> {
    fn engine_stage(self, stage: EngineStage) -> ReelResult<T>;
}

impl<T> EngineResultExt<T> for anyhow::Result<T> {
    fn engine_stage(self, stage: EngineStage) -> ReelResult<T> {
        self.map_err(|err| ReelError::engine(stage, err))
    }
}
