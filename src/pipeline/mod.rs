//! Script to finished video, one stage at a time.

use std::path::Path;

use crate::engines::Transcriber;
use crate::error::{EngineResultExt, EngineStage, ReelResult};
use crate::subtitles::{SubtitleCue, split_segments, srt};

pub mod orchestrator;
pub mod progress;
pub mod run;
pub mod stage;

pub use orchestrator::{Engines, PipelineOrchestrator, RunRequest, ScriptSource};
pub use progress::{ConsoleProgress, ProgressObserver};
pub use run::PipelineRun;
pub use stage::Stage;

/// Transcribe `audio` and write the resulting cues to `output` as SRT.
pub fn transcribe_to_srt(
    transcriber: &dyn Transcriber,
    audio: &Path,
    output: &Path,
    language: Option<&str>,
    max_words_per_cue: usize,
) -> ReelResult<Vec<SubtitleCue>> {
    let transcript = transcriber
        .transcribe(audio, language)
        .engine_stage(EngineStage::Transcription)?;
    let cues = split_segments(&transcript.segments, max_words_per_cue);
    srt::write(output, &cues)?;
    Ok(cues)
}
