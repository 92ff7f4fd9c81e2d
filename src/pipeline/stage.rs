use std::fmt;

/// States of one pipeline run, in execution order.
///
/// `Failed` can be entered from any state before `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    AudioSynthesized,
    Transcribed,
    SubtitlesWritten,
    ClipExtracted,
    AudioMuxed,
    CleanedUp,
    Done,
    Failed,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::AudioSynthesized => "audio_synthesized",
            Stage::Transcribed => "transcribed",
            Stage::SubtitlesWritten => "subtitles_written",
            Stage::ClipExtracted => "clip_extracted",
            Stage::AudioMuxed => "audio_muxed",
            Stage::CleanedUp => "cleaned_up",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }

    /// What the pipeline is doing while it works toward this state
    pub fn description(self) -> &'static str {
        match self {
            Stage::Idle => "Picking a background video and preparing the script",
            Stage::AudioSynthesized => "Synthesizing narration",
            Stage::Transcribed => "Transcribing narration",
            Stage::SubtitlesWritten => "Writing subtitles",
            Stage::ClipExtracted => "Cutting, cropping and subtitling the background clip",
            Stage::AudioMuxed => "Adding narration to the clip",
            Stage::CleanedUp => "Removing temporary files",
            Stage::Done => "Video ready",
            Stage::Failed => "Video generation failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
