use anyhow::Result;
use serde_json::json;

use crate::cli::{GenerateArgs, SubtitlesArgs};
use crate::config::ReelConfig;
use crate::engines::{
    FfprobeProber, GeminiScriptGenerator, GttsSynthesizer, SystemFfmpegRunner,
    WhisperXTranscriber,
};
use crate::error::ReelError;
use crate::pipeline::{
    ConsoleProgress, Engines, PipelineOrchestrator, RunRequest, ScriptSource, transcribe_to_srt,
};
use crate::ui::prelude::{Level, emit};

/// Fold per-run flags into the loaded configuration.
pub fn apply_generate_overrides(config: &mut ReelConfig, args: &GenerateArgs) {
    if let Some(language) = &args.language {
        config.language = language.clone();
    }
    if let Some(voice) = &args.voice {
        config.voice = voice.clone();
    }
    if let Some(work_dir) = &args.work_dir {
        config.work_dir = Some(work_dir.clone());
    }
    if let Some(words) = args.words_per_cue {
        config.max_words_per_cue = words;
    }
}

pub fn handle_generate(mut config: ReelConfig, args: GenerateArgs) -> Result<()> {
    apply_generate_overrides(&mut config, &args);
    config.validate()?;

    let script = ScriptSource::from_args(args.script_file, args.prompt)?;
    let request = RunRequest {
        script,
        source_dir: args.videos,
        output: args.output,
        language: config.language.clone(),
        voice: config.voice.clone(),
    };

    let script_generator = GeminiScriptGenerator::new(config.script.clone());
    let transcriber = WhisperXTranscriber::new(config.transcription.clone());
    let engines = Engines {
        script: &script_generator,
        speech: &GttsSynthesizer,
        transcriber: &transcriber,
        prober: &FfprobeProber,
        ffmpeg: &SystemFfmpegRunner,
    };
    let progress = ConsoleProgress::new();
    let mut orchestrator = PipelineOrchestrator::new(&config, engines, &progress);

    let output = orchestrator.run(&request, &mut rand::thread_rng())?;
    drop(progress);

    emit(
        Level::Success,
        "reel.generate.done",
        &format!("Video written to {}", output.display()),
        Some(json!({ "output": output.display().to_string() })),
    );
    Ok(())
}

pub fn handle_subtitles(mut config: ReelConfig, args: SubtitlesArgs) -> Result<()> {
    if let Some(words) = args.words_per_cue {
        config.max_words_per_cue = words;
    }
    config.validate()?;

    if !args.audio.is_file() {
        return Err(ReelError::config(format!(
            "Audio file {} does not exist",
            args.audio.display()
        ))
        .into());
    }

    emit(
        Level::Info,
        "reel.subtitles.start",
        &format!("Transcribing {}...", args.audio.display()),
        None,
    );

    let transcriber = WhisperXTranscriber::new(config.transcription.clone());
    let cues = transcribe_to_srt(
        &transcriber,
        &args.audio,
        &args.output,
        args.language.as_deref(),
        config.max_words_per_cue,
    )?;

    emit(
        Level::Success,
        "reel.subtitles.done",
        &format!("Wrote {} cues to {}", cues.len(), args.output.display()),
        Some(json!({ "cues": cues.len(), "output": args.output.display().to_string() })),
    );
    Ok(())
}
