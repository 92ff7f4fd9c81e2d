use std::fs;
use std::path::{Path, PathBuf};

use rand::RngCore;
use serde_json::json;

use super::progress::ProgressObserver;
use super::run::PipelineRun;
use super::stage::Stage;
use crate::config::{ArtifactNames, ReelConfig};
use crate::engines::{
    FfmpegRunOptions, FfmpegRunner, MediaProber, ScriptGenerator, SpeechSynthesizer, Transcriber,
};
use crate::error::{EngineResultExt, EngineStage, ReelError, ReelResult};
use crate::media::compose::{ClipPass, clip_args, mux_args, portrait_crop};
use crate::media::library::select_source_video;
use crate::media::probe::{StreamKind, probe_duration, probe_video};
use crate::media::window::select_window;
use crate::subtitles::{split_segments, srt};
use crate::ui::prelude::{Level, OutputFormat, emit, get_output_format};

/// Where the narration text comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptSource {
    File(PathBuf),
    Prompt(String),
}

impl ScriptSource {
    /// Exactly one of the two inputs must be given.
    pub fn from_args(file: Option<PathBuf>, prompt: Option<String>) -> ReelResult<Self> {
        match (file, prompt) {
            (Some(path), None) => Ok(ScriptSource::File(path)),
            (None, Some(prompt)) => Ok(ScriptSource::Prompt(prompt)),
            (Some(_), Some(_)) => Err(ReelError::config(
                "Pass either a script file or a prompt, not both",
            )),
            (None, None) => Err(ReelError::config("A script file or a prompt is required")),
        }
    }
}

/// Inputs of one pipeline run
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub script: ScriptSource,
    /// Folder holding the background videos
    pub source_dir: PathBuf,
    pub output: PathBuf,
    pub language: String,
    pub voice: String,
}

/// The external collaborators used by a run
#[derive(Clone, Copy)]
pub struct Engines<'a> {
    pub script: &'a dyn ScriptGenerator,
    pub speech: &'a dyn SpeechSynthesizer,
    pub transcriber: &'a dyn Transcriber,
    pub prober: &'a dyn MediaProber,
    pub ffmpeg: &'a dyn FfmpegRunner,
}

/// Drives a run from script to finished video.
///
/// Stages run strictly in order and each one is announced to the observer
/// before its work starts. On any error the run moves to [`Stage::Failed`],
/// removes what it created and hands the original error back.
pub struct PipelineOrchestrator<'a> {
    config: &'a ReelConfig,
    engines: Engines<'a>,
    observer: &'a dyn ProgressObserver,
    stage: Stage,
}

impl<'a> PipelineOrchestrator<'a> {
    pub fn new(
        config: &'a ReelConfig,
        engines: Engines<'a>,
        observer: &'a dyn ProgressObserver,
    ) -> Self {
        Self {
            config,
            engines,
            observer,
            stage: Stage::Idle,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn run(&mut self, request: &RunRequest, rng: &mut dyn RngCore) -> ReelResult<PathBuf> {
        let mut run = PipelineRun::new(self.config.resolved_work_dir());
        self.enter(Stage::Idle);

        match self.execute(request, rng, &mut run) {
            Ok(output) => {
                self.enter(Stage::CleanedUp);
                let removed = run.cleanup();
                emit(
                    Level::Debug,
                    "reel.cleanup.done",
                    &format!("Removed {removed} temporary files"),
                    None,
                );
                self.enter(Stage::Done);
                Ok(output)
            }
            Err(err) => {
                self.enter(Stage::Failed);
                run.cleanup();
                Err(err)
            }
        }
    }

    fn enter(&mut self, stage: Stage) {
        self.stage = stage;
        self.observer.stage_started(stage, stage.description());
    }

    fn execute(
        &mut self,
        request: &RunRequest,
        rng: &mut dyn RngCore,
        run: &mut PipelineRun,
    ) -> ReelResult<PathBuf> {
        let config = self.config;
        let engines = self.engines;

        let source = select_source_video(&request.source_dir, &config.video_extensions, rng)?;
        emit(
            Level::Debug,
            "reel.source.selected",
            &format!("Using background video {}", source.display()),
            None,
        );
        check_output_path(&request.output, &source, run.work_dir(), &config.artifacts)?;
        let script = self.resolve_script(&request.script)?;
        run.prepare()?;

        self.enter(Stage::AudioSynthesized);
        let audio = run.artifact(&config.artifacts.audio);
        engines
            .speech
            .synthesize(&script, &request.language, &request.voice, &audio)
            .engine_stage(EngineStage::Synthesis)?;

        self.enter(Stage::Transcribed);
        let transcript = engines
            .transcriber
            .transcribe(&audio, Some(request.language.as_str()))
            .engine_stage(EngineStage::Transcription)?;
        if !transcript.language.is_empty() {
            emit(
                Level::Debug,
                "reel.transcribe.language",
                &format!("Detected language: {}", transcript.language),
                Some(json!({ "language": transcript.language })),
            );
        }

        self.enter(Stage::SubtitlesWritten);
        let cues = split_segments(&transcript.segments, config.max_words_per_cue);
        if cues.is_empty() {
            emit(
                Level::Warn,
                "reel.subtitles.empty",
                "Transcription returned no words; the video will have no subtitles",
                None,
            );
        }
        let subtitles = run.artifact(&config.artifacts.subtitles);
        srt::write(&subtitles, &cues)?;

        self.enter(Stage::ClipExtracted);
        let audio_duration = probe_duration(engines.prober, &audio, StreamKind::Audio)?;
        let video = probe_video(engines.prober, &source)?;
        let window = select_window(video.duration, audio_duration, rng)?;
        emit(
            Level::Debug,
            "reel.clip.window",
            &format!(
                "Cutting {:.3}s to {:.3}s of {}",
                window.start,
                window.end(),
                source.display()
            ),
            None,
        );
        let silent_clip = run.artifact(&config.artifacts.silent_clip);
        let args = clip_args(&ClipPass {
            source: &source,
            window,
            crop: portrait_crop(video.width, video.height),
            subtitles: &subtitles,
            style: &config.subtitle_style,
            encoding: &config.encoding,
            output: &silent_clip,
        });
        engines
            .ffmpeg
            .run(&args, ffmpeg_options(window.duration))
            .engine_stage(EngineStage::Encode)?;

        self.enter(Stage::AudioMuxed);
        if let Some(parent) = request.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                ReelError::io(
                    format!("Failed to create output directory {}", parent.display()),
                    err,
                )
            })?;
        }
        let partial = partial_output_path(&request.output);
        run.track(partial.clone());
        let args = mux_args(&silent_clip, &audio, &config.encoding, &partial);
        engines
            .ffmpeg
            .run(&args, ffmpeg_options(window.duration))
            .engine_stage(EngineStage::Mux)?;
        fs::rename(&partial, &request.output).map_err(|err| {
            ReelError::io(
                format!("Failed to move the finished video to {}", request.output.display()),
                err,
            )
        })?;
        run.release(&request.output);

        Ok(request.output.clone())
    }

    fn resolve_script(&self, source: &ScriptSource) -> ReelResult<String> {
        let script = match source {
            ScriptSource::File(path) => fs::read_to_string(path).map_err(|err| {
                ReelError::io(format!("Failed to read script {}", path.display()), err)
            })?,
            ScriptSource::Prompt(prompt) => self
                .engines
                .script
                .generate(prompt)
                .engine_stage(EngineStage::ScriptGeneration)?,
        };

        let script = script.trim();
        if script.is_empty() {
            return Err(ReelError::config("The narration script is empty"));
        }
        Ok(script.to_string())
    }
}

/// Reject an output path that would overwrite the background video or one of
/// the run's temporary files.
fn check_output_path(
    output: &Path,
    source: &Path,
    work_dir: &Path,
    artifacts: &ArtifactNames,
) -> ReelResult<()> {
    let partial = partial_output_path(output);
    let mut reserved = vec![source.to_path_buf()];
    reserved.extend(
        [&artifacts.audio, &artifacts.subtitles, &artifacts.silent_clip]
            .iter()
            .map(|name| work_dir.join(name)),
    );

    for path in &reserved {
        if same_path(output, path) || same_path(&partial, path) {
            return Err(ReelError::config(format!(
                "Output {} would overwrite {}",
                output.display(),
                path.display()
            )));
        }
    }
    Ok(())
}

fn same_path(a: &Path, b: &Path) -> bool {
    if let (Ok(a), Ok(b)) = (a.canonicalize(), b.canonicalize()) {
        return a == b;
    }
    match (std::path::absolute(a), std::path::absolute(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn ffmpeg_options(duration: f64) -> FfmpegRunOptions {
    FfmpegRunOptions::new(Some(duration), crate::ui::is_debug_enabled())
        .quiet(get_output_format() == OutputFormat::Json)
}

/// `out/final.mp4` becomes `out/final.partial.mp4`.
pub fn partial_output_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let name = match output.extension() {
        Some(ext) => format!("{stem}.partial.{}", ext.to_string_lossy()),
        None => format!("{stem}.partial"),
    };
    output.with_file_name(name)
}
