use clap::{ArgGroup, Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::ui::OutputFormat;

/// Turn a text script into a narrated, subtitled vertical video
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Print debug events and ffmpeg output
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Output format for status messages
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub output_format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use this config file instead of the default location
    #[arg(long, value_hint = ValueHint::FilePath, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate a narrated vertical video from a script file or a prompt
    Generate(GenerateArgs),
    /// Transcribe an audio file into SRT subtitles
    Subtitles(SubtitlesArgs),
}

#[derive(Args, Debug, Clone)]
#[command(group(
    ArgGroup::new("script_input")
        .required(true)
        .args(["script_file", "prompt"]),
))]
pub struct GenerateArgs {
    /// Where to write the finished video
    #[arg(short = 'o', long = "output", value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Text file holding the narration
    #[arg(short = 's', long, value_hint = ValueHint::FilePath)]
    pub script_file: Option<PathBuf>,

    /// Topic for the generated narration
    #[arg(short = 'p', long)]
    pub prompt: Option<String>,

    /// Folder with the background videos
    #[arg(long, default_value = "bases", value_hint = ValueHint::DirPath)]
    pub videos: PathBuf,

    /// Narration language (overrides the config)
    #[arg(short = 'l', long)]
    pub language: Option<String>,

    /// Speech accent, as a Google top-level domain such as com or ca
    #[arg(long)]
    pub voice: Option<String>,

    /// Scratch directory for temporary files
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub work_dir: Option<PathBuf>,

    /// Maximum number of words per subtitle cue
    #[arg(long)]
    pub words_per_cue: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct SubtitlesArgs {
    /// Narration audio to transcribe
    #[arg(value_hint = ValueHint::FilePath)]
    pub audio: PathBuf,

    /// Where to write the SRT file
    #[arg(short = 'o', long = "output", value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Spoken language hint; detected automatically when omitted
    #[arg(short = 'l', long)]
    pub language: Option<String>,

    /// Maximum number of words per subtitle cue
    #[arg(long)]
    pub words_per_cue: Option<usize>,
}
