use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::paths;
use crate::error::{ReelError, ReelResult};

pub const PROMPT_PLACEHOLDER: &str = "{{prompt}}";

/// Everything a pipeline run needs to know besides its inputs.
///
/// Loaded from `config.toml`; command-line flags override individual fields
/// for a single run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReelConfig {
    /// Narration language passed to speech synthesis and transcription
    pub language: String,
    /// Accent selector for the speech engine (Google top-level domain)
    pub voice: String,
    /// Upper bound of words shown in a single subtitle cue
    pub max_words_per_cue: usize,
    /// Extensions accepted when picking a background video
    pub video_extensions: Vec<String>,
    /// Scratch directory for one run's temporary files
    pub work_dir: Option<PathBuf>,
    pub artifacts: ArtifactNames,
    /// ASS `force_style` string used when burning subtitles
    pub subtitle_style: String,
    pub encoding: EncodingConfig,
    pub transcription: TranscriptionConfig,
    pub script: ScriptConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtifactNames {
    pub audio: String,
    pub subtitles: String,
    pub silent_clip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EncodingConfig {
    pub video_codec: String,
    pub video_bitrate: Option<String>,
    pub preset: Option<String>,
    pub crf: Option<u8>,
    pub audio_codec: String,
    pub audio_bitrate: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub model: String,
    pub compute_type: String,
    pub device: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScriptConfig {
    pub model: String,
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Prompt sent to the model; `{{prompt}}` is replaced by the user's text
    pub prompt_template: String,
    pub timeout_secs: u64,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            language: "fr".to_string(),
            voice: "com".to_string(),
            max_words_per_cue: 5,
            video_extensions: vec!["mp4".to_string(), "avi".to_string(), "mov".to_string()],
            work_dir: None,
            artifacts: ArtifactNames::default(),
            subtitle_style: Self::DEFAULT_SUBTITLE_STYLE.to_string(),
            encoding: EncodingConfig::default(),
            transcription: TranscriptionConfig::default(),
            script: ScriptConfig::default(),
        }
    }
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            audio: "audio.mp3".to_string(),
            subtitles: "sub.srt".to_string(),
            silent_clip: "clip.mp4".to_string(),
        }
    }
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            video_bitrate: Some("5000k".to_string()),
            preset: Some("slow".to_string()),
            crf: Some(18),
            audio_codec: "aac".to_string(),
            audio_bitrate: Some("192k".to_string()),
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: "small".to_string(),
            compute_type: "float32".to_string(),
            device: "cpu".to_string(),
        }
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            prompt_template: "Write the narration for a 60 second vertical video about {{prompt}}. \
                Answer with the spoken text only, without stage directions."
                .to_string(),
            timeout_secs: 120,
        }
    }
}

impl ReelConfig {
    pub const DEFAULT_SUBTITLE_STYLE: &'static str = "FontName=Arial,FontSize=16,Bold=1,\
        PrimaryColour=&H00FFFFFF,OutlineColour=&H00000000,BorderStyle=1,Outline=2,\
        Shadow=0,Alignment=2,MarginV=70";

    pub fn load() -> Result<Self> {
        Self::load_from_path(paths::config_file_path()?)
    }

    /// Read the config at `path`, writing the defaults there first if the file is missing.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let config = Self::default();
            config.save_to_path(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading reelgen config from {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing reelgen config {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {}", parent.display()))?;
        }

        let toml = toml::to_string_pretty(self).context("serializing reelgen config")?;
        fs::write(path, toml)
            .with_context(|| format!("writing reelgen config to {}", path.display()))?;
        Ok(())
    }

    /// Apply the `MODEL` and `MODEL_PROMPT` environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(model) = lookup("MODEL").filter(|v| !v.trim().is_empty()) {
            self.script.model = model;
        }
        if let Some(prompt) = lookup("MODEL_PROMPT").filter(|v| !v.trim().is_empty()) {
            self.script.prompt_template = prompt;
        }
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.max_words_per_cue == 0 {
            return Err(ReelError::config("max_words_per_cue must be at least 1"));
        }
        if self.video_extensions.iter().all(|ext| ext.trim().is_empty()) {
            return Err(ReelError::config("video_extensions must list at least one extension"));
        }
        if self.language.trim().is_empty() {
            return Err(ReelError::config("language must not be empty"));
        }
        for (name, value) in [
            ("artifacts.audio", &self.artifacts.audio),
            ("artifacts.subtitles", &self.artifacts.subtitles),
            ("artifacts.silent_clip", &self.artifacts.silent_clip),
        ] {
            if value.trim().is_empty() || Path::new(value).components().count() != 1 {
                return Err(ReelError::config(format!(
                    "{name} must be a plain file name, got '{value}'"
                )));
            }
        }
        if !self.script.prompt_template.contains(PROMPT_PLACEHOLDER) {
            return Err(ReelError::config(format!(
                "script.prompt_template must contain the {PROMPT_PLACEHOLDER} placeholder"
            )));
        }
        Ok(())
    }

    /// Work directory with `~` and environment variables expanded.
    pub fn resolved_work_dir(&self) -> PathBuf {
        match &self.work_dir {
            Some(dir) => {
                let raw = dir.to_string_lossy();
                match shellexpand::full(&raw) {
                    Ok(expanded) => PathBuf::from(expanded.as_ref()),
                    Err(_) => dir.clone(),
                }
            }
            None => paths::default_work_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = ReelConfig::load_from_path(&path).unwrap();

        assert_eq!(config, ReelConfig::default());
        assert!(path.exists());
        let reloaded = ReelConfig::load_from_path(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "language = \"en\"\nmax_words_per_cue = 3\n\n[encoding]\npreset = \"veryfast\"\n",
        )
        .unwrap();

        let config = ReelConfig::load_from_path(&path).unwrap();

        assert_eq!(config.language, "en");
        assert_eq!(config.max_words_per_cue, 3);
        assert_eq!(config.encoding.preset.as_deref(), Some("veryfast"));
        assert_eq!(config.encoding.video_codec, "libx264");
        assert_eq!(config.artifacts, ArtifactNames::default());
    }

    #[test]
    fn invalid_toml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_words_per_cue = \"five\"").unwrap();
        assert!(ReelConfig::load_from_path(&path).is_err());
    }

    #[test]
    fn defaults_are_valid() {
        ReelConfig::default().validate().unwrap();
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = ReelConfig::default();
        config.max_words_per_cue = 0;
        assert!(matches!(
            config.validate(),
            Err(ReelError::ConfigurationError(_))
        ));

        let mut config = ReelConfig::default();
        config.script.prompt_template = "no placeholder".to_string();
        assert!(config.validate().is_err());

        let mut config = ReelConfig::default();
        config.artifacts.subtitles = "../escape.srt".to_string();
        assert!(config.validate().is_err());

        let mut config = ReelConfig::default();
        config.video_extensions = vec![" ".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn environment_overrides_script_settings() {
        let env: HashMap<&str, &str> =
            HashMap::from([("MODEL", "gemini-pro"), ("MODEL_PROMPT", "Say {{prompt}}")]);
        let mut config = ReelConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.script.model, "gemini-pro");
        assert_eq!(config.script.prompt_template, "Say {{prompt}}");
    }

    #[test]
    fn blank_environment_values_are_ignored() {
        let mut config = ReelConfig::default();
        config.apply_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.script, ScriptConfig::default());
    }

    #[test]
    fn explicit_work_dir_is_expanded() {
        let config = ReelConfig {
            work_dir: Some(PathBuf::from("/tmp/reelgen-run")),
            ..ReelConfig::default()
        };
        assert_eq!(config.resolved_work_dir(), PathBuf::from("/tmp/reelgen-run"));
    }
}
