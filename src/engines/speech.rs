use std::ffi::OsString;
use std::path::Path;

use anyhow::{Context, Result, bail};
use duct::cmd;

use super::{SpeechSynthesizer, locate_tool};

/// Google Translate text-to-speech through `gtts-cli`, run with `uvx`
#[derive(Debug, Default, Clone, Copy)]
pub struct GttsSynthesizer;

impl GttsSynthesizer {
    fn args(language: &str, voice: &str, output: &Path) -> Vec<OsString> {
        vec![
            OsString::from("--from"),
            OsString::from("gTTS"),
            OsString::from("gtts-cli"),
            // text is read from stdin
            OsString::from("-"),
            OsString::from("--lang"),
            OsString::from(language),
            OsString::from("--tld"),
            OsString::from(voice),
            OsString::from("--output"),
            output.as_os_str().to_os_string(),
        ]
    }
}

impl SpeechSynthesizer for GttsSynthesizer {
    fn synthesize(&self, text: &str, language: &str, voice: &str, output: &Path) -> Result<()> {
        let uvx = locate_tool("uvx")?;

        let result = cmd(uvx, Self::args(language, voice, output))
            .stdin_bytes(text.as_bytes().to_vec())
            .stdout_null()
            .stderr_capture()
            .unchecked()
            .run()
            .context("Failed to run gtts-cli")?;

        if !result.status.success() {
            bail!(
                "gtts-cli exited with status {:?}: {}",
                result.status.code(),
                String::from_utf8_lossy(&result.stderr).trim()
            );
        }

        let written = output
            .metadata()
            .map(|meta| meta.len() > 0)
            .unwrap_or(false);
        if !written {
            bail!("gtts-cli did not write any audio to {}", output.display());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_select_language_and_accent() {
        let args = GttsSynthesizer::args("fr", "ca", Path::new("/work/audio.mp3"));
        let args: Vec<String> = args
            .into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "--from",
                "gTTS",
                "gtts-cli",
                "-",
                "--lang",
                "fr",
                "--tld",
                "ca",
                "--output",
                "/work/audio.mp3"
            ]
        );
    }
}
