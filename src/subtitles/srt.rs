use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::splitter::SubtitleCue;
use super::timecode;
use crate::error::{ReelError, ReelResult};

/// Render cues as SRT blocks, in the order given.
pub fn render(cues: &[SubtitleCue]) -> String {
    let mut out = String::new();
    for cue in cues {
        let _ = write!(
            out,
            "{}\n{} --> {}\n{}\n\n",
            cue.index,
            timecode::encode(cue.start),
            timecode::encode(cue.end),
            cue.text
        );
    }
    out
}

/// Write the rendered document to `path` as UTF-8.
pub fn write(path: &Path, cues: &[SubtitleCue]) -> ReelResult<()> {
    let file = File::create(path).map_err(|err| {
        ReelError::io(
            format!("Failed to create subtitle file {}", path.display()),
            err,
        )
    })?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(render(cues).as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|err| {
            ReelError::io(
                format!("Failed to write subtitle file {}", path.display()),
                err,
            )
        })
}
