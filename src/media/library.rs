use std::io;
use std::path::{Path, PathBuf};

use rand::RngCore;
use rand::seq::SliceRandom;
use walkdir::WalkDir;

use crate::error::{ReelError, ReelResult};

/// Video files directly inside `dir` whose extension is in `extensions`.
///
/// Extensions are compared case-insensitively and without the leading dot.
/// The listing is sorted so selection only depends on the random source.
pub fn list_source_videos(dir: &Path, extensions: &[String]) -> ReelResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ReelError::NoSourceVideoAvailable {
            dir: dir.to_path_buf(),
        });
    }

    let mut videos = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|err| {
            ReelError::io(
                format!("Failed to list source videos in {}", dir.display()),
                io::Error::from(err),
            )
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if has_video_extension(entry.path(), extensions) {
            videos.push(entry.into_path());
        }
    }

    videos.sort();
    Ok(videos)
}

/// Pick one background video at random.
pub fn select_source_video(
    dir: &Path,
    extensions: &[String],
    rng: &mut dyn RngCore,
) -> ReelResult<PathBuf> {
    let videos = list_source_videos(dir, extensions)?;
    videos
        .choose(rng)
        .cloned()
        .ok_or_else(|| ReelError::NoSourceVideoAvailable {
            dir: dir.to_path_buf(),
        })
}

fn has_video_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
}
