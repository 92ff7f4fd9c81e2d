use rand::{Rng, RngCore};

use crate::error::{ReelError, ReelResult};

/// Slice of the source video that ends up in the final clip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipWindow {
    pub start: f64,
    pub duration: f64,
}

impl ClipWindow {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Pick a random `target_duration` window inside a `source_duration` video.
///
/// The start offset is uniform over `[0, source_duration - target_duration]`.
/// A source shorter than the target is an error rather than a truncated clip.
pub fn select_window(
    source_duration: f64,
    target_duration: f64,
    rng: &mut dyn RngCore,
) -> ReelResult<ClipWindow> {
    if !target_duration.is_finite() || target_duration <= 0.0 {
        return Err(ReelError::config(format!(
            "Clip duration must be a positive number of seconds, got {target_duration}"
        )));
    }

    if !source_duration.is_finite() {
        return Err(ReelError::config(format!(
            "Source video duration must be finite, got {source_duration}"
        )));
    }

    if source_duration < target_duration {
        return Err(ReelError::InsufficientDuration {
            source_duration,
            target_duration,
        });
    }

    let max_start = source_duration - target_duration;
    let start = if max_start > 0.0 {
        rng.gen_range(0.0..=max_start).min(max_start)
    } else {
        0.0
    };

    Ok(ClipWindow {
        start,
        duration: target_duration,
    })
}
