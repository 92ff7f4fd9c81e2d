//! SRT timestamp encoding.
//!
//! Only the encoding direction exists: nothing re-reads the subtitle files
//! this crate writes, so there is no matching parser.

/// Format seconds as `HH:MM:SS,mmm`.
///
/// Milliseconds are truncated, never rounded, so the millisecond field stays
/// below 1000. Hours widen past two digits for very long inputs. Negative or
/// non-finite values are treated as zero.
pub fn encode(seconds: f64) -> String {
    let seconds = if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    };

    let total_millis = (seconds * 1000.0).floor() as u64;
    let millis = total_millis % 1000;
    let total_secs = total_millis / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    format!("{hours:02}:{minutes:02}:{secs:02},{millis:03}")
}
