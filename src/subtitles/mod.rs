//! Transcript to SRT conversion.

pub mod splitter;
pub mod srt;
pub mod timecode;

pub use splitter::{SubtitleCue, TranscriptSegment, split_segments};
