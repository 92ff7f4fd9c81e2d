use serde::Deserialize;

/// Timed text unit as produced by the transcription engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TranscriptSegment {
    #[serde(default)]
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// One numbered subtitle entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl SubtitleCue {
    #[cfg(test)]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Re-chunk transcript segments into cues of at most `max_words_per_cue` words.
///
/// Word timings are interpolated linearly across each segment, and the end of
/// every cue is clamped to its segment's end so a trailing partial group
/// never runs past the speech it belongs to. Cue numbering is a 1-based
/// counter over the whole output.
pub fn split_segments(
    segments: &[TranscriptSegment],
    max_words_per_cue: usize,
) -> Vec<SubtitleCue> {
    let group_size = max_words_per_cue.max(1);
    let mut cues = Vec::new();

    for segment in segments {
        let words: Vec<&str> = segment.text.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        let per_word = (segment.end - segment.start) / words.len() as f64;

        for (group_idx, group) in words.chunks(group_size).enumerate() {
            let offset = group_idx * group_size;
            let start = segment.start + offset as f64 * per_word;
            let end =
                (segment.start + (offset + group_size) as f64 * per_word).min(segment.end);

            cues.push(SubtitleCue {
                index: cues.len() + 1,
                start,
                end,
                text: group.join(" "),
            });
        }
    }

    cues
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn splits_two_segments_into_three_cues() {
        let segments = vec![
            TranscriptSegment::new("hello world foo", 0.0, 3.0),
            TranscriptSegment::new("bar baz", 3.0, 4.0),
        ];

        let cues = split_segments(&segments, 2);

        assert_eq!(cues.len(), 3);
        let expected = [
            (1, 0.0, 2.0, "hello world"),
            (2, 2.0, 3.0, "foo"),
            (3, 3.0, 4.0, "bar baz"),
        ];
        for (cue, (index, start, end, text)) in cues.iter().zip(expected) {
            assert_eq!(cue.index, index);
            assert_close(cue.start, start);
            assert_close(cue.end, end);
            assert_eq!(cue.text, text);
        }
    }

    #[test]
    fn final_partial_group_is_clamped_to_segment_end() {
        // 5 words over 1s: the last group of 3 would reach 1.2s without the clamp
        let segments = vec![TranscriptSegment::new("a b c d e", 0.0, 1.0)];
        let cues = split_segments(&segments, 3);
        assert_eq!(cues.len(), 2);
        assert_close(cues[0].end, 0.6);
        assert_close(cues[1].start, 0.6);
        assert_close(cues[1].end, 1.0);
    }

    #[test]
    fn empty_segments_produce_no_cues() {
        let segments = vec![
            TranscriptSegment::new("   ", 0.0, 1.0),
            TranscriptSegment::new("", 1.0, 2.0),
            TranscriptSegment::new("only", 2.0, 2.5),
        ];
        let cues = split_segments(&segments, 4);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].index, 1);
        assert_eq!(cues[0].text, "only");
    }

    #[test]
    fn zero_duration_segment_yields_instant_cue() {
        let segments = vec![TranscriptSegment::new("silence here", 5.0, 5.0)];
        let cues = split_segments(&segments, 5);
        assert_eq!(cues.len(), 1);
        assert_close(cues[0].start, 5.0);
        assert_close(cues[0].end, 5.0);
    }

    #[test]
    fn punctuation_and_accents_are_kept_verbatim() {
        let segments = vec![TranscriptSegment::new(
            "  Déjà vu ,  l'été\tarrive ! ",
            0.0,
            6.0,
        )];
        let cues = split_segments(&segments, 3);
        assert_eq!(cues[0].text, "Déjà vu ,");
        assert_eq!(cues[1].text, "l'été arrive !");
    }

    #[test]
    fn zero_group_size_behaves_like_one_word_per_cue() {
        let segments = vec![TranscriptSegment::new("one two", 0.0, 2.0)];
        let cues = split_segments(&segments, 0);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[1].text, "two");
    }

    #[test]
    fn cue_counts_indices_and_durations_hold_for_random_transcripts() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..300 {
            let group_size = rng.gen_range(1..8usize);
            let mut cursor = 0.0;
            let mut segments = Vec::new();
            let mut word_counts = Vec::new();
            for _ in 0..rng.gen_range(1..6usize) {
                let word_count = rng.gen_range(0..20usize);
                let duration = rng.gen_range(0.0..8.0);
                let text = (0..word_count)
                    .map(|i| format!("w{i}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                segments.push(TranscriptSegment::new(text, cursor, cursor + duration));
                word_counts.push(word_count);
                cursor += duration;
            }

            let cues = split_segments(&segments, group_size);

            for (position, cue) in cues.iter().enumerate() {
                assert_eq!(cue.index, position + 1);
                assert!(cue.end >= cue.start);
                assert!(!cue.text.is_empty());
            }

            let mut remaining = cues.as_slice();
            for (segment, word_count) in segments.iter().zip(&word_counts) {
                let expected = word_count.div_ceil(group_size);
                let (own, rest) = remaining.split_at(expected);
                let total: f64 = own.iter().map(SubtitleCue::duration).sum();
                assert!(total <= segment.end - segment.start + 1e-9);
                for cue in own {
                    assert!(cue.start >= segment.start - 1e-9);
                    assert!(cue.end <= segment.end);
                }
                remaining = rest;
            }
            assert!(remaining.is_empty());
        }
    }
}
