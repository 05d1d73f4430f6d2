//! Flatten a transcript tree into a time-ordered word list.

use crate::types::{Transcript, TranscriptWord};

use super::lexicon::CaptionLexicon;
use super::normalize::normalize_word;

/// Walk segments in order, then words within each segment, emitting only
/// words that carry both timestamps with `start <= end`. Word text is
/// normalized for matching; timestamps pass through unchanged.
///
/// The aligner needs look-ahead over this sequence, so it is materialized
/// rather than streamed.
pub fn extract_words(transcript: &Transcript, lexicon: &CaptionLexicon) -> Vec<TranscriptWord> {
    let mut words = Vec::new();

    for segment in &transcript.segments {
        for word in &segment.words {
            let (start, end) = match (word.start, word.end) {
                (Some(s), Some(e)) => (s, e),
                _ => continue,
            };
            if start > end {
                log::debug!(
                    "skipping word {:?} with inverted interval {:.3}..{:.3}",
                    word.text,
                    start,
                    end
                );
                continue;
            }
            words.push(TranscriptWord {
                text: normalize_word(&word.text, lexicon),
                start,
                end,
            });
        }
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawWord, TranscriptSegment};

    fn raw(text: &str, start: Option<f64>, end: Option<f64>) -> RawWord {
        RawWord { text: text.into(), start, end }
    }

    fn transcript(segments: Vec<Vec<RawWord>>) -> Transcript {
        Transcript {
            text: String::new(),
            segments: segments
                .into_iter()
                .map(|words| TranscriptSegment { words })
                .collect(),
        }
    }

    #[test]
    fn test_extracts_in_segment_order() {
        let t = transcript(vec![
            vec![raw("Một", Some(0.0), Some(0.4)), raw("hai", Some(0.4), Some(0.8))],
            vec![raw("ba", Some(0.8), Some(1.2))],
        ]);
        let words = extract_words(&t, CaptionLexicon::default_vietnamese());
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, ["một", "hai", "ba"]);
        assert!((words[2].start - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_skips_words_missing_timestamps() {
        let t = transcript(vec![vec![
            raw("có", Some(0.0), Some(0.3)),
            raw("không", None, Some(0.6)),
            raw("nửa", Some(0.6), None),
        ]]);
        let words = extract_words(&t, CaptionLexicon::default_vietnamese());
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "có");
    }

    #[test]
    fn test_skips_inverted_intervals() {
        let t = transcript(vec![vec![raw("lùi", Some(1.0), Some(0.5))]]);
        let words = extract_words(&t, CaptionLexicon::default_vietnamese());
        assert!(words.is_empty());
    }

    #[test]
    fn test_normalizes_text_preserves_times() {
        let t = transcript(vec![vec![raw(" Hách,", Some(1.25), Some(1.75))]]);
        let words = extract_words(&t, CaptionLexicon::default_vietnamese());
        assert_eq!(words[0].text, "hack");
        assert!((words[0].start - 1.25).abs() < f64::EPSILON);
        assert!((words[0].end - 1.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_transcript() {
        let words = extract_words(&Transcript::default(), CaptionLexicon::default_vietnamese());
        assert!(words.is_empty());
    }
}
