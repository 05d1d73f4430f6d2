//! Greedy script-to-transcript alignment.
//!
//! A single forward cursor walks the transcript word list once while the
//! phrases are consumed in script order. There is no backtracking: the
//! audio is synthesized from the script, so both sides proceed in the
//! same order, and the fuzzy threshold absorbs transcription noise. The
//! trade-off is speed over optimality; a stronger aligner can be swapped
//! in behind the same contract.

use crate::errors::CaptionError;
use crate::types::{AlignmentOutcome, Phrase, TimedCaption, TranscriptWord};

/// Similarity a candidate word must exceed (strictly) to match a token.
pub const SIMILARITY_THRESHOLD: f64 = 0.7;

/// Edit-distance similarity ratio in [0, 1].
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Round to two decimal places for caption output.
pub fn round2(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

/// Align phrases against the normalized word stream.
///
/// For each phrase, transcript words are scanned from the shared cursor;
/// a word that beats the threshold against the next unmatched token sets
/// the phrase start (first match only), extends the phrase end, and
/// advances the cursor past itself. A phrase whose tokens never match at
/// all yields no caption and is reported in `skipped`; a partial match
/// keeps the timestamps gathered so far. The cursor never rewinds, so
/// emitted captions are chronologically non-decreasing.
///
/// Only an empty transcript combined with an empty phrase list is an
/// error; every other degradation returns a valid, possibly shorter,
/// caption list.
pub fn align(
    phrases: &[Phrase],
    words: &[TranscriptWord],
) -> Result<AlignmentOutcome, CaptionError> {
    if phrases.is_empty() && words.is_empty() {
        return Err(CaptionError::EmptyInput);
    }

    let mut outcome = AlignmentOutcome::default();
    let mut w_idx = 0usize;

    for phrase in phrases {
        if phrase.tokens.is_empty() {
            outcome.skipped.push(phrase.text.clone());
            continue;
        }

        let mut start: Option<f64> = None;
        let mut end = 0.0;
        let mut matched = 0usize;

        for (i, word) in words.iter().enumerate().skip(w_idx) {
            let score = similarity(&word.text, &phrase.tokens[matched]);
            if score > SIMILARITY_THRESHOLD {
                if start.is_none() {
                    start = Some(word.start);
                }
                end = word.end;
                matched += 1;
                w_idx = i + 1;

                if matched >= phrase.tokens.len() {
                    break;
                }
            }
        }

        match start {
            Some(start) => {
                if matched < phrase.tokens.len() {
                    log::debug!(
                        "partial match for {:?}: {}/{} tokens",
                        phrase.text,
                        matched,
                        phrase.tokens.len()
                    );
                }
                outcome.captions.push(TimedCaption {
                    start: round2(start),
                    end: round2(end),
                    text: phrase.text.clone(),
                });
            }
            None => {
                log::debug!("no transcript match for phrase {:?}", phrase.text);
                outcome.skipped.push(phrase.text.clone());
            }
        }
    }

    Ok(outcome)
}
