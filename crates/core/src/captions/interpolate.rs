//! Character-offset fallback timing.
//!
//! Used when per-word matching is not applicable: only a flat transcript
//! string and its word list are available, so phrase end times are read
//! off a character-position map instead. Lower precision than the
//! matching path, but every phrase gets an interval and the output
//! covers the audio without gaps.

use std::collections::BTreeMap;

use crate::types::{TimedCaption, TranscriptWord};

use super::engine::round2;

/// Gap applied when no timestamp can be found for a phrase boundary.
const FALLBACK_GAP_SECONDS: f64 = 0.8;

/// Half-open character span with the timestamp of the word occupying it.
#[derive(Debug, Clone, Copy)]
struct CharSpan {
    end: usize,
    timestamp: f64,
}

/// Map from span start offset to span, ordered and binary-searchable.
/// Spans are disjoint and built in increasing order, one per word, each
/// covering the word plus its trailing space in the flattened text.
fn build_offset_map(words: &[TranscriptWord]) -> BTreeMap<usize, CharSpan> {
    let mut map = BTreeMap::new();
    let mut pos = 0usize;

    for word in words {
        let len = word.text.chars().count() + 1;
        map.insert(pos, CharSpan { end: pos + len, timestamp: word.end });
        pos += len;
    }

    map
}

/// Timestamp for a character position: the span containing it, else the
/// nearest span starting before it.
fn timestamp_at(map: &BTreeMap<usize, CharSpan>, pos: usize) -> Option<f64> {
    map.range(..=pos).next_back().map(|(_, span)| span.timestamp)
}

/// Assign intervals to phrases by character offset into the transcript.
///
/// Each phrase advances a synthetic position by its character length plus
/// one (the joining space); its end time comes from the offset map, its
/// start time from the previous phrase's end (0 for the first). No phrase
/// is ever dropped.
pub fn interpolate(words: &[TranscriptWord], phrases: &[String]) -> Vec<TimedCaption> {
    let map = build_offset_map(words);

    let mut captions = Vec::with_capacity(phrases.len());
    let mut pos = 0usize;
    let mut prev_end = 0.0f64;

    for phrase in phrases {
        pos += phrase.chars().count() + 1;

        let end = match timestamp_at(&map, pos) {
            Some(ts) => ts,
            None => {
                log::debug!("no timestamp at offset {} for {:?}", pos, phrase);
                prev_end + FALLBACK_GAP_SECONDS
            }
        };

        let caption = TimedCaption {
            start: round2(prev_end),
            end: round2(end),
            text: phrase.clone(),
        };
        prev_end = caption.end;
        captions.push(caption);
    }

    captions
}
