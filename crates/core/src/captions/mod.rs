//! Script-to-audio caption timing.
//!
//! Takes a word-timestamped transcript and the script the audio was
//! synthesized from, and produces display phrases tagged with precise
//! `(start, end)` intervals:
//!
//! 1. extract: flatten the transcript tree into normalized, timed words
//! 2. segment: cut the script into caption-sized phrases
//! 3. align: greedily match phrase tokens to transcript words
//!
//! When word-level matching is not applicable (flat transcript text
//! only), [`interpolate`] assigns intervals by character offset instead.

pub mod engine;
pub mod extract;
pub mod interpolate;
pub mod lexicon;
pub mod normalize;
pub mod segment;

pub use engine::{align, SIMILARITY_THRESHOLD};
pub use extract::extract_words;
pub use interpolate::interpolate;
pub use lexicon::CaptionLexicon;
pub use normalize::normalize_word;
pub use segment::{segment, SegmentStrategy, DEFAULT_CHUNK_BUDGET};

use crate::errors::CaptionError;
use crate::types::{AlignmentOutcome, Transcript};

/// Run the full alignment path: transcript + script text → timed captions.
pub fn generate_timed_captions(
    transcript: &Transcript,
    script_text: &str,
    strategy: SegmentStrategy,
    lexicon: &CaptionLexicon,
) -> Result<AlignmentOutcome, CaptionError> {
    let words = extract_words(transcript, lexicon);
    let phrases = segment(script_text, strategy, lexicon);

    log::info!(
        "aligning {} phrases against {} transcript words",
        phrases.len(),
        words.len()
    );

    let outcome = align(&phrases, &words)?;

    if !outcome.skipped.is_empty() {
        log::warn!(
            "{} of {} phrases could not be aligned",
            outcome.skipped.len(),
            phrases.len()
        );
    }

    Ok(outcome)
}
