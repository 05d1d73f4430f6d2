//! Static language tables for caption alignment.
//!
//! Holds the hand-curated correction table for words the recognizer
//! reliably mis-hears, and the set of Vietnamese break words the budgeted
//! segmenter may flush a phrase after. Both are loaded once and never
//! mutated; callers receive the tables by reference instead of reaching
//! for globals.

use std::collections::{HashMap, HashSet};

lazy_static::lazy_static! {
    static ref DEFAULT_LEXICON: CaptionLexicon = CaptionLexicon::vietnamese();
}

/// Immutable correction-table + break-word configuration.
#[derive(Debug, Clone)]
pub struct CaptionLexicon {
    corrections: HashMap<String, String>,
    break_words: HashSet<String>,
}

impl CaptionLexicon {
    /// Tables tuned for Vietnamese TTS output transcribed by Whisper.
    pub fn vietnamese() -> Self {
        // Known mis-transcriptions observed on banmai-voice TTS audio.
        let corrections = [
            ("hách", "hack"),
            ("trùng", "trùm"),
            ("lau", "lao"),
            ("hát", "hạt"),
        ];

        // Conjunctions and fillers that read naturally as caption breaks.
        let break_words = [
            "và", "nhưng", "thì", "là", "mà", "nên", "rồi", "với", "hoặc", "vì",
        ];

        CaptionLexicon {
            corrections: corrections
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            break_words: break_words.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Build from explicit tables (tests, alternate languages).
    pub fn new<K, V, B>(
        corrections: impl IntoIterator<Item = (K, V)>,
        break_words: impl IntoIterator<Item = B>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        B: Into<String>,
    {
        CaptionLexicon {
            corrections: corrections
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            break_words: break_words.into_iter().map(Into::into).collect(),
        }
    }

    /// The shared default instance, built on first use.
    pub fn default_vietnamese() -> &'static CaptionLexicon {
        &DEFAULT_LEXICON
    }

    /// Look up a correction for an already-cleaned, lowercased word.
    pub fn correct<'a>(&'a self, word: &'a str) -> &'a str {
        self.corrections.get(word).map(String::as_str).unwrap_or(word)
    }

    /// True if the word is a natural caption break point.
    pub fn is_break_word(&self, word: &str) -> bool {
        self.break_words.contains(word)
    }
}
