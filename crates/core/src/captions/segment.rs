//! Split script text into caption-sized phrases.
//!
//! Two strategies: punctuation boundaries for scripts written sentence by
//! sentence, and a character-budget scan with natural break words for
//! scripts that arrive as one long utterance.

use crate::types::Phrase;

use super::lexicon::CaptionLexicon;
use super::normalize::{is_alphabet_char, normalize_word};

/// Character budget for one caption under the budgeted strategy.
pub const DEFAULT_CHUNK_BUDGET: usize = 20;

/// Minimum words in a chunk before a break word may flush it.
const MIN_WORDS_BEFORE_BREAK: usize = 3;

/// How script text is cut into phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStrategy {
    /// Split on line breaks, then on sentence-ending punctuation.
    Punctuation,
    /// Accumulate words up to a character budget, flushing early after
    /// natural break words.
    NaturalBreak { budget: usize },
}

impl Default for SegmentStrategy {
    fn default() -> Self {
        SegmentStrategy::Punctuation
    }
}

/// Extract lowercased maximal alphabet runs. Punctuation and whitespace
/// separate tokens and never appear in them.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if is_alphabet_char(c) {
            current.extend(c.to_lowercase());
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Tokenize and normalize for matching; empty normalizations are dropped.
fn match_tokens(text: &str, lexicon: &CaptionLexicon) -> Vec<String> {
    tokenize(text)
        .iter()
        .map(|t| normalize_word(t, lexicon))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Split script text into non-empty phrases with their match tokens.
pub fn segment(text: &str, strategy: SegmentStrategy, lexicon: &CaptionLexicon) -> Vec<Phrase> {
    let chunks = match strategy {
        SegmentStrategy::Punctuation => split_on_punctuation(text),
        SegmentStrategy::NaturalBreak { budget } => split_on_budget(text, budget, lexicon),
    };

    chunks
        .into_iter()
        .map(|chunk| Phrase {
            tokens: match_tokens(&chunk, lexicon),
            text: chunk,
        })
        .collect()
}

fn split_on_punctuation(text: &str) -> Vec<String> {
    let mut phrases = Vec::new();
    for line in text.split('\n') {
        for part in line.split(['.', '!', '?']) {
            let part = part.trim();
            if !part.is_empty() {
                phrases.push(part.to_string());
            }
        }
    }
    phrases
}

fn split_on_budget(text: &str, budget: usize, lexicon: &CaptionLexicon) -> Vec<String> {
    let mut phrases = Vec::new();
    let mut chunk: Vec<&str> = Vec::new();
    let mut chunk_chars = 0usize;

    for word in text.split_whitespace() {
        let word_chars = word.chars().count();

        // Budget check counts the joining space.
        if !chunk.is_empty() && chunk_chars + 1 + word_chars > budget {
            phrases.push(chunk.join(" "));
            chunk.clear();
            chunk_chars = 0;
        }

        if !chunk.is_empty() {
            chunk_chars += 1;
        }
        chunk.push(word);
        chunk_chars += word_chars;

        if chunk.len() >= MIN_WORDS_BEFORE_BREAK
            && lexicon.is_break_word(&normalize_word(word, lexicon))
        {
            phrases.push(chunk.join(" "));
            chunk.clear();
            chunk_chars = 0;
        }
    }

    if !chunk.is_empty() {
        phrases.push(chunk.join(" "));
    }

    phrases
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex() -> &'static CaptionLexicon {
        CaptionLexicon::default_vietnamese()
    }

    #[test]
    fn test_tokenize_basic() {
        assert_eq!(tokenize("Hack the planet."), ["hack", "the", "planet"]);
    }

    #[test]
    fn test_tokenize_vietnamese() {
        assert_eq!(
            tokenize("Bạn có biết, rằng..."),
            ["bạn", "có", "biết", "rằng"]
        );
    }

    #[test]
    fn test_tokenize_punctuation_only() {
        assert!(tokenize("?! …").is_empty());
    }

    #[test]
    fn test_punctuation_strategy_splits_sentences() {
        let phrases = segment(
            "Câu một. Câu hai!\nCâu ba?",
            SegmentStrategy::Punctuation,
            lex(),
        );
        let texts: Vec<&str> = phrases.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, ["Câu một", "Câu hai", "Câu ba"]);
    }

    #[test]
    fn test_punctuation_strategy_drops_empty_fragments() {
        let phrases = segment("Một... Hai.", SegmentStrategy::Punctuation, lex());
        let texts: Vec<&str> = phrases.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, ["Một", "Hai"]);
    }

    #[test]
    fn test_hack_the_planet_yields_single_phrase() {
        let phrases = segment("hack the planet.", SegmentStrategy::Punctuation, lex());
        assert_eq!(phrases.len(), 1);
        assert_eq!(phrases[0].text, "hack the planet");
        assert_eq!(phrases[0].tokens, ["hack", "the", "planet"]);
    }

    #[test]
    fn test_match_tokens_are_normalized() {
        let phrases = segment("hách the planet.", SegmentStrategy::Punctuation, lex());
        assert_eq!(phrases[0].tokens, ["hack", "the", "planet"]);
        // Display text stays raw
        assert_eq!(phrases[0].text, "hách the planet");
    }

    #[test]
    fn test_budget_strategy_respects_character_budget() {
        let strategy = SegmentStrategy::NaturalBreak { budget: DEFAULT_CHUNK_BUDGET };
        let phrases = segment(
            "một hai ba bốn năm sáu bảy tám chín mười",
            strategy,
            lex(),
        );
        assert!(phrases.len() > 1);
        for p in &phrases {
            assert!(
                p.text.chars().count() <= DEFAULT_CHUNK_BUDGET,
                "chunk over budget: {:?}",
                p.text
            );
        }
        // Nothing lost
        let joined: Vec<String> = phrases
            .iter()
            .flat_map(|p| p.text.split_whitespace().map(str::to_string))
            .collect();
        assert_eq!(joined.len(), 10);
    }

    #[test]
    fn test_budget_strategy_flushes_after_break_word() {
        let strategy = SegmentStrategy::NaturalBreak { budget: 60 };
        let phrases = segment("anh ấy đi và cô ở lại", strategy, lex());
        assert_eq!(phrases.len(), 2);
        assert_eq!(phrases[0].text, "anh ấy đi và");
        assert_eq!(phrases[1].text, "cô ở lại");
    }

    #[test]
    fn test_budget_strategy_break_word_counts_toward_minimum() {
        let strategy = SegmentStrategy::NaturalBreak { budget: 60 };
        // "và" is the third word: the break word itself completes the
        // three-word minimum, so the chunk flushes here.
        let phrases = segment("đi chơi và về nhà", strategy, lex());
        let texts: Vec<&str> = phrases.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, ["đi chơi và", "về nhà"]);
    }

    #[test]
    fn test_budget_strategy_break_word_needs_three_words() {
        let strategy = SegmentStrategy::NaturalBreak { budget: 60 };
        // "và" is the second word: too early to flush
        let phrases = segment("đi và cô ở lại", strategy, lex());
        assert_eq!(phrases.len(), 1);
    }

    #[test]
    fn test_budget_strategy_flushes_trailing_chunk() {
        let strategy = SegmentStrategy::NaturalBreak { budget: 100 };
        let phrases = segment("chỉ một đoạn ngắn", strategy, lex());
        assert_eq!(phrases.len(), 1);
        assert_eq!(phrases[0].text, "chỉ một đoạn ngắn");
    }

    #[test]
    fn test_oversized_single_word_still_emitted() {
        let strategy = SegmentStrategy::NaturalBreak { budget: 5 };
        let phrases = segment("supercalifragilistic", strategy, lex());
        assert_eq!(phrases.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(segment("", SegmentStrategy::Punctuation, lex()).is_empty());
        assert!(segment(
            "  \n ",
            SegmentStrategy::NaturalBreak { budget: 20 },
            lex()
        )
        .is_empty());
    }
}
