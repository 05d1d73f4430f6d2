//! Word normalization for fuzzy matching.
//!
//! Canonicalizes recognizer output and script tokens the same way so the
//! two sides compare cleanly: composed Unicode form, a fixed alphabet,
//! lowercase, then the mis-transcription correction table.

use unicode_normalization::UnicodeNormalization;

use super::lexicon::CaptionLexicon;

/// True for characters the matcher keeps: ASCII alphanumerics plus the
/// accented Latin range Vietnamese orthography draws from (U+00C0–U+1EF9,
/// letters only — this range also contains ×/÷ and other signs).
pub fn is_alphabet_char(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_alphanumeric();
    }
    ('\u{00C0}'..='\u{1EF9}').contains(&c) && c.is_alphabetic()
}

/// Normalize one word for matching.
///
/// NFC first so precomposed and decomposed diacritics compare equal, then
/// strip everything outside the alphabet, lowercase, and apply the
/// correction table. Pure; an empty result means "drop this token".
pub fn normalize_word(raw: &str, lexicon: &CaptionLexicon) -> String {
    let cleaned: String = raw
        .nfc()
        .filter(|c| is_alphabet_char(*c))
        .collect::<String>()
        .to_lowercase();

    lexicon.correct(&cleaned).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex() -> CaptionLexicon {
        CaptionLexicon::vietnamese()
    }

    #[test]
    fn test_strips_punctuation_and_lowercases() {
        assert_eq!(normalize_word(" Hành tinh,", &lex()), "hànhtinh");
        assert_eq!(normalize_word("Planet!", &lex()), "planet");
    }

    #[test]
    fn test_keeps_vietnamese_letters() {
        assert_eq!(normalize_word("đường", &lex()), "đường");
        assert_eq!(normalize_word("Việt", &lex()), "việt");
    }

    #[test]
    fn test_rejects_math_signs_in_accented_range() {
        // × (U+00D7) and ÷ (U+00F7) sit inside U+00C0..U+1EF9 but are not
        // letters.
        assert_eq!(normalize_word("a×b", &lex()), "ab");
        assert_eq!(normalize_word("÷", &lex()), "");
    }

    #[test]
    fn test_nfc_composes_decomposed_diacritics() {
        // "ế" as base letter + combining marks vs precomposed U+1EBF
        let decomposed = "e\u{0302}\u{0301}";
        let precomposed = "\u{1EBF}";
        assert_eq!(
            normalize_word(decomposed, &lex()),
            normalize_word(precomposed, &lex())
        );
    }

    #[test]
    fn test_correction_table_applies() {
        assert_eq!(normalize_word("hách", &lex()), "hack");
        assert_eq!(normalize_word("Hách!", &lex()), "hack");
    }

    #[test]
    fn test_idempotent() {
        for raw in ["hách", "Planet!", "đường", "TRÙNG", "123", "...", "e\u{0302}\u{0301}"] {
            let once = normalize_word(raw, &lex());
            let twice = normalize_word(&once, &lex());
            assert_eq!(once, twice, "normalize not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_empty_result_is_valid() {
        assert_eq!(normalize_word("?!…", &lex()), "");
        assert_eq!(normalize_word("", &lex()), "");
    }
}
