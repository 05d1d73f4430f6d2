use serde::{Deserialize, Serialize};

/// A raw word as produced by the speech recognizer.
///
/// Timestamps are optional: some decoders emit filler tokens without
/// timing, and those words are excluded during extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawWord {
    pub text: String,
    /// Start time in seconds, if the recognizer produced one
    #[serde(default)]
    pub start: Option<f64>,
    /// End time in seconds, if the recognizer produced one
    #[serde(default)]
    pub end: Option<f64>,
}

/// One recognizer segment: an ordered run of words.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub words: Vec<RawWord>,
}

/// Speech-recognition output: segments containing timed words, plus the
/// flat transcript text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

/// A word with both timestamps present, text already normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptWord {
    pub text: String,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
}

/// A caption-sized fragment of the script: display text plus the
/// normalized tokens used for matching.
#[derive(Debug, Clone, PartialEq)]
pub struct Phrase {
    /// Raw text, shown on screen
    pub text: String,
    /// Normalized match tokens
    pub tokens: Vec<String>,
}

/// The final output unit: on-screen text with its display interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedCaption {
    /// Display start in seconds, rounded to 2 decimals
    pub start: f64,
    /// Display end in seconds, rounded to 2 decimals
    pub end: f64,
    pub text: String,
}

/// Alignment result: the captions that matched plus the phrases that did
/// not, so callers can observe degradation without parsing logs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlignmentOutcome {
    pub captions: Vec<TimedCaption>,
    /// Display text of phrases dropped for lack of any word match
    pub skipped: Vec<String>,
}

/// One part of a structured script document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptPart {
    pub text: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// A generated script: ordered parts plus an optional call to action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub title: Option<String>,
    pub parts: Vec<ScriptPart>,
    #[serde(default)]
    pub call_to_action: Option<String>,
}

impl Script {
    /// Build a script from a single plain-text body.
    pub fn from_text(text: impl Into<String>) -> Self {
        Script {
            title: None,
            parts: vec![ScriptPart {
                text: text.into(),
                metadata: None,
            }],
            call_to_action: None,
        }
    }

    /// Flatten to plain text for segmentation: parts joined by a single
    /// space, call to action appended after a sentence terminator.
    pub fn flatten(&self) -> String {
        let mut text = self
            .parts
            .iter()
            .map(|p| p.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if let Some(cta) = self.call_to_action.as_deref() {
            let cta = cta.trim();
            if !cta.is_empty() {
                if !text.is_empty() && !text.ends_with(['.', '!', '?']) {
                    text.push('.');
                }
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(cta);
            }
        }

        text
    }
}

/// A timed stock-footage search request produced by the query planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneQuery {
    pub start: f64,
    pub end: f64,
    pub keywords: Vec<String>,
}

/// Stock media picked for one scene interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneMedia {
    pub start: f64,
    pub end: f64,
    /// None when no asset could be found for the interval
    pub media: Option<StockMedia>,
}

/// A single stock asset (video clip or still image).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMedia {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_joins_parts_with_space() {
        let script = Script {
            title: None,
            parts: vec![
                ScriptPart { text: "Một.".into(), metadata: None },
                ScriptPart { text: "Hai.".into(), metadata: None },
            ],
            call_to_action: None,
        };
        assert_eq!(script.flatten(), "Một. Hai.");
    }

    #[test]
    fn test_flatten_appends_cta_after_terminator() {
        let mut script = Script::from_text("Xin chào");
        script.call_to_action = Some("Hãy theo dõi kênh".into());
        assert_eq!(script.flatten(), "Xin chào. Hãy theo dõi kênh");
    }

    #[test]
    fn test_flatten_keeps_existing_terminator() {
        let mut script = Script::from_text("Xin chào!");
        script.call_to_action = Some("Theo dõi nhé".into());
        assert_eq!(script.flatten(), "Xin chào! Theo dõi nhé");
    }

    #[test]
    fn test_flatten_skips_blank_parts() {
        let script = Script {
            title: Some("t".into()),
            parts: vec![
                ScriptPart { text: "  ".into(), metadata: None },
                ScriptPart { text: "Nội dung".into(), metadata: None },
            ],
            call_to_action: None,
        };
        assert_eq!(script.flatten(), "Nội dung");
    }

    #[test]
    fn test_transcript_deserializes_missing_timestamps() {
        let json = r#"{
            "text": "hai từ",
            "segments": [{"words": [
                {"text": "hai", "start": 0.0, "end": 0.4},
                {"text": "từ"}
            ]}]
        }"#;
        let t: Transcript = serde_json::from_str(json).unwrap();
        assert_eq!(t.segments[0].words.len(), 2);
        assert!(t.segments[0].words[1].start.is_none());
    }

    #[test]
    fn test_timed_caption_serde_roundtrip() {
        let cap = TimedCaption { start: 0.0, end: 1.3, text: "hack the planet".into() };
        let json = serde_json::to_string(&cap).unwrap();
        let back: TimedCaption = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cap);
    }

    #[test]
    fn test_media_kind_serializes_lowercase() {
        let json = serde_json::to_string(&MediaKind::Video).unwrap();
        assert_eq!(json, "\"video\"");
    }
}
