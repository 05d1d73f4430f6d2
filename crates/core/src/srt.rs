//! SRT subtitle export for timed captions.

use std::path::Path;

use anyhow::{Context, Result};

use crate::types::TimedCaption;

/// Format seconds as an SRT timestamp: `HH:MM:SS,mmm`.
fn format_srt_time(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;
    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, ms)
}

/// Characters per subtitle line before wrapping.
const MAX_LINE_CHARS: usize = 42;

/// Wrap text at word boundaries so no line exceeds `max_chars`.
///
/// A single word longer than the limit gets its own line unbroken.
fn wrap_text(text: &str, max_chars: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = current.chars().count() + 1 + word.chars().count();
        if !current.is_empty() && needed > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
}

/// Render captions as SRT file content.
///
/// Entries are numbered from 1 and separated by blank lines as the
/// format requires; long caption text is wrapped at word boundaries.
pub fn to_srt(captions: &[TimedCaption]) -> String {
    let mut out = String::new();
    for (i, caption) in captions.iter().enumerate() {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            format_srt_time(caption.start),
            format_srt_time(caption.end),
            wrap_text(caption.text.trim(), MAX_LINE_CHARS)
        ));
    }
    out
}

/// Write captions to an SRT file.
pub fn write_srt(captions: &[TimedCaption], path: &Path) -> Result<()> {
    std::fs::write(path, to_srt(captions))
        .with_context(|| format!("failed to write subtitles to {}", path.display()))?;
    log::info!("wrote {} subtitle entries to {}", captions.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_srt_time() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(1.5), "00:00:01,500");
        assert_eq!(format_srt_time(61.25), "00:01:01,250");
        assert_eq!(format_srt_time(3661.007), "01:01:01,007");
    }

    #[test]
    fn test_format_srt_time_clamps_negative() {
        assert_eq!(format_srt_time(-0.3), "00:00:00,000");
    }

    #[test]
    fn test_to_srt_layout() {
        let captions = vec![
            TimedCaption { start: 0.0, end: 1.3, text: "hack the planet".into() },
            TimedCaption { start: 1.3, end: 2.8, text: "trùm cuối".into() },
        ];
        let srt = to_srt(&captions);
        let expected = "1\n00:00:00,000 --> 00:00:01,300\nhack the planet\n\n\
                        2\n00:00:01,300 --> 00:00:02,800\ntrùm cuối\n\n";
        assert_eq!(srt, expected);
    }

    #[test]
    fn test_to_srt_empty() {
        assert_eq!(to_srt(&[]), "");
    }

    #[test]
    fn test_wrap_text_at_word_boundaries() {
        assert_eq!(wrap_text("một hai ba bốn", 7), "một hai\nba bốn");
        assert_eq!(wrap_text("ngắn", 42), "ngắn");
    }

    #[test]
    fn test_wrap_text_oversized_word_kept_whole() {
        assert_eq!(wrap_text("a abcdefghij b", 5), "a\nabcdefghij\nb");
    }
}
