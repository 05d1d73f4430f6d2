//! Speech recognition producing word-timestamped transcripts.
//!
//! The caption engine only sees the [`Transcript`] tree; where it comes
//! from is behind the [`Transcriber`] trait. Native whisper-rs inference
//! lives behind the `whisper-native` feature (with automatic model
//! download, like the rest of the ggml ecosystem does it); transcripts
//! saved as JSON by whisper tooling can always be loaded directly.

use std::path::Path;

use anyhow::{Context, Result};

use crate::types::{RawWord, Transcript, TranscriptSegment};

/// Transcribes an audio file into a word-timestamped transcript tree.
pub trait Transcriber {
    fn transcribe(&self, audio_path: &Path) -> Result<Transcript>;
}

/// Parse whisper-timestamped-style JSON into a transcript tree.
///
/// Accepts both `"text"` and `"word"` as the word-text key; words whose
/// timestamps are absent are kept with `None` so the extractor can apply
/// its own skip policy.
pub fn parse_transcript_json(json_str: &str) -> Result<Transcript> {
    let value: serde_json::Value =
        serde_json::from_str(json_str).context("failed to parse transcript JSON")?;

    let text = value["text"].as_str().unwrap_or("").trim().to_string();

    let mut segments = Vec::new();
    if let Some(raw_segments) = value["segments"].as_array() {
        for raw_segment in raw_segments {
            let mut words = Vec::new();
            if let Some(raw_words) = raw_segment["words"].as_array() {
                for w in raw_words {
                    let word_text = w["text"]
                        .as_str()
                        .or_else(|| w["word"].as_str())
                        .unwrap_or("")
                        .trim()
                        .to_string();
                    if word_text.is_empty() {
                        continue;
                    }
                    words.push(RawWord {
                        text: word_text,
                        start: w["start"].as_f64(),
                        end: w["end"].as_f64(),
                    });
                }
            }
            segments.push(TranscriptSegment { words });
        }
    }

    Ok(Transcript { text, segments })
}

/// Load a saved transcript JSON file.
pub fn load_transcript(path: &Path) -> Result<Transcript> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read transcript: {}", path.display()))?;
    parse_transcript_json(&data)
}

#[cfg(feature = "whisper-native")]
pub use native::WhisperTranscriber;

#[cfg(feature = "whisper-native")]
mod native {
    use std::path::{Path, PathBuf};

    use anyhow::{bail, Context, Result};

    use super::Transcriber;
    use crate::audio;
    use crate::types::{RawWord, Transcript, TranscriptSegment};

    const HF_MODEL_BASE: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

    /// Native whisper-rs transcriber with token-level timestamps.
    pub struct WhisperTranscriber {
        pub model: String,
        pub language: String,
        pub model_dir: Option<PathBuf>,
    }

    impl WhisperTranscriber {
        pub fn new(model: &str, language: &str, model_dir: Option<PathBuf>) -> Self {
            WhisperTranscriber {
                model: model.to_string(),
                language: language.to_string(),
                model_dir,
            }
        }
    }

    impl Default for WhisperTranscriber {
        fn default() -> Self {
            Self::new("medium", "vi", None)
        }
    }

    impl Transcriber for WhisperTranscriber {
        fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
            use whisper_rs::{
                FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters,
            };

            let model_path = find_model(&self.model, self.model_dir.as_deref())?;

            let ctx = WhisperContext::new_with_params(
                model_path.to_str().context("non-UTF8 model path")?,
                WhisperContextParameters::default(),
            )
            .context("failed to load whisper model")?;

            let (samples, sr) = audio::io::read_wav(audio_path)?;
            let samples_16k = if sr != 16000 {
                audio::io::resample(&samples, sr, 16000)
            } else {
                samples
            };
            let samples_f32: Vec<f32> = samples_16k.iter().map(|&s| s as f32).collect();

            let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
            params.set_language(Some(&self.language));
            params.set_token_timestamps(true);

            let mut state = ctx.create_state().context("failed to create whisper state")?;
            state
                .full(params, &samples_f32)
                .context("whisper inference failed")?;

            let n_segments = state.full_n_segments()?;
            let mut text_parts = Vec::new();
            let mut segments = Vec::new();

            for i in 0..n_segments {
                let segment_text = state.full_get_segment_text(i)?;
                text_parts.push(segment_text.trim().to_string());

                let mut words = Vec::new();
                let n_tokens = state.full_n_tokens(i)?;
                for j in 0..n_tokens {
                    let token_text = state.full_get_token_text(i, j)?;
                    let token_data = state.full_get_token_data(i, j)?;

                    let trimmed = token_text.trim().to_string();
                    if trimmed.is_empty() {
                        continue;
                    }
                    // Skip special tokens
                    if trimmed.starts_with('[') && trimmed.ends_with(']') {
                        continue;
                    }

                    words.push(RawWord {
                        text: trimmed,
                        // centiseconds to seconds
                        start: Some(token_data.t0 as f64 / 100.0),
                        end: Some(token_data.t1 as f64 / 100.0),
                    });
                }
                segments.push(TranscriptSegment { words });
            }

            Ok(Transcript {
                text: text_parts.join(" ").trim().to_string(),
                segments,
            })
        }
    }

    fn model_download_url(model_name: &str) -> String {
        format!("{}/ggml-{}.bin", HF_MODEL_BASE, model_name)
    }

    /// Find a whisper model file, downloading into the cache if missing.
    fn find_model(model_name: &str, model_dir: Option<&Path>) -> Result<PathBuf> {
        let filename = format!("ggml-{}.bin", model_name);

        if let Some(dir) = model_dir {
            let path = dir.join(&filename);
            if path.exists() {
                return Ok(path);
            }
        }

        let cache_dir = crate::cache::cache_dir().join("models");
        let path = cache_dir.join(&filename);
        if path.exists() {
            return Ok(path);
        }

        log::info!("whisper model '{}' not found locally, downloading...", model_name);
        download_model(model_name, &cache_dir)
    }

    /// Download a whisper GGML model from Hugging Face.
    ///
    /// Streams into a temp file next to the destination and renames only
    /// after the byte count checks out, so an interrupted download never
    /// leaves a half-written model behind.
    fn download_model(model_name: &str, dest_dir: &Path) -> Result<PathBuf> {
        let url = model_download_url(model_name);
        let dest_path = dest_dir.join(format!("ggml-{}.bin", model_name));

        std::fs::create_dir_all(dest_dir)
            .with_context(|| format!("failed to create model directory: {}", dest_dir.display()))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(1800))
            .build()
            .context("failed to build HTTP client")?;

        log::info!("downloading {} ...", url);
        let mut response = client.get(&url).send().context("model download failed")?;
        if !response.status().is_success() {
            bail!("download failed: HTTP {} for {}", response.status(), url);
        }

        let expected = response.content_length();
        if let Some(total) = expected {
            log::info!("model size: {:.1} MiB", total as f64 / (1024.0 * 1024.0));
        }

        let mut tmp_file =
            tempfile::NamedTempFile::new_in(dest_dir).context("failed to create temp file")?;
        let written = response
            .copy_to(tmp_file.as_file_mut())
            .context("error streaming model download")?;

        if let Some(total) = expected {
            if written != total {
                bail!("incomplete download: got {} bytes, expected {}", written, total);
            }
        }

        tmp_file.persist(&dest_path).map_err(|e| {
            anyhow::anyhow!("failed to save model to {}: {}", dest_path.display(), e)
        })?;

        log::info!("model saved to {}", dest_path.display());
        Ok(dest_path)
    }
}
