//! Text-to-speech synthesis.
//!
//! The pipeline consumes speech audio through [`SpeechSynthesizer`]; the
//! bundled implementation targets the FPT.AI HMI endpoint, which answers
//! with a URL where the rendered audio appears asynchronously.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};

const TTS_URL: &str = "https://api.fpt.ai/hmi/tts/v5";
const DEFAULT_VOICE: &str = "banmai";

/// Attempts to fetch the rendered audio before giving up.
const DOWNLOAD_ATTEMPTS: u32 = 10;
const DOWNLOAD_RETRY_DELAY: Duration = Duration::from_millis(1500);

/// Renders script text to an audio file on disk.
pub trait SpeechSynthesizer {
    fn synthesize(&self, text: &str, output: &Path) -> Result<()>;
}

/// FPT.AI HMI text-to-speech client.
pub struct FptTts {
    client: reqwest::blocking::Client,
    api_key: String,
    voice: String,
}

impl FptTts {
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_voice(api_key, DEFAULT_VOICE)
    }

    pub fn with_voice(api_key: &str, voice: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("failed to build HTTP client")?;
        Ok(FptTts {
            client,
            api_key: api_key.to_string(),
            voice: voice.to_string(),
        })
    }

    /// Request synthesis; the service replies with the async audio URL.
    fn request_audio_url(&self, text: &str) -> Result<String> {
        let response = self
            .client
            .post(TTS_URL)
            .header("api_key", &self.api_key)
            .header("voice", &self.voice)
            .header("Cache-Control", "no-cache")
            .body(text.to_string())
            .send()
            .context("TTS request failed")?;

        if !response.status().is_success() {
            bail!("TTS endpoint returned HTTP {}", response.status());
        }

        let value: serde_json::Value = response.json().context("invalid TTS response body")?;
        let url = value["async"]
            .as_str()
            .context("TTS response missing async audio URL")?;
        Ok(url.to_string())
    }

    /// Poll the audio URL until the file is ready.
    fn download_audio(&self, url: &str) -> Result<Vec<u8>> {
        for attempt in 1..=DOWNLOAD_ATTEMPTS {
            let response = self
                .client
                .get(url)
                .header("User-Agent", "Mozilla/5.0")
                .send()
                .context("audio download failed")?;

            if response.status().is_success() {
                log::info!("TTS audio ready after {} attempt(s)", attempt);
                return Ok(response.bytes().context("error reading audio body")?.to_vec());
            }

            log::debug!(
                "TTS audio not ready yet (HTTP {}), waiting...",
                response.status()
            );
            std::thread::sleep(DOWNLOAD_RETRY_DELAY);
        }

        bail!("TTS audio was not ready after {} attempts", DOWNLOAD_ATTEMPTS)
    }
}

impl SpeechSynthesizer for FptTts {
    fn synthesize(&self, text: &str, output: &Path) -> Result<()> {
        if text.trim().is_empty() {
            bail!("refusing to synthesize empty text");
        }

        log::info!("synthesizing {} characters of script audio", text.chars().count());
        let url = self.request_audio_url(text)?;
        let audio = self.download_audio(&url)?;

        // Write via temp file in the target directory so a partial
        // download never lands at the final path.
        let dir = output.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .context("failed to create temp audio file")?;
        tmp.write_all(&audio).context("error writing audio")?;
        tmp.persist(output)
            .map_err(|e| anyhow::anyhow!("failed to save audio to {}: {}", output.display(), e))?;

        log::info!("wrote {} bytes of audio to {}", audio.len(), output.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSynth(Vec<u8>);

    impl SpeechSynthesizer for FixedSynth {
        fn synthesize(&self, _text: &str, output: &Path) -> Result<()> {
            std::fs::write(output, &self.0)?;
            Ok(())
        }
    }

    #[test]
    fn test_synthesizer_trait_is_object_safe() {
        let synth: Box<dyn SpeechSynthesizer> = Box::new(FixedSynth(vec![1, 2, 3]));
        let dir = std::env::temp_dir().join(format!("reelgen_tts_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let out = dir.join("audio.wav");
        synth.synthesize("xin chào", &out).unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), vec![1, 2, 3]);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_text_is_rejected() {
        let tts = FptTts::new("key").unwrap();
        let err = tts.synthesize("  ", Path::new("/tmp/never.wav"));
        assert!(err.is_err());
    }
}
