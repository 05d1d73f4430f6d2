//! File-based caching for expensive pipeline operations.
//!
//! Provides SHA-256 file hashing plus caches for TTS audio and
//! transcription results, so re-running a pipeline on the same script
//! skips the network and inference steps.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::types::Transcript;

/// Get the cache directory.
///
/// Uses `REELGEN_CACHE_DIR` env var if set, otherwise `~/.cache/reelgen`.
pub fn cache_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("REELGEN_CACHE_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".cache").join("reelgen")
}

/// Compute SHA-256 hash of a file's contents.
///
/// Returns a 64-character hex string.
pub fn file_hash(path: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut file = std::fs::File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;
    std::io::copy(&mut file, &mut hasher)?;
    let result = hasher.finalize();
    Ok(format!("{:x}", result))
}

/// Compute SHA-256 hash of a string.
pub fn text_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Atomically write data to a file via temp file + rename.
fn atomic_write(target: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = target.with_extension("tmp");
    std::fs::write(&tmp_path, data)?;
    std::fs::rename(&tmp_path, target)?;
    Ok(())
}

fn short(hash: &str) -> &str {
    &hash[..12.min(hash.len())]
}

// --- TTS audio cache ---

/// Return cached synthesized audio path, or None if not cached.
///
/// Keyed by the hash of the script text plus the voice name.
pub fn get_cached_audio(text_hash: &str, voice: &str) -> Option<PathBuf> {
    let path = cache_dir()
        .join("tts")
        .join(format!("{}_{}.wav", text_hash, voice));
    if path.exists() && path.metadata().map(|m| m.len() > 0).unwrap_or(false) {
        log::info!("cache hit: tts audio ({}...)", short(text_hash));
        Some(path)
    } else {
        None
    }
}

/// Copy synthesized audio into the cache. Returns the cache path.
pub fn store_audio_cache(text_hash: &str, voice: &str, audio_path: &Path) -> Result<PathBuf> {
    let dest = cache_dir()
        .join("tts")
        .join(format!("{}_{}.wav", text_hash, voice));
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(audio_path, &dest)?;
    log::info!("cached tts audio ({}...)", short(text_hash));
    Ok(dest)
}

// --- Transcription cache ---

/// Return cached transcript, or None if not cached.
pub fn get_cached_transcription(audio_hash: &str, model: &str, language: &str) -> Option<Transcript> {
    let path = cache_dir()
        .join("asr")
        .join(format!("{}_{}_{}.json", audio_hash, model, language));
    if !path.exists() {
        return None;
    }
    let data = std::fs::read_to_string(&path).ok()?;
    let transcript: Transcript = serde_json::from_str(&data).ok()?;
    log::info!("cache hit: transcription ({}...)", short(audio_hash));
    Some(transcript)
}

/// Store a transcript in the cache.
pub fn store_transcription_cache(
    audio_hash: &str,
    model: &str,
    language: &str,
    transcript: &Transcript,
) -> Result<()> {
    let path = cache_dir()
        .join("asr")
        .join(format!("{}_{}_{}.json", audio_hash, model, language));
    let json = serde_json::to_string(transcript)?;
    atomic_write(&path, json.as_bytes())?;
    log::info!("cached transcription ({}...)", short(audio_hash));
    Ok(())
}
