//! WAV reading for the transcription path.

use std::path::Path;

use anyhow::{bail, Context, Result};

/// Read a WAV file as mono f64 samples plus sample rate.
///
/// Multi-channel input is downmixed by averaging.
pub fn read_wav(path: &Path) -> Result<(Vec<f64>, u32)> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open WAV file: {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        bail!("WAV file has zero channels: {}", path.display());
    }

    let interleaved: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(|v| v as f64))
            .collect::<std::result::Result<_, _>>()
            .context("error reading float samples")?,
        hound::SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 / max))
                .collect::<std::result::Result<_, _>>()
                .context("error reading integer samples")?
        }
    };

    let mono: Vec<f64> = interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f64>() / channels as f64)
        .collect();

    Ok((mono, spec.sample_rate))
}

/// Linear resample to a target rate.
///
/// Accurate enough for feeding ASR; not intended for playback quality.
pub fn resample(samples: &[f64], from_rate: u32, to_rate: u32) -> Vec<f64> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = ((samples.len() as f64) / ratio).floor() as usize;
    let mut out = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let src = i as f64 * ratio;
        let lo = src.floor() as usize;
        let hi = (lo + 1).min(samples.len() - 1);
        let frac = src - lo as f64;
        out.push(samples[lo] * (1.0 - frac) + samples[hi] * frac);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_wav(path: &Path, samples: &[i16], channels: u16, rate: u32) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for s in samples {
            writer.write_sample(*s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_read_wav_mono() {
        let dir = std::env::temp_dir().join(format!("reelgen_wav_mono_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("mono.wav");
        write_test_wav(&path, &[0, 16384, -16384], 1, 16000);

        let (samples, rate) = read_wav(&path).unwrap();
        assert_eq!(rate, 16000);
        assert_eq!(samples.len(), 3);
        assert!((samples[1] - 0.5).abs() < 0.001);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_read_wav_downmixes_stereo() {
        let dir = std::env::temp_dir().join(format!("reelgen_wav_st_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("stereo.wav");
        // L=16384, R=0 -> mono 0.25
        write_test_wav(&path, &[16384, 0, 16384, 0], 2, 22050);

        let (samples, rate) = read_wav(&path).unwrap();
        assert_eq!(rate, 22050);
        assert_eq!(samples.len(), 2);
        assert!((samples[0] - 0.25).abs() < 0.001);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_resample_identity() {
        let samples = vec![0.0, 0.5, 1.0];
        assert_eq!(resample(&samples, 16000, 16000), samples);
    }

    #[test]
    fn test_resample_halves_length() {
        let samples: Vec<f64> = (0..100).map(|i| i as f64 / 100.0).collect();
        let out = resample(&samples, 32000, 16000);
        assert_eq!(out.len(), 50);
        // Linear interpolation of a ramp stays on the ramp
        assert!((out[10] - samples[20]).abs() < 1e-9);
    }

    #[test]
    fn test_resample_empty() {
        assert!(resample(&[], 44100, 16000).is_empty());
    }
}
