//! Reelgen CLI — Vietnamese short-form video generation pipeline.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use reelgen_core::asr::load_transcript;
use reelgen_core::captions::{
    extract_words, generate_timed_captions, interpolate, segment, CaptionLexicon,
    SegmentStrategy, DEFAULT_CHUNK_BUDGET,
};
use reelgen_core::script::{LlmScriptWriter, ScriptWriter};
use reelgen_core::srt::write_srt;
use reelgen_core::tts::{FptTts, SpeechSynthesizer};
use reelgen_core::types::{AlignmentOutcome, Transcript};
use reelgen_core::video::{
    merge_empty_intervals, select_scene_media, LlmQueryPlanner, PexelsClient, QueryPlanner,
};

// ─── Top-level CLI ───────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "reelgen",
    about = "Script-to-video generator for Vietnamese short-form content",
    version,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: script, speech, captions, stock footage
    Generate(GenerateArgs),
    /// Time captions for existing audio and script
    Captions(CaptionsArgs),
    /// Align a saved transcript JSON against a script
    Align(AlignArgs),
}

// ─── Shared arguments (embedded in each subcommand) ──────────────

#[derive(Parser, Debug)]
struct SharedArgs {
    /// Output directory
    #[arg(long, default_value = "./reelgen-output")]
    output_dir: PathBuf,

    /// Phrase splitting strategy
    #[arg(long, default_value = "punctuation", value_parser = ["punctuation", "budget"])]
    split: String,

    /// Character budget per caption (budget strategy only)
    #[arg(long, default_value_t = DEFAULT_CHUNK_BUDGET)]
    budget: usize,

    /// Also write an .srt subtitle file
    #[arg(long, default_value_t = false)]
    srt: bool,

    /// Show verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Disable file-based caching
    #[arg(long, default_value_t = false)]
    no_cache: bool,
}

impl SharedArgs {
    fn strategy(&self) -> SegmentStrategy {
        match self.split.as_str() {
            "budget" => SegmentStrategy::NaturalBreak { budget: self.budget },
            _ => SegmentStrategy::Punctuation,
        }
    }
}

// ─── Generate ────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Generate a complete short video project from a topic")]
struct GenerateArgs {
    #[command(flatten)]
    shared: SharedArgs,

    /// Topic for the generated script
    topic: String,

    /// Chat-completion endpoint base URL
    #[arg(long, env = "REELGEN_LLM_BASE_URL", default_value = "https://api.openai.com/v1")]
    llm_base_url: String,

    /// Chat-completion model name
    #[arg(long, env = "REELGEN_LLM_MODEL", default_value = "gpt-4o")]
    llm_model: String,

    /// TTS voice name
    #[arg(long, default_value = "banmai")]
    voice: String,

    /// Whisper model size
    #[arg(long, default_value = "medium", value_parser = ["tiny", "base", "small", "medium", "large"])]
    whisper_model: String,

    /// Transcription language
    #[arg(long, default_value = "vi")]
    language: String,

    /// Skip stock footage selection
    #[arg(long, default_value_t = false)]
    no_footage: bool,
}

// ─── Captions ────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Produce timed captions for an audio file and its script")]
struct CaptionsArgs {
    #[command(flatten)]
    shared: SharedArgs,

    /// Speech audio (WAV)
    audio: PathBuf,

    /// Script text file the audio was synthesized from
    #[arg(long)]
    script: PathBuf,

    /// Whisper model size
    #[arg(long, default_value = "medium", value_parser = ["tiny", "base", "small", "medium", "large"])]
    whisper_model: String,

    /// Transcription language
    #[arg(long, default_value = "vi")]
    language: String,
}

// ─── Align ───────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Align a saved transcript JSON against a script")]
struct AlignArgs {
    #[command(flatten)]
    shared: SharedArgs,

    /// Transcript JSON with word timestamps
    transcript: PathBuf,

    /// Script text file
    #[arg(long)]
    script: PathBuf,
}

// ─── Main ────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    // Init logging
    let log_level = match &cli.command {
        Command::Generate(a) if a.shared.verbose => "debug",
        Command::Captions(a) if a.shared.verbose => "debug",
        Command::Align(a) if a.shared.verbose => "debug",
        _ => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Captions(args) => run_captions(args),
        Command::Align(args) => run_align(args),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

// ─── Helpers ─────────────────────────────────────────────────────

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{} environment variable is not set", name))
}

fn read_script_file(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script: {}", path.display()))?;
    let text = text.trim().to_string();
    if text.is_empty() {
        bail!("script file is empty: {}", path.display());
    }
    Ok(text)
}

fn write_outcome(outcome: &AlignmentOutcome, shared: &SharedArgs) -> Result<()> {
    std::fs::create_dir_all(&shared.output_dir).with_context(|| {
        format!("failed to create output directory: {}", shared.output_dir.display())
    })?;

    let captions_path = shared.output_dir.join("captions.json");
    let json = serde_json::to_string_pretty(outcome)?;
    std::fs::write(&captions_path, json)
        .with_context(|| format!("failed to write {}", captions_path.display()))?;
    println!("Captions: {}", captions_path.display());

    if shared.srt {
        let srt_path = shared.output_dir.join("captions.srt");
        write_srt(&outcome.captions, &srt_path)?;
        println!("Subtitles: {}", srt_path.display());
    }

    if !outcome.skipped.is_empty() {
        println!("Skipped {} unmatched phrase(s)", outcome.skipped.len());
    }

    Ok(())
}

#[cfg(feature = "whisper-native")]
fn transcribe_audio(
    audio: &Path,
    model: &str,
    language: &str,
    no_cache: bool,
) -> Result<Transcript> {
    use reelgen_core::asr::{Transcriber, WhisperTranscriber};
    use reelgen_core::cache;

    let audio_hash = cache::file_hash(audio)?;
    if !no_cache {
        if let Some(cached) = cache::get_cached_transcription(&audio_hash, model, language) {
            return Ok(cached);
        }
    }

    let transcriber = WhisperTranscriber::new(model, language, None);
    let transcript = transcriber.transcribe(audio)?;

    if !no_cache {
        cache::store_transcription_cache(&audio_hash, model, language, &transcript)?;
    }
    Ok(transcript)
}

#[cfg(not(feature = "whisper-native"))]
fn transcribe_audio(
    _audio: &Path,
    _model: &str,
    _language: &str,
    _no_cache: bool,
) -> Result<Transcript> {
    bail!(
        "this build has no native transcription; rebuild with --features whisper-native, \
         or use the `align` subcommand with a saved transcript JSON"
    )
}

// ─── Generate runner ─────────────────────────────────────────────

fn run_generate(args: GenerateArgs) -> Result<()> {
    std::fs::create_dir_all(&args.shared.output_dir)?;

    // 1. Script
    let llm_key = require_env("REELGEN_LLM_API_KEY")?;
    let writer = LlmScriptWriter::new(&args.llm_base_url, &llm_key, &args.llm_model)?;
    let script = writer.write_script(&args.topic)?;
    let script_text = script.flatten();

    let script_path = args.shared.output_dir.join("script.txt");
    std::fs::write(&script_path, &script_text)?;
    println!("Script: {}", script_path.display());

    // 2. Speech
    let fpt_key = require_env("REELGEN_FPT_API_KEY")?;
    let tts = FptTts::with_voice(&fpt_key, &args.voice)?;
    let audio_path = args.shared.output_dir.join("audio.wav");

    let mut synthesized = false;
    if !args.shared.no_cache {
        let key = reelgen_core::cache::text_hash(&script_text);
        if let Some(cached) = reelgen_core::cache::get_cached_audio(&key, &args.voice) {
            std::fs::copy(&cached, &audio_path)?;
            synthesized = true;
        }
    }
    if !synthesized {
        tts.synthesize(&script_text, &audio_path)?;
        if !args.shared.no_cache {
            let key = reelgen_core::cache::text_hash(&script_text);
            reelgen_core::cache::store_audio_cache(&key, &args.voice, &audio_path)?;
        }
    }
    println!("Audio: {}", audio_path.display());

    // 3. Transcribe + align captions
    let transcript = transcribe_audio(
        &audio_path,
        &args.whisper_model,
        &args.language,
        args.shared.no_cache,
    )?;
    let lexicon = CaptionLexicon::default_vietnamese();
    let outcome = caption_with_fallback(&transcript, &script_text, &args.shared, lexicon)?;
    write_outcome(&outcome, &args.shared)?;

    // 4. Stock footage manifest
    if args.no_footage {
        return Ok(());
    }
    if outcome.captions.is_empty() {
        bail!("no captions were produced; cannot plan footage");
    }

    let planner = LlmQueryPlanner::new(&args.llm_base_url, &llm_key, &args.llm_model)?;
    let queries = planner.plan_queries(&script_text, &outcome.captions)?;
    log::info!("planned {} scene queries", queries.len());

    let pexels_key = require_env("REELGEN_PEXELS_API_KEY")?;
    let provider = PexelsClient::new(&pexels_key)?;
    let scenes = select_scene_media(&provider, &queries)?;
    let scenes = merge_empty_intervals(&scenes);

    let manifest_path = args.shared.output_dir.join("footage.json");
    let json = serde_json::to_string_pretty(&scenes)?;
    std::fs::write(&manifest_path, json)
        .with_context(|| format!("failed to write {}", manifest_path.display()))?;
    println!("Footage manifest: {}", manifest_path.display());

    Ok(())
}

// ─── Captions runner ─────────────────────────────────────────────

fn run_captions(args: CaptionsArgs) -> Result<()> {
    if !args.audio.exists() {
        bail!("audio file not found: {}", args.audio.display());
    }
    let script_text = read_script_file(&args.script)?;

    let transcript = transcribe_audio(
        &args.audio,
        &args.whisper_model,
        &args.language,
        args.shared.no_cache,
    )?;

    let lexicon = CaptionLexicon::default_vietnamese();
    let outcome = caption_with_fallback(&transcript, &script_text, &args.shared, lexicon)?;
    write_outcome(&outcome, &args.shared)
}

// ─── Align runner ────────────────────────────────────────────────

fn run_align(args: AlignArgs) -> Result<()> {
    let transcript = load_transcript(&args.transcript)?;
    let script_text = read_script_file(&args.script)?;

    let lexicon = CaptionLexicon::default_vietnamese();
    let outcome = caption_with_fallback(&transcript, &script_text, &args.shared, lexicon)?;
    write_outcome(&outcome, &args.shared)
}

/// Word-level alignment, falling back to character-offset interpolation
/// when matching produces no captions at all.
fn caption_with_fallback(
    transcript: &Transcript,
    script_text: &str,
    shared: &SharedArgs,
    lexicon: &CaptionLexicon,
) -> Result<AlignmentOutcome> {
    let strategy = shared.strategy();
    let outcome = generate_timed_captions(transcript, script_text, strategy, lexicon)?;
    if !outcome.captions.is_empty() {
        return Ok(outcome);
    }

    log::warn!("word-level matching produced no captions, using character-offset interpolation");
    let words = extract_words(transcript, lexicon);
    let texts: Vec<String> = segment(script_text, strategy, lexicon)
        .into_iter()
        .map(|p| p.text)
        .collect();
    Ok(AlignmentOutcome {
        captions: interpolate(&words, &texts),
        skipped: Vec::new(),
    })
}
