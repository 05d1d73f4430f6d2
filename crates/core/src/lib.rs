//! Core library for generating Vietnamese short-form videos: script
//! writing, speech synthesis, transcription, caption alignment, and
//! background footage selection.

pub mod asr;
pub mod audio;
pub mod cache;
pub mod captions;
pub mod errors;
pub mod script;
pub mod srt;
pub mod tts;
pub mod types;
pub mod video;

pub use captions::{align, generate_timed_captions, SegmentStrategy};
pub use errors::CaptionError;
pub use types::{AlignmentOutcome, TimedCaption, Transcript};
