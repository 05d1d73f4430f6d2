//! Typed errors for the caption subsystem.

use thiserror::Error;

/// Fatal caption-alignment failures.
///
/// Partial results are never errors: unmatched phrases are reported via
/// `AlignmentOutcome::skipped`. The only fatal case is having nothing to
/// work with on either side.
#[derive(Debug, Error)]
pub enum CaptionError {
    /// Both the transcript and the script produced zero usable units.
    #[error("empty alignment input: no transcript words and no script phrases")]
    EmptyInput,
}
