//! Error types for the dash-speech crate.

/// Errors from the speech gateway and its backends.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// A backend that needs credentials was configured without them
    #[error("Missing credentials for speech backend '{backend}': {missing}")]
    MissingCredentials {
        /// Backend name
        backend: String,
        /// Which credential is missing
        missing: &'static str,
    },

    /// The synthesis step failed
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    /// The player could not be run or reported failure
    #[error("Audio playback failed: {0}")]
    Playback(String),

    /// The player template could not be turned into a command
    #[error("Invalid player command: {0}")]
    InvalidPlayer(String),

    /// Temporary audio file handling failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results using SpeechError.
pub type Result<T> = std::result::Result<T, SpeechError>;
