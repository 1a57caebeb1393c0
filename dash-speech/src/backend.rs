//! Backend trait implemented by every text-to-speech provider.

use async_trait::async_trait;

use crate::error::Result;
use crate::options::VoiceOptions;

/// A concrete text-to-speech provider selected by name.
///
/// A backend authenticates with the configured credentials, synthesises audio
/// for the text in the requested voice, and plays it. `speak` returns once
/// playback has finished.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Name used to select this backend in the configuration
    fn name(&self) -> &'static str;

    /// Whether access key and secret must be present at start-up
    fn requires_credentials(&self) -> bool {
        true
    }

    /// Synthesise `text` and play it
    async fn speak(&self, text: &str, options: &VoiceOptions) -> Result<()>;
}
