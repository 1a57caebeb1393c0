//! Speech Backend Gateway: name-based selection over the registered backends.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::backend::SpeechBackend;
use crate::error::{Result, SpeechError};
use crate::espeak::EspeakBackend;
use crate::options::VoiceOptions;
use crate::polly::PollyBackend;

/// Routes speak requests to the backend named in the voice options.
///
/// Built once at start-up; construction fails when the selected backend needs
/// credentials that are missing, so nothing starts watching with a gateway
/// that cannot authenticate. An unknown backend name is accepted: every speak
/// request then logs a warning and succeeds without producing audio.
pub struct SpeechGateway {
    backends: HashMap<String, Arc<dyn SpeechBackend>>,
    options: VoiceOptions,
}

impl SpeechGateway {
    /// Gateway over the built-in backends (`polly`, `espeak`)
    pub fn new(options: VoiceOptions) -> Result<Self> {
        Self::with_backends(options, default_backends())
    }

    /// Gateway over an explicit set of backends. Later backends with the same
    /// name replace earlier ones.
    pub fn with_backends(
        options: VoiceOptions,
        backends: impl IntoIterator<Item = Arc<dyn SpeechBackend>>,
    ) -> Result<Self> {
        let backends = backends
            .into_iter()
            .map(|backend| (backend.name().to_ascii_lowercase(), backend))
            .collect();

        let gateway = Self { backends, options };
        gateway.check_credentials(&gateway.options)?;

        if gateway.backend(&gateway.options.backend_name).is_none() {
            warn!(
                backend = %gateway.options.backend_name,
                known = ?gateway.backend_names(),
                "Unknown speech backend, phrases will not be spoken"
            );
        }
        Ok(gateway)
    }

    /// Verify that `options` carry the credentials its backend needs
    pub fn check_credentials(&self, options: &VoiceOptions) -> Result<()> {
        let Some(backend) = self.backend(&options.backend_name) else {
            return Ok(());
        };
        if !backend.requires_credentials() {
            return Ok(());
        }

        let missing = if options.access_key.trim().is_empty() {
            Some("access key")
        } else if options.secret_key.trim().is_empty() {
            Some("secret key")
        } else {
            None
        };

        match missing {
            Some(missing) => Err(SpeechError::MissingCredentials {
                backend: backend.name().to_string(),
                missing,
            }),
            None => Ok(()),
        }
    }

    /// Options the gateway was built with
    pub fn options(&self) -> &VoiceOptions {
        &self.options
    }

    /// Names of the registered backends, sorted
    pub fn backend_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Whether `name` selects a registered backend
    pub fn is_known_backend(&self, name: &str) -> bool {
        self.backend(name).is_some()
    }

    /// Speak `text` with the gateway's own options
    pub async fn speak(&self, text: &str) -> Result<()> {
        self.speak_with(text, &self.options).await
    }

    /// Speak `text` with explicit options; the backend is chosen by
    /// `options.backend_name`.
    pub async fn speak_with(&self, text: &str, options: &VoiceOptions) -> Result<()> {
        match self.backend(&options.backend_name) {
            Some(backend) => {
                debug!(backend = backend.name(), text, "Speaking");
                backend.speak(text, options).await
            }
            None => {
                warn!(backend = %options.backend_name, "Unknown speech backend, ignoring");
                Ok(())
            }
        }
    }

    fn backend(&self, name: &str) -> Option<&Arc<dyn SpeechBackend>> {
        self.backends.get(&name.trim().to_ascii_lowercase())
    }
}

impl std::fmt::Debug for SpeechGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechGateway")
            .field("backends", &self.backend_names())
            .field("options", &self.options)
            .finish()
    }
}

/// The backends shipped with this crate
pub fn default_backends() -> Vec<Arc<dyn SpeechBackend>> {
    vec![
        Arc::new(PollyBackend::new()),
        Arc::new(EspeakBackend::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockSpeechBackend;

    fn mock_backend(name: &'static str, requires_credentials: bool) -> MockSpeechBackend {
        let mut mock = MockSpeechBackend::new();
        mock.expect_name().return_const(name);
        mock.expect_requires_credentials()
            .return_const(requires_credentials);
        mock
    }

    #[tokio::test]
    async fn test_speak_selects_backend_by_name() {
        let mut polly = mock_backend("polly", false);
        polly
            .expect_speak()
            .withf(|text, options| text.to_string() == "Alexa, hello" && options.backend_name == "polly")
            .times(1)
            .returning(|_, _| Ok(()));
        let mut espeak = mock_backend("espeak", false);
        espeak.expect_speak().never();

        let gateway = SpeechGateway::with_backends(
            VoiceOptions::for_backend("polly"),
            vec![
                Arc::new(polly) as Arc<dyn SpeechBackend>,
                Arc::new(espeak) as Arc<dyn SpeechBackend>,
            ],
        )
        .unwrap();

        gateway.speak("Alexa, hello").await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_backend_is_a_noop() {
        let mut polly = mock_backend("polly", true);
        polly.expect_speak().never();

        let gateway = SpeechGateway::with_backends(
            VoiceOptions::for_backend("ivona"),
            vec![Arc::new(polly) as Arc<dyn SpeechBackend>],
        )
        .unwrap();

        assert!(!gateway.is_known_backend("ivona"));
        assert!(gateway.speak("hello").await.is_ok());
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let mut polly = mock_backend("polly", false);
        polly
            .expect_speak()
            .returning(|_, _| Err(SpeechError::Synthesis("throttled".to_string())));

        let gateway = SpeechGateway::with_backends(
            VoiceOptions::for_backend("polly"),
            vec![Arc::new(polly) as Arc<dyn SpeechBackend>],
        )
        .unwrap();

        let result = gateway.speak("hello").await;
        assert!(matches!(result, Err(SpeechError::Synthesis(_))));
    }

    #[test]
    fn test_missing_credentials_fail_at_construction() {
        let result = SpeechGateway::new(VoiceOptions::for_backend("polly"));
        match result {
            Err(SpeechError::MissingCredentials { backend, missing }) => {
                assert_eq!(backend, "polly");
                assert_eq!(missing, "access key");
            }
            other => panic!("Expected MissingCredentials, got {:?}", other),
        }

        let options = VoiceOptions::for_backend("polly").with_credentials("AKIA", "  ");
        assert!(matches!(
            SpeechGateway::new(options),
            Err(SpeechError::MissingCredentials { missing: "secret key", .. })
        ));
    }

    #[test]
    fn test_credentials_not_needed_for_espeak_or_unknown() {
        assert!(SpeechGateway::new(VoiceOptions::for_backend("espeak")).is_ok());
        assert!(SpeechGateway::new(VoiceOptions::for_backend("ivona")).is_ok());
    }

    #[test]
    fn test_backend_names_case_insensitive() {
        let options = VoiceOptions::for_backend(" Polly ").with_credentials("AKIA", "secret");
        let gateway = SpeechGateway::new(options).unwrap();

        assert_eq!(gateway.backend_names(), vec!["espeak", "polly"]);
        assert!(gateway.is_known_backend("POLLY"));
        assert_eq!(gateway.options().backend_name, " Polly ");
    }
}
