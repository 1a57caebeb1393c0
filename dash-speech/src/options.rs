//! Voice options shared by every backend.

use std::fmt;

/// Read-only snapshot of the speech settings, built once at start-up.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct VoiceOptions {
    /// Access key for backends that authenticate
    pub access_key: String,
    /// Secret paired with the access key
    pub secret_key: String,
    /// Requested voice gender, "female" or "male"
    pub gender: String,
    /// Requested language tag, e.g. "en-US"
    pub language: String,
    /// Provider region for backends that need one, inherited from the
    /// environment when empty
    pub region: String,
    /// Name of the backend that should speak
    pub backend_name: String,
    /// Player template with `%s` for the audio file, platform default when unset
    pub player_override: Option<String>,
}

/// Voice gender understood by the backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Female,
    Male,
}

impl VoiceOptions {
    /// Options for `backend_name` with default voice settings
    pub fn for_backend(backend_name: impl Into<String>) -> Self {
        Self {
            backend_name: backend_name.into(),
            ..Default::default()
        }
    }

    /// Set access key and secret
    pub fn with_credentials(mut self, access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        self.access_key = access_key.into();
        self.secret_key = secret_key.into();
        self
    }

    /// Parsed gender. Anything but "male"/"m" is treated as female.
    pub fn gender(&self) -> Gender {
        match self.gender.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Gender::Male,
            _ => Gender::Female,
        }
    }

    /// Language tag, "en-US" when unset
    pub fn language(&self) -> &str {
        match self.language.trim() {
            "" => "en-US",
            language => language,
        }
    }
}

impl fmt::Debug for VoiceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceOptions")
            .field("access_key", &self.access_key)
            .field("secret_key", &if self.secret_key.is_empty() { "" } else { "***" })
            .field("gender", &self.gender)
            .field("language", &self.language)
            .field("region", &self.region)
            .field("backend_name", &self.backend_name)
            .field("player_override", &self.player_override)
            .finish()
    }
}
