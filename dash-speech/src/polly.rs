//! Amazon Polly backend, reached through the `aws` command line program.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::backend::SpeechBackend;
use crate::error::{Result, SpeechError};
use crate::options::{Gender, VoiceOptions};
use crate::player::{self, AudioFormat};

/// Synthesises mp3 audio with `aws polly synthesize-speech`.
#[derive(Debug, Clone)]
pub struct PollyBackend {
    program: String,
}

impl PollyBackend {
    pub const NAME: &'static str = "polly";

    pub fn new() -> Self {
        Self::with_program("aws")
    }

    /// Use a different `aws` executable
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn synthesize_command(&self, text: &str, options: &VoiceOptions, output: &str) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(["polly", "synthesize-speech", "--output-format", "mp3"])
            .args(["--voice-id", voice_id(options.language(), options.gender())])
            .args(["--text", text])
            .arg(output)
            .env("AWS_ACCESS_KEY_ID", &options.access_key)
            .env("AWS_SECRET_ACCESS_KEY", &options.secret_key);
        if !options.region.trim().is_empty() {
            command.env("AWS_DEFAULT_REGION", options.region.trim());
        }
        command
    }
}

impl Default for PollyBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechBackend for PollyBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn speak(&self, text: &str, options: &VoiceOptions) -> Result<()> {
        let audio = tempfile::Builder::new()
            .prefix("dash-voice-")
            .suffix(AudioFormat::Mp3.suffix())
            .tempfile()?;
        let path = audio.path().to_string_lossy().into_owned();

        debug!(voice = voice_id(options.language(), options.gender()), "Synthesizing with Polly");
        let mut command = self.synthesize_command(text, options, &path);
        player::run_to_completion(&mut command)
            .await
            .map_err(SpeechError::Synthesis)?;

        player::play(options.player_override.as_deref(), audio.path(), AudioFormat::Mp3).await
    }
}

/// Pick a Polly voice for a language tag and gender.
pub fn voice_id(language: &str, gender: Gender) -> &'static str {
    let voices: (&'static str, &'static str) = match language.to_ascii_lowercase().as_str() {
        "en-gb" => ("Amy", "Brian"),
        "en-au" => ("Nicole", "Russell"),
        "de-de" | "de" => ("Marlene", "Hans"),
        "fr-fr" | "fr" => ("Celine", "Mathieu"),
        "es-es" | "es" => ("Conchita", "Enrique"),
        "it-it" | "it" => ("Carla", "Giorgio"),
        "nl-nl" | "nl" => ("Lotte", "Ruben"),
        "ja-jp" | "ja" => ("Mizuki", "Takumi"),
        _ => ("Joanna", "Matthew"),
    };
    match gender {
        Gender::Female => voices.0,
        Gender::Male => voices.1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("en-US", Gender::Female, "Joanna")]
    #[case("en-US", Gender::Male, "Matthew")]
    #[case("de-DE", Gender::Female, "Marlene")]
    #[case("de-DE", Gender::Male, "Hans")]
    #[case("EN-GB", Gender::Male, "Brian")]
    #[case("xx-YY", Gender::Female, "Joanna")]
    fn test_voice_id(#[case] language: &str, #[case] gender: Gender, #[case] expected: &str) {
        assert_eq!(voice_id(language, gender), expected);
    }

    #[test]
    fn test_synthesize_command() {
        let backend = PollyBackend::new();
        let options = VoiceOptions {
            gender: "male".to_string(),
            language: "de-DE".to_string(),
            ..VoiceOptions::for_backend("polly").with_credentials("AKIA", "secret")
        };

        let command = backend.synthesize_command("Alexa, hallo", &options, "/tmp/out.mp3");
        let std_command = command.as_std();
        assert_eq!(std_command.get_program(), "aws");

        let args: Vec<_> = std_command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "polly",
                "synthesize-speech",
                "--output-format",
                "mp3",
                "--voice-id",
                "Hans",
                "--text",
                "Alexa, hallo",
                "/tmp/out.mp3",
            ]
        );

        let envs: Vec<_> = std_command.get_envs().collect();
        assert!(envs.iter().any(|(k, v)| *k == "AWS_ACCESS_KEY_ID" && v.map_or(false, |v| v == "AKIA")));
        assert!(envs.iter().any(|(k, _)| *k == "AWS_SECRET_ACCESS_KEY"));
    }

    #[test]
    fn test_region_passed_when_configured() {
        let backend = PollyBackend::new();
        let options = VoiceOptions {
            region: "eu-west-1".to_string(),
            ..VoiceOptions::for_backend("polly").with_credentials("AKIA", "secret")
        };

        let command = backend.synthesize_command("hi", &options, "/tmp/out.mp3");
        let region = command
            .as_std()
            .get_envs()
            .find(|(key, _)| *key == "AWS_DEFAULT_REGION")
            .and_then(|(_, value)| value);
        assert_eq!(region, Some(std::ffi::OsStr::new("eu-west-1")));

        let options = VoiceOptions::for_backend("polly").with_credentials("AKIA", "secret");
        let command = backend.synthesize_command("hi", &options, "/tmp/out.mp3");
        assert!(!command.as_std().get_envs().any(|(key, _)| key == "AWS_DEFAULT_REGION"));
    }

    #[test]
    fn test_requires_credentials() {
        let backend = PollyBackend::default();
        assert!(backend.requires_credentials());
        assert_eq!(backend.name(), "polly");
    }
}
