//! Local espeak-ng backend. Needs no credentials.

use async_trait::async_trait;
use tokio::process::Command;

use crate::backend::SpeechBackend;
use crate::error::{Result, SpeechError};
use crate::options::{Gender, VoiceOptions};
use crate::player::{self, AudioFormat};

/// Synthesises wav audio with `espeak-ng -w`.
#[derive(Debug, Clone)]
pub struct EspeakBackend {
    program: String,
}

impl EspeakBackend {
    pub const NAME: &'static str = "espeak";

    pub fn new() -> Self {
        Self::with_program("espeak-ng")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn synthesize_command(&self, text: &str, options: &VoiceOptions, output: &str) -> Command {
        let voice = voice(options.language(), options.gender());
        let mut command = Command::new(&self.program);
        command
            .arg("-v")
            .arg(&voice)
            .args(["-w", output])
            .arg(text);
        command
    }
}

impl Default for EspeakBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechBackend for EspeakBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn requires_credentials(&self) -> bool {
        false
    }

    async fn speak(&self, text: &str, options: &VoiceOptions) -> Result<()> {
        let audio = tempfile::Builder::new()
            .prefix("dash-voice-")
            .suffix(AudioFormat::Wav.suffix())
            .tempfile()?;
        let path = audio.path().to_string_lossy().into_owned();

        let mut command = self.synthesize_command(text, options, &path);
        player::run_to_completion(&mut command)
            .await
            .map_err(SpeechError::Synthesis)?;

        player::play(options.player_override.as_deref(), audio.path(), AudioFormat::Wav).await
    }
}

/// espeak voice name: lower-cased language plus a gender variant
fn voice(language: &str, gender: Gender) -> String {
    let variant = match gender {
        Gender::Female => "f3",
        Gender::Male => "m3",
    };
    format!("{}+{}", language.to_ascii_lowercase(), variant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice() {
        assert_eq!(voice("en-US", Gender::Female), "en-us+f3");
        assert_eq!(voice("de", Gender::Male), "de+m3");
    }

    #[test]
    fn test_synthesize_command() {
        let backend = EspeakBackend::with_program("/usr/bin/espeak-ng");
        let options = VoiceOptions::for_backend("espeak");

        let command = backend.synthesize_command("turn on the lights", &options, "/tmp/a.wav");
        let std_command = command.as_std();
        assert_eq!(std_command.get_program(), "/usr/bin/espeak-ng");
        let args: Vec<_> = std_command.get_args().collect();
        assert_eq!(args, ["-v", "en-us+f3", "-w", "/tmp/a.wav", "turn on the lights"]);
    }

    #[test]
    fn test_no_credentials_needed() {
        assert!(!EspeakBackend::new().requires_credentials());
        assert_eq!(EspeakBackend::new().name(), "espeak");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_program_is_synthesis_error() {
        let backend = EspeakBackend::with_program("/definitely/not/espeak");
        let result = backend.speak("hello", &VoiceOptions::for_backend("espeak")).await;
        assert!(matches!(result, Err(SpeechError::Synthesis(_))));
    }
}
