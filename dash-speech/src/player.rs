//! Playback of synthesised audio files through an external player program.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SpeechError};

/// Container format of a synthesised file; decides the default player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
}

impl AudioFormat {
    /// File suffix including the dot
    pub fn suffix(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => ".mp3",
            AudioFormat::Wav => ".wav",
        }
    }
}

/// Build the command that plays `file`.
///
/// With a template, `%s` is replaced by the file path (appended when the
/// template has no placeholder) and the result is split with shell quoting
/// rules. Without one, `afplay` is used on macOS, otherwise `mpg123` for mp3
/// and `aplay` for wav.
pub fn player_command(template: Option<&str>, file: &Path, format: AudioFormat) -> Result<Command> {
    let path = file.to_string_lossy();

    let parts = match template.map(str::trim).filter(|t| !t.is_empty()) {
        Some(template) => {
            let mut parts = shlex::split(template)
                .filter(|parts| !parts.is_empty())
                .ok_or_else(|| SpeechError::InvalidPlayer(template.to_string()))?;
            if template.contains("%s") {
                for part in parts.iter_mut() {
                    *part = part.replace("%s", &path);
                }
            } else {
                parts.push(path.to_string());
            }
            parts
        }
        None => vec![default_player(format).to_string(), path.to_string()],
    };

    let mut command = Command::new(&parts[0]);
    command
        .args(&parts[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    Ok(command)
}

fn default_player(format: AudioFormat) -> &'static str {
    if cfg!(target_os = "macos") {
        return "afplay";
    }
    match format {
        AudioFormat::Mp3 => "mpg123",
        AudioFormat::Wav => "aplay",
    }
}

/// Play `file` and wait for the player to finish
pub async fn play(template: Option<&str>, file: &Path, format: AudioFormat) -> Result<()> {
    let mut command = player_command(template, file, format)?;
    debug!(file = %file.display(), "Playing audio");
    run_to_completion(&mut command)
        .await
        .map_err(SpeechError::Playback)
}

/// Run `command`, turning spawn failures and non-zero exits into a message
pub(crate) async fn run_to_completion(command: &mut Command) -> std::result::Result<(), String> {
    let program = command.as_std().get_program().to_string_lossy().into_owned();
    let output = command
        .output()
        .await
        .map_err(|e| format!("{}: {}", program, e))?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(format!("{} {}: {}", program, output.status, stderr.trim()))
    }
}
