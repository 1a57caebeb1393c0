//! # dash-speech
//!
//! Text-to-speech for dash-voice behind one uniform interface.
//!
//! Every provider implements [`SpeechBackend`]; the [`SpeechGateway`] picks one
//! by the `backend_name` in [`VoiceOptions`]. Backends synthesise into a
//! temporary audio file and hand it to an external player program.
//!
//! ```rust,ignore
//! use dash_speech::{SpeechGateway, VoiceOptions};
//!
//! let options = VoiceOptions::for_backend("polly").with_credentials(access, secret);
//! let gateway = SpeechGateway::new(options)?; // fails fast on missing credentials
//! gateway.speak("Alexa, turn on the lights").await?;
//! ```

mod error;
mod options;

pub mod backend;
pub mod espeak;
pub mod gateway;
pub mod player;
pub mod polly;

pub use backend::SpeechBackend;
pub use error::{Result, SpeechError};
pub use espeak::EspeakBackend;
pub use gateway::{default_backends, SpeechGateway};
pub use options::{Gender, VoiceOptions};
pub use player::AudioFormat;
pub use polly::PollyBackend;
