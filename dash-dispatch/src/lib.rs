//! # dash-dispatch
//!
//! Turns button presses into spoken commands.
//!
//! The [`Registry`] maps each hardware address to a [`Command`]: a name, an
//! ordered list of phrases and the pacing between them. A [`WatchSession`]
//! subscribes to every registered button and fans their presses into one
//! queue, and the [`Dispatcher`] consumes that queue one press at a time,
//! speaking each command's phrases through the [`dash_speech::SpeechGateway`].
//!
//! ## Error policy
//!
//! - Configuration problems ([`ConfigError`]) are fatal and reported before
//!   anything is watched.
//! - A press from an unknown address is logged and skipped.
//! - A failing phrase abandons the rest of that command only; the next press
//!   is still handled.
//! - A source that ends stops that one button; the others keep working.
//!
//! ```rust,ignore
//! let registry = Arc::new(Registry::build(&config.buttons)?);
//! let gateway = Arc::new(SpeechGateway::new(voice_options)?);
//! let dispatcher = Dispatcher::new(registry.clone(), gateway, DispatchOptions::with_wake_word("Alexa"));
//!
//! let session = WatchSession::start(&watcher, "en3", &registry, DEFAULT_CAPACITY)?;
//! session.run(&dispatcher).await;
//! ```

mod command;
mod error;

pub mod dispatcher;
pub mod registry;
pub mod watch;

pub use command::{ButtonConfig, Command, DEFAULT_PACING_SECS};
pub use dispatcher::{DispatchOptions, DispatchStats, Dispatcher, Outcome, DEFAULT_WAKE_WORD};
pub use error::{ConfigError, DispatchError, Result};
pub use registry::{Registry, RegistryBuilder};
pub use watch::WatchSession;
