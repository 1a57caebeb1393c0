//! Command Dispatcher: the single consumer that turns presses into speech.
//!
//! Presses are handled strictly one at a time. A press that arrives while a
//! command is still being spoken waits in the aggregator's queue until every
//! phrase of the current command (and the pauses between them) is done, so
//! audio never overlaps.

use std::fmt;
use std::sync::Arc;

use dash_events::PressEvent;
use dash_speech::{SpeechError, SpeechGateway};
use futures::stream::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::registry::Registry;

/// Wake word used by the stock configuration
pub const DEFAULT_WAKE_WORD: &str = "Alexa";

/// Per-deployment dispatch settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Prefix for every utterance ("Alexa, ..."); `None` speaks phrases as is
    pub wake_word: Option<String>,
}

impl DispatchOptions {
    /// Options with `wake_word` as prefix; a blank word disables the prefix
    pub fn with_wake_word(wake_word: impl Into<String>) -> Self {
        let wake_word = wake_word.into();
        let wake_word = wake_word.trim();
        Self {
            wake_word: (!wake_word.is_empty()).then(|| wake_word.to_string()),
        }
    }
}

/// Counters collected over one run of the dispatch loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Presses taken off the queue
    pub events: u64,
    /// Commands whose phrases were all spoken
    pub commands_completed: u64,
    /// Commands abandoned after a phrase failed
    pub commands_failed: u64,
    /// Presses for addresses with no command
    pub unresolved: u64,
    /// Phrases handed to the gateway successfully
    pub phrases_spoken: u64,
}

impl fmt::Display for DispatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dispatch Stats:")?;
        writeln!(f, "  Presses received: {}", self.events)?;
        writeln!(f, "  Commands completed: {}", self.commands_completed)?;
        writeln!(f, "  Commands failed: {}", self.commands_failed)?;
        writeln!(f, "  Unresolved presses: {}", self.unresolved)?;
        writeln!(f, "  Phrases spoken: {}", self.phrases_spoken)?;
        Ok(())
    }
}

/// What happened to one press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every phrase was spoken
    Completed { phrases: usize },
    /// A phrase failed; `spoken` phrases went out before it
    Abandoned { spoken: usize },
    /// No command is registered for the address
    Unresolved,
}

/// Sequential consumer of aggregated presses.
pub struct Dispatcher {
    registry: Arc<Registry>,
    gateway: Arc<SpeechGateway>,
    options: DispatchOptions,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>, gateway: Arc<SpeechGateway>, options: DispatchOptions) -> Self {
        Self {
            registry,
            gateway,
            options,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Consume presses until `events` ends.
    ///
    /// With a live aggregator the stream never ends, so this only returns
    /// after the aggregator has been torn down and drained.
    pub async fn run<S>(&self, mut events: S) -> DispatchStats
    where
        S: Stream<Item = PressEvent> + Unpin,
    {
        let mut stats = DispatchStats::default();

        while let Some(event) = events.next().await {
            stats.events += 1;
            match self.handle(&event).await {
                Outcome::Completed { phrases } => {
                    stats.commands_completed += 1;
                    stats.phrases_spoken += phrases as u64;
                }
                Outcome::Abandoned { spoken } => {
                    stats.commands_failed += 1;
                    stats.phrases_spoken += spoken as u64;
                }
                Outcome::Unresolved => stats.unresolved += 1,
            }
        }

        debug!("Press stream ended, dispatcher stopping");
        stats
    }

    /// Resolve one press and run its command to completion
    pub async fn handle(&self, event: &PressEvent) -> Outcome {
        let Some(command) = self.registry.lookup(&event.address) else {
            warn!(address = %event.address, "Press from unregistered address, ignoring");
            return Outcome::Unresolved;
        };

        info!(
            "Button '{}' pushed [{}]",
            command.name(),
            command.address()
        );

        match self.execute(command).await {
            Ok(phrases) => Outcome::Completed { phrases },
            Err((spoken, error)) => {
                warn!(
                    button = command.name(),
                    phrase = spoken + 1,
                    "Speaking failed, abandoning remaining phrases: {}",
                    error
                );
                Outcome::Abandoned { spoken }
            }
        }
    }

    /// Speak every phrase of `command` in order, pausing for its pacing
    /// between phrases (not after the last one). Stops at the first failure,
    /// returning how many phrases had been spoken with the error.
    pub async fn execute(&self, command: &Command) -> Result<usize, (usize, SpeechError)> {
        let phrases = command.phrases();

        for (index, phrase) in phrases.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(command.pacing()).await;
            }

            let utterance = self.utterance(phrase);
            debug!(button = command.name(), %utterance, "Speaking phrase");
            self.gateway
                .speak(&utterance)
                .await
                .map_err(|error| (index, error))?;
        }

        Ok(phrases.len())
    }

    /// Text actually sent to the backend for `phrase`
    pub fn utterance(&self, phrase: &str) -> String {
        match &self.options.wake_word {
            Some(wake_word) => format!("{}, {}", wake_word, phrase),
            None => phrase.to_string(),
        }
    }
}
