//! Shared helpers for dispatch integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dash_dispatch::{ButtonConfig, DispatchOptions, Dispatcher, Registry};
use dash_events::{ChannelWatcher, HardwareAddress, PressHandle};
use dash_speech::{SpeechBackend, SpeechError, SpeechGateway, VoiceOptions};
use tokio::time::Instant;

pub const BACKEND: &str = "recording";

/// One utterance as seen by the backend
#[derive(Debug, Clone)]
pub struct Spoken {
    pub text: String,
    pub at: Instant,
}

/// Backend that records every utterance and optionally fails on one phrase.
///
/// Each utterance takes `duration` of (virtual) time to "play".
#[derive(Clone, Default)]
pub struct RecordingBackend {
    spoken: Arc<Mutex<Vec<Spoken>>>,
    fail_on: Option<String>,
    duration: Duration,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, text: &str) -> Self {
        self.fail_on = Some(text.to_string());
        self
    }

    pub fn taking(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn spoken(&self) -> Vec<Spoken> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.spoken().into_iter().map(|s| s.text).collect()
    }
}

#[async_trait]
impl SpeechBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        BACKEND
    }

    fn requires_credentials(&self) -> bool {
        false
    }

    async fn speak(&self, text: &str, _options: &VoiceOptions) -> dash_speech::Result<()> {
        self.spoken.lock().unwrap().push(Spoken {
            text: text.to_string(),
            at: Instant::now(),
        });
        if !self.duration.is_zero() {
            tokio::time::sleep(self.duration).await;
        }
        if self.fail_on.as_deref() == Some(text) {
            return Err(SpeechError::Synthesis(format!("cannot say '{}'", text)));
        }
        Ok(())
    }
}

pub fn address(raw: &str) -> HardwareAddress {
    HardwareAddress::parse(raw).unwrap()
}

/// Dispatcher speaking through `backend`, selected by `backend_name`
pub fn dispatcher_with(
    buttons: &[ButtonConfig],
    backend: &RecordingBackend,
    backend_name: &str,
    options: DispatchOptions,
) -> Dispatcher {
    let registry = Arc::new(Registry::build(buttons).unwrap());
    let backends: Vec<Arc<dyn SpeechBackend>> = vec![Arc::new(backend.clone())];
    let gateway = SpeechGateway::with_backends(VoiceOptions::for_backend(backend_name), backends).unwrap();
    Dispatcher::new(registry, Arc::new(gateway), options)
}

/// Dispatcher without a wake word speaking through `backend`
pub fn dispatcher(buttons: &[ButtonConfig], backend: &RecordingBackend) -> Dispatcher {
    dispatcher_with(buttons, backend, BACKEND, DispatchOptions::default())
}

/// A watcher with a registered source for each button
pub fn watcher_for(buttons: &[ButtonConfig]) -> (ChannelWatcher, Vec<PressHandle>) {
    let watcher = ChannelWatcher::new();
    let handles = buttons
        .iter()
        .map(|button| watcher.register(address(&button.mac)))
        .collect();
    (watcher, handles)
}
