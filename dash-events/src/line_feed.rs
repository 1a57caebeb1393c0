//! Watcher driven by lines of text from an external capture program.
//!
//! Link-layer capture itself lives outside this crate. Any tool that prints a
//! line per observed packet, with the sender's hardware address in it (for
//! example `tcpdump -l -e -n -i en3 arp`), can drive the buttons: every line is
//! broadcast to all subscriptions and a subscription reports a press when the
//! line mentions its address.
//!
//! A single press of a dash button produces a burst of packets, so repeated
//! sightings inside the debounce window count as one press.

use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::address::HardwareAddress;
use crate::error::{Result, SourceError};
use crate::event::PressEvent;
use crate::watcher::{ButtonWatcher, PressStream};

/// Default window inside which repeated sightings collapse into one press
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(5);

const LINE_BUFFER: usize = 256;

/// [`ButtonWatcher`] over a shared feed of capture output lines.
pub struct LineFeedWatcher {
    lines: Mutex<broadcast::Receiver<String>>,
    debounce: Duration,
}

impl LineFeedWatcher {
    /// Create the watcher together with the feed that supplies its lines.
    ///
    /// Subscriptions only see lines published after they were created. When
    /// the feed is dropped or its reader task ends, every stream ends.
    pub fn new(debounce: Duration) -> (Self, LineFeed) {
        let (sender, receiver) = broadcast::channel(LINE_BUFFER);
        (
            Self {
                lines: Mutex::new(receiver),
                debounce,
            },
            LineFeed { sender },
        )
    }

    /// Debounce window applied per address
    pub fn debounce(&self) -> Duration {
        self.debounce
    }
}

impl ButtonWatcher for LineFeedWatcher {
    fn watch(&self, _interface: &str, address: &HardwareAddress) -> Result<PressStream> {
        let lines = self
            .lines
            .lock()
            .map_err(|_| SourceError::Closed)?
            .resubscribe();
        let address = address.clone();
        let debounce = self.debounce;

        let presses = stream::unfold(
            (lines, None::<Instant>),
            move |(mut lines, mut last_press)| {
                let address = address.clone();
                async move {
                    loop {
                        match lines.recv().await {
                            Ok(line) => {
                                if !address.appears_in(&line) {
                                    continue;
                                }
                                let now = Instant::now();
                                if let Some(previous) = last_press {
                                    if now.duration_since(previous) < debounce {
                                        debug!(%address, "Repeated sighting within debounce window");
                                        continue;
                                    }
                                }
                                last_press = Some(now);
                                return Some((PressEvent::new(address), (lines, last_press)));
                            }
                            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                                warn!(%address, skipped, "Capture feed lagged, lines skipped");
                            }
                            Err(broadcast::error::RecvError::Closed) => return None,
                        }
                    }
                }
            },
        );

        Ok(presses.boxed())
    }
}

/// Publishing side of a [`LineFeedWatcher`].
#[derive(Debug, Clone)]
pub struct LineFeed {
    sender: broadcast::Sender<String>,
}

impl LineFeed {
    /// Publish one line to every subscription
    pub fn publish(&self, line: impl Into<String>) {
        // No subscribers yet is not an error; the line is simply unseen.
        let _ = self.sender.send(line.into());
    }

    /// Publish every line read from `reader` until end of input.
    pub fn spawn_reader<R>(self, reader: R) -> JoinHandle<()>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        tokio::spawn(async move {
            let mut lines = reader.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => self.publish(line),
                    Ok(None) => {
                        warn!("Capture input reached end of stream");
                        break;
                    }
                    Err(e) => {
                        warn!("Failed to read capture input: {}", e);
                        break;
                    }
                }
            }
        })
    }

    /// Run the capture program described by `template` and publish its stdout.
    ///
    /// `{interface}` in the template is replaced by `interface`; the result is
    /// split with shell quoting rules.
    pub fn spawn_capture(self, template: &str, interface: &str) -> Result<JoinHandle<()>> {
        let mut command = capture_command(template, interface)?;
        let mut child = command
            .spawn()
            .map_err(|e| SourceError::CaptureFailed(format!("{}: {}", template, e)))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SourceError::CaptureFailed("capture stdout not piped".to_string()))?;

        info!(interface, command = template, "Capture program started");

        let reader = self.spawn_reader(BufReader::new(stdout));
        Ok(tokio::spawn(async move {
            let _ = reader.await;
            match child.wait().await {
                Ok(status) => warn!(%status, "Capture program exited"),
                Err(e) => warn!("Failed to reap capture program: {}", e),
            }
        }))
    }
}

fn capture_command(template: &str, interface: &str) -> Result<Command> {
    let rendered = template.replace("{interface}", interface);
    let parts = shlex::split(&rendered)
        .filter(|parts| !parts.is_empty())
        .ok_or_else(|| SourceError::CaptureFailed(format!("unusable capture command: {}", template)))?;

    let mut command = Command::new(&parts[0]);
    command
        .args(&parts[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .kill_on_drop(true);
    Ok(command)
}
