//! Terminal wrapper.
//!
//! This module provides [`Tui`], which owns raw mode and the input listener
//! that turns terminal events into [`Message`]s on the bus. Drawing is the
//! renderer's job.

use std::io;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEventKind};
use futures::{FutureExt, StreamExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::{BusSender, Key, Message};

/// Terminal state owned by a running program.
pub struct Tui {
    raw_mode: bool,
    input: bool,
    raw_mode_enabled: bool,
    task: Option<JoinHandle<()>>,
    cancellation_token: CancellationToken,
}

impl Tui {
    pub fn new(raw_mode: bool, input: bool) -> Self {
        Self {
            raw_mode,
            input,
            raw_mode_enabled: false,
            task: None,
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Enable raw mode and start forwarding input to `bus`.
    pub fn enter<M: Send + 'static>(&mut self, bus: BusSender<M>) -> io::Result<()> {
        if self.raw_mode {
            crossterm::terminal::enable_raw_mode()?;
            self.raw_mode_enabled = true;
        }
        if self.input {
            self.start(bus);
        }
        Ok(())
    }

    /// Stop the input listener and restore the terminal mode.
    pub fn exit(&mut self) -> io::Result<()> {
        self.stop();
        if self.raw_mode_enabled {
            crossterm::terminal::disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        Ok(())
    }

    /// Current terminal size as `(columns, rows)`.
    pub fn size() -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    fn start<M: Send + 'static>(&mut self, bus: BusSender<M>) {
        self.stop();
        self.cancellation_token = CancellationToken::new();
        let event_loop = Self::event_loop(bus, self.cancellation_token.clone());
        self.task = Some(tokio::spawn(event_loop));
    }

    fn stop(&mut self) {
        self.cancellation_token.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    async fn event_loop<M: Send + 'static>(bus: BusSender<M>, cancellation_token: CancellationToken) {
        let mut event_stream = EventStream::new();

        // Spawn SIGTERM handler on Unix
        #[cfg(unix)]
        {
            let bus = bus.clone();
            let token = cancellation_token.clone();
            tokio::spawn(async move {
                use tokio::signal::unix::{SignalKind, signal};
                let mut sigterm = match signal(SignalKind::terminate()) {
                    Ok(sigterm) => sigterm,
                    Err(err) => {
                        warn!(error = %err, "could not install SIGTERM handler");
                        return;
                    }
                };
                tokio::select! {
                    () = token.cancelled() => {}
                    _ = sigterm.recv() => {
                        debug!("SIGTERM received");
                        bus.send(Message::Quit);
                    }
                }
            });
        }

        loop {
            let message = tokio::select! {
                () = cancellation_token.cancelled() => break,
                event = event_stream.next().fuse() => match event {
                    Some(Ok(event)) => match translate(event) {
                        Some(message) => message,
                        None => continue,
                    },
                    Some(Err(err)) => {
                        warn!(error = %err, "failed to read terminal input");
                        break;
                    }
                    None => break,
                },
            };
            if !bus.send(message) {
                break;
            }
        }
        cancellation_token.cancel();
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(err) = self.exit() {
            warn!(error = %err, "failed to restore terminal");
        }
    }
}

/// Map a terminal event to a message. Key releases, mouse, focus and paste
/// events are ignored.
pub fn translate<M>(event: CrosstermEvent) -> Option<Message<M>> {
    match event {
        CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => {
            Some(Message::Key(Key::from(key)))
        }
        CrosstermEvent::Resize(width, height) => Some(Message::Resize { width, height }),
        _ => None,
    }
}
