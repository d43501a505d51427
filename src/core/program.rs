//! The program loop.
//!
//! [`Program`] owns the model, pulls messages off the bus one at a time,
//! feeds them to `update`, hands the returned commands to the executor and
//! renders after every update. Nothing else touches the model.

use std::io::{self, Stdout, Write};

use thiserror::Error;
use tracing::{debug, info, trace, warn};

use super::bus::{BusSender, MessageBus};
use super::executor::Executor;
use super::message::Message;
use super::model::Model;
use super::renderer::Renderer;
use crate::theme::Styles;
use crate::tui::Tui;

const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// Fatal errors. Failures inside commands are application messages and
/// never show up here.
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("failed to set up the terminal: {0}")]
    TerminalSetup(#[source] io::Error),
    #[error("terminal i/o failed: {0}")]
    TerminalIo(#[source] io::Error),
}

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProgramState {
    Initializing,
    Running,
    Draining,
    Terminated,
}

/// How the program treats the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramOptions {
    /// Start in the alternate screen.
    pub alt_screen: bool,
    /// Hide the cursor while running.
    pub hide_cursor: bool,
    /// Listen for key presses, resizes and SIGTERM.
    pub input: bool,
    /// Put the terminal into raw mode.
    pub raw_mode: bool,
    /// Fixed terminal size instead of querying the terminal.
    pub size: Option<(u16, u16)>,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            alt_screen: false,
            hide_cursor: true,
            input: true,
            raw_mode: true,
            size: None,
        }
    }
}

impl ProgramOptions {
    /// No raw mode, no input listener and a fixed 80x24 size. For output
    /// that is not a terminal.
    pub const fn headless() -> Self {
        Self {
            alt_screen: false,
            hide_cursor: true,
            input: false,
            raw_mode: false,
            size: Some(FALLBACK_SIZE),
        }
    }

    #[must_use]
    pub const fn with_alt_screen(mut self, alt_screen: bool) -> Self {
        self.alt_screen = alt_screen;
        self
    }
}

/// Sends messages into a program from outside the loop.
pub struct ProgramHandle<M> {
    bus: BusSender<M>,
}

impl<M> Clone for ProgramHandle<M> {
    fn clone(&self) -> Self {
        Self {
            bus: self.bus.clone(),
        }
    }
}

impl<M> ProgramHandle<M> {
    /// Deliver an application message. Returns `false` once the program has
    /// stopped.
    pub fn send(&self, msg: M) -> bool {
        self.bus.send(Message::App(msg))
    }

    /// Deliver any message, e.g. a key press.
    pub fn send_message(&self, msg: Message<M>) -> bool {
        self.bus.send(msg)
    }

    /// Ask the program to stop.
    pub fn quit(&self) -> bool {
        self.bus.send(Message::Quit)
    }
}

/// Runs a [`Model`] against a terminal.
pub struct Program<M: Model, W: Write = Stdout> {
    model: M,
    out: W,
    options: ProgramOptions,
    styles: Styles,
    bus: MessageBus<M::Message>,
}

impl<M: Model> Program<M> {
    /// A program drawing to stdout.
    pub fn new(model: M) -> Self {
        Self::with_output(model, io::stdout())
    }
}

impl<M: Model, W: Write> Program<M, W> {
    pub fn with_output(model: M, out: W) -> Self {
        Self {
            model,
            out,
            options: ProgramOptions::default(),
            styles: Styles::default(),
            bus: MessageBus::new(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ProgramOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_styles(mut self, styles: Styles) -> Self {
        self.styles = styles;
        self
    }

    pub fn handle(&self) -> ProgramHandle<M::Message> {
        ProgramHandle {
            bus: self.bus.sender(),
        }
    }

    /// Run until the model or a signal asks to quit, returning the final
    /// model.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError`] when the terminal cannot be set up or
    /// written to. Terminal restoration is attempted before returning.
    pub async fn run(self) -> Result<M, ProgramError> {
        let Self {
            model,
            out,
            options,
            styles,
            bus,
        } = self;

        let mut tui = Tui::new(options.raw_mode, options.input);
        tui.enter(bus.sender()).map_err(ProgramError::TerminalSetup)?;

        let (width, height) = match options.size {
            Some(size) => size,
            None => Tui::size().unwrap_or_else(|err| {
                warn!(error = %err, "could not query terminal size, assuming 80x24");
                FALLBACK_SIZE
            }),
        };

        let mut runtime = Runtime {
            renderer: Renderer::new(out, width, height),
            executor: Executor::new(bus.sender()),
            bus,
            styles,
            state: ProgramState::Initializing,
        };

        let outcome = runtime.drive(model, &options, (width, height)).await;
        runtime.drain();

        match outcome {
            Ok(model) => {
                runtime.render(&model)?;
                runtime.renderer.stop().map_err(ProgramError::TerminalIo)?;
                tui.exit().map_err(ProgramError::TerminalIo)?;
                runtime.transition(ProgramState::Terminated);
                Ok(model)
            }
            Err(err) => {
                warn!(error = %err, "program failed, restoring terminal");
                if let Err(restore) = runtime.renderer.stop() {
                    debug!(error = %restore, "failed to restore screen");
                }
                if let Err(restore) = tui.exit() {
                    debug!(error = %restore, "failed to restore terminal");
                }
                runtime.transition(ProgramState::Terminated);
                Err(err)
            }
        }
    }
}

struct Runtime<M: Model, W: Write> {
    renderer: Renderer<W>,
    executor: Executor<M::Message>,
    bus: MessageBus<M::Message>,
    styles: Styles,
    state: ProgramState,
}

impl<M: Model, W: Write> Runtime<M, W> {
    async fn drive(
        &mut self,
        mut model: M,
        options: &ProgramOptions,
        (width, height): (u16, u16),
    ) -> Result<M, ProgramError> {
        self.renderer
            .start(options.hide_cursor)
            .map_err(ProgramError::TerminalIo)?;
        if options.alt_screen {
            self.renderer
                .enter_alt_screen()
                .map_err(ProgramError::TerminalIo)?;
        }
        self.render(&model)?;

        let init = model.init();
        debug!(?init, "dispatching init command");
        if self.executor.dispatch(init).is_break() {
            return Ok(model);
        }
        if options.input {
            self.bus.sender().send(Message::Resize { width, height });
        }
        self.transition(ProgramState::Running);

        while let Some(msg) = self.bus.recv().await {
            trace!(kind = msg.kind(), "received message");
            match &msg {
                Message::Quit => {
                    info!("quit message received");
                    break;
                }
                Message::Screen(request) => self
                    .renderer
                    .apply(*request)
                    .map_err(ProgramError::TerminalIo)?,
                Message::Resize { width, height } => self.renderer.resize(*width, *height),
                _ => {}
            }

            let (next, command) = model.update(msg);
            model = next;
            if !command.is_none() {
                debug!(?command, "dispatching command");
            }
            let flow = self.executor.dispatch(command);
            self.render(&model)?;
            if flow.is_break() {
                break;
            }
        }
        Ok(model)
    }

    /// Stop periodic tasks and close the bus. Commands still in flight run
    /// to completion but their results are dropped.
    fn drain(&mut self) {
        self.transition(ProgramState::Draining);
        self.executor.shutdown();
        self.bus.close();
    }

    fn render(&mut self, model: &M) -> Result<(), ProgramError> {
        let view = model.view(&self.styles);
        self.renderer
            .render(&view)
            .map_err(ProgramError::TerminalIo)
    }

    fn transition(&mut self, state: ProgramState) {
        debug!(from = ?self.state, to = ?state, "program state");
        self.state = state;
    }
}
