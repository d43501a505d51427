//! Async command pattern for side effects.
//!
//! Commands represent work that runs outside the main loop. `init()` and
//! `update()` return them, the [`Executor`](crate::core::Executor) runs them,
//! and each one reports back with at most one message.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;

use super::message::{Message, ScreenRequest, TickId};

/// Blocking closure run on the blocking thread pool.
pub type BlockingTask<M> = Box<dyn FnOnce() -> Option<M> + Send + 'static>;

/// Deferred unit of work returned from `init()` and `update()`.
///
/// A command never sees the model. Anything it needs must be captured when
/// it is built, and the only thing it can do is produce a message.
#[derive(Default)]
pub enum Command<M> {
    /// No operation.
    #[default]
    None,
    /// Stop the program once this command is dispatched.
    Quit,
    /// Deliver a message through the bus.
    Message(Message<M>),
    /// Run every command concurrently; each delivers its own message.
    Batch(Vec<Command<M>>),
    /// Async work on the tokio runtime.
    Perform(BoxFuture<'static, Option<M>>),
    /// Blocking work on the blocking pool.
    Blocking(BlockingTask<M>),
    /// Register a periodic task delivering [`Message::Tick`] every `interval`.
    /// Registering an id again replaces the previous task.
    Every { id: TickId, interval: Duration },
    /// Stop the periodic task with this id.
    Cancel(TickId),
    /// Change terminal state.
    Screen(ScreenRequest),
}

impl<M> fmt::Debug for Command<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Message(msg) => write!(f, "Message({})", msg.kind()),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Perform(_) => write!(f, "Perform(...)"),
            Self::Blocking(_) => write!(f, "Blocking(...)"),
            Self::Every { id, interval } => f
                .debug_struct("Every")
                .field("id", id)
                .field("interval", interval)
                .finish(),
            Self::Cancel(id) => f.debug_tuple("Cancel").field(id).finish(),
            Self::Screen(request) => f.debug_tuple("Screen").field(request).finish(),
        }
    }
}

impl<M: Send + 'static> Command<M> {
    pub const fn none() -> Self {
        Self::None
    }

    pub const fn quit() -> Self {
        Self::Quit
    }

    /// Deliver an application message on the next loop iteration.
    pub const fn message(msg: M) -> Self {
        Self::Message(Message::App(msg))
    }

    /// Combine commands to run concurrently.
    ///
    /// No-ops are dropped; an empty batch is [`Command::None`] and a single
    /// command is returned as is.
    pub fn batch(cmds: impl IntoIterator<Item = Self>) -> Self {
        let mut cmds: Vec<Self> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.remove(0),
            _ => Self::Batch(cmds),
        }
    }

    /// Run a future and deliver its output.
    pub fn perform<F>(future: F) -> Self
    where
        F: Future<Output = M> + Send + 'static,
    {
        Self::Perform(future.map(Some).boxed())
    }

    /// Run a fallible future and turn its outcome into a message.
    ///
    /// Failures are delivered like any other message; the runtime never
    /// inspects them.
    pub fn attempt<F, T, E>(future: F, to_message: impl FnOnce(Result<T, E>) -> M + Send + 'static) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::Perform(future.map(|result| Some(to_message(result))).boxed())
    }

    /// Race `future` against `timeout`, delivering `on_timeout()` if the
    /// deadline passes first.
    pub fn perform_with_timeout<F>(
        timeout: Duration,
        future: F,
        on_timeout: impl FnOnce() -> M + Send + 'static,
    ) -> Self
    where
        F: Future<Output = M> + Send + 'static,
    {
        Self::Perform(
            async move {
                match tokio::time::timeout(timeout, future).await {
                    Ok(msg) => Some(msg),
                    Err(_) => Some(on_timeout()),
                }
            }
            .boxed(),
        )
    }

    /// Run a blocking closure off the async workers.
    pub fn blocking(f: impl FnOnce() -> M + Send + 'static) -> Self {
        Self::Blocking(Box::new(move || Some(f())))
    }

    /// Deliver `f()` once after `delay`.
    pub fn after(delay: Duration, f: impl FnOnce() -> M + Send + 'static) -> Self {
        Self::Perform(
            async move {
                tokio::time::sleep(delay).await;
                Some(f())
            }
            .boxed(),
        )
    }

    pub fn every(id: impl Into<TickId>, interval: Duration) -> Self {
        Self::Every {
            id: id.into(),
            interval,
        }
    }

    pub fn cancel(id: impl Into<TickId>) -> Self {
        Self::Cancel(id.into())
    }

    pub const fn enter_alt_screen() -> Self {
        Self::Screen(ScreenRequest::EnterAltScreen)
    }

    pub const fn exit_alt_screen() -> Self {
        Self::Screen(ScreenRequest::ExitAltScreen)
    }

    pub const fn hide_cursor() -> Self {
        Self::Screen(ScreenRequest::HideCursor)
    }

    pub const fn show_cursor() -> Self {
        Self::Screen(ScreenRequest::ShowCursor)
    }

    pub const fn clear_screen() -> Self {
        Self::Screen(ScreenRequest::ClearScreen)
    }

    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Whether dispatching this command stops the program.
    pub fn requests_quit(&self) -> bool {
        match self {
            Self::Quit => true,
            Self::Batch(cmds) => cmds.iter().any(Self::requests_quit),
            _ => false,
        }
    }

    /// Convert the messages this command produces.
    ///
    /// Used to embed a child model's commands into a parent's.
    pub fn map<N, F>(self, f: F) -> Command<N>
    where
        N: Send + 'static,
        F: Fn(M) -> N + Send + Sync + 'static,
    {
        self.map_shared(Arc::new(f))
    }

    fn map_shared<N>(self, f: Arc<dyn Fn(M) -> N + Send + Sync>) -> Command<N>
    where
        N: Send + 'static,
    {
        match self {
            Self::None => Command::None,
            Self::Quit => Command::Quit,
            Self::Message(msg) => Command::Message(msg.map(|m| f(m))),
            Self::Batch(cmds) => Command::Batch(
                cmds.into_iter()
                    .map(|cmd| cmd.map_shared(Arc::clone(&f)))
                    .collect(),
            ),
            Self::Perform(task) => Command::Perform(task.map(move |msg| msg.map(|m| f(m))).boxed()),
            Self::Blocking(task) => Command::Blocking(Box::new(move || task().map(|m| f(m)))),
            Self::Every { id, interval } => Command::Every { id, interval },
            Self::Cancel(id) => Command::Cancel(id),
            Self::Screen(request) => Command::Screen(request),
        }
    }
}

impl<M: Send + 'static> From<Vec<Command<M>>> for Command<M> {
    fn from(cmds: Vec<Command<M>>) -> Self {
        Self::batch(cmds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_flattens_trivial_cases() {
        assert!(Command::<()>::batch(vec![]).is_none());
        assert!(Command::<()>::batch(vec![Command::none(), Command::none()]).is_none());
        assert!(matches!(
            Command::<()>::batch(vec![Command::none(), Command::quit()]),
            Command::Quit
        ));
        assert!(matches!(
            Command::<()>::batch(vec![Command::quit(), Command::clear_screen()]),
            Command::Batch(cmds) if cmds.len() == 2
        ));
    }

    #[test]
    fn test_requests_quit_looks_into_batches() {
        assert!(Command::<()>::quit().requests_quit());
        assert!(Command::<()>::batch(vec![Command::every("t", Duration::from_secs(1)), Command::quit()]).requests_quit());
        assert!(!Command::<()>::enter_alt_screen().requests_quit());
    }

    #[test]
    fn test_debug_hides_closures() {
        let cmd = Command::<u8>::batch(vec![Command::perform(async { 1 }), Command::cancel("spinner")]);
        assert_eq!(
            format!("{cmd:?}"),
            "Batch([Perform(...), Cancel(TickId(\"spinner\"))])"
        );
    }

    #[tokio::test]
    async fn test_map_converts_future_output() {
        let cmd = Command::perform(async { 20u8 }).map(|n| u32::from(n) * 2);
        let Command::Perform(task) = cmd else {
            panic!("expected a perform command");
        };
        assert_eq!(task.await, Some(40));
    }

    #[tokio::test]
    async fn test_timeout_delivers_fallback() {
        let cmd = Command::perform_with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "finished"
            },
            || "timed out",
        );
        let Command::Perform(task) = cmd else {
            panic!("expected a perform command");
        };
        assert_eq!(task.await, Some("timed out"));
    }

    #[tokio::test]
    async fn test_attempt_keeps_errors_as_data() {
        let cmd = Command::attempt(async { Err::<u16, _>("connection refused") }, |result| {
            result.map_err(str::to_string)
        });
        let Command::Perform(task) = cmd else {
            panic!("expected a perform command");
        };
        assert_eq!(task.await, Some(Err("connection refused".to_string())));
    }
}
