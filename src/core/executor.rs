//! Runs commands outside the loop's synchronous path.

use std::collections::HashMap;
use std::ops::ControlFlow;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::task::JoinError;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::bus::BusSender;
use super::command::{BlockingTask, Command};
use super::message::{Message, Tick, TickId};

/// Schedules commands and owns the periodic task registry.
///
/// One-shot commands run fire-and-forget: nothing awaits them, and if the
/// bus is closed by the time they finish their message is dropped. Periodic
/// tasks are stopped on [`Executor::shutdown`].
pub struct Executor<M> {
    bus: BusSender<M>,
    periodic: HashMap<TickId, CancellationToken>,
    shutdown: CancellationToken,
}

impl<M: Send + 'static> Executor<M> {
    pub fn new(bus: BusSender<M>) -> Self {
        Self {
            bus,
            periodic: HashMap::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Schedule `command` without blocking.
    ///
    /// Returns [`ControlFlow::Break`] when the command asks the program to quit.
    /// Siblings of a quit inside a batch are still dispatched.
    pub fn dispatch(&mut self, command: Command<M>) -> ControlFlow<()> {
        if self.shutdown.is_cancelled() {
            debug!(?command, "executor shut down, ignoring command");
            return ControlFlow::Continue(());
        }

        match command {
            Command::None => {}
            Command::Quit => {
                debug!("quit requested");
                return ControlFlow::Break(());
            }
            Command::Message(msg) => {
                self.bus.send(msg);
            }
            Command::Screen(request) => {
                self.bus.send(Message::Screen(request));
            }
            Command::Batch(cmds) => {
                debug!(count = cmds.len(), "dispatching batch");
                let mut flow = ControlFlow::Continue(());
                for cmd in cmds {
                    if self.dispatch(cmd).is_break() {
                        flow = ControlFlow::Break(());
                    }
                }
                return flow;
            }
            Command::Perform(task) => self.spawn(task),
            Command::Blocking(task) => self.spawn_blocking(task),
            Command::Every { id, interval } => self.register(id, interval),
            Command::Cancel(id) => self.cancel(&id),
        }
        ControlFlow::Continue(())
    }

    /// Stop periodic tasks. In-flight one-shot commands are left to finish
    /// on their own.
    pub fn shutdown(&mut self) {
        self.shutdown.cancel();
        self.periodic.clear();
    }

    /// Number of live periodic registrations.
    pub fn periodic_count(&self) -> usize {
        self.periodic.len()
    }

    fn spawn(&self, task: BoxFuture<'static, Option<M>>) {
        let bus = self.bus.clone();
        let worker = tokio::spawn(task);
        tokio::spawn(async move { deliver(worker.await, &bus) });
    }

    fn spawn_blocking(&self, task: BlockingTask<M>) {
        let bus = self.bus.clone();
        let worker = tokio::task::spawn_blocking(task);
        tokio::spawn(async move { deliver(worker.await, &bus) });
    }

    fn register(&mut self, id: TickId, interval: Duration) {
        if interval.is_zero() {
            warn!(%id, "ignoring periodic task with a zero interval");
            return;
        }

        let token = self.shutdown.child_token();
        if let Some(previous) = self.periodic.insert(id.clone(), token.clone()) {
            debug!(%id, "replacing periodic task");
            previous.cancel();
        }

        let bus = self.bus.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut seq = 0u64;
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        seq += 1;
                        let tick = Tick { id: id.clone(), seq };
                        if !bus.send(Message::Tick(tick)) {
                            break;
                        }
                    }
                }
            }
        });
    }

    fn cancel(&mut self, id: &TickId) {
        if let Some(token) = self.periodic.remove(id) {
            debug!(%id, "cancelling periodic task");
            token.cancel();
        }
    }
}

impl<M> Drop for Executor<M> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn deliver<M>(result: Result<Option<M>, JoinError>, bus: &BusSender<M>) {
    match result {
        Ok(Some(msg)) => {
            bus.send(Message::App(msg));
        }
        Ok(None) => {}
        Err(err) if err.is_panic() => {
            warn!("command panicked, no message will be delivered");
        }
        Err(err) => debug!(error = %err, "command task cancelled"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::core::bus::MessageBus;

    async fn next_app(bus: &mut MessageBus<u32>) -> u32 {
        loop {
            match tokio::time::timeout(Duration::from_secs(2), bus.recv()).await {
                Ok(Some(Message::App(n))) => return n,
                Ok(Some(_)) => continue,
                other => panic!("no app message: {:?}", other.map(|m| m.map(|m| m.kind()))),
            }
        }
    }

    #[tokio::test]
    async fn test_batch_delivers_each_message_once() {
        let mut bus = MessageBus::new();
        let mut executor = Executor::new(bus.sender());

        let flow = executor.dispatch(Command::batch(vec![
            Command::after(Duration::from_millis(30), || 1),
            Command::perform(async { 2 }),
            Command::blocking(|| 3),
        ]));
        assert!(flow.is_continue());

        let mut seen = HashSet::new();
        for _ in 0..3 {
            assert!(seen.insert(next_app(&mut bus).await));
        }
        assert_eq!(seen, HashSet::from([1, 2, 3]));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(bus.try_recv(), None);
    }

    #[tokio::test]
    async fn test_quit_in_batch_breaks() {
        let bus = MessageBus::<u32>::new();
        let mut executor = Executor::new(bus.sender());
        let flow = executor.dispatch(Command::batch(vec![
            Command::message(1),
            Command::quit(),
        ]));
        assert!(flow.is_break());
    }

    #[tokio::test]
    async fn test_panicking_command_is_isolated() {
        let mut bus = MessageBus::new();
        let mut executor = Executor::new(bus.sender());

        let _ = executor.dispatch(Command::batch(vec![
            Command::perform(async {
                let missing: Option<u32> = None;
                missing.expect("boom")
            }),
            Command::after(Duration::from_millis(20), || 7),
        ]));

        assert_eq!(next_app(&mut bus).await, 7);
    }

    #[tokio::test]
    async fn test_panicking_blocking_command_is_isolated() {
        let mut bus = MessageBus::new();
        let mut executor = Executor::new(bus.sender());

        let flow = executor.dispatch(Command::batch(vec![
            Command::blocking(|| -> u32 { panic!("blocking task failed") }),
            Command::blocking(|| 8),
        ]));
        assert!(flow.is_continue());

        assert_eq!(next_app(&mut bus).await, 8);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(bus.try_recv(), None);
    }

    #[tokio::test]
    async fn test_screen_requests_travel_through_bus() {
        let mut bus = MessageBus::<u32>::new();
        let mut executor = Executor::new(bus.sender());
        let _ = executor.dispatch(Command::enter_alt_screen());
        assert_eq!(
            bus.try_recv(),
            Some(Message::Screen(crate::core::ScreenRequest::EnterAltScreen))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_ticks_until_cancelled() {
        let mut bus = MessageBus::<u32>::new();
        let mut executor = Executor::new(bus.sender());
        let _ = executor.dispatch(Command::every("spinner", Duration::from_millis(100)));
        assert_eq!(executor.periodic_count(), 1);

        for expected in 1..=3 {
            let msg = bus.recv().await;
            assert_eq!(
                msg,
                Some(Message::Tick(Tick {
                    id: TickId::from("spinner"),
                    seq: expected,
                }))
            );
        }

        let _ = executor.dispatch(Command::cancel("spinner"));
        assert_eq!(executor.periodic_count(), 0);
        // Let the ticker observe the cancellation, then drain anything it
        // raced in before stopping.
        tokio::time::sleep(Duration::from_millis(150)).await;
        while bus.try_recv().is_some() {}
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(bus.try_recv(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reregistering_restarts_sequence() {
        let mut bus = MessageBus::<u32>::new();
        let mut executor = Executor::new(bus.sender());
        let _ = executor.dispatch(Command::every("blink", Duration::from_millis(100)));
        let _ = bus.recv().await;
        let _ = executor.dispatch(Command::every("blink", Duration::from_millis(100)));
        assert_eq!(executor.periodic_count(), 1);

        tokio::time::sleep(Duration::from_millis(1)).await;
        while bus.try_recv().is_some() {}
        let msg = bus.recv().await;
        assert!(matches!(msg, Some(Message::Tick(Tick { seq: 1, .. }))));
    }

    #[tokio::test]
    async fn test_results_after_shutdown_are_dropped() {
        let mut bus = MessageBus::<u32>::new();
        let mut executor = Executor::new(bus.sender());
        let _ = executor.dispatch(Command::after(Duration::from_millis(20), || 9));
        executor.shutdown();
        bus.close();

        assert!(executor.dispatch(Command::message(1)).is_continue());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(bus.try_recv(), None);
    }
}
