//! Message bus between producers and the program loop.
//!
//! Any number of producers (commands, the input listener, periodic tasks)
//! hold a [`BusSender`]; the loop owns the single [`MessageBus`] receiver.
//! The queue is unbounded and FIFO per producer. Once the bus is closed,
//! sends become silent no-ops.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::trace;

use super::message::Message;

/// Receiving side of the bus, owned by the program loop.
pub struct MessageBus<M> {
    tx: UnboundedSender<Message<M>>,
    rx: UnboundedReceiver<Message<M>>,
}

impl<M> MessageBus<M> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> BusSender<M> {
        BusSender {
            tx: self.tx.clone(),
        }
    }

    /// Wait for the next message.
    pub async fn recv(&mut self) -> Option<Message<M>> {
        self.rx.recv().await
    }

    /// Take the next message if one is already queued.
    pub fn try_recv(&mut self) -> Option<Message<M>> {
        self.rx.try_recv().ok()
    }

    /// Stop accepting messages and discard anything still queued.
    pub fn close(&mut self) {
        self.rx.close();
        let mut dropped = 0usize;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            trace!(dropped, "discarded queued messages on close");
        }
    }
}

impl<M> Default for MessageBus<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer handle. Cheap to clone.
#[derive(Debug)]
pub struct BusSender<M> {
    tx: UnboundedSender<Message<M>>,
}

impl<M> Clone for BusSender<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<M> BusSender<M> {
    /// Queue a message. Returns `false` if the bus is closed and the message
    /// was dropped.
    pub fn send(&self, msg: Message<M>) -> bool {
        let kind = msg.kind();
        if self.tx.send(msg).is_err() {
            trace!(kind, "bus closed, dropping message");
            return false;
        }
        true
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fifo_per_producer() {
        let mut bus = MessageBus::<u32>::new();
        let sender = bus.sender();
        for n in 0..5 {
            assert!(sender.send(Message::App(n)));
        }
        for n in 0..5 {
            assert_eq!(bus.recv().await, Some(Message::App(n)));
        }
    }

    #[tokio::test]
    async fn test_many_producers_all_delivered() {
        let mut bus = MessageBus::<u32>::new();
        let mut handles = Vec::new();
        for producer in 0..4u32 {
            let sender = bus.sender();
            handles.push(tokio::spawn(async move {
                for n in 0..25 {
                    sender.send(Message::App(producer * 100 + n));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut received = Vec::new();
        while let Some(Message::App(n)) = bus.try_recv() {
            received.push(n);
        }
        assert_eq!(received.len(), 100);
        for producer in 0..4u32 {
            let own: Vec<u32> = received
                .iter()
                .copied()
                .filter(|n| n / 100 == producer)
                .collect();
            let mut sorted = own.clone();
            sorted.sort_unstable();
            assert_eq!(own, sorted);
        }
    }

    #[test]
    fn test_closed_bus_drops_messages() {
        let mut bus = MessageBus::<u32>::new();
        let sender = bus.sender();
        sender.send(Message::App(1));
        bus.close();
        assert!(sender.is_closed());
        assert!(!sender.send(Message::App(2)));
        assert_eq!(bus.try_recv(), None);
    }
}
