//! Bounded queue of parsed webhook events and the task that drains it.

use std::fmt;

use log::*;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use webhook::Event;

use crate::EventPublisher;

/// Sending half of the event queue. Cheap to clone into request handlers.
#[derive(Clone, Debug)]
pub struct EventQueue {
    sender: mpsc::Sender<Event>,
}

/// Why an event could not be queued.
#[derive(Debug, PartialEq, Eq)]
pub enum QueueError {
    /// The queue is at capacity; the sender should deliver the webhook again later.
    Full,
    /// The dispatcher has stopped.
    Closed,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Full => write!(f, "event queue is full"),
            QueueError::Closed => write!(f, "event queue is closed"),
        }
    }
}

impl std::error::Error for QueueError {}

impl EventQueue {
    /// Create a queue holding at most `capacity` events.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Queue an event parsed from a validated payload.
    /// Never waits: a full queue is reported immediately.
    pub fn enqueue(&self, event: Event) -> Result<(), QueueError> {
        self.sender.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => QueueError::Full,
            mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
        })
    }
}

/// Spawn the task that publishes queued events to the registered handlers.
///
/// The task ends once every [`EventQueue`] handle has been dropped.
pub fn spawn_dispatcher(
    mut receiver: mpsc::Receiver<Event>,
    publisher: EventPublisher,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            debug!("Dispatching event {} [{}]", event.id, event.event_type());
            publisher.publish(event).await;
        }
        debug!("Event queue closed, dispatcher stopping");
    })
}
