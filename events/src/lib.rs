//! Event dispatch for verified Tebex webhooks.
//!
//! This crate decouples receiving a webhook from acting on it. The HTTP layer
//! validates and parses a payload while the request is open, then pushes the
//! resulting [`webhook::Event`] onto an [`EventQueue`]. A dispatcher task hands each
//! queued event to the registered handlers, so slow handlers never hold up the
//! response to Tebex.
//!
//! # Architecture
//!
//! - **EventHandler**: Trait for implementing event handlers
//! - **EventPublisher**: Publishes events to registered handlers
//! - **EventQueue**: Bounded queue between the HTTP layer and the dispatcher
//! - **LogEventHandler**: Handler that logs a one-line summary of every event

use async_trait::async_trait;
use log::*;
use std::sync::Arc;
use webhook::{Event, EventSubject};

mod queue;

pub use queue::{spawn_dispatcher, EventQueue, QueueError};

/// Trait for handling parsed webhook events.
/// Implementations perform the integration's side effects, e.g. granting a purchased
/// package or revoking it after a refund.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &Event);
}

/// Publishes events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Publish an event to all registered handlers.
    pub async fn publish(&self, event: Event) {
        trace!(
            "Publishing event {} to {} handler(s)",
            event.id,
            self.handlers.len()
        );
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// Logs every event it receives.
pub struct LogEventHandler;

#[async_trait]
impl EventHandler for LogEventHandler {
    async fn handle(&self, event: &Event) {
        info!(
            "Tebex event {} [{}] at {}: {}",
            event.id,
            event.event_type(),
            event.date.to_rfc3339(),
            summarize(&event.subject)
        );
    }
}

fn summarize(subject: &EventSubject) -> String {
    if let Some(payment) = subject.payment() {
        let mut summary = format!(
            "transaction {} ({} {:.2})",
            payment.transaction_id, payment.price_paid.currency, payment.price_paid.amount
        );
        if let Some(reason) = &payment.decline_reason {
            summary.push_str(&format!(", declined: {}", reason.message));
        }
        summary
    } else if let Some(recurring) = subject.recurring_payment() {
        format!(
            "recurring payment {} status {:?}",
            recurring.reference, recurring.status.id
        )
    } else {
        "webhook validation".to_string()
    }
}
