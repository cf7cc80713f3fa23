use crate::conversation::{Conversation, InputError, PendingRequest, Snapshot, Variant};
use crate::llm::{adapter, ChatBackend};
use futures::future::{AbortHandle, Abortable};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

struct Exchange {
    abort: AbortHandle,
    task: JoinHandle<()>,
}

struct Shared {
    conversation: Mutex<Conversation>,
    backend: Arc<dyn ChatBackend>,
    updates: watch::Sender<Snapshot>,
}

impl Shared {
    fn conversation(&self) -> MutexGuard<'_, Conversation> {
        self.conversation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, conversation: &Conversation) {
        self.updates.send_replace(conversation.snapshot());
    }
}

/// Drives a [`Conversation`] against a backend on the tokio runtime.
///
/// `submit` and `retry` return as soon as the transcript has been updated;
/// the exchange runs in a spawned task and every state change is published
/// on the channel returned by [`subscribe`](Self::subscribe). Must be used
/// from within a tokio runtime.
pub struct ChatSession {
    shared: Arc<Shared>,
    exchange: Mutex<Option<Exchange>>,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn ChatBackend>, variant: Variant) -> Self {
        let conversation = Conversation::new(variant);
        let (updates, _) = watch::channel(conversation.snapshot());
        Self {
            shared: Arc::new(Shared {
                conversation: Mutex::new(conversation),
                backend,
                updates,
            }),
            exchange: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.updates.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.shared.conversation().snapshot()
    }

    pub fn variant(&self) -> Variant {
        self.shared.conversation().variant()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.conversation().is_loading()
    }

    // Lock order is conversation, then exchange slot. The slot is filled
    // before the conversation lock is released, so it always holds the task
    // for the ticket currently in flight.

    pub fn submit(&self, text: &str) -> Result<(), InputError> {
        let mut conversation = self.shared.conversation();
        let pending = conversation.submit(text)?;
        self.shared.publish(&conversation);
        self.spawn(pending);
        Ok(())
    }

    pub fn retry(&self) -> Result<(), InputError> {
        let mut conversation = self.shared.conversation();
        let pending = conversation.retry()?;
        self.shared.publish(&conversation);
        self.spawn(pending);
        Ok(())
    }

    /// Abort the outstanding exchange. No answer is appended for it.
    pub fn stop(&self) -> bool {
        let mut conversation = self.shared.conversation();
        if let Some(exchange) = self.take_exchange() {
            exchange.abort.abort();
        }
        let stopped = conversation.stop();
        if stopped {
            self.shared.publish(&conversation);
        }
        stopped
    }

    pub fn reset(&self) {
        let mut conversation = self.shared.conversation();
        if let Some(exchange) = self.take_exchange() {
            exchange.abort.abort();
        }
        conversation.reset();
        self.shared.publish(&conversation);
    }

    /// Wait for the outstanding exchange, if any, to finish.
    pub async fn settle(&self) {
        if let Some(exchange) = self.take_exchange() {
            if let Err(e) = exchange.task.await {
                tracing::error!(error = %e, "chat exchange task failed");
            }
        }
    }

    fn take_exchange(&self) -> Option<Exchange> {
        self.exchange
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Called with the conversation lock held. The spawned task only takes
    /// that lock after the backend has answered.
    fn spawn(&self, pending: PendingRequest) {
        let shared = Arc::clone(&self.shared);
        let (abort, registration) = AbortHandle::new_pair();
        let PendingRequest { ticket, query } = pending;

        let exchange = Abortable::new(
            async move {
                let outcome = shared
                    .backend
                    .ask(&query)
                    .await
                    .and_then(|body| adapter::adapt(&body));
                let mut conversation = shared.conversation();
                if conversation.complete(ticket, outcome) {
                    shared.publish(&conversation);
                }
            },
            registration,
        );

        let task = tokio::spawn(async move {
            if exchange.await.is_err() {
                tracing::debug!("chat exchange aborted");
            }
        });

        *self.exchange.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(Exchange { abort, task });
    }
}
