use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::config::{EventFailurePolicy, ListenerConfig};
use super::cursor::CursorStore;
use super::decode::{Decoded, decode};
use super::handler::{EventHandler, dispatch};
use super::models::CloudEvent;
use super::traits::EventFeed;
use crate::connectors::ConnectorRegistration;
use crate::{Error, Result, duration_millis};

/// Result of a single poll iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The feed had nothing after the cursor.
    Idle,
    /// This many events were handled and checkpointed.
    Processed(usize),
    /// `stop()` interrupted the fetch.
    Stopped,
}

/// Polls the event feed, dispatches each event to the handler and checkpoints
/// the cursor after every event.
///
/// Delivery is at-least-once: an event whose checkpoint did not persist is
/// delivered again on the next iteration (or after a restart).
///
/// `stop()` is terminal; a stopped listener cannot be started again.
pub struct EventListener {
    listener_id: String,
    feed: Arc<dyn EventFeed>,
    handler: Arc<dyn EventHandler>,
    cursor_store: Arc<dyn CursorStore>,
    registration: Option<ConnectorRegistration>,
    config: ListenerConfig,
    poll_interval_ms: AtomicU64,
    cancel: CancellationToken,
}

impl EventListener {
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn new(
        listener_id: impl Into<String>,
        feed: Arc<dyn EventFeed>,
        handler: Arc<dyn EventHandler>,
        cursor_store: Arc<dyn CursorStore>,
    ) -> Self {
        let config = ListenerConfig::default();
        Self {
            listener_id: listener_id.into(),
            feed,
            handler,
            cursor_store,
            registration: None,
            poll_interval_ms: AtomicU64::new(duration_millis(config.poll_interval)),
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Register the connector (creating it remotely if needed) and build a
    /// listener keyed by the connector id. Registration failures abort
    /// startup.
    ///
    /// A listener built this way publishes STOPPED when `start()` returns.
    #[tracing::instrument(level = "info", skip_all, fields(connector_id = %registration.connector_id()))]
    pub async fn connect(
        registration: ConnectorRegistration,
        feed: Arc<dyn EventFeed>,
        handler: Arc<dyn EventHandler>,
        cursor_store: Arc<dyn CursorStore>,
    ) -> Result<Self> {
        registration.register().await?;
        let mut listener = Self::new(registration.connector_id(), feed, handler, cursor_store);
        listener.registration = Some(registration);
        Ok(listener)
    }

    pub fn with_config(mut self, config: ListenerConfig) -> Result<Self> {
        config.validate()?;
        self.poll_interval_ms
            .store(duration_millis(config.poll_interval), Ordering::Relaxed);
        self.config = config;
        Ok(self)
    }

    pub fn listener_id(&self) -> &str {
        &self.listener_id
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.load(Ordering::Relaxed))
    }

    /// Change the idle wait. Takes effect from the next idle wait on; zero is
    /// clamped to one millisecond.
    pub fn set_poll_interval(&self, interval: Duration) {
        self.poll_interval_ms
            .store(duration_millis(interval).max(1), Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Ask `start()` to return. Safe to call from any task, any number of
    /// times.
    #[tracing::instrument(level = "info", skip(self), fields(listener_id = %self.listener_id))]
    pub fn stop(&self) {
        if self.cancel.is_cancelled() {
            tracing::info!("listener already stopped");
            return;
        }
        self.cancel.cancel();
        tracing::info!("stopping listener");
    }

    /// Run the poll loop until `stop()` is called.
    ///
    /// Failures never end the loop: they are logged once per backoff period
    /// and the iteration is retried from the last persisted cursor.
    #[tracing::instrument(level = "info", skip(self), fields(listener_id = %self.listener_id))]
    pub async fn start(&self) {
        tracing::info!("listener started");
        let mut consecutive_failures = 0u32;

        while !self.cancel.is_cancelled() {
            let wait = match self.poll_once().await {
                Ok(PollOutcome::Stopped) => break,
                Ok(PollOutcome::Processed(_)) => {
                    consecutive_failures = 0;
                    continue;
                }
                Ok(PollOutcome::Idle) => {
                    consecutive_failures = 0;
                    self.poll_interval()
                }
                Err(e) => {
                    consecutive_failures = consecutive_failures.saturating_add(1);
                    let backoff = self.config.backoff(consecutive_failures);
                    tracing::error!(
                        error = %e,
                        consecutive_failures,
                        backoff_ms = duration_millis(backoff),
                        "poll iteration failed, retrying from last checkpoint"
                    );
                    backoff
                }
            };

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }
        }

        if let Some(registration) = &self.registration {
            if let Err(e) = registration.stop().await {
                tracing::warn!(error = %e, "failed to publish STOPPED health");
            }
        }
        tracing::info!("listener stopped");
    }

    /// One iteration: read the cursor, fetch, then handle and checkpoint each
    /// event in feed order.
    ///
    /// Under [`EventFailurePolicy::Retry`] the first failing event aborts the
    /// iteration with the cursor left on the previous event.
    #[tracing::instrument(level = "debug", skip(self), fields(listener_id = %self.listener_id))]
    pub async fn poll_once(&self) -> Result<PollOutcome> {
        let cursor = self.cursor_store.get(&self.listener_id).await?;

        let events = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Ok(PollOutcome::Stopped),
            res = self.feed.poll_events(cursor.as_deref()) => res?,
        };
        if events.is_empty() {
            tracing::debug!(last_event_id = ?cursor, "no new events");
            return Ok(PollOutcome::Idle);
        }

        let mut processed = 0usize;
        for event in &events {
            if self.cancel.is_cancelled() {
                break;
            }
            match self.process(event).await {
                Ok(()) => {}
                Err(e) if self.skippable(&e) => {
                    tracing::warn!(
                        event_id = %event.id,
                        event_type = %event.event_type,
                        error = %e,
                        "skipping event that could not be handled"
                    );
                }
                Err(e) => return Err(e),
            }
            self.cursor_store.save(&self.listener_id, &event.id).await?;
            processed += 1;
        }
        Ok(PollOutcome::Processed(processed))
    }

    async fn process(&self, event: &CloudEvent) -> Result<()> {
        let decoded = decode(event)?;
        match &decoded {
            Decoded::Known(e) => {
                tracing::debug!(event_id = %event.id, kind = %e.kind(), "processing event");
            }
            Decoded::Deprecated => {
                tracing::debug!(event_id = %event.id, event_type = %event.event_type, "ignoring deprecated event type");
            }
            Decoded::Unknown => {
                tracing::warn!(event_id = %event.id, event_type = %event.event_type, "unknown event type, skipping");
            }
        }
        dispatch(self.handler.as_ref(), event, &decoded).await
    }

    fn skippable(&self, err: &Error) -> bool {
        self.config.failure_policy == EventFailurePolicy::Skip
            && matches!(err, Error::Decode { .. } | Error::Handler { .. })
    }
}
