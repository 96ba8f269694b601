use async_trait::async_trait;

use super::models::CloudEvent;
use crate::Result;

/// The remote event feed.
#[async_trait]
pub trait EventFeed: Send + Sync {
    /// Return the events that follow `last_event_id`, in feed order.
    ///
    /// `None` reads from the beginning of the feed. An empty vector means the
    /// consumer is caught up. Network and remote failures are reported as
    /// [`crate::Error::Transport`].
    async fn poll_events(&self, last_event_id: Option<&str>) -> Result<Vec<CloudEvent>>;
}
