//! Hook through which the journal store asks for index maintenance.

use std::future::Future;
use std::pin::Pin;

/// Index maintenance requests issued by the journal store.
///
/// Index requests return immediately and the pass runs on the
/// implementation's own tasks. Forgetting a campaign is awaited: the journal
/// store holds the campaign lock until embeddings and index state are gone.
pub trait IndexTrigger: Send + Sync {
    /// Request a debounced index pass. Bursts of requests coalesce.
    fn request_index(&self, campaign_id: &str);

    /// Request a pass without waiting out the debounce delay.
    fn warm_index(&self, campaign_id: &str);

    /// Cancel pending passes, then remove embeddings and index state.
    ///
    /// Boxed so the trigger stays usable as `Arc<dyn IndexTrigger>`.
    fn forget_campaign<'a>(
        &'a self,
        campaign_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}

/// Trigger used when story memory is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopIndexTrigger;

impl IndexTrigger for NoopIndexTrigger {
    fn request_index(&self, _campaign_id: &str) {}

    fn warm_index(&self, _campaign_id: &str) {}

    fn forget_campaign<'a>(
        &'a self,
        _campaign_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(std::future::ready(()))
    }
}
