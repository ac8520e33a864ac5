//! Catalog search port definition.

use async_trait::async_trait;

use crate::domain::entities::{ItemPage, PageToken};
use crate::domain::errors::FetchError;

/// Port for retrieving pages of search results.
///
/// Retries, headers and endpoint shape belong to the implementation.
#[async_trait]
pub trait ItemServicePort: Send + Sync {
    /// Fetches the page starting at `page` for `query`.
    async fn fetch_page(&self, page: &PageToken, query: &str) -> Result<ItemPage, FetchError>;
}

/// Test double for the item service.
#[cfg(test)]
pub mod mock {
    use std::collections::VecDeque;

    use parking_lot::Mutex;
    use tokio::sync::{Notify, oneshot};

    use super::*;

    type Reply = Result<ItemPage, FetchError>;

    /// A request parked inside [`MockItemService`] until the test answers it.
    pub struct PendingFetch {
        /// Requested page token.
        pub page: PageToken,
        /// Requested query.
        pub query: String,
        reply: oneshot::Sender<Reply>,
    }

    impl PendingFetch {
        /// Resolves the parked request.
        pub fn respond(self, reply: Reply) {
            let _ = self.reply.send(reply);
        }
    }

    /// Mock item service whose replies are released by the test, so the
    /// order of completions can be controlled.
    #[derive(Default)]
    pub struct MockItemService {
        pending: Mutex<VecDeque<PendingFetch>>,
        calls: Mutex<Vec<PageToken>>,
        arrived: Notify,
    }

    impl MockItemService {
        /// Creates mock with no parked requests.
        pub fn new() -> Self {
            Self::default()
        }

        /// Waits for the next request to arrive and takes it.
        pub async fn next_request(&self) -> PendingFetch {
            loop {
                let arrived = self.arrived.notified();
                if let Some(pending) = self.pending.lock().pop_front() {
                    return pending;
                }
                arrived.await;
            }
        }

        /// Page tokens requested so far, in call order.
        pub fn calls(&self) -> Vec<PageToken> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl ItemServicePort for MockItemService {
        async fn fetch_page(&self, page: &PageToken, query: &str) -> Result<ItemPage, FetchError> {
            let (tx, rx) = oneshot::channel();
            self.calls.lock().push(page.clone());
            self.pending.lock().push_back(PendingFetch {
                page: page.clone(),
                query: query.to_string(),
                reply: tx,
            });
            self.arrived.notify_one();

            rx.await
                .unwrap_or_else(|_| Err(FetchError::network("mock request dropped")))
        }
    }
}
