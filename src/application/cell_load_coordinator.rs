//! Per-row binding between a grid cell and its cover load.
//!
//! A row slot is reused for different items over its lifetime. Every bind or
//! reset advances the row's load token; a load may only write to the row's
//! display while its token is still current. The token is advanced and
//! checked under the display channel's lock, so a reset can never interleave
//! between a completion's check and its write.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::domain::entities::{Cover, CoverImage, Item, ItemId, TargetSize};
use crate::domain::errors::ImageResult;
use crate::infrastructure::image::ImageCache;

/// Observable contents of one row.
#[derive(Debug, Clone)]
pub struct CellDisplay {
    /// Title line.
    pub title: String,
    /// Authors line, e.g. `by A, B`.
    pub authors: String,
    /// Narrators line, e.g. `with N`.
    pub narrators: String,
    /// Cover, once loaded.
    pub image: Option<CoverImage>,
    /// Whether the loading indicator should be shown.
    pub loading: bool,
}

impl CellDisplay {
    /// Empty row waiting for content.
    #[must_use]
    pub const fn placeholder() -> Self {
        Self {
            title: String::new(),
            authors: String::new(),
            narrators: String::new(),
            image: None,
            loading: true,
        }
    }
}

impl Default for CellDisplay {
    fn default() -> Self {
        Self::placeholder()
    }
}

/// Drives one row's text and cover image.
pub struct CellLoadCoordinator {
    cache: Arc<ImageCache>,
    display: Arc<watch::Sender<CellDisplay>>,
    token: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
    item: Option<ItemId>,
}

impl std::fmt::Debug for CellLoadCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellLoadCoordinator")
            .field("item", &self.item)
            .field("token", &self.token.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl CellLoadCoordinator {
    /// Creates an unbound row that loads covers through `cache`.
    #[must_use]
    pub fn new(cache: Arc<ImageCache>) -> Self {
        let (display, _) = watch::channel(CellDisplay::placeholder());
        Self {
            cache,
            display: Arc::new(display),
            token: Arc::new(AtomicU64::new(0)),
            task: None,
            item: None,
        }
    }

    /// Receiver that observes every display update of this row.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CellDisplay> {
        self.display.subscribe()
    }

    /// Snapshot of the current display state.
    #[must_use]
    pub fn display(&self) -> CellDisplay {
        self.display.borrow().clone()
    }

    /// Item currently bound to the row.
    #[must_use]
    pub const fn item(&self) -> Option<&ItemId> {
        self.item.as_ref()
    }

    /// Binds the row to `item`, cancelling the previous load and starting
    /// the cover load for a slot of `target` size.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(&mut self, item: &Item, target: TargetSize) {
        self.abort_task();

        let token = self.advance(|display| {
            display.title = item.title().to_string();
            display.authors = item.authors_line();
            display.narrators = item.narrators_line();
            display.image = None;
            display.loading = true;
        });
        self.item = Some(item.id().clone());

        let url = item.cover().map(|cover| cover.url().to_string());
        let scale = target.scale_for(item.cover().and_then(Cover::height));
        trace!(item = %item.id(), token, scale, "Binding row");

        let cache = self.cache.clone();
        let display = self.display.clone();
        let current = self.token.clone();
        let id = item.id().clone();

        self.task = Some(tokio::spawn(async move {
            let result = cache.load(url.as_deref(), scale).await;
            if !apply_if_current(&display, &current, token, result) {
                debug!(item = %id, token, "Discarded cancelled cover load");
            }
        }));
    }

    /// Cancels the current load and returns the row to its placeholder.
    pub fn reset(&mut self) {
        self.abort_task();
        self.advance(|display| *display = CellDisplay::placeholder());
        self.item = None;
    }

    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Invalidates the outstanding token and edits the display atomically.
    fn advance(&self, edit: impl FnOnce(&mut CellDisplay)) -> u64 {
        let mut next = 0;
        self.display.send_modify(|display| {
            next = self.token.fetch_add(1, Ordering::SeqCst) + 1;
            edit(display);
        });
        next
    }
}

impl Drop for CellLoadCoordinator {
    fn drop(&mut self) {
        self.abort_task();
    }
}

/// Writes a finished load to the row if `token` is still current.
/// Returns false if the result was discarded.
fn apply_if_current(
    display: &watch::Sender<CellDisplay>,
    current: &AtomicU64,
    token: u64,
    result: ImageResult<Option<CoverImage>>,
) -> bool {
    display.send_if_modified(|state| {
        if current.load(Ordering::SeqCst) != token {
            return false;
        }
        match result {
            Ok(Some(image)) => state.image = Some(image),
            Ok(None) => trace!(token, "Row has no cover"),
            Err(e) => warn!(token, error = %e, "Cover unavailable"),
        }
        state.loading = false;
        true
    })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use bytes::Bytes;
    use parking_lot::Mutex;
    use reqwest::Url;
    use tokio::sync::{Notify, oneshot};

    use super::*;
    use crate::domain::entities::{Format, Person};
    use crate::domain::errors::ImageError;
    use crate::domain::ports::ImageTransportPort;
    use crate::domain::ports::mocks::FakeDecoder;
    use crate::infrastructure::image::DEFAULT_COST_LIMIT;

    type Reply = ImageResult<Bytes>;

    /// Transport whose downloads finish only when the test releases them.
    #[derive(Default)]
    struct GatedTransport {
        pending: Mutex<VecDeque<(Url, oneshot::Sender<Reply>)>>,
        arrived: Notify,
    }

    impl GatedTransport {
        async fn next_request(&self) -> (Url, oneshot::Sender<Reply>) {
            loop {
                let arrived = self.arrived.notified();
                if let Some(request) = self.pending.lock().pop_front() {
                    return request;
                }
                arrived.await;
            }
        }
    }

    #[async_trait::async_trait]
    impl ImageTransportPort for GatedTransport {
        async fn fetch_bytes(&self, url: &Url) -> ImageResult<Bytes> {
            let (tx, rx) = oneshot::channel();
            self.pending.lock().push_back((url.clone(), tx));
            self.arrived.notify_one();
            rx.await
                .unwrap_or_else(|_| Err(ImageError::Network("aborted".into())))
        }
    }

    fn setup() -> (CellLoadCoordinator, Arc<GatedTransport>) {
        let transport = Arc::new(GatedTransport::default());
        let cache = Arc::new(ImageCache::new(
            DEFAULT_COST_LIMIT,
            transport.clone(),
            Arc::new(FakeDecoder),
        ));
        (CellLoadCoordinator::new(cache), transport)
    }

    fn book(id: u64, title: &str, cover: Option<Cover>) -> Item {
        Item::new(
            id,
            title,
            vec![Person::new("a1", "J.K. Rowling")],
            vec![Person::new("n1", "Stephen Fry")],
            cover.into_iter().map(Format::new).collect(),
        )
    }

    fn book_with_cover(id: u64, title: &str) -> Item {
        let url = format!("https://covers.example.com/{id}.jpg");
        book(id, title, Some(Cover::new(url).with_dimensions(200, 400)))
    }

    const SLOT: TargetSize = TargetSize::new(100.0, 200.0);

    #[tokio::test]
    async fn test_bind_sets_text_then_image() {
        let (mut cell, transport) = setup();
        let mut rx = cell.subscribe();

        cell.bind(&book_with_cover(1, "Philosopher's Stone"), SLOT);

        let display = cell.display();
        assert_eq!(display.title, "Philosopher's Stone");
        assert_eq!(display.authors, "by J.K. Rowling");
        assert_eq!(display.narrators, "with Stephen Fry");
        assert!(display.loading);
        assert!(display.image.is_none());

        let (url, reply) = transport.next_request().await;
        assert_eq!(url.as_str(), "https://covers.example.com/1.jpg");
        let _ = reply.send(Ok(FakeDecoder::encode(200, 400)));

        let display = rx.wait_for(|d| !d.loading).await.unwrap().clone();
        let image = display.image.unwrap();
        assert_eq!(image.width(), 200);
        assert!((image.scale() - 0.5).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_rebind_discards_previous_load() {
        let (mut cell, transport) = setup();
        let mut rx = cell.subscribe();

        cell.bind(&book_with_cover(1, "X"), SLOT);
        let (_, reply_x) = transport.next_request().await;

        cell.bind(&book_with_cover(2, "Y"), SLOT);
        let (url_y, reply_y) = transport.next_request().await;
        assert_eq!(url_y.as_str(), "https://covers.example.com/2.jpg");

        let _ = reply_x.send(Ok(FakeDecoder::encode(11, 11)));
        tokio::task::yield_now().await;
        assert!(cell.display().image.is_none());
        assert_eq!(cell.display().title, "Y");

        let _ = reply_y.send(Ok(FakeDecoder::encode(22, 22)));
        let display = rx.wait_for(|d| d.image.is_some()).await.unwrap().clone();
        assert_eq!(display.image.unwrap().width(), 22);
        assert_eq!(cell.item(), Some(&ItemId::from(2)));
    }

    #[tokio::test]
    async fn test_reset_clears_row_and_drops_completion() {
        let (mut cell, transport) = setup();

        cell.bind(&book_with_cover(1, "X"), SLOT);
        let (_, reply) = transport.next_request().await;

        cell.reset();
        let _ = reply.send(Ok(FakeDecoder::encode(5, 5)));
        tokio::task::yield_now().await;

        let display = cell.display();
        assert!(display.title.is_empty());
        assert!(display.authors.is_empty());
        assert!(display.image.is_none());
        assert!(display.loading);
        assert!(cell.item().is_none());
    }

    #[tokio::test]
    async fn test_failed_load_clears_indicator_without_image() {
        let (mut cell, transport) = setup();
        let mut rx = cell.subscribe();

        cell.bind(&book_with_cover(1, "X"), SLOT);
        let (_, reply) = transport.next_request().await;
        let _ = reply.send(Err(ImageError::Network("offline".into())));

        let display = rx.wait_for(|d| !d.loading).await.unwrap().clone();
        assert!(display.image.is_none());
        assert_eq!(display.title, "X");
    }

    #[tokio::test]
    async fn test_item_without_cover() {
        let (mut cell, _transport) = setup();
        let mut rx = cell.subscribe();

        cell.bind(&book(1, "No cover", None), SLOT);

        let display = rx.wait_for(|d| !d.loading).await.unwrap().clone();
        assert!(display.image.is_none());
    }

    #[tokio::test]
    async fn test_reset_on_one_row_leaves_other_row_loading() {
        let transport = Arc::new(GatedTransport::default());
        let cache = Arc::new(ImageCache::new(
            DEFAULT_COST_LIMIT,
            transport.clone(),
            Arc::new(FakeDecoder),
        ));
        let mut row_a = CellLoadCoordinator::new(cache.clone());
        let mut row_b = CellLoadCoordinator::new(cache.clone());
        let mut rx_b = row_b.subscribe();
        let shared = book_with_cover(1, "Shared cover");
        let url = "https://covers.example.com/1.jpg";

        row_a.bind(&shared, SLOT);
        let (_, reply_a) = transport.next_request().await;
        row_b.bind(&shared, SLOT);
        let (url_b, reply_b) = transport.next_request().await;
        assert_eq!(url_b.as_str(), url);

        row_a.reset();
        let _ = reply_a.send(Ok(FakeDecoder::encode(9, 9)));
        let _ = reply_b.send(Ok(FakeDecoder::encode(4, 4)));

        let display_b = rx_b.wait_for(|d| !d.loading).await.unwrap().clone();
        assert_eq!(display_b.image.map(|i| i.width()), Some(4));
        assert!(row_a.display().image.is_none());
        assert!(row_a.item().is_none());
        assert_eq!(cache.cached(url).await.map(|i| i.width()), Some(4));
    }

    #[test]
    fn test_stale_token_is_not_applied() {
        let (display, _rx) = watch::channel(CellDisplay::placeholder());
        let current = AtomicU64::new(2);
        let image = CoverImage::new(image::DynamicImage::new_rgb8(1, 1), 1.0);

        assert!(!apply_if_current(&display, &current, 1, Ok(Some(image.clone()))));
        assert!(display.borrow().image.is_none());
        assert!(display.borrow().loading);

        assert!(apply_if_current(&display, &current, 2, Ok(Some(image))));
        assert!(display.borrow().image.is_some());
    }
}
