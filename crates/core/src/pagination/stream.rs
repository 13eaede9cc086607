//! PageStream engine
//!
//! A producer task drives `load_page` and `to_item` and hands every mapped
//! item to the consumer through a bounded channel. Ordering is strict: edges
//! in page order, pages in request order, and no page is requested before the
//! previous one has been fully drained.
//!
//! Termination rules:
//! - Last page (`has_next_page` absent or false): the stream ends
//! - Loader or mapper failure: exactly one error item, then the stream ends
//! - Cancellation or consumer drop: the stream ends with no error item

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use raito_domain::{EdgeOutcome, ListItem, Page, RaitoError, Result};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info_span, warn, Instrument};

/// Items buffered between producer and consumer
pub const CHANNEL_CAPACITY: usize = 1;

/// Lazy sequence of list items produced by [`paginate`]
///
/// Dropping the stream cancels its producer.
pub struct ListStream<T> {
    receiver: mpsc::Receiver<ListItem<T>>,
    cancel: CancellationToken,
    _guard: DropGuard,
}

impl<T> ListStream<T> {
    /// Stop the producer; the stream yields nothing further
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl<T> Stream for ListStream<T> {
    type Item = ListItem<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // An item may already sit in the channel when cancellation lands
        if self.cancel.is_cancelled() {
            return Poll::Ready(None);
        }
        self.receiver.poll_recv(cx)
    }
}

impl<T> std::fmt::Debug for ListStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListStream").field("cancelled", &self.cancel.is_cancelled()).finish()
    }
}

/// Turn a cursor-paginated source into a [`ListStream`]
///
/// `load_page` receives the cursor of the last processed edge (`None` for
/// the first page). `to_item` maps one edge to its cursor and an optional
/// item; a `None` item is a tombstone that advances the cursor without being
/// emitted. Cancelling `cancel` (or any parent token) stops the producer at
/// its next check point: before each page request and at each emission.
///
/// # Panics
/// Panics if called outside a Tokio runtime.
pub fn paginate<E, T, L, Fut, M>(cancel: &CancellationToken, load_page: L, to_item: M) -> ListStream<T>
where
    E: Send + 'static,
    T: Send + 'static,
    L: FnMut(Option<String>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Page<E>>> + Send + 'static,
    M: FnMut(E) -> Result<EdgeOutcome<T>> + Send + 'static,
{
    let token = cancel.child_token();
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    let span = info_span!("page_stream");
    tokio::spawn(produce(token.clone(), tx, load_page, to_item).instrument(span));

    ListStream { receiver: rx, cancel: token.clone(), _guard: token.drop_guard() }
}

async fn produce<E, T, L, Fut, M>(
    cancel: CancellationToken,
    tx: mpsc::Sender<ListItem<T>>,
    mut load_page: L,
    mut to_item: M,
) where
    L: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<E>>>,
    M: FnMut(E) -> Result<EdgeOutcome<T>>,
{
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        if cancel.is_cancelled() || tx.is_closed() {
            debug!(pages, "Consumer cancelled, stopping pagination");
            return;
        }

        let page = match load_page(cursor.clone()).await {
            Ok(page) => page,
            Err(err) => {
                warn!(error = %err, pages, "Page load failed, terminating stream");
                emit(&cancel, &tx, Err(RaitoError::PageLoad(Box::new(err)))).await;
                return;
            }
        };
        pages += 1;

        let has_next = page.has_next();
        debug!(page = pages, edges = page.edges.len(), has_next, "Loaded page");

        for edge in page.edges {
            let outcome = match to_item(edge) {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(error = %err, page = pages, "Edge mapping failed, terminating stream");
                    emit(&cancel, &tx, Err(RaitoError::Mapping(Box::new(err)))).await;
                    return;
                }
            };

            if let Some(next) = outcome.cursor {
                cursor = Some(next);
            }

            if let Some(item) = outcome.item {
                if !emit(&cancel, &tx, Ok(item)).await {
                    debug!(pages, "Consumer cancelled, stopping pagination");
                    return;
                }
            }
        }

        if !has_next {
            debug!(pages, "Pagination exhausted");
            return;
        }
    }
}

/// Hand one item to the consumer; `false` once the consumer is gone
async fn emit<T>(
    cancel: &CancellationToken,
    tx: &mpsc::Sender<ListItem<T>>,
    item: ListItem<T>,
) -> bool {
    tokio::select! {
        biased;
        () = cancel.cancelled() => false,
        sent = tx.send(item) => sent.is_ok(),
    }
}
