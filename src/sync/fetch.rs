//! Paginated fetching into a view-owned list.
//!
//! A `ListSync` holds the entities a view renders together with the page
//! descriptor of the next fetch. A `Fetcher` owns at most one in-flight
//! request; starting a new fetch aborts the previous one, so a stale page
//! can never stomp a newer one — aborted requests are discarded without
//! touching the list or the error channel.

use futures::future::{AbortHandle, AbortRegistration, Abortable};
use std::future::Future;

use crate::client::ApiError;
use crate::sync::list::{self, Keyed};
use crate::sync::query::{PageQuery, SortKey};

/// Ordered, keyed collection owned by a single view.
#[derive(Debug)]
pub struct ListSync<T> {
    items: Vec<T>,
    page: PageQuery,
    loading: bool,
    mounted: bool,
}

impl<T: Keyed + Clone> ListSync<T> {
    pub fn new(page: PageQuery) -> Self {
        Self {
            items: Vec::new(),
            page,
            loading: false,
            mounted: false,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn page(&self) -> &PageQuery {
        &self.page
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Suppresses the loading indicator on subsequent fetches, once the
    /// view has rendered at least once.
    pub fn mark_mounted(&mut self) {
        self.mounted = true;
    }

    /// Merge a fetched page. The first page replaces the held list; a
    /// continuation appends, skipping keys already present.
    pub fn apply_page(&mut self, fetched: Vec<T>) {
        if self.page.skip == 0 {
            self.items = fetched;
        } else {
            for item in fetched {
                if !self.items.iter().any(|held| held.key() == item.key()) {
                    self.items.push(item);
                }
            }
        }
    }

    /// Advance the page window for "load more". The next offset is the
    /// current list length plus the page size, so locally inserted or
    /// removed entries shift the window instead of skewing it.
    pub fn advance(&mut self) {
        self.page.skip = self.items.len() as i64 + self.page.take;
    }

    /// Change the sort key; always falls back to the first page,
    /// discarding accumulated continuations on the next fetch.
    pub fn set_order(&mut self, order_by: SortKey) {
        self.page.order_by = order_by;
        self.page.skip = 0;
    }

    pub fn insert_front(&mut self, item: T) {
        self.items = list::insert_front(&self.items, item);
    }

    pub fn upsert(&mut self, item: T) {
        self.items = list::upsert(&self.items, item, false);
    }

    pub fn remove(&mut self, item: &T) {
        self.items = list::remove_by_key(&self.items, item);
    }

    pub fn begin_load(&mut self) {
        if !self.mounted {
            self.loading = true;
        }
    }

    pub fn end_load(&mut self) {
        self.loading = false;
    }
}

/// Owner of the single outstanding cancellation token for a view's
/// fetches.
#[derive(Debug, Default)]
pub struct Fetcher {
    inflight: Option<AbortHandle>,
}

impl Fetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the in-flight request, if any, and hand out the registration
    /// for the next one.
    pub fn begin(&mut self) -> AbortRegistration {
        if let Some(previous) = self.inflight.take() {
            previous.abort();
        }
        let (handle, registration) = AbortHandle::new_pair();
        self.inflight = Some(handle);
        registration
    }

    pub fn cancel(&mut self) {
        if let Some(previous) = self.inflight.take() {
            previous.abort();
        }
    }
}

/// Run one page fetch against the list.
///
/// On success the page is merged per `apply_page`. A failure leaves the
/// list unchanged and bubbles to the caller, which records it in the
/// error channel. An aborted fetch is not a failure: it resolves without
/// any effect. The loading flag brackets the call either way.
pub async fn sync_page<T, F, Fut>(
    list: &mut ListSync<T>,
    registration: AbortRegistration,
    fetch: F,
) -> Result<(), ApiError>
where
    T: Keyed + Clone,
    F: FnOnce(PageQuery) -> Fut,
    Fut: Future<Output = Result<Vec<T>, ApiError>>,
{
    list.begin_load();
    let outcome = Abortable::new(fetch(list.page().clone()), registration).await;
    list.end_load();

    match outcome {
        Err(_aborted) => Ok(()),
        Ok(Ok(fetched)) => {
            list.apply_page(fetched);
            Ok(())
        }
        Ok(Err(err)) => Err(err),
    }
}
