//! List View Model - the paginated blog listing.

use std::sync::Arc;

use tokio::sync::mpsc;

use inkpost_core::domain::Blog;
use inkpost_core::error::GatewayError;
use inkpost_core::ports::{BlogPage, BlogStore, PageRequest};

/// Rows per page of the listing.
pub const PAGE_SIZE: u32 = 5;

/// Why a refresh was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    Created,
    Edited,
    Deleted,
}

/// The single upward contract for mutations: whoever changes a row
/// sends one notification, the list refetches. Cheap to clone, safe to
/// hold after the list is gone.
#[derive(Clone)]
pub struct RefreshHandle {
    tx: mpsc::UnboundedSender<RefreshReason>,
}

impl RefreshHandle {
    pub fn notify(&self, reason: RefreshReason) {
        // The list may already be torn down.
        let _ = self.tx.send(reason);
    }
}

/// Tag for one in-flight page request. A response is applied only
/// while its ticket is still the latest issued.
#[derive(Debug, Clone, Copy)]
pub struct FetchTicket {
    seq: u64,
    page: u32,
}

/// Pagination and list-refresh state machine.
pub struct BlogList {
    store: Arc<dyn BlogStore>,
    rows: Vec<Blog>,
    page: u32,
    total: u64,
    loading: bool,
    page_changing: bool,
    error: Option<String>,
    refresh_token: u64,
    issued_seq: u64,
    refresh_tx: mpsc::UnboundedSender<RefreshReason>,
    refresh_rx: mpsc::UnboundedReceiver<RefreshReason>,
}

impl BlogList {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();

        Self {
            store,
            rows: Vec::new(),
            page: 1,
            total: 0,
            loading: false,
            page_changing: false,
            error: None,
            refresh_token: 0,
            issued_seq: 0,
            refresh_tx,
            refresh_rx,
        }
    }

    pub fn rows(&self) -> &[Blog] {
        &self.rows
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn total_pages(&self) -> u32 {
        (self.total.div_ceil(u64::from(PAGE_SIZE)) as u32).max(1)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_page_changing(&self) -> bool {
        self.page_changing
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Monotonic counter bumped on every successful fetch; children
    /// discard cached display state when it moves.
    pub fn refresh_token(&self) -> u64 {
        self.refresh_token
    }

    /// The "No blogs found" condition: settled, healthy, and empty.
    pub fn shows_empty_state(&self) -> bool {
        !self.loading && self.error.is_none() && self.rows.is_empty()
    }

    /// Handle given to anything that mutates rows.
    pub fn refresh_handle(&self) -> RefreshHandle {
        RefreshHandle {
            tx: self.refresh_tx.clone(),
        }
    }

    /// Issue a sequence-tagged page request. The full-page loading
    /// indicator is suppressed during in-place page changes.
    pub fn begin_fetch(&mut self, page: u32) -> FetchTicket {
        if !self.page_changing {
            self.loading = true;
        }
        self.error = None;
        self.issued_seq += 1;

        FetchTicket {
            seq: self.issued_seq,
            page,
        }
    }

    /// Apply a completed page request. Responses carrying a superseded
    /// ticket are discarded, so the displayed page always reflects the
    /// most recently requested one. Loading flags are cleared on every
    /// path that applies - success and failure alike.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, result: Result<BlogPage, GatewayError>) {
        if ticket.seq != self.issued_seq {
            tracing::debug!(
                stale_seq = ticket.seq,
                latest_seq = self.issued_seq,
                page = ticket.page,
                "Discarding stale page response"
            );
            return;
        }

        match result {
            Ok(fetched) => {
                self.rows = fetched.rows;
                self.total = fetched.total;
                self.error = None;
                self.refresh_token += 1;
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.rows.clear();
                self.total = 0;
            }
        }

        self.loading = false;
        self.page_changing = false;
    }

    async fn fetch_page(&mut self, page: u32) {
        let ticket = self.begin_fetch(page);
        let result = self.store.page(PageRequest::for_page(page, PAGE_SIZE)).await;
        self.complete_fetch(ticket, result);
    }

    /// Initial load, and any same-page reload.
    pub async fn refresh(&mut self) {
        self.fetch_page(self.page).await;
    }

    /// Change pages. Requesting the current page is a no-op: no fetch,
    /// no state change.
    pub async fn go_to_page(&mut self, page: u32) {
        let page = page.max(1);
        if page == self.page {
            return;
        }

        self.page_changing = true;
        self.page = page;
        self.fetch_page(page).await;
    }

    /// The listing's Next control, clamped to the last page.
    pub async fn next_page(&mut self) {
        self.go_to_page((self.page + 1).min(self.total_pages())).await;
    }

    /// The listing's Previous control, clamped to the first page.
    pub async fn prev_page(&mut self) {
        self.go_to_page(self.page.saturating_sub(1)).await;
    }

    /// Any login or logout resets the listing to the first page.
    pub async fn on_auth_change(&mut self) {
        self.page = 1;
        self.fetch_page(1).await;
    }

    /// Drain queued mutation notifications; when any arrived, reset to
    /// page 1 and refetch once. Returns whether a refetch ran.
    pub async fn process_notifications(&mut self) -> bool {
        let mut notified = false;
        while let Ok(reason) = self.refresh_rx.try_recv() {
            tracing::debug!(?reason, "List refresh requested");
            notified = true;
        }

        if notified {
            self.page = 1;
            self.fetch_page(1).await;
        }

        notified
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tests::support::{CountingStore, FailingStore};

    async fn loaded_list(posts: usize) -> (BlogList, Arc<CountingStore>) {
        let store = Arc::new(CountingStore::with_posts(posts));
        let mut list = BlogList::new(store.clone());
        list.refresh().await;
        (list, store)
    }

    #[tokio::test]
    async fn total_pages_is_ceiling_with_a_floor_of_one() {
        for (posts, expected) in [(0, 1), (1, 1), (5, 1), (6, 2), (10, 2), (11, 3), (12, 3)] {
            let (list, _) = loaded_list(posts).await;
            assert_eq!(list.total_pages(), expected, "{posts} posts");
        }
    }

    #[tokio::test]
    async fn refresh_fills_one_page_newest_first() {
        let (list, store) = loaded_list(12).await;

        assert_eq!(list.page(), 1);
        assert_eq!(list.rows().len(), 5);
        assert!(
            list.rows()
                .windows(2)
                .all(|w| w[0].created_at >= w[1].created_at)
        );
        assert!(!list.is_loading());
        assert_eq!(list.refresh_token(), 1);
        assert_eq!(store.pages_served(), 1);
    }

    #[tokio::test]
    async fn go_to_current_page_is_a_no_op() {
        let (mut list, store) = loaded_list(12).await;

        list.go_to_page(1).await;

        assert_eq!(store.pages_served(), 1);
        assert_eq!(list.refresh_token(), 1);
        assert!(!list.is_page_changing());
    }

    #[tokio::test]
    async fn next_and_prev_clamp_at_the_edges() {
        let (mut list, store) = loaded_list(12).await;

        list.prev_page().await;
        assert_eq!(list.page(), 1);

        list.next_page().await;
        list.next_page().await;
        assert_eq!(list.page(), 3);
        assert_eq!(list.rows().len(), 2);

        list.next_page().await;
        assert_eq!(list.page(), 3);
        // Clamped moves never hit the store.
        assert_eq!(store.pages_served(), 3);
    }

    #[tokio::test]
    async fn failure_surfaces_the_error_and_empties_the_list() {
        let mut list = BlogList::new(Arc::new(FailingStore));

        list.refresh().await;

        assert_eq!(list.error(), Some("Request failed: boom"));
        assert!(list.rows().is_empty());
        assert_eq!(list.total(), 0);
        // Terminal guarantee: loading clears on failure too.
        assert!(!list.is_loading());
        assert!(!list.shows_empty_state());
    }

    #[tokio::test]
    async fn begin_fetch_raises_and_complete_clears_loading() {
        let store = Arc::new(CountingStore::with_posts(3));
        let mut list = BlogList::new(store.clone());

        let ticket = list.begin_fetch(1);
        assert!(list.is_loading());

        let result = store.page(PageRequest::for_page(1, PAGE_SIZE)).await;
        list.complete_fetch(ticket, result);

        assert!(!list.is_loading());
        assert_eq!(list.rows().len(), 3);
    }

    #[tokio::test]
    async fn stale_responses_are_discarded() {
        let store = Arc::new(CountingStore::with_posts(12));
        let mut list = BlogList::new(store.clone());

        let stale = list.begin_fetch(2);
        let latest = list.begin_fetch(3);

        let page_three = store.page(PageRequest::for_page(3, PAGE_SIZE)).await;
        list.complete_fetch(latest, page_three);
        assert_eq!(list.rows().len(), 2);
        assert_eq!(list.refresh_token(), 1);

        let page_two = store.page(PageRequest::for_page(2, PAGE_SIZE)).await;
        list.complete_fetch(stale, page_two);

        // The displayed page still reflects the most recent request.
        assert_eq!(list.rows().len(), 2);
        assert_eq!(list.refresh_token(), 1);
    }

    #[tokio::test]
    async fn mutation_notifications_reset_to_page_one() {
        let (mut list, _) = loaded_list(12).await;
        list.go_to_page(3).await;

        let handle = list.refresh_handle();
        handle.notify(RefreshReason::Created);
        handle.notify(RefreshReason::Deleted);

        assert!(list.process_notifications().await);
        assert_eq!(list.page(), 1);
        assert_eq!(list.rows()[0].title, "post 0");

        // Queue drained; nothing further happens.
        assert!(!list.process_notifications().await);
    }

    #[tokio::test]
    async fn auth_change_resets_to_page_one() {
        let (mut list, _) = loaded_list(12).await;
        list.go_to_page(2).await;

        list.on_auth_change().await;

        assert_eq!(list.page(), 1);
        assert_eq!(list.rows()[0].title, "post 0");
    }
}
