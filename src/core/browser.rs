use crate::core::pager::Pager;
use crate::domain::model::{CollectionId, ListScope, SharedParameter};
use crate::domain::ports::ParameterStore;
use crate::utils::error::Result;

/// A paged view over the backend's shared parameters.
///
/// The browser owns its [`Pager`]: every navigation moves the pager first and
/// then re-queries the store with the resulting offset, so the page on screen
/// and the pager never disagree.
pub struct ParameterBrowser<S: ParameterStore> {
    store: S,
    pager: Pager,
    scope: ListScope,
    parameters: Vec<SharedParameter>,
}

impl<S: ParameterStore> ParameterBrowser<S> {
    pub fn new(store: S, pager: Pager, scope: ListScope) -> Self {
        Self {
            store,
            pager,
            scope,
            parameters: Vec::new(),
        }
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn scope(&self) -> &ListScope {
        &self.scope
    }

    pub fn parameters(&self) -> &[SharedParameter] {
        &self.parameters
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetches the current page and refreshes the pager totals in place.
    pub async fn load(&mut self) -> Result<()> {
        let page_size = self.pager.items_per_page();
        let offset = self.pager.offset();
        tracing::debug!(scope = ?self.scope, page_size, offset, "Loading parameters");

        let page = match &self.scope {
            ListScope::User(username) => {
                self.store.fetch_by_user(username, page_size, offset).await?
            }
            ListScope::Collection(id) => {
                self.store.fetch_by_collection(id, page_size, offset).await?
            }
        };

        self.parameters = page.records;
        self.pager.set_total_items(page.total_items);
        self.pager.advance(0);
        tracing::debug!("{}", self.pager.status_text());
        Ok(())
    }

    /// Returns `false` without fetching when already on the last page.
    pub async fn next(&mut self) -> Result<bool> {
        if !self.pager.next_enabled() {
            return Ok(false);
        }
        self.pager.advance(1);
        self.load().await?;
        Ok(true)
    }

    /// Returns `false` without fetching when already on the first page.
    pub async fn previous(&mut self) -> Result<bool> {
        if !self.pager.previous_enabled() {
            return Ok(false);
        }
        self.pager.advance(-1);
        self.load().await?;
        Ok(true)
    }

    /// Jumps to a zero-indexed page, clamped to the pages last reported.
    pub async fn go_to(&mut self, page: usize) -> Result<()> {
        let target = page.min(self.pager.total_pages() - 1);
        let delta = target as i64 - self.pager.current_page() as i64;
        self.pager.advance(delta);
        self.load().await
    }

    pub async fn refresh(&mut self) -> Result<()> {
        self.pager.reset();
        self.load().await
    }

    pub async fn select_collection(&mut self, collection_id: CollectionId) -> Result<()> {
        self.scope = ListScope::Collection(collection_id);
        self.refresh().await
    }

    pub async fn select_user(&mut self, username: impl Into<String>) -> Result<()> {
        self.scope = ListScope::User(username.into());
        self.refresh().await
    }
}
