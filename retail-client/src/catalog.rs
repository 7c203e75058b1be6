//! Debounced product catalog lookups for the selected branch

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use shared::models::Product;
use tokio::sync::watch;
use tokio::time::Duration;

use crate::api::RetailApi;
use crate::debounce::Debouncer;

/// One catalog lookup: a branch manager's products matching a search term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub branch_id: String,
    pub branch_manager_id: String,
    pub search: String,
}

/// Latest applied catalog lookup
#[derive(Debug, Clone, Default)]
pub struct CatalogView {
    /// Sequence number of the lookup this view came from (0 = none yet)
    pub generation: u64,
    pub branch_id: Option<String>,
    pub search: String,
    pub products: Vec<Product>,
    /// User-facing error of the latest lookup, if it failed
    pub error: Option<String>,
}

/// Product search over the backend catalog.
///
/// Queries go through a [`Debouncer`]; each fired lookup is numbered and
/// its response is applied only if no later lookup has fired since, so a
/// slow stale response never overwrites a newer one.
pub struct ProductSearch {
    debouncer: Debouncer<CatalogQuery>,
    view: watch::Receiver<CatalogView>,
}

impl ProductSearch {
    pub fn spawn<A: RetailApi + 'static>(api: Arc<A>, window: Duration) -> Self {
        let (tx, view) = watch::channel(CatalogView::default());
        let tx = Arc::new(tx);
        let issued = Arc::new(AtomicU64::new(0));

        let debouncer = Debouncer::spawn(window, move |query: CatalogQuery| {
            let api = api.clone();
            let tx = tx.clone();
            let issued = issued.clone();
            async move {
                let generation = issued.fetch_add(1, Ordering::SeqCst) + 1;
                tracing::debug!(
                    generation,
                    branch_id = %query.branch_id,
                    search = %query.search,
                    "Catalog lookup fired"
                );

                let result = api
                    .orderable_products(&query.branch_manager_id, &query.search)
                    .await;

                tx.send_if_modified(|view| {
                    if issued.load(Ordering::SeqCst) != generation {
                        tracing::debug!(generation, "Dropping stale catalog response");
                        return false;
                    }

                    view.generation = generation;
                    view.branch_id = Some(query.branch_id.clone());
                    view.search = query.search.clone();
                    match &result {
                        Ok(products) => {
                            view.products = products.clone();
                            view.error = None;
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Catalog lookup failed");
                            view.products.clear();
                            view.error = Some(format!("Error fetching products: {e}"));
                        }
                    }
                    true
                });
            }
        });

        Self { debouncer, view }
    }

    /// Queue a lookup; only the last query of a burst is sent.
    pub fn request(&self, query: CatalogQuery) {
        if !self.debouncer.trigger(query) {
            tracing::warn!("Catalog search is shut down, query ignored");
        }
    }

    /// Snapshot of the latest applied lookup
    pub fn view(&self) -> CatalogView {
        self.view.borrow().clone()
    }

    /// Products of the latest applied lookup, if it was for `branch_id`.
    ///
    /// Empty while the view still holds another branch's catalog.
    pub fn products(&self, branch_id: &str) -> Vec<Product> {
        let view = self.view.borrow();
        if view.branch_id.as_deref() != Some(branch_id) {
            return Vec::new();
        }
        view.products.clone()
    }

    /// Look up a product of `branch_id`'s catalog by id.
    ///
    /// Returns `None` until a lookup for that branch has been applied.
    pub fn find(&self, branch_id: &str, product_id: &str) -> Option<Product> {
        let view = self.view.borrow();
        if view.branch_id.as_deref() != Some(branch_id) {
            return None;
        }
        view.products.iter().find(|p| p.id == product_id).cloned()
    }

    /// Wait until a newer lookup has been applied.
    ///
    /// Returns `None` if the search worker has gone away.
    pub async fn changed(&mut self) -> Option<CatalogView> {
        self.view.changed().await.ok()?;
        Some(self.view.borrow_and_update().clone())
    }
}
