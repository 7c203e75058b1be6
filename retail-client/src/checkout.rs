//! Customer checkout flow
//!
//! Holds the customer's branch/product selection and drives the order
//! confirmation modal:
//!
//! ```text
//! Hidden --request_order--> Reviewing --confirm--> Submitting --> gateway
//!    ^                        |   ^                    |
//!    +--------cancel----------+   +--payment failed----+
//! ```
//!
//! Confirming persists the draft order before the payment request is
//! sent. A failed payment request discards the draft and returns to
//! Reviewing so the customer can retry.
//!
//! Stock is checked against the catalog as fetched at selection time. It
//! is not re-validated at confirmation, so two customers can still race
//! for the last unit; the backend has to settle that.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use shared::client::PaymentRequest;
use shared::models::{Branch, DraftOrder, Order, OrderStatus, Product, dedupe_orders};
use shared::money::{clamp_quantity, line_total};
use thiserror::Error;
use uuid::Uuid;

use crate::api::RetailApi;
use crate::catalog::{CatalogQuery, CatalogView, ProductSearch};
use crate::draft_store::{DraftStore, DraftStoreError};
use crate::{ClientConfig, ClientError, Session};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Please select a product and enter a valid quantity.")]
    NoSelection,

    #[error("Selected product not found.")]
    ProductNotFound,

    #[error("Only {available} units available.")]
    InsufficientStock { available: u32 },

    #[error("This branch does not have a manager assigned.")]
    NoManager,

    #[error("Unknown branch: {0}")]
    UnknownBranch(String),

    #[error("Cannot {action} while the order is {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },

    #[error("Payment initialization failed. Please try again.")]
    Payment(#[source] ClientError),

    #[error("Could not save the pending order: {0}")]
    Draft(#[from] DraftStoreError),

    #[error(transparent)]
    Api(#[from] ClientError),
}

/// Message shown to the customer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowMessage {
    Info(String),
    Error(String),
}

impl FlowMessage {
    pub fn text(&self) -> &str {
        match self {
            FlowMessage::Info(text) | FlowMessage::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FlowMessage::Error(_))
    }
}

/// Order details shown in the confirmation modal.
///
/// The total is computed here, once, and carried unchanged into the draft
/// order and the payment amount.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderReview {
    pub product_id: String,
    pub product_name: String,
    pub product_image: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub branch_id: String,
    pub branch_name: String,
    pub branch_manager_id: String,
}

impl OrderReview {
    fn new(product: &Product, branch: &Branch, manager_id: &str, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            product_image: product.image.clone(),
            quantity,
            unit_price: product.sale_price,
            total_price: line_total(product.sale_price, quantity),
            branch_id: branch.id.clone(),
            branch_name: branch.branch_name.clone(),
            branch_manager_id: manager_id.to_string(),
        }
    }

    fn to_draft(&self, session: &Session, tx_ref: String) -> DraftOrder {
        let user = session.user();
        DraftOrder {
            product_id: self.product_id.clone(),
            product_name: self.product_name.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            total_price: self.total_price,
            user_id: user.id.clone(),
            user_email: user.email.clone(),
            user_name: user.name.clone(),
            branch_manager_id: self.branch_manager_id.clone(),
            branch_id: self.branch_id.clone(),
            branch_name: self.branch_name.clone(),
            tx_ref,
            created_at: Utc::now(),
            status: OrderStatus::Pending,
        }
    }
}

/// Confirmation modal state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ModalState {
    #[default]
    Hidden,
    Reviewing(OrderReview),
    /// Draft persisted, payment requested. Terminal for this page once the
    /// gateway URL is handed out.
    Submitting(DraftOrder),
}

impl ModalState {
    fn name(&self) -> &'static str {
        match self {
            ModalState::Hidden => "hidden",
            ModalState::Reviewing(_) => "in review",
            ModalState::Submitting(_) => "submitting",
        }
    }
}

/// Where to send the customer to pay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRedirect {
    pub checkout_url: String,
    pub tx_ref: String,
}

/// URLs and timing the flow needs from the client configuration
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub return_url: String,
    pub callback_url: String,
    pub search_debounce: std::time::Duration,
}

impl From<&ClientConfig> for CheckoutSettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            return_url: config.return_url.clone(),
            callback_url: config.callback_url.clone(),
            search_debounce: config.search_debounce,
        }
    }
}

/// Fresh transaction reference: `txn-<unix millis>-<random>`
fn new_tx_ref() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("txn-{}-{}", Utc::now().timestamp_millis(), &random[..8])
}

/// Customer ordering page state
pub struct CheckoutFlow<A: RetailApi + 'static, S: DraftStore> {
    api: Arc<A>,
    store: S,
    session: Session,
    settings: CheckoutSettings,
    search: ProductSearch,
    branches: Vec<Branch>,
    selected_branch: Option<String>,
    search_term: String,
    selected_product: Option<String>,
    quantity: u32,
    modal: ModalState,
    orders: Vec<Order>,
    message: Option<FlowMessage>,
}

impl<A: RetailApi + 'static, S: DraftStore> CheckoutFlow<A, S> {
    /// Create the flow for a logged-in customer.
    ///
    /// Must be called inside a tokio runtime (the catalog search worker is
    /// spawned here).
    pub fn new(api: Arc<A>, store: S, session: Session, settings: CheckoutSettings) -> Self {
        let search = ProductSearch::spawn(api.clone(), settings.search_debounce);
        Self {
            api,
            store,
            session,
            settings,
            search,
            branches: Vec::new(),
            selected_branch: None,
            search_term: String::new(),
            selected_product: None,
            quantity: 1,
            modal: ModalState::Hidden,
            orders: Vec::new(),
            message: None,
        }
    }

    // ========== Accessors ==========

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn selected_branch(&self) -> Option<&Branch> {
        let id = self.selected_branch.as_deref()?;
        self.branches.iter().find(|b| b.id == id)
    }

    /// Orderable products of the latest applied catalog lookup
    pub fn products(&self) -> Vec<Product> {
        match self.selected_branch.as_deref() {
            Some(branch_id) => self.search.products(branch_id),
            None => Vec::new(),
        }
    }

    pub fn catalog(&self) -> CatalogView {
        self.search.view()
    }

    pub fn selected_product(&self) -> Option<Product> {
        self.search.find(
            self.selected_branch.as_deref()?,
            self.selected_product.as_deref()?,
        )
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn modal(&self) -> &ModalState {
        &self.modal
    }

    /// Order history as of the last [`load_orders`](Self::load_orders)
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn message(&self) -> Option<&FlowMessage> {
        self.message.as_ref()
    }

    /// Whether the "Order" action would currently pass its checks
    pub fn can_order(&self) -> bool {
        !matches!(self.modal, ModalState::Submitting(_)) && self.build_review().is_ok()
    }

    fn fail<T>(&mut self, err: CheckoutError) -> Result<T, CheckoutError> {
        self.message = Some(FlowMessage::Error(err.to_string()));
        Err(err)
    }

    // ========== Selection ==========

    /// Fetch the branch list
    pub async fn load_branches(&mut self) -> Result<&[Branch], CheckoutError> {
        match self.api.list_branches().await {
            Ok(branches) => {
                tracing::debug!(count = branches.len(), "Branches loaded");
                self.branches = branches;
                Ok(&self.branches)
            }
            Err(e) => {
                self.message = Some(FlowMessage::Error(format!("Error fetching branches: {e}")));
                Err(e.into())
            }
        }
    }

    /// Fetch the customer's order history, de-duplicated by id
    pub async fn load_orders(&mut self) -> Result<&[Order], CheckoutError> {
        match self.api.order_history(&self.session.user().id, None).await {
            Ok(orders) => {
                self.orders = dedupe_orders(orders);
                tracing::debug!(count = self.orders.len(), "Order history loaded");
                Ok(&self.orders)
            }
            Err(e) => {
                self.message = Some(FlowMessage::Error(format!(
                    "Error fetching order history: {e}"
                )));
                Err(e.into())
            }
        }
    }

    /// Select a branch and queue a catalog lookup for it.
    ///
    /// Any selected product is deselected.
    pub fn select_branch(&mut self, branch_id: &str) -> Result<(), CheckoutError> {
        if !self.branches.iter().any(|b| b.id == branch_id) {
            return self.fail(CheckoutError::UnknownBranch(branch_id.to_string()));
        }

        self.selected_branch = Some(branch_id.to_string());
        self.selected_product = None;
        self.refresh_catalog()
    }

    /// Change the search term and queue a catalog lookup.
    pub fn set_search(&mut self, term: impl Into<String>) -> Result<(), CheckoutError> {
        self.search_term = term.into();
        self.refresh_catalog()
    }

    fn refresh_catalog(&mut self) -> Result<(), CheckoutError> {
        let Some(branch) = self.selected_branch() else {
            return Ok(());
        };
        let Some(manager_id) = branch.manager_id() else {
            return self.fail(CheckoutError::NoManager);
        };

        let query = CatalogQuery {
            branch_id: branch.id.clone(),
            branch_manager_id: manager_id.to_string(),
            search: self.search_term.clone(),
        };
        self.search.request(query);
        Ok(())
    }

    /// Wait for the next catalog lookup to land and return its products.
    pub async fn wait_for_products(&mut self) -> Result<Vec<Product>, CheckoutError> {
        let view = self.search.changed().await.ok_or_else(|| {
            ClientError::Internal("catalog search stopped".to_string())
        })?;

        if let Some(error) = view.error {
            self.message = Some(FlowMessage::Error(error.clone()));
            return Err(ClientError::Internal(error).into());
        }
        Ok(view.products)
    }

    /// Select a product from the current catalog; the quantity is re-clamped.
    pub fn select_product(&mut self, product_id: &str) -> Result<(), CheckoutError> {
        let Some(product) = self
            .selected_branch
            .as_deref()
            .and_then(|branch_id| self.search.find(branch_id, product_id))
        else {
            return self.fail(CheckoutError::ProductNotFound);
        };

        self.selected_product = Some(product.id.clone());
        self.quantity = clamp_quantity(i64::from(self.quantity), product.quantity);
        Ok(())
    }

    /// Store an entered quantity, clamped to `[1, available]`.
    pub fn set_quantity(&mut self, entered: i64) -> u32 {
        self.quantity = match self.selected_product() {
            Some(product) => clamp_quantity(entered, product.quantity),
            None => entered.clamp(1, i64::from(u32::MAX)) as u32,
        };
        self.quantity
    }

    // ========== Confirmation modal ==========

    fn build_review(&self) -> Result<OrderReview, CheckoutError> {
        let product_id = self
            .selected_product
            .as_deref()
            .filter(|_| self.quantity > 0)
            .ok_or(CheckoutError::NoSelection)?;
        let branch = self.selected_branch().ok_or(CheckoutError::NoSelection)?;
        let product = self
            .search
            .find(&branch.id, product_id)
            .ok_or(CheckoutError::ProductNotFound)?;
        if self.quantity > product.quantity {
            return Err(CheckoutError::InsufficientStock {
                available: product.quantity,
            });
        }
        let manager_id = branch.manager_id().ok_or(CheckoutError::NoManager)?;

        Ok(OrderReview::new(&product, branch, manager_id, self.quantity))
    }

    /// "Order": check the selection and open the confirmation modal.
    ///
    /// On failure the message is set and the modal is left as it was.
    pub fn request_order(&mut self) -> Result<OrderReview, CheckoutError> {
        if let ModalState::Submitting(_) = self.modal {
            return self.fail(CheckoutError::InvalidState {
                action: "place an order",
                state: self.modal.name(),
            });
        }

        match self.build_review() {
            Ok(review) => {
                self.message = None;
                self.modal = ModalState::Reviewing(review.clone());
                Ok(review)
            }
            Err(e) => self.fail(e),
        }
    }

    /// "Cancel": close the modal. Returns whether a review was discarded.
    pub fn cancel(&mut self) -> bool {
        if let ModalState::Reviewing(_) = self.modal {
            self.modal = ModalState::Hidden;
            return true;
        }
        false
    }

    /// "Confirm": persist the draft order, then ask the gateway for a
    /// checkout URL.
    pub async fn confirm(&mut self) -> Result<CheckoutRedirect, CheckoutError> {
        let review = match std::mem::take(&mut self.modal) {
            ModalState::Reviewing(review) => review,
            other => {
                let state = other.name();
                self.modal = other;
                return self.fail(CheckoutError::InvalidState {
                    action: "confirm",
                    state,
                });
            }
        };

        let draft = review.to_draft(&self.session, new_tx_ref());
        if let Err(e) = self.store.save(&draft) {
            tracing::error!(tx_ref = %draft.tx_ref, error = %e, "Failed to persist draft order");
            self.modal = ModalState::Reviewing(review);
            return self.fail(e.into());
        }

        let request = PaymentRequest::for_draft(
            &draft,
            self.session.user(),
            self.settings.return_url.clone(),
            self.settings.callback_url.clone(),
        );
        let tx_ref = draft.tx_ref.clone();
        self.modal = ModalState::Submitting(draft);

        tracing::info!(
            tx_ref = %tx_ref,
            amount = %request.amount,
            product_id = %review.product_id,
            quantity = review.quantity,
            "Initiating payment"
        );

        let result = match self.api.initiate_payment(&request).await {
            Ok(init) if init.checkout_url.trim().is_empty() => Err(ClientError::InvalidResponse(
                "Missing checkout_url".to_string(),
            )),
            other => other,
        };

        match result {
            Ok(init) => {
                tracing::info!(tx_ref = %tx_ref, "Redirecting to payment gateway");
                self.message = None;
                Ok(CheckoutRedirect {
                    checkout_url: init.checkout_url,
                    tx_ref,
                })
            }
            Err(e) => {
                tracing::warn!(tx_ref = %tx_ref, error = %e, "Payment initiation failed");
                if let Err(clear_err) = self.store.clear() {
                    tracing::error!(error = %clear_err, "Failed to discard draft order");
                }
                self.modal = ModalState::Reviewing(review);
                self.fail(CheckoutError::Payment(e))
            }
        }
    }
}
