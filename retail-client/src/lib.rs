//! Retail Client - customer checkout for the retail backend
//!
//! Provides the HTTP client, the order checkout flow (branch and product
//! selection, confirmation, payment initiation) and the payment return
//! handler that reconciles a gateway redirect with the stored draft.

pub mod api;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod debounce;
pub mod draft_store;
pub mod error;
pub mod http;
pub mod logger;
pub mod payment_return;
pub mod session;

pub use api::RetailApi;
pub use catalog::{CatalogQuery, CatalogView, ProductSearch};
pub use checkout::{
    CheckoutError, CheckoutFlow, CheckoutRedirect, CheckoutSettings, FlowMessage, ModalState,
    OrderReview,
};
pub use config::ClientConfig;
pub use debounce::Debouncer;
pub use draft_store::{DraftStore, DraftStoreError, FileDraftStore, MemoryDraftStore};
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use payment_return::{PaymentReturn, Reconciliation, ReturnHandler, ReturnOutcome};
pub use session::Session;

// Re-export shared types for convenience
pub use shared::client::{LoginResponse, PaymentInitiation, PaymentRequest};
pub use shared::models::{Branch, DraftOrder, Order, OrderStatus, Product, Role, UserInfo};
