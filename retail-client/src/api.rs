//! Backend operations the checkout flow depends on

use async_trait::async_trait;
use shared::client::{PaymentInitiation, PaymentRequest};
use shared::models::{Branch, Order, Product, ProductCatalog};

use crate::{ClientResult, HttpClient};

/// Order history sort used after a payment returns: newest first
pub const NEWEST_FIRST: &str = "-createdAt";

/// Retail backend API
///
/// Implemented over HTTP by [`HttpClient`]; tests substitute in-memory
/// fakes.
#[async_trait]
pub trait RetailApi: Send + Sync {
    /// `GET /branches`
    async fn list_branches(&self) -> ClientResult<Vec<Branch>>;

    /// `GET /productlist`, flattened and limited to orderable products
    async fn orderable_products(
        &self,
        branch_manager_id: &str,
        search: &str,
    ) -> ClientResult<Vec<Product>>;

    /// `POST /api/payments/initiate`
    async fn initiate_payment(&self, request: &PaymentRequest) -> ClientResult<PaymentInitiation>;

    /// `GET /orders`
    async fn order_history(&self, user_id: &str, sort: Option<&str>) -> ClientResult<Vec<Order>>;
}

#[async_trait]
impl RetailApi for HttpClient {
    async fn list_branches(&self) -> ClientResult<Vec<Branch>> {
        self.get("/branches", &[]).await
    }

    async fn orderable_products(
        &self,
        branch_manager_id: &str,
        search: &str,
    ) -> ClientResult<Vec<Product>> {
        let catalog: ProductCatalog = self
            .get(
                "/productlist",
                &[("search", search), ("branchManagerId", branch_manager_id)],
            )
            .await?;
        Ok(catalog.into_orderable())
    }

    async fn initiate_payment(&self, request: &PaymentRequest) -> ClientResult<PaymentInitiation> {
        self.post("/api/payments/initiate", request).await
    }

    async fn order_history(&self, user_id: &str, sort: Option<&str>) -> ClientResult<Vec<Order>> {
        let mut query = vec![("userId", user_id)];
        if let Some(sort) = sort {
            query.push(("sort", sort));
        }
        self.get("/orders", &query).await
    }
}
