//! Payment return handling
//!
//! Runs when the gateway sends the customer back. The stored draft is
//! resolved by transaction reference and always removed; on success the
//! order history is re-fetched from the backend, which is the only source
//! of truth for the final order.

use std::sync::Arc;

use reqwest::Url;
use shared::models::{DraftOrder, Order, dedupe_orders};

use crate::api::{NEWEST_FIRST, RetailApi};
use crate::checkout::FlowMessage;
use crate::draft_store::{DraftStore, DraftStoreError};
use crate::{ClientError, ClientResult, Session};

/// Result the gateway return carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentReturn {
    Success { tx_ref: Option<String> },
    Failure { error: String, tx_ref: Option<String> },
}

impl PaymentReturn {
    /// Parse the return URL's query string.
    ///
    /// Recognises `paymentSuccess=true|1`, `paymentError=<text>` and an
    /// optional `tx_ref`. An error wins over a success flag. Returns
    /// `Ok(None)` for a URL that carries neither.
    pub fn from_url(url: &str) -> ClientResult<Option<Self>> {
        let url = Url::parse(url)
            .map_err(|e| ClientError::Validation(format!("Invalid return URL: {e}")))?;

        let mut success = false;
        let mut error = None;
        let mut tx_ref = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "paymentSuccess" => success = matches!(value.as_ref(), "true" | "1"),
                "paymentError" => error = Some(value.into_owned()),
                "tx_ref" => tx_ref = Some(value.into_owned()).filter(|s| !s.is_empty()),
                _ => {}
            }
        }

        Ok(match (error, success) {
            (Some(error), _) => Some(Self::Failure { error, tx_ref }),
            (None, true) => Some(Self::Success { tx_ref }),
            (None, false) => None,
        })
    }

    pub fn tx_ref(&self) -> Option<&str> {
        match self {
            Self::Success { tx_ref } | Self::Failure { tx_ref, .. } => tx_ref.as_deref(),
        }
    }
}

/// Whether the backend's order history backs up a successful return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// An order carrying the transaction reference is in the history
    Confirmed,
    /// History was fetched but holds no order for the transaction yet
    NotRecorded,
    /// Nothing to check against: no transaction reference, no history,
    /// or the payment failed
    Unverified,
}

/// What the page shows after a payment return
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnOutcome {
    pub message: FlowMessage,
    /// Refreshed order history (success only; `None` if not fetched)
    pub orders: Option<Vec<Order>>,
    /// The draft that was pending, if one was stored
    pub draft: Option<DraftOrder>,
    pub reconciliation: Reconciliation,
}

/// Reconciles a payment return with the stored draft and the backend
pub struct ReturnHandler<A: RetailApi, S: DraftStore> {
    api: Arc<A>,
    store: S,
    session: Session,
}

impl<A: RetailApi, S: DraftStore> ReturnHandler<A, S> {
    pub fn new(api: Arc<A>, store: S, session: Session) -> Self {
        Self {
            api,
            store,
            session,
        }
    }

    /// Handle one return. The draft slot is empty afterwards.
    ///
    /// On success the transaction is looked up in the refreshed history,
    /// keyed by the stored draft's `tx_ref` (or the returned one when no
    /// draft was stored).
    pub async fn handle(&self, ret: PaymentReturn) -> Result<ReturnOutcome, DraftStoreError> {
        let draft = self.take_draft(ret.tx_ref())?;

        match ret {
            PaymentReturn::Success { ref tx_ref } => {
                let tx_ref = draft
                    .as_ref()
                    .map(|d| d.tx_ref.as_str())
                    .or(tx_ref.as_deref());
                tracing::info!(tx_ref = tx_ref.unwrap_or("-"), "Payment succeeded");

                let orders = self.refresh_orders().await;
                let reconciliation = reconcile(tx_ref, orders.as_deref());
                if reconciliation == Reconciliation::NotRecorded {
                    tracing::warn!(
                        tx_ref = tx_ref.unwrap_or("-"),
                        "No order recorded for this transaction yet"
                    );
                }

                Ok(ReturnOutcome {
                    message: FlowMessage::Info("Order placed successfully!".to_string()),
                    orders,
                    draft,
                    reconciliation,
                })
            }
            PaymentReturn::Failure { error, .. } => {
                tracing::warn!(error = %error, "Payment failed");
                Ok(ReturnOutcome {
                    message: FlowMessage::Error(format!("Payment failed: {error}")),
                    orders: None,
                    draft,
                    reconciliation: Reconciliation::Unverified,
                })
            }
        }
    }

    fn take_draft(&self, tx_ref: Option<&str>) -> Result<Option<DraftOrder>, DraftStoreError> {
        let draft = match self.store.take() {
            Ok(draft) => draft,
            Err(DraftStoreError::Json(e)) => {
                tracing::warn!(error = %e, "Discarded unreadable draft order");
                None
            }
            Err(e) => return Err(e),
        };

        if let (Some(expected), Some(stored)) = (tx_ref, draft.as_ref())
            && stored.tx_ref != expected
        {
            tracing::warn!(
                expected = %expected,
                stored = %stored.tx_ref,
                "Payment return does not match the stored draft"
            );
        }

        Ok(draft)
    }

    async fn refresh_orders(&self) -> Option<Vec<Order>> {
        let user_id = &self.session.user().id;
        match self.api.order_history(user_id, Some(NEWEST_FIRST)).await {
            Ok(orders) => Some(dedupe_orders(orders)),
            Err(e) => {
                tracing::error!(error = %e, "Error refreshing orders");
                None
            }
        }
    }
}

fn reconcile(tx_ref: Option<&str>, orders: Option<&[Order]>) -> Reconciliation {
    let (Some(tx_ref), Some(orders)) = (tx_ref, orders) else {
        return Reconciliation::Unverified;
    };
    if orders.iter().any(|o| o.tx_ref.as_deref() == Some(tx_ref)) {
        Reconciliation::Confirmed
    } else {
        Reconciliation::NotRecorded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft_store::MemoryDraftStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use shared::client::{PaymentInitiation, PaymentRequest};
    use shared::models::{Branch, OrderStatus, Product, Role, UserInfo};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeApi {
        orders: Vec<Order>,
        history_calls: Mutex<Vec<(String, Option<String>)>>,
        fail_history: bool,
    }

    #[async_trait]
    impl RetailApi for FakeApi {
        async fn list_branches(&self) -> ClientResult<Vec<Branch>> {
            Ok(Vec::new())
        }

        async fn orderable_products(&self, _: &str, _: &str) -> ClientResult<Vec<Product>> {
            Ok(Vec::new())
        }

        async fn initiate_payment(&self, _: &PaymentRequest) -> ClientResult<PaymentInitiation> {
            Err(ClientError::Internal("not used".into()))
        }

        async fn order_history(
            &self,
            user_id: &str,
            sort: Option<&str>,
        ) -> ClientResult<Vec<Order>> {
            self.history_calls
                .lock()
                .unwrap()
                .push((user_id.to_string(), sort.map(str::to_string)));
            if self.fail_history {
                return Err(ClientError::Internal("db down".into()));
            }
            Ok(self.orders.clone())
        }
    }

    fn session() -> Session {
        Session::new(UserInfo {
            id: "u1".into(),
            name: "Sara Bekele".into(),
            email: "sara@example.com".into(),
            role: Role::Customer,
        })
    }

    fn draft(tx_ref: &str) -> DraftOrder {
        DraftOrder {
            product_id: "p1".into(),
            product_name: "Water".into(),
            quantity: 3,
            unit_price: Decimal::new(1000, 2),
            total_price: Decimal::new(3000, 2),
            user_id: "u1".into(),
            user_email: "sara@example.com".into(),
            user_name: "Sara Bekele".into(),
            branch_manager_id: "m1".into(),
            branch_id: "b1".into(),
            branch_name: "Bole".into(),
            tx_ref: tx_ref.into(),
            created_at: Utc::now(),
            status: OrderStatus::Pending,
        }
    }

    fn order(id: &str, status: OrderStatus) -> Order {
        Order {
            id: id.into(),
            product: Some("p1".into()),
            product_name: "Water".into(),
            quantity: 3,
            total_price: Decimal::new(3000, 2),
            user_id: Some("u1".into()),
            branch_id: Some("b1".into()),
            branch_name: Some("Bole".into()),
            status,
            tx_ref: Some("txn-1".into()),
            created_at: None,
        }
    }

    #[test]
    fn test_parse_return_url() {
        let ret = PaymentReturn::from_url(
            "http://localhost:5173/payment-success?paymentSuccess=true&tx_ref=txn-1",
        )
        .unwrap();
        assert_eq!(
            ret,
            Some(PaymentReturn::Success {
                tx_ref: Some("txn-1".into())
            })
        );

        let ret = PaymentReturn::from_url(
            "http://localhost:5173/payment-success?paymentError=Card%20declined",
        )
        .unwrap();
        assert_eq!(
            ret,
            Some(PaymentReturn::Failure {
                error: "Card declined".into(),
                tx_ref: None
            })
        );

        let ret = PaymentReturn::from_url(
            "http://localhost:5173/payment-success?paymentSuccess=true&paymentError=timeout",
        )
        .unwrap();
        assert!(matches!(ret, Some(PaymentReturn::Failure { .. })));

        assert_eq!(
            PaymentReturn::from_url("http://localhost:5173/payment-success").unwrap(),
            None
        );
        assert!(PaymentReturn::from_url("not a url").is_err());
    }

    #[tokio::test]
    async fn test_success_clears_draft_and_dedupes_orders() {
        let api = Arc::new(FakeApi {
            orders: vec![
                order("o1", OrderStatus::Pending),
                order("o2", OrderStatus::Completed),
                order("o1", OrderStatus::Paid),
            ],
            ..Default::default()
        });
        let store = Arc::new(MemoryDraftStore::new());
        store.save(&draft("txn-1")).unwrap();

        let handler = ReturnHandler::new(api.clone(), store.clone(), session());
        let outcome = handler
            .handle(PaymentReturn::Success {
                tx_ref: Some("txn-1".into()),
            })
            .await
            .unwrap();

        assert!(store.load().unwrap().is_none());
        assert_eq!(outcome.message.text(), "Order placed successfully!");
        assert!(!outcome.message.is_error());
        assert_eq!(outcome.reconciliation, Reconciliation::Confirmed);
        assert_eq!(outcome.draft.unwrap().total_price, Decimal::new(3000, 2));

        let orders = outcome.orders.unwrap();
        let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["o1", "o2"]);
        assert_eq!(orders[0].status, OrderStatus::Paid);

        let calls = api.history_calls.lock().unwrap().clone();
        assert_eq!(calls, vec![("u1".to_string(), Some("-createdAt".to_string()))]);
    }

    #[tokio::test]
    async fn test_failure_clears_draft_without_fetch() {
        let api = Arc::new(FakeApi::default());
        let store = Arc::new(MemoryDraftStore::new());
        store.save(&draft("txn-2")).unwrap();

        let handler = ReturnHandler::new(api.clone(), store.clone(), session());
        let outcome = handler
            .handle(PaymentReturn::Failure {
                error: "Card declined".into(),
                tx_ref: None,
            })
            .await
            .unwrap();

        assert!(store.load().unwrap().is_none());
        assert!(outcome.message.is_error());
        assert_eq!(outcome.message.text(), "Payment failed: Card declined");
        assert_eq!(outcome.reconciliation, Reconciliation::Unverified);
        assert!(outcome.orders.is_none());
        assert!(api.history_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_success_with_failing_refresh() {
        let api = Arc::new(FakeApi {
            fail_history: true,
            ..Default::default()
        });
        let store = Arc::new(MemoryDraftStore::new());

        let handler = ReturnHandler::new(api, store.clone(), session());
        let outcome = handler
            .handle(PaymentReturn::Success { tx_ref: None })
            .await
            .unwrap();

        assert_eq!(outcome.message.text(), "Order placed successfully!");
        assert!(outcome.orders.is_none());
        assert!(outcome.draft.is_none());
        assert_eq!(outcome.reconciliation, Reconciliation::Unverified);
    }

    #[tokio::test]
    async fn test_mismatched_tx_ref_still_clears() {
        let api = Arc::new(FakeApi::default());
        let store = Arc::new(MemoryDraftStore::new());
        store.save(&draft("txn-new")).unwrap();

        let handler = ReturnHandler::new(api, store.clone(), session());
        let outcome = handler
            .handle(PaymentReturn::Success {
                tx_ref: Some("txn-old".into()),
            })
            .await
            .unwrap();

        // Keyed by the stored draft, which the empty history does not hold
        assert_eq!(outcome.reconciliation, Reconciliation::NotRecorded);
        assert_eq!(outcome.draft.unwrap().tx_ref, "txn-new");
        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_success_not_in_history_is_not_recorded() {
        let api = Arc::new(FakeApi {
            orders: vec![order("o1", OrderStatus::Paid)],
            ..Default::default()
        });
        let store = Arc::new(MemoryDraftStore::new());
        store.save(&draft("txn-9")).unwrap();

        let handler = ReturnHandler::new(api, store, session());
        let outcome = handler
            .handle(PaymentReturn::Success {
                tx_ref: Some("txn-9".into()),
            })
            .await
            .unwrap();

        assert_eq!(outcome.message.text(), "Order placed successfully!");
        assert_eq!(outcome.reconciliation, Reconciliation::NotRecorded);
        assert_eq!(outcome.orders.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_success_without_draft_uses_returned_tx_ref() {
        let api = Arc::new(FakeApi {
            orders: vec![order("o1", OrderStatus::Paid)],
            ..Default::default()
        });

        let handler = ReturnHandler::new(api, Arc::new(MemoryDraftStore::new()), session());
        let outcome = handler
            .handle(PaymentReturn::Success {
                tx_ref: Some("txn-1".into()),
            })
            .await
            .unwrap();

        assert!(outcome.draft.is_none());
        assert_eq!(outcome.reconciliation, Reconciliation::Confirmed);
    }
}
