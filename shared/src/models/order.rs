//! Order Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Completed,
    Cancelled,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Server-confirmed order (order history row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    /// Product reference
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub product_name: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, rename = "tx_ref")]
    pub tx_ref: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Client-held order awaiting payment resolution
///
/// Written once when the customer confirms, read back and removed by the
/// payment return handler. Never edited in between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftOrder {
    /// Product reference
    #[serde(rename = "product")]
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,
    pub user_id: String,
    pub user_email: String,
    pub user_name: String,
    pub branch_manager_id: String,
    pub branch_id: String,
    pub branch_name: String,
    #[serde(rename = "tx_ref")]
    pub tx_ref: String,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
}

/// De-duplicate orders by id.
///
/// The last occurrence of an id wins, placed where the id was first seen.
pub fn dedupe_orders(orders: Vec<Order>) -> Vec<Order> {
    let mut index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    let mut unique: Vec<Order> = Vec::with_capacity(orders.len());

    for order in orders {
        match index.get(&order.id) {
            Some(&pos) => unique[pos] = order,
            None => {
                index.insert(order.id.clone(), unique.len());
                unique.push(order);
            }
        }
    }

    unique
}
