//! Request/response types exchanged with the retail backend
//!
//! These are the bodies the client sends and receives; the read models
//! (branches, products, orders) live in [`crate::models`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{DraftOrder, UserInfo};

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Message the backend sends on a successful login
pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful";

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    #[serde(default)]
    pub user: Option<UserInfo>,
    #[serde(default)]
    pub token: Option<String>,
}

impl LoginResponse {
    pub fn is_success(&self) -> bool {
        self.message == LOGIN_SUCCESS_MESSAGE
    }
}

// =============================================================================
// Payment API DTOs
// =============================================================================

/// Links a payment back to the draft order that started it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMetadata {
    /// Transaction reference of the draft order
    pub order_id: String,
    pub user_id: String,
    pub branch_id: String,
    pub product_id: String,
    pub quantity: u32,
}

/// `POST /api/payments/initiate` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub tx_ref: String,
    pub metadata: PaymentMetadata,
    pub return_url: String,
    pub callback_url: String,
}

impl PaymentRequest {
    /// Build the payment request for a draft order.
    ///
    /// The amount is the draft's total as computed at confirmation.
    pub fn for_draft(
        draft: &DraftOrder,
        user: &UserInfo,
        return_url: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            amount: draft.total_price,
            email: draft.user_email.clone(),
            first_name: user.first_name().to_string(),
            last_name: user.last_name().to_string(),
            tx_ref: draft.tx_ref.clone(),
            metadata: PaymentMetadata {
                order_id: draft.tx_ref.clone(),
                user_id: draft.user_id.clone(),
                branch_id: draft.branch_id.clone(),
                product_id: draft.product_id.clone(),
                quantity: draft.quantity,
            },
            return_url: return_url.into(),
            callback_url: callback_url.into(),
        }
    }
}

/// `POST /api/payments/initiate` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInitiation {
    pub checkout_url: String,
}
