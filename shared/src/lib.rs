//! Shared types for the retail client
//!
//! Wire models, money arithmetic, field validators and the role
//! navigation model. Nothing in this crate performs I/O.

pub mod client;
pub mod models;
pub mod money;
pub mod navigation;
pub mod validation;

// Re-exports
pub use rust_decimal::Decimal;
pub use serde::{Deserialize, Serialize};

pub use models::{Branch, DraftOrder, ManagerRef, Order, Product, ProductStatus, Role, UserInfo};
pub use validation::FieldError;
