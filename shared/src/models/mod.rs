//! Data models
//!
//! Mirrors the JSON the retail backend serves. IDs are the backend's
//! string object ids (`_id` on the wire).

pub mod branch;
pub mod order;
pub mod product;
pub mod role;

// Re-exports
pub use branch::*;
pub use order::*;
pub use product::*;
pub use role::*;
