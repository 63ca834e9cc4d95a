//! Editable grid model for previewing query results.
//!
//! `store` holds the cells and change notifications; `populate` turns a
//! materialized result into grid content.

mod populate;
mod store;

pub use populate::{capitalize_first, populate, HeaderPolicy};
pub use store::{GridEvent, GridStore, SubscriptionId};
