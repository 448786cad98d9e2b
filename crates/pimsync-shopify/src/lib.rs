pub mod client;
pub mod error;
pub mod retry;
pub mod types;

pub use client::{ShopifyClient, UpsertOutcome};
pub use error::ShopifyError;
