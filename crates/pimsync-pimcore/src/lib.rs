pub mod client;
pub mod error;
pub mod retry;
pub mod types;

pub use client::PimcoreClient;
pub use error::PimcoreError;
pub use types::RawRecord;
