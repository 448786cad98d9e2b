pub mod app_config;
pub mod config;
pub mod html;
pub mod legacy;
pub mod normalize;
pub mod pricing;
pub mod product;
pub mod push;
pub mod title;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use normalize::{normalize_record, NormalizeError, RawRecord};
pub use pricing::PriceSource;
pub use product::NormalizedProduct;
pub use push::{build_product_push, ProductPush};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
