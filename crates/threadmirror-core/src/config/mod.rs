//! Configuration schema and loading.

mod loader;
mod schema;

pub use schema::{
    Config, DeliverySection, LoggingSection, MappingSection, RelaySection, RouteConfig,
};

/// Environment variable holding the transport API token.
pub const API_TOKEN_ENV: &str = "THREADMIRROR_API_TOKEN";
