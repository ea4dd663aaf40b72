//! Common utilities shared across the application

pub mod http_client;
pub mod url;

pub use http_client::IconHttpClient;
pub use url::UrlUtils;
