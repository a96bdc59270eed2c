pub mod error;
pub mod http;
pub mod http_client;
pub mod traits;

pub use http::Http;
pub use traits::Fetcher;
