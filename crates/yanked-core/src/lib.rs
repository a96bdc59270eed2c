use error::YankedError;

pub mod constants;
pub mod error;
pub mod manager;
pub mod package;
pub mod store;

pub use manager::{PackageManager, Settings};

pub type YankedResult<T> = std::result::Result<T, YankedError>;
