//! Data providers and ingestion

pub mod canonicalize;
pub mod csv_import;
pub mod provider;
pub mod retry;
pub mod yahoo;

pub use canonicalize::{canonicalize, Canonicalized};
pub use csv_import::CsvProvider;
pub use provider::{DataError, DataProvider, DataSource, FetchRequest, FetchResult, RawBar};
pub use retry::RetryingProvider;
pub use yahoo::YahooProvider;
