//! Client for the ViSearch visual search API
//!
//! Responses from every endpoint are normalized into a single
//! [`PagedSearchResult`], and every call returns a [`SearchOutcome`] instead of
//! an error.
//!
//! ```no_run
//! use visearch_client::{SearchParams, ViSearchClient, ViSearchConfig};
//!
//! # async fn run() -> visearch_client::Result<()> {
//! let config = ViSearchConfig::with_keys("access", "secret").from_env();
//! let client = ViSearchClient::new(&config)?;
//!
//! match client.search(&SearchParams::new("red-shoe")).await.into_result() {
//!     Ok(result) => println!("{} matches", result.items().len()),
//!     Err(failure) => eprintln!("search failed: {}", failure.message()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod search;

pub use config::{LoggingConfig, ResponseConfig, ViSearchConfig};
pub use error::{Result, SearchError};
pub use search::*;
