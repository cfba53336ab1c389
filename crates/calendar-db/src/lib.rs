pub mod config;
pub mod error;
pub mod query;
pub mod rest;
pub mod schema;

use std::future::Future;

use calendar_types::{Category, Event, NewEvent};

pub use config::StoreConfig;
pub use error::{ApiError, ErrorKind, StoreError};
pub use query::EventQuery;
pub use rest::RestStore;

/// Operations the setup tool needs from the hosted events store.
///
/// [`RestStore`] talks to the real service. Every call is a single remote
/// round trip; callers sequence them.
pub trait EventStore {
    /// Runs one DDL statement through the store's SQL function.
    fn execute_sql(&self, sql: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn select_events(
        &self,
        query: &EventQuery,
    ) -> impl Future<Output = Result<Vec<Event>, StoreError>> + Send;

    /// Inserts all rows in one request. Returns how many rows the store
    /// reports as written.
    fn insert_events(
        &self,
        events: &[NewEvent],
    ) -> impl Future<Output = Result<usize, StoreError>> + Send;

    /// Exact row count, optionally restricted to one category.
    fn count_events(
        &self,
        category: Option<Category>,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;
}
