pub mod catalog;
pub mod executor;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod postgres;
pub mod queries;
pub mod store;

pub use catalog::Catalog;
pub use executor::{QueryExecutor, RetryPolicy};
#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryStore;
pub use postgres::{create_pool, PgConnectionSource};
pub use store::{ConnectionSource, Param, Query, Row, StoreConnection};
