/// Live-store contract and backends.
pub mod live_store;
/// Shared persistence model definitions.
pub mod models;
/// Record-store contract and backends.
pub mod record_store;
/// Storage abstraction layer for database operations.
pub mod storage;
