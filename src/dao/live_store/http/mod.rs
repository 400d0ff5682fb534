//! HTTP implementation of the live-store contract, speaking the REST dialect
//! of a realtime JSON tree store.

mod error;
pub mod config;
pub mod store;

pub use config::LiveConfig;
pub use error::LiveDaoError;
pub use store::HttpLiveStore;

use crate::dao::storage::StorageError;

impl From<LiveDaoError> for StorageError {
    fn from(err: LiveDaoError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}
