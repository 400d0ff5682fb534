//! Shared application state: installed store handles and the degraded flag.

pub mod machine;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig,
    dao::{live_store::LiveStore, record_store::RecordStore},
    error::ServiceError,
};

/// Cheaply cloneable handle on the application state.
pub type SharedState = Arc<AppState>;

/// Which of the two stores a supervisor manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreSlot {
    /// The durable record store.
    Record,
    /// The volatile live store.
    Live,
}

/// Central application state storing the two store handles.
///
/// Either store may be absent while its supervisor reconnects; the service is
/// degraded until both are installed.
pub struct AppState {
    config: AppConfig,
    record_store: RwLock<Option<Arc<dyn RecordStore>>>,
    live_store: RwLock<Option<Arc<dyn LiveStore>>>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until both stores are installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            record_store: RwLock::new(None),
            live_store: RwLock::new(None),
            degraded: degraded_tx,
        })
    }

    /// Runtime configuration knobs.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the record store, if one is installed.
    pub async fn record_store(&self) -> Option<Arc<dyn RecordStore>> {
        let guard = self.record_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain a handle to the live store, if one is installed.
    pub async fn live_store(&self) -> Option<Arc<dyn LiveStore>> {
        let guard = self.live_store.read().await;
        guard.as_ref().cloned()
    }

    /// Record store handle or a degraded-mode error.
    pub async fn require_record_store(&self) -> Result<Arc<dyn RecordStore>, ServiceError> {
        self.record_store().await.ok_or(ServiceError::Degraded)
    }

    /// Live store handle or a degraded-mode error.
    pub async fn require_live_store(&self) -> Result<Arc<dyn LiveStore>, ServiceError> {
        self.live_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install the record store implementation.
    pub async fn set_record_store(&self, store: Arc<dyn RecordStore>) {
        {
            let mut guard = self.record_store.write().await;
            *guard = Some(store);
        }
        self.refresh_degraded().await;
    }

    /// Install the live store implementation.
    pub async fn set_live_store(&self, store: Arc<dyn LiveStore>) {
        {
            let mut guard = self.live_store.write().await;
            *guard = Some(store);
        }
        self.refresh_degraded().await;
    }

    /// Drop the handle in `slot`, entering degraded mode.
    pub async fn clear_store(&self, slot: StoreSlot) {
        match slot {
            StoreSlot::Record => {
                let mut guard = self.record_store.write().await;
                guard.take();
            }
            StoreSlot::Live => {
                let mut guard = self.live_store.write().await;
                guard.take();
            }
        }
        self.refresh_degraded().await;
    }

    /// Whether either store handle is currently missing.
    pub async fn is_degraded(&self) -> bool {
        self.record_store().await.is_none() || self.live_store().await.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Broadcast the degraded flag when the value changes.
    async fn refresh_degraded(&self) {
        let value = self.is_degraded().await;
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::{live_store::memory::MemoryLiveStore, record_store::memory::MemoryRecordStore};

    #[tokio::test]
    async fn degraded_until_both_stores_installed() {
        let state = AppState::new(AppConfig::default());
        assert!(state.is_degraded().await);

        state
            .set_record_store(Arc::new(MemoryRecordStore::new()))
            .await;
        assert!(state.is_degraded().await);

        state.set_live_store(Arc::new(MemoryLiveStore::new())).await;
        assert!(!state.is_degraded().await);

        state.clear_store(StoreSlot::Live).await;
        assert!(state.is_degraded().await);
        assert!(matches!(
            state.require_live_store().await,
            Err(ServiceError::Degraded)
        ));
    }
}
