//! Background supervision of a store connection with exponential backoff.
//!
//! One supervisor task runs per store slot. While a slot is empty the
//! application serves in degraded mode; the supervisor keeps reconnecting
//! until the handle can be reinstalled.

use std::{future::Future, sync::Arc, time::Duration};

use futures::future::BoxFuture;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{live_store::LiveStore, record_store::RecordStore, storage::StorageError},
    state::{SharedState, StoreSlot},
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// A store handle the supervisor can probe and (re)install into the shared
/// state. Implemented for both store slots so one supervision loop serves
/// them all.
pub trait ManagedStore: Clone + Send + Sync + 'static {
    /// Slot this handle belongs to.
    fn slot(&self) -> StoreSlot;
    /// Cheap liveness probe.
    fn health_check(&self) -> BoxFuture<'static, Result<(), StorageError>>;
    /// Attempt to re-establish connectivity on the existing handle.
    fn try_reconnect(&self) -> BoxFuture<'static, Result<(), StorageError>>;
    /// Publish the handle into the shared state, leaving degraded mode for
    /// this slot.
    fn install(&self, state: SharedState) -> BoxFuture<'static, ()>;
}

impl ManagedStore for Arc<dyn RecordStore> {
    fn slot(&self) -> StoreSlot {
        StoreSlot::Record
    }

    fn health_check(&self) -> BoxFuture<'static, Result<(), StorageError>> {
        RecordStore::health_check(&**self)
    }

    fn try_reconnect(&self) -> BoxFuture<'static, Result<(), StorageError>> {
        RecordStore::try_reconnect(&**self)
    }

    fn install(&self, state: SharedState) -> BoxFuture<'static, ()> {
        let store = self.clone();
        Box::pin(async move { state.set_record_store(store).await })
    }
}

impl ManagedStore for Arc<dyn LiveStore> {
    fn slot(&self) -> StoreSlot {
        StoreSlot::Live
    }

    fn health_check(&self) -> BoxFuture<'static, Result<(), StorageError>> {
        LiveStore::health_check(&**self)
    }

    // The live store client is stateless HTTP; a fresh probe is the reconnect.
    fn try_reconnect(&self) -> BoxFuture<'static, Result<(), StorageError>> {
        LiveStore::health_check(&**self)
    }

    fn install(&self, state: SharedState) -> BoxFuture<'static, ()> {
        let store = self.clone();
        Box::pin(async move { state.set_live_store(store).await })
    }
}

/// Connect to a storage backend, keep it installed while it stays healthy,
/// and drop it back into degraded mode when it is unavailable.
pub async fn run<S, F, Fut>(state: SharedState, mut connect: F)
where
    S: ManagedStore,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<S, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                let slot = store.slot();
                store.install(state.clone()).await;
                info!(?slot, "storage connection established; slot installed");
                delay = INITIAL_DELAY;

                loop {
                    match store.health_check().await {
                        Ok(()) => {
                            sleep(HEALTH_POLL_INTERVAL).await;
                        }
                        Err(_) => {
                            let mut attempt = 0;
                            let mut reconnect_delay = INITIAL_DELAY;
                            let mut reconnected = false;

                            while attempt < MAX_RECONNECT_ATTEMPTS {
                                match store.try_reconnect().await {
                                    Ok(()) => {
                                        info!(
                                            ?slot,
                                            "storage reconnection succeeded after health check failure"
                                        );
                                        reconnected = true;
                                        break;
                                    }
                                    Err(reconnect_err) => {
                                        if attempt == 0 {
                                            warn!(
                                                ?slot, attempt, error = %reconnect_err,
                                                "storage reconnect first attempt failed; entering degraded mode"
                                            );
                                            state.clear_store(slot).await;
                                        } else {
                                            warn!(?slot, attempt, error = %reconnect_err, "storage reconnect attempt failed");
                                        };
                                        attempt += 1;
                                        sleep(reconnect_delay).await;
                                        reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
                                    }
                                }
                            }

                            if reconnected {
                                store.install(state.clone()).await;
                                sleep(HEALTH_POLL_INTERVAL).await;
                                continue;
                            } else {
                                warn!(
                                    ?slot,
                                    "exhausted storage reconnect attempts; staying in degraded mode"
                                );
                                break;
                            }
                        }
                    }
                }

                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}
