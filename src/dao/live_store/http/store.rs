use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde_json::{Map, Value, json};

use super::{
    config::LiveConfig,
    error::{LiveDaoError, LiveResult},
};
use crate::dao::{live_store::LiveStore, storage::StorageResult};

/// HTTP-backed live store. Every tree path maps to `<base>/<path>.json`;
/// `PUT` overwrites a subtree, `PATCH` merges children, and increments are
/// resolved server-side through the `.sv` sentinel so concurrent deltas
/// commute.
#[derive(Clone)]
pub struct HttpLiveStore {
    client: Client,
    base_url: Arc<str>,
    auth_token: Option<Arc<str>>,
}

impl HttpLiveStore {
    /// Build the client and verify the store answers at the root.
    pub async fn connect(config: LiveConfig) -> LiveResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| LiveDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            auth_token: config.auth_token.map(Arc::from),
        };

        store.ping().await?;
        Ok(store)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}.json", self.base_url, path);
        let builder = self.client.request(method, url);
        if let Some(ref token) = self.auth_token {
            builder.query(&[("auth", token.as_ref())])
        } else {
            builder
        }
    }

    async fn ping(&self) -> LiveResult<()> {
        // Shallow root read is the cheapest probe the REST dialect offers.
        let response = self
            .request(Method::GET, "")
            .query(&[("shallow", "true")])
            .send()
            .await
            .map_err(|source| LiveDaoError::RequestSend {
                path: "/".into(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(LiveDaoError::RequestStatus {
                path: "/".into(),
                status: response.status(),
            })
        }
    }

    async fn get_value(&self, path: &str) -> LiveResult<Option<Value>> {
        let response = self
            .request(Method::GET, path)
            .send()
            .await
            .map_err(|source| LiveDaoError::RequestSend {
                path: path.to_owned(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let value =
                    response
                        .json::<Value>()
                        .await
                        .map_err(|source| LiveDaoError::DecodeResponse {
                            path: path.to_owned(),
                            source,
                        })?;
                // The store answers `null` for absent paths.
                Ok((!value.is_null()).then_some(value))
            }
            other => Err(LiveDaoError::RequestStatus {
                path: path.to_owned(),
                status: other,
            }),
        }
    }

    async fn write_value(&self, method: Method, path: &str, body: &Value) -> LiveResult<()> {
        let response = self
            .request(method, path)
            .json(body)
            .send()
            .await
            .map_err(|source| LiveDaoError::RequestSend {
                path: path.to_owned(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(LiveDaoError::RequestStatus {
                path: path.to_owned(),
                status: response.status(),
            })
        }
    }
}

impl LiveStore for HttpLiveStore {
    fn get(&self, path: String) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let store = self.clone();
        Box::pin(async move { store.get_value(&path).await.map_err(Into::into) })
    }

    fn set(&self, path: String, value: Value) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            // A null PUT deletes the subtree, which DELETE also does; PUT
            // keeps a single write verb for both shapes.
            store
                .write_value(Method::PUT, &path, &value)
                .await
                .map_err(Into::into)
        })
    }

    fn update(
        &self,
        path: String,
        entries: Map<String, Value>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .write_value(Method::PATCH, &path, &Value::Object(entries))
                .await
                .map_err(Into::into)
        })
    }

    fn increment(&self, path: String, delta: i64) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let sentinel = json!({".sv": {"increment": delta}});
            store
                .write_value(Method::PUT, &path, &sentinel)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}
