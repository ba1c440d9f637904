//! Registration store backed by the service's HTTP surface.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::json;

use crate::registrations::store::{RegistrationStore, StoreError};
use crate::registrations::types::{normalize_address, RegistrationRecord};

/// Talks to `/registrations` on a running deposit-desk service.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self) -> String {
        format!("{}/registrations", self.base_url)
    }
}

fn remote(e: reqwest::Error) -> StoreError {
    StoreError::Remote(e.to_string())
}

async fn ensure_success(res: Response) -> Result<Response, StoreError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(StoreError::Remote(format!("service returned {}: {}", status, body)))
}

#[async_trait]
impl RegistrationStore for HttpStore {
    async fn get_all(&self) -> Result<Vec<RegistrationRecord>, StoreError> {
        let res = self.client.get(self.url()).send().await.map_err(remote)?;
        ensure_success(res).await?.json().await.map_err(remote)
    }

    async fn get_by_key(&self, address: &str) -> Result<Option<RegistrationRecord>, StoreError> {
        let url = format!("{}/{}", self.url(), normalize_address(address));
        let res = self.client.get(url).send().await.map_err(remote)?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let record = ensure_success(res).await?.json().await.map_err(remote)?;
        Ok(Some(record))
    }

    async fn upsert(&self, record: RegistrationRecord) -> Result<(), StoreError> {
        let res = self
            .client
            .post(self.url())
            .json(&record)
            .send()
            .await
            .map_err(remote)?;
        ensure_success(res).await?;
        Ok(())
    }

    async fn delete_by_key(&self, address: &str) -> Result<(), StoreError> {
        let res = self
            .client
            .delete(self.url())
            .json(&json!({ "walletAddress": address }))
            .send()
            .await
            .map_err(remote)?;
        ensure_success(res).await?;
        Ok(())
    }
}
