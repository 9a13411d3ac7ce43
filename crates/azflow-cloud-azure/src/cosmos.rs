//! Cosmos DB REST client
//!
//! Direct data plane implementation for database and collection creation.
//! Requests are signed with the account master key.

use crate::error::{AzureError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;

/// Default value of the `x-ms-version` header
pub const DEFAULT_API_VERSION: &str = "2018-12-31";

type HmacSha256 = Hmac<Sha256>;

/// Cosmos DB data plane client bound to one account
pub struct CosmosClient {
    client: reqwest::Client,
    endpoint: String,
    key: Vec<u8>,
    api_version: String,
}

impl CosmosClient {
    /// Create a client from an account endpoint and its base64 master key
    pub fn new(endpoint: &str, master_key: &str) -> Result<Self> {
        let key = STANDARD
            .decode(master_key.trim())
            .map_err(|e| AzureError::InvalidKey(e.to_string()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key,
            api_version: DEFAULT_API_VERSION.to_string(),
        })
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Create a database. Returns `false` when it already exists.
    pub async fn create_database(&self, database_id: &str) -> Result<bool> {
        self.create_resource("dbs", "dbs", "", json!({ "id": database_id }), None)
            .await
    }

    /// Create a collection with fixed throughput. Returns `false` when it already exists.
    pub async fn create_collection(
        &self,
        database_id: &str,
        collection_id: &str,
        throughput: u32,
    ) -> Result<bool> {
        let path = format!("dbs/{}/colls", database_id);
        let link = format!("dbs/{}", database_id);
        self.create_resource(
            &path,
            "colls",
            &link,
            json!({ "id": collection_id }),
            Some(throughput),
        )
        .await
    }

    async fn create_resource(
        &self,
        path: &str,
        resource_type: &str,
        resource_link: &str,
        body: serde_json::Value,
        throughput: Option<u32>,
    ) -> Result<bool> {
        let url = format!("{}/{}", self.endpoint, path);
        let date = rfc1123_now();
        let authorization = sign(&self.key, "POST", resource_type, resource_link, &date)?;

        tracing::debug!("POST {}", url);

        let mut request = self
            .client
            .post(&url)
            .header("authorization", authorization)
            .header("x-ms-date", &date)
            .header("x-ms-version", &self.api_version)
            .json(&body);

        if let Some(throughput) = throughput {
            request = request.header("x-ms-offer-throughput", throughput.to_string());
        }

        let response = request.send().await?;
        let status = response.status();

        match status {
            StatusCode::CREATED | StatusCode::OK => Ok(true),
            StatusCode::CONFLICT => Ok(false),
            _ => {
                let text = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&text)
                    .map(|e| e.message)
                    .unwrap_or(text);
                Err(AzureError::CosmosApi {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

fn rfc1123_now() -> String {
    chrono::Utc::now()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Master key authorization token for one request
fn sign(
    key: &[u8],
    verb: &str,
    resource_type: &str,
    resource_link: &str,
    date: &str,
) -> Result<String> {
    let payload = format!(
        "{}\n{}\n{}\n{}\n\n",
        verb.to_lowercase(),
        resource_type.to_lowercase(),
        resource_link,
        date.to_lowercase()
    );

    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| AzureError::InvalidKey(e.to_string()))?;
    mac.update(payload.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    let token = format!("type=master&ver=1.0&sig={}", signature);
    Ok(urlencoding::encode(&token).into_owned())
}
