use super::successful_data;
use crate::config::{Credentials, ProviderConfig};
use crate::error::ApiError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde_json::{Map, Value};
use sha2::Sha512;
use std::time::Duration;

type HmacSha512 = Hmac<Sha512>;

/// Signed account endpoints used by the portfolio digest
#[async_trait]
pub trait Account: Send + Sync {
    /// `data` of `/info/balance` for every currency
    async fn balances(&self) -> Result<Map<String, Value>, ApiError>;

    /// Completed fills for one market, newest first as the provider sends them
    async fn user_transactions(
        &self,
        order_currency: &str,
        payment_currency: &str,
    ) -> Result<Vec<Value>, ApiError>;
}

/// Client for the signed (private) Bithumb REST API
#[derive(Clone)]
pub struct BithumbPrivateClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl BithumbPrivateClient {
    pub fn new(config: &ProviderConfig, credentials: &Credentials) -> Result<Self, ApiError> {
        let (api_key, api_secret) = credentials
            .pair()
            .ok_or_else(|| ApiError::MissingCredentials("/info/*".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
        })
    }

    /// `base64(hex(HMAC-SHA512(secret, endpoint \0 body \0 nonce)))`
    fn sign(&self, endpoint: &str, body: &str, nonce: &str) -> String {
        let mut mac = HmacSha512::new_from_slice(self.api_secret.as_bytes())
            .expect("HMAC key can be any size");
        mac.update(format!("{}\0{}\0{}", endpoint, body, nonce).as_bytes());
        STANDARD.encode(hex::encode(mac.finalize().into_bytes()))
    }

    /// Form body carrying the endpoint itself plus `params`
    fn form_body(endpoint: &str, params: &[(&str, &str)]) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("endpoint", endpoint)
            .extend_pairs(params.iter().copied())
            .finish()
    }

    /// Signed POST; returns the `data` member of a successful response
    pub async fn post(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value, ApiError> {
        let body = Self::form_body(endpoint, params);
        let nonce = Utc::now().timestamp_millis().to_string();
        let signature = self.sign(endpoint, &body, &nonce);

        let response = self
            .client
            .post(format!("{}{}", self.base_url, endpoint))
            .header("Api-Key", &self.api_key)
            .header("Api-Sign", signature)
            .header("Api-Nonce", &nonce)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("accept", "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::Http {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await.map_err(|e| ApiError::Payload {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        successful_data(endpoint, &payload).cloned()
    }

    pub async fn account_info(&self, order_currency: &str, payment_currency: &str) -> Result<Value, ApiError> {
        self.post(
            "/info/account",
            &[
                ("order_currency", order_currency),
                ("payment_currency", payment_currency),
            ],
        )
        .await
    }

    pub async fn balance(&self, currency: &str) -> Result<Value, ApiError> {
        self.post("/info/balance", &[("currency", currency)]).await
    }

    /// Member ticker info (fee rates and 24h stats for the account)
    pub async fn ticker_info(&self, order_currency: &str, payment_currency: &str) -> Result<Value, ApiError> {
        self.post(
            "/info/ticker",
            &[
                ("order_currency", order_currency),
                ("payment_currency", payment_currency),
            ],
        )
        .await
    }

    /// Open orders
    pub async fn orders(&self, order_currency: &str) -> Result<Value, ApiError> {
        self.post("/info/orders", &[("order_currency", order_currency)])
            .await
    }

    pub async fn order_detail(&self, order_id: &str, order_currency: &str) -> Result<Value, ApiError> {
        self.post(
            "/info/order_detail",
            &[("order_id", order_id), ("order_currency", order_currency)],
        )
        .await
    }
}

#[async_trait]
impl Account for BithumbPrivateClient {
    async fn balances(&self) -> Result<Map<String, Value>, ApiError> {
        match self.balance("ALL").await? {
            Value::Object(map) => Ok(map),
            _ => Err(ApiError::Payload {
                endpoint: "/info/balance".to_string(),
                reason: "balance data is not an object".to_string(),
            }),
        }
    }

    async fn user_transactions(
        &self,
        order_currency: &str,
        payment_currency: &str,
    ) -> Result<Vec<Value>, ApiError> {
        let data = self
            .post(
                "/info/user_transactions",
                &[
                    ("order_currency", order_currency),
                    ("payment_currency", payment_currency),
                ],
            )
            .await?;

        match data {
            Value::Array(rows) => Ok(rows),
            _ => Err(ApiError::Payload {
                endpoint: "/info/user_transactions".to_string(),
                reason: "transaction data is not an array".to_string(),
            }),
        }
    }
}
