use crate::domain::model::{CatalogueEntry, OrderRequest, SubmissionReceipt, UserContext};
use crate::domain::ports::{BalanceService, CatalogueService, ConfigProvider, OrderService};
use crate::utils::error::{OrderError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

#[derive(Debug, Deserialize)]
struct PackagesResponse {
    #[serde(default)]
    packages: Vec<CatalogueEntry>,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    #[serde(default)]
    balance: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    order: Option<CreatedOrder>,
    #[serde(default)]
    order_id: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedOrder {
    #[serde(default)]
    id: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderPayload<'a> {
    package_id: String,
    player_id: &'a str,
    identifier: &'a str,
    game_name: &'a str,
    package_code: String,
    player_details: PlayerDetails<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerDetails<'a> {
    player_id: &'a str,
    identifier: &'a str,
    game: &'a str,
}

/// 後端 REST API 的 reqwest 實作，同時提供目錄、餘額與下單三個介面
#[derive(Debug, Clone)]
pub struct HttpStorefrontClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
    catalogue_limit: usize,
    headers: Vec<(String, String)>,
}

impl HttpStorefrontClient {
    pub fn new<C: ConfigProvider>(config: &C) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(config.request_timeout_seconds()),
            catalogue_limit: config.catalogue_limit(),
            headers: config.extra_headers(),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn prepare(&self, mut request: RequestBuilder, ctx: Option<&UserContext>) -> RequestBuilder {
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }
        if let Some(token) = ctx.and_then(|c| c.access_token.as_deref()) {
            request = request.bearer_auth(token);
        }
        request.timeout(self.request_timeout)
    }

    /// 傳輸或讀取回應時逾時都算作送出逾時
    fn submission_error(&self, err: reqwest::Error, context: &str) -> OrderError {
        if err.is_timeout() {
            OrderError::SubmissionTimeout {
                timeout: self.request_timeout,
            }
        } else {
            OrderError::SubmissionFailed {
                message: format!("{}: {}", context, err),
            }
        }
    }

    async fn error_message(response: Response) -> String {
        let status = response.status();
        let body: ErrorBody = response.json().await.unwrap_or_default();
        body.message.unwrap_or_else(|| format!("HTTP {}", status))
    }
}

fn id_to_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl CatalogueService for HttpStorefrontClient {
    async fn fetch_catalogue(&self, game_name: &str) -> Result<Vec<CatalogueEntry>> {
        let unavailable = |message: String| OrderError::CatalogueUnavailable {
            game: game_name.to_string(),
            message,
        };

        let limit = self.catalogue_limit.to_string();
        let request = self
            .client
            .get(self.url("/packages"))
            .query(&[("gameName", game_name), ("limit", limit.as_str())]);

        tracing::debug!("Making catalogue request for {}", game_name);
        let response = self
            .prepare(request, None)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        tracing::debug!("Catalogue response status: {}", response.status());
        if !response.status().is_success() {
            return Err(unavailable(Self::error_message(response).await));
        }

        let body: PackagesResponse = response
            .json()
            .await
            .map_err(|e| unavailable(format!("invalid catalogue response: {}", e)))?;
        Ok(body.packages)
    }
}

#[async_trait]
impl BalanceService for HttpStorefrontClient {
    async fn fetch_balance(&self, ctx: &UserContext) -> Result<Decimal> {
        let unavailable = |message: String| OrderError::BalanceUnavailable { message };

        let request = self.client.get(self.url("/users/balance"));
        let response = self
            .prepare(request, Some(ctx))
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(unavailable(Self::error_message(response).await));
        }

        let body: BalanceResponse = response
            .json()
            .await
            .map_err(|e| unavailable(format!("invalid balance response: {}", e)))?;
        Ok(body.balance.unwrap_or(Decimal::ZERO))
    }
}

#[async_trait]
impl OrderService for HttpStorefrontClient {
    async fn submit_order(
        &self,
        ctx: &UserContext,
        request: &OrderRequest,
    ) -> Result<SubmissionReceipt> {
        let payload = CreateOrderPayload {
            package_id: request.package_ids.join(","),
            player_id: &request.player_id,
            identifier: &request.identifier,
            game_name: &request.game_name,
            package_code: request.package_codes.join(","),
            player_details: PlayerDetails {
                player_id: &request.player_id,
                identifier: &request.identifier,
                game: &request.game_name,
            },
        };

        let builder = self
            .client
            .post(self.url("/transactions/orders"))
            .header(IDEMPOTENCY_HEADER, &request.idempotency_key)
            .json(&payload);

        let response = self
            .prepare(builder, Some(ctx))
            .send()
            .await
            .map_err(|e| self.submission_error(e, "order request failed"))?;

        let status = response.status();
        tracing::debug!("Order response status: {}", status);
        if !status.is_success() {
            return Ok(SubmissionReceipt::rejected(Self::error_message(response).await));
        }

        let body: CreateOrderResponse = response
            .json()
            .await
            .map_err(|e| self.submission_error(e, "invalid order response"))?;

        if !body.success {
            return Ok(SubmissionReceipt::rejected(
                body.message
                    .unwrap_or_else(|| "Order was rejected".to_string()),
            ));
        }

        let order_id = body
            .order
            .and_then(|o| o.id)
            .and_then(id_to_string)
            .or_else(|| body.order_id.and_then(id_to_string));
        Ok(SubmissionReceipt {
            success: true,
            order_id,
            error: None,
        })
    }
}
