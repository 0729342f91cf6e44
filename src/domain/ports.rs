use crate::domain::model::{CatalogueEntry, OrderRequest, SubmissionReceipt, UserContext};
use crate::utils::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// 依遊戲名稱取得完整套餐目錄
#[async_trait]
pub trait CatalogueService: Send + Sync {
    async fn fetch_catalogue(&self, game_name: &str) -> Result<Vec<CatalogueEntry>>;
}

#[async_trait]
pub trait BalanceService: Send + Sync {
    async fn fetch_balance(&self, ctx: &UserContext) -> Result<Decimal>;
}

/// 建立訂單。業務上的拒絕以 `SubmissionReceipt { success: false, .. }` 回傳，
/// 傳輸層錯誤才回傳 `Err`。
#[async_trait]
pub trait OrderService: Send + Sync {
    async fn submit_order(
        &self,
        ctx: &UserContext,
        request: &OrderRequest,
    ) -> Result<SubmissionReceipt>;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn request_timeout_seconds(&self) -> u64;
    fn submission_timeout_seconds(&self) -> Option<u64>;
    fn catalogue_limit(&self) -> usize;
    fn extra_headers(&self) -> Vec<(String, String)>;
}
