use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 使用者輸入的一行訂單：`PLAYER_ID IDENTIFIER CODE1+CODE2`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub player_id: String,
    pub identifier: String,
    pub raw_package_codes: String,
    pub raw_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageCode(String);

impl PackageCode {
    /// 修剪後為空的代碼回傳 None
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub line: OrderLine,
    pub codes: Vec<PackageCode>,
}

/// 目錄中的一個套餐，欄位名稱沿用後端 API 的 camelCase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueEntry {
    pub id: String,
    #[serde(rename = "vendorPackageCode", default)]
    pub code: String,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub game_name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub resell_keyword: Option<String>,
}

impl CatalogueEntry {
    pub fn matches(&self, code: &PackageCode) -> bool {
        self.resell_keyword.as_deref() == Some(code.as_str())
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOrder {
    pub line: OrderLine,
    pub found_packages: Vec<CatalogueEntry>,
    pub not_found_codes: Vec<PackageCode>,
    pub total_cost: Decimal,
}

impl ResolvedOrder {
    pub fn is_valid(&self) -> bool {
        self.not_found_codes.is_empty()
    }

    pub fn requested_count(&self) -> usize {
        self.found_packages.len() + self.not_found_codes.len()
    }
}

/// 呼叫端明確傳入的使用者身分，取代 UI 層的全域餘額狀態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
    pub access_token: Option<String>,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub player_id: String,
    pub identifier: String,
    pub game_name: String,
    pub package_codes: Vec<String>,
    pub package_ids: Vec<String>,
    pub idempotency_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub success: bool,
    pub order_id: Option<String>,
    pub error: Option<String>,
}

impl SubmissionReceipt {
    pub fn accepted(order_id: impl Into<String>) -> Self {
        Self {
            success: true,
            order_id: Some(order_id.into()),
            error: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            order_id: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineFailure {
    SubmissionTimeout,
    SubmissionFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderResult {
    pub line: OrderLine,
    pub packages: Vec<CatalogueEntry>,
    pub success: bool,
    pub order_id: Option<String>,
    pub cost: Decimal,
    pub error: Option<String>,
    pub failure: Option<LineFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub game_name: String,
    pub results: Vec<OrderResult>,
    pub total_cost: Decimal,
    pub total_debited: Decimal,
    pub old_balance: Decimal,
    pub new_balance: Decimal,
    pub success_count: usize,
    pub failure_count: usize,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl OrderSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failure_count == 0
    }

    pub fn successful(&self) -> impl Iterator<Item = &OrderResult> {
        self.results.iter().filter(|r| r.success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &OrderResult> {
        self.results.iter().filter(|r| !r.success)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatchStage {
    Parsing,
    Resolving,
    PricingCheck,
    BalanceCheck,
    Submitting,
    Summarizing,
    Done,
    Rejected,
}

impl fmt::Display for BatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BatchStage::Parsing => "parsing",
            BatchStage::Resolving => "resolving",
            BatchStage::PricingCheck => "pricing",
            BatchStage::BalanceCheck => "balance-check",
            BatchStage::Submitting => "submitting",
            BatchStage::Summarizing => "summarizing",
            BatchStage::Done => "done",
            BatchStage::Rejected => "rejected",
        };
        f.write_str(name)
    }
}
