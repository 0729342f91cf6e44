use crate::core::resolver::CatalogueResolver;
use crate::core::{balance_guard, parser, pricing};
use crate::domain::model::{
    BatchStage, CatalogueEntry, LineFailure, OrderRequest, OrderResult, OrderSummary,
    ResolvedOrder, UserContext,
};
use crate::domain::ports::{BalanceService, CatalogueService, OrderService};
use crate::utils::error::{OrderError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// 訂單流程：解析 → 解析代碼 → 計價 → 餘額檢查 → 逐行送出 → 彙總
pub struct OrderOrchestrator<C, B, O> {
    catalogue: C,
    balance: B,
    orders: O,
    submission_timeout: Option<Duration>,
    in_flight: Mutex<()>,
}

impl<C, B, O> OrderOrchestrator<C, B, O>
where
    C: CatalogueService,
    B: BalanceService,
    O: OrderService,
{
    pub fn new(catalogue: C, balance: B, orders: O) -> Self {
        Self {
            catalogue,
            balance,
            orders,
            submission_timeout: None,
            in_flight: Mutex::new(()),
        }
    }

    /// 單筆送出的逾時；逾時只算該行失敗，不中止整批
    pub fn with_submission_timeout(mut self, timeout: Duration) -> Self {
        self.submission_timeout = Some(timeout);
        self
    }

    /// 解析並驗證整段指令。任何一行有找不到的代碼就整批拒絕。
    pub async fn parse_and_validate(
        &self,
        raw_text: &str,
        game_name: &str,
    ) -> Result<Vec<ResolvedOrder>> {
        let orders = self.preview(raw_text, game_name).await?;
        ensure_all_resolved(&orders).inspect_err(log_rejection)?;
        Ok(orders)
    }

    /// 與 `parse_and_validate` 相同，但保留無效的訂單供驗證報告使用
    pub async fn preview(&self, raw_text: &str, game_name: &str) -> Result<Vec<ResolvedOrder>> {
        enter(BatchStage::Parsing);
        let lines = parser::parse_command(raw_text).inspect_err(log_rejection)?;

        enter(BatchStage::Resolving);
        CatalogueResolver::new(&self.catalogue)
            .resolve_lines(&lines, game_name)
            .await
            .inspect_err(log_rejection)
    }

    /// 送出已驗證的訂單。送出前的拒絕不會產生任何訂單；
    /// 送出階段的失敗只影響該行。
    pub async fn submit_batch(
        &self,
        orders: &[ResolvedOrder],
        game_name: &str,
        ctx: &UserContext,
    ) -> Result<OrderSummary> {
        let _batch = self
            .in_flight
            .try_lock()
            .map_err(|_| OrderError::BatchInProgress)?;
        let started_at = Utc::now();
        let clock = Instant::now();

        if orders.is_empty() {
            return Err(OrderError::EmptyCommand);
        }
        ensure_all_resolved(orders).inspect_err(log_rejection)?;

        enter(BatchStage::PricingCheck);
        let total_cost = pricing::batch_total(orders);
        tracing::info!("💎 {} order(s), total cost {} XCN", orders.len(), total_cost);

        enter(BatchStage::BalanceCheck);
        let balance = self
            .balance
            .fetch_balance(ctx)
            .await
            .inspect_err(log_rejection)?;
        balance_guard::check(total_cost, balance).inspect_err(log_rejection)?;

        enter(BatchStage::Submitting);
        let batch_id = format!("{}-{}", ctx.user_id, started_at.timestamp_millis());
        let mut results = Vec::with_capacity(orders.len());
        for (index, order) in orders.iter().enumerate() {
            let key = format!("{}-{}", batch_id, index + 1);
            results.push(self.submit_line(ctx, game_name, order, key).await);
        }

        enter(BatchStage::Summarizing);
        let summary = summarize(
            game_name,
            results,
            total_cost,
            balance,
            started_at,
            clock.elapsed(),
        );
        enter(BatchStage::Done);
        tracing::info!(
            "✅ Batch done: {}/{} succeeded, debited {} XCN, new balance {} XCN",
            summary.success_count,
            summary.results.len(),
            summary.total_debited,
            summary.new_balance
        );
        Ok(summary)
    }

    pub async fn process(
        &self,
        raw_text: &str,
        game_name: &str,
        ctx: &UserContext,
    ) -> Result<OrderSummary> {
        let orders = self.parse_and_validate(raw_text, game_name).await?;
        self.submit_batch(&orders, game_name, ctx).await
    }

    pub async fn balance(&self, ctx: &UserContext) -> Result<Decimal> {
        self.balance.fetch_balance(ctx).await
    }

    pub async fn catalogue(&self, game_name: &str) -> Result<Vec<CatalogueEntry>> {
        self.catalogue.fetch_catalogue(game_name).await
    }

    async fn submit_line(
        &self,
        ctx: &UserContext,
        game_name: &str,
        order: &ResolvedOrder,
        idempotency_key: String,
    ) -> OrderResult {
        let request = OrderRequest {
            player_id: order.line.player_id.clone(),
            identifier: order.line.identifier.clone(),
            game_name: game_name.to_string(),
            package_codes: order.found_packages.iter().map(|p| p.code.clone()).collect(),
            package_ids: order.found_packages.iter().map(|p| p.id.clone()).collect(),
            idempotency_key,
        };
        tracing::debug!(
            "📤 Submitting {} package(s) for player {} ({})",
            request.package_codes.len(),
            request.player_id,
            request.idempotency_key
        );

        let outcome = match self.submission_timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.orders.submit_order(ctx, &request)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(OrderError::SubmissionTimeout { timeout: limit }),
                }
            }
            None => self.orders.submit_order(ctx, &request).await,
        };

        let mut result = OrderResult {
            line: order.line.clone(),
            packages: order.found_packages.clone(),
            success: false,
            order_id: None,
            cost: order.total_cost,
            error: None,
            failure: None,
        };

        match outcome {
            Ok(receipt) if receipt.success => {
                result.success = true;
                result.order_id = receipt.order_id;
            }
            Ok(receipt) => {
                result.failure = Some(LineFailure::SubmissionFailed);
                result.error = Some(
                    receipt
                        .error
                        .unwrap_or_else(|| "Order was rejected".to_string()),
                );
            }
            Err(err) => {
                let timed_out = match &err {
                    OrderError::SubmissionTimeout { .. } => true,
                    OrderError::ApiError(e) => e.is_timeout(),
                    _ => false,
                };
                result.failure = Some(if timed_out {
                    LineFailure::SubmissionTimeout
                } else {
                    LineFailure::SubmissionFailed
                });
                result.error = Some(err.to_string());
            }
        }

        if result.success {
            tracing::debug!("🆔 Player {} order {:?}", result.line.player_id, result.order_id);
        } else {
            tracing::warn!(
                "❌ Order for player {} failed: {}",
                result.line.player_id,
                result.error.as_deref().unwrap_or_default()
            );
        }
        result
    }
}

/// 只扣除成功行的金額
pub fn summarize(
    game_name: &str,
    results: Vec<OrderResult>,
    total_cost: Decimal,
    old_balance: Decimal,
    started_at: DateTime<Utc>,
    elapsed: Duration,
) -> OrderSummary {
    let total_debited: Decimal = results.iter().filter(|r| r.success).map(|r| r.cost).sum();
    let success_count = results.iter().filter(|r| r.success).count();
    let failure_count = results.len() - success_count;

    OrderSummary {
        game_name: game_name.to_string(),
        results,
        total_cost,
        total_debited,
        old_balance,
        new_balance: old_balance - total_debited,
        success_count,
        failure_count,
        started_at,
        elapsed,
    }
}

fn ensure_all_resolved(orders: &[ResolvedOrder]) -> Result<()> {
    match orders.iter().find(|order| !order.is_valid()) {
        Some(order) => Err(OrderError::PackagesNotFound {
            line: order.line.raw_text.clone(),
            codes: order
                .not_found_codes
                .iter()
                .map(|code| code.as_str().to_string())
                .collect(),
        }),
        None => Ok(()),
    }
}

fn enter(stage: BatchStage) {
    tracing::info!("🔄 Batch stage: {}", stage);
}

fn log_rejection(err: &OrderError) {
    tracing::warn!("⛔ Batch rejected at {}: {}", err.stage(), err);
}
