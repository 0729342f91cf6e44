use crate::utils::error::{OrderError, Result};
use rust_decimal::Decimal;

/// 全有或全無的餘額檢查：整批總額超過餘額就不送出任何一行
pub fn check(required: Decimal, balance: Decimal) -> Result<()> {
    if balance < required {
        let shortfall = required - balance;
        tracing::warn!(
            "💸 Insufficient balance: {} < {} (short {})",
            balance,
            required,
            shortfall
        );
        return Err(OrderError::InsufficientBalance {
            balance,
            required,
            shortfall,
        });
    }
    Ok(())
}
