use crate::core::resolver;
use crate::domain::model::{CatalogueEntry, OrderSummary, ResolvedOrder};
use crate::utils::error::OrderError;
use rust_decimal::Decimal;
use std::fmt::Write;

const PACKAGES_PER_REGION: usize = 5;

pub fn format_price(amount: Decimal) -> String {
    format!("{:.2} XCN", amount)
}

pub fn format_validation(orders: &[ResolvedOrder]) -> String {
    let valid = orders.iter().filter(|o| o.is_valid()).count();
    let valid_total: Decimal = orders
        .iter()
        .filter(|o| o.is_valid())
        .map(|o| o.total_cost)
        .sum();

    let mut out = String::from("📊 Validation Results:\n\n");
    let _ = writeln!(out, "• Total orders: {}", orders.len());
    let _ = writeln!(out, "• Valid orders: {}", valid);
    let _ = writeln!(out, "• Invalid orders: {}", orders.len() - valid);
    let _ = writeln!(out, "• Total cost: {}\n", format_price(valid_total));

    for (index, order) in orders.iter().enumerate() {
        let status = if order.is_valid() { "✅" } else { "❌" };
        let _ = writeln!(
            out,
            "{} Order {}: {} | {}",
            status,
            index + 1,
            order.line.player_id,
            order.line.identifier
        );
        if !order.found_packages.is_empty() {
            out.push_str("   Found packages:\n");
            for pkg in &order.found_packages {
                let _ = writeln!(
                    out,
                    "   • {} - {} ({})",
                    pkg.code,
                    pkg.name,
                    format_price(pkg.price)
                );
            }
        }
        if !order.not_found_codes.is_empty() {
            let codes: Vec<&str> = order.not_found_codes.iter().map(|c| c.as_str()).collect();
            let _ = writeln!(out, "   ❌ Not found: {}", codes.join(", "));
        }
        if order.is_valid() {
            let _ = writeln!(out, "   💰 Cost: {}", format_price(order.total_cost));
        }
        out.push('\n');
    }
    out
}

pub fn format_summary(summary: &OrderSummary) -> String {
    let total = summary.results.len();
    let mut out = String::new();

    if summary.all_succeeded() {
        let _ = writeln!(out, "✅ All {} order(s) successful!\n", total);
        for (index, order) in summary.results.iter().enumerate() {
            let _ = writeln!(out, "📋 Order {}:", index + 1);
            let _ = writeln!(
                out,
                "👤 Player: {} | {}",
                order.line.player_id, order.line.identifier
            );
            let _ = writeln!(out, "📦 Packages ({}):", order.packages.len());
            for pkg in &order.packages {
                let _ = writeln!(
                    out,
                    "   • {} - {} ({})",
                    pkg.code,
                    pkg.name,
                    format_price(pkg.price)
                );
            }
            let _ = writeln!(out, "💰 Cost: {}", format_price(order.cost));
            let _ = writeln!(
                out,
                "🆔 Order ID: {}\n",
                order.order_id.as_deref().unwrap_or("-")
            );
        }
    } else {
        let _ = writeln!(
            out,
            "⚠️ {}/{} orders successful!\n",
            summary.success_count, total
        );
        if summary.success_count > 0 {
            out.push_str("✅ Successful orders:\n");
            for order in summary.successful() {
                let _ = writeln!(
                    out,
                    "• Player {}: {} packages ({})",
                    order.line.player_id,
                    order.packages.len(),
                    format_price(order.cost)
                );
            }
            out.push('\n');
        }
        out.push_str("❌ Failed orders:\n");
        for order in summary.failed() {
            let _ = writeln!(
                out,
                "• Player {}: {}",
                order.line.player_id,
                order.error.as_deref().unwrap_or("unknown error")
            );
        }
        out.push('\n');
    }

    let _ = writeln!(out, "💳 Total debited: {}", format_price(summary.total_debited));
    let _ = writeln!(out, "💳 New balance: {}", format_price(summary.new_balance));
    let _ = write!(out, "⏱️ Processed in {:.2?}", summary.elapsed);
    out
}

/// 送出前被拒絕時給使用者看的訊息
pub fn format_rejection(err: &OrderError) -> String {
    match err {
        OrderError::InvalidLineFormat { line } => format!(
            "❌ Invalid format in: \"{}\"\nPlease use: \"PLAYER_ID IDENTIFIER PACKAGE_CODE\"",
            line
        ),
        OrderError::NoPackageCodes { line } => {
            format!("❌ No valid package codes found in: \"{}\"", line)
        }
        OrderError::PackagesNotFound { line, codes } => format!(
            "❌ Some packages not found in order: \"{}\"\n\n❌ Not found: {}",
            line,
            codes.join(", ")
        ),
        OrderError::InsufficientBalance {
            balance,
            required,
            shortfall,
        } => format!(
            "❌ Insufficient balance for all orders!\n\n💰 Your balance: {}\n💎 Total cost: {}\n📉 Shortfall: {}",
            format_price(*balance),
            format_price(*required),
            format_price(*shortfall)
        ),
        other => format!("❌ Order failed: {}", other.user_friendly_message()),
    }
}

pub fn format_catalogue(game_name: &str, entries: &[CatalogueEntry], balance: Option<Decimal>) -> String {
    if entries.is_empty() {
        return format!("No packages available for {} right now.", game_name);
    }

    let mut out = format!("Available packages for {}:\n\n", game_name);
    for (region, packages) in resolver::group_by_region(entries) {
        let _ = writeln!(out, "📍 {}:", region);
        for pkg in packages.iter().take(PACKAGES_PER_REGION) {
            let stock = if pkg.in_stock() { "✅" } else { "❌" };
            let _ = writeln!(
                out,
                "{} {} - {} ({})",
                stock,
                pkg.resell_keyword.as_deref().unwrap_or("-"),
                pkg.name,
                format_price(pkg.price)
            );
        }
        out.push('\n');
    }
    if let Some(balance) = balance {
        let _ = writeln!(out, "💰 Your balance: {}\n", format_price(balance));
    }
    out.push_str("Use format: \"PLAYER_ID IDENTIFIER CODE1+CODE2\"");
    out
}
