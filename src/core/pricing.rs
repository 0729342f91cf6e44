use crate::domain::model::{CatalogueEntry, ResolvedOrder};
use rust_decimal::Decimal;

pub fn total_price(packages: &[CatalogueEntry]) -> Decimal {
    packages.iter().map(|pkg| pkg.price).sum()
}

pub fn batch_total(orders: &[ResolvedOrder]) -> Decimal {
    orders.iter().map(|order| order.total_cost).sum()
}
