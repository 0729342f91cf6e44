pub mod balance_guard;
pub mod orchestrator;
pub mod parser;
pub mod pricing;
pub mod report;
pub mod resolver;

pub use crate::domain::model::{
    BatchStage, CatalogueEntry, OrderLine, OrderResult, OrderSummary, PackageCode, ResolvedOrder,
    UserContext,
};
pub use crate::domain::ports::{BalanceService, CatalogueService, ConfigProvider, OrderService};
pub use crate::utils::error::Result;
