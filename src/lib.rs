pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliArgs, Command};

pub use adapters::HttpStorefrontClient;
pub use config::AppConfig;
pub use core::{orchestrator::OrderOrchestrator, report};
pub use domain::model::{
    BatchStage, CatalogueEntry, LineFailure, OrderLine, OrderRequest, OrderResult, OrderSummary,
    PackageCode, ResolvedOrder, SubmissionReceipt, UserContext,
};
pub use utils::error::{OrderError, Result};
