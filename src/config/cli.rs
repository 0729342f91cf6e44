use crate::config::toml_config::AppConfig;
use crate::utils::error::{OrderError, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "topup-order")]
#[command(about = "Place game top-up orders from chat-style commands")]
pub struct CliArgs {
    #[arg(long, short, help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "API base URL (overrides the config file)")]
    pub base_url: Option<String>,

    #[arg(long, short, help = "Game whose catalogue the package codes refer to")]
    pub game: Option<String>,

    #[arg(long, env = "TOPUP_TOKEN", hide_env_values = true, help = "Bearer access token")]
    pub token: Option<String>,

    #[arg(long, default_value = "cli-user", help = "User id used for idempotency keys")]
    pub user: String,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Validate and submit orders, e.g. `order "1391379101 15749 wkp+86"`
    Order {
        /// Order lines; read from stdin when omitted
        lines: Vec<String>,
    },
    /// Resolve codes and print the validation report without ordering
    Validate { lines: Vec<String> },
    /// Show the current XCN balance
    Balance,
    /// List the packages available for the selected game
    Packages,
}

impl CliArgs {
    /// 合併設定檔與命令列參數，命令列優先
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = match (&self.config, &self.base_url) {
            (Some(path), _) => AppConfig::from_file(path)?,
            (None, Some(url)) => AppConfig::new(url.clone()),
            (None, None) => {
                return Err(OrderError::MissingConfigError {
                    field: "--config or --base-url".to_string(),
                })
            }
        };

        if let Some(url) = &self.base_url {
            config.api.base_url = url.clone();
        }
        if let Some(game) = &self.game {
            config.order.default_game = Some(game.clone());
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
        Ok(config)
    }

    pub fn game_name(&self, config: &AppConfig) -> Result<String> {
        self.game
            .clone()
            .or_else(|| config.default_game().map(str::to_string))
            .ok_or_else(|| OrderError::MissingConfigError {
                field: "--game or order.default_game".to_string(),
            })
    }
}
