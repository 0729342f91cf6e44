use clap::Parser;
use std::io::Read;
use std::time::Duration;
use topup_order::core::ConfigProvider;
use topup_order::utils::error::ErrorSeverity;
use topup_order::utils::{logger, validation::Validate};
use topup_order::{
    report, AppConfig, CliArgs, Command, HttpStorefrontClient, OrderError, OrderOrchestrator,
    UserContext,
};

type Orchestrator = OrderOrchestrator<HttpStorefrontClient, HttpStorefrontClient, HttpStorefrontClient>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config = match args.load_config().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration validation failed: {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    logger::init_cli_logger(&config.logging);
    tracing::info!("Starting topup-order CLI");
    tracing::debug!("Config: {:?}", config);

    let ctx = UserContext {
        user_id: args.user.clone(),
        access_token: args.token.clone(),
    };
    let orchestrator = build_orchestrator(&config);

    match run(&args, &config, &orchestrator, &ctx).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?}, Stage: {})",
                e,
                e.category(),
                e.severity(),
                e.stage()
            );
            eprintln!("{}", report::format_rejection(&e));
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            if e.is_retryable() {
                eprintln!("🔁 This looks temporary; running the same command again may succeed.");
            }

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }
    }
}

fn build_orchestrator(config: &AppConfig) -> Orchestrator {
    let client = HttpStorefrontClient::new(config);
    let orchestrator = OrderOrchestrator::new(client.clone(), client.clone(), client);
    match config.submission_timeout_seconds() {
        Some(seconds) => orchestrator.with_submission_timeout(Duration::from_secs(seconds)),
        None => orchestrator,
    }
}

async fn run(
    args: &CliArgs,
    config: &AppConfig,
    orchestrator: &Orchestrator,
    ctx: &UserContext,
) -> Result<String, OrderError> {
    match &args.command {
        Command::Order { lines } => {
            let game = args.game_name(config)?;
            let command = command_text(lines)?;
            let summary = orchestrator.process(&command, &game, ctx).await?;
            Ok(report::format_summary(&summary))
        }
        Command::Validate { lines } => {
            let game = args.game_name(config)?;
            let command = command_text(lines)?;
            let orders = orchestrator.preview(&command, &game).await?;
            Ok(report::format_validation(&orders))
        }
        Command::Balance => {
            let balance = orchestrator.balance(ctx).await?;
            Ok(format!("💰 Your current balance: {}", report::format_price(balance)))
        }
        Command::Packages => {
            let game = args.game_name(config)?;
            let entries = orchestrator.catalogue(&game).await?;
            // 餘額只是附加資訊，查詢失敗不影響目錄輸出
            let balance = orchestrator.balance(ctx).await.ok();
            Ok(report::format_catalogue(&game, &entries, balance))
        }
    }
}

/// 沒有在命令列給訂單時，從 stdin 讀取（每行一筆）
fn command_text(lines: &[String]) -> Result<String, OrderError> {
    if !lines.is_empty() {
        return Ok(lines.join("\n"));
    }
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}
