// SPDX-License-Identifier: MIT

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use dust_vacuum::app::config::GlobalSettings;
use dust_vacuum::app::logging::setup_logging;
use dust_vacuum::common::constants::{REFERENCE_ASSET_DECIMALS, USD_SHARE_SCALE};
use dust_vacuum::domain::error::VacuumError;
use dust_vacuum::domain::types::RunSummary;
use dust_vacuum::infrastructure::aggregator::RouteResolver;
use dust_vacuum::infrastructure::ledger::rpc::RpcLedgerGateway;
use dust_vacuum::infrastructure::ledger::{AssetLedgerGateway, LedgerOp};
use dust_vacuum::infrastructure::pricing::PriceFeed;
use dust_vacuum::pool::calls;
use dust_vacuum::vacuum::balances::{refresh_balances, selected_dust};
use dust_vacuum::vacuum::{PriceValidationGuard, RunContext, VacuumOrchestrator, VacuumRunSettings};

#[derive(Parser, Debug)]
#[command(author, version, about = "dust vacuum")]
struct Cli {
    /// Path to config file (default: config.{toml,yaml,...})
    #[arg(long)]
    config: Option<String>,

    /// Plan and log the batch without submitting it
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Slippage basis points (overrides config)
    #[arg(long)]
    slippage_bps: Option<u64>,

    /// Dust threshold in USD (overrides config)
    #[arg(long)]
    threshold_usd: Option<f64>,

    /// Acknowledge pending burns instead of aborting on them
    #[arg(long, default_value_t = false)]
    confirm_burn: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List balances with dust classification
    Scan,
    /// Consolidate and dispose of every selected dust balance
    Vacuum,
    /// Pooled-vault operations
    Pool {
        #[command(subcommand)]
        action: PoolCommand,
    },
}

#[derive(Subcommand, Debug)]
enum PoolCommand {
    /// Show the on-ledger vault projection
    Status,
    /// Create a membership object for the configured owner
    Membership,
    /// Redeem a finalized-round receipt for its pro-rata payout
    Claim {
        receipt: String,
        membership: String,
    },
    /// Redeem a receipt but retain the payout as staked balance
    Stake {
        receipt: String,
        membership: String,
    },
    /// Cast a share-weighted governance vote
    Vote {
        proposal: String,
        membership: String,
        #[arg(long, default_value_t = false)]
        against: bool,
    },
    /// Open the vault for deposits (admin)
    Open,
    /// Close the vault to deposits (admin)
    Close,
    /// Finalize the current round and start the next (admin)
    NewRound,
    /// Set the vault's target value in USD (admin)
    SetTarget { usd: f64 },
}

#[tokio::main]
async fn main() -> Result<(), VacuumError> {
    let cli = Cli::parse();

    let mut settings = GlobalSettings::load_with_path(cli.config.as_deref())?;
    if let Some(bps) = cli.slippage_bps {
        settings.slippage_bps = bps;
    }
    if let Some(threshold) = cli.threshold_usd {
        settings.dust_threshold_usd = threshold;
    }
    setup_logging(&settings.log_level, settings.log_json);

    let gateway = Arc::new(RpcLedgerGateway::new(
        &settings.rpc_url,
        settings.finality_poll_ms,
        settings.finality_timeout_ms,
    )?);

    match cli.command {
        Command::Scan => scan(&settings, &gateway).await,
        Command::Vacuum => vacuum(cli.dry_run, cli.confirm_burn, &settings, gateway).await,
        Command::Pool { action } => pool(&settings, &gateway, action).await,
    }
}

async fn scan(settings: &GlobalSettings, gateway: &Arc<RpcLedgerGateway>) -> Result<(), VacuumError> {
    let prices = PriceFeed::new(&settings.price_api_url)?;
    let balances = refresh_balances(
        gateway,
        &prices,
        &settings.owner_address,
        settings.dust_threshold_usd,
    )
    .await?;

    println!("{:<12} {:>16} {:>12}  {}", "SYMBOL", "QUANTITY", "USD", "DUST");
    for balance in &balances {
        println!(
            "{:<12} {:>16} {:>12.4}  {}",
            balance.symbol,
            balance.quantity,
            balance.usd_value,
            if balance.is_dust { "yes" } else { "" }
        );
    }
    let dust_total: f64 = balances.iter().filter(|b| b.is_dust).map(|b| b.usd_value).sum();
    println!(
        "\n{} assets, {} dust (~${dust_total:.2})",
        balances.len(),
        balances.iter().filter(|b| b.is_dust).count()
    );
    Ok(())
}

async fn vacuum(
    dry_run: bool,
    confirm_burn: bool,
    settings: &GlobalSettings,
    gateway: Arc<RpcLedgerGateway>,
) -> Result<(), VacuumError> {
    let prices = PriceFeed::new(&settings.price_api_url)?;
    let resolver = RouteResolver::new(&settings.aggregator_url)?;
    let target = settings.target_asset()?;

    let balances = refresh_balances(
        &gateway,
        &prices,
        &settings.owner_address,
        settings.dust_threshold_usd,
    )
    .await?;
    let selected = selected_dust(&balances, &target);
    if selected.is_empty() {
        return Err(VacuumError::NothingToDo);
    }

    let run_settings = VacuumRunSettings {
        slippage_bps: settings.slippage_bps,
        max_route_concurrency: settings.max_route_concurrency,
        route_call_delay: settings.route_call_delay(),
        gas_budget: settings.gas_budget,
        dry_run,
        guard: PriceValidationGuard::new(settings.min_dust_value_usd, settings.max_dust_value_usd),
        vault_id: settings.vault_id.clone(),
        asset_vaults: settings.asset_vaults()?,
    };
    let orchestrator = VacuumOrchestrator::new(gateway, resolver, run_settings);

    let mut ctx = RunContext::new(settings.owner_address.clone(), target, selected);
    orchestrator.prepare(&mut ctx).await?;

    if ctx.classifier.has_pending() {
        println!("The following balances have no route and will be disposed of:");
        for (asset, action, usd) in ctx.disposal_preview() {
            println!("  {asset}  {action:?}  ~${usd:.4}");
        }
        if !confirm_burn {
            return Err(VacuumError::ConfirmationRequired {
                burn_count: ctx.classifier.pending_burns(),
            });
        }
        ctx.confirm_disposals()?;
    }

    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; cancelling before submission");
            cancel_on_signal.cancel();
        }
    });

    let summary = orchestrator.execute(&mut ctx, &cancel).await?;
    print_summary(&summary, dry_run);
    Ok(())
}

fn print_summary(summary: &RunSummary, dry_run: bool) {
    if dry_run {
        println!("Dry run: planned {} assets, nothing submitted", summary.planned_count());
    } else if let Some(digest) = &summary.digest {
        println!("Batch finalized: {digest}");
    }
    for outcome in &summary.swapped {
        println!(
            "  swap   {:<12} in {:>16} est out {:>16}",
            outcome.symbol, outcome.input_quantity, outcome.estimated_out
        );
    }
    for outcome in &summary.burned {
        println!("  burn   {:<12} {:>16}", outcome.symbol, outcome.input_quantity);
    }
    for outcome in &summary.donated {
        println!("  donate {:<12} ~${:.4}", outcome.symbol, outcome.usd_value);
    }
    for (asset, reason) in &summary.failed_assets {
        println!("  failed {asset}: {reason}");
    }
    let received = summary.total_output_received as f64
        / 10f64.powi(REFERENCE_ASSET_DECIMALS as i32);
    println!(
        "Total ~${:.2}; received {received:.4} units of the reference asset",
        summary.total_value_usd
    );
}

fn admin_cap(settings: &GlobalSettings) -> Result<&str, VacuumError> {
    settings.admin_cap_id.as_deref().ok_or_else(|| {
        VacuumError::Config("admin_cap_id must be configured for admin commands".to_string())
    })
}

async fn pool(
    settings: &GlobalSettings,
    gateway: &Arc<RpcLedgerGateway>,
    action: PoolCommand,
) -> Result<(), VacuumError> {
    let vault = settings.vault_id.as_deref().ok_or_else(|| {
        VacuumError::Config("vault_id must be configured for pool commands".to_string())
    })?;

    let ops: Vec<LedgerOp> = match action {
        PoolCommand::Status => {
            let state = gateway.vault_state(vault).await?;
            println!("vault round {} ({})", state.round, if state.is_open { "open" } else { "closed" });
            println!(
                "  shares this round {} / lifetime {}",
                state.total_shares, state.total_lifetime_shares
            );
            println!(
                "  value ${:.2} of ${:.2} target",
                state.current_usd_micro as f64 / USD_SHARE_SCALE as f64,
                state.target_usd_micro as f64 / USD_SHARE_SCALE as f64
            );
            return Ok(());
        }
        PoolCommand::Membership => calls::create_membership(vault),
        PoolCommand::Claim { receipt, membership } => calls::claim(vault, &receipt, &membership),
        PoolCommand::Stake { receipt, membership } => calls::stake(vault, &receipt, &membership),
        PoolCommand::Vote {
            proposal,
            membership,
            against,
        } => calls::vote(&proposal, &membership, !against),
        PoolCommand::Open => calls::open_vault(admin_cap(settings)?, vault),
        PoolCommand::Close => calls::close_vault(admin_cap(settings)?, vault),
        PoolCommand::NewRound => calls::new_round(admin_cap(settings)?, vault),
        PoolCommand::SetTarget { usd } => {
            let micro = (usd * USD_SHARE_SCALE as f64).floor() as u64;
            calls::set_target_usd_value(admin_cap(settings)?, vault, micro)
        }
    };

    let receipt = gateway.submit(&ops, settings.gas_budget).await?;
    let finalized = gateway.await_finality(&receipt.digest).await?;
    println!("finalized: {}", finalized.digest);
    Ok(())
}
