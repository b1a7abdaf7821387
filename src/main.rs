//! Bets with Friends CLI
//!
//! List, inspect and act on peer-to-peer bets from the terminal.

use anyhow::{Context, Result};
use bets_with_friends::board::format::{eth_to_wei, format_eth, format_label, format_usd, share_text};
use bets_with_friends::services::RefreshOutcome;
use bets_with_friends::{
    BetActions, BetListing, Config, DisplayBet, ExecutionResult, ListingSession, LiveBoard, NewBet,
    Outcome, PriceFeed, TxAction, TxError, ViewContext,
};
use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use colored::Colorize;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "bets")]
#[command(about = "Bets with Friends: peer-to-peer bets on chain")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List an account's bets with win/loss statistics
    List {
        /// Viewing account
        account: Address,

        /// Keep refreshing every N seconds
        #[arg(short, long)]
        watch: Option<u64>,
    },

    /// Show a single bet and its share text
    Show {
        /// Bet contract address
        bet: Address,

        /// Account whose outcome and actions are shown
        #[arg(long)]
        viewer: Option<Address>,
    },

    /// Show the current ETH/USD rate
    Rate,

    /// Format an address for display (ENS name or shortened address)
    Label {
        address: String,

        /// Use this name instead of looking one up
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Create a new bet through the factory
    Create {
        #[arg(long)]
        better1: Address,

        #[arg(long)]
        better2: Address,

        #[arg(long)]
        decider: Address,

        /// Wager per better in ETH
        #[arg(long)]
        wager: Decimal,

        /// Terms of the bet
        #[arg(long)]
        conditions: String,
    },

    /// Fund your side of a bet (sends the wager)
    Fund { bet: Address },

    /// Cancel a bet
    Cancel { bet: Address },

    /// Invalidate a funded bet (decider only)
    Invalidate { bet: Address },

    /// Resolve a funded bet in favour of a better (decider only)
    Resolve {
        bet: Address,

        #[arg(long)]
        winner: Address,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    // Load configuration
    let config = Config::from_env()?;

    match cli.command {
        Commands::List { account, watch: None } => list_bets(&config, account).await?,
        Commands::List { account, watch: Some(secs) } => watch_bets(&config, account, secs).await?,
        Commands::Show { bet, viewer } => show_bet(&config, bet, viewer).await?,
        Commands::Rate => show_rate(&config).await,
        Commands::Label { address, name } => show_label(&config, &address, name).await,
        Commands::Create { better1, better2, decider, wager, conditions } => {
            let wager = eth_to_wei(wager).context("Wager must be a non-negative amount with at most 18 decimals")?;
            if wager.is_zero() {
                anyhow::bail!("Wager must be greater than zero");
            }
            let actions = signer(&config, TxAction::Create)?;
            let new_bet = NewBet { better1, better2, decider, wager, conditions };
            report(TxAction::Create, actions.create_bet(&new_bet).await)?;
        }
        Commands::Fund { bet } => {
            let actions = signer(&config, TxAction::Fund)?;
            let board = LiveBoard::from_config(&config);
            let record = board
                .fetcher()
                .fetch_bet(bet)
                .await
                .with_context(|| format!("Failed to read bet {:?}", bet))?;
            report(TxAction::Fund, actions.fund_bet(bet, record.wager).await)?;
        }
        Commands::Cancel { bet } => {
            let actions = signer(&config, TxAction::Cancel)?;
            report(TxAction::Cancel, actions.cancel_bet(bet).await)?;
        }
        Commands::Invalidate { bet } => {
            let actions = signer(&config, TxAction::Invalidate)?;
            report(TxAction::Invalidate, actions.invalidate_bet(bet).await)?;
        }
        Commands::Resolve { bet, winner } => {
            let actions = signer(&config, TxAction::Resolve)?;
            report(TxAction::Resolve, actions.resolve_bet(bet, winner).await)?;
        }
    }

    Ok(())
}

async fn list_bets(config: &Config, account: Address) -> Result<()> {
    print_banner(config, account);

    let board = LiveBoard::from_config(config);
    let feed = PriceFeed::new(config.price_api_url.clone(), config.read_timeout);
    let rate = feed.refresh().await;

    println!("Reading bets from factory {:?}...\n", config.factory_address);
    let listing = board
        .list_bets(config.factory_address, ViewContext::new(account, rate))
        .await
        .context("Failed to read bet factory")?;

    print_listing(&listing);
    Ok(())
}

/// Poll the factory and re-list on an interval. New bets replace the inputs
/// of the session, so a listing built from an outdated bet set is dropped.
async fn watch_bets(config: &Config, account: Address, secs: u64) -> Result<()> {
    print_banner(config, account);
    let interval = Duration::from_secs(secs.max(1));

    let board = Arc::new(LiveBoard::from_config(config));
    let feed = PriceFeed::new(config.price_api_url.clone(), config.read_timeout);

    let addresses = board
        .fetcher()
        .bet_addresses(config.factory_address)
        .await
        .context("Failed to read bet factory")?;
    let session = Arc::new(ListingSession::new(addresses, account));

    // Factory poller feeds new bet sets into the session
    let poll_board = board.clone();
    let poll_session = session.clone();
    let factory = config.factory_address;
    let poller = tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            match poll_board.fetcher().bet_addresses(factory).await {
                Ok(addresses) => {
                    if poll_session.set_addresses(addresses) {
                        info!("Factory has new bets");
                    }
                }
                Err(e) => warn!("Factory poll failed: {}", e),
            }
        }
    });

    info!("Watching bets for {:?} every {}s (Ctrl-C to stop)", account, interval.as_secs());

    loop {
        let rate = feed.refresh().await;
        match session.refresh(board.as_ref(), rate).await {
            RefreshOutcome::Published(listing) => print_listing(&listing),
            RefreshOutcome::Superseded => continue,
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    poller.abort();
    Ok(())
}

async fn show_bet(config: &Config, bet: Address, viewer: Option<Address>) -> Result<()> {
    let board = LiveBoard::from_config(config);
    let feed = PriceFeed::new(config.price_api_url.clone(), config.read_timeout);
    let rate = feed.refresh().await;

    let shown = board
        .show_bet(bet, ViewContext::new(viewer.unwrap_or(Address::ZERO), rate))
        .await
        .with_context(|| format!("Failed to read bet {:?}", bet))?;

    println!("\n{}", "=".repeat(70));
    println!("  BET {:?}", shown.address);
    println!("{}\n", "=".repeat(70));
    print_bet(&shown);
    println!("  Winner:     {}", shown.winner_label);
    println!("\n{}", "-".repeat(70));
    println!("{}", share_text(&shown));
    println!("{}\n", "-".repeat(70));
    Ok(())
}

async fn show_rate(config: &Config) {
    let feed = PriceFeed::new(config.price_api_url.clone(), config.read_timeout);
    let rate = feed.refresh().await;
    if rate.is_zero() {
        println!("ETH/USD rate unavailable");
    } else {
        println!("1 ETH = ${}", format_usd(rate));
    }
}

async fn show_label(config: &Config, address: &str, name: Option<String>) {
    let label = match (name, address.parse::<Address>()) {
        (Some(name), _) => format_label(address, Some(&name)),
        (None, Ok(parsed)) => LiveBoard::from_config(config).label(parsed).await,
        (None, Err(_)) => format_label(address, None),
    };
    println!("{}", label);
}

fn signer(config: &Config, action: TxAction) -> Result<BetActions> {
    let actions = BetActions::new(config).map_err(|e| anyhow::anyhow!(e.user_message(action)))?;
    info!("Sending {} from {:?}", action, actions.account());
    Ok(actions)
}

fn report(action: TxAction, result: Result<ExecutionResult, TxError>) -> Result<()> {
    match result {
        Ok(executed) => {
            println!("{}", action.success_message().green().bold());
            println!("  Tx:    {:?}", executed.tx_hash);
            if let Some(block) = executed.block_number {
                println!("  Block: {}", block);
            }
            if let Some(bet) = executed.bet {
                println!("  Bet:   {:?}", bet);
            }
            Ok(())
        }
        Err(e) => {
            if e.is_retryable() {
                warn!("{} failed with a retryable error", action);
            }
            error!("{} failed: {}", action, e);
            anyhow::bail!("{}", e.user_message(action))
        }
    }
}

fn print_banner(config: &Config, account: Address) {
    println!("\n{}", "=".repeat(70));
    println!("  BETS WITH FRIENDS");
    println!("  Account: {:?}", account);
    println!(
        "  Chain: {} | ENS: {} | Signing: {}",
        config.chain_id,
        if config.ens_enabled { "ON" } else { "OFF" },
        if config.can_sign() { "ENABLED" } else { "READ-ONLY" }
    );
    println!("{}\n", "=".repeat(70));
}

fn print_listing(listing: &BetListing) {
    print_section("UNFUNDED / PARTIALLY FUNDED", &listing.unfunded);
    print_section("ACTIVE (AWAITING DECISION)", &listing.active);
    print_section("HISTORICAL", &listing.historical);

    let stats = &listing.stats;
    println!("\n{}", "-".repeat(70));
    println!(
        "Won: {} | Lost: {} | Decided: {} | Win rate: {:.1}%",
        stats.bets_won,
        stats.bets_lost,
        stats.bets_decided,
        stats.win_rate()
    );
    let pnl = format!("{} ETH (${})", format_eth(stats.pnl), format_usd(stats.pnl_fiat));
    if stats.pnl > Decimal::ZERO {
        println!("PnL: {}", pnl.green());
    } else if stats.pnl < Decimal::ZERO {
        println!("PnL: {}", pnl.red());
    } else {
        println!("PnL: {}", pnl);
    }

    let funding = listing.awaiting_funding().count();
    if funding > 0 {
        println!("{}", format!("{} bet(s) awaiting your funding", funding).yellow());
    }
    let awaiting = listing.awaiting_decision().count();
    if awaiting > 0 {
        println!("{}", format!("{} bet(s) awaiting your decision", awaiting).yellow());
    }
    if listing.failed > 0 {
        println!("{}", format!("{} bet(s) could not be read and were skipped", listing.failed).yellow());
    }
    println!(
        "{} bets as of {}",
        listing.total(),
        listing.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("{}\n", "-".repeat(70));
}

fn print_section(title: &str, bets: &[DisplayBet]) {
    println!("\n{} ({})", title, bets.len());
    println!("{}", "-".repeat(70));

    if bets.is_empty() {
        println!("  No bets");
        return;
    }

    for bet in bets {
        print_bet(bet);
        println!();
    }
}

fn print_bet(bet: &DisplayBet) {
    let conditions: String = bet.conditions.chars().take(60).collect();
    println!("  {}", conditions.bold());
    println!("  {} vs {} | decided by {}", bet.better1_label, bet.better2_label, bet.decider_label);
    println!(
        "  Wager: {} ETH (${}) | Status: {}",
        format_eth(bet.wager_eth),
        format_usd(bet.wager_usd),
        bet.status
    );

    match bet.outcome {
        Outcome::Won => println!("  {}", "WON".green().bold()),
        Outcome::Lost => println!("  {}", "LOST".red().bold()),
        Outcome::Invalidated => println!("  {}", "INVALIDATED".yellow()),
        Outcome::Neutral => {}
    }
    if bet.can_fund {
        println!("  {}", "You can fund this bet".cyan());
    }
    if bet.can_decide {
        println!("  {}", "You are the decider".cyan());
    }
}
