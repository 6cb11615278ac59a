use clap::Parser;
use eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use xbridge_chain::{RpcChainClient, TokenBridgeChain};
use xbridge_ops::{LogLevel, RunEngine, RunWallet};
use xbridge_planner::format_amount;
use xbridge_relay::{PacketIndexClient, RelayPoller};
use xbridge_store::{MemoryStore, StatsStore};
use xbridge_types::{short_address, Clock, TokioClock};
use xbridge_wallet::{load_wallets, EXPECTED_SHAPE};

use crate::dashboard::{
    print_block, print_log, render_wallet_table, spawn_status_ticker, WalletRow, STATUS_INTERVAL,
};
use crate::settings::Settings;
use crate::terminal::CrlfWriter;

mod dashboard;
mod prompt;
mod settings;
mod terminal;

#[derive(Parser, Debug)]
#[command(author, version, about = "Babylon to Xion bridge farming bot", long_about = None)]
struct Args {
    /// Path to a TOML config file; built-in testnet values are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wallet store (JSON).
    #[arg(short, long, default_value = "wallet.json")]
    wallets: PathBuf,

    /// Transactions per wallet. Skips the interactive prompt.
    #[arg(short = 'n', long)]
    tx_count: Option<u32>,

    /// Index into the configured RPC endpoints.
    #[arg(long)]
    rpc_index: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(|| CrlfWriter(std::io::stderr()))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    }
    .with_rpc_index(args.rpc_index);
    let config = settings.engine_config();
    config.validate()?;

    print_log(LogLevel::Info, "Starting Babylon to Xion Bridge Bot");

    let wallets = match load_wallets(&args.wallets) {
        Ok(wallets) => wallets,
        Err(e) => {
            print_log(LogLevel::Error, e.to_string());
            print_log(
                LogLevel::Info,
                "Please create a wallet.json file with the following structure:",
            );
            println!("{}", EXPECTED_SHAPE);
            std::process::exit(1);
        }
    };
    print_log(
        LogLevel::Success,
        format!("Loaded {} wallets from {}", wallets.len(), args.wallets.display()),
    );

    let mut run_wallets = Vec::with_capacity(wallets.len());
    let mut rows = Vec::with_capacity(wallets.len());
    for wallet in &wallets {
        let client = RpcChainClient::new(&config.chain, wallet.signer.clone())?;
        let balance = match client
            .balance_of(config.chain.token_address, wallet.address())
            .await
        {
            Ok(balance) => format_amount(balance, config.chain.token_decimals),
            Err(e) => {
                warn!(wallet = %wallet.name, error = %e, "failed to read balance");
                "...".to_string()
            }
        };
        rows.push(WalletRow {
            name: wallet.name.clone(),
            address: short_address(&wallet.address().to_string()),
            balance,
        });
        run_wallets.push(RunWallet::new(wallet.name.clone(), Arc::new(client)));
    }
    print_block(&render_wallet_table(&rows));

    let tx_count = match args.tx_count {
        Some(count) => count.max(1),
        None => {
            prompt::ask_tx_count(
                &mut prompt::stdin_lines(),
                &mut std::io::stdout(),
                "How many transactions per wallet?",
            )
            .await?
        }
    };

    let store: Arc<dyn StatsStore> = Arc::new(MemoryStore::new());
    let _ticker = spawn_status_ticker(config.chain.clone(), store.clone(), STATUS_INTERVAL);

    let clock: Arc<dyn Clock> = Arc::new(TokioClock);
    let index = Arc::new(PacketIndexClient::new(&settings.relay));
    let poller = RelayPoller::new(settings.relay.clone(), index, clock.clone());
    let engine = RunEngine::new(
        config,
        poller,
        store,
        clock,
        Some(dashboard::event_handler()),
    );

    let raw_mode = terminal::enter_raw_mode();
    let mut exit = tokio::spawn(async move {
        if raw_mode {
            terminal::wait_for_exit_key().await
        } else {
            std::future::pending().await
        }
    });

    let finished = tokio::select! {
        summary = engine.run(&run_wallets, tx_count) => Some(summary),
        _ = signal::ctrl_c() => None,
        _ = &mut exit => None,
    };

    if let Some(summary) = finished {
        info!(%summary, "run complete");
        print_log(LogLevel::Info, "Press Q, ESC, or Ctrl+C to exit");
        tokio::select! {
            _ = signal::ctrl_c() => {}
            _ = exit => {}
        }
    }

    // Keyboard events are read on a blocking thread that cannot be cancelled.
    if raw_mode {
        terminal::leave_raw_mode();
    }
    std::process::exit(0)
}
