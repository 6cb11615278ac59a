//! Terminal dashboard.
//!
//! Stdout rendering of run events, the wallet table and a periodic status
//! snapshot. Log lines are coloured by severity. Diagnostic `tracing` output
//! goes to stderr.

use chrono::Local;
use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use rand::Rng;
use std::fmt::Write as _;
use std::io::{self, stdout, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use xbridge_chain::ChainConfig;
use xbridge_ops::{LogLevel, RunEvent, RunEventHandler};
use xbridge_store::{StatsStore, TxStats};

use crate::terminal::CrlfWriter;

pub const STATUS_INTERVAL: Duration = Duration::from_secs(10);

pub fn symbol(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Info => "ℹ",
        LogLevel::Warn => "⚠",
        LogLevel::Error => "✗",
        LogLevel::Success => "✓",
        LogLevel::Loading => "⟳",
        LogLevel::Step => "→",
    }
}

pub fn level_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Info | LogLevel::Success => Color::Green,
        LogLevel::Warn => Color::Yellow,
        LogLevel::Error => Color::Red,
        LogLevel::Loading => Color::Cyan,
        LogLevel::Step => Color::White,
    }
}

pub fn format_log_line(time: &str, level: LogLevel, message: &str) -> String {
    format!("[{}] {} {}", time, symbol(level), message)
}

fn write_log<W: Write>(out: &mut W, time: &str, level: LogLevel, message: &str) -> io::Result<()> {
    queue!(
        out,
        SetForegroundColor(level_color(level)),
        Print(format_log_line(time, level, message)),
        ResetColor,
        Print("\r\n")
    )?;
    out.flush()
}

pub fn print_log(level: LogLevel, message: impl AsRef<str>) {
    let time = Local::now().format("%H:%M:%S").to_string();
    let _ = write_log(&mut stdout().lock(), &time, level, message.as_ref());
}

/// Print a multi-line block, safe under raw mode.
pub fn print_block(text: &str) {
    let mut out = CrlfWriter(stdout().lock());
    let _ = out.write_all(text.as_bytes()).and_then(|_| out.flush());
}

/// Observer that prints run log lines and traces everything else.
pub fn event_handler() -> RunEventHandler {
    Box::new(|event| match event {
        RunEvent::Log { level, message } => print_log(level, message),
        RunEvent::State {
            wallet,
            attempt,
            state,
        } => debug!(%wallet, attempt, ?state, "attempt state"),
        RunEvent::Outcome(outcome) => {
            debug!(wallet = %outcome.wallet, attempt = outcome.attempt, status = ?outcome.status, "outcome")
        }
        RunEvent::Finished(summary) => debug!(%summary, "run finished"),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletRow {
    pub name: String,
    /// Shortened for display.
    pub address: String,
    pub balance: String,
}

pub fn render_wallet_table(rows: &[WalletRow]) -> String {
    let name_width = rows
        .iter()
        .map(|r| r.name.chars().count())
        .chain(std::iter::once("Name".len()))
        .max()
        .unwrap_or(4);

    let mut out = String::new();
    let _ = writeln!(out, "{:<name_width$}   {:<13}   {}", "Name", "Address", "Balance");
    for row in rows {
        let _ = writeln!(
            out,
            "{:<name_width$}   {:<13}   {}",
            row.name, row.address, row.balance
        );
    }
    out
}

/// Cosmetic network figures shown in the status snapshot. Not measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkSample {
    pub gas_gwei: u32,
    pub usage_pct: u32,
    pub pending_txs: u32,
}

impl NetworkSample {
    pub fn simulate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            gas_gwei: rng.gen_range(25..40),
            usage_pct: rng.gen_range(70..100),
            pending_txs: rng.gen_range(0..10),
        }
    }
}

pub fn render_status(now: &str, chain: &ChainConfig, stats: &TxStats, sample: &NetworkSample) -> String {
    let last = stats
        .last_timing()
        .map(|ms| format!("{}ms", ms))
        .unwrap_or_else(|| "-".into());
    let average = stats
        .average_timing()
        .map(|ms| format!("{}ms", ms))
        .unwrap_or_else(|| "-".into());

    let mut out = String::new();
    let _ = writeln!(out, "# System Status");
    let _ = writeln!(out, "Time: {}", now);
    let _ = writeln!(out, "Network: {} to {}", chain.name, chain.destination);
    let _ = writeln!(
        out,
        "RPC Provider: {}/{}",
        chain.rpc_index + 1,
        chain.rpc_urls.len()
    );
    let _ = writeln!(
        out,
        "Transactions: {} success, {} failed, {} pending",
        stats.success, stats.failed, stats.pending
    );
    let _ = writeln!(out, "Last time: {} (avg {})", last, average);
    let _ = writeln!(out, "Chain ID: {} ({})", chain.chain_id, chain.name);
    let _ = writeln!(out, "Gas Price: ~{} Gwei", sample.gas_gwei);
    let _ = writeln!(out, "Network Usage: {}%", sample.usage_pct);
    let _ = writeln!(out, "Pending Txs: {}", sample.pending_txs);
    out
}

/// Print a status snapshot now and then every `every`.
pub fn spawn_status_ticker(
    chain: ChainConfig,
    store: Arc<dyn StatsStore>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let stats = match store.stats().await {
                Ok(stats) => stats,
                Err(e) => {
                    warn!(error = %e, "failed to read stats");
                    continue;
                }
            };
            let sample = NetworkSample::simulate(&mut rand::thread_rng());
            let now = Local::now().format("%H:%M:%S | %d-%m-%Y").to_string();
            print_block(&render_status(&now, &chain, &stats, &sample));
        }
    })
}
