//! Command-line entry point for mailsync.
//!
//! Thin orchestrator over `mailsync-core`: one-shot sync, provider-aware
//! search, the foreground daemon loop, and account management. Process
//! supervision (PID files, detaching) is left to the init system or the
//! operator.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mailsync_core::{
    Account, AccountStore, CacheRepository, DaemonConfig, ImapObserver, SyncEngine, daemon,
    default_cache_path,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mailsync")]
#[command(about = "Keep a local mirror of IMAP mailboxes fresh")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Perform a full sync for all configured accounts
    Sync {
        /// Mailbox to reconcile
        #[arg(long, default_value = "INBOX")]
        mailbox: String,
    },

    /// Search a mailbox (Gmail accounts get X-GM-RAW query syntax)
    Search {
        /// Search query
        #[arg(short, long)]
        query: String,

        /// Account email (may be omitted when only one account is configured)
        #[arg(short, long)]
        account: Option<String>,

        /// Mailbox to search in
        #[arg(long, default_value = "INBOX")]
        mailbox: String,
    },

    /// Run the background sync loop in the foreground until Ctrl-C
    Daemon {
        /// Seconds between sync passes
        #[arg(long, default_value = "1800")]
        interval: u64,

        /// Mailbox to reconcile
        #[arg(long, default_value = "INBOX")]
        mailbox: String,
    },

    /// Manage configured accounts
    #[command(subcommand)]
    Accounts(AccountsCommand),
}

#[derive(Subcommand)]
enum AccountsCommand {
    /// List configured accounts
    List,

    /// Add or replace an account
    Add {
        /// Email address; provider and server are detected from the domain
        email: String,

        /// Password or app-specific password
        #[arg(long)]
        password: String,

        /// Override the detected IMAP host
        #[arg(long)]
        host: Option<String>,

        /// Override the IMAP port
        #[arg(long, default_value = "993")]
        port: u16,
    },

    /// Remove an account and its cached messages
    Remove {
        /// Email address
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    match args.command {
        Command::Sync { mailbox } => cmd_sync(&mailbox).await,
        Command::Search {
            query,
            account,
            mailbox,
        } => cmd_search(&query, account.as_deref(), &mailbox).await,
        Command::Daemon { interval, mailbox } => cmd_daemon(interval, mailbox).await,
        Command::Accounts(command) => cmd_accounts(command).await,
    }
}

async fn open_engine() -> anyhow::Result<SyncEngine<ImapObserver>> {
    let path = default_cache_path().context("resolving cache path")?;
    let cache = CacheRepository::new(&path.to_string_lossy())
        .await
        .context("opening cache database")?;
    Ok(SyncEngine::new(Arc::new(cache), ImapObserver))
}

fn load_accounts() -> anyhow::Result<AccountStore> {
    let store = AccountStore::load().context("loading account store")?;
    Ok(store)
}

async fn cmd_sync(mailbox: &str) -> anyhow::Result<()> {
    let store = load_accounts()?;
    if store.is_empty() {
        println!("No accounts configured. Run 'mailsync accounts add' first.");
        return Ok(());
    }

    let engine = open_engine().await?;
    println!("Syncing {mailbox}...");

    let reports = engine.sync_all(store.accounts(), mailbox).await;
    for report in &reports {
        println!("  {report}");
    }

    let failed = reports.iter().filter(|r| !r.is_success()).count();
    println!("Sync complete ({} ok, {failed} failed)", reports.len() - failed);
    Ok(())
}

async fn cmd_search(query: &str, account: Option<&str>, mailbox: &str) -> anyhow::Result<()> {
    let store = load_accounts()?;
    let account = store.resolve(account)?;

    let uids = mailsync_imap::search(
        &account.endpoint(),
        &account.email,
        &account.password,
        account.provider.search_variant(),
        mailbox,
        query,
    )
    .await
    .context("search failed")?;

    if uids.is_empty() {
        println!("No matches in {mailbox} for {}", account.email);
    } else {
        println!("{} matches in {mailbox}:", uids.len());
        for uid in uids {
            println!("  {uid}");
        }
    }
    Ok(())
}

async fn cmd_daemon(interval_secs: u64, mailbox: String) -> anyhow::Result<()> {
    anyhow::ensure!(interval_secs > 0, "--interval must be at least 1 second");
    let store = load_accounts()?;
    anyhow::ensure!(!store.is_empty(), "no accounts configured");

    let engine = open_engine().await?;
    let config = DaemonConfig {
        interval: Duration::from_secs(interval_secs),
        mailbox,
    };

    daemon::run(&engine, store.accounts(), &config, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    })
    .await;

    Ok(())
}

async fn cmd_accounts(command: AccountsCommand) -> anyhow::Result<()> {
    match command {
        AccountsCommand::List => {
            let store = load_accounts()?;
            if store.is_empty() {
                println!("No accounts configured");
                return Ok(());
            }
            for account in store.accounts() {
                println!(
                    "{} ({}, {}:{})",
                    account.email,
                    account.provider.display_name(),
                    account.imap_host,
                    account.imap_port
                );
            }
        }
        AccountsCommand::Add {
            email,
            password,
            host,
            port,
        } => {
            let mut store = load_accounts()?;
            let mut account = Account::with_email(&email);
            account.password = password;
            if let Some(host) = host {
                account.imap_host = host;
            }
            account.imap_port = port;
            anyhow::ensure!(
                !account.imap_host.is_empty(),
                "could not detect an IMAP host for {email}; pass --host"
            );

            let provider = account.provider;
            store.add(account);
            store.save()?;
            println!("Added {email} ({})", provider.display_name());
        }
        AccountsCommand::Remove { email } => {
            let mut store = load_accounts()?;
            anyhow::ensure!(store.remove(&email), "account '{email}' not found");
            store.save()?;

            // Drop the account's cached messages as well.
            let engine = open_engine().await?;
            engine.cache().clear_account(&email).await?;
            println!("Removed {email}");
        }
    }
    Ok(())
}
