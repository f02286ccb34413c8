//! Wave Portal terminal host
//!
//! Interactive front end over a JSON-RPC node. Lines typed on stdin are
//! commands (`/connect`, `/quit`) or messages to wave; the active panel and the
//! feed are printed whenever they change.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use wave_portal::driver::{Driver, TokioTimer};
use wave_portal::shell::format;
use wave_portal::{Config, HttpProvider, Panel, RecordKey, ShellEvent, ShellState};

#[derive(Parser)]
#[command(name = "wave-portal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Wave at the WavePortal contract from your terminal")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint, overrides the config file
    #[arg(long)]
    rpc_url: Option<String>,

    /// Contract address, overrides the config file
    #[arg(long)]
    contract: Option<String>,
}

/// One line of terminal input
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Connect,
    Quit,
    Wave(String),
    Blank,
}

impl Input {
    fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Input::Blank,
            "/connect" => Input::Connect,
            "/quit" | "/exit" => Input::Quit,
            _ => Input::Wave(line.to_string()),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::resolve(args.config.as_deref())?;
    if let Some(url) = args.rpc_url {
        config.rpc.url = url;
    }
    if let Some(contract) = args.contract {
        config.contract.address = contract
            .parse()
            .with_context(|| format!("invalid contract address {contract:?}"))?;
    }

    wave_portal::logging::init(&config.logging).context("failed to open log file")?;
    tracing::info!("Wave Portal v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(rpc = %config.rpc.url, contract = %config.contract.address, "Starting");

    tokio::task::LocalSet::new().run_until(run(config)).await
}

async fn run(config: Config) -> anyhow::Result<()> {
    let provider = HttpProvider::new(&config.rpc.url, config.rpc.request_timeout())?;

    let (tx, mut rx) = mpsc::unbounded_channel::<ShellEvent>();
    let sink = tx.clone();
    let driver = Rc::new(Driver::new(
        Some(provider.clone()),
        Rc::new(TokioTimer),
        config.contract.clone(),
        move |event| {
            // The receiver lives until shutdown; late results are dropped.
            let _ = sink.send(event);
        },
    ));

    let mut shell = ShellState::new(config.ui.notice_timeout());
    let mut view = View::default();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(config.contract.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let polling = Rc::new(Cell::new(false));

    tx.send(ShellEvent::Mounted)?;

    loop {
        tokio::select! {
            Some(event) = rx.recv() => {
                dispatch(&mut shell, &driver, event);
                view.render(&shell);
            }

            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Input::parse(&line) {
                    Input::Quit => break,
                    Input::Blank => {}
                    Input::Connect => tx.send(ShellEvent::ConnectRequested)?,
                    Input::Wave(message) => {
                        if !shell.session().is_connected() {
                            println!("Connect first with /connect");
                            continue;
                        }
                        tx.send(ShellEvent::ComposeInput(message))?;
                        tx.send(ShellEvent::SubmitRequested)?;
                    }
                }
            }

            _ = ticker.tick() => {
                if polling.replace(true) {
                    continue;
                }
                let driver = Rc::clone(&driver);
                let provider = provider.clone();
                let polling = Rc::clone(&polling);
                tokio::task::spawn_local(async move {
                    if let Err(e) = provider.refresh_accounts().await {
                        tracing::debug!(error = %e, "Account refresh failed");
                    }
                    driver.poll_live().await;
                    polling.set(false);
                });
            }
        }
    }

    // Release the filter and listener before exiting.
    for effect in shell.apply(ShellEvent::Unmounted) {
        driver.run(effect).await;
    }
    tracing::info!("Wave Portal shutdown complete");
    Ok(())
}

/// Apply an event and start its effects without waiting on them
fn dispatch(shell: &mut ShellState, driver: &Rc<Driver<HttpProvider>>, event: ShellEvent) {
    for effect in shell.apply(event) {
        let driver = Rc::clone(driver);
        tokio::task::spawn_local(async move { driver.run(effect).await });
    }
}

/// What was last printed, to only print changes
#[derive(Default)]
struct View {
    panel: Option<Panel>,
    feed: Vec<RecordKey>,
}

impl View {
    fn render(&mut self, shell: &ShellState) {
        let panel = shell.panel();
        let switched = self.panel.as_ref() != Some(&panel);
        if switched {
            print_panel(&panel, shell);
            self.panel = Some(panel.clone());
        }

        // The feed belongs to the composer panel and is reprinted with it.
        if panel != Panel::Composer {
            return;
        }
        let feed: Vec<RecordKey> = shell.visible_records().iter().map(|r| r.key()).collect();
        if switched || feed != self.feed {
            print_feed(shell);
            self.feed = feed;
        }
    }
}

fn print_panel(panel: &Panel, shell: &ShellState) {
    match panel {
        Panel::Error(message) => println!("! {message}"),
        Panel::Progress(label) => println!("  {label}"),
        Panel::ConnectPrompt {
            wallet_available: true,
        } => println!("Type /connect to connect your wallet."),
        Panel::ConnectPrompt {
            wallet_available: false,
        } => println!("No wallet available."),
        Panel::Composer => println!(
            "{}. Type a message and press enter to wave.",
            capitalize(&shell.session().to_string())
        ),
    }
}

fn print_feed(shell: &ShellState) {
    let now = Utc::now();
    println!();
    println!("{} waves", shell.visible_records().len());
    println!("{}", "-".repeat(60));
    for record in shell.visible_records() {
        println!(
            "{}  {} ({})",
            record.sender,
            format::relative(record.timestamp, now),
            format::absolute(record.timestamp)
        );
        println!("    {}", record.message);
    }
    println!();
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
