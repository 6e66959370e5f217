mod browser;
mod dom;
mod error;
mod markdown;
mod parser;
mod pipeline;
mod session;
mod settings;
mod store;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::warn;

use browser::{BrowserChannel, BrowserOptions, ChromeSession};
use error::ExportError;
use pipeline::ExportStats;
use session::SessionState;
use settings::Settings;
use store::OutputStore;

#[derive(Parser)]
#[command(name = "kindle_export", about = "Export Kindle highlights and notes to Markdown")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct BrowserArgs {
    /// Use system Chrome instead of the auto-detected Chromium
    #[arg(long)]
    chrome: bool,
}

impl BrowserArgs {
    fn channel(&self) -> BrowserChannel {
        if self.chrome {
            BrowserChannel::Chrome
        } else {
            BrowserChannel::Bundled
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Log in interactively and save the session
    Login {
        #[command(flatten)]
        browser: BrowserArgs,
    },
    /// Export highlights of every book to one Markdown file each
    Export {
        /// Re-export all books (default: skip books that already have a file)
        #[arg(long)]
        force: bool,
        /// Output directory (overrides settings)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        #[command(flatten)]
        browser: BrowserArgs,
    },
    /// Show session and export directory state
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = settings::load()?;

    let result = match cli.command {
        Commands::Login { browser } => session::login(&settings, browser.channel()).await,
        Commands::Export {
            force,
            output_dir,
            browser,
        } => {
            if let Some(dir) = output_dir {
                settings.output_dir = dir;
            }
            run_export(&settings, force, browser.channel())
                .await
                .map(|stats| println!("\n{}", stats.summary()))
        }
        Commands::Status => print_status(&settings),
    };

    if let Err(e) = &result {
        if let Some(fatal) = e.downcast_ref::<ExportError>() {
            eprintln!("{}", fatal);
            std::process::exit(1);
        }
    }

    let elapsed = t0.elapsed();
    if result.is_ok() && elapsed.as_secs() >= 1 {
        println!("Finished in {}", format_duration(elapsed));
    }

    result
}

async fn run_export(settings: &Settings, force: bool, channel: BrowserChannel) -> Result<ExportStats> {
    let session = SessionState::load(&settings.session_file)?;
    let store = OutputStore::open(&settings.output_dir)?;

    let chrome = ChromeSession::launch(&BrowserOptions {
        headless: true,
        channel,
        executable: settings.chrome_executable.clone(),
        poll: settings.poll_interval(),
    })
    .await?;

    let result = async {
        chrome.restore_session(&session).await?;
        println!("Navigating to Kindle notebook...");
        chrome.goto(&settings.notebook_url).await?;
        pipeline::export_all(&chrome, &store, &settings.waits(), force).await
    }
    .await;

    if let Err(e) = chrome.close().await {
        warn!("Browser did not shut down cleanly: {:#}", e);
    }
    result
}

fn print_status(settings: &Settings) -> Result<()> {
    let path = &settings.session_file;
    match SessionState::load(path) {
        Ok(s) => {
            let age = Utc::now().signed_duration_since(s.saved_at);
            println!("Session:   {}", path.display());
            println!(
                "Saved:     {} ({} days ago)",
                s.saved_at.format("%Y-%m-%d %H:%M UTC"),
                age.num_days()
            );
            println!("Cookies:   {} ({} expired)", s.cookies.len(), s.expired_cookies(Utc::now()));
        }
        Err(e) if e.downcast_ref::<ExportError>().is_some() => {
            println!("Session:   none (run `kindle_export login`)");
        }
        Err(e) => return Err(e),
    }

    println!("Output:    {}", settings.output_dir.display());
    match OutputStore::existing(&settings.output_dir) {
        Some(store) => println!("Exported:  {}", store.existing_keys()?.len()),
        None => println!("Exported:  0 (directory not created yet)"),
    }
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
