use std::fs;
use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::browser::{BrowserChannel, BrowserOptions, ChromeSession};
use crate::error::ExportError;
use crate::settings::Settings;

/// Saved login: the cookies of an authenticated notebook page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub saved_at: DateTime<Utc>,
    pub cookies: Vec<StoredCookie>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    /// Seconds since the epoch; negative for session cookies.
    pub expires: f64,
    pub http_only: bool,
    pub secure: bool,
}

impl SessionState {
    pub fn new(cookies: Vec<StoredCookie>) -> Self {
        SessionState {
            saved_at: Utc::now(),
            cookies,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ExportError::SessionMissing(path.to_path_buf()).into());
        }
        let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        serde_json::from_str(&raw).with_context(|| format!("Corrupt session file {:?}", path))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))
    }

    pub fn expired_cookies(&self, now: DateTime<Utc>) -> usize {
        let now = now.timestamp() as f64;
        self.cookies
            .iter()
            .filter(|c| c.expires > 0.0 && c.expires < now)
            .count()
    }
}

/// A notebook URL that bounced to the sign-in page means the saved login is no longer valid.
pub fn is_signin_redirect(url: &str) -> bool {
    url.contains("signin")
}

/// Interactive login in a visible browser; saves the session once the user confirms.
pub async fn login(settings: &Settings, channel: BrowserChannel) -> Result<()> {
    let opts = BrowserOptions {
        headless: false,
        channel,
        executable: settings.chrome_executable.clone(),
        poll: settings.poll_interval(),
    };
    let chrome = ChromeSession::launch(&opts).await?;
    chrome.goto(&settings.notebook_url).await?;

    println!("Please log into your Amazon account in the browser window.");
    println!("After you see your Kindle notebook page, press Enter here to save the session.");
    println!("\nPress Enter when logged in and notebook page is visible... ");
    wait_for_enter().await?;

    let cookies = chrome.capture_cookies().await?;
    info!("Captured {} cookies", cookies.len());
    SessionState::new(cookies).save(&settings.session_file)?;
    println!("Session saved to {}", settings.session_file.display());

    chrome.close().await
}

async fn wait_for_enter() -> Result<()> {
    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line).map(|_| ())
    })
    .await??;
    Ok(())
}

// ── Tests ──
