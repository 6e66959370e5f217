use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{CookieParam, TimeSinceEpoch};
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::dom::Renderer;
use crate::session::{SessionState, StoredCookie};

const SYSTEM_CHROME_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/google-chrome",
    "/opt/google/chrome/chrome",
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
];

/// Which browser binary to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowserChannel {
    /// Whatever Chromium build chromiumoxide detects.
    #[default]
    Bundled,
    /// The system's Google Chrome install.
    Chrome,
}

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub channel: BrowserChannel,
    pub executable: Option<PathBuf>,
    pub poll: Duration,
}

/// One browser with a single tab, owned by whoever is driving the notebook.
pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    poll: Duration,
}

impl ChromeSession {
    pub async fn launch(opts: &BrowserOptions) -> Result<Self> {
        let mut builder = BrowserConfig::builder();
        if !opts.headless {
            builder = builder.with_head();
        }
        if let Some(exe) = resolve_executable(opts)? {
            info!("Using browser executable {}", exe.display());
            builder = builder.chrome_executable(exe);
        }
        let config = builder.build().map_err(|e| anyhow!("Invalid browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch browser")?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler: {}", e);
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        Ok(ChromeSession {
            browser,
            handler,
            page,
            poll: opts.poll,
        })
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        info!("Navigating to {}", url);
        self.page
            .goto(url)
            .await
            .with_context(|| format!("Failed to open {}", url))?;
        self.page.wait_for_navigation().await?;
        Ok(())
    }

    /// Load saved cookies into the browser's cookie store. Works before any navigation:
    /// the tab is still on `about:blank`, which page-level cookie calls refuse.
    pub async fn restore_session(&self, session: &SessionState) -> Result<()> {
        let params = cookie_params(&session.cookies)?;
        if !params.is_empty() {
            self.browser
                .set_cookies(params)
                .await
                .context("Failed to restore session cookies")?;
        }
        Ok(())
    }

    /// Every cookie in the browser, not only those of the current page.
    pub async fn capture_cookies(&self) -> Result<Vec<StoredCookie>> {
        let cookies = self.browser.get_cookies().await?;
        Ok(cookies
            .into_iter()
            .map(|c| StoredCookie {
                name: c.name,
                value: c.value,
                domain: c.domain,
                path: c.path,
                expires: c.expires,
                http_only: c.http_only,
                secure: c.secure,
            })
            .collect())
    }

    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await?;
        self.browser.wait().await?;
        self.handler.abort();
        Ok(())
    }
}

/// Domain-scoped parameters; none carries a URL, so they never depend on the open page.
fn cookie_params(cookies: &[StoredCookie]) -> Result<Vec<CookieParam>> {
    cookies.iter().map(to_cookie_param).collect()
}

fn to_cookie_param(c: &StoredCookie) -> Result<CookieParam> {
    let mut builder = CookieParam::builder()
        .name(c.name.clone())
        .value(c.value.clone())
        .domain(c.domain.clone())
        .path(c.path.clone())
        .http_only(c.http_only)
        .secure(c.secure);
    if c.expires > 0.0 {
        builder = builder.expires(TimeSinceEpoch::new(c.expires));
    }
    builder
        .build()
        .map_err(|e| anyhow!("Invalid cookie {}: {}", c.name, e))
}

fn resolve_executable(opts: &BrowserOptions) -> Result<Option<PathBuf>> {
    if let Some(exe) = &opts.executable {
        return Ok(Some(exe.clone()));
    }
    match opts.channel {
        BrowserChannel::Bundled => Ok(None),
        BrowserChannel::Chrome => SYSTEM_CHROME_PATHS
            .iter()
            .map(Path::new)
            .find(|p| p.exists())
            .map(|p| Some(p.to_path_buf()))
            .ok_or_else(|| anyhow!("Google Chrome not found; set KINDLE_CHROME_EXECUTABLE")),
    }
}

/// JS predicate: an element matching the selector exists and takes up space.
fn visibility_probe(selector: &str) -> Result<String> {
    let quoted = serde_json::to_string(selector)?;
    Ok(format!(
        "(() => {{ const el = document.querySelector({}); \
         if (!el) return false; \
         const r = el.getBoundingClientRect(); \
         return r.width > 0 || r.height > 0; }})()",
        quoted
    ))
}

#[async_trait]
impl Renderer for ChromeSession {
    type Node = Element;

    async fn current_url(&self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<bool> {
        let probe = visibility_probe(selector)?;
        let deadline = Instant::now() + timeout;
        loop {
            let visible: bool = self
                .page
                .evaluate(probe.as_str())
                .await?
                .into_value()
                .unwrap_or(false);
            if visible {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                debug!("{} not visible after {:?}", selector, timeout);
                return Ok(false);
            }
            tokio::time::sleep(self.poll).await;
        }
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Element>> {
        Ok(self.page.find_elements(selector).await?)
    }

    async fn query_within(&self, node: &Element, selector: &str) -> Result<Option<Element>> {
        Ok(node.find_elements(selector).await?.into_iter().next())
    }

    async fn text(&self, node: &Element) -> Result<String> {
        Ok(node
            .inner_text()
            .await?
            .map(|t| t.trim().to_string())
            .unwrap_or_default())
    }

    async fn click(&self, node: &Element) -> Result<()> {
        node.click().await?;
        Ok(())
    }
}
