//! Headless browser session management
//!
//! One [`BrowserSession`] is launched per job and closed on every exit path.
//! Detail pages are opened on the shared session and wrapped in a
//! [`PageGuard`] so they are closed even when extraction fails.

use crate::config::BrowserConfig;
use crate::{HarvestError, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{debug, info, trace, warn};

/// User agent presented by job pages; a desktop Chrome string keeps the
/// results page serving its normal desktop DOM
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Find a Chrome/Chromium executable on the system
///
/// Order: explicit config path, `CHROMIUM_PATH` environment variable,
/// well-known install locations, then `which` on Unix.
pub fn find_browser_executable(config: &BrowserConfig) -> Result<PathBuf> {
    if let Some(configured) = &config.chrome_executable {
        let path = PathBuf::from(configured);
        if path.exists() {
            info!("Using browser from configuration: {}", path.display());
            return Ok(path);
        }
        warn!(
            "Configured chrome-executable does not exist: {}",
            path.display()
        );
    }

    if let Ok(env_path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            info!("Using browser from CHROMIUM_PATH: {}", path.display());
            return Ok(path);
        }
        warn!(
            "CHROMIUM_PATH points to non-existent file: {}",
            path.display()
        );
    }

    let candidates: &[&str] = if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    };

    for candidate in candidates {
        let path = PathBuf::from(candidate);
        if path.exists() {
            info!("Found browser at: {}", path.display());
            return Ok(path);
        }
    }

    if !cfg!(target_os = "windows") {
        for cmd in &["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path_str.is_empty() {
                        let path = PathBuf::from(path_str);
                        info!("Found browser via 'which': {}", path.display());
                        return Ok(path);
                    }
                }
            }
        }
    }

    Err(HarvestError::Launch(
        "Chrome/Chromium executable not found; set CHROMIUM_PATH or browser.chrome-executable"
            .to_string(),
    ))
}

/// A launched browser plus the CDP handler task that keeps it alive
///
/// Owned by exactly one job. [`BrowserSession::close`] shuts the browser down
/// gracefully; `Drop` aborts the handler and removes the temporary profile
/// directory in case close was skipped on an error path.
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserSession {
    /// Launches a browser according to the configuration
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let chrome_path = find_browser_executable(config)?;

        let user_data_dir =
            std::env::temp_dir().join(format!("mapharvest_chrome_{}", std::process::id()));
        std::fs::create_dir_all(&user_data_dir)?;

        let mut builder = BrowserConfigBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .window_size(1920, 1080)
            .user_data_dir(user_data_dir.clone())
            .chrome_executable(chrome_path);

        if config.headless {
            builder = builder.headless_mode(HeadlessMode::default());
        } else {
            builder = builder.with_head();
        }

        builder = builder
            .arg(format!("--user-agent={}", USER_AGENT))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-notifications")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--no-sandbox")
            .arg("--mute-audio")
            .arg("--hide-scrollbars");

        let browser_config = builder.build().map_err(HarvestError::Launch)?;

        info!("Launching browser (headless: {})", config.headless);
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| HarvestError::Launch(e.to_string()))?;

        let handler_task = task::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    let message = e.to_string();
                    // Chrome emits CDP events chromiumoxide does not model;
                    // those deserialization failures are not actionable.
                    let benign = message
                        .contains("data did not match any variant of untagged enum Message")
                        || message.contains("Failed to deserialize WS response");
                    if benign {
                        trace!("Suppressed benign CDP error: {}", message);
                    } else {
                        warn!("Browser handler error: {}", message);
                    }
                }
            }
            debug!("Browser handler task finished");
        });

        Ok(Self {
            browser,
            handler: handler_task,
            user_data_dir: Some(user_data_dir),
        })
    }

    /// Opens a new page on this session, wrapped in a close-on-drop guard
    pub async fn new_page(&self, url: &str) -> Result<PageGuard> {
        let page = self.browser.new_page(url).await?;
        Ok(PageGuard::new(page))
    }

    /// Gracefully shuts the browser down and removes the profile directory
    pub async fn close(mut self) -> Result<()> {
        info!("Closing browser session");
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        let _ = self.browser.wait().await;
        self.handler.abort();
        self.cleanup_user_data_dir();
        Ok(())
    }

    fn cleanup_user_data_dir(&mut self) {
        if let Some(dir) = self.user_data_dir.take() {
            if let Err(e) = std::fs::remove_dir_all(&dir) {
                warn!(
                    "Failed to remove browser profile directory {}: {}",
                    dir.display(),
                    e
                );
            }
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
        if self.user_data_dir.is_some() {
            self.cleanup_user_data_dir();
        }
    }
}

/// RAII wrapper that closes the page on drop
///
/// Detail-page extraction can fail at any await point; the guard guarantees
/// the underlying browser tab is closed on every exit path.
pub struct PageGuard {
    page: Option<Page>,
}

impl PageGuard {
    pub fn new(page: Page) -> Self {
        Self { page: Some(page) }
    }
}

impl std::ops::Deref for PageGuard {
    type Target = Page;

    fn deref(&self) -> &Page {
        self.page.as_ref().expect("page taken before drop")
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if let Some(page) = self.page.take() {
            // Page::close consumes the page and must run on the runtime
            task::spawn(async move {
                if let Err(e) = page.close().await {
                    debug!("Failed to close page: {}", e);
                }
            });
        }
    }
}
