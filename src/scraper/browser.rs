//! Headless Chrome via chromiumoxide, for race pages rendered client-side.

use anyhow::Result;
use chromiumoxide::browser::{Browser as ChromeBrowser, BrowserConfig};
use futures::StreamExt;
use std::time::Duration;
use tracing::debug;

use crate::config::ScraperConfig;

/// Browser wrapper for rendered page fetches
pub struct Browser {
    browser: ChromeBrowser,
    handle: tokio::task::JoinHandle<()>,
    settle: Duration,
}

impl Browser {
    /// Launch a new headless browser instance
    pub async fn launch(config: &ScraperConfig) -> Result<Self> {
        let chrome_path = config.chrome_path.clone().unwrap_or_else(|| {
            if cfg!(target_os = "macos") {
                "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome".to_string()
            } else if cfg!(target_os = "windows") {
                "C:\\Program Files\\Google\\Chrome\\Application\\chrome.exe".to_string()
            } else {
                "google-chrome".to_string()
            }
        });

        let browser_config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .no_sandbox()
            .disable_default_args()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-extensions")
            .arg("--mute-audio")
            .arg(format!("--user-agent={}", config.user_agent))
            .window_size(1920, 1080)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut handler) = ChromeBrowser::launch(browser_config)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to launch browser: {}", e))?;

        // The handler has to be polled for the browser to make progress
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {}", e);
                }
            }
        });

        Ok(Self {
            browser,
            handle,
            settle: config.browser_settle(),
        })
    }

    /// Fetch page content after client-side rendering
    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", url, e))?;

        // Race cards hydrate after load; give the scripts a fixed settle time
        tokio::time::sleep(self.settle).await;

        let html = page
            .content()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get page content: {}", e));

        if let Err(e) = page.close().await {
            debug!("Failed to close page {}: {}", url, e);
        }

        html
    }

    /// Close the browser and reap the Chrome process
    pub async fn close(mut self) -> Result<()> {
        let closed = self.browser.close().await;

        match &closed {
            Ok(_) => match self.browser.wait().await {
                Ok(status) => debug!("Browser exited: {:?}", status),
                Err(e) => debug!("Failed to wait for browser exit: {}", e),
            },
            Err(e) => {
                debug!("Browser close request failed: {}, killing it", e);
                if let Some(Err(e)) = self.browser.kill().await {
                    debug!("Failed to kill browser: {}", e);
                }
            }
        }
        self.handle.abort();

        closed
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("Failed to close browser: {}", e))
    }
}
