//! Page fetching over plain HTTPS, with an optional headless browser for
//! pages that only render their race card client-side.

use anyhow::Result;
use reqwest::Client;
use tracing::{debug, info};

use super::browser::Browser;
use crate::config::ScraperConfig;
use crate::retry::{retry, RetryConfig};

/// Source of page HTML
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    /// Fetch the static markup of `url`
    async fn fetch(&self, url: &str) -> Result<String>;

    /// Fetch `url` after client-side rendering; plain fetch unless overridden
    async fn fetch_rendered(&self, url: &str) -> Result<String> {
        self.fetch(url).await
    }
}

/// HTTP GET with a desktop user agent and a fixed-backoff retry loop
pub struct HttpFetcher {
    client: Client,
    retry: RetryConfig,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            retry: RetryConfig::from_scraper(config),
        })
    }

    async fn get_once(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        retry(&self.retry, url, || self.get_once(url)).await
    }
}

/// HTTP fetcher plus, when enabled, a headless browser for rendered pages
pub struct SiteFetcher {
    http: HttpFetcher,
    browser: Option<Browser>,
}

impl SiteFetcher {
    /// Build the fetchers; Chrome is only launched when `browser_fallback` is set
    pub async fn connect(config: &ScraperConfig) -> Result<Self> {
        let http = HttpFetcher::new(config)?;
        let browser = if config.browser_fallback {
            info!("Launching headless browser for rendered pages");
            Some(Browser::launch(config).await?)
        } else {
            None
        };

        Ok(Self { http, browser })
    }

    pub async fn close(self) -> Result<()> {
        if let Some(browser) = self.browser {
            browser.close().await?;
        }
        Ok(())
    }
}

impl PageFetcher for SiteFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.http.fetch(url).await
    }

    async fn fetch_rendered(&self, url: &str) -> Result<String> {
        match &self.browser {
            Some(browser) => browser.fetch_page(url).await,
            None => self.http.fetch(url).await,
        }
    }
}
