use std::time::Duration;

use async_trait::async_trait;

use crate::chrome::ChromeDriver;
use crate::error::Result;

/// Browser operations the automation sequence needs, behind a trait so the
/// orchestration can run against a scripted stand-in as well as real Chrome.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Opaque handle to a located element.
    type Handle: Send + Sync;

    /// Navigate the session's page to a URL
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Find an element, polling until it appears or the wait runs out
    async fn locate(&self, selector: &str, timeout: Duration) -> Result<Self::Handle>;

    /// Replace the element's current value with the given text
    async fn clear_and_type(&self, handle: &Self::Handle, text: &str) -> Result<()>;

    /// Pick a select option by its visible label
    async fn select_by_label(&self, handle: &Self::Handle, label: &str) -> Result<()>;

    /// Pick a select option by its value attribute
    async fn select_by_value(&self, handle: &Self::Handle, value: &str) -> Result<()>;

    /// Click an element
    async fn click(&self, handle: &Self::Handle) -> Result<()>;

    /// URL the page currently shows
    async fn current_url(&self) -> Result<String>;

    /// Wait until the page URL differs from `previous`
    async fn wait_for_url_change(&self, previous: &str, timeout: Duration) -> Result<()>;

    /// Release the browser session. Safe to call more than once.
    async fn close(&mut self) -> Result<()>;
}

/// Launch settings for the Chrome-backed driver.
pub struct DriverConfig {
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub chrome_path: Option<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            chrome_path: None,
        }
    }
}

pub struct DriverBuilder {
    config: DriverConfig,
}

impl DriverBuilder {
    pub fn new() -> Self {
        Self {
            config: DriverConfig::default(),
        }
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<String>) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    pub fn build_config(self) -> DriverConfig {
        self.config
    }

    pub async fn build(self) -> Result<ChromeDriver> {
        ChromeDriver::launch(self.build_config()).await
    }
}

impl Default for DriverBuilder {
    fn default() -> Self {
        Self::new()
    }
}
