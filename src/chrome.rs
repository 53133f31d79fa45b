use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CrBrowser, BrowserConfig as CrBrowserConfig};
use chromiumoxide::element::Element as CrElement;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page as CrPage;
use futures::StreamExt;
use tracing::debug;

use crate::driver::{Driver, DriverBuilder, DriverConfig};
use crate::error::{Error, Result};

/// Chrome flags that keep headless runs stable inside containers.
const STABILITY_ARGS: &[&str] = &["disable-gpu", "disable-dev-shm-usage"];

/// An element located by [`ChromeDriver::locate`]. Keeps the selector it was
/// found under so page-level scripts can re-address the same element.
#[derive(Debug)]
pub struct ChromeHandle {
    element: CrElement,
    selector: String,
}

/// Chrome session behind the [`Driver`] trait: one browser process, one page,
/// torn down once by [`Driver::close`].
pub struct ChromeDriver {
    browser: Option<CrBrowser>,
    page: Option<CrPage>,
    handler_task: Option<tokio::task::JoinHandle<()>>,
}

impl ChromeDriver {
    /// Create a new DriverBuilder for configuring and launching a session.
    pub fn builder() -> DriverBuilder {
        DriverBuilder::new()
    }

    /// Launch Chrome with the given configuration and open the working page.
    pub async fn launch(config: DriverConfig) -> Result<Self> {
        let mut builder = CrBrowserConfig::builder();

        if config.headless {
            builder = builder.new_headless_mode().no_sandbox();
        } else {
            builder = builder.with_head().no_sandbox();
        }

        for arg in STABILITY_ARGS {
            builder = builder.arg(*arg);
        }

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder = builder.viewport(Viewport {
            width: config.viewport_width,
            height: config.viewport_height,
            device_scale_factor: None,
            emulating_mobile: false,
            is_landscape: false,
            has_touch: false,
        });

        let cr_config = builder
            .build()
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let (browser, mut handler) = CrBrowser::launch(cr_config)
            .await
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        debug!(
            "Chrome session started (headless: {}, viewport: {}x{})",
            config.headless, config.viewport_width, config.viewport_height
        );

        Ok(Self {
            browser: Some(browser),
            page: Some(page),
            handler_task: Some(handler_task),
        })
    }

    fn page(&self) -> Result<&CrPage> {
        self.page
            .as_ref()
            .ok_or_else(|| Error::NavigationError("browser session already closed".into()))
    }

    /// Run a script that walks the options of the `<select>` behind `handle`
    /// and picks the first one the match expression accepts. Returns whether
    /// anything matched.
    async fn select_matching(
        &self,
        handle: &ChromeHandle,
        match_expr: &str,
        needle: &str,
    ) -> Result<bool> {
        let selector_js =
            serde_json::to_string(&handle.selector).map_err(|e| Error::JsError(e.to_string()))?;
        let needle_js = serde_json::to_string(needle).map_err(|e| Error::JsError(e.to_string()))?;
        let js = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector_js});
                if (!el) throw new Error('Element not found: ' + {selector_js});
                const needle = {needle_js};
                for (const opt of el.options) {{
                    if ({match_expr}) {{
                        el.value = opt.value;
                        el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                        return true;
                    }}
                }}
                return false;
            }})()
            "#,
        );
        let result = self
            .page()?
            .evaluate(js)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        result
            .into_value::<bool>()
            .map_err(|e| Error::JsError(e.to_string()))
    }
}

#[async_trait]
impl Driver for ChromeDriver {
    type Handle = ChromeHandle;

    async fn navigate(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        self.page()?
            .goto(url)
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?;
        Ok(())
    }

    /// Polls every 100ms until the selector resolves or the wait runs out.
    async fn locate(&self, selector: &str, timeout: Duration) -> Result<ChromeHandle> {
        let page = self.page()?;
        let interval = Duration::from_millis(100);
        let start = Instant::now();

        loop {
            match page.find_element(selector).await {
                Ok(element) => {
                    return Ok(ChromeHandle {
                        element,
                        selector: selector.to_string(),
                    });
                }
                Err(_) if start.elapsed() < timeout => {
                    tokio::time::sleep(interval).await;
                }
                Err(_) => {
                    return Err(Error::ElementNotFound(format!(
                        "no element matching '{}' after {}ms",
                        selector,
                        timeout.as_millis()
                    )));
                }
            }
        }
    }

    async fn clear_and_type(&self, handle: &ChromeHandle, text: &str) -> Result<()> {
        let selector_js =
            serde_json::to_string(&handle.selector).map_err(|e| Error::JsError(e.to_string()))?;
        let js = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector_js});
                if (!el) throw new Error('Element not found: ' + {selector_js});
                el.value = '';
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            }})()
            "#,
        );
        self.page()?
            .evaluate(js)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;

        handle.element.click().await?;
        handle.element.type_str(text).await?;
        Ok(())
    }

    async fn select_by_label(&self, handle: &ChromeHandle, label: &str) -> Result<()> {
        if self
            .select_matching(handle, "opt.text.trim() === needle", label)
            .await?
        {
            Ok(())
        } else {
            Err(Error::NoSuchOption(format!(
                "'{}' has no option labeled '{}'",
                handle.selector, label
            )))
        }
    }

    async fn select_by_value(&self, handle: &ChromeHandle, value: &str) -> Result<()> {
        if self
            .select_matching(handle, "opt.value === needle", value)
            .await?
        {
            Ok(())
        } else {
            Err(Error::NoSuchOption(format!(
                "'{}' has no option with value '{}'",
                handle.selector, value
            )))
        }
    }

    async fn click(&self, handle: &ChromeHandle) -> Result<()> {
        handle.element.click().await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        self.page()?
            .url()
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?
            .ok_or_else(|| Error::NavigationError("No URL found".into()))
    }

    /// Polls every 100ms until the page URL differs from `previous`.
    async fn wait_for_url_change(&self, previous: &str, timeout: Duration) -> Result<()> {
        let interval = Duration::from_millis(100);
        let start = Instant::now();

        loop {
            let current = self.current_url().await?;
            if current != previous {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(Error::Timeout(format!(
                    "URL still '{}' after {}ms",
                    previous,
                    timeout.as_millis()
                )));
            }
            tokio::time::sleep(interval).await;
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.page.take();
        // The handler task drains the CDP event stream; it ends on its own
        // once the browser connection drops.
        self.handler_task.take();
        if let Some(mut browser) = self.browser.take() {
            debug!("Closing Chrome session");
            browser.close().await?;
        }
        Ok(())
    }
}
