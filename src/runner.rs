use std::sync::Arc;
use std::time::Duration;

use crate::config::RunInput;
use crate::driver::Driver;
use crate::error::Result;
use crate::filler::FormFiller;
use crate::report::{Completion, Reporter};

/// Final outcome of a run. `fields_filled` is informational; `success` means
/// every stage through form submission completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    pub success: bool,
    pub fields_filled: usize,
}

/// Drives one automation pass: log in, reach the form, fill its fields,
/// submit. Login and navigation errors end the run; field-level problems are
/// reported and skipped. Whatever happens, the browser session is released
/// before the result comes back.
pub struct AutomationRunner<D: Driver> {
    driver: D,
    input: RunInput,
    reporter: Arc<dyn Reporter>,
    element_timeout: Duration,
    login_timeout: Duration,
}

impl<D: Driver> AutomationRunner<D> {
    pub fn new(driver: D, input: RunInput, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            driver,
            input,
            reporter,
            element_timeout: Duration::from_secs(10),
            login_timeout: Duration::from_secs(10),
        }
    }

    /// How long element lookups poll before failing.
    pub fn element_timeout(mut self, timeout: Duration) -> Self {
        self.element_timeout = timeout;
        self
    }

    /// How long to wait for the URL to change after submitting credentials.
    pub fn login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    /// Run the full sequence and release the browser.
    pub async fn run(mut self) -> RunResult {
        self.reporter.info(&format!(
            "Starting automation for {} fields",
            self.input.fields.len()
        ));

        let mut fields_filled = 0;
        let outcome = self.run_stages(&mut fields_filled).await;

        let result = match outcome {
            Ok(()) => {
                self.reporter.success(&format!(
                    "Automation completed! Filled {fields_filled} fields."
                ));
                self.reporter.completion(&Completion::complete(fields_filled));
                RunResult {
                    success: true,
                    fields_filled,
                }
            }
            Err(err) => {
                self.reporter.error(&format!("Automation failed: {err}"));
                RunResult {
                    success: false,
                    fields_filled,
                }
            }
        };

        self.reporter.debug("Closing browser...");
        if let Err(err) = self.driver.close().await {
            self.reporter.warn(&format!("Browser close failed: {err}"));
        }

        result
    }

    async fn run_stages(&self, fields_filled: &mut usize) -> Result<()> {
        self.login().await?;
        self.navigate_to_form().await?;
        *fields_filled = self.fill_fields().await;
        self.submit().await?;
        Ok(())
    }

    async fn login(&self) -> Result<()> {
        let site = &self.input.website_config;
        self.reporter.progress("Starting login process...");

        self.reporter.debug(&format!("Navigating to: {}", site.login_url));
        self.driver.navigate(&site.login_url).await?;

        self.reporter.progress("Filling login credentials...");
        let username_field = self
            .driver
            .locate(&site.username_selector, self.element_timeout)
            .await?;
        self.driver
            .clear_and_type(&username_field, &self.input.credentials.username)
            .await?;

        let password_field = self
            .driver
            .locate(&site.password_selector, self.element_timeout)
            .await?;
        self.driver
            .clear_and_type(&password_field, &self.input.credentials.password)
            .await?;

        // The URL is captured before the click so the post-submit wait has a
        // stable reference point.
        let before = self.driver.current_url().await?;
        let submit_button = self
            .driver
            .locate(&site.submit_selector, self.element_timeout)
            .await?;
        self.driver.click(&submit_button).await?;
        self.driver
            .wait_for_url_change(&before, self.login_timeout)
            .await?;

        self.reporter.success(&format!(
            "Successfully logged in as {}",
            self.input.credentials.username
        ));
        Ok(())
    }

    async fn navigate_to_form(&self) -> Result<()> {
        self.reporter.progress("Navigating to form page...");
        let form_url = &self.input.website_config.form_url;
        self.reporter.debug(&format!("Navigating to: {form_url}"));
        self.driver.navigate(form_url).await?;
        self.reporter.info("Reached form page");
        Ok(())
    }

    async fn fill_fields(&self) -> usize {
        self.reporter.progress(&format!(
            "Filling {} form fields...",
            self.input.fields.len()
        ));
        let filler = FormFiller::new(&self.driver, self.reporter.as_ref(), self.element_timeout);
        filler.fill_all(&self.input.fields).await.filled_count()
    }

    async fn submit(&self) -> Result<()> {
        self.reporter.progress("Submitting form...");
        let submit_button = self
            .driver
            .locate(
                &self.input.website_config.submit_selector,
                self.element_timeout,
            )
            .await?;
        self.driver.click(&submit_button).await?;
        self.reporter.success("Form submitted successfully!");
        Ok(())
    }
}
