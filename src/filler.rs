use std::time::Duration;

use crate::config::{FieldKind, FieldSpec};
use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::report::Reporter;

/// What happened to a single field. `attempted` is false for fields skipped
/// over a blank value; those never count as failures.
#[derive(Debug, Clone)]
pub struct FieldOutcome {
    pub name: String,
    pub attempted: bool,
    pub filled: bool,
    pub reason: Option<String>,
}

/// Per-field outcomes in input order.
#[derive(Debug, Default)]
pub struct FillSummary {
    outcomes: Vec<FieldOutcome>,
}

impl FillSummary {
    pub fn outcomes(&self) -> &[FieldOutcome] {
        &self.outcomes
    }

    /// How many fields were actually written.
    pub fn filled_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.filled).count()
    }

    fn push(&mut self, outcome: FieldOutcome) {
        self.outcomes.push(outcome);
    }
}

/// Fills a list of fields one at a time. A field that cannot be filled is
/// reported and recorded, and the next field still runs; nothing in here
/// aborts the sequence.
pub struct FormFiller<'a, D: Driver> {
    driver: &'a D,
    reporter: &'a dyn Reporter,
    element_timeout: Duration,
}

impl<'a, D: Driver> FormFiller<'a, D> {
    pub fn new(driver: &'a D, reporter: &'a dyn Reporter, element_timeout: Duration) -> Self {
        Self {
            driver,
            reporter,
            element_timeout,
        }
    }

    /// Process every field in input order and report the aggregate count.
    pub async fn fill_all(&self, fields: &[FieldSpec]) -> FillSummary {
        let mut summary = FillSummary::default();

        for field in fields {
            summary.push(self.fill_one(field).await);
        }

        self.reporter.info(&format!(
            "Successfully filled {}/{} fields",
            summary.filled_count(),
            fields.len()
        ));
        summary
    }

    async fn fill_one(&self, field: &FieldSpec) -> FieldOutcome {
        if field.value.trim().is_empty() {
            if field.is_required {
                self.reporter
                    .warn(&format!("Required field '{}' is empty", field.name));
            }
            return FieldOutcome {
                name: field.name.clone(),
                attempted: false,
                filled: false,
                reason: None,
            };
        }

        self.reporter
            .debug(&format!("Filling '{}' with '{}'", field.name, field.value));

        match self.try_fill(field).await {
            Ok(()) => {
                self.reporter
                    .success(&format!("✓ Filled '{}'", field.name));
                FieldOutcome {
                    name: field.name.clone(),
                    attempted: true,
                    filled: true,
                    reason: None,
                }
            }
            Err(err) => {
                self.reporter
                    .error(&format!("Failed to fill '{}': {}", field.name, err));
                FieldOutcome {
                    name: field.name.clone(),
                    attempted: true,
                    filled: false,
                    reason: Some(err.to_string()),
                }
            }
        }
    }

    async fn try_fill(&self, field: &FieldSpec) -> Result<()> {
        let handle = self.driver.locate(&field.selector, self.element_timeout).await?;
        match field.kind {
            FieldKind::PlainText | FieldKind::MultilineText => {
                self.driver.clear_and_type(&handle, &field.value).await
            }
            FieldKind::SingleChoice => self.select(&handle, &field.value).await,
        }
    }

    /// Match by visible label first; only a label miss falls back to the
    /// value attribute. Any other error is final.
    async fn select(&self, handle: &D::Handle, value: &str) -> Result<()> {
        match self.driver.select_by_label(handle, value).await {
            Ok(()) => Ok(()),
            Err(Error::NoSuchOption(_)) => self.driver.select_by_value(handle, value).await,
            Err(err) => Err(err),
        }
    }
}
