pub mod chrome;
pub mod config;
pub mod driver;
pub mod error;
pub mod filler;
pub mod report;
pub mod runner;

pub use chrome::ChromeDriver;
pub use config::{FieldKind, FieldSpec, RunInput, SiteConfig};
pub use driver::{Driver, DriverBuilder};
pub use error::{Error, Result};
pub use report::{LineReporter, MemoryReporter, Reporter};
pub use runner::{AutomationRunner, RunResult};
