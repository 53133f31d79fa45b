use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use formpilot::config::RunInput;
use formpilot::driver::DriverBuilder;
use formpilot::report::{LineReporter, Reporter};
use formpilot::runner::AutomationRunner;

/// Logs in to a website, opens a form, fills its fields, and submits it.
///
/// The payload arrives as one JSON document on stdin; progress streams to
/// stdout as prefixed lines for the controlling process to parse. Exit code
/// 0 means the form was submitted, 1 means the run failed.
#[derive(Parser, Debug)]
#[command(name = "formpilot", about = "Scripted browser login and form filling", version)]
struct Cli {
    /// Read the automation payload as JSON from stdin.
    #[arg(long)]
    json_input: bool,

    /// Run Chrome with a visible window instead of headless.
    #[arg(long)]
    visible: bool,

    /// Path to a Chrome executable, if not auto-detected.
    #[arg(long)]
    chrome: Option<String>,

    /// Seconds to wait for elements and for the post-login URL change.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Verbose diagnostics on stderr.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.debug {
        "formpilot=debug"
    } else {
        "formpilot=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let reporter: Arc<dyn Reporter> = Arc::new(LineReporter::new());
    std::process::exit(run(cli, reporter).await);
}

async fn run(cli: Cli, reporter: Arc<dyn Reporter>) -> i32 {
    if !cli.json_input {
        reporter.error("This program requires the --json-input flag");
        return 1;
    }

    let mut raw = String::new();
    if let Err(err) = std::io::stdin().read_to_string(&mut raw) {
        reporter.error(&format!("Failed to read input: {err}"));
        return 1;
    }

    let input = match RunInput::from_json(&raw) {
        Ok(input) => {
            reporter.debug("Received automation payload on stdin");
            input
        }
        Err(err) => {
            reporter.error(&format!("Invalid JSON input: {err}"));
            return 1;
        }
    };

    tracing::debug!(
        fields = input.fields.len(),
        site = %input.website_config.name,
        "payload parsed"
    );

    reporter.progress("Starting Chrome browser...");
    let mut builder = DriverBuilder::new().headless(!cli.visible);
    if let Some(path) = cli.chrome {
        builder = builder.chrome_path(path);
    }
    let driver = match builder.build().await {
        Ok(driver) => driver,
        Err(err) => {
            reporter.error(&format!("Failed to start browser: {err}"));
            return 1;
        }
    };
    reporter.success("Chrome browser started successfully");

    let timeout = Duration::from_secs(cli.timeout_secs);
    let result = AutomationRunner::new(driver, input, Arc::clone(&reporter))
        .element_timeout(timeout)
        .login_timeout(timeout)
        .run()
        .await;

    if result.success {
        reporter.success("🎉 Automation completed successfully!");
        0
    } else {
        1
    }
}
