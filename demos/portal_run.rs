use std::sync::Arc;

use formpilot::config::{Credentials, FieldKind, FieldSpec, RunInput, SiteConfig};
use formpilot::report::{LineReporter, Reporter};
use formpilot::runner::AutomationRunner;
use formpilot::ChromeDriver;

// Expects a portal with a login page and a form at the URLs below, for
// example a local fixture server.
#[tokio::main]
async fn main() -> formpilot::Result<()> {
    let input = RunInput {
        fields: vec![
            FieldSpec {
                name: "Project Name".into(),
                selector: "#project_name".into(),
                value: "Apollo".into(),
                kind: FieldKind::PlainText,
                is_required: true,
            },
            FieldSpec {
                name: "Department".into(),
                selector: "#department".into(),
                value: "Engineering".into(),
                kind: FieldKind::SingleChoice,
                is_required: false,
            },
            FieldSpec {
                name: "Description".into(),
                selector: "#description".into(),
                value: "Quarterly rollout".into(),
                kind: FieldKind::MultilineText,
                is_required: false,
            },
        ],
        credentials: Credentials {
            username: "demo".into(),
            password: "demo-password".into(),
        },
        website_config: SiteConfig {
            name: "Demo Portal".into(),
            url: "http://localhost:8080".into(),
            login_url: "http://localhost:8080/login".into(),
            form_url: "http://localhost:8080/form".into(),
            username_selector: "#username".into(),
            password_selector: "#password".into(),
            submit_selector: "#submit".into(),
        },
    };
    input.validate()?;

    let driver = ChromeDriver::builder().headless(true).build().await?;
    let reporter: Arc<dyn Reporter> = Arc::new(LineReporter::new());

    let result = AutomationRunner::new(driver, input, reporter).run().await;
    println!(
        "success={} fields_filled={}",
        result.success, result.fields_filled
    );
    Ok(())
}
