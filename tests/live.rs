use std::time::Duration;

use formpilot::driver::{Driver, DriverBuilder};
use formpilot::error::Error;

#[tokio::test]
#[ignore = "needs a local Chrome installation and network access"]
async fn test_launch_navigate_and_close() {
    let mut driver = DriverBuilder::new()
        .headless(true)
        .build()
        .await
        .expect("Failed to launch browser");

    driver
        .navigate("https://example.com")
        .await
        .expect("Failed to navigate");

    let url = driver.current_url().await.expect("Failed to get URL");
    assert!(url.contains("example.com"), "URL was: {url}");

    let _heading = driver
        .locate("h1", Duration::from_secs(10))
        .await
        .expect("Failed to locate h1");

    driver.close().await.expect("Failed to close browser");
    driver.close().await.expect("Second close should be a no-op");
}

#[tokio::test]
#[ignore = "needs a local Chrome installation and network access"]
async fn test_locate_missing_element_gives_up() {
    let mut driver = DriverBuilder::new()
        .headless(true)
        .build()
        .await
        .expect("Failed to launch browser");

    driver
        .navigate("https://example.com")
        .await
        .expect("Failed to navigate");

    let err = driver
        .locate("#does-not-exist", Duration::from_secs(1))
        .await
        .expect_err("Selector should not resolve");
    assert!(matches!(err, Error::ElementNotFound(_)), "Got: {err}");

    driver.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "needs a local Chrome installation and network access"]
async fn test_type_into_real_form() {
    let mut driver = DriverBuilder::new()
        .headless(true)
        .build()
        .await
        .expect("Failed to launch browser");

    driver
        .navigate("https://httpbin.org/forms/post")
        .await
        .expect("Failed to navigate");

    let custname = driver
        .locate("input[name='custname']", Duration::from_secs(10))
        .await
        .expect("Failed to locate the name input");
    driver
        .clear_and_type(&custname, "Form Pilot")
        .await
        .expect("Failed to type into the name input");

    let comments = driver
        .locate("textarea[name='comments']", Duration::from_secs(10))
        .await
        .expect("Failed to locate the comments textarea");
    driver
        .clear_and_type(&comments, "Filled by an automated run.")
        .await
        .expect("Failed to type into the textarea");

    driver.close().await.expect("Failed to close browser");
}
