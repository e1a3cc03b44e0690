use rstest::fixture;
use tracing::info;

use restcall_core::testing::MockExecutor;
use restcall_core::{GlobalSettings, HttpResponse, RestClient};

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

#[fixture]
pub fn executor() -> MockExecutor {
    init_tracing();
    MockExecutor::new(HttpResponse::new(200).with_body("{}"))
}

pub fn client(settings: GlobalSettings, executor: &MockExecutor) -> anyhow::Result<RestClient> {
    let client = RestClient::builder()
        .with_settings(settings)
        .with_executor(executor.clone())
        .build()?;
    Ok(client)
}
