#![allow(missing_docs)]

use rstest::rstest;
use tracing::info;

use restcall_core::testing::MockExecutor;
use restcall_core::{
    ExecutionContext, HttpMethod, Properties, ResourceDescriptor, RestCallError, RestClient,
};

mod common;
pub use self::common::*;

const CONFIGURATION: &str = "
# shared by every call of the client
restcall.protocol = https
restcall.host = api.example.com
restcall.port = 443
restcall.basePath = /v1/
restcall.http.method = GET
restcall.http.headers = Accept:application/json, X-Client:restcall
restcall.http.header.X-Client = integration-tests
restcall.queryParams = locale:en
restcall.placeholders = tenant:acme
";

fn configured_client(executor: &MockExecutor) -> anyhow::Result<RestClient> {
    let properties = Properties::parse(CONFIGURATION);
    let client = RestClient::builder()
        .with_config_source(&properties)?
        .with_executor(executor.clone())
        .build()?;
    Ok(client)
}

#[rstest]
fn test_every_call_starts_from_global_settings(executor: MockExecutor) -> anyhow::Result<()> {
    let client = configured_client(&executor)?;
    let mut ctx = ExecutionContext::new();

    let mut first = client.call();
    first.set_resource_path("${tenant}/users").process(&mut ctx)?;
    let mut second = client.call();
    second.set_resource_path("${tenant}/groups").process(&mut ctx)?;

    let urls = executor
        .requests()
        .into_iter()
        .map(|request| request.url)
        .collect::<Vec<_>>();
    info!(?urls, "requests sent");
    insta::assert_debug_snapshot!(urls, @r#"
    [
        "https://api.example.com/v1/acme/users?locale=en",
        "https://api.example.com/v1/acme/groups?locale=en",
    ]
    "#);

    let request = executor.last_request().expect("a request");
    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(
        request.headers.get("X-Client").map(String::as_str),
        Some("integration-tests")
    );
    Ok(())
}

#[rstest]
fn test_explicit_values_override_global_ones(executor: MockExecutor) -> anyhow::Result<()> {
    let client = configured_client(&executor)?;
    let mut ctx = ExecutionContext::new();

    let mut call = client.call();
    call.set_protocol("http://")
        .set_port(8080)
        .set_resource_path("health")
        .remove_query_param("locale")
        .add_http_header("Accept", "text/plain")
        .head(&mut ctx)?;

    let request = executor.last_request().expect("a request");
    assert_eq!(request.url, "http://api.example.com:8080/v1/health");
    assert_eq!(request.method, HttpMethod::Head);
    assert_eq!(
        request.headers.get("Accept").map(String::as_str),
        Some("text/plain")
    );

    // the global settings are untouched
    let other = client.call();
    assert_eq!(other.query_param("locale"), Some("en"));
    assert_eq!(other.http_header("Accept"), Some("application/json"));
    Ok(())
}

#[rstest]
#[case::http_default("http", 80, "http://h/r")]
#[case::http_other("http", 8080, "http://h:8080/r")]
#[case::https_default("https", 443, "https://h/r")]
#[case::https_on_http_port("https", 80, "https://h:80/r")]
fn test_default_port_suppression(
    executor: MockExecutor,
    #[case] protocol: &str,
    #[case] port: u16,
    #[case] expected: &str,
) -> anyhow::Result<()> {
    let settings = restcall_core::GlobalSettings::default()
        .with_protocol(protocol)
        .with_port(port)
        .with_host("h")
        .with_resource_path("r");
    let client = client(settings, &executor)?;

    assert_eq!(client.call().url().as_deref(), Some(expected));
    Ok(())
}

#[rstest]
fn test_descriptor_overrides_settings_and_setter_overrides_descriptor(
    executor: MockExecutor,
) -> anyhow::Result<()> {
    let client = configured_client(&executor)?;
    let users = ResourceDescriptor::new("users")
        .with_base_path("v2")
        .with_resource_path("users")
        .with_http_header("Accept", "application/xml")
        .with_placeholder("tenant", "globex");

    let mut call = client.call_with([&users]);
    assert_eq!(
        call.url().as_deref(),
        Some("https://api.example.com/v2/users?locale=en")
    );
    assert_eq!(call.http_header("Accept"), Some("application/xml"));
    assert_eq!(call.placeholder("tenant"), Some("globex"));

    call.set_base_path("v3").add_placeholder("tenant", "initech");
    assert_eq!(
        call.url().as_deref(),
        Some("https://api.example.com/v3/users?locale=en")
    );
    assert_eq!(call.placeholder("tenant"), Some("initech"));
    Ok(())
}

#[rstest]
fn test_invalid_configuration_is_rejected() {
    let properties = Properties::from_iter([("restcall.defaultValidation.enabled", "maybe")]);

    let result = RestClient::builder().with_config_source(&properties);

    let Err(error) = result else {
        panic!("an invalid boolean should be rejected");
    };
    let error = RestCallError::from(error);
    assert!(error.to_string().contains("restcall.defaultValidation.enabled"));
}
