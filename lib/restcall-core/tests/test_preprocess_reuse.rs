#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rstest::rstest;
use tracing::info;
use uuid::Uuid;

use restcall_core::testing::MockExecutor;
use restcall_core::{
    ExecutionContext, GlobalSettings, HookDeclaration, HookSource, PreprocessHook,
    ResourceDescriptor, RestCall, RestClient, hook_factory,
};

mod common;
pub use self::common::*;

const AUTHENTICATION: &str = "Authentication";

/// Signs every request with a token fixed at construction.
struct DummyTokenProvider {
    token: String,
}

impl DummyTokenProvider {
    fn new(created: &AtomicUsize) -> Self {
        created.fetch_add(1, Ordering::SeqCst);
        Self {
            token: Uuid::new_v4().to_string(),
        }
    }
}

impl PreprocessHook for DummyTokenProvider {
    fn preprocess(&self, call: &mut RestCall) {
        call.add_http_header(AUTHENTICATION, format!("Token {}", self.token));
    }
}

fn token_declaration(created: &Arc<AtomicUsize>, reuse_instance: bool) -> HookDeclaration {
    let created = Arc::clone(created);
    HookDeclaration::new(
        "token",
        hook_factory(move || DummyTokenProvider::new(&created)),
        reuse_instance,
    )
}

fn sent_tokens(executor: &MockExecutor) -> Vec<String> {
    executor
        .requests()
        .into_iter()
        .filter_map(|request| request.headers.get(AUTHENTICATION).cloned())
        .collect()
}

#[rstest]
fn test_reused_token_provider_is_shared_by_the_session(
    executor: MockExecutor,
) -> anyhow::Result<()> {
    let client = client(GlobalSettings::default().with_host("api.host"), &executor)?;
    let created = Arc::new(AtomicUsize::new(0));
    let login = ResourceDescriptor::new("login")
        .with_resource_path("login")
        .with_preprocess(token_declaration(&created, true));
    let mut ctx = ExecutionContext::new();

    client.call_with([&login]).post(&mut ctx)?;
    client.call_url("/profile").get(&mut ctx)?;
    client.call_url("/orders").get(&mut ctx)?;

    let tokens = sent_tokens(&executor);
    info!(?tokens, "tokens sent");
    assert_eq!(tokens.len(), 3);
    assert!(tokens.iter().all(|token| token == &tokens[0]));
    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert_eq!(
        ctx.reused_hook_source(),
        Some(&HookSource::Named("token".to_string()))
    );
    Ok(())
}

#[rstest]
fn test_token_provider_without_reuse(executor: MockExecutor) -> anyhow::Result<()> {
    let client = client(GlobalSettings::default().with_host("api.host"), &executor)?;
    let created = Arc::new(AtomicUsize::new(0));
    let login = ResourceDescriptor::new("login")
        .with_resource_path("login")
        .with_preprocess(token_declaration(&created, false));
    let mut ctx = ExecutionContext::new();

    let mut call = client.call_with([&login]);
    call.post(&mut ctx)?;
    call.post(&mut ctx)?;
    client.call_url("/profile").get(&mut ctx)?;

    let tokens = sent_tokens(&executor);
    assert_eq!(tokens.len(), 2, "the third call has no hook");
    assert_ne!(tokens[0], tokens[1]);
    assert_eq!(created.load(Ordering::SeqCst), 2);
    assert!(!ctx.has_reused_hook());
    Ok(())
}

#[rstest]
fn test_sessions_do_not_share_reused_hooks(executor: MockExecutor) -> anyhow::Result<()> {
    let client = client(GlobalSettings::default().with_host("api.host"), &executor)?;
    let created = Arc::new(AtomicUsize::new(0));
    let login = ResourceDescriptor::new("login")
        .with_resource_path("login")
        .with_preprocess(token_declaration(&created, true));
    let mut alice = ExecutionContext::new();
    let mut bob = ExecutionContext::new();

    client.call_with([&login]).post(&mut alice)?;
    client.call_with([&login]).post(&mut bob)?;
    client.call_url("/profile").get(&mut alice)?;
    client.call_url("/profile").get(&mut bob)?;

    let tokens = sent_tokens(&executor);
    assert_eq!(created.load(Ordering::SeqCst), 2);
    assert_ne!(tokens[0], tokens[1]);
    assert_eq!(tokens[0], tokens[2]);
    assert_eq!(tokens[1], tokens[3]);
    Ok(())
}

#[rstest]
fn test_configured_hook_reused_by_name(executor: MockExecutor) -> anyhow::Result<()> {
    let created = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&created);
    let client = RestClient::builder()
        .with_settings(
            GlobalSettings::default()
                .with_host("api.host")
                .with_preprocess_hook("token", true),
        )
        .with_executor(executor.clone())
        .register_hook(
            "token",
            hook_factory(move || DummyTokenProvider::new(&counter)),
        )
        .build()?;
    let mut ctx = ExecutionContext::new();

    client.call_url("/a").get(&mut ctx)?;
    client.call_url("/b").get(&mut ctx)?;

    let tokens = sent_tokens(&executor);
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0], tokens[1]);
    assert_eq!(created.load(Ordering::SeqCst), 1);

    ctx.clear_reused_hook();
    client.call_url("/c").get(&mut ctx)?;

    assert_eq!(created.load(Ordering::SeqCst), 2);
    Ok(())
}

#[rstest]
fn test_unknown_configured_hook_is_ignored(executor: MockExecutor) -> anyhow::Result<()> {
    let settings = GlobalSettings::default()
        .with_host("api.host")
        .with_preprocess_hook("com.example.MissingProvider", true);
    let client = client(settings, &executor)?;
    let mut ctx = ExecutionContext::new();

    client.call_url("/a").get(&mut ctx)?;

    assert!(sent_tokens(&executor).is_empty());
    assert!(!ctx.has_reused_hook());
    Ok(())
}

#[rstest]
fn test_assigned_hook_replaces_reused_one(executor: MockExecutor) -> anyhow::Result<()> {
    let client = client(GlobalSettings::default().with_host("api.host"), &executor)?;
    let created = Arc::new(AtomicUsize::new(0));
    let login = ResourceDescriptor::new("login")
        .with_preprocess(token_declaration(&created, true));
    let mut ctx = ExecutionContext::new();

    client.call_with([&login]).set_url("/login").post(&mut ctx)?;
    client
        .call_url("/impersonate")
        .set_preprocess_hook(
            |call: &mut RestCall| {
                call.add_http_header(AUTHENTICATION, "Token admin");
            },
            true,
        )
        .post(&mut ctx)?;
    client.call_url("/profile").get(&mut ctx)?;

    let tokens = sent_tokens(&executor);
    assert_eq!(tokens[1], "Token admin");
    assert_eq!(tokens[2], "Token admin");
    assert_eq!(ctx.reused_hook_source(), Some(&HookSource::Assigned));
    Ok(())
}
