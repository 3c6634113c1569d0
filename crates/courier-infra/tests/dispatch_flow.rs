//! Accounts, dialog search and dispatch over the offline transport.

use std::collections::HashMap;
use std::sync::Arc;

use courier_core::account::{AccountRegistry, PresetChallenge};
use courier_core::dialog::DialogResolver;
use courier_core::dispatch::Dispatcher;
use courier_core::event::EventBus;
use courier_core::template::TemplateService;
use courier_core::transport::BoxTransport;
use courier_infra::template::JsonTemplateRepository;
use courier_infra::transport::{OfflineFixture, OfflineTransport, read_outbox};
use courier_types::account::AccountConnectionRequest;
use courier_types::dialog::{DialogPeer, PeerKind};
use courier_types::error::AccountError;
use tempfile::TempDir;

struct Harness {
    _tmp: TempDir,
    offline_dir: std::path::PathBuf,
    registry: Arc<AccountRegistry>,
    resolver: DialogResolver,
    dispatcher: Dispatcher<JsonTemplateRepository>,
}

fn peer(id: i64, handle: &str, kind: PeerKind) -> DialogPeer {
    DialogPeer {
        id,
        handle: Some(handle.to_string()),
        title: String::new(),
        kind,
    }
}

fn fixture(dialogs: Vec<DialogPeer>, directory: Vec<DialogPeer>) -> OfflineFixture {
    OfflineFixture {
        code: "11111".to_string(),
        password: None,
        password_hint: None,
        registered: true,
        profile_name: None,
        dialogs,
        directory,
    }
}

async fn harness(accounts: Vec<(&str, OfflineFixture)>) -> Harness {
    let tmp = TempDir::new().unwrap();
    let offline_dir = tmp.path().join("offline");
    let transport = OfflineTransport::new(&offline_dir);
    for (name, f) in &accounts {
        transport.write_fixture(&format!("+{name}"), f).await.unwrap();
    }

    let bus = EventBus::new(64);
    let templates = Arc::new(TemplateService::new(
        JsonTemplateRepository::new(tmp.path().join("templates.json")),
        bus.clone(),
    ));
    templates.load().await;
    templates
        .add_or_update("greet", "Hello, {Name}! Today is {Date}.", "")
        .await
        .unwrap();

    let registry = Arc::new(AccountRegistry::new(BoxTransport::new(transport), bus.clone()));
    let challenge = PresetChallenge::new().with_code("11111");
    for (name, _) in &accounts {
        registry
            .connect(
                AccountConnectionRequest::new(*name, 1, "hash", format!("+{name}")),
                &challenge,
            )
            .await
            .unwrap();
    }

    Harness {
        offline_dir,
        resolver: DialogResolver::new(Arc::clone(&registry), bus.clone()),
        dispatcher: Dispatcher::new(templates, Arc::clone(&registry), bus),
        registry,
        _tmp: tmp,
    }
}

fn params() -> HashMap<String, String> {
    HashMap::from([("Name".to_string(), "Ann".to_string())])
}

#[tokio::test]
async fn search_then_send_through_owning_account() {
    let h = harness(vec![
        ("A", fixture(vec![peer(1, "someone", PeerKind::User)], Vec::new())),
        ("B", fixture(vec![peer(2, "ann", PeerKind::User)], Vec::new())),
    ])
    .await;

    let search = h.resolver.search_detailed("@Ann").await;
    assert!(search.dialog.found);
    assert_eq!(search.dialog.account.as_deref(), Some("B"));
    assert_eq!(search.dialog.title, "@Ann");

    let result = h.dispatcher.send_to_dialog(&search.dialog, "greet", &params()).await;
    assert!(result.success, "{:?}", result.error);

    let outbox = read_outbox(&h.offline_dir).await.unwrap();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].account_phone, "+B");
    assert_eq!(outbox[0].peer_id, 2);
    assert_eq!(outbox[0].text, "Hello, Ann! Today is [Date].");
}

#[tokio::test]
async fn handle_fallback_skips_failing_account() {
    let h = harness(vec![
        ("A", fixture(Vec::new(), vec![peer(5, "fail:ann", PeerKind::User)])),
        ("B", fixture(Vec::new(), vec![peer(5, "ann", PeerKind::User)])),
    ])
    .await;

    let result = h.dispatcher.send_to_handle("ann", "greet", &params()).await;
    assert!(result.success);
    assert_eq!(result.account.as_deref(), Some("B"));
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].account, "A");

    let outbox = read_outbox(&h.offline_dir).await.unwrap();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].account_phone, "+B");
}

#[tokio::test]
async fn handle_fallback_reports_every_failure() {
    let h = harness(vec![
        ("A", fixture(Vec::new(), vec![peer(5, "fail:ann", PeerKind::User)])),
        ("B", fixture(Vec::new(), Vec::new())),
    ])
    .await;

    let result = h.dispatcher.send_to_handle("ann", "greet", &params()).await;
    assert!(!result.success);
    assert_eq!(result.failures.len(), 2);
    let error = result.error.unwrap();
    assert!(error.contains("A:"), "{error}");
    assert!(error.contains("B:"), "{error}");
    assert!(read_outbox(&h.offline_dir).await.unwrap().is_empty());
}

#[tokio::test]
async fn disconnected_account_is_not_used() {
    let h = harness(vec![
        ("A", fixture(Vec::new(), vec![peer(5, "ann", PeerKind::User)])),
        ("B", fixture(Vec::new(), vec![peer(5, "ann", PeerKind::User)])),
    ])
    .await;

    h.registry.disconnect("A").await.unwrap();
    let result = h.dispatcher.send_to_handle_via("ann", "A", "greet", &params()).await;
    assert!(!result.success);
    assert_eq!(
        result.error,
        Some(AccountError::NotFound("A".to_string()).to_string())
    );

    let result = h.dispatcher.send_to_handle("ann", "greet", &params()).await;
    assert_eq!(result.account.as_deref(), Some("B"));
}

#[tokio::test]
async fn wrong_code_leaves_registry_unchanged() {
    let h = harness(vec![("A", fixture(Vec::new(), Vec::new()))]).await;
    let err = h
        .registry
        .connect(
            AccountConnectionRequest::new("again", 1, "hash", "+A"),
            &PresetChallenge::new().with_code("00000"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::AuthenticationFailed(_)));
    assert_eq!(h.registry.list().await.len(), 1);
}
