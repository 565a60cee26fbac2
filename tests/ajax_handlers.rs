mod helper;

use mockito::{Matcher, Server};
use serde_json::json;

use flowganise::admin::{AjaxAction, AjaxRequest, Caller, NonceSigner, SessionGuard};
use flowganise::config::{CONNECT_RESPONSE_TRANSIENT, NONCE_ACTION, SETTINGS_OPTION};
use flowganise::connect::PluginSettings;
use flowganise::store::{OptionStore, TransientStore};

use helper::fakes::{FakeIntegration, StaticGuard};
use helper::plugin::{INSTALLED_VERSION, SITE_URL, create_test_plugin};

async fn mock_connect(server: &mut Server, status: usize, body: &str) -> mockito::Mock {
    server
        .mock("GET", "/connect")
        .match_query(Matcher::UrlEncoded(
            "domain".to_string(),
            SITE_URL.to_string(),
        ))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

#[tokio::test]
async fn connect_persists_settings_for_site() {
    let mut server = Server::new_async().await;
    let mock = mock_connect(&mut server, 200, r#"{"organization_id": "org_123"}"#).await;
    let (store, plugin) = create_test_plugin(&server.url(), vec![]);

    let response = plugin
        .handle_ajax(&StaticGuard::admin(), &AjaxRequest::new(AjaxAction::Connect, "token"))
        .await;

    mock.assert_async().await;
    assert!(response.success);
    assert_eq!(response.data["organization_id"], "org_123");

    let settings = PluginSettings::load(store.as_ref()).unwrap().unwrap();
    assert_eq!(settings.organization_id, "org_123");
    assert_eq!(settings.domain, SITE_URL);
    assert!(
        store
            .get_transient(CONNECT_RESPONSE_TRANSIENT)
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn connect_reports_unregistered_domain() {
    let mut server = Server::new_async().await;
    mock_connect(&mut server, 404, r#"{"message": "Not found"}"#).await;
    let (store, plugin) = create_test_plugin(&server.url(), vec![]);

    let response = plugin
        .handle_ajax(&StaticGuard::admin(), &AjaxRequest::new(AjaxAction::Connect, "token"))
        .await;

    assert!(!response.success);
    assert!(
        response
            .data
            .as_str()
            .unwrap()
            .contains("not registered with Flowganise")
    );
    assert_eq!(store.get_option(SETTINGS_OPTION).unwrap(), None);
}

#[tokio::test]
async fn connect_reports_generic_failure_for_other_status() {
    let mut server = Server::new_async().await;
    mock_connect(&mut server, 500, "").await;
    let (store, plugin) = create_test_plugin(&server.url(), vec![]);

    let response = plugin
        .handle_ajax(&StaticGuard::admin(), &AjaxRequest::new(AjaxAction::Connect, "token"))
        .await;

    assert!(!response.success);
    assert!(
        response
            .data
            .as_str()
            .unwrap()
            .starts_with("Unexpected response from Flowganise")
    );
    assert_eq!(store.get_option(SETTINGS_OPTION).unwrap(), None);
}

#[tokio::test]
async fn invalid_token_short_circuits_without_mutation() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let (store, plugin) = create_test_plugin(&server.url(), vec![]);
    PluginSettings::new("org_123", SITE_URL)
        .save(store.as_ref())
        .unwrap();
    let guard = StaticGuard {
        valid_token: false,
        admin: true,
    };

    for action in [AjaxAction::Connect, AjaxAction::Disconnect] {
        let response = plugin
            .handle_ajax(&guard, &AjaxRequest::new(action, "bogus"))
            .await;
        assert_eq!(response.data, json!("Invalid nonce"));
        assert!(!response.success);
    }

    mock.assert_async().await;
    assert!(PluginSettings::load(store.as_ref()).unwrap().is_some());
}

#[tokio::test]
async fn non_admin_is_unauthorized() {
    let server = Server::new_async().await;
    let (store, plugin) = create_test_plugin(&server.url(), vec![]);
    PluginSettings::new("org_123", SITE_URL)
        .save(store.as_ref())
        .unwrap();
    let guard = StaticGuard {
        valid_token: true,
        admin: false,
    };

    let response = plugin
        .handle_ajax(&guard, &AjaxRequest::new(AjaxAction::Disconnect, "token"))
        .await;

    assert_eq!(response.data, json!("Unauthorized"));
    assert!(PluginSettings::load(store.as_ref()).unwrap().is_some());
}

#[tokio::test]
async fn disconnect_twice_succeeds_and_leaves_no_settings() {
    let server = Server::new_async().await;
    let (store, plugin) = create_test_plugin(&server.url(), vec![]);
    PluginSettings::new("org_123", SITE_URL)
        .save(store.as_ref())
        .unwrap();
    let request = AjaxRequest::new(AjaxAction::Disconnect, "token");

    let first = plugin.handle_ajax(&StaticGuard::admin(), &request).await;
    let second = plugin.handle_ajax(&StaticGuard::admin(), &request).await;

    assert!(first.success);
    assert!(second.success);
    assert_eq!(store.get_option(SETTINGS_OPTION).unwrap(), None);
}

#[tokio::test]
async fn save_settings_validates_and_persists() {
    let server = Server::new_async().await;
    let (store, plugin) = create_test_plugin(&server.url(), vec![]);

    let mut request = AjaxRequest::new(AjaxAction::SaveSettings, "token");
    request.organization_id = Some("org_456".to_string());

    let missing_domain = plugin.handle_ajax(&StaticGuard::admin(), &request).await;
    assert!(!missing_domain.success);
    assert_eq!(missing_domain.data, json!("Missing domain"));

    request.domain = Some("https://shop.example.com".to_string());
    let saved = plugin.handle_ajax(&StaticGuard::admin(), &request).await;

    assert!(saved.success);
    let settings = PluginSettings::load(store.as_ref()).unwrap().unwrap();
    assert_eq!(settings.organization_id, "org_456");
    assert_eq!(settings.domain, "https://shop.example.com");
}

#[tokio::test]
async fn debug_reports_masked_settings_and_integrations() {
    let server = Server::new_async().await;
    let (store, plugin) = create_test_plugin(
        &server.url(),
        vec![
            Box::new(FakeIntegration::new("WP Rocket", true)),
            Box::new(FakeIntegration::new("Breeze", false)),
        ],
    );
    PluginSettings::new("org_1234567890", SITE_URL)
        .save(store.as_ref())
        .unwrap();
    store
        .set_transient(
            CONNECT_RESPONSE_TRANSIENT,
            "{}",
            std::time::Duration::from_secs(60),
        )
        .unwrap();

    let response = plugin
        .handle_ajax(&StaticGuard::admin(), &AjaxRequest::new(AjaxAction::Debug, "token"))
        .await;

    assert!(response.success);
    assert_eq!(response.data["plugin_version"], INSTALLED_VERSION);
    assert_eq!(response.data["settings"]["organization_id"], "org_...7890");
    assert_eq!(response.data["caching"]["WP Rocket"], true);
    assert_eq!(response.data["caching"]["Breeze"], false);
    assert_eq!(store.get_transient(CONNECT_RESPONSE_TRANSIENT).unwrap(), None);
}

#[tokio::test]
async fn session_guard_accepts_issued_nonce_for_admin() {
    let server = Server::new_async().await;
    let (_store, plugin) = create_test_plugin(&server.url(), vec![]);
    let signer = NonceSigner::new("secret");
    let nonce = signer.create(NONCE_ACTION, 7);
    let guard = SessionGuard::new(signer, Caller::new(7, &["manage_options"]));

    let response = plugin
        .handle_ajax(&guard, &AjaxRequest::new(AjaxAction::Disconnect, &nonce))
        .await;

    assert!(response.success);
}
