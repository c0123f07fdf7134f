use finfeed::core::{FeedSynchronizer, RecordNormalizer, SyncStatus};
use finfeed::providers::ApiTransactionSource;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(mock_response: &str, status_code: u16) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/transactions"))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(base_url: &str) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let config_content = format!(
            r#"
        api:
          base_url: {base_url}
          timeout_secs: 5
        currency:
          symbol: "R$"
    "#
        );
        std::fs::write(config_file.path(), config_content).expect("Failed to write config file");
        config_file
    }
}

const FREELA_RESPONSE: &str = r#"{
    "transactions": [
        {
            "id": "1",
            "title": "Freela",
            "value": 2000,
            "type": "income",
            "category": { "title": "Venda" },
            "createdAt": "2020-05-24"
        }
    ],
    "balance": { "income": "2000", "outcome": "0", "total": "2000" }
}"#;

const TRANSFER_RESPONSE: &str = r#"{
    "transactions": [
        {
            "id": "1",
            "title": "Freela",
            "value": 2000,
            "type": "income",
            "category": { "title": "Venda" },
            "createdAt": "2020-05-24"
        },
        {
            "id": "2",
            "title": "Savings",
            "value": 500,
            "type": "transfer",
            "category": { "title": "Banco" },
            "createdAt": "2020-05-25"
        }
    ],
    "balance": { "income": "2000", "outcome": "0", "total": "2000" }
}"#;

fn synchronizer(base_url: &str) -> FeedSynchronizer {
    let source = ApiTransactionSource::new(base_url, Duration::from_secs(5))
        .expect("Failed to build source");
    FeedSynchronizer::new(Arc::new(source), RecordNormalizer::default())
}

#[test_log::test(tokio::test)]
async fn test_sync_against_http_service() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/transactions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FREELA_RESPONSE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let synchronizer = synchronizer(&mock_server.uri());
    let subscription = synchronizer.subscribe();

    let snapshot = synchronizer.sync().await.expect("sync failed");
    info!(?snapshot, "Synchronized feed");

    let view = subscription.current();
    assert_eq!(view.status(), &SyncStatus::Synchronized);
    assert_eq!(view.transactions().len(), 1);

    let transaction = &view.transactions()[0];
    assert_eq!(transaction.formatted_value(), "R$ 2.000,00");
    assert!(!transaction.formatted_value().starts_with('-'));
    assert_eq!(transaction.formatted_date(), "24/05/2020");

    let balance = view.balance().expect("balance missing");
    assert_eq!(balance.income, "2000");
    assert_eq!(balance.outcome, "0");
    assert_eq!(balance.total, "2000");
}

#[test_log::test(tokio::test)]
async fn test_service_outage_keeps_published_feed() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/transactions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FREELA_RESPONSE))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/transactions"))
        .respond_with(ResponseTemplate::new(503))
        .with_priority(2)
        .mount(&mock_server)
        .await;

    let synchronizer = synchronizer(&mock_server.uri());
    let subscription = synchronizer.subscribe();

    synchronizer.sync().await.expect("first sync failed");
    let before = subscription.current();

    let err = synchronizer.sync().await.expect_err("second sync should fail");
    assert!(err.is_network());

    let after = subscription.current();
    assert!(Arc::ptr_eq(
        before.snapshot().unwrap(),
        after.snapshot().unwrap()
    ));
    assert_eq!(after.error(), Some(&err));
}

#[test_log::test(tokio::test)]
async fn test_unknown_transaction_type_publishes_nothing() {
    let mock_server = test_utils::create_mock_server(TRANSFER_RESPONSE, 200).await;

    let synchronizer = synchronizer(&mock_server.uri());
    let subscription = synchronizer.subscribe();

    let err = synchronizer.sync().await.expect_err("sync should fail");
    assert!(err.is_validation());

    let view = subscription.current();
    assert!(view.snapshot().is_none());
    assert!(view.error().unwrap().is_validation());
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = test_utils::create_mock_server(FREELA_RESPONSE, 200).await;
    let config_file = test_utils::write_config(&mock_server.uri());

    let result = finfeed::run_command(
        finfeed::AppCommand::Dashboard { json: false },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Dashboard command failed with: {:?}",
        result.err()
    );

    let result = finfeed::run_command(
        finfeed::AppCommand::Dashboard { json: true },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "JSON dashboard failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_reports_outage() {
    let mock_server = test_utils::create_mock_server("unavailable", 500).await;
    let config_file = test_utils::write_config(&mock_server.uri());

    let err = finfeed::run_command(
        finfeed::AppCommand::Dashboard { json: false },
        Some(config_file.path().to_str().unwrap()),
    )
    .await
    .expect_err("dashboard should fail");
    assert!(err.to_string().contains("could not load transactions"));
}

#[test_log::test(tokio::test)]
async fn test_watch_rejects_zero_interval() {
    let config_file = test_utils::write_config("http://127.0.0.1:1");

    let err = finfeed::run_command(
        finfeed::AppCommand::Watch { interval_secs: 0 },
        Some(config_file.path().to_str().unwrap()),
    )
    .await
    .expect_err("zero interval should be rejected");
    assert!(err.to_string().contains("at least one second"));
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let missing = dir.path().join("absent.yaml");
    assert!(!missing.exists());

    let result = finfeed::run_command(
        finfeed::AppCommand::Dashboard { json: false },
        Some(missing.to_str().unwrap()),
    )
    .await;
    assert!(result.is_err());
    assert!(fs::metadata(&missing).is_err());
}
