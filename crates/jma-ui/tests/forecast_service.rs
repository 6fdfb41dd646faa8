//! Integration tests for the background forecast service and the shell,
//! run against a wiremock JMA server.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Duration;

use jma_core::UiConfig;
use jma_ui::{AppState, Command, ForecastError, ForecastService, ForecastServiceMessage, Shell};
use jma_weather::{build_region_index, AreaDocument, JmaProvider};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn forecast_body(publisher: &str, weather: &str) -> serde_json::Value {
    serde_json::json!([{
        "publishingOffice": publisher,
        "timeSeries": [
            {
                "timeDefines": ["2024-05-03T11:00:00+09:00", "2024-05-04T00:00:00+09:00"],
                "areas": [{"weathers": [weather, weather]}]
            }
        ]
    }])
}

fn provider_for(server: &MockServer) -> Arc<JmaProvider> {
    Arc::new(
        JmaProvider::new(
            format!("{}/area.json", server.uri()),
            format!("{}/forecast/{{code}}.json", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap(),
    )
}

async fn mount_forecast(server: &MockServer, code: &str, body: serde_json::Value, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(format!("/forecast/{}.json", code)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body).set_delay(delay))
        .mount(server)
        .await;
}

async fn next_message(rx: &Receiver<ForecastServiceMessage>) -> ForecastServiceMessage {
    for _ in 0..100 {
        if let Ok(message) = rx.try_recv() {
            return message;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("no message from forecast service");
}

fn index() -> jma_weather::RegionIndex {
    let doc: AreaDocument = serde_json::from_str(
        r#"{
            "centers": {"010100": {"name": "北海道地方"}, "010300": {"name": "関東甲信地方"}},
            "offices": {
                "016000": {"name": "石狩・空知・後志地方", "parent": "010100"},
                "130000": {"name": "東京都", "parent": "010300"}
            }
        }"#,
    )
    .unwrap();
    build_region_index(&doc)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fetch_result_is_sent_back() {
    let server = MockServer::start().await;
    mount_forecast(&server, "130000", forecast_body("気象庁", "晴れ"), Duration::ZERO).await;

    let (tx, rx) = mpsc::channel();
    let service = ForecastService::new(
        tx,
        Some(tokio::runtime::Handle::current()),
        provider_for(&server),
    );
    service.select("130000", 1);

    match next_message(&rx).await {
        ForecastServiceMessage::FetchDone {
            generation,
            office_code,
            result,
        } => {
            assert_eq!(generation, 1);
            assert_eq!(office_code, "130000");
            let forecast = result.unwrap();
            assert_eq!(forecast.publishing_office, "気象庁");
            assert_eq!(forecast.rows.len(), 2);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_newer_selection_cancels_older_fetch() {
    let server = MockServer::start().await;
    mount_forecast(
        &server,
        "016000",
        forecast_body("札幌管区気象台", "雪"),
        Duration::from_millis(400),
    )
    .await;
    mount_forecast(&server, "130000", forecast_body("気象庁", "晴れ"), Duration::ZERO).await;

    let (tx, rx) = mpsc::channel();
    let service = ForecastService::new(
        tx,
        Some(tokio::runtime::Handle::current()),
        provider_for(&server),
    );
    service.select("016000", 1);
    service.select("130000", 2);

    match next_message(&rx).await {
        ForecastServiceMessage::FetchDone { generation, .. } => assert_eq!(generation, 2),
    }

    // The slow fetch was cancelled and never reports back
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unknown_office_reports_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast/000000.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (tx, rx) = mpsc::channel();
    let service = ForecastService::new(
        tx,
        Some(tokio::runtime::Handle::current()),
        provider_for(&server),
    );
    service.select("000000", 3);

    match next_message(&rx).await {
        ForecastServiceMessage::FetchDone { result, .. } => {
            assert!(matches!(result, Err(ForecastError::NotFound(code)) if code == "000000"));
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shell_shows_startup_office() {
    let server = MockServer::start().await;
    mount_forecast(&server, "016000", forecast_body("札幌管区気象台", "雪"), Duration::ZERO).await;

    let (tx, rx) = mpsc::channel();
    let service = ForecastService::new(
        tx,
        Some(tokio::runtime::Handle::current()),
        provider_for(&server),
    );
    let mut shell = Shell::new(
        AppState::new(index()),
        service,
        rx,
        UiConfig::default(),
        Vec::new(),
    );

    shell.start().unwrap();
    assert_eq!(shell.state().selected(), Some("016000"));
    assert!(shell.state().is_loading());

    for _ in 0..100 {
        if shell.poll_service().unwrap() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(shell.state().title(), "札幌管区気象台");
    assert_eq!(shell.state().rows().len(), 2);
    let output = String::from_utf8(shell.output().clone()).unwrap();
    assert!(output.contains("05/03   雪"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shell_failed_fetch_leaves_rows_cleared() {
    let server = MockServer::start().await;
    mount_forecast(&server, "016000", forecast_body("札幌管区気象台", "雪"), Duration::ZERO).await;
    Mock::given(method("GET"))
        .and(path("/forecast/130000.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (tx, rx) = mpsc::channel();
    let service = ForecastService::new(
        tx,
        Some(tokio::runtime::Handle::current()),
        provider_for(&server),
    );
    let mut shell = Shell::new(
        AppState::new(index()),
        service,
        rx,
        UiConfig::default(),
        Vec::new(),
    );

    shell.start().unwrap();
    for _ in 0..100 {
        if shell.poll_service().unwrap() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(shell.state().rows().len(), 2);

    let command = Command::parse("130000", shell.state());
    shell.handle(command).unwrap();
    assert!(shell.state().rows().is_empty());

    for _ in 0..100 {
        if shell.poll_service().unwrap() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert!(shell.state().rows().is_empty());
    assert!(!shell.state().is_loading());
    let output = String::from_utf8(shell.output().clone()).unwrap();
    assert!(output.contains("! The server is experiencing issues"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_server_reports_timeout() {
    let server = MockServer::start().await;
    mount_forecast(
        &server,
        "130000",
        forecast_body("気象庁", "晴れ"),
        Duration::from_secs(3),
    )
    .await;

    let provider = Arc::new(
        JmaProvider::new(
            format!("{}/area.json", server.uri()),
            format!("{}/forecast/{{code}}.json", server.uri()),
            Duration::from_millis(200),
        )
        .unwrap(),
    );
    let (tx, rx) = mpsc::channel();
    let service = ForecastService::new(tx, Some(tokio::runtime::Handle::current()), provider);
    service.select("130000", 1);

    match next_message(&rx).await {
        ForecastServiceMessage::FetchDone { result, .. } => {
            assert!(matches!(result, Err(ForecastError::Timeout)), "{:?}", result);
        }
    }
}
