//! End-to-end lookups against a mock Open-Meteo server.

use std::sync::Arc;

use serde_json::json;
use weather_core::{
    Config, OpenMeteoProvider, Orchestrator, PipelineError, RequestStatus, SubmitOutcome,
    WeatherSource, resolver,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn provider(server: &MockServer) -> OpenMeteoProvider {
    let config = Config {
        geocoding_base_url: server.uri(),
        api_base_url: server.uri(),
        request_timeout_secs: 5,
    };
    OpenMeteoProvider::new(&config).expect("Failed to create provider")
}

fn orchestrator(server: &MockServer) -> Orchestrator {
    Orchestrator::new(Arc::new(provider(server)))
}

async fn mount_search(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("count", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn mumbai_result(timezone: Option<&str>) -> serde_json::Value {
    let mut result = json!({
        "id": 1275339,
        "name": "Mumbai",
        "latitude": 19.07,
        "longitude": 72.88,
        "country": "India",
        "admin1": "Maharashtra"
    });
    if let Some(tz) = timezone {
        result["timezone"] = json!(tz);
    }
    json!({ "results": [result], "generationtime_ms": 0.5 })
}

fn forecast_body() -> serde_json::Value {
    json!({
        "latitude": 19.0,
        "longitude": 72.875,
        "timezone": "UTC",
        "current_weather": {
            "time": "2024-01-15T06:30",
            "temperature": 30.5,
            "windspeed": 12.3,
            "winddirection": 270,
            "weathercode": 1
        }
    })
}

// ============================================================================
// Success scenarios
// ============================================================================

#[tokio::test]
async fn test_mumbai_lookup_with_timezone_fallback() {
    let server = MockServer::start().await;
    mount_search(&server, mumbai_result(None)).await;

    Mock::given(method("GET"))
        .and(path("/timezone"))
        .and(query_param("latitude", "19.07"))
        .and(query_param("longitude", "72.88"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "timezone": "Asia/Kolkata" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("current_weather", "true"))
        .and(query_param("timezone", "UTC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&server)
        .await;

    let orch = orchestrator(&server);
    let outcome = orch.lookup("Mumbai").await;

    let SubmitOutcome::Completed(Ok(snapshot)) = outcome else {
        panic!("Expected success, got: {outcome:?}");
    };
    assert_eq!(snapshot.location.title(), "Mumbai, India");
    assert_eq!(snapshot.location.timezone_id, "Asia/Kolkata");
    assert!((snapshot.temperature_celsius - 30.5).abs() < f64::EPSILON);
    assert!((snapshot.wind_speed_kmh - 12.3).abs() < f64::EPSILON);
    assert!(orch.ticker_active().await);

    let mut rx = orch.subscribe();
    let clock = loop {
        if let Some(clock) = rx.borrow_and_update().live_clock.clone() {
            break clock;
        }
        rx.changed().await.expect("state sender alive");
    };
    assert_eq!(clock.primary_formatted, clock.reference_formatted);

    orch.shutdown().await;
}

#[tokio::test]
async fn test_embedded_timezone_skips_timezone_call() {
    let server = MockServer::start().await;
    mount_search(&server, mumbai_result(Some("Asia/Kolkata"))).await;

    Mock::given(method("GET"))
        .and(path("/timezone"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "timezone": "Europe/Paris" })),
        )
        .expect(0)
        .mount(&server)
        .await;

    let location = resolver::resolve(&provider(&server), "Mumbai")
        .await
        .expect("resolves");
    assert_eq!(location.timezone_id, "Asia/Kolkata");
}

// ============================================================================
// Timezone fallback
// ============================================================================

#[tokio::test]
async fn test_timezone_server_error_falls_back_to_utc() {
    let server = MockServer::start().await;
    mount_search(&server, mumbai_result(None)).await;

    Mock::given(method("GET"))
        .and(path("/timezone"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&server)
        .await;

    let location = resolver::resolve(&provider(&server), "Mumbai")
        .await
        .expect("fallback is silent");
    assert_eq!(location.timezone_id, "UTC");
}

#[tokio::test]
async fn test_timezone_missing_field_falls_back_to_utc() {
    let server = MockServer::start().await;
    mount_search(&server, mumbai_result(None)).await;

    Mock::given(method("GET"))
        .and(path("/timezone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let location = resolver::resolve(&provider(&server), "Mumbai")
        .await
        .expect("fallback is silent");
    assert_eq!(location.timezone_id, "UTC");
}

// ============================================================================
// Failure scenarios
// ============================================================================

#[tokio::test]
async fn test_empty_input_sends_no_requests() {
    let server = MockServer::start().await;
    let orch = orchestrator(&server);

    let outcome = orch.lookup("   ").await;

    assert_eq!(
        outcome,
        SubmitOutcome::Completed(Err(PipelineError::EmptyInput))
    );
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty(), "unexpected requests: {requests:?}");
}

#[tokio::test]
async fn test_unknown_city_is_not_found() {
    let server = MockServer::start().await;
    mount_search(&server, json!({ "generationtime_ms": 0.3 })).await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(0)
        .mount(&server)
        .await;

    let orch = orchestrator(&server);
    let outcome = orch.lookup("Zzzzqq").await;

    assert_eq!(
        outcome,
        SubmitOutcome::Completed(Err(PipelineError::NotFound))
    );
    let state = orch.state();
    assert_eq!(state.status, RequestStatus::Failed);
    assert_eq!(
        state.error.map(|e| e.to_string()).as_deref(),
        Some("City not found. Try another city.")
    );
    assert!(state.snapshot.is_none());
}

#[tokio::test]
async fn test_missing_current_weather_is_data_unavailable() {
    let server = MockServer::start().await;
    mount_search(&server, mumbai_result(Some("Asia/Kolkata"))).await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "latitude": 19.0,
            "longitude": 72.875
        })))
        .mount(&server)
        .await;

    let orch = orchestrator(&server);
    let outcome = orch.lookup("Mumbai").await;

    assert_eq!(
        outcome,
        SubmitOutcome::Completed(Err(PipelineError::DataUnavailable))
    );
    assert_eq!(
        orch.state().error.map(|e| e.to_string()).as_deref(),
        Some("Weather data unavailable for this location.")
    );
    assert!(!orch.ticker_active().await);
}

#[tokio::test]
async fn test_forecast_server_error_is_network_failure() {
    let server = MockServer::start().await;
    mount_search(&server, mumbai_result(Some("Asia/Kolkata"))).await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let outcome = orchestrator(&server).lookup("Mumbai").await;

    let SubmitOutcome::Completed(Err(err)) = outcome else {
        panic!("Expected failure, got: {outcome:?}");
    };
    assert_eq!(err.to_string(), "Something went wrong. Please try again.");
    let detail = err.detail().unwrap_or_default();
    assert!(detail.contains("503"), "detail was: {detail}");
}

#[tokio::test]
async fn test_malformed_geocoding_json_is_network_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = provider(&server).search_city("Mumbai").await.unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("Failed to parse Open-Meteo geocoding JSON"));

    let outcome = orchestrator(&server).lookup("Mumbai").await;
    assert!(matches!(
        outcome,
        SubmitOutcome::Completed(Err(PipelineError::NetworkFailure { .. }))
    ));
}

#[tokio::test]
async fn test_connection_refused_is_network_failure() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let config = Config {
        geocoding_base_url: uri.clone(),
        api_base_url: uri,
        request_timeout_secs: 2,
    };
    let provider = OpenMeteoProvider::new(&config).expect("provider");
    let orch = Orchestrator::new(Arc::new(provider));

    let outcome = orch.lookup("Mumbai").await;
    assert!(matches!(
        outcome,
        SubmitOutcome::Completed(Err(PipelineError::NetworkFailure { .. }))
    ));
}
