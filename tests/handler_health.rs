mod common;

use std::time::Duration;

use axum_test::TestServer;

use common::Script;

#[tokio::test]
async fn test_health_endpoint_success() {
    let (app, factory) =
        common::create_test_app(Script::default(), common::settings(8, Duration::from_secs(5)));

    let server = TestServer::new(app).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["workers"], 8);

    // No credential needed and no upstream client created.
    assert_eq!(factory.connections(), 0);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (app, _factory) =
        common::create_test_app(Script::default(), common::settings(8, Duration::from_secs(5)));

    let server = TestServer::new(app).unwrap();

    let response = server.get("/v1/clicks/city").await;

    response.assert_status_not_found();
}
