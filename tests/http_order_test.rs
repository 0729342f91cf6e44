use anyhow::Result;
use httpmock::prelude::*;
use rust_decimal::Decimal;
use serde_json::json;
use std::time::Duration;
use topup_order::{report, AppConfig, HttpStorefrontClient, OrderError, OrderOrchestrator, UserContext};

const GAME: &str = "Mobile Legends";

fn packages_body() -> serde_json::Value {
    json!({
        "packages": [
            {
                "id": "pkg-wkp",
                "name": "Weekly Diamond Pass",
                "price": 76.00,
                "gameName": GAME,
                "region": "MY",
                "stock": 10,
                "vendorPackageCode": "ML_WKP",
                "resellKeyword": "wkp"
            },
            {
                "id": "pkg-86",
                "name": "86 Diamonds",
                "price": 61.50,
                "gameName": GAME,
                "region": "MY",
                "stock": 10,
                "vendorPackageCode": "ML_86",
                "resellKeyword": "86"
            }
        ]
    })
}

fn orchestrator(
    server: &MockServer,
) -> OrderOrchestrator<HttpStorefrontClient, HttpStorefrontClient, HttpStorefrontClient> {
    let config = AppConfig::new(server.base_url());
    let client = HttpStorefrontClient::new(&config);
    OrderOrchestrator::new(client.clone(), client.clone(), client)
        .with_submission_timeout(Duration::from_secs(5))
}

fn ctx() -> UserContext {
    UserContext::new("user-42").with_token("secret-token")
}

#[tokio::test]
async fn test_order_end_to_end_over_http() -> Result<()> {
    let server = MockServer::start_async().await;

    let packages = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/packages")
                .query_param("gameName", GAME)
                .query_param("limit", "1000");
            then.status(200).json_body(packages_body());
        })
        .await;

    let balance = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/users/balance")
                .header("authorization", "Bearer secret-token");
            then.status(200).json_body(json!({ "balance": 1000 }));
        })
        .await;

    let order = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/transactions/orders")
                .header("authorization", "Bearer secret-token")
                .header_exists("Idempotency-Key")
                .json_body_partial(
                    r#"{
                        "packageId": "pkg-wkp,pkg-86",
                        "playerId": "1391379101",
                        "identifier": "15749",
                        "gameName": "Mobile Legends",
                        "packageCode": "ML_WKP,ML_86"
                    }"#,
                );
            then.status(201)
                .json_body(json!({ "success": true, "order": { "id": "ORD-1001" } }));
        })
        .await;

    let summary = orchestrator(&server)
        .process("1391379101 15749 wkp+86", GAME, &ctx())
        .await?;

    packages.assert_async().await;
    balance.assert_async().await;
    order.assert_async().await;

    assert_eq!(summary.total_cost, Decimal::new(13750, 2));
    assert_eq!(summary.new_balance, Decimal::new(86250, 2));
    assert_eq!(summary.results[0].order_id.as_deref(), Some("ORD-1001"));

    let text = report::format_summary(&summary);
    assert!(text.contains("862.50 XCN"));
    Ok(())
}

#[tokio::test]
async fn test_rejected_line_over_http_does_not_stop_batch() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/packages");
            then.status(200).json_body(packages_body());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/balance");
            then.status(200).json_body(json!({ "balance": "500.00" }));
        })
        .await;
    let rejected = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/transactions/orders")
                .json_body_partial(r#"{ "playerId": "111" }"#);
            then.status(400)
                .json_body(json!({ "success": false, "message": "Invalid player id" }));
        })
        .await;
    let accepted = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/transactions/orders")
                .json_body_partial(r#"{ "playerId": "222" }"#);
            then.status(200).json_body(json!({ "success": true, "orderId": 77 }));
        })
        .await;

    let summary = orchestrator(&server)
        .process("111 1 wkp\n222 2 86", GAME, &ctx())
        .await?;

    rejected.assert_async().await;
    accepted.assert_async().await;

    assert_eq!(summary.failure_count, 1);
    assert_eq!(summary.results[0].error.as_deref(), Some("Invalid player id"));
    assert_eq!(summary.results[1].order_id.as_deref(), Some("77"));
    assert_eq!(summary.total_debited, Decimal::new(6150, 2));
    assert_eq!(summary.new_balance, Decimal::new(43850, 2));
    Ok(())
}

#[tokio::test]
async fn test_insufficient_balance_over_http_sends_no_orders() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/packages");
            then.status(200).json_body(packages_body());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/balance");
            then.status(200).json_body(json!({ "balance": 50 }));
        })
        .await;
    let order = server
        .mock_async(|when, then| {
            when.method(POST).path("/transactions/orders");
            then.status(200).json_body(json!({ "success": true }));
        })
        .await;

    let err = orchestrator(&server)
        .process("1391379101 15749 wkp+86", GAME, &ctx())
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::InsufficientBalance { shortfall, .. } if shortfall == Decimal::new(8750, 2)));
    order.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn test_catalogue_outage_rejects_batch() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/packages");
            then.status(503)
                .json_body(json!({ "message": "maintenance" }));
        })
        .await;
    let order = server
        .mock_async(|when, then| {
            when.method(POST).path("/transactions/orders");
            then.status(200).json_body(json!({ "success": true }));
        })
        .await;

    let err = orchestrator(&server)
        .process("1 2 wkp", GAME, &ctx())
        .await
        .unwrap_err();

    match err {
        OrderError::CatalogueUnavailable { game, message } => {
            assert_eq!(game, GAME);
            assert_eq!(message, "maintenance");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    order.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn test_slow_submission_is_a_line_timeout() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/packages");
            then.status(200).json_body(packages_body());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/balance");
            then.status(200).json_body(json!({ "balance": 1000 }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/transactions/orders");
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!({ "success": true, "orderId": "late" }));
        })
        .await;

    let config = AppConfig::new(server.base_url());
    let client = HttpStorefrontClient::new(&config);
    let orchestrator = OrderOrchestrator::new(client.clone(), client.clone(), client)
        .with_submission_timeout(Duration::from_millis(200));

    let summary = orchestrator.process("1 2 86", GAME, &ctx()).await?;

    assert_eq!(summary.failure_count, 1);
    assert_eq!(
        summary.results[0].failure,
        Some(topup_order::LineFailure::SubmissionTimeout)
    );
    assert_eq!(summary.new_balance, summary.old_balance);
    Ok(())
}
