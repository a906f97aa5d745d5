mod common;

use common::*;
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};

use lambda_runtime::{Context, LambdaEvent};
use trumpify::api::{ApiState, handle_request, handler};
use trumpify::api::helpers::render;
use trumpify::api::parsing::InboundRequest;
use trumpify::api::signature::compute_signature;
use trumpify::core::config::DispatchStrategy;
use trumpify::core::models::Reply;
use trumpify::slack::response_builder::{PERMISSION_DENIED, USAGE_HINT};

#[tokio::test]
async fn test_non_post_methods_are_rejected_with_405() {
    let config = test_config(DispatchStrategy::Sync);
    let rewriter = FakeRewriter::returning("unused");
    let svc = services(rewriter.clone(), FakeSlack::new());

    for method in ["GET", "PUT", "DELETE", "PATCH", ""] {
        let request = InboundRequest::new(method, &command_body("hello"));
        let reply = handle_request(&config, &svc, &request).await;
        assert_eq!(reply, Reply::error(405, "Method not allowed"), "method {method:?}");
    }
    assert_eq!(rewriter.calls(), 0);
}

#[tokio::test]
async fn test_missing_signing_secret_is_a_500_regardless_of_payload() {
    let mut config = test_config(DispatchStrategy::Sync);
    config.slack_signing_secret = None;
    let rewriter = FakeRewriter::returning("unused");
    let svc = services(rewriter.clone(), FakeSlack::new());

    for body in [
        command_body("hello"),
        "type=url_verification&challenge=abc".to_string(),
        String::new(),
        "%FF%FE".to_string(),
    ] {
        let reply = handle_request(&config, &svc, &post(&body)).await;
        assert_eq!(reply, Reply::error(500, "Server configuration error"));
    }
    assert_eq!(rewriter.calls(), 0);
}

#[tokio::test]
async fn test_url_verification_echoes_challenge() {
    let config = test_config(DispatchStrategy::Impersonate);
    let svc = services(FakeRewriter::returning("unused"), FakeSlack::new());

    let reply = handle_request(
        &config,
        &svc,
        &post("type=url_verification&challenge=3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P"),
    )
    .await;

    assert_eq!(
        reply,
        Reply::Challenge("3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P".to_string())
    );

    let response = render(&reply);
    let body: serde_json::Value =
        serde_json::from_str(response["body"].as_str().unwrap()).unwrap();
    assert_eq!(
        body,
        json!({"challenge": "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P"})
    );
}

#[tokio::test]
async fn test_url_verification_skips_allow_list_and_text_checks() {
    let mut config = test_config(DispatchStrategy::Sync);
    config.allowed_user_ids = vec!["U_SOMEONE_ELSE".to_string()];
    let svc = services(FakeRewriter::returning("unused"), FakeSlack::new());

    let reply = handle_request(&config, &svc, &post("type=url_verification&challenge=c1")).await;
    assert_eq!(reply, Reply::Challenge("c1".to_string()));
}

#[tokio::test]
async fn test_blank_text_gets_usage_hint_without_provider_call() {
    let config = test_config(DispatchStrategy::Sync);
    let rewriter = FakeRewriter::returning("unused");
    let slack = FakeSlack::new();
    let svc = services(rewriter.clone(), slack.clone());

    for body in [command_body(""), command_body("   "), "text=%09%0A".to_string(), "user_id=U1".to_string()] {
        let reply = handle_request(&config, &svc, &post(&body)).await;
        assert_eq!(reply, Reply::ephemeral(USAGE_HINT));
    }

    assert_eq!(rewriter.calls(), 0);
    assert!(slack.posts().is_empty());
    assert!(slack.responses().is_empty());
}

#[tokio::test]
async fn test_user_outside_allow_list_is_denied_without_provider_call() {
    let mut config = test_config(DispatchStrategy::Impersonate);
    config.allowed_user_ids = vec!["U2".to_string(), "U3".to_string()];
    let rewriter = FakeRewriter::returning("unused");
    let slack = FakeSlack::new();
    let svc = services(rewriter.clone(), slack.clone());

    let reply = handle_request(&config, &svc, &post(&command_body("hello"))).await;

    assert_eq!(reply, Reply::ephemeral(PERMISSION_DENIED));
    assert_eq!(rewriter.calls(), 0);
    assert!(slack.posts().is_empty());
}

#[tokio::test]
async fn test_user_on_allow_list_proceeds() {
    let mut config = test_config(DispatchStrategy::Impersonate);
    config.allowed_user_ids = vec!["U1".to_string()];
    let rewriter = FakeRewriter::returning("Tremendous hello.");
    let slack = FakeSlack::new();
    let svc = services(rewriter.clone(), slack.clone());

    let reply = handle_request(&config, &svc, &post(&command_body("hello"))).await;

    assert_eq!(reply, Reply::Empty);
    assert_eq!(rewriter.calls(), 1);
    assert_eq!(slack.posts().len(), 1);
}

#[tokio::test]
async fn test_provider_failure_becomes_ephemeral_error() {
    let config = test_config(DispatchStrategy::Sync);
    let slack = FakeSlack::new();
    let svc = services(FakeRewriter::failing("upstream timed out"), slack.clone());

    let reply = handle_request(&config, &svc, &post(&command_body("hello"))).await;

    match reply {
        Reply::Ephemeral(text) => {
            assert!(text.starts_with("Sorry, something went wrong:"), "{text}");
            assert!(text.contains("upstream timed out"), "{text}");
        }
        other => panic!("expected ephemeral error, got {other:?}"),
    }
    assert!(slack.responses().is_empty());

    let response = render(&handle_request(&config, &svc, &post(&command_body("hello"))).await);
    assert_eq!(response["statusCode"], 200);
}

#[tokio::test]
async fn test_signed_request_is_accepted_when_verification_enabled() {
    let mut config = test_config(DispatchStrategy::Sync);
    config.verify_signatures = true;
    let svc = services(FakeRewriter::returning("unused"), FakeSlack::new());

    let body = "type=url_verification&challenge=signed";
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        .to_string();
    let request = post(body)
        .with_header("X-Slack-Request-Timestamp", &ts)
        .with_header("X-Slack-Signature", &compute_signature(&ts, body, SIGNING_SECRET));

    let reply = handle_request(&config, &svc, &request).await;
    assert_eq!(reply, Reply::Challenge("signed".to_string()));
}

#[tokio::test]
async fn test_unsigned_or_tampered_requests_are_rejected_with_401() {
    let mut config = test_config(DispatchStrategy::Sync);
    config.verify_signatures = true;
    let rewriter = FakeRewriter::returning("unused");
    let svc = services(rewriter.clone(), FakeSlack::new());

    let body = command_body("hello");
    let unsigned = handle_request(&config, &svc, &post(&body)).await;
    assert!(matches!(unsigned, Reply::Error { status: 401, .. }));

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        .to_string();
    let tampered = post(&command_body("something else"))
        .with_header("x-slack-request-timestamp", &ts)
        .with_header("x-slack-signature", &compute_signature(&ts, &body, SIGNING_SECRET));
    let reply = handle_request(&config, &svc, &tampered).await;
    assert_eq!(reply, Reply::error(401, "Invalid Slack signature"));

    assert_eq!(rewriter.calls(), 0);
}

#[test]
fn test_rendered_replies_match_slack_contract() {
    let ephemeral = render(&Reply::ephemeral("only you"));
    assert_eq!(ephemeral["statusCode"], 200);
    assert_eq!(ephemeral["headers"]["Content-Type"], "application/json");
    let body: serde_json::Value =
        serde_json::from_str(ephemeral["body"].as_str().unwrap()).unwrap();
    assert_eq!(body, json!({"response_type": "ephemeral", "text": "only you"}));

    let challenge = render(&Reply::Challenge("c".to_string()));
    assert_eq!(challenge["headers"]["Content-Type"], "application/json");

    let empty = render(&Reply::Empty);
    assert_eq!(empty["statusCode"], 200);
    assert_eq!(empty["body"], "");

    let not_allowed = render(&Reply::error(405, "Method not allowed"));
    assert_eq!(not_allowed["statusCode"], 405);
}

#[tokio::test]
async fn test_lambda_invocations_share_one_state() {
    let rewriter = FakeRewriter::returning("Tremendous.");
    let slack = FakeSlack::new();
    let state = ApiState::new(
        test_config(DispatchStrategy::Sync),
        services(rewriter.clone(), slack.clone()),
    );

    for _ in 0..2 {
        let event = json!({
            "requestContext": { "http": { "method": "POST" } },
            "rawPath": "/api/trumpify",
            "body": command_body("hello"),
            "isBase64Encoded": false
        });
        let response = handler(&state, LambdaEvent::new(event, Context::default()))
            .await
            .unwrap();
        assert_eq!(response["statusCode"], 200);
        assert_eq!(response["body"], "");
    }

    assert_eq!(rewriter.calls(), 2);
    assert_eq!(slack.responses().len(), 2);
}

#[tokio::test]
async fn test_lambda_rejects_get_before_touching_state() {
    let rewriter = FakeRewriter::returning("unused");
    let state = ApiState::new(
        test_config(DispatchStrategy::Sync),
        services(rewriter.clone(), FakeSlack::new()),
    );
    let event = json!({ "requestContext": { "http": { "method": "GET" } } });

    let response = handler(&state, LambdaEvent::new(event, Context::default()))
        .await
        .unwrap();

    assert_eq!(response["statusCode"], 405);
    assert_eq!(rewriter.calls(), 0);
}
