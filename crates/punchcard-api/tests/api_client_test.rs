// Integration tests for `ApiClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use punchcard_api::types::{RedemptionSubmission, RedemptionWireKind};
use punchcard_api::{ApiClient, Error, RedemptionResponse};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base = server.uri().parse().expect("mock server URI");
    let client = ApiClient::with_client(reqwest::Client::new(), base);
    (server, client)
}

fn operator_token() -> SecretString {
    SecretString::from("op-token-123".to_string())
}

// ── Auth ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_returns_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({
            "email": "clerk@example.com",
            "password": "hunter22",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "fresh-bearer",
        })))
        .mount(&server)
        .await;

    let token = client
        .login("clerk@example.com", &SecretString::from("hunter22".to_string()))
        .await
        .expect("login should succeed");

    use secrecy::ExposeSecret;
    assert_eq!(token.expose_secret(), "fresh-bearer");
}

#[tokio::test]
async fn test_login_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let err = client
        .login("clerk@example.com", &SecretString::from("wrong".to_string()))
        .await
        .expect_err("login should fail");

    assert!(matches!(err, Error::Authentication { .. }));
    assert!(err.is_auth_expired());
}

// ── Profile & rewards ───────────────────────────────────────────────

#[tokio::test]
async fn test_self_info_decodes_profile() {
    let (server, client) = setup().await;

    let reward_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/api/users/self"))
        .and(header("Authorization", "Bearer op-token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stamps": 7,
            "eligible_rewards": [
                {
                    "reward_id": reward_id,
                    "name": "Free espresso",
                    "description": "One shot on the house",
                }
            ]
        })))
        .mount(&server)
        .await;

    let profile = client
        .self_info(&operator_token())
        .await
        .expect("self_info should succeed");

    assert_eq!(profile.stamps, 7);
    assert_eq!(profile.eligible_rewards.len(), 1);
    assert_eq!(profile.eligible_rewards[0].reward_id, reward_id);
    assert_eq!(profile.eligible_rewards[0].name, "Free espresso");
    assert!(profile.eligible_rewards[0].picture.is_none());
}

#[tokio::test]
async fn test_eligible_rewards_path() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/customers/cust-abc/rewards"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "reward_id": Uuid::new_v4(), "name": "Croissant" },
        ])))
        .mount(&server)
        .await;

    let rewards = client
        .eligible_rewards(&operator_token(), "cust-abc")
        .await
        .expect("eligible_rewards should succeed");

    assert_eq!(rewards.len(), 1);
    assert_eq!(rewards[0].name, "Croissant");
}

// ── Redemptions ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_submit_redemption_granted_with_rewards() {
    let (server, client) = setup().await;

    let reward_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/api/redemptions"))
        .and(header("Idempotency-Key", "reward_redemption:cust-abc:171000"))
        .and(body_json(json!({
            "kind": "reward_redemption",
            "subject_token": "cust-abc",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "granted",
            "eligible_rewards": [
                { "reward_id": reward_id, "name": "Free espresso" },
            ]
        })))
        .mount(&server)
        .await;

    let submission = RedemptionSubmission {
        kind: RedemptionWireKind::RewardRedemption,
        subject_token: "cust-abc".into(),
    };

    let resp = client
        .submit_redemption(
            &operator_token(),
            "reward_redemption:cust-abc:171000",
            &submission,
        )
        .await
        .expect("submission should succeed");

    match resp {
        RedemptionResponse::Granted { eligible_rewards } => {
            assert_eq!(eligible_rewards.len(), 1);
            assert_eq!(eligible_rewards[0].reward_id, reward_id);
        }
        other => panic!("expected granted, got {other:?}"),
    }
}

#[tokio::test]
async fn test_submit_redemption_already_redeemed() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/redemptions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "already_redeemed" })),
        )
        .mount(&server)
        .await;

    let submission = RedemptionSubmission {
        kind: RedemptionWireKind::StampGrant,
        subject_token: "cust-abc".into(),
    };

    let resp = client
        .submit_redemption(&operator_token(), "stamp_grant:cust-abc:171000", &submission)
        .await
        .expect("submission should succeed");

    assert!(matches!(resp, RedemptionResponse::AlreadyRedeemed));
}

// ── Error shaping ───────────────────────────────────────────────────

#[tokio::test]
async fn test_expired_session_maps_to_session_expired() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/users/self"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client
        .self_info(&operator_token())
        .await
        .expect_err("should fail");

    assert!(matches!(err, Error::SessionExpired));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/redemptions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let submission = RedemptionSubmission {
        kind: RedemptionWireKind::StampGrant,
        subject_token: "cust-abc".into(),
    };

    let err = client
        .submit_redemption(&operator_token(), "stamp_grant:cust-abc:171000", &submission)
        .await
        .expect_err("should fail");

    assert!(matches!(err, Error::Service { status: 503, .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_malformed_body_reports_deserialization() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/users/self"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let err = client
        .self_info(&operator_token())
        .await
        .expect_err("should fail");

    match err {
        Error::Deserialization { body, .. } => assert!(body.contains("nope")),
        other => panic!("expected deserialization error, got {other:?}"),
    }
}
