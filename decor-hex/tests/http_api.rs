//! Integration tests for the HTTP surface.
//!
//! These drive the full router (guards, rate limiting, handlers) against an
//! in-memory SQLite repository and a scripted checkout gateway.
//!
//! This test requires the `sqlite` feature flag.

#![cfg(feature = "sqlite")]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use decor_gateway::SharedSecretVerifier;
use decor_hex::{DecorService, inbound::HttpServer};
use decor_repo::SqliteRepo;
use decor_types::{
    CheckoutGateway, CheckoutSession, CheckoutSessionRequest, GatewayError, Role, UserRepository,
};

const SECRET: &str = "integration-secret";

/// Gateway double serving sessions registered by the test.
#[derive(Default)]
struct ScriptedGateway {
    sessions: Mutex<HashMap<String, CheckoutSession>>,
}

impl ScriptedGateway {
    fn add(&self, session: CheckoutSession) {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id.clone(), session);
    }
}

#[async_trait]
impl CheckoutGateway for ScriptedGateway {
    async fn create_session(
        &self,
        req: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        Ok(CheckoutSession {
            id: "cs_new".into(),
            url: Some(format!(
                "https://pay.example/cs_new?amount={}",
                req.unit_amount.amount()
            )),
            payment_status: "unpaid".into(),
            metadata: req.metadata(),
            ..Default::default()
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, GatewayError> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| GatewayError::Rejected {
                status: 404,
                message: "No such checkout.session".into(),
            })
    }
}

struct TestApp {
    router: Router,
    repo: SqliteRepo,
    gateway: Arc<ScriptedGateway>,
    verifier: SharedSecretVerifier,
}

impl TestApp {
    async fn new(requests_per_minute: u32) -> Self {
        let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
        let gateway = Arc::new(ScriptedGateway::default());
        let service = DecorService::new(repo.clone(), gateway.clone(), "https://decor.example");
        let server = HttpServer::with_rate_limit(
            service,
            Arc::new(SharedSecretVerifier::new(SECRET)),
            requests_per_minute,
        );

        Self {
            router: server.router(),
            repo,
            gateway,
            verifier: SharedSecretVerifier::new(SECRET),
        }
    }

    fn token(&self, email: &str) -> String {
        self.verifier
            .sign(email, Duration::from_secs(600))
            .unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn create_booking(&self) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/bookings",
                None,
                Some(json!({
                    "userEmail": "a@x.com",
                    "userName": "Ann",
                    "serviceId": "7d1f6f46-0f0c-4a53-9c4b-4f2b8d2f7c11",
                    "serviceName": "Wedding Stage",
                    "cost": 50
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }
}

fn paid_session(id: &str, booking_id: &str, intent: &str) -> CheckoutSession {
    CheckoutSession {
        id: id.into(),
        url: None,
        payment_status: "paid".into(),
        amount_total: Some(5000),
        currency: Some("usd".into()),
        customer_email: Some("a@x.com".into()),
        metadata: HashMap::from([
            ("bookingId".to_string(), booking_id.to_string()),
            ("serviceName".to_string(), "Wedding Stage".to_string()),
        ]),
        payment_intent: Some(intent.into()),
    }
}

#[tokio::test]
async fn test_root_and_health() {
    let app = TestApp::new(100).await;

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"style decor is running!");

    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_checkout_session_returns_gateway_url() {
    let app = TestApp::new(100).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/create-checkout-session",
            None,
            Some(json!({
                "cost": 19.99,
                "serviceName": "Stage",
                "userEmail": "a@x.com",
                "bookingId": "7d1f6f46-0f0c-4a53-9c4b-4f2b8d2f7c11"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], "https://pay.example/cs_new?amount=1999");
}

#[tokio::test]
async fn test_payment_success_reconciles_once() {
    let app = TestApp::new(100).await;
    let booking_id = app.create_booking().await;
    app.gateway.add(paid_session("cs_1", &booking_id, "pi_1"));

    let (status, first) = app
        .send(Method::PATCH, "/payment-success?session_id=cs_1", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], true);
    assert_eq!(first["transactionId"], "pi_1");
    assert_eq!(first["modifyBooking"]["matchedCount"], 1);
    assert_eq!(first["paymentInfo"]["acknowledged"], true);
    let tracking_id = first["trackingId"].as_str().unwrap().to_string();
    assert!(tracking_id.starts_with("SD-"));

    let (status, second) = app
        .send(Method::PATCH, "/payment-success?session_id=cs_1", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["message"], "already exists");
    assert_eq!(second["trackingId"], tracking_id.as_str());

    let (_, booking) = app
        .send(Method::GET, &format!("/bookings/{}", booking_id), None, None)
        .await;
    assert_eq!(booking["paymentStatus"], "paid");
    assert_eq!(booking["deliveryStatus"], "pending-pickup");
    assert_eq!(booking["trackingId"], tracking_id.as_str());

    let token = app.token("a@x.com");
    let (status, payments) = app
        .send(Method::GET, "/payments?email=a@x.com", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payments.as_array().unwrap().len(), 1);
    assert_eq!(payments[0]["amount"], 50.0);
}

#[tokio::test]
async fn test_payment_success_unpaid_session() {
    let app = TestApp::new(100).await;
    let booking_id = app.create_booking().await;
    let mut session = paid_session("cs_open", &booking_id, "pi_open");
    session.payment_status = "unpaid".into();
    app.gateway.add(session);

    let (status, body) = app
        .send(Method::PATCH, "/payment-success?session_id=cs_open", None, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Payment not completed yet");

    let (_, booking) = app
        .send(Method::GET, &format!("/bookings/{}", booking_id), None, None)
        .await;
    assert_eq!(booking["paymentStatus"], "unpaid");
}

#[tokio::test]
async fn test_payment_success_unknown_session_is_bad_gateway() {
    let app = TestApp::new(100).await;

    let (status, body) = app
        .send(Method::PATCH, "/payment-success?session_id=cs_nope", None, None)
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], 502);
}

#[tokio::test]
async fn test_payments_requires_token() {
    let app = TestApp::new(100).await;

    let (status, body) = app.send(Method::GET, "/payments", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized access");

    let (status, _) = app
        .send(Method::GET, "/payments", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_payments_foreign_email_forbidden() {
    let app = TestApp::new(100).await;
    let token = app.token("b@x.com");

    let (status, body) = app
        .send(Method::GET, "/payments?email=a@x.com", Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 403);
}

#[tokio::test]
async fn test_profile_round_trip() {
    let app = TestApp::new(100).await;
    let (status, _) = app
        .send(
            Method::POST,
            "/users",
            None,
            Some(json!({ "email": "a@x.com", "name": "Ann" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let token = app.token("a@x.com");
    let (status, updated) = app
        .send(
            Method::PATCH,
            "/users/profile",
            Some(&token),
            Some(json!({ "phone": "555-0100" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["success"], true);

    let (status, profile) = app
        .send(Method::GET, "/users/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["phone"], "555-0100");
    assert_eq!(profile["name"], "Ann");

    let stranger = app.token("ghost@x.com");
    let (status, _) = app
        .send(Method::GET, "/users/profile", Some(&stranger), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_decorator_review_requires_admin() {
    let app = TestApp::new(100).await;
    for email in ["d@x.com", "boss@x.com"] {
        app.send(Method::POST, "/users", None, Some(json!({ "email": email })))
            .await;
    }
    app.repo
        .set_role_by_email("boss@x.com", Role::Admin)
        .await
        .unwrap();

    let (status, decorator) = app
        .send(
            Method::POST,
            "/decorators",
            None,
            Some(json!({ "name": "Dee", "email": "d@x.com", "rating": 4.8 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(decorator["status"], "pending");
    let uri = format!("/decorators/{}", decorator["id"].as_str().unwrap());
    let review = json!({ "status": "approved", "email": "d@x.com" });

    let (status, _) = app.send(Method::PATCH, &uri, None, Some(review.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let applicant = app.token("d@x.com");
    let (status, body) = app
        .send(Method::PATCH, &uri, Some(&applicant), Some(review.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden access");

    let admin = app.token("boss@x.com");
    let (status, outcome) = app
        .send(Method::PATCH, &uri, Some(&admin), Some(review))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["matchedCount"], 1);

    let (_, role) = app
        .send(Method::GET, "/users/d@x.com/role", None, None)
        .await;
    assert_eq!(role["role"], "decorator");
}

#[tokio::test]
async fn test_unknown_user_role_defaults_to_user() {
    let app = TestApp::new(100).await;

    let (status, body) = app
        .send(Method::GET, "/users/nobody@x.com/role", None, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "user");
}

#[tokio::test]
async fn test_invalid_booking_id_is_bad_request() {
    let app = TestApp::new(100).await;

    let (status, body) = app.send(Method::GET, "/bookings/nope", None, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_rate_limiting_returns_429_when_exceeded() {
    let app = TestApp::new(3).await;
    let token = app.token("a@x.com");

    for i in 1..=3 {
        let (status, _) = app.send(Method::GET, "/payments", Some(&token), None).await;
        assert_ne!(
            status,
            StatusCode::TOO_MANY_REQUESTS,
            "Request {} should not be rate limited",
            i
        );
    }

    let (status, body) = app.send(Method::GET, "/payments", Some(&token), None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Rate limit exceeded")
    );
    assert_eq!(body["retry_after_seconds"], 60);

    // Health is never limited
    for _ in 0..5 {
        let (status, _) = app.send(Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_rotating_tokens_share_one_bucket() {
    let app = TestApp::new(3).await;

    for i in 1..=3 {
        let token = format!("made-up-{}", i);
        let (status, _) = app.send(Method::GET, "/", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK, "Request {} should pass", i);
    }

    let (status, _) = app.send(Method::GET, "/", Some("made-up-4"), None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}
