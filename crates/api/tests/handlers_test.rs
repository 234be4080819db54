
use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use folio_api::{
    auth::{AuthPolicy, AuthService},
    ApiState,
};
use folio_core::{
    clock::SystemClock,
    errors::FolioError,
    models::{
        session::{AuthenticatedUser, LoginResponse, LogoutResponse, VerifyTokenResponse},
        user::{CreateUserResponse, Role},
    },
};
use folio_db::mock::MockCredentialStore;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use test_utils::{fast_hasher, TestContext};

fn server(ctx: &TestContext) -> TestServer {
    TestServer::new(folio_api::app(ctx.state.clone())).unwrap()
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

#[test_log::test(tokio::test)]
async fn test_login_endpoint() {
    let ctx = TestContext::new();
    let alice = ctx.seed_user("alice", "correct horse", Role::Admin, 0).await;
    let server = server(&ctx);

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "username": "alice", "password": "correct horse" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<LoginResponse>();
    assert_eq!(body.user_id, alice);
    assert_eq!(body.token.len(), 64);
}

#[tokio::test]
async fn test_login_endpoint_rejects_bad_credentials() {
    let ctx = TestContext::new();
    ctx.seed_user("alice", "correct horse", Role::Admin, 0).await;
    let server = server(&ctx);

    let wrong = server
        .post("/api/auth/login")
        .json(&json!({ "username": "alice", "password": "battery staple" }))
        .await;
    let unknown = server
        .post("/api/auth/login")
        .json(&json!({ "username": "nobody", "password": "battery staple" }))
        .await;

    assert_eq!(wrong.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.json::<Value>(), unknown.json::<Value>());
    assert_eq!(
        wrong.json::<Value>(),
        json!({ "error": "Invalid credentials" })
    );
}

#[tokio::test]
async fn test_login_endpoint_reports_lock() {
    let ctx = TestContext::new();
    ctx.seed_user("alice", "correct horse", Role::Admin, 4).await;
    let server = server(&ctx);

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "username": "alice", "password": "battery staple" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::LOCKED);
    assert_eq!(
        response.headers().get(header::RETRY_AFTER),
        Some(&HeaderValue::from_static("900"))
    );
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Account locked. Try again in 15 minute(s)" })
    );
}

#[tokio::test]
async fn test_verify_and_logout_endpoints() {
    let ctx = TestContext::new();
    let alice = ctx.seed_user("alice", "correct horse", Role::Admin, 0).await;
    let token = ctx.login("alice", "correct horse").await;
    let server = server(&ctx);

    let verified = server
        .post("/api/auth/verify")
        .json(&json!({ "token": token }))
        .await;
    assert_eq!(verified.status_code(), StatusCode::OK);
    assert_eq!(
        verified.json::<VerifyTokenResponse>(),
        VerifyTokenResponse::valid(alice, "alice".to_string(), Role::Admin)
    );

    let logout = server
        .post("/api/auth/logout")
        .json(&json!({ "token": token }))
        .await;
    assert_eq!(logout.status_code(), StatusCode::OK);
    assert!(logout.json::<LogoutResponse>().success);

    let verified = server
        .post("/api/auth/verify")
        .json(&json!({ "token": token }))
        .await;
    assert_eq!(verified.json::<Value>(), json!({ "valid": false }));
}

#[tokio::test]
async fn test_session_endpoint_gate() {
    let ctx = TestContext::new();
    let alice = ctx.seed_user("alice", "correct horse", Role::Admin, 0).await;
    ctx.seed_user("bob", "correct horse", Role::User, 0).await;
    let admin = ctx.login("alice", "correct horse").await;
    let user = ctx.login("bob", "correct horse").await;
    let server = server(&ctx);

    let anonymous = server.get("/api/auth/session").await;
    assert_eq!(anonymous.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        anonymous.json::<Value>(),
        json!({ "error": "Authentication required: No token provided" })
    );

    let forbidden = server
        .get("/api/auth/session")
        .add_header(header::AUTHORIZATION, bearer(&user))
        .await;
    assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);

    let allowed = server
        .get("/api/auth/session")
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .await;
    assert_eq!(allowed.status_code(), StatusCode::OK);
    let identity = allowed.json::<AuthenticatedUser>();
    assert_eq!(identity.user_id, alice);
    assert_eq!(identity.username, "alice");
}

#[tokio::test]
async fn test_create_user_endpoint() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let bootstrap = server
        .post("/api/users")
        .json(&json!({
            "name": "root",
            "email": "root@example.com",
            "password": "bootstrap-pass"
        }))
        .await;
    assert_eq!(bootstrap.status_code(), StatusCode::CREATED);
    let created = bootstrap.json::<CreateUserResponse>();
    assert_eq!(ctx.user("root").await.id, created.user_id);

    let anonymous = server
        .post("/api/users")
        .json(&json!({
            "name": "bob",
            "email": "bob@example.com",
            "password": "bob-password"
        }))
        .await;
    assert_eq!(anonymous.status_code(), StatusCode::UNAUTHORIZED);

    let token = ctx.login("root", "bootstrap-pass").await;
    let duplicate = server
        .post("/api/users")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({
            "name": "root",
            "email": "root@example.com",
            "password": "bootstrap-pass"
        }))
        .await;
    assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);

    let invalid = server
        .post("/api/users")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({
            "name": "bob",
            "email": "bob",
            "password": "bob-password"
        }))
        .await;
    assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_and_version() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let health = server.get("/health").await;
    assert_eq!(health.status_code(), StatusCode::OK);
    assert_eq!(health.json::<Value>(), json!({ "status": "ok" }));

    let version = server.get("/version").await;
    assert_eq!(
        version.json::<Value>(),
        json!({ "version": env!("CARGO_PKG_VERSION") })
    );
}

#[tokio::test]
async fn test_store_failure_is_masked() {
    let mut store = MockCredentialStore::new();
    store
        .expect_begin()
        .returning(|| Err(FolioError::Database(eyre::eyre!("password authentication failed"))));
    let state = Arc::new(ApiState {
        auth: AuthService::new(
            Arc::new(store),
            fast_hasher(),
            Arc::new(SystemClock),
            AuthPolicy::default(),
        ),
    });
    let server = TestServer::new(folio_api::app(state)).unwrap();

    let login = server
        .post("/api/auth/login")
        .json(&json!({ "username": "alice", "password": "correct horse" }))
        .await;
    assert_eq!(login.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        login.json::<Value>(),
        json!({ "error": "Internal server error" })
    );

    let health = server.get("/health").await;
    assert_eq!(health.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}
