
use folio_api::auth::maintenance::migrate_legacy_passwords;
use folio_core::{
    errors::FolioError,
    models::user::{CreateUserRequest, Role, User},
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use uuid::Uuid;

use test_utils::{start_time, TestContext};

fn request(name: &str, email: &str, password: &str, role: Option<Role>) -> CreateUserRequest {
    CreateUserRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role,
    }
}

async fn bootstrap_admin(ctx: &TestContext) -> String {
    ctx.auth()
        .create_user(request("root", "root@example.com", "bootstrap-pass", None), None)
        .await
        .unwrap();
    ctx.login("root", "bootstrap-pass").await
}

#[tokio::test]
async fn test_bootstrap_user_needs_no_token_and_is_admin() {
    let ctx = TestContext::new();

    let response = ctx
        .auth()
        .create_user(request("root", "Root@Example.com", "bootstrap-pass", None), None)
        .await
        .unwrap();

    let root = ctx.user("root").await;
    assert_eq!(root.id, response.user_id);
    assert_eq!(root.role, Role::Admin);
    assert_eq!(root.email, "root@example.com");
    assert_eq!(root.failed_login_attempts, 0);
    assert_eq!(root.locked_until, None);
    assert_ne!(root.password_hash, "bootstrap-pass");
}

#[tokio::test]
async fn test_second_user_requires_token() {
    let ctx = TestContext::new();
    bootstrap_admin(&ctx).await;

    let err = ctx
        .auth()
        .create_user(request("bob", "bob@example.com", "bob-password", None), None)
        .await
        .unwrap_err();

    assert!(matches!(err, FolioError::AuthenticationRequired(_)));
    assert!(ctx.store.user_by_name("bob").await.is_none());
}

#[tokio::test]
async fn test_admin_creates_user_with_default_role() {
    let ctx = TestContext::new();
    let token = bootstrap_admin(&ctx).await;

    ctx.auth()
        .create_user(
            request("bob", "bob@example.com", "bob-password", None),
            Some(&token),
        )
        .await
        .unwrap();
    ctx.auth()
        .create_user(
            request("carol", "carol@example.com", "carol-password", Some(Role::Admin)),
            Some(&token),
        )
        .await
        .unwrap();

    assert_eq!(ctx.user("bob").await.role, Role::User);
    assert_eq!(ctx.user("carol").await.role, Role::Admin);
}

#[tokio::test]
async fn test_duplicate_username_is_rejected() {
    let ctx = TestContext::new();
    let token = bootstrap_admin(&ctx).await;

    let err = ctx
        .auth()
        .create_user(
            request("root", "other@example.com", "another-pass", None),
            Some(&token),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, FolioError::AlreadyExists(_)));
}

#[tokio::test]
async fn test_user_role_cannot_provision() {
    let ctx = TestContext::new();
    let admin = bootstrap_admin(&ctx).await;
    ctx.auth()
        .create_user(
            request("bob", "bob@example.com", "bob-password", None),
            Some(&admin),
        )
        .await
        .unwrap();
    let bob = ctx.login("bob", "bob-password").await;

    let err = ctx
        .auth()
        .create_user(
            request("mallory", "mallory@example.com", "mallory-pass", None),
            Some(&bob),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, FolioError::AuthorizationDenied(_)));
    assert!(ctx.store.user_by_name("mallory").await.is_none());
}

#[rstest]
#[case::blank_name("   ".to_string(), "x@example.com", "long-enough".to_string())]
#[case::long_name("n".repeat(51), "x@example.com", "long-enough".to_string())]
#[case::bad_email("someone".to_string(), "not-an-email", "long-enough".to_string())]
#[case::short_password("someone".to_string(), "x@example.com", "short".to_string())]
#[case::long_password("someone".to_string(), "x@example.com", "p".repeat(129))]
#[tokio::test]
async fn test_invalid_requests_are_rejected(
    #[case] name: String,
    #[case] email: &str,
    #[case] password: String,
) {
    let ctx = TestContext::new();

    let err = ctx
        .auth()
        .create_user(request(&name, email, &password, None), None)
        .await
        .unwrap_err();

    assert!(matches!(err, FolioError::Validation(_)));
}

#[tokio::test]
async fn test_created_user_can_log_in() {
    let ctx = TestContext::new();
    let created = ctx
        .auth()
        .create_user(request("  root  ", "root@example.com", "bootstrap-pass", None), None)
        .await
        .unwrap();

    let login = ctx.auth().login("root", "bootstrap-pass").await.unwrap();

    assert_eq!(login.user_id, created.user_id);
}

fn legacy_user(name: &str, plaintext: &str) -> User {
    User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@example.com", name),
        password_hash: plaintext.to_string(),
        role: Role::Admin,
        failed_login_attempts: 0,
        locked_until: None,
        created_at: start_time(),
    }
}

#[tokio::test]
async fn test_legacy_plaintext_passwords_are_migrated() {
    let ctx = TestContext::new();
    ctx.store
        .seed_user(legacy_user("legacy", "plaintext-secret"))
        .await;
    // parses as a PHC string with algorithm `secret`
    ctx.store.seed_user(legacy_user("dollar", "$secret")).await;
    ctx.seed_user("modern", "already-hashed", Role::User, 0).await;

    let err = ctx.auth().login("legacy", "plaintext-secret").await.unwrap_err();
    assert!(matches!(err, FolioError::InvalidCredentials));

    assert_eq!(migrate_legacy_passwords(&ctx.store, &ctx.hasher).await.unwrap(), 2);
    assert_eq!(migrate_legacy_passwords(&ctx.store, &ctx.hasher).await.unwrap(), 0);

    // the failed attempt above left one strike behind, a success clears it
    ctx.login("legacy", "plaintext-secret").await;
    assert_eq!(ctx.user("legacy").await.failed_login_attempts, 0);
    ctx.login("dollar", "$secret").await;
    ctx.login("modern", "already-hashed").await;
}
