use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_core::{
    clock::Clock,
    errors::FolioResult,
    store::{CredentialStore, CredentialTransaction},
};
use mockall::mock;

// Mock collaborators for testing
mock! {
    pub Clock {}

    impl Clock for Clock {
        fn now(&self) -> DateTime<Utc>;
    }
}

mock! {
    pub CredentialStore {}

    #[async_trait]
    impl CredentialStore for CredentialStore {
        async fn begin(&self) -> FolioResult<Box<dyn CredentialTransaction>>;
    }
}

#[cfg(test)]
pub async fn create_test_pool() -> Option<crate::DbPool> {
    let database_url = std::env::var("TEST_DATABASE_URL").ok()?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    // Initialize test schema
    crate::schema::initialize_database(&pool)
        .await
        .expect("Failed to initialize test database schema");

    Some(pool)
}
