use color_eyre::eyre::Result;
use dotenv::dotenv;
use folio_api::{auth::maintenance::purge_expired_sessions, config::log_level_from_env};
use folio_core::clock::SystemClock;
use folio_db::store::PgCredentialStore;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Deletes sessions that expired without being presented again. Meant to be
/// run from cron; request handling only reaps the sessions it touches.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level_from_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let database_url = std::env::var("DATABASE_URL")?;
    let db_pool = folio_db::create_pool(&database_url).await?;

    let store = PgCredentialStore::new(db_pool);
    let deleted = purge_expired_sessions(&store, &SystemClock).await?;
    info!("Removed {} expired session(s).", deleted);

    Ok(())
}
