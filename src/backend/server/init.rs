//! Database startup.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Connect to Postgres and run pending migrations.
///
/// A migration failure is logged but does not abort startup: an
/// already-provisioned database that predates the migration table keeps
/// working.
pub async fn connect_database(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    tracing::info!("connected to database");

    if let Err(err) = sqlx::migrate!("./migrations").run(&pool).await {
        tracing::warn!(error = %err, "database migration failed, continuing");
    } else {
        tracing::info!("database migrations up to date");
    }

    Ok(pool)
}
