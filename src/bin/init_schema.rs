//! Utility to create the form responses table and its uniqueness constraints.

use desirability_form_api::config::Config;
use desirability_form_api::db::Database;

/// Main entry point for the schema utility.
///
/// Connects with the regular service configuration and applies the DDL,
/// which is a no-op when the table already exists.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = Config::from_env()?;
    let db = Database::new(&config).await?;
    db.ensure_schema().await?;

    let tables: Vec<(String, String)> = sqlx::query_as(
        "SELECT column_name, data_type FROM information_schema.columns WHERE table_name = $1 ORDER BY ordinal_position",
    )
    .bind("desirablity_form_responses")
    .fetch_all(&db.pool)
    .await?;

    println!("desirablity_form_responses:");
    for (col, type_) in tables {
        println!("  - {}: {}", col, type_);
    }

    Ok(())
}
