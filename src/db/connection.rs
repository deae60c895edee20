use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;

use crate::feeling::Feeling;

pub type DbPool = Pool<Postgres>;

/// Identifiers are interpolated into SQL, so only plain lowercase names pass.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && name.len() <= 63
}

pub async fn init_db(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .max_lifetime(Duration::from_secs(30 * 60))
        .idle_timeout(Duration::from_secs(10 * 60))
        .connect(database_url)
        .await
}

pub fn create_table_sql(table: &str) -> String {
    let counters = Feeling::ALL
        .iter()
        .map(|f| format!("{} BIGINT NOT NULL DEFAULT 0", f.field_name()))
        .collect::<Vec<_>>()
        .join(",\n            ");

    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            date VARCHAR(10) PRIMARY KEY,
            {counters}
        )
        "#
    )
}

pub async fn ensure_schema(pool: &DbPool, table: &str) -> Result<(), sqlx::Error> {
    if !is_valid_identifier(table) {
        return Err(sqlx::Error::Configuration(
            format!("invalid table name {table:?}").into(),
        ));
    }

    sqlx::query(&create_table_sql(table)).execute(pool).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(is_valid_identifier("feelings"));
        assert!(is_valid_identifier("_poll_results_2"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("2fast"));
        assert!(!is_valid_identifier("Feelings"));
        assert!(!is_valid_identifier("feelings; DROP TABLE x"));
        assert!(!is_valid_identifier(&"a".repeat(64)));
    }

    #[test]
    fn table_has_one_column_per_feeling() {
        let sql = create_table_sql("feelings");
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS feelings"));
        assert!(sql.contains("date VARCHAR(10) PRIMARY KEY"));
        for feeling in Feeling::ALL {
            assert!(sql.contains(&format!("{} BIGINT NOT NULL DEFAULT 0", feeling.field_name())));
        }
    }
}
