use crate::db::connection::DbPool;
use crate::db::models::Attributes;
use sqlx::Error;
use sqlx::types::Json;

pub fn increment_sql(table: &str, field: &str) -> String {
    format!(
        "INSERT INTO {table} (date, {field}) VALUES ($1, 1) \
         ON CONFLICT (date) DO UPDATE SET {field} = {table}.{field} + 1"
    )
}

pub fn fetch_sql(table: &str) -> String {
    format!("SELECT to_jsonb(t) FROM {table} t WHERE t.date = $1")
}

/// Add one to `field` of the row for `date_key`, creating the row on first
/// use. A single upsert statement, so concurrent callers never lose updates.
pub async fn increment_counter(
    pool: &DbPool,
    table: &str,
    date_key: &str,
    field: &str,
) -> Result<(), Error> {
    sqlx::query(&increment_sql(table, field))
        .bind(date_key)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn get_counters(
    pool: &DbPool,
    table: &str,
    date_key: &str,
) -> Result<Option<Attributes>, Error> {
    let row = sqlx::query_scalar::<_, Json<Attributes>>(&fetch_sql(table))
        .bind(date_key)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|json| json.0))
}

pub async fn ping(pool: &DbPool) -> Result<(), Error> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_is_a_single_upsert() {
        assert_eq!(
            increment_sql("feelings", "good"),
            "INSERT INTO feelings (date, good) VALUES ($1, 1) \
             ON CONFLICT (date) DO UPDATE SET good = feelings.good + 1"
        );
    }

    #[test]
    fn fetch_reads_whole_record() {
        assert_eq!(
            fetch_sql("feelings"),
            "SELECT to_jsonb(t) FROM feelings t WHERE t.date = $1"
        );
    }
}
