//! SQLite persistence of school records.

use chrono::NaiveDate;
use futures::TryStreamExt;
use log::info;
use sqlx::{Pool, Row, Sqlite};

use crate::config::SCHOOLS_TABLE;
use crate::error_handling::DatabaseError;
use crate::record::{Sector, SchoolRecord};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Replaces the table contents with `records` in one transaction.
///
/// Returns the number of rows written. On error nothing is changed.
pub async fn save_sqlite(pool: &Pool<Sqlite>, records: &[SchoolRecord]) -> Result<usize, DatabaseError> {
    let mut tx = pool.begin().await?;

    sqlx::query(&format!("DELETE FROM {SCHOOLS_TABLE}"))
        .execute(&mut *tx)
        .await?;

    let insert = format!(
        "INSERT INTO {SCHOOLS_TABLE} (
            sector, school_name, suburb, postcode, phone, public_email,
            contact_form_url, website_url, source_directory_url, last_verified_date,
            lat, lon, email_validation_status, email_validation_reason, website_checked
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    );
    for record in records {
        sqlx::query(&insert)
            .bind(record.sector.as_str())
            .bind(record.school_name.as_deref())
            .bind(record.suburb.as_deref())
            .bind(record.postcode.as_deref())
            .bind(record.phone.as_deref())
            .bind(record.public_email.as_deref())
            .bind(record.contact_form_url.as_deref())
            .bind(record.website_url.as_deref())
            .bind(record.source_directory_url.as_deref())
            .bind(
                record
                    .last_verified_date
                    .map(|d| d.format(DATE_FORMAT).to_string()),
            )
            .bind(record.lat)
            .bind(record.lon)
            .bind(record.email_validation_status.as_deref())
            .bind(record.email_validation_reason.as_deref())
            .bind(record.website_checked)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    info!("Saved {} rows to {}", records.len(), SCHOOLS_TABLE);
    Ok(records.len())
}

/// Streams every row back in insertion order.
pub async fn load_sqlite(pool: &Pool<Sqlite>) -> Result<Vec<SchoolRecord>, DatabaseError> {
    let query = format!(
        "SELECT sector, school_name, suburb, postcode, phone, public_email,
                contact_form_url, website_url, source_directory_url, last_verified_date,
                lat, lon, email_validation_status, email_validation_reason, website_checked
         FROM {SCHOOLS_TABLE} ORDER BY id"
    );
    let mut rows = sqlx::query(&query).fetch(pool);

    let mut records = Vec::new();
    while let Some(row) = rows.try_next().await? {
        let sector: String = row.try_get("sector")?;
        let last_verified: Option<String> = row.try_get("last_verified_date")?;
        records.push(SchoolRecord {
            sector: Sector::from_label(&sector),
            school_name: row.try_get("school_name")?,
            suburb: row.try_get("suburb")?,
            postcode: row.try_get("postcode")?,
            phone: row.try_get("phone")?,
            public_email: row.try_get("public_email")?,
            contact_form_url: row.try_get("contact_form_url")?,
            website_url: row.try_get("website_url")?,
            source_directory_url: row.try_get("source_directory_url")?,
            last_verified_date: last_verified
                .and_then(|d| NaiveDate::parse_from_str(&d, DATE_FORMAT).ok()),
            lat: row.try_get("lat")?,
            lon: row.try_get("lon")?,
            email_validation_status: row.try_get("email_validation_status")?,
            email_validation_reason: row.try_get("email_validation_reason")?,
            website_checked: row.try_get("website_checked")?,
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::run_migrations;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> Pool<Sqlite> {
        // One connection so every query sees the same in-memory database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test database pool");
        run_migrations(&pool).await.expect("Failed to run migrations");
        pool
    }

    fn sample() -> Vec<SchoolRecord> {
        vec![
            SchoolRecord {
                sector: Sector::Catholic,
                school_name: Some("St Mary's".into()),
                suburb: Some("Manly".into()),
                postcode: Some("2095".into()),
                public_email: Some("office@stmarys.nsw.edu.au".into()),
                last_verified_date: NaiveDate::from_ymd_opt(2025, 6, 30),
                lat: Some(-33.79),
                lon: Some(151.28),
                website_checked: true,
                ..Default::default()
            },
            SchoolRecord {
                school_name: Some("Unknown Sector School".into()),
                ..Default::default()
            },
        ]
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let pool = memory_pool().await;
        let records = sample();
        assert_eq!(save_sqlite(&pool, &records).await.unwrap(), 2);
        assert_eq!(load_sqlite(&pool).await.unwrap(), records);
    }

    #[tokio::test]
    async fn test_save_replaces_previous_contents() {
        let pool = memory_pool().await;
        save_sqlite(&pool, &sample()).await.unwrap();
        let replacement = vec![SchoolRecord {
            school_name: Some("Only One".into()),
            ..Default::default()
        }];
        save_sqlite(&pool, &replacement).await.unwrap();

        let loaded = load_sqlite(&pool).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].school_name.as_deref(), Some("Only One"));
    }
}
