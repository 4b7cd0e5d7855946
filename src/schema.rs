//! Table definitions for the generated air-quality snapshot.
//!
//! Both output tables are created under a staging name, filled, and then
//! renamed over the live tables inside one transaction (see `store.rs`).
//! Column identifiers are quoted so the mixed-case names consumers expect
//! survive PostgreSQL's case folding.

use anyhow::Result;
use sqlx::{Postgres, Transaction};

// ---

/// Live raw-readings table.
pub const READINGS_TABLE: &str = "air_quality";

/// Live hourly-aggregate table.
pub const HOURLY_TABLE: &str = "air_quality_hourly";

/// Name of the staging table that replaces `table` on commit.
pub fn staging_name(table: &str) -> String {
    format!("{}_staging", table)
}

/// Create empty staging tables for both outputs, discarding leftovers from
/// any earlier run that failed before commit.
pub async fn create_staging_tables(tx: &mut Transaction<'_, Postgres>) -> Result<()> {
    // ---
    let readings = staging_name(READINGS_TABLE);
    let hourly = staging_name(HOURLY_TABLE);

    sqlx::query(&format!("DROP TABLE IF EXISTS {readings}"))
        .execute(&mut **tx)
        .await?;
    sqlx::query(&format!("DROP TABLE IF EXISTS {hourly}"))
        .execute(&mut **tx)
        .await?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE {readings} (
            "Reading_ID"  TEXT             NOT NULL,
            "Sensor_ID"   TEXT             NOT NULL,
            "Longitude"   DOUBLE PRECISION NOT NULL,
            "Latitude"    DOUBLE PRECISION NOT NULL,
            "Zip_Code"    TEXT             NOT NULL,
            "Timestamp"   TIMESTAMPTZ      NOT NULL,
            "Temperature" DOUBLE PRECISION NOT NULL,
            "PM2_5"       DOUBLE PRECISION NOT NULL,
            "AQI"         INTEGER          NOT NULL CHECK ("AQI" BETWEEN 0 AND 500),
            "CIG_APX"     DOUBLE PRECISION NOT NULL
        );
        "#
    ))
    .execute(&mut **tx)
    .await?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE {hourly} (
            "Sensor_ID"      TEXT             NOT NULL,
            "Zip_Code"       TEXT             NOT NULL,
            "Longitude"      DOUBLE PRECISION NOT NULL,
            "Latitude"       DOUBLE PRECISION NOT NULL,
            "Hour_Timestamp" TIMESTAMPTZ      NOT NULL,
            "Avg_Temp"       DOUBLE PRECISION NOT NULL,
            "Avg_PM2_5"      DOUBLE PRECISION NOT NULL,
            "Avg_AQI"        DOUBLE PRECISION NOT NULL,
            "Avg_CIG_APX"    DOUBLE PRECISION NOT NULL,
            "Reading_Count"  BIGINT           NOT NULL
        );
        "#
    ))
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Replace the live tables with the staging tables.
///
/// Must run inside the same transaction that filled the staging tables;
/// PostgreSQL DDL is transactional, so readers see either the old snapshot
/// or the new one.
pub async fn swap_in_staging_tables(tx: &mut Transaction<'_, Postgres>) -> Result<()> {
    // ---
    for table in [READINGS_TABLE, HOURLY_TABLE] {
        let staging = staging_name(table);
        sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
            .execute(&mut **tx)
            .await?;
        sqlx::query(&format!("ALTER TABLE {staging} RENAME TO {table}"))
            .execute(&mut **tx)
            .await?;
    }

    // Index names are schema-global, so they are created after the rename
    sqlx::query(&format!(
        r#"CREATE UNIQUE INDEX IF NOT EXISTS idx_{READINGS_TABLE}_reading_id ON {READINGS_TABLE} ("Reading_ID")"#
    ))
    .execute(&mut **tx)
    .await?;

    sqlx::query(&format!(
        r#"CREATE INDEX IF NOT EXISTS idx_{READINGS_TABLE}_sensor_ts ON {READINGS_TABLE} ("Sensor_ID", "Timestamp")"#
    ))
    .execute(&mut **tx)
    .await?;

    sqlx::query(&format!(
        r#"CREATE INDEX IF NOT EXISTS idx_{HOURLY_TABLE}_zip_hour ON {HOURLY_TABLE} ("Zip_Code", "Hour_Timestamp")"#
    ))
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_staging_names() {
        // ---
        assert_eq!(staging_name(READINGS_TABLE), "air_quality_staging");
        assert_eq!(staging_name(HOURLY_TABLE), "air_quality_hourly_staging");
    }
}
