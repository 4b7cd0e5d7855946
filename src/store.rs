//! Persistence of generated snapshots.
//!
//! A snapshot (raw readings plus hourly aggregates) is written in a single
//! transaction: fresh staging tables are created and bulk-filled, then
//! swapped in place of the live tables. If anything fails before commit the
//! transaction rolls back and the previous snapshot stays untouched.

use anyhow::{anyhow, Result};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{debug, info};

use crate::models::{HourlyAggregate, Reading};
use crate::schema::{self, HOURLY_TABLE, READINGS_TABLE};
use crate::summary::HourlyFilter;

// ---

/// Rows per INSERT statement. PostgreSQL caps a statement at 65535 bind
/// parameters; both tables have 10 columns.
const INSERT_CHUNK_ROWS: usize = 5_000;

/// Atomically replace both output tables with `readings` and `hourly`.
pub async fn write_snapshot(
    pool: &PgPool,
    readings: &[Reading],
    hourly: &[HourlyAggregate],
) -> Result<()> {
    // ---
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| anyhow!("Failed to begin snapshot transaction: {}", e))?;

    schema::create_staging_tables(&mut tx).await?;
    insert_readings(&mut tx, readings).await?;
    insert_hourly(&mut tx, hourly).await?;
    schema::swap_in_staging_tables(&mut tx).await?;

    tx.commit()
        .await
        .map_err(|e| anyhow!("Failed to commit snapshot: {}", e))?;

    info!(
        "Snapshot committed: {} rows in {}, {} rows in {}",
        readings.len(),
        READINGS_TABLE,
        hourly.len(),
        HOURLY_TABLE
    );
    Ok(())
}

async fn insert_readings(tx: &mut Transaction<'_, Postgres>, readings: &[Reading]) -> Result<()> {
    // ---
    let table = schema::staging_name(READINGS_TABLE);

    for (i, chunk) in readings.chunks(INSERT_CHUNK_ROWS).enumerate() {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            r#"INSERT INTO {table} ("Reading_ID", "Sensor_ID", "Longitude", "Latitude", "Zip_Code", "Timestamp", "Temperature", "PM2_5", "AQI", "CIG_APX") "#
        ));
        qb.push_values(chunk, |mut row, r| {
            row.push_bind(r.reading_id.to_string())
                .push_bind(&r.sensor_id)
                .push_bind(r.longitude)
                .push_bind(r.latitude)
                .push_bind(&r.zip_code)
                .push_bind(r.timestamp)
                .push_bind(r.temperature)
                .push_bind(r.pm2_5)
                .push_bind(i32::from(r.aqi))
                .push_bind(r.cig_apx);
        });
        qb.build()
            .execute(&mut **tx)
            .await
            .map_err(|e| anyhow!("Failed to insert readings chunk {}: {}", i, e))?;
        debug!("Inserted readings chunk {} ({} rows)", i, chunk.len());
    }
    Ok(())
}

async fn insert_hourly(tx: &mut Transaction<'_, Postgres>, hourly: &[HourlyAggregate]) -> Result<()> {
    // ---
    let table = schema::staging_name(HOURLY_TABLE);

    for (i, chunk) in hourly.chunks(INSERT_CHUNK_ROWS).enumerate() {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            r#"INSERT INTO {table} ("Sensor_ID", "Zip_Code", "Longitude", "Latitude", "Hour_Timestamp", "Avg_Temp", "Avg_PM2_5", "Avg_AQI", "Avg_CIG_APX", "Reading_Count") "#
        ));
        qb.push_values(chunk, |mut row, h| {
            row.push_bind(&h.sensor_id)
                .push_bind(&h.zip_code)
                .push_bind(h.longitude)
                .push_bind(h.latitude)
                .push_bind(h.hour_timestamp)
                .push_bind(h.avg_temp)
                .push_bind(h.avg_pm2_5)
                .push_bind(h.avg_aqi)
                .push_bind(h.avg_cig_apx)
                .push_bind(h.reading_count);
        });
        qb.build()
            .execute(&mut **tx)
            .await
            .map_err(|e| anyhow!("Failed to insert hourly chunk {}: {}", i, e))?;
        debug!("Inserted hourly chunk {} ({} rows)", i, chunk.len());
    }
    Ok(())
}

/// Read hourly aggregates matching `filter`, ordered by hour then sensor.
pub async fn load_hourly(pool: &PgPool, filter: &HourlyFilter) -> Result<Vec<HourlyAggregate>> {
    // ---
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        r#"SELECT "Sensor_ID", "Zip_Code", "Longitude", "Latitude", "Hour_Timestamp", "Avg_Temp", "Avg_PM2_5", "Avg_AQI", "Avg_CIG_APX", "Reading_Count" FROM {HOURLY_TABLE} WHERE TRUE"#
    ));

    if let Some(zips) = &filter.zip_codes {
        qb.push(r#" AND "Zip_Code" = ANY("#)
            .push_bind(zips.clone())
            .push(")");
    }
    if let Some(start) = filter.start {
        qb.push(r#" AND "Hour_Timestamp" >= "#).push_bind(start);
    }
    if let Some(end) = filter.end {
        qb.push(r#" AND "Hour_Timestamp" <= "#).push_bind(end);
    }
    qb.push(r#" ORDER BY "Hour_Timestamp", "Sensor_ID""#);

    let rows = qb
        .build_query_as::<HourlyAggregate>()
        .fetch_all(pool)
        .await
        .map_err(|e| anyhow!("Failed to load {}: {}", HOURLY_TABLE, e))?;

    debug!("Loaded {} hourly rows with {:?}", rows.len(), filter);
    Ok(rows)
}
