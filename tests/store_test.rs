//! Database round-trip tests.
//!
//! These run against the PostgreSQL instance named by `DATABASE_URL` and
//! replace its `air_quality` tables. Without `DATABASE_URL` they return
//! early. Everything lives in one test so runs never race on the tables.

use anyhow::Result;
use chrono::{TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sqlx::postgres::PgPoolOptions;

use airquality::store::{load_hourly, write_snapshot};
use airquality::summary::HourlyFilter;
use airquality::{generate, GeneratorConfig};

#[tokio::test]
async fn snapshot_replaces_tables_atomically() -> Result<()> {
    // ---
    let Ok(db_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database round-trip");
        return Ok(());
    };
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&db_url)
        .await?;

    let cfg = GeneratorConfig {
        sensor_count: 4,
        horizon_days: 1,
        interval_minutes: 15,
        ..Default::default()
    };
    let now = Utc.with_ymd_and_hms(2025, 8, 15, 9, 30, 0).unwrap();

    // 1) First snapshot lands intact
    let first = generate(&cfg, now, &mut StdRng::seed_from_u64(1))?;
    write_snapshot(&pool, &first.readings, &first.hourly).await?;

    let stored = load_hourly(&pool, &HourlyFilter::default()).await?;
    assert_eq!(stored.len(), first.hourly.len());
    assert_eq!(stored, first.hourly);

    let (raw_rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM air_quality")
        .fetch_one(&pool)
        .await?;
    assert_eq!(raw_rows, first.readings.len() as i64);

    // 2) Filters are applied in SQL the same way as in memory
    let zip = first.sensors[0].zip_code.clone();
    let filter = HourlyFilter {
        zip_codes: Some(vec![zip.clone()]),
        start: Some(first.start),
        end: Some(first.start + chrono::TimeDelta::hours(5)),
    };
    let filtered = load_hourly(&pool, &filter).await?;
    let expected: Vec<_> = filter.apply(&first.hourly).into_iter().cloned().collect();
    assert!(!filtered.is_empty());
    assert_eq!(filtered, expected);

    // 3) Regenerating replaces rather than appends
    let second = generate(&cfg, now, &mut StdRng::seed_from_u64(2))?;
    write_snapshot(&pool, &second.readings, &second.hourly).await?;
    let stored = load_hourly(&pool, &HourlyFilter::default()).await?;
    assert_eq!(stored, second.hourly);

    // 4) A failed write leaves the previous snapshot in place
    let mut broken = second.readings.clone();
    broken.extend(first.readings.iter().take(1).cloned().map(|mut r| {
        r.reading_id = second.readings[0].reading_id;
        r
    }));
    let third = generate(&cfg, now, &mut StdRng::seed_from_u64(3))?;
    let err = write_snapshot(&pool, &broken, &third.hourly).await;
    assert!(err.is_err(), "duplicate Reading_ID should abort the snapshot");

    let stored = load_hourly(&pool, &HourlyFilter::default()).await?;
    assert_eq!(stored, second.hourly);

    Ok(())
}
