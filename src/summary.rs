//! Read-side summaries over hourly aggregates.
//!
//! These are the figures downstream readers derive from the hourly table:
//! zone/date filtering, mean / 95th percentile / max AQI, the category
//! breakdown, daily good/unhealthy counts and extremes, the hour-of-day
//! profile, per-zone rollups and the best and worst zone. They
//! are pure functions so a freshly written snapshot can be checked without a
//! dashboard.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::Serialize;

use crate::aqi::AqiCategory;
use crate::models::HourlyAggregate;

// ---

/// Zone and inclusive hour-range filter over the hourly table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlyFilter {
    /// Keep only these zones; `None` keeps all.
    pub zip_codes: Option<Vec<String>>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl HourlyFilter {
    pub fn matches(&self, row: &HourlyAggregate) -> bool {
        // ---
        self.zip_codes
            .as_ref()
            .map_or(true, |zips| zips.iter().any(|z| z == &row.zip_code))
            && self.start.map_or(true, |s| row.hour_timestamp >= s)
            && self.end.map_or(true, |e| row.hour_timestamp <= e)
    }

    pub fn apply<'a>(&self, rows: &'a [HourlyAggregate]) -> Vec<&'a HourlyAggregate> {
        rows.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Mean, 95th percentile and maximum of a set of AQI values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AqiStats {
    pub mean: f64,
    pub p95: f64,
    pub max: f64,
}

impl AqiStats {
    /// Compute the statistics, or `None` for an empty input.
    ///
    /// The percentile interpolates linearly between the closest ranks.
    pub fn from_values(values: &[f64]) -> Option<AqiStats> {
        // ---
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
        let max = sorted[sorted.len() - 1];
        Some(AqiStats {
            mean,
            p95: quantile(&sorted, 0.95),
            max,
        })
    }
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Statistics over the `Avg_AQI` column.
pub fn aqi_stats<'a, I>(rows: I) -> Option<AqiStats>
where
    I: IntoIterator<Item = &'a HourlyAggregate>,
{
    let values: Vec<f64> = rows.into_iter().map(|r| r.avg_aqi).collect();
    AqiStats::from_values(&values)
}

/// Hourly rows per AQI category, mildest category first. Empty categories
/// are included with a zero count.
pub fn category_counts<'a, I>(rows: I) -> Vec<(AqiCategory, usize)>
where
    I: IntoIterator<Item = &'a HourlyAggregate>,
{
    // ---
    let mut counts: BTreeMap<AqiCategory, usize> =
        AqiCategory::ALL.iter().map(|c| (*c, 0)).collect();
    for row in rows {
        *counts.entry(AqiCategory::from_aqi(row.avg_aqi)).or_default() += 1;
    }
    counts.into_iter().collect()
}

/// Mean `Avg_AQI` per calendar day (UTC), oldest first.
fn daily_means<'a, I>(rows: I) -> BTreeMap<NaiveDate, f64>
where
    I: IntoIterator<Item = &'a HourlyAggregate>,
{
    // ---
    let mut days: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for row in rows {
        let day = days.entry(row.hour_timestamp.date_naive()).or_default();
        day.0 += row.avg_aqi;
        day.1 += 1;
    }
    days
        .into_iter()
        .map(|(date, (sum, n))| (date, sum / n as f64))
        .collect()
}

/// Days by quality, based on each calendar day's mean `Avg_AQI` (UTC).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DailyQuality {
    pub total_days: usize,
    /// Days with a mean AQI of 50 or less.
    pub good_days: usize,
    /// Days with a mean AQI of 101 or more.
    pub unhealthy_days: usize,
    /// Share of good days, in percent to one decimal.
    pub good_pct: f64,
    pub unhealthy_pct: f64,
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 1000.0).round() / 10.0
}

pub fn daily_quality<'a, I>(rows: I) -> DailyQuality
where
    I: IntoIterator<Item = &'a HourlyAggregate>,
{
    // ---
    let days = daily_means(rows);
    let good_days = days.values().filter(|mean| **mean <= 50.0).count();
    let unhealthy_days = days.values().filter(|mean| **mean >= 101.0).count();

    DailyQuality {
        total_days: days.len(),
        good_days,
        unhealthy_days,
        good_pct: percent(good_days, days.len()),
        unhealthy_pct: percent(unhealthy_days, days.len()),
    }
}

/// One calendar day and its mean `Avg_AQI`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyMean {
    pub date: NaiveDate,
    pub avg_aqi: f64,
}

/// The days with the highest and lowest mean AQI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyExtremes {
    pub highest: DailyMean,
    pub lowest: DailyMean,
}

/// Highest and lowest daily mean. Ties go to the earliest day; `None` when
/// there are no rows.
pub fn daily_extremes<'a, I>(rows: I) -> Option<DailyExtremes>
where
    I: IntoIterator<Item = &'a HourlyAggregate>,
{
    // ---
    let mut days = daily_means(rows)
        .into_iter()
        .map(|(date, avg_aqi)| DailyMean { date, avg_aqi });
    let first = days.next()?;

    let mut extremes = DailyExtremes {
        highest: first,
        lowest: first,
    };
    for day in days {
        if day.avg_aqi > extremes.highest.avg_aqi {
            extremes.highest = day;
        }
        if day.avg_aqi < extremes.lowest.avg_aqi {
            extremes.lowest = day;
        }
    }
    Some(extremes)
}

/// Mean AQI for one hour of the day across all days in view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourOfDay {
    /// 0..=23, UTC.
    pub hour: u32,
    pub avg_aqi: f64,
}

/// Mean `Avg_AQI` by hour of day, ascending. Hours with no rows are left out.
pub fn hour_of_day_profile<'a, I>(rows: I) -> Vec<HourOfDay>
where
    I: IntoIterator<Item = &'a HourlyAggregate>,
{
    // ---
    let mut hours: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for row in rows {
        let slot = hours.entry(row.hour_timestamp.hour()).or_default();
        slot.0 += row.avg_aqi;
        slot.1 += 1;
    }
    hours
        .into_iter()
        .map(|(hour, (sum, n))| HourOfDay {
            hour,
            avg_aqi: sum / n as f64,
        })
        .collect()
}

/// Per-zone rollup: mean AQI, distinct sensors and the map colour of the
/// mean's category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneRollup {
    pub zip_code: String,
    pub avg_aqi: f64,
    pub sensor_count: usize,
    pub category: AqiCategory,
    pub color: &'static str,
}

/// One [`ZoneRollup`] per zone present in `rows`, ordered by ZIP code.
pub fn zone_rollup<'a, I>(rows: I) -> Vec<ZoneRollup>
where
    I: IntoIterator<Item = &'a HourlyAggregate>,
{
    // ---
    let mut zones: BTreeMap<&str, (f64, usize, BTreeSet<&str>)> = BTreeMap::new();
    for row in rows {
        let zone = zones.entry(row.zip_code.as_str()).or_default();
        zone.0 += row.avg_aqi;
        zone.1 += 1;
        zone.2.insert(row.sensor_id.as_str());
    }
    zones
        .into_iter()
        .map(|(zip, (sum, n, sensors))| {
            let avg_aqi = sum / n as f64;
            let category = AqiCategory::from_aqi(avg_aqi);
            ZoneRollup {
                zip_code: zip.to_string(),
                avg_aqi,
                sensor_count: sensors.len(),
                category,
                color: category.color(),
            }
        })
        .collect()
}

/// A zone and the mean AQI of its latest hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneScore {
    pub zip_code: String,
    pub avg_aqi: f64,
}

/// Best (lowest) and worst (highest) zone by mean AQI over each zone's
/// most recent hour. `None` when there are no rows.
pub fn zone_extremes<'a, I>(rows: I) -> Option<(ZoneScore, ZoneScore)>
where
    I: IntoIterator<Item = &'a HourlyAggregate>,
{
    // ---
    // zip -> (latest hour, sum of Avg_AQI at that hour, rows at that hour)
    let mut latest: BTreeMap<&str, (DateTime<Utc>, f64, usize)> = BTreeMap::new();
    for row in rows {
        let entry = latest
            .entry(row.zip_code.as_str())
            .or_insert((row.hour_timestamp, 0.0, 0));
        if row.hour_timestamp > entry.0 {
            *entry = (row.hour_timestamp, 0.0, 0);
        }
        if row.hour_timestamp == entry.0 {
            entry.1 += row.avg_aqi;
            entry.2 += 1;
        }
    }

    let scores: Vec<ZoneScore> = latest
        .into_iter()
        .map(|(zip, (_, sum, n))| ZoneScore {
            zip_code: zip.to_string(),
            avg_aqi: sum / n as f64,
        })
        .collect();

    let best = scores
        .iter()
        .min_by(|a, b| a.avg_aqi.total_cmp(&b.avg_aqi))?
        .clone();
    let worst = scores
        .iter()
        .max_by(|a, b| a.avg_aqi.total_cmp(&b.avg_aqi))?
        .clone();
    Some((best, worst))
}

/// Everything above, for one filtered view of the hourly table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotSummary {
    pub rows: usize,
    pub stats: Option<AqiStats>,
    pub categories: Vec<(AqiCategory, usize)>,
    pub daily: DailyQuality,
    pub daily_extremes: Option<DailyExtremes>,
    pub hour_of_day: Vec<HourOfDay>,
    pub zones: Vec<ZoneRollup>,
    pub best_zone: Option<ZoneScore>,
    pub worst_zone: Option<ZoneScore>,
}

pub fn summarize(rows: &[HourlyAggregate], filter: &HourlyFilter) -> SnapshotSummary {
    // ---
    let selected = filter.apply(rows);
    let extremes = zone_extremes(selected.iter().copied());
    SnapshotSummary {
        rows: selected.len(),
        stats: aqi_stats(selected.iter().copied()),
        categories: category_counts(selected.iter().copied()),
        daily: daily_quality(selected.iter().copied()),
        daily_extremes: daily_extremes(selected.iter().copied()),
        hour_of_day: hour_of_day_profile(selected.iter().copied()),
        zones: zone_rollup(selected.iter().copied()),
        best_zone: extremes.as_ref().map(|(b, _)| b.clone()),
        worst_zone: extremes.map(|(_, w)| w),
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn row(zip: &str, ts: DateTime<Utc>, avg_aqi: f64) -> HourlyAggregate {
        HourlyAggregate {
            sensor_id: format!("sensor_{}", zip),
            zip_code: zip.to_string(),
            longitude: -119.8,
            latitude: 36.7,
            hour_timestamp: ts,
            avg_temp: 70.0,
            avg_pm2_5: 10.0,
            avg_aqi,
            avg_cig_apx: avg_aqi / 22.0,
            reading_count: 6,
        }
    }

    fn t(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_stats_mean_p95_max() {
        // ---
        let values: Vec<f64> = (1..=100).map(f64::from).collect();
        let stats = AqiStats::from_values(&values).unwrap();
        assert_eq!(stats.mean, 50.5);
        assert_eq!(stats.max, 100.0);
        // pos = 0.95 * 99 = 94.05 -> 95 + 0.05 * (96 - 95)
        assert!((stats.p95 - 95.05).abs() < 1e-9);

        assert_eq!(AqiStats::from_values(&[]), None);
        let single = AqiStats::from_values(&[42.0]).unwrap();
        assert_eq!((single.mean, single.p95, single.max), (42.0, 42.0, 42.0));
    }

    #[test]
    fn test_filter_by_zone_and_range() {
        // ---
        let rows = vec![
            row("93701", t(1, 0), 40.0),
            row("93702", t(1, 5), 60.0),
            row("93701", t(2, 0), 80.0),
        ];

        let filter = HourlyFilter {
            zip_codes: Some(vec!["93701".to_string()]),
            start: Some(t(1, 0)),
            end: Some(t(1, 23)),
        };
        let selected = filter.apply(&rows);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].avg_aqi, 40.0);

        assert_eq!(HourlyFilter::default().apply(&rows).len(), 3);
    }

    #[test]
    fn test_category_counts_cover_all_categories() {
        // ---
        let rows = vec![
            row("93701", t(1, 0), 20.0),
            row("93701", t(1, 1), 75.0),
            row("93701", t(1, 2), 45.0),
            row("93701", t(1, 3), 420.0),
        ];
        let counts = category_counts(&rows);
        assert_eq!(counts.len(), 6);
        assert_eq!(counts[0], (AqiCategory::Good, 2));
        assert_eq!(counts[1], (AqiCategory::Moderate, 1));
        assert_eq!(counts[2], (AqiCategory::UnhealthyForSensitiveGroups, 0));
        assert_eq!(counts[5], (AqiCategory::Hazardous, 1));
    }

    #[test]
    fn test_daily_quality() {
        // ---
        let rows = vec![
            // day 1 mean 30 -> good
            row("93701", t(1, 0), 20.0),
            row("93701", t(1, 1), 40.0),
            // day 2 mean 75 -> neither
            row("93701", t(2, 0), 75.0),
            // day 3 mean 120 -> unhealthy
            row("93701", t(3, 0), 110.0),
            row("93701", t(3, 1), 130.0),
        ];
        let q = daily_quality(&rows);
        assert_eq!(q.total_days, 3);
        assert_eq!(q.good_days, 1);
        assert_eq!(q.unhealthy_days, 1);
        assert_eq!(q.good_pct, 33.3);
        assert_eq!(q.unhealthy_pct, 33.3);

        let empty = daily_quality(&Vec::<HourlyAggregate>::new());
        assert_eq!(empty, DailyQuality::default());
        assert_eq!(empty.unhealthy_pct, 0.0);
    }

    #[test]
    fn test_daily_extremes() {
        // ---
        let rows = vec![
            row("93701", t(1, 0), 20.0),
            row("93701", t(1, 1), 40.0),
            row("93702", t(2, 0), 150.0),
            row("93701", t(2, 5), 90.0),
            // ties day 2's mean of 120; the earlier day wins
            row("93701", t(3, 0), 120.0),
        ];
        let extremes = daily_extremes(&rows).unwrap();
        assert_eq!(extremes.highest.date, t(2, 0).date_naive());
        assert_eq!(extremes.highest.avg_aqi, 120.0);
        assert_eq!(extremes.lowest.date, t(1, 0).date_naive());
        assert_eq!(extremes.lowest.avg_aqi, 30.0);

        assert!(daily_extremes(&Vec::<HourlyAggregate>::new()).is_none());
    }

    #[test]
    fn test_hour_of_day_profile() {
        // ---
        let rows = vec![
            row("93701", t(1, 7), 40.0),
            row("93701", t(2, 7), 60.0),
            row("93702", t(1, 7), 80.0),
            row("93701", t(1, 18), 120.0),
        ];
        let profile = hour_of_day_profile(&rows);
        assert_eq!(
            profile,
            vec![
                HourOfDay {
                    hour: 7,
                    avg_aqi: 60.0
                },
                HourOfDay {
                    hour: 18,
                    avg_aqi: 120.0
                },
            ]
        );
    }

    #[test]
    fn test_zone_rollup_counts_distinct_sensors() {
        // ---
        let mut second_sensor = row("93701", t(1, 0), 80.0);
        second_sensor.sensor_id = "sensor_02".to_string();
        let rows = vec![
            row("93702", t(1, 0), 160.0),
            row("93701", t(1, 0), 20.0),
            row("93701", t(1, 1), 50.0),
            second_sensor,
        ];

        let zones = zone_rollup(&rows);
        assert_eq!(zones.len(), 2);

        assert_eq!(zones[0].zip_code, "93701");
        assert_eq!(zones[0].avg_aqi, 50.0);
        assert_eq!(zones[0].sensor_count, 2);
        assert_eq!(zones[0].category, AqiCategory::Good);
        assert_eq!(zones[0].color, "#00e400");

        assert_eq!(zones[1].zip_code, "93702");
        assert_eq!(zones[1].sensor_count, 1);
        assert_eq!(zones[1].category, AqiCategory::Unhealthy);
        assert_eq!(zones[1].color, "#ff0000");
    }

    #[test]
    fn test_zone_extremes_use_latest_hour() {
        // ---
        let rows = vec![
            // 93701 was worst earlier but is best at its latest hour
            row("93701", t(1, 0), 300.0),
            row("93701", t(1, 1), 10.0),
            row("93702", t(1, 1), 90.0),
            row("93702", t(1, 1), 110.0),
            row("93703", t(1, 0) + TimeDelta::hours(1), 50.0),
        ];
        let (best, worst) = zone_extremes(&rows).unwrap();
        assert_eq!(best.zip_code, "93701");
        assert_eq!(best.avg_aqi, 10.0);
        assert_eq!(worst.zip_code, "93702");
        assert_eq!(worst.avg_aqi, 100.0);

        assert!(zone_extremes(&Vec::<HourlyAggregate>::new()).is_none());
    }

    #[test]
    fn test_summarize_applies_filter() {
        // ---
        let rows = vec![row("93701", t(1, 0), 40.0), row("93702", t(1, 0), 160.0)];
        let filter = HourlyFilter {
            zip_codes: Some(vec!["93702".to_string()]),
            ..Default::default()
        };
        let summary = summarize(&rows, &filter);
        assert_eq!(summary.rows, 1);
        assert_eq!(summary.stats.as_ref().unwrap().max, 160.0);
        assert_eq!(summary.best_zone, summary.worst_zone);
        assert_eq!(summary.best_zone.as_ref().unwrap().zip_code, "93702");
        assert_eq!(summary.zones.len(), 1);
        assert_eq!(summary.hour_of_day.len(), 1);
        assert_eq!(summary.daily_extremes.as_ref().unwrap().highest.avg_aqi, 160.0);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["zones"][0]["color"], "#ff0000");
        assert_eq!(json["daily"]["total_days"], 1);
    }
}
