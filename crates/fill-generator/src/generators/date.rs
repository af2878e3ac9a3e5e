//! Date and time value generators.

use super::numeric::MonotonicCursor;
use crate::generator::ValueGenerator;
use crate::registry::{no_validation, BuildContext, GeneratorEntry, ValidationContext};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use fill_core::{Column, CustomizedTable, FillError, GeneratedValue, GeneratorKind, Row};
use rand::rngs::StdRng;
use rand::Rng;

/// Lower bound used when `minDate` is absent.
pub const DEFAULT_MIN_DATE: &str = "1970-01-01";

/// Parse a date bound.
///
/// Accepts RFC 3339, `%Y-%m-%d %H:%M:%S` and plain `%Y-%m-%d`.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

fn date_bounds(column: &Column) -> Result<(i64, i64), String> {
    let min_raw = column.min_date.as_deref().unwrap_or(DEFAULT_MIN_DATE);
    let min = parse_date(min_raw).ok_or_else(|| format!("invalid minDate: {min_raw}"))?;
    let max = match column.max_date.as_deref() {
        Some(raw) => parse_date(raw).ok_or_else(|| format!("invalid maxDate: {raw}"))?,
        None => Utc::now(),
    };
    if min > max {
        return Err(format!("minDate ({min}) must not exceed maxDate ({max})"));
    }
    Ok((min.timestamp(), max.timestamp()))
}

// ============================================================================
// date
// ============================================================================

pub fn date_entry() -> GeneratorEntry {
    GeneratorEntry {
        kind: GeneratorKind::Date,
        engines: &[],
        validate: validate_date,
        build: build_date,
    }
}

fn validate_date(
    _table: &CustomizedTable,
    column: &Column,
    _ctx: &ValidationContext<'_>,
) -> Result<(), String> {
    date_bounds(column).map(|_| ())
}

fn build_date(
    table: &CustomizedTable,
    column: &Column,
    ctx: BuildContext<'_>,
) -> Result<Box<dyn ValueGenerator>, String> {
    let (min, max) = date_bounds(column)?;
    Ok(Box::new(DateGenerator {
        min,
        max,
        cursor: MonotonicCursor::new(column.monotonic, min as f64, max as f64, table.delta_rows),
        rng: ctx.rng,
    }))
}

/// Timestamps with second precision in `[minDate, maxDate]`.
pub struct DateGenerator {
    min: i64,
    max: i64,
    cursor: Option<MonotonicCursor>,
    rng: StdRng,
}

#[async_trait]
impl ValueGenerator for DateGenerator {
    fn generate(&mut self, _row_index: u64, _row: &Row) -> Result<GeneratedValue, FillError> {
        let seconds = match &mut self.cursor {
            Some(cursor) => (cursor.next_value(&mut self.rng) as i64).clamp(self.min, self.max),
            None => self.rng.random_range(self.min..=self.max),
        };
        let value = DateTime::from_timestamp(seconds, 0)
            .map(GeneratedValue::DateTime)
            .unwrap_or(GeneratedValue::Null);
        Ok(value)
    }
}

// ============================================================================
// time
// ============================================================================

pub fn time_entry() -> GeneratorEntry {
    GeneratorEntry {
        kind: GeneratorKind::Time,
        engines: &[],
        validate: no_validation,
        build: build_time,
    }
}

fn build_time(
    _table: &CustomizedTable,
    _column: &Column,
    ctx: BuildContext<'_>,
) -> Result<Box<dyn ValueGenerator>, String> {
    Ok(Box::new(TimeGenerator { rng: ctx.rng }))
}

/// Times of day, uniform over hours, minutes and seconds.
pub struct TimeGenerator {
    rng: StdRng,
}

#[async_trait]
impl ValueGenerator for TimeGenerator {
    fn generate(&mut self, _row_index: u64, _row: &Row) -> Result<GeneratedValue, FillError> {
        let time = NaiveTime::from_hms_opt(
            self.rng.random_range(0..=23),
            self.rng.random_range(0..=59),
            self.rng.random_range(0..=59),
        );
        Ok(time.map(GeneratedValue::Time).unwrap_or(GeneratedValue::Null))
    }
}
