//! Canonical date indices and per-entity daily gap-filling.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::features::{EntityId, FeatureRow, FieldValue};

/// One per-entity daily observation: the entity, the calendar day, and the
/// aggregate/auxiliary columns recorded for that day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyRow {
    pub entity: EntityId,
    pub date: NaiveDate,
    pub fields: FeatureRow,
}

impl DailyRow {
    pub fn new(entity: impl Into<EntityId>, date: NaiveDate) -> Self {
        Self { entity: entity.into(), date, fields: FeatureRow::new() }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.set(field, value);
        self
    }
}

/// Every Sunday in `[start, end]`, ascending. Endpoints are included when
/// they themselves fall on a Sunday; empty when no Sunday is in range.
pub fn weekly_index(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut sundays = Vec::new();
    if start > end {
        return sundays;
    }

    let days_until_sunday = (7 - start.weekday().num_days_from_sunday()) % 7;
    let mut cursor = start + Duration::days(i64::from(days_until_sunday));
    while cursor <= end {
        sundays.push(cursor);
        cursor += Duration::days(7);
    }
    sundays
}

/// Completes a single entity's daily table: one row per calendar day between
/// the observed minimum and maximum date, observed rows left-joined by date,
/// and missing values in `agg_cols` replaced with zero. Synthesized rows
/// carry the shared entity id and zeroed aggregates; other columns stay
/// absent. Running the fill on its own output is a no-op.
pub fn complete_daily_index(rows: &[DailyRow], agg_cols: &[&str]) -> Vec<DailyRow> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let entity = first.entity.clone();
    let mut dmin = first.date;
    let mut dmax = first.date;

    let mut by_date: BTreeMap<NaiveDate, DailyRow> = BTreeMap::new();
    for row in rows {
        dmin = dmin.min(row.date);
        dmax = dmax.max(row.date);
        by_date.entry(row.date).or_insert_with(|| row.clone());
    }

    let mut completed = Vec::with_capacity((dmax - dmin).num_days() as usize + 1);
    let mut cursor = dmin;
    while cursor <= dmax {
        let mut row = by_date
            .remove(&cursor)
            .unwrap_or_else(|| DailyRow { entity: entity.clone(), date: cursor, fields: FeatureRow::new() });

        for col in agg_cols {
            let absent = row.fields.get(col).map_or(true, FieldValue::is_missing);
            if absent {
                row.fields.set(*col, 0.0);
            }
        }

        completed.push(row);
        cursor += Duration::days(1);
    }
    completed
}
