//! Days-since-last-activity over per-entity activity logs.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::features::EntityId;

/// Recorded activity events keyed by entity. Per-entity collections are
/// unordered; only the maximum qualifying date matters to recency.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog(HashMap<EntityId, Vec<NaiveDate>>);

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entity: impl Into<EntityId>, date: NaiveDate) {
        self.0.entry(entity.into()).or_default().push(date);
    }

    pub fn dates(&self, entity: &EntityId) -> &[NaiveDate] {
        self.0.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl FromIterator<(EntityId, Vec<NaiveDate>)> for ActivityLog {
    fn from_iter<I: IntoIterator<Item = (EntityId, Vec<NaiveDate>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Whole days between `snapshot` and the entity's most recent activity not
/// after it. `f64::NAN` when the entity has no qualifying activity — absent
/// from the log entirely, or active only after the snapshot. Never negative.
pub fn days_since_last_activity(entity: &EntityId, snapshot: NaiveDate, log: &ActivityLog) -> f64 {
    let last = log.dates(entity).iter().filter(|date| **date <= snapshot).max();
    match last {
        Some(date) => (snapshot - *date).num_days() as f64,
        None => f64::NAN,
    }
}
