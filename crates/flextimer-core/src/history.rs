//! Append-only per-day log of finished agenda items.
//!
//! Records are bucketed by calendar date and never rewritten. The archive
//! serializes as a JSON object keyed by `YYYY-MM-DD`.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::agenda::{AgendaItem, ItemStatus};
use crate::error::AgendaError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub title: String,
    pub plan_min: u32,
    pub used_min: u64,
    pub status: ItemStatus,
    pub completed_at: DateTime<Local>,
}

impl HistoryRecord {
    pub fn from_item(item: &AgendaItem, completed_at: DateTime<Local>) -> Self {
        Self {
            title: item.title.clone(),
            plan_min: item.plan_min,
            used_min: item.used_min(),
            status: item.status,
            completed_at,
        }
    }
}

/// Totals for one calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub records: usize,
    pub plan_min: u64,
    pub used_min: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryArchive {
    days: BTreeMap<NaiveDate, Vec<HistoryRecord>>,
}

impl HistoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the bucket for `date`. Duplicates are kept.
    pub fn record(&mut self, date: NaiveDate, record: HistoryRecord) {
        self.days.entry(date).or_default().push(record);
    }

    /// Records for `date` in the order they were written.
    pub fn records_for_date(&self, date: NaiveDate) -> &[HistoryRecord] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Days of the given month that have at least one record, ascending.
    ///
    /// # Errors
    /// `InvalidInput` if `year`/`month` do not name a calendar month.
    pub fn dates_with_activity(
        &self,
        year: i32,
        month: u32,
    ) -> Result<impl Iterator<Item = NaiveDate> + '_, AgendaError> {
        let invalid = || AgendaError::invalid("month", format!("{year}-{month} is not a valid month"));
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
        let end = NaiveDate::from_ymd_opt(next_year, next_month, 1).ok_or_else(invalid)?;

        Ok(self
            .days
            .range(first..end)
            .filter(|(_, records)| !records.is_empty())
            .map(|(date, _)| *date))
    }

    pub fn day_summary(&self, date: NaiveDate) -> DaySummary {
        self.records_for_date(date)
            .iter()
            .fold(DaySummary::default(), |mut acc, r| {
                acc.records += 1;
                acc.plan_min += u64::from(r.plan_min);
                acc.used_min += r.used_min;
                acc
            })
    }

    pub fn is_empty(&self) -> bool {
        self.days.values().all(Vec::is_empty)
    }

    /// Total number of records across all days.
    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(title: &str, plan: u32, used: u64) -> HistoryRecord {
        HistoryRecord {
            title: title.into(),
            plan_min: plan,
            used_min: used,
            status: ItemStatus::Done,
            completed_at: Local.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn records_keep_insertion_order_and_duplicates() {
        let mut archive = HistoryArchive::new();
        archive.record(day(2024, 5, 2), record("Standup", 5, 6));
        archive.record(day(2024, 5, 2), record("Standup", 5, 4));
        archive.record(day(2024, 5, 2), record("Retro", 30, 25));

        let titles: Vec<_> = archive
            .records_for_date(day(2024, 5, 2))
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, ["Standup", "Standup", "Retro"]);
        assert!(archive.records_for_date(day(2024, 5, 3)).is_empty());
        assert_eq!(archive.len(), 3);
    }

    #[test]
    fn dates_with_activity_stays_within_month() {
        let mut archive = HistoryArchive::new();
        archive.record(day(2024, 4, 30), record("A", 5, 5));
        archive.record(day(2024, 5, 1), record("B", 5, 5));
        archive.record(day(2024, 5, 17), record("C", 5, 5));
        archive.record(day(2024, 6, 1), record("D", 5, 5));

        let may: Vec<_> = archive.dates_with_activity(2024, 5).unwrap().collect();
        assert_eq!(may, [day(2024, 5, 1), day(2024, 5, 17)]);

        // Restartable
        assert_eq!(archive.dates_with_activity(2024, 5).unwrap().count(), 2);
    }

    #[test]
    fn december_rolls_into_next_year() {
        let mut archive = HistoryArchive::new();
        archive.record(day(2023, 12, 31), record("A", 5, 5));
        archive.record(day(2024, 1, 1), record("B", 5, 5));
        let dec: Vec<_> = archive.dates_with_activity(2023, 12).unwrap().collect();
        assert_eq!(dec, [day(2023, 12, 31)]);
    }

    #[test]
    fn invalid_month_is_rejected() {
        let archive = HistoryArchive::new();
        assert!(archive.dates_with_activity(2024, 13).is_err());
        assert!(archive.dates_with_activity(2024, 0).is_err());
    }

    #[test]
    fn summary_adds_up_day() {
        let mut archive = HistoryArchive::new();
        archive.record(day(2024, 5, 2), record("A", 5, 6));
        archive.record(day(2024, 5, 2), record("B", 10, 12));
        let summary = archive.day_summary(day(2024, 5, 2));
        assert_eq!(
            summary,
            DaySummary {
                records: 2,
                plan_min: 15,
                used_min: 18
            }
        );
    }

    #[test]
    fn serializes_as_date_keyed_object() {
        let mut archive = HistoryArchive::new();
        archive.record(day(2024, 5, 2), record("A", 5, 6));
        let json = serde_json::to_value(&archive).unwrap();
        assert_eq!(json["2024-05-02"][0]["title"], "A");

        let back: HistoryArchive = serde_json::from_value(json).unwrap();
        assert_eq!(back, archive);
    }
}
