use serde::{Deserialize, Serialize};

/// Lifecycle status of an agenda item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Ready,
    Done,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Ready => "ready",
            ItemStatus::Done => "done",
        }
    }
}

/// One timed topic of the agenda.
///
/// Field names on disk follow the stored `agenda_data` layout
/// (`plan`, `rem`, `used`, `overtime`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaItem {
    pub title: String,
    /// Planned duration in minutes.
    #[serde(rename = "plan")]
    pub plan_min: u32,
    /// Seconds left; negative while in overtime.
    #[serde(rename = "rem")]
    pub remaining_secs: i64,
    #[serde(rename = "used", default)]
    pub used_secs: u64,
    #[serde(rename = "overtime", default)]
    pub overtime_secs: u64,
    pub status: ItemStatus,
}

impl AgendaItem {
    pub fn new(title: impl Into<String>, plan_min: u32) -> Self {
        Self {
            title: title.into(),
            plan_min,
            remaining_secs: i64::from(plan_min) * 60,
            used_secs: 0,
            overtime_secs: 0,
            status: ItemStatus::Ready,
        }
    }

    pub fn plan_secs(&self) -> i64 {
        i64::from(self.plan_min) * 60
    }

    pub fn is_done(&self) -> bool {
        self.status == ItemStatus::Done
    }

    pub fn is_overtime(&self) -> bool {
        self.remaining_secs < 0
    }

    /// Used time rounded to the nearest minute (half up).
    pub fn used_min(&self) -> u64 {
        (self.used_secs + 30) / 60
    }

    /// Advance one second. Returns the new remaining time.
    pub(crate) fn tick(&mut self) -> i64 {
        self.remaining_secs -= 1;
        self.used_secs += 1;
        if self.remaining_secs < 0 {
            self.overtime_secs += 1;
        }
        self.remaining_secs
    }

    /// Mark done. Returns false if it already was.
    pub(crate) fn mark_done(&mut self) -> bool {
        if self.is_done() {
            return false;
        }
        self.status = ItemStatus::Done;
        true
    }

    pub(crate) fn reset(&mut self) {
        self.remaining_secs = self.plan_secs();
        self.used_secs = 0;
        self.overtime_secs = 0;
        self.status = ItemStatus::Ready;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_item_is_ready_with_full_plan() {
        let item = AgendaItem::new("Intro", 5);
        assert_eq!(item.remaining_secs, 300);
        assert_eq!(item.used_secs, 0);
        assert_eq!(item.overtime_secs, 0);
        assert_eq!(item.status, ItemStatus::Ready);
    }

    #[test]
    fn tick_counts_overtime_only_below_zero() {
        let mut item = AgendaItem::new("Short", 1);
        for _ in 0..60 {
            item.tick();
        }
        assert_eq!(item.remaining_secs, 0);
        assert_eq!(item.overtime_secs, 0);

        item.tick();
        assert_eq!(item.remaining_secs, -1);
        assert_eq!(item.used_secs, 61);
        assert_eq!(item.overtime_secs, 1);
        assert!(item.is_overtime());
    }

    #[test]
    fn used_minutes_round_half_up() {
        let mut item = AgendaItem::new("Round", 10);
        item.used_secs = 89;
        assert_eq!(item.used_min(), 1);
        item.used_secs = 90;
        assert_eq!(item.used_min(), 2);
        item.used_secs = 29;
        assert_eq!(item.used_min(), 0);
    }

    #[test]
    fn mark_done_only_once() {
        let mut item = AgendaItem::new("Once", 1);
        assert!(item.mark_done());
        assert!(!item.mark_done());
    }

    #[test]
    fn serializes_with_stored_field_names() {
        let item = AgendaItem::new("Intro", 5);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["plan"], 5);
        assert_eq!(json["rem"], 300);
        assert_eq!(json["status"], "ready");
    }
}
