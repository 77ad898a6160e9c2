//! CSV review export of the current agenda.

use chrono::NaiveDate;

use super::store::AgendaStore;
use crate::error::AgendaError;

const BOM: char = '\u{FEFF}';
const HEADER: &str = "Title,Plan (min),Used (s),Overtime (s),Status";

/// Render the agenda as UTF-8 CSV with a leading BOM, one row per item.
///
/// # Errors
/// `InvalidInput` when there is nothing to export.
pub fn export_csv(store: &AgendaStore) -> Result<String, AgendaError> {
    if store.is_empty() {
        return Err(AgendaError::invalid("agenda", "no agenda items to export"));
    }

    let mut out = String::new();
    out.push(BOM);
    out.push_str(HEADER);
    out.push('\n');
    for item in store.items() {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            quote(&item.title),
            item.plan_min,
            item.used_secs,
            item.overtime_secs,
            item.status.as_str(),
        ));
    }
    Ok(out)
}

/// Default export file name for the given day.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("FlexTimer_review_{}.csv", date.format("%Y-%m-%d"))
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
