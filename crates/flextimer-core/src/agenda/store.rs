//! Ordered agenda list with a play cursor.
//!
//! The cursor is `None` exactly when the list is empty, otherwise it is a
//! valid index. Done items are anchored: reordering may never shift them.

use tracing::debug;

use super::item::AgendaItem;
use crate::error::AgendaError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgendaStore {
    items: Vec<AgendaItem>,
    cursor: Option<usize>,
}

impl AgendaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted items. An out-of-range cursor is
    /// clamped to the last item.
    pub fn from_parts(items: Vec<AgendaItem>, cursor: Option<usize>) -> Self {
        let cursor = if items.is_empty() {
            None
        } else {
            Some(cursor.unwrap_or(0).min(items.len() - 1))
        };
        Self { items, cursor }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn items(&self) -> &[AgendaItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn get(&self, index: usize) -> Option<&AgendaItem> {
        self.items.get(index)
    }

    pub fn current(&self) -> Option<&AgendaItem> {
        self.cursor.and_then(|i| self.items.get(i))
    }

    pub(crate) fn current_mut(&mut self) -> Option<&mut AgendaItem> {
        let i = self.cursor?;
        self.items.get_mut(i)
    }

    pub fn contains_title(&self, title: &str) -> bool {
        self.items.iter().any(|item| item.title == title)
    }

    /// Number of items not yet done.
    pub fn pending(&self) -> usize {
        self.items.iter().filter(|item| !item.is_done()).count()
    }

    /// True when there is at least one item and every item is done.
    pub fn all_done(&self) -> bool {
        !self.items.is_empty() && self.pending() == 0
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Append a new ready item.
    ///
    /// # Errors
    /// `InvalidInput` for a blank title or a non-positive duration,
    /// `DuplicateTitle` if the exact title is already on the list.
    pub fn add(&mut self, title: &str, plan_min: i64) -> Result<usize, AgendaError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AgendaError::invalid("title", "title must not be blank"));
        }
        if plan_min <= 0 {
            return Err(AgendaError::invalid(
                "plan",
                format!("duration must be at least 1 minute, got {plan_min}"),
            ));
        }
        let plan_min = u32::try_from(plan_min).map_err(|_| {
            AgendaError::invalid(
                "plan",
                format!("duration must be at most {} minutes, got {plan_min}", u32::MAX),
            )
        })?;
        if self.contains_title(title) {
            return Err(AgendaError::DuplicateTitle {
                title: title.to_string(),
            });
        }

        self.items.push(AgendaItem::new(title, plan_min));
        if self.cursor.is_none() {
            self.cursor = Some(0);
        }
        debug!(title, plan_min, "agenda item added");
        Ok(self.items.len() - 1)
    }

    /// Remove the item at `index`.
    ///
    /// `timer_active` tells whether the engine is currently timing the
    /// item under the cursor; that item cannot be removed.
    ///
    /// # Errors
    /// `InvalidInput` for an out-of-range index, `ItemBusy` for the item
    /// being timed.
    pub fn delete(&mut self, index: usize, timer_active: bool) -> Result<AgendaItem, AgendaError> {
        self.check_index("index", index)?;
        if timer_active && self.cursor == Some(index) {
            return Err(AgendaError::ItemBusy { index });
        }

        let removed = self.items.remove(index);
        self.cursor = match self.cursor {
            _ if self.items.is_empty() => None,
            Some(c) if index < c => Some(c - 1),
            Some(c) => Some(c.min(self.items.len() - 1)),
            None => Some(0),
        };
        debug!(title = %removed.title, index, cursor = ?self.cursor, "agenda item deleted");
        Ok(removed)
    }

    /// Move one item from `from` to `to`, keeping the cursor on the item
    /// it pointed at.
    ///
    /// # Errors
    /// `InvalidInput` for out-of-range indexes, `AnchoredItem` when the
    /// moved item is done or the move would shift a done item.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), AgendaError> {
        self.check_index("from", from)?;
        self.check_index("to", to)?;
        if from == to {
            return Ok(());
        }

        let (lo, hi) = (from.min(to), from.max(to));
        if let Some(anchored) = (lo..=hi).find(|&i| self.items[i].is_done()) {
            return Err(AgendaError::AnchoredItem { index: anchored });
        }

        let item = self.items.remove(from);
        self.items.insert(to, item);

        if let Some(c) = self.cursor {
            self.cursor = Some(if c == from {
                to
            } else if from < c && to >= c {
                c - 1
            } else if from > c && to <= c {
                c + 1
            } else {
                c
            });
        }
        debug!(from, to, cursor = ?self.cursor, "agenda item moved");
        Ok(())
    }

    /// Point the cursor at `index`.
    ///
    /// # Errors
    /// `InvalidInput` for an out-of-range index.
    pub fn select(&mut self, index: usize) -> Result<(), AgendaError> {
        self.check_index("index", index)?;
        self.cursor = Some(index);
        Ok(())
    }

    /// Clear a fully completed agenda to start a new day.
    ///
    /// Items were already recorded one by one as they finished, so this
    /// writes no history.
    ///
    /// # Errors
    /// `IncompleteAgenda` if any item is not done.
    pub fn archive_and_clear(&mut self) -> Result<Vec<AgendaItem>, AgendaError> {
        let pending = self.pending();
        if pending > 0 {
            return Err(AgendaError::IncompleteAgenda { pending });
        }
        self.cursor = None;
        Ok(std::mem::take(&mut self.items))
    }

    // ── Engine hooks ─────────────────────────────────────────────────

    /// Move the cursor forward to the next item that is not done. Returns
    /// `false` (and wraps to 0) when no such item follows the cursor.
    pub(crate) fn advance(&mut self) -> bool {
        let Some(c) = self.cursor else {
            return false;
        };
        match (c + 1..self.items.len()).find(|&i| !self.items[i].is_done()) {
            Some(next) => {
                self.cursor = Some(next);
                true
            }
            None => {
                self.cursor = Some(0);
                false
            }
        }
    }

    pub(crate) fn reset_all(&mut self) {
        for item in &mut self.items {
            item.reset();
        }
        self.cursor = if self.items.is_empty() { None } else { Some(0) };
    }

    fn check_index(&self, field: &str, index: usize) -> Result<(), AgendaError> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(AgendaError::invalid(
                field,
                format!("index {index} out of bounds (length: {})", self.items.len()),
            ))
        }
    }
}
